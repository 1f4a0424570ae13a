//! Basic graph pattern evaluation through an in-memory oxigraph store.

use chrona_core::errors::{ChronaError, ChronaResult};
use chrona_core::models::{PatternTerm, ResultSet, Solution, TriplePattern, TripleSet};
use chrona_core::traits::PatternMatcher;
use oxigraph::model::{GraphName, Quad};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use oxrdf::{BlankNode, NamedNode, Subject, Term, Variable};
use tracing::trace;

/// Blank nodes are stored under this IRI prefix so a pattern can name a
/// specific blank node; SPARQL would read `_:b` in a query as a variable.
const SKOLEM_PREFIX: &str = "urn:chrona:bnode:";

/// Loads the graph into a fresh store and runs the patterns as one
/// `SELECT *`. Repeated variables must bind to the same term.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicGraphMatcher;

impl BasicGraphMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl PatternMatcher for BasicGraphMatcher {
    fn match_patterns(
        &self,
        patterns: &[TriplePattern],
        graph: &TripleSet,
    ) -> ChronaResult<ResultSet> {
        let Some(query) = select_query(patterns)? else {
            return Ok(ResultSet::new());
        };
        trace!(patterns = patterns.len(), triples = graph.len(), %query, "matching patterns");

        let store = Store::new().map_err(match_error)?;
        for triple in graph {
            let quad = Quad::new(
                skolemize_subject(&triple.subject),
                triple.predicate.clone(),
                skolemize(&triple.object),
                GraphName::DefaultGraph,
            );
            store.insert(&quad).map_err(match_error)?;
        }

        match store.query(query.as_str()).map_err(match_error)? {
            QueryResults::Solutions(solutions) => {
                let mut results = ResultSet::new();
                for solution in solutions {
                    let solution = solution.map_err(match_error)?;
                    let bindings: Solution = solution
                        .iter()
                        .map(|(variable, term)| (variable.as_str().to_string(), unskolemize(term)))
                        .collect();
                    results.insert(bindings);
                }
                Ok(results)
            }
            _ => Err(ChronaError::PatternMatch(
                "SELECT query did not return solutions".to_string(),
            )),
        }
    }
}

/// `None` when some pattern can never match: no patterns at all, or a
/// literal or blank node where only an IRI can stand.
fn select_query(patterns: &[TriplePattern]) -> ChronaResult<Option<String>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut body = String::new();
    for pattern in patterns {
        if let PatternTerm::Term(Term::Literal(_)) = &pattern.subject {
            return Ok(None);
        }
        if let PatternTerm::Term(term) = &pattern.predicate {
            if !matches!(term, Term::NamedNode(_)) {
                return Ok(None);
            }
        }
        body.push_str(&format!(
            "{} {} {} . ",
            render(&pattern.subject)?,
            render(&pattern.predicate)?,
            render(&pattern.object)?
        ));
    }
    Ok(Some(format!("SELECT * WHERE {{ {body}}}")))
}

fn render(slot: &PatternTerm) -> ChronaResult<String> {
    match slot {
        PatternTerm::Variable(name) => Variable::new(name.as_str())
            .map(|v| v.to_string())
            .map_err(|e| ChronaError::PatternMatch(format!("invalid variable ?{name}: {e}"))),
        PatternTerm::Term(term) => Ok(skolemize(term).to_string()),
    }
}

fn skolemize(term: &Term) -> Term {
    match term {
        Term::BlankNode(node) => skolem_iri(node).into(),
        other => other.clone(),
    }
}

fn skolemize_subject(subject: &Subject) -> Subject {
    match subject {
        Subject::BlankNode(node) => skolem_iri(node).into(),
        other => other.clone(),
    }
}

fn skolem_iri(node: &BlankNode) -> NamedNode {
    NamedNode::new_unchecked(format!("{SKOLEM_PREFIX}{}", node.as_str()))
}

fn unskolemize(term: &Term) -> Term {
    match term {
        Term::NamedNode(node) => match node.as_str().strip_prefix(SKOLEM_PREFIX) {
            Some(id) => BlankNode::new_unchecked(id).into(),
            None => term.clone(),
        },
        other => other.clone(),
    }
}

fn match_error(error: impl std::fmt::Display) -> ChronaError {
    ChronaError::PatternMatch(error.to_string())
}
