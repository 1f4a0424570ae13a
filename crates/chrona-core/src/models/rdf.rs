//! RDF aliases, triple patterns and pattern-match results.

use std::collections::BTreeMap;
use std::fmt;

use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use rustc_hash::FxHashSet;

/// An unordered set of triples. Equality is set equality.
pub type TripleSet = FxHashSet<Triple>;

/// Triples ordered by their N-Triples rendering, for stable output.
pub fn sorted_triples(set: &TripleSet) -> Vec<&Triple> {
    let mut triples: Vec<&Triple> = set.iter().collect();
    triples.sort_by_cached_key(|t| t.to_string());
    triples
}

/// The subject of a triple when it is an IRI. Entities are IRIs, so blank
/// node subjects never identify a tracked entity.
pub fn subject_iri(triple: &Triple) -> Option<&NamedNode> {
    match &triple.subject {
        Subject::NamedNode(node) => Some(node),
        _ => None,
    }
}

/// One position of a triple pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternTerm {
    Variable(String),
    Term(Term),
}

impl PatternTerm {
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            Self::Term(_) => None,
        }
    }

    pub fn as_named_node(&self) -> Option<&NamedNode> {
        match self {
            Self::Term(Term::NamedNode(node)) => Some(node),
            _ => None,
        }
    }

    /// Whether `term` can occupy this position. Variables accept anything.
    pub fn accepts(&self, term: &Term) -> bool {
        match self {
            Self::Variable(_) => true,
            Self::Term(fixed) => fixed == term,
        }
    }

    fn accepts_subject(&self, subject: &Subject) -> bool {
        match (self, subject) {
            (Self::Variable(_), _) => true,
            (Self::Term(Term::NamedNode(a)), Subject::NamedNode(b)) => a == b,
            (Self::Term(Term::BlankNode(a)), Subject::BlankNode(b)) => a == b,
            _ => false,
        }
    }

    fn accepts_predicate(&self, predicate: &NamedNode) -> bool {
        match self {
            Self::Variable(_) => true,
            Self::Term(Term::NamedNode(node)) => node == predicate,
            Self::Term(_) => false,
        }
    }
}

impl From<NamedNode> for PatternTerm {
    fn from(node: NamedNode) -> Self {
        Self::Term(node.into())
    }
}

impl From<BlankNode> for PatternTerm {
    fn from(node: BlankNode) -> Self {
        Self::Term(node.into())
    }
}

impl From<Literal> for PatternTerm {
    fn from(literal: Literal) -> Self {
        Self::Term(literal.into())
    }
}

impl From<Term> for PatternTerm {
    fn from(term: Term) -> Self {
        Self::Term(term)
    }
}

impl fmt::Display for PatternTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(name) => write!(f, "?{name}"),
            Self::Term(term) => write!(f, "{term}"),
        }
    }
}

/// A triple pattern: each position is a fixed term or a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<PatternTerm>,
        predicate: impl Into<PatternTerm>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Whether the triple agrees with every fixed position. Variables are
    /// treated as wildcards, repeated variables are not unified.
    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.accepts_subject(&triple.subject)
            && self.predicate.accepts_predicate(&triple.predicate)
            && self.object.accepts(&triple.object)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter_map(PatternTerm::as_variable)
    }

    pub fn is_fully_variable(&self) -> bool {
        self.variables().count() == 3
    }

    pub fn subject_iri(&self) -> Option<&NamedNode> {
        self.subject.as_named_node()
    }

    pub fn object_iri(&self) -> Option<&NamedNode> {
        self.object.as_named_node()
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// One solution: variable name to bound term.
pub type Solution = BTreeMap<String, Term>;

/// A set of solutions. Equality is set equality, so two intervals with the
/// same answers compare equal regardless of the order the matcher produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    solutions: FxHashSet<Solution>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, solution: Solution) -> bool {
        self.solutions.insert(solution)
    }

    pub fn contains(&self, solution: &Solution) -> bool {
        self.solutions.contains(solution)
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.solutions.iter()
    }

    /// Solutions in a stable order, for display and snapshot tests.
    pub fn sorted(&self) -> Vec<&Solution> {
        let mut solutions: Vec<&Solution> = self.solutions.iter().collect();
        solutions.sort_by_cached_key(|s| {
            s.iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ")
        });
        solutions
    }

    /// Terms bound to `variable` across all solutions.
    pub fn bindings<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.solutions.iter().filter_map(move |s| s.get(variable))
    }
}

impl FromIterator<Solution> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Solution>>(iter: I) -> Self {
        Self {
            solutions: iter.into_iter().collect(),
        }
    }
}

impl Extend<Solution> for ResultSet {
    fn extend<I: IntoIterator<Item = Solution>>(&mut self, iter: I) {
        self.solutions.extend(iter);
    }
}
