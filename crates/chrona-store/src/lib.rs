//! Reference collaborators for the temporal engine: a live graph held in
//! memory and indexed by subject, and a basic graph pattern matcher that
//! evaluates through an in-memory oxigraph store. Production deployments
//! plug a triple store in behind the same traits.

pub mod matcher;
pub mod memory_graph;

pub use matcher::BasicGraphMatcher;
pub use memory_graph::MemoryGraph;
