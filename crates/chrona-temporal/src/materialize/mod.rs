//! Version materialization: replay with caching plus related-entity expansion.

pub mod cache;
pub mod reconstruct;
pub mod related;
pub mod replay;

pub use cache::MaterializationCache;
pub use reconstruct::Materializer;
