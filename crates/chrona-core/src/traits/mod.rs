mod live_graph;
mod pattern_matcher;
mod temporal_engine;

pub use live_graph::LiveGraph;
pub use pattern_matcher::PatternMatcher;
pub use temporal_engine::ITemporalEngine;
