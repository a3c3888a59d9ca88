pub mod builder;
pub mod community;
pub mod error;
pub mod gexf;
pub mod graph;
pub mod layout;
pub mod mapping;
pub mod pipeline;
pub mod reader;
pub mod sanitize;
pub mod stats;

pub use error::{PipelineError, Result};
pub use graph::SpatialGraph;
pub use layout::{LayoutAlgorithm, LayoutOptions, apply_layout};
pub use mapping::Mapping;
pub use pipeline::{Analysis, PipelineOutput, SourceFormat, analyze, process, process_with_options};
