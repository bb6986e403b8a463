pub mod embedding_sink;
pub mod graph_sink;
pub mod source_parser;

pub use embedding_sink::{EmbeddingSink, NoOpEmbeddingSink};
pub use graph_sink::GraphSink;
pub use source_parser::{ParseError, SourceParser};
