/// Key=value parser for access-log lines
pub mod line_parser;

/// Tail-style reader over the monitored log file
pub mod stream_reader;

pub use line_parser::parse_line;
pub use stream_reader::{ReaderOptions, StreamReader};
