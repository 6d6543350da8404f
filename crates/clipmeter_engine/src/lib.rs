//! Clipmeter engine: the change monitor, the memoizing analyzer and the
//! pipeline that joins them, plus the text sources and token counters they
//! run against.
mod analyzer;
mod control;
mod monitor;
mod pipeline;
mod source;
mod token;

pub use analyzer::Analyzer;
pub use control::{ControlRequest, PipelineClosed, PipelineControl, SignatureLimit};
pub use monitor::ChangeMonitor;
pub use pipeline::Pipeline;
pub use source::{CommandClipboard, FileTextSource, SourceError, TextSource};
pub use token::{CountError, HeuristicTokenCounter, TokenCounter, WhitespaceTokenCounter};
