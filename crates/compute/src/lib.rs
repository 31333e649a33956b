pub mod algorithms;
pub mod export;
pub mod pipeline;

pub use export::{DocumentRenderer, ExportError, TextDocumentRenderer};
pub use pipeline::{ReviewPipeline, ReviewReport};
