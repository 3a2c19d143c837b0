pub mod grading_service;
pub mod prompt;
pub mod result_writer;
pub mod sanitizer;
pub mod text_extractor;

pub use grading_service::{GradingService, LlmGradingService};
pub use prompt::PromptBuilder;
pub use result_writer::ResultWriter;
pub use sanitizer::sanitize_feedback;
pub use text_extractor::{DocumentExtractor, DocumentKind, TextExtractor};
