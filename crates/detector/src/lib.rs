pub mod annotate;
pub mod backend;
pub mod config;
pub mod detection;
pub mod processing;
pub mod service;
pub mod summary;
pub mod vocabulary;

// Re-export commonly used types for convenience
pub use backend::DetectorBackend;
pub use config::DetectorConfig;
pub use detection::{BoundingBox, Detection};
pub use service::{Detected, Detector};
pub use summary::{ClassSummary, SummaryError, summarize};
pub use vocabulary::Vocabulary;
