pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod llm;
pub mod prompts;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::PipelineError;
pub use generator::workflow::{launch, run_pipeline};
