// Core MuseMate functionality

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export prompts module - Conversation building
pub mod prompts;
pub use prompts::build_conversation;

// Export extract module - JSON recovery from model output
pub mod extract;
pub use extract::extract_spark_fields;

// Export client module - OpenAI-compatible API client
pub mod client;
pub use client::*;

// Export spark module - Two-attempt acquisition with fallback
pub mod spark;
pub use spark::{
    fallback_result, generate_spark, SparkAcquirer, FALLBACK_FOCUS, FALLBACK_SPARK, NO_API_KEY,
};

// Export history module - Bounded recent-spark history
pub mod history;
pub use history::*;
