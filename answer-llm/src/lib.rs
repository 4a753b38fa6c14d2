//! # answer-llm
//!
//! A small client for the OpenAI Responses API plus the bounded retry loop
//! used to collect answers for the monthly answer sheets.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use answer_llm::{openai::OpenAIClient, retry::RetryingCaller};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAIClient::new("your-api-key")?;
//!     let caller = RetryingCaller::new(Arc::new(client));
//!
//!     match caller.generate("gpt-4o-mini", "승차감 좋은 소형 세단 추천").await {
//!         Ok(answer) => println!("Response: {}", answer),
//!         Err(e) => eprintln!("Gave up: {}", e),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod openai;
pub mod providers;
pub mod retry;

pub use client::ResponsesClient;
pub use error::{GenerationError, LlmError};
pub use retry::{RetryPolicy, RetryingCaller};
