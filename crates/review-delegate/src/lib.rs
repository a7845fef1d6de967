pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod verdict;

pub use client::ReviewClient;
pub use config::ReviewConfig;
pub use error::{ReviewError, Result};
pub use prompt::{ReviewRequest, build_prompt};
pub use verdict::{ReviewVerdict, RiskLabel, TestStatus, TestVerdict};
