pub mod config;
pub mod error;
pub mod individual;
pub mod ratings;
pub mod rollup;
pub mod stats;
pub mod types;

#[cfg(feature = "organization")]
pub mod organization;

#[cfg(feature = "trends")]
pub mod trends;

#[cfg(feature = "peers")]
pub mod peers;

pub use config::AnalyticsConfig;
pub use error::AnalyticsError;
pub use types::*;

/// Standard result type for all feedback-analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
