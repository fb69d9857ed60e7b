//! HTTP client for the Voice AI service under test

pub mod client;
pub mod errors;

pub use client::{ApiSessionClient, CreatedSession, RawResponse, TimedResponse};
pub use errors::ApiError;
