//! HTTP access to the remote task service

mod client;
mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiOperation};
