//! Shared errors and configuration for the GL report service.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management, including site-wide report settings

pub mod config;
pub mod error;

pub use config::{AppConfig, ReportSettings};
pub use error::AppError;
