//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the sync engine:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions and the validated configuration
//! every host bootstraps the engine from.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{EngineConfig, EngineConfigBuilder, ObjectStoreConfig};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
