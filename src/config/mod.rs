//! # Configuration Module
//!
//! Runtime configuration for the studio, including the vision model credential.

pub mod config;

pub use config::{Credential, StudioConfig};
