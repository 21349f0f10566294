//! Shared configuration and error types for blockjuggler.

pub mod config;
pub mod error;
