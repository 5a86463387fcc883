//! HKO Weather API - Caching proxy for Hong Kong Observatory current weather
//!
//! This library exposes the core modules for testing and reuse.

pub mod cache;
pub mod common;
pub mod config;
pub mod error;
pub mod hko;
pub mod routes;
pub mod services;
