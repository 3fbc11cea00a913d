//! Common library for the InsightStream application
//!
//! This crate provides shared functionality used across the InsightStream
//! services, including database connectivity and error handling.

pub mod database;
pub mod error;
