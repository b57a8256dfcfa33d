//! Error types and error handling for the front-end.
//!
//! This module defines the error types used throughout the pipeline. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for tokenizing, parsing, scoping and typing
//! - The four-way category used to decide whether an error aborts a pass
//! - Helpful error messages and suggestions

pub mod errors;
