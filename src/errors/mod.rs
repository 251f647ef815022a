//! Error types and error handling for the front end.
//!
//! This module defines the diagnostics produced throughout the pipeline:
//!
//! - Error structures with source position and node information
//! - Specific error variants for lexing, parsing and type resolution
//! - The diagnostic taxonomy (`ErrorKind`) the checker reports against
//! - Helpful error messages and suggestions

pub mod errors;

#[cfg(test)]
mod tests;
