//! reqlint - linter for pip requirements manifests
//!
//! This library provides the pieces behind the `reqlint` binary:
//! - Parsing requirements files (continuations, comments, options, sections)
//! - PEP 508 environment markers evaluated against a target environment
//! - Lint rules for names, versions, pins, duplicates and conflicts
//! - Optional checks of exact pins against PyPI

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod lint;
pub mod loader;
pub mod marker;
pub mod orchestrator;
pub mod output;
pub mod parser;
pub mod progress;
pub mod registry;
