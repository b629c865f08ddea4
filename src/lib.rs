//! slcheck - Security List Checker
//!
//! Finds security-list rules that other rules already cover, and searches
//! security lists and route tables in a cloud network inventory snapshot.
//!
//! # Architecture
//!
//! - [`core`] - Rule normalization, coverage and the redundancy filter
//! - [`filters`] - Port, IP and attribute queries over lists and routes
//! - [`format`] - Text rendering of rules
//! - [`output`] - Atomic JSON output of matched collections and reports
//! - [`validators`] - Command-line parameter validation
//! - [`config`] - Configuration loading
//! - [`utils`] - Utility functions (XDG directories, etc.)
//!
//! # Example
//!
//! ```
//! use slcheck::core::ports::PortFields;
//! use slcheck::{Direction, RawRule, filter_redundant, normalize};
//!
//! let narrow = normalize(
//!     &RawRule::new(Direction::Ingress)
//!         .protocol("tcp")
//!         .ports(PortFields::single(80))
//!         .source("10.0.0.0/24"),
//! )?;
//! let broad = normalize(&RawRule::new(Direction::Ingress).source("10.0.0.0/16"))?;
//!
//! let result = filter_redundant(&[narrow, broad.clone()]);
//! assert_eq!(result.kept, vec![broad]);
//! assert_eq!(result.removed.len(), 1);
//! # Ok::<(), slcheck::Error>(())
//! ```

// Allow pedantic clippy warnings that are not worth fixing for this codebase
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::needless_lifetimes)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod core;
pub mod filters;
pub mod format;
pub mod output;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use core::coverage::covers;
pub use core::error::{Error, Result};
pub use core::protocol::Protocol;
pub use core::redundancy::{dedupe, filter_redundant};
pub use core::rule::{Direction, RawRule, Rule, normalize};
