//! # Dichokey
//!
//! Turn OCR'd botanical dichotomous keys into navigable decision trees.
//!
//! A dichotomous key is a numbered sequence of either/or choices. Dichokey
//! reads the raw text of such a key, resolves how its numbered steps nest,
//! stores the result as JSON and lets you walk it one choice at a time.
//!
//! ## Pipeline
//!
//! - **Line parser** ([`key::parse_line`]): one raw line to an optional step
//! - **Tree builder** ([`key::build`]): steps to nodes with parent links
//! - **Key store** ([`KeyStore`]): order-preserving JSON persistence
//! - **Navigator** ([`Navigator`]): interactive walk with back-tracking
//!
//! ```
//! use dichokey::key::{build, parse_document};
//! use dichokey::{NavState, Navigator};
//!
//! let out = build(parse_document("1. Annual\n1'. Perennial. Viola alba\n"));
//! let mut nav = Navigator::new(out.store);
//! nav.select(0).unwrap();
//! assert!(matches!(nav.state(), NavState::Terminal { .. }));
//! assert_eq!(nav.result(), Some("Perennial. Viola alba"));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]

pub mod app;
pub mod core;
pub mod key;
pub mod navigator;
pub mod tui;

// Re-export commonly used types
pub use app::App;
pub use core::Config;
pub use key::{BuildOutput, BuildReport, KeyError, KeyResult, KeyStore, Node, StepId};
pub use navigator::{NavError, NavState, Navigator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "dichokey";
