//! # radlr_core
//! A parser and scanner metacompiler: regex patterns compile to DFA scanner
//! tables, and grammars compile to LR-family (LR(0)/LALR(1)/canonical
//! LR(1)/minimal-LR(1)) parse tables, with `radlr_rust_runtime` driving both
//! at runtime.
//!
//! ## Example: compile a grammar document to a parse table
//!
//! ```ignore
//! let doc = radlr_core::grammar::parse_document(source);
//! let loaded = radlr_core::grammar::load_document(&doc)?;
//! let mut journal = radlr_core::Journal::new(None);
//! let table = radlr_core::lr::build_table(&loaded.grammar, &mut journal)?;
//! ```
pub mod grammar;
pub mod journal;
pub mod lr;
pub mod regex;
pub mod types;

pub use journal::{Config, Journal, LrMethod, Nondeterminism, Report, ReportType};
pub use lr::{build_fork_table, build_table, ForkTable, ParseTable};
pub use types::{RadlrError, RadlrResult};
