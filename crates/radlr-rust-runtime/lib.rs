//! # radlr_rust_runtime
//! Drives the tables `radlr_core` compiles: a DFA scanner (§4.2), a
//! deterministic shift-reduce parser with structured error recovery (§4.6),
//! and a generalized (GLR) parser for grammars that declare
//! `%nondeterministic` productions (§4.7).
pub mod classification;
pub mod driver;
pub mod glr;
pub mod scanner;
pub mod types;

pub use classification::{classify, ParserClassification};
pub use driver::{Driver, HandlerTable};
pub use glr::{GlrDriver, GlrOutcome};
pub use scanner::ScannerCursor;
pub use types::{AstSlot, ScannedToken};
