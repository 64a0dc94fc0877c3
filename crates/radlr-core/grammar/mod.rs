//! The grammar model and normalizer (spec §3, §4.3, §4.4): production
//! rules, precedence, the grammar-document front-end (§6), macro expansion,
//! mid-rule-action lifting, and the well-founded/reachable/FIRST closures.
pub mod closure;
pub mod document;
pub mod loader;
pub mod model;
pub mod normalize;

pub use closure::{bipartite_closure, Conjunct};
pub use document::{parse_document, GrammarDocument};
pub use loader::{load_document, LoadedDocument};
pub use model::{Assoc, Constructor, Grammar, PrecedenceLevel, Rule};
