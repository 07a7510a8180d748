//! Filter compiler for the flat asset view.
//!
//! [`compile`] turns a declarative [`FilterSpec`](tan_model::FilterSpec)
//! into a [`CompiledQuery`]: an ordered list of structured predicates,
//! a flattened parameter list, a resolved sort key and clamped
//! pagination. Compilation is pure - no I/O, no storage coupling - and
//! either succeeds completely or fails with a [`FilterError`]; no
//! partial query is ever produced.
//!
//! Predicates reference their parameters by index ([`ParamRef`]) rather
//! than by embedded placeholder text, so a single bound value (for
//! example the wildcarded search term) can be shared by several
//! branches of one predicate, and a SQL backend can compute positional
//! placeholders in one pass.

mod compile;
mod error;
mod predicate;
mod sort;

pub use compile::{CompiledQuery, DEFAULT_LIMIT, MAX_LIMIT, compile};
pub use error::FilterError;
pub use predicate::{ParamRef, ParamValue, Predicate, QueryBuilder};
pub use sort::{SortColumn, SortKey};

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, FilterError>;
