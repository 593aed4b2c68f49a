//! SQL engine literal model and its adapter to `strait-core` literals.

pub mod adapter;
pub mod lift;
pub mod lower;
pub mod rex;

pub use adapter::{LowerContext, SqlAdapter};
pub use rex::{IntervalQualifier, RelType, RexLiteral, RexValue, SqlType};
