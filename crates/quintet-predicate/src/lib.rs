//! Quintet Predicate
//!
//! Flow predicates are small boolean/comparison expressions such as
//! `amount > 1000 and not approved` or `region == 'EU' || priority >= 3`.
//! They are parsed once into an [`Expr`] tree and evaluated against the flat
//! case data carried by a transaction.
//!
//! Evaluation never guesses: a variable that is absent from the data, or an
//! operand of the wrong type, is an error rather than `false`.

mod error;
mod eval;
mod parser;

pub use error::PredicateError;
pub use eval::ContextData;
pub use parser::{CompareOp, Expr, Value};
