//! Desugaring passes that rewrite ES2015 parameter syntax into ES5.
//!
//! Transforms, in order:
//! - `(a) => e`      → `function (a) { return e; }` with `this`/`arguments` captured
//! - `function f(a = d) {}` → `function f() { var a = arguments[0] !== void 0 ? arguments[0] : d; }`

pub mod arrow;
pub mod defaults;
pub mod desugar;
pub mod error;
pub mod names;

mod builders;
#[cfg(test)]
mod test_util;

pub use arrow::{normalize_arrows, ArrowFree};
pub use defaults::desugar_defaults;
pub use desugar::transform;
pub use error::DesugarError;
pub use names::Captures;
