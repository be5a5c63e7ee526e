//! JavaScript parser front end for defparam.
//!
//! Wraps the standard SWC parser configured for ES2015+ scripts and modules,
//! which is the input language of the desugaring passes (arrow functions and
//! default parameters are both ES2015 syntax).

pub mod parse;

pub use parse::{parse_program, ParseResult};
