//! Text-level front end: parse ES2015+ source, lower arrow functions and
//! default parameters, and print ES5 code with an optional source map.

pub mod compile;
pub mod emit;

pub use compile::{compile, compile_stream, CompileOutput};
pub use emit::{print, Printed};
