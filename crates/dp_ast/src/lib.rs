//! ECMAScript AST for defparam.
//!
//! Re-exports the standard SWC AST, which already models what the passes
//! need: a parameter with a default is `Pat::Assign`, and every other pattern
//! is a parameter without one, so defaults stay aligned with their position.
//!
//! Also holds the options shared by the compile front ends.

pub use swc_ecma_ast::*;

use serde::{Deserialize, Serialize};

/// File name used for diagnostics when the caller gives none.
pub const ANONYMOUS_SOURCE: &str = "<anonymous>";

/// Per-compile settings for the text-level interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Name of the source file, used in diagnostics and as the source-map source.
    pub source_file_name: Option<String>,
    /// Name of the source map to produce. No map is built when this is `None`.
    pub source_map_name: Option<String>,
}

impl CompileOptions {
    pub fn with_source_file_name(mut self, name: impl Into<String>) -> Self {
        self.source_file_name = Some(name.into());
        self
    }

    pub fn with_source_map_name(mut self, name: impl Into<String>) -> Self {
        self.source_map_name = Some(name.into());
        self
    }

    /// The file name to report, falling back to [`ANONYMOUS_SOURCE`].
    pub fn file_name(&self) -> &str {
        self.source_file_name.as_deref().unwrap_or(ANONYMOUS_SOURCE)
    }

    pub fn wants_source_map(&self) -> bool {
        self.source_map_name.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_build_no_map() {
        let opts = CompileOptions::default();
        assert!(!opts.wants_source_map());
        assert_eq!(opts.file_name(), ANONYMOUS_SOURCE);
    }

    #[test]
    fn options_deserialize_from_json() {
        let opts: CompileOptions = serde_json::from_str(
            r#"{"source_file_name":"add.js","source_map_name":"add.js.map"}"#,
        )
        .unwrap();
        assert_eq!(opts.file_name(), "add.js");
        assert!(opts.wants_source_map());
    }
}
