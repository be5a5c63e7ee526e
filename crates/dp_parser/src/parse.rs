use std::path::PathBuf;

use anyhow::Result;
use dp_ast::Program;
use swc_common::{
    comments::SingleThreadedComments, errors::Handler, sync::Lrc, FileName, SourceMap,
};
use swc_ecma_ast::EsVersion;
use swc_ecma_parser::{EsSyntax, Syntax};

/// Result of parsing a source file.
pub struct ParseResult {
    pub program: Program,
    pub comments: SingleThreadedComments,
    /// Owns the source file; needed again for codegen and source maps.
    pub source_map: Lrc<SourceMap>,
}

/// Parse an ES2015+ source string as a script or module.
///
/// Syntax errors, including ones the parser recovered from, are printed to
/// stderr through the SWC diagnostic handler and returned as an error.
pub fn parse_program(source: &str, filename: &str) -> Result<ParseResult> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Real(PathBuf::from(filename))),
        source.to_string(),
    );

    let comments = SingleThreadedComments::default();

    let handler =
        Handler::with_emitter_writer(Box::new(std::io::stderr()), Some(source_map.clone()));

    let mut recovered = vec![];
    let program = swc_ecma_parser::parse_file_as_program(
        &source_file,
        Syntax::Es(EsSyntax::default()),
        EsVersion::latest(),
        Some(&comments),
        &mut recovered,
    )
    .map_err(|e| {
        e.into_diagnostic(&handler).emit();
        anyhow::anyhow!("failed to parse {filename}")
    })?;

    if !recovered.is_empty() {
        let count = recovered.len();
        for e in recovered {
            e.into_diagnostic(&handler).emit();
        }
        anyhow::bail!("failed to parse {filename}: {count} syntax error(s)");
    }

    tracing::debug!(filename, bytes = source.len(), "parsed program");

    Ok(ParseResult {
        program,
        comments,
        source_map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults_and_arrows() {
        let parsed =
            parse_program("var f = (a = 1) => a;\nfunction g(b = 2) {}", "ok.js").unwrap();
        let Program::Script(script) = parsed.program else {
            panic!("plain statements should parse as a script");
        };
        assert_eq!(script.body.len(), 2);
    }

    #[test]
    fn parses_import_as_module() {
        let parsed = parse_program("import x from 'x';\nexport default x;", "m.js").unwrap();
        assert!(matches!(parsed.program, Program::Module(_)));
    }

    #[test]
    fn reports_syntax_errors() {
        let err = parse_program("function (", "broken.js").err().unwrap();
        assert!(err.to_string().contains("broken.js"), "{err}");
    }
}
