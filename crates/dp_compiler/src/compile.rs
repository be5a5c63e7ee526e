//! `compile` and `compile_stream`: the text-level interfaces.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use dp_ast::CompileOptions;
use dp_desugar::transform;
use dp_parser::parse_program;

use crate::emit::print;

/// Generated code and, when a map name was given, the source map JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub code: String,
    pub map: Option<String>,
}

/// Compile ES2015+ source, replacing arrow functions and default parameters
/// with their ES5 equivalents.
///
/// ```
/// use dp_ast::CompileOptions;
///
/// let out = dp_compiler::compile(
///     "function add(a = 0, b = 0) { return a + b; }",
///     &CompileOptions::default(),
/// )
/// .unwrap();
/// assert!(out.code.contains("arguments[1] !== void 0 ? arguments[1] : 0"));
/// ```
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompileOutput> {
    let filename = options.file_name();
    let parsed = parse_program(source, filename)?;

    let program = match transform(parsed.program) {
        Ok(program) => program,
        Err(err) => {
            let loc = parsed.source_map.lookup_char_pos(err.span().lo);
            let location = format!("{filename}:{}:{}", loc.line, loc.col_display + 1);
            return Err(anyhow::Error::new(err).context(location));
        }
    };

    let printed = print(
        &program,
        &parsed.source_map,
        Some(&parsed.comments),
        options.wants_source_map(),
    )?;

    let map = match (printed.map, &options.source_map_name) {
        (Some(map), Some(name)) => Some(name_source_map(&map, name)?),
        (map, _) => map,
    };

    tracing::debug!(filename, bytes = printed.code.len(), "compiled");

    Ok(CompileOutput {
        code: printed.code,
        map,
    })
}

/// Buffer `input` to the end, compile it once, and write the code as a
/// single chunk.
pub fn compile_stream<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    options: &CompileOptions,
) -> Result<()> {
    let mut source = String::new();
    input
        .read_to_string(&mut source)
        .context("failed to read input stream")?;

    let compiled = compile(&source, options)?;

    output
        .write_all(compiled.code.as_bytes())
        .context("failed to write output stream")?;
    output.flush()?;
    Ok(())
}

/// Set the map's `file` field to `name`.
fn name_source_map(map: &str, name: &str) -> Result<String> {
    let mut json: serde_json::Value =
        serde_json::from_str(map).context("generated source map is not JSON")?;
    if let Some(fields) = json.as_object_mut() {
        fields.insert("file".to_string(), serde_json::Value::from(name));
    }
    Ok(serde_json::to_string(&json)?)
}
