//! Code and source-map generation.

use anyhow::{Context, Result};
use dp_ast::{EsVersion, Program};
use swc_common::{comments::Comments, source_map::DefaultSourceMapGenConfig, sync::Lrc, SourceMap};
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};

/// Printed program text and, when requested, its source map as JSON.
pub struct Printed {
    pub code: String,
    pub map: Option<String>,
}

/// Print `program` against the source map it was parsed with.
///
/// Comments collected during parsing are re-attached by position; nodes the
/// passes synthesize carry no comments.
pub fn print(
    program: &Program,
    source_map: &Lrc<SourceMap>,
    comments: Option<&dyn Comments>,
    with_map: bool,
) -> Result<Printed> {
    let mut buf = Vec::new();
    let mut srcmap_buf = if with_map { Some(vec![]) } else { None };
    {
        let writer = JsWriter::new(source_map.clone(), "\n", &mut buf, srcmap_buf.as_mut());
        let mut emitter = Emitter {
            cfg: swc_ecma_codegen::Config::default().with_target(EsVersion::latest()),
            cm: source_map.clone(),
            comments,
            wr: writer,
        };
        program.emit_with(&mut emitter)?;
    }

    let code = String::from_utf8(buf)?;

    let map = match srcmap_buf {
        Some(srcmap_data) => {
            let srcmap =
                source_map.build_source_map(&srcmap_data, None, DefaultSourceMapGenConfig);
            let mut srcmap_json = vec![];
            srcmap
                .to_writer(&mut srcmap_json)
                .context("failed to serialize source map")?;
            Some(String::from_utf8(srcmap_json)?)
        }
        None => None,
    };

    Ok(Printed { code, map })
}
