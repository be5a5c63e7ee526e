use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dp_ast::{CompileOptions, ANONYMOUS_SOURCE};
use dp_compiler::{compile, compile_stream};
use dp_parser::parse_program;

#[derive(Parser)]
#[command(name = "dp", about = "defparam — compile ES6 default parameters and arrow functions to ES5")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Desugar arrow functions and default parameters and emit ES5.
    Compile {
        /// Input .js file (stdin if omitted).
        input: Option<PathBuf>,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Generate a source map next to the output.
        #[arg(long)]
        source_map: bool,
        /// Source name recorded in diagnostics and the source map.
        #[arg(long)]
        source_file_name: Option<String>,
    },
    /// Parse the file and report any syntax errors.
    Check { input: PathBuf },
    /// Parse and dump the AST.
    Parse {
        input: PathBuf,
        /// Dump as JSON instead of the debug representation.
        #[arg(long)]
        ast: bool,
    },
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            input,
            output,
            source_map,
            source_file_name,
        } => {
            let filename = source_file_name
                .or_else(|| input.as_ref().map(|path| path.display().to_string()))
                .unwrap_or_else(|| ANONYMOUS_SOURCE.to_string());

            let map_path = if source_map {
                Some(match &output {
                    Some(path) => format!("{}.map", path.display()),
                    None => format!("{filename}.map"),
                })
            } else {
                None
            };

            let mut options = CompileOptions::default().with_source_file_name(filename);
            options.source_map_name = map_path.clone();

            // Plain stdin-to-stdout runs go through the streaming interface.
            if input.is_none() && output.is_none() && map_path.is_none() {
                return compile_stream(std::io::stdin().lock(), std::io::stdout().lock(), &options);
            }

            let source = match &input {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };

            let compiled = compile(&source, &options)?;

            match &output {
                Some(path) => std::fs::write(path, &compiled.code)?,
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(compiled.code.as_bytes())?;
                    stdout.flush()?;
                }
            }

            if let (Some(map_path), Some(map)) = (map_path, compiled.map) {
                std::fs::write(&map_path, map)?;
                eprintln!("Source map written to {map_path}");
            }
        }
        Commands::Check { input } => {
            let source = std::fs::read_to_string(&input)?;
            let filename = input.display().to_string();

            parse_program(&source, &filename)?;
            eprintln!("OK: {filename}");
        }
        Commands::Parse { input, ast } => {
            let source = std::fs::read_to_string(&input)?;
            let filename = input.display().to_string();

            let parsed = parse_program(&source, &filename)?;

            if ast {
                let json = serde_json::to_string_pretty(&parsed.program)?;
                println!("{json}");
            } else {
                println!("{:#?}", parsed.program);
            }
        }
    }

    Ok(())
}
