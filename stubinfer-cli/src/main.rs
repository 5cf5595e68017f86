mod logging;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::{json, Value as JsonValue};
use stubinfer_core::{
    analyze, enclosing_path, Inference, PathNode, Snapshot, SourceId, SourceMap, StubInfo,
    TypeName,
};

use crate::logging::{init_logging, LogLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "stubinfer",
    version,
    about = "Find the interface a concrete type fails to implement at a source position.",
    long_about = "Replay a recorded, type-checked snapshot and report which named interface \
                  the value at the given position is converted to, and which concrete type \
                  would need the missing methods. Exits 0 when a pair is found, 1 otherwise."
)]
struct Cli {
    /// Path to a JSON snapshot of a type-checked file.
    snapshot: PathBuf,

    /// Byte offset of the query position.
    #[arg(long, conflicts_with_all = ["line", "column"])]
    offset: Option<usize>,

    /// 1-based line of the query position.
    #[arg(long, requires = "column")]
    line: Option<usize>,

    /// 1-based byte column of the query position.
    #[arg(long, requires = "line")]
    column: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Also print the syntax path enclosing the position.
    #[arg(long)]
    show_path: bool,

    /// Log verbosity (overrides `STUBINFER_LOG`).
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let text = fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("failed to read snapshot '{}'", cli.snapshot.display()))?;
    let snapshot = Snapshot::from_json(&text)
        .with_context(|| format!("failed to load snapshot '{}'", cli.snapshot.display()))?;
    let source_map = Arc::new(snapshot.source_map());
    let pos = resolve_position(cli, &snapshot, &source_map)?;

    let path = enclosing_path(&snapshot.file, pos);
    tracing::debug!(pos, depth = path.len(), "computed enclosing path");
    let inference = analyze(&source_map, &snapshot.types, &path, pos);

    let location = Location::new(&source_map, snapshot.file.source, pos);
    match cli.format {
        OutputFormat::Text => {
            if cli.show_path {
                for node in &path {
                    let span = node.span();
                    println!("{} [{}-{}]", node.label(), span.start, span.end);
                }
            }
            print_text(&inference, &location);
        }
        OutputFormat::Json => {
            let mut output = inference_json(&inference, &location);
            if cli.show_path {
                output["path"] = path_json(&path);
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(inference.is_found())
}

fn resolve_position(cli: &Cli, snapshot: &Snapshot, source_map: &SourceMap) -> Result<usize> {
    match (cli.offset, cli.line, cli.column) {
        (Some(offset), _, _) => Ok(offset),
        (None, Some(line), Some(column)) => source_map
            .offset(snapshot.file.source, line, column)
            .with_context(|| {
                format!(
                    "position {line}:{column} is outside source #{}",
                    snapshot.file.source.0
                )
            }),
        _ => bail!("a position is required: pass --offset, or --line with --column"),
    }
}

struct Location {
    offset: usize,
    file: Option<String>,
    line_column: Option<(usize, usize)>,
}

impl Location {
    fn new(source_map: &SourceMap, source: SourceId, offset: usize) -> Self {
        Self {
            offset,
            file: source_map
                .file(source)
                .map(|file| file.path.display().to_string()),
            line_column: source_map.line_column(source, offset),
        }
    }

    fn describe(&self) -> String {
        match (&self.file, self.line_column) {
            (Some(file), Some((line, column))) => format!("{file}:{line}:{column}"),
            _ => format!("offset {}", self.offset),
        }
    }
}

fn print_text(inference: &Inference, location: &Location) {
    match inference {
        Inference::Found(stub) => {
            println!("interface: {}", stub.interface);
            println!("concrete:  {}", concrete_display(stub));
            println!("position:  {}", location.describe());
        }
        Inference::NotApplicable => {
            println!("no interface conversion found at {}", location.describe());
        }
        Inference::Inconsistent(inconsistency) => {
            println!(
                "inconsistent input at {}: {inconsistency}",
                location.describe()
            );
        }
    }
}

fn concrete_display(stub: &StubInfo) -> String {
    if stub.pointer {
        format!("*{}", stub.concrete)
    } else {
        stub.concrete.to_string()
    }
}

fn type_name_json(name: &TypeName) -> JsonValue {
    json!({
        "id": name.id.0,
        "scope": name.scope,
        "name": name.name,
    })
}

fn inference_json(inference: &Inference, location: &Location) -> JsonValue {
    let position = json!({
        "offset": location.offset,
        "file": location.file,
        "line": location.line_column.map(|(line, _)| line),
        "column": location.line_column.map(|(_, column)| column),
    });
    match inference {
        Inference::Found(stub) => json!({
            "status": "found",
            "position": position,
            "interface": type_name_json(&stub.interface),
            "concrete": type_name_json(&stub.concrete),
            "pointer": stub.pointer,
        }),
        Inference::NotApplicable => json!({
            "status": "not_applicable",
            "position": position,
        }),
        Inference::Inconsistent(inconsistency) => json!({
            "status": "inconsistent",
            "position": position,
            "detail": inconsistency.to_string(),
        }),
    }
}

fn path_json(path: &[PathNode<'_>]) -> JsonValue {
    path.iter()
        .map(|node| {
            let span = node.span();
            json!({ "node": node.label(), "start": span.start, "end": span.end })
        })
        .collect()
}
