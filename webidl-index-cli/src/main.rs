use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing::warn;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;
use webidl_index::docs::NoDocumentation;
use webidl_index::model::Kind;
use webidl_index::model::LibraryId;
use webidl_index::model::Model;
use webidl_index::model::TypeId;
use webidl_index::parse_idl;

#[derive(Parser)]
#[command(author, version, about = "Ingest WebIDL files into a cross-referenced type model")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Ingest IDL files and list the types each library declares.
  Parse(ParseArgs),
  /// List types declared by the candidate set that the baseline set does not know about.
  Compare(CompareArgs),
}

#[derive(Args)]
struct ParseArgs {
  /// `.idl` files, or directories whose `.idl` files are read (not recursively).
  #[arg(required = true)]
  paths: Vec<PathBuf>,

  /// Ingest everything into one library with this name instead of one library per file.
  #[arg(long)]
  library: Option<String>,

  /// Emit the libraries as JSON.
  #[arg(long)]
  json: bool,

  /// Emit tracing spans (JSON) on stderr.
  #[arg(long)]
  trace: bool,
}

#[derive(Args)]
struct CompareArgs {
  #[arg(long, required = true, num_args = 1..)]
  baseline: Vec<PathBuf>,

  #[arg(long, required = true, num_args = 1..)]
  candidate: Vec<PathBuf>,

  /// Emit tracing spans (JSON) on stderr.
  #[arg(long)]
  trace: bool,
}

#[derive(Serialize)]
struct JsonOutput {
  libraries: Vec<LibraryJson>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  failures: Vec<Failure>,
}

#[derive(Serialize)]
struct LibraryJson {
  name: String,
  read_only: bool,
  types: Vec<TypeJson>,
}

#[derive(Serialize)]
struct TypeJson {
  name: String,
  kind: Kind,
  #[serde(skip_serializing_if = "Option::is_none")]
  super_type: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  implements: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  constructors: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  properties: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  operations: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  literals: Vec<String>,
}

#[derive(Serialize)]
struct Failure {
  path: String,
  error: String,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  match cli.command {
    Commands::Parse(args) => run_parse(args),
    Commands::Compare(args) => run_compare(args),
  }
}

fn run_parse(args: ParseArgs) -> ExitCode {
  init_tracing(args.trace);

  let files = match collect_idl_files(&args.paths) {
    Ok(files) => files,
    Err(err) => {
      eprintln!("{err}");
      return ExitCode::FAILURE;
    }
  };

  let mut model = Model::new();
  let (libraries, failures) = ingest(&mut model, &files, args.library.as_deref());
  for failure in &failures {
    eprintln!("{}: {}", failure.path, failure.error);
  }
  let code = if failures.is_empty() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  };

  if args.json {
    let output = JsonOutput {
      libraries: libraries
        .iter()
        .map(|&lib| library_json(&model, lib))
        .collect(),
      failures,
    };
    match serde_json::to_string_pretty(&output) {
      Ok(serialized) => println!("{serialized}"),
      Err(err) => {
        eprintln!("failed to serialize JSON: {err}");
        return ExitCode::FAILURE;
      }
    }
  } else {
    for &lib in &libraries {
      let library = model.library(lib);
      println!("{}: {} types", library.name(), library.len());
      for t in library.types() {
        let ty = model.ty(t);
        println!("  {} {}", ty.kind().as_str(), ty.name());
      }
    }
  }
  code
}

fn run_compare(args: CompareArgs) -> ExitCode {
  init_tracing(args.trace);

  let (baseline_files, candidate_files) = match (
    collect_idl_files(&args.baseline),
    collect_idl_files(&args.candidate),
  ) {
    (Ok(b), Ok(c)) => (b, c),
    (Err(err), _) | (_, Err(err)) => {
      eprintln!("{err}");
      return ExitCode::FAILURE;
    }
  };

  let mut baseline = Model::new();
  let (_, baseline_failures) = ingest(&mut baseline, &baseline_files, None);
  let mut candidate = Model::new();
  let (candidate_libs, candidate_failures) = ingest(&mut candidate, &candidate_files, None);

  let missing: BTreeSet<&str> = candidate_libs
    .iter()
    .flat_map(|&lib| candidate.library(lib).type_names())
    .filter(|name| !is_declared(&baseline, name))
    .collect();
  for name in missing {
    println!("{name}");
  }

  let mut failed = false;
  for failure in baseline_failures.iter().chain(&candidate_failures) {
    eprintln!("{}: {}", failure.path, failure.error);
    failed = true;
  }
  if failed {
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  }
}

/// Placeholders synthesized for names that were only referenced do not count.
fn is_declared(model: &Model, name: &str) -> bool {
  model
    .get_type(name)
    .is_some_and(|t| model.ty(t).library() != Some(Model::HIDDEN))
}

fn init_tracing(trace: bool) {
  if trace {
    let _ = tracing_subscriber::fmt()
      .with_span_events(FmtSpan::CLOSE)
      .with_max_level(Level::TRACE)
      .json()
      .with_ansi(false)
      .with_writer(io::stderr)
      .try_init();
  } else {
    let _ = tracing_subscriber::fmt()
      .with_env_filter(EnvFilter::from_default_env())
      .with_writer(io::stderr)
      .try_init();
  }
}

/// Expands directories into the `.idl` files directly inside them, sorted by path.
fn collect_idl_files(paths: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
  let mut files = Vec::new();
  for path in paths {
    if !path.is_dir() {
      files.push(path.clone());
      continue;
    }
    let mut found = Vec::new();
    for entry in fs::read_dir(path)? {
      let entry_path = entry?.path();
      if entry_path.is_file() && entry_path.extension().is_some_and(|ext| ext == "idl") {
        found.push(entry_path);
      }
    }
    found.sort();
    files.extend(found);
  }
  Ok(files)
}

fn library_name(path: &Path) -> String {
  path
    .file_stem()
    .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
}

/// Parses every file into `model`. Files that fail are reported and skipped; with one library
/// per file the failed library is unregistered again.
fn ingest(
  model: &mut Model,
  files: &[PathBuf],
  shared: Option<&str>,
) -> (Vec<LibraryId>, Vec<Failure>) {
  let mut libraries = Vec::new();
  let mut failures = Vec::new();
  let shared = shared.map(|name| {
    let lib = model.add_library(name, true, Box::new(NoDocumentation));
    libraries.push(lib);
    lib
  });

  for path in files {
    let display_path = path.display().to_string();
    let source = match fs::read_to_string(path) {
      Ok(source) => source,
      Err(err) => {
        warn!(path = display_path.as_str(), %err, "failed to read IDL file");
        failures.push(Failure {
          path: display_path,
          error: err.to_string(),
        });
        continue;
      }
    };
    let lib = match shared {
      Some(lib) => lib,
      None => model.add_library(&library_name(path), true, Box::new(NoDocumentation)),
    };
    match parse_idl(model, lib, &source) {
      Ok(()) => {
        debug!(path = display_path.as_str(), "ingested IDL file");
        if shared.is_none() {
          libraries.push(lib);
        }
      }
      Err(err) => {
        warn!(path = display_path.as_str(), %err, "failed to parse IDL file");
        if shared.is_none() {
          model.remove_library(lib);
        }
        failures.push(Failure {
          path: display_path,
          error: err.to_string(),
        });
      }
    }
  }
  (libraries, failures)
}

fn type_json(model: &Model, t: TypeId) -> TypeJson {
  let ty = model.ty(t);
  let names = |ids: &[TypeId]| -> Vec<String> {
    ids.iter().map(|&id| model.type_name(id).to_string()).collect()
  };
  TypeJson {
    name: ty.name().to_string(),
    kind: ty.kind(),
    super_type: ty.super_type().map(|s| model.type_name(s).to_string()),
    implements: names(ty.types()),
    constructors: ty
      .constructors()
      .iter()
      .map(|&m| model.signature(m))
      .collect(),
    properties: ty.properties().map(|m| model.signature(m)).collect(),
    operations: ty.operations().map(|m| model.signature(m)).collect(),
    literals: ty.enum_literals().to_vec(),
  }
}

fn library_json(model: &Model, lib: LibraryId) -> LibraryJson {
  let library = model.library(lib);
  LibraryJson {
    name: library.name().to_string(),
    read_only: library.is_read_only(),
    types: library.types().map(|t| type_json(model, t)).collect(),
  }
}
