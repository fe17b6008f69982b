use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use entity_schema_codec::{
    NewSchemaRequest, SchemaConfig, SchemaEncoder, SchemaError, SchemaPatchCoordinator,
    detect_version, encode_new_schema, get_body, parse, require_same_id,
};
use entity_schema_core::{AliasConflictPolicy, CanonicalSchema, SchemaId, SchemaInput, TextMerger};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "schema-tool")]
#[command(about = "Encode, migrate, diff and undo entity schemas")]
#[command(version)]
struct Cli {
    /// YAML configuration with limits and language codes.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug events to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate, normalize and encode a fields document.
    Encode(EncodeArgs),
    /// Encode a new schema from single-language form fields.
    Create(CreateArgs),
    /// Print a stored schema of any version in canonical form.
    Show(InputArgs),
    /// Rewrite a stored schema in the current serialization version.
    Migrate(InputArgs),
    /// Print only the schema text of a stored schema.
    Text(InputArgs),
    /// Print the structural diff between two stored schemas.
    Diff(DiffArgs),
    /// Revert the edit FROM -> TO on top of BASE.
    Undo(UndoArgs),
    /// Restore an older revision on top of the current one.
    Restore(RestoreArgs),
    /// Three-way merge of plain text files.
    MergeText(MergeTextArgs),
}

#[derive(Debug, Args)]
struct EncodeArgs {
    /// Schema id (e.g. O123).
    #[arg(long)]
    id: String,
    /// JSON file with `labels`, `descriptions`, `aliases` and `schemaText`
    /// ("-" for stdin).
    #[arg(long)]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// Schema id (e.g. O123).
    #[arg(long)]
    id: String,
    /// Language code of label, description and aliases.
    #[arg(long)]
    language: String,
    /// Label in that language.
    #[arg(long, default_value = "")]
    label: String,
    /// Description in that language.
    #[arg(long, default_value = "")]
    description: String,
    /// Aliases separated by `|`.
    #[arg(long, default_value = "")]
    aliases: String,
    /// File holding the schema text.
    #[arg(long)]
    text_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Stored schema file ("-" for stdin).
    input: PathBuf,
}

#[derive(Debug, Args)]
struct DiffArgs {
    /// Older revision.
    old: PathBuf,
    /// Newer revision.
    new: PathBuf,
}

#[derive(Debug, Args)]
struct UndoArgs {
    /// Revision whose edit is undone.
    #[arg(long)]
    from: PathBuf,
    /// Revision the edit started from.
    #[arg(long)]
    to: PathBuf,
    /// Revision to apply the undo to, usually the latest.
    #[arg(long)]
    base: PathBuf,
    /// Fail when an alias to re-add is present or one to remove is gone.
    #[arg(long)]
    strict_aliases: bool,
}

#[derive(Debug, Args)]
struct RestoreArgs {
    /// Latest revision.
    #[arg(long)]
    current: PathBuf,
    /// Revision to restore.
    #[arg(long)]
    target: PathBuf,
}

#[derive(Debug, Args)]
struct MergeTextArgs {
    /// Common ancestor.
    #[arg(long)]
    old: PathBuf,
    /// Edited text whose changes are replayed.
    #[arg(long)]
    new: PathBuf,
    /// Text the changes are replayed onto.
    #[arg(long)]
    base: PathBuf,
}

/// Canonical view printed by `show`.
#[derive(Debug, Serialize)]
struct ShowOutput {
    #[serde(rename = "serializationVersion")]
    serialization_version: String,
    #[serde(flatten)]
    schema: CanonicalSchema,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Encode(args) => run_encode(args, cli.config.as_deref()),
        Command::Create(args) => run_create(args, cli.config.as_deref()),
        Command::Show(args) => run_show(args),
        Command::Migrate(args) => run_migrate(args, cli.config.as_deref()),
        Command::Text(args) => run_text(args),
        Command::Diff(args) => run_diff(args),
        Command::Undo(args) => run_undo(args, cli.config.as_deref()),
        Command::Restore(args) => run_restore(args, cli.config.as_deref()),
        Command::MergeText(args) => run_merge_text(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_encode(args: EncodeArgs, config: Option<&Path>) -> Result<(), String> {
    let encoder = SchemaEncoder::from_config(&load_config(config)?);
    let id = parse_id(&args.id)?;
    let raw = read_input(&args.input)?;
    let document: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| format!("Invalid fields document {}: {err}", args.input.display()))?;
    let input = SchemaInput::try_from(document)
        .map_err(|err| SchemaError::Validation(err).to_string())?;

    let text = encoder.encode(&id, &input).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn run_create(args: CreateArgs, config: Option<&Path>) -> Result<(), String> {
    let encoder = SchemaEncoder::from_config(&load_config(config)?);
    let id = parse_id(&args.id)?;
    let body = match &args.text_file {
        Some(path) => read_input(path)?,
        None => String::new(),
    };
    let request = NewSchemaRequest {
        language: args.language,
        label: args.label,
        description: args.description,
        aliases: NewSchemaRequest::split_alias_field(&args.aliases),
        body,
    };

    let text = encode_new_schema(&id, &request, &encoder).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn run_show(args: InputArgs) -> Result<(), String> {
    let text = read_input(&args.input)?;
    let version = detect_version(&text).map_err(|err| err.to_string())?;
    let schema = parse(&text).map_err(|err| err.to_string())?;
    let output = ShowOutput {
        serialization_version: version.to_string(),
        schema,
    };
    print_json(&output)
}

fn run_migrate(args: InputArgs, config: Option<&Path>) -> Result<(), String> {
    let encoder = SchemaEncoder::from_config(&load_config(config)?);
    let text = read_input(&args.input)?;
    let schema = parse(&text).map_err(|err| err.to_string())?;
    let migrated = encoder
        .encode_validated(&schema)
        .map_err(|err| err.to_string())?;
    println!("{migrated}");
    Ok(())
}

fn run_text(args: InputArgs) -> Result<(), String> {
    let text = read_input(&args.input)?;
    let body = get_body(&text).map_err(|err| err.to_string())?;
    println!("{body}");
    Ok(())
}

fn run_diff(args: DiffArgs) -> Result<(), String> {
    let old = read_input(&args.old)?;
    let new = read_input(&args.new)?;
    require_same_id(&old, &new, None).map_err(|err| err.to_string())?;

    let diff = SchemaPatchCoordinator::default()
        .diff(&old, &new)
        .map_err(|err| err.to_string())?;
    print_json(&diff)
}

fn run_undo(args: UndoArgs, config: Option<&Path>) -> Result<(), String> {
    let encoder = SchemaEncoder::from_config(&load_config(config)?);
    let from = read_input(&args.from)?;
    let to = read_input(&args.to)?;
    let base = read_input(&args.base)?;
    let policy = if args.strict_aliases {
        AliasConflictPolicy::Strict
    } else {
        AliasConflictPolicy::Lenient
    };

    let undone = SchemaPatchCoordinator::new(policy)
        .undo(&from, &to, &base)
        .map_err(|err| err.to_string())?;
    let text = encoder
        .encode_validated(&undone)
        .map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn run_restore(args: RestoreArgs, config: Option<&Path>) -> Result<(), String> {
    let encoder = SchemaEncoder::from_config(&load_config(config)?);
    let current = read_input(&args.current)?;
    let target = read_input(&args.target)?;

    let restored = SchemaPatchCoordinator::default()
        .restore(&current, &target)
        .map_err(|err| err.to_string())?;
    let text = encoder
        .encode_validated(&restored)
        .map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn run_merge_text(args: MergeTextArgs) -> Result<(), String> {
    let old = read_input(&args.old)?;
    let new = read_input(&args.new)?;
    let base = read_input(&args.base)?;

    let merged = TextMerger::merge(&old, &new, &base).map_err(|err| err.to_string())?;
    println!("{merged}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SchemaConfig, String> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            SchemaConfig::load(path)
                .map_err(|err| format!("Failed to load config {}: {err}", path.display()))
        }
        None => Ok(SchemaConfig::default()),
    }
}

fn parse_id(raw: &str) -> Result<SchemaId, String> {
    SchemaId::new(raw).map_err(|err| err.to_string())
}

fn read_input(path: &Path) -> Result<String, String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|err| format!("Failed to read {}: {err}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{json}");
    Ok(())
}
