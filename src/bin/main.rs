//! Metadata conversion CLI
//!
//! Converts resource and aggregation metadata between flat JSON, RDF text
//! and compacted JSON-LD.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hsmeta::jsonld::{self, Encoding, JsonLdOptions};
use hsmeta::loader::{load_graph, MetadataSource};
use hsmeta::record::{
    find_root_subject, graph_from_json, json_from_graph, strip_read_only, to_wire_json, validate_json,
};
use hsmeta::schema::{json_schema, SchemaOptions};
use hsmeta::syntax::{self, RdfFormat};
use hsmeta::{record_spec, MetadataError, RecordSpec};

#[derive(Parser)]
#[command(name = "hsmeta")]
#[command(about = "Convert dataset resource metadata between flat JSON, RDF and JSON-LD")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an RDF document to pretty, compacted JSON-LD
    ToJsonld(ToJsonLdArgs),
    /// Convert flat JSON metadata to RDF
    ToRdf(ToRdfArgs),
    /// Read a record out of an RDF document as flat JSON
    FromRdf(FromRdfArgs),
    /// Validate flat JSON metadata
    Validate(ValidateArgs),
    /// Print the JSON schema of a record type
    Schema(SchemaArgs),
}

#[derive(Args)]
struct ToJsonLdArgs {
    /// RDF file, zip archive (optionally archive.zip!entry) or URL
    source: String,

    /// Read the document as this record type first, validating it
    #[arg(long = "type", value_name = "TYPE")]
    record_type: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Write UTF-16 instead of UTF-8
    #[arg(long)]
    utf16: bool,

    /// Keep internal nodes at the top level of @graph
    #[arg(long)]
    no_compact: bool,

    /// Emit an @context and shorten IRIs
    #[arg(long)]
    context: bool,
}

#[derive(Args)]
struct ToRdfArgs {
    /// Flat JSON metadata file
    input: PathBuf,

    /// Record type of the input
    #[arg(long = "type", value_name = "TYPE", default_value = "resource")]
    record_type: String,

    /// Output syntax
    #[arg(short, long, value_enum, default_value_t = Syntax::Turtle)]
    format: Syntax,

    /// Ignore read-only fields in the input
    #[arg(long)]
    untrusted: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct FromRdfArgs {
    /// RDF file, zip archive (optionally archive.zip!entry) or URL
    source: String,

    /// Record type to read
    #[arg(long = "type", value_name = "TYPE", default_value = "resource")]
    record_type: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Flat JSON metadata file
    input: PathBuf,

    /// Record type of the input
    #[arg(long = "type", value_name = "TYPE", default_value = "resource")]
    record_type: String,

    /// Ignore read-only fields in the input
    #[arg(long)]
    untrusted: bool,
}

#[derive(Args)]
struct SchemaArgs {
    /// Record type to describe
    #[arg(long = "type", value_name = "TYPE", default_value = "resource")]
    record_type: String,

    /// Annotate properties with their predicate IRIs
    #[arg(long)]
    predicates: bool,

    /// Template for $ref values, `{model}` is replaced by the type name
    #[arg(long)]
    ref_template: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Syntax {
    Turtle,
    NTriples,
    RdfXml,
}

impl From<Syntax> for RdfFormat {
    fn from(syntax: Syntax) -> Self {
        match syntax {
            Syntax::Turtle => RdfFormat::Turtle,
            Syntax::NTriples => RdfFormat::NTriples,
            Syntax::RdfXml => RdfFormat::RdfXml,
        }
    }
}

/// Write output to file or stdout
fn write_output(content: &[u8], output: Option<&PathBuf>) -> Result<(), MetadataError> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            info!(path = %path.display(), bytes = content.len(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content)?;
            if !content.ends_with(b"\n") {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<Value, MetadataError> {
    if !path.is_file() {
        return Err(MetadataError::InvalidPath(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|e| MetadataError::LoadError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn read_input(path: &Path, spec: &RecordSpec, untrusted: bool) -> Result<Value, MetadataError> {
    let value = read_json(path)?;
    Ok(if untrusted { strip_read_only(&value, spec) } else { value })
}

fn run_to_jsonld(args: ToJsonLdArgs) -> Result<(), MetadataError> {
    let source = MetadataSource::parse(&args.source);
    let mut graph = load_graph(&source)?;
    info!(triples = graph.len(), "loaded graph");

    if let Some(name) = &args.record_type {
        let spec = record_spec(name)?;
        let subject = find_root_subject(&graph, spec)?;
        let record = json_from_graph(&graph, &subject, spec)?;
        graph = graph_from_json(&Value::Object(record), spec)?;
        info!(record = spec.name, "validated record");
    }

    let options = JsonLdOptions {
        indent: args.indent,
        encoding: if args.utf16 { Encoding::Utf16 } else { Encoding::Utf8 },
        compact: !args.no_compact,
        use_context: args.context,
        ..JsonLdOptions::default()
    };
    let bytes = jsonld::to_bytes(&graph, &options)?;
    write_output(&bytes, args.output.as_ref())
}

fn run_to_rdf(args: ToRdfArgs) -> Result<(), MetadataError> {
    let spec = record_spec(&args.record_type)?;
    let input = read_input(&args.input, spec, args.untrusted)?;
    let graph = graph_from_json(&input, spec)?;
    let format = RdfFormat::from(args.format);
    info!(record = spec.name, triples = graph.len(), %format, "writing RDF");
    let bytes = syntax::write(&graph, format)?;
    write_output(&bytes, args.output.as_ref())
}

fn run_from_rdf(args: FromRdfArgs) -> Result<(), MetadataError> {
    let spec = record_spec(&args.record_type)?;
    let graph = load_graph(&MetadataSource::parse(&args.source))?;
    let subject = find_root_subject(&graph, spec)?;
    let record = json_from_graph(&graph, &subject, spec)?;
    let wire = to_wire_json(&Value::Object(record), spec);
    let text = jsonld::to_pretty_string(&wire, 2)?;
    write_output(text.as_bytes(), args.output.as_ref())
}

fn run_validate(args: ValidateArgs) -> Result<(), MetadataError> {
    let spec = record_spec(&args.record_type)?;
    let input = read_input(&args.input, spec, args.untrusted)?;
    validate_json(&input, spec)?;
    info!(record = spec.name, input = %args.input.display(), "metadata is valid");
    Ok(())
}

fn run_schema(args: SchemaArgs) -> Result<(), MetadataError> {
    let spec = record_spec(&args.record_type)?;
    let mut options = SchemaOptions {
        include_predicates: args.predicates,
        ..SchemaOptions::default()
    };
    if let Some(template) = args.ref_template {
        options.ref_template = template;
    }
    let schema = json_schema(spec, &options);
    let text = jsonld::to_pretty_string(&schema, 2)?;
    write_output(text.as_bytes(), args.output.as_ref())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::ToJsonld(args) => run_to_jsonld(args),
        Commands::ToRdf(args) => run_to_rdf(args),
        Commands::FromRdf(args) => run_from_rdf(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Schema(args) => run_schema(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
