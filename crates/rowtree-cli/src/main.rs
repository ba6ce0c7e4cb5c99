//! rowtree CLI: build schemas from YAML, show their hierarchy, run Cut over
//! row fixtures.

use clap::{Parser, Subcommand};
use rowtree_core::prelude::{Registry, RegistryConfig, Row, Scalar};
use rowtree_dsl::yaml::row_fields;
use rowtree_dsl::{parse_document, ParsedSchema, SchemaConfig};
use rowtree_operators::{Cut, RowSource, RowSourceExt, Scan};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rowtree")]
#[command(about = "rowtree: row-type hierarchies and the Cut operator", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a schema file and report the first error, if any
    Validate {
        /// Path to the schema YAML file
        #[arg(short, long)]
        schema: PathBuf,

        /// Maximum path depth (overrides env and file)
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Print the row-type hierarchy of a schema file
    Explain {
        /// Path to the schema YAML file
        #[arg(short, long)]
        schema: PathBuf,

        /// Maximum path depth (overrides env and file)
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Run the file's rows through a Cut and print the survivors as JSON lines
    Cut {
        /// Path to the schema YAML file
        #[arg(short, long)]
        schema: PathBuf,

        /// Row type to cut at
        #[arg(long)]
        at: String,

        /// Maximum path depth (overrides env and file)
        #[arg(long)]
        max_depth: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Validate { schema, max_depth } => {
            validate_schema(&schema, max_depth).map(|()| println!("✓ Schema is valid"))
        }
        Commands::Explain { schema, max_depth } => explain_schema(&schema, max_depth),
        Commands::Cut {
            schema,
            at,
            max_depth,
        } => cut_rows(&schema, &at, max_depth),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("rowtree=debug,rowtree_core=debug,rowtree_operators=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Env defaults, then the file's `config` block, then command-line flags.
fn load_schema(
    path: &Path,
    max_depth: Option<usize>,
) -> Result<ParsedSchema, Box<dyn std::error::Error>> {
    let yaml_content = fs::read_to_string(path)?;
    let doc = parse_document(&yaml_content)?;

    let mut config = RegistryConfig::from_env();
    apply_schema_config(&mut config, &doc.config, max_depth);
    tracing::debug!(?config, schema = %path.display(), "building schema");

    Ok(doc.build(config)?)
}

fn apply_schema_config(cfg: &mut RegistryConfig, doc: &SchemaConfig, max_depth: Option<usize>) {
    doc.apply(cfg);
    if let Some(max) = max_depth {
        cfg.max_depth = Some(max);
    }
}

fn validate_schema(
    path: &Path,
    max_depth: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let _ = load_schema(path, max_depth)?;
    Ok(())
}

fn explain_schema(
    path: &Path,
    max_depth: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = load_schema(path, max_depth)?;
    let registry = &parsed.registry;

    println!("Row Types ({})", registry.len());
    println!("==========");
    for line in explain_lines(registry) {
        println!("{}", line);
    }
    println!();
    println!("Fixture rows: {}", parsed.rows.len());
    Ok(())
}

fn explain_lines(registry: &Registry) -> Vec<String> {
    registry
        .iter()
        .map(|t| {
            let indent = "  ".repeat(t.depth().saturating_sub(1));
            let names = |fields: &[rowtree_core::prelude::Field]| {
                fields
                    .iter()
                    .map(|f| f.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "{}{} path={} key=[{}] value=[{}] descendants={}",
                indent,
                t,
                registry.display_path(t.path()),
                names(t.key()),
                names(t.value()),
                registry.descendants(t.id()).len()
            )
        })
        .collect()
}

fn cut_rows(
    path: &Path,
    at: &str,
    max_depth: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = load_schema(path, max_depth)?;
    let registry = parsed.registry.freeze();

    let mut cut = Cut::by_name(Scan::new(parsed.rows), registry.clone(), at)?;
    tracing::debug!(op = cut.name(), at, "running");
    for row in cut.rows() {
        println!("{}", render_row(&registry, &row?));
    }

    let stats = cut.stats();
    eprintln!(
        "✓ Cut at {}: {} emitted, {} suppressed",
        at, stats.emitted, stats.suppressed
    );
    Ok(())
}

fn render_row(registry: &Registry, row: &Row) -> Value {
    let mut out = Map::new();
    let Some(rowtype) = registry.get(row.rowtype) else {
        out.insert("type".into(), Value::String(row.rowtype.to_string()));
        return Value::Object(out);
    };

    let mut values = Map::new();
    for (field, v) in row_fields(rowtype).into_iter().zip(&row.values) {
        values.insert(field.name.clone(), scalar_json(v));
    }
    out.insert("type".into(), Value::String(rowtype.name().to_string()));
    out.insert("values".into(), Value::Object(values));
    Value::Object(out)
}

fn scalar_json(v: &Scalar) -> Value {
    match v {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::I32(i) => Value::from(*i),
        Scalar::I64(i) => Value::from(*i),
        Scalar::F32(f) => Value::from(*f as f64),
        Scalar::F64(f) => Value::from(*f),
        Scalar::Str(s) => Value::String(s.clone()),
        Scalar::Bin(b) => Value::from(b.clone()),
    }
}
