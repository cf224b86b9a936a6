//! CLI tool for batch conversion
//!
//! Reads one JSON batch array on stdin and writes the converted batch to
//! stdout, record by record.
//!
//! # Usage
//!
//! ```bash
//! # Convert a batch with the default field names
//! cimrdf_convert < batch.json > converted.json
//!
//! # The entity array lives under a model-specific field
//! cimrdf_convert --entity-field cim:Model.all < batch.json
//! ```

use cimrdf_core::{ModelTransformer, TransformOptions};
use cimrdf_server::{init_logging, TelemetryConfig};
use clap::Parser;
use std::io::{self, BufWriter};

/// Convert JSON entity batches to records carrying CIM RDF/XML documents
#[derive(Parser, Debug)]
#[command(name = "cimrdf-convert")]
#[command(about = "Convert JSON entity batches to CIM RDF/XML")]
struct Args {
    /// Record field holding the entity array
    #[arg(long, env = "CIMRDF_ENTITY_FIELD", default_value = "json")]
    entity_field: String,

    /// Record field receiving the rendered document
    #[arg(long, env = "CIMRDF_OUTPUT_FIELD", default_value = "xml")]
    output_field: String,

    /// Record field optionally carrying a per-record namespace map
    #[arg(long, env = "CIMRDF_NAMESPACE_FIELD", default_value = "ns")]
    namespace_field: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&TelemetryConfig::with_level(&args.log_level));

    let options = TransformOptions {
        entity_field: args.entity_field,
        output_field: args.output_field,
        namespace_field: args.namespace_field,
        ..TransformOptions::default()
    };
    let transformer = ModelTransformer::new(options);

    let stdin = io::stdin();
    let stdout = io::stdout();
    transformer.convert(stdin.lock(), BufWriter::new(stdout.lock()))?;
    Ok(())
}
