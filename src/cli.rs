use clap::{Parser, Subcommand};
use serde_json::json;

use crate::path::{CaptureDest, PartKind, PathPart, UrlPath};
use crate::sanitize::lossy_text;

#[derive(Parser)]
#[command(name = "routegen")]
#[command(about = "routegen endpoint planning CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse URL-path annotations and dump the part breakdown as JSON
    ParsePath {
        /// One or more annotated URL paths
        paths: Vec<String>,
    },
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::ParsePath { paths } => {
            for arg in paths {
                println!("{}", serde_json::to_string_pretty(&describe_path(arg))?);
            }
            Ok(())
        }
    }
}

fn describe_path(arg: &str) -> serde_json::Value {
    match UrlPath::parse(arg) {
        Ok(path) => json!({
            "arg": arg,
            "raw_path": path.raw_text(),
            "canonical_path": path.canonical_path(),
            "parts": path.parts.iter().map(part_json).collect::<Vec<_>>(),
        }),
        Err(err) => json!({
            "arg": arg,
            "error": err.to_string(),
        }),
    }
}

fn part_json(part: &PathPart) -> serde_json::Value {
    match &part.kind {
        PartKind::Fixed { bytes } => json!({
            "type": "fixed",
            "raw": lossy_text(&part.raw),
            "bytes": lossy_text(bytes),
        }),
        PartKind::Capture {
            name,
            pattern,
            dest,
        } => json!({
            "type": "capture",
            "raw": lossy_text(&part.raw),
            "name": name,
            "pattern": pattern.canonical_text(),
            "dest": dest_json(dest),
        }),
    }
}

fn dest_json(dest: &CaptureDest) -> serde_json::Value {
    match dest {
        CaptureDest::Field { dotted_name, .. } => json!({
            "field": dotted_name,
        }),
        CaptureDest::Setter {
            func_name,
            arg0_type,
            extra_args,
        } => json!({
            "setter": func_name,
            "arg0_type": arg0_type,
            "extra_args": extra_args,
        }),
        CaptureDest::HandlerParam { name, type_name } => json!({
            "handler_param": name,
            "type": type_name,
        }),
    }
}
