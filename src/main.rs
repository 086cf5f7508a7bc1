//! Vanadiel CLI - Command-line tool for Final Fantasy XI resource extraction.
//!
//! This is the main entry point for the Vanadiel command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vanadiel::dat::{parse_items, DataBlock};
use vanadiel::model::json::to_json;
use vanadiel::prelude::*;

/// Vanadiel - Final Fantasy XI resource extraction tool
#[derive(Parser)]
#[command(name = "vanadiel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract items, spells, abilities, zones and buffs
    Extract {
        /// Game installation directory
        #[arg(short, long, env = "VANADIEL_INSTALL_DIR")]
        install_dir: PathBuf,

        /// Output directory
        #[arg(short, long, env = "VANADIEL_OUTPUT", default_value = "resources")]
        output: PathBuf,

        /// Fixes document applied after extraction
        #[arg(short, long, env = "VANADIEL_FIXES")]
        fixes: Option<PathBuf>,

        /// Also write JSON next to the Lua files
        #[arg(long)]
        json: bool,
    },

    /// Extract zone map images as PNG
    Maps {
        /// Game installation directory
        #[arg(short, long, env = "VANADIEL_INSTALL_DIR")]
        install_dir: PathBuf,

        /// Output directory
        #[arg(short, long, env = "VANADIEL_OUTPUT", default_value = "resources/maps")]
        output: PathBuf,

        /// Map lookup table
        #[arg(short, long, default_value = "MapDats.json")]
        lut: PathBuf,
    },

    /// Decode a single DAT file and print it as JSON
    Dump {
        /// File id (decimal or 0x hex) or path to a DAT file
        input: String,

        /// Game installation directory, needed when INPUT is a file id
        #[arg(short, long, env = "VANADIEL_INSTALL_DIR")]
        install_dir: Option<PathBuf>,

        /// How to decode the file
        #[arg(short, long, value_enum, default_value_t = DumpKind::Strings)]
        kind: DumpKind,

        /// String table field mapping as INDEX=KEY (repeatable)
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(usize, String)>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpKind {
    /// DMsg, dialog or auto-translate string table
    Strings,
    /// Spell and ability container
    Container,
    /// Item file
    Items,
}

fn parse_field(s: &str) -> std::result::Result<(usize, String), String> {
    let (index, key) = s
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=KEY, got {s:?}"))?;
    let index = index
        .parse()
        .map_err(|e| format!("invalid field index {index:?}: {e}"))?;
    Ok((index, key.to_owned()))
}

fn parse_file_id(s: &str) -> Option<u32> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "vanadiel=info",
        1 => "vanadiel=debug",
        _ => "vanadiel=trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract {
            install_dir,
            output,
            fixes,
            json,
        } => {
            cmd_extract(&install_dir, &output, fixes, json)?;
        }
        Commands::Maps {
            install_dir,
            output,
            lut,
        } => {
            cmd_maps(&install_dir, &output, &lut)?;
        }
        Commands::Dump {
            input,
            install_dir,
            kind,
            fields,
        } => {
            cmd_dump(&input, install_dir.as_deref(), kind, &fields)?;
        }
    }

    Ok(())
}

fn cmd_extract(install_dir: &Path, output: &Path, fixes: Option<PathBuf>, json: bool) -> Result<()> {
    println!("Opening installation: {}", install_dir.display());
    let install = InstallDir::open(install_dir).context("Failed to open installation directory")?;

    let mut steps = Step::ALL.len() as u64;
    let mut extractor = Extractor::new(&install);
    match fixes {
        Some(path) => extractor = extractor.with_fixes(path),
        None => steps -= 1,
    }

    let start = Instant::now();
    let pb = progress_bar(steps)?;
    let (model, report) = extractor.run_with(|step| {
        pb.set_message(step.name());
        pb.inc(1);
    });
    pb.finish_with_message("Done");

    let mut formats = vec![OutputFormat::Lua];
    if json {
        formats.push(OutputFormat::Json);
    }
    let written = write_model(&model, output, &formats).context("Failed to write resources")?;

    for step in report.steps() {
        match &step.outcome {
            Ok(count) => println!("{:>24}: {:>6} in {:?}", step.step, count, step.elapsed),
            Err(e) => println!("{:>24}: failed ({})", step.step, e),
        }
    }
    println!(
        "Wrote {} files to {} in {:?}",
        written.len(),
        output.display(),
        start.elapsed()
    );

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!("{failed} extraction step(s) failed");
    }

    Ok(())
}

fn cmd_maps(install_dir: &Path, output: &Path, lut: &Path) -> Result<()> {
    let install = InstallDir::open(install_dir).context("Failed to open installation directory")?;
    let maps = MapExtractor::open(&install, lut)
        .with_context(|| format!("Failed to read map lookup {}", lut.display()))?;

    fs::create_dir_all(output)?;
    println!("Extracting {} maps...", maps.entries().len());

    let start = Instant::now();
    let pb = progress_bar(maps.entries().len() as u64)?;
    let mut saved = 0;
    let mut errors = 0;

    for entry in maps.entries() {
        match maps.save(entry, output) {
            Ok(_) => saved += 1,
            Err(e) => {
                pb.suspend(|| eprintln!("Error extracting {}: {}", entry.file_name(), e));
                errors += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!("Saved {} maps in {:?} ({} errors)", saved, start.elapsed(), errors);

    Ok(())
}

fn cmd_dump(input: &str, install_dir: Option<&Path>, kind: DumpKind, fields: &[(usize, String)]) -> Result<()> {
    let data = match parse_file_id(input) {
        Some(file_id) => {
            let install_dir = install_dir.context("A file id needs --install-dir")?;
            let install = InstallDir::open(install_dir).context("Failed to open installation directory")?;
            install.read(file_id)?
        }
        None => fs::read(input).with_context(|| format!("Failed to read {input}"))?,
    };
    tracing::debug!(input, len = data.len(), "read DAT file");

    let collections = match kind {
        DumpKind::Strings => {
            let mut fields: Vec<(usize, &str)> = fields.iter().map(|(i, k)| (*i, k.as_str())).collect();
            if fields.is_empty() {
                fields.push((0, "en"));
            }
            let records = parse_dat(&data, &fields).context("Failed to decode string table")?;
            vec![RecordCollection::from_records("strings", records)]
        }
        DumpKind::Container => {
            let walk = walk(&data).context("Failed to walk container")?;
            let mut spells = RecordCollection::new("spells");
            let mut abilities = RecordCollection::new("abilities");
            for block in walk.blocks {
                match block {
                    DataBlock::Spells(records) => spells.extend(records),
                    DataBlock::Abilities(records) => abilities.extend(records),
                }
            }
            vec![spells, abilities]
        }
        DumpKind::Items => {
            let records = parse_items(&[data.as_slice()]).context("Failed to decode items")?;
            vec![RecordCollection::from_records("items", records)]
        }
    };

    for collection in &collections {
        println!("{}", to_json(collection)?);
    }

    Ok(())
}
