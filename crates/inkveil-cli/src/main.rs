use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use inkveil_core::storage::{FileStorage, Storage};
use inkveil_core::{Document, FORMAT_VERSION, Item, ShapeKind, format};

/// Inspect and migrate inkveil annotation documents
#[derive(Parser, Debug)]
#[command(name = "inkveil")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the format version and item counts of a document
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Decode a document and report whether it is valid
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Rewrite a document in the current format version
    Migrate {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// List documents in a storage directory
    List {
        /// Storage directory (defaults to the platform data directory)
        #[arg(long, value_name = "DIR")]
        storage_dir: Option<PathBuf>,
    },
}

/// Item counts of a document, per kind.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    strokes: usize,
    shapes: Vec<(ShapeKind, usize)>,
    next_id: u64,
}

impl Summary {
    fn of(document: &Document) -> Self {
        let mut summary = Summary {
            next_id: document.next_id,
            ..Default::default()
        };
        for kind in ShapeKind::ALL {
            let count = document.shapes().filter(|s| s.kind == kind).count();
            if count > 0 {
                summary.shapes.push((kind, count));
            }
        }
        summary.strokes = document.items.iter().filter(|i| matches!(i, Item::Stroke(_))).count();
        summary
    }
}

fn read_document(path: &Path) -> Result<(u32, Document)> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let version = format::peek_version(&bytes)
        .with_context(|| format!("{} is not an inkveil document", path.display()))?;
    let document =
        format::decode(&bytes).with_context(|| format!("failed to decode {}", path.display()))?;
    Ok((version, document))
}

fn info(path: &Path) -> Result<()> {
    let (version, document) = read_document(path)?;
    let summary = Summary::of(&document);

    println!("file:           {}", path.display());
    println!("format version: {}", version);
    println!("items:          {}", document.len());
    println!("  strokes:      {}", summary.strokes);
    for (kind, count) in &summary.shapes {
        println!("  {:<13} {}", format!("{}:", kind.name()), count);
    }
    println!("next id:        {}", summary.next_id);
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let (version, document) = read_document(path)?;
    if version < FORMAT_VERSION {
        log::info!("{} uses format version {}; run migrate to upgrade", path.display(), version);
    }
    println!("{}: ok ({} items)", path.display(), document.len());
    Ok(())
}

fn migrate(input: &Path, output: &Path) -> Result<()> {
    let (version, document) = read_document(input)?;
    let bytes = format::encode(&document).context("failed to encode document")?;
    fs::write(output, bytes).with_context(|| format!("failed to write {}", output.display()))?;
    log::info!(
        "Migrated {} from format version {} to {}",
        input.display(),
        version,
        FORMAT_VERSION
    );
    println!("{} -> {} (format version {})", input.display(), output.display(), FORMAT_VERSION);
    Ok(())
}

fn list(storage_dir: Option<PathBuf>) -> Result<()> {
    let storage = match storage_dir {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    let ids = storage.list()?;
    if ids.is_empty() {
        log::info!("No documents in {}", storage.base_path().display());
    }
    for id in ids {
        println!("{}", id);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Command::Info { file } => info(&file),
        Command::Check { file } => check(&file),
        Command::Migrate { input, output } => {
            if input == output {
                bail!("refusing to overwrite the input file; choose a different output");
            }
            migrate(&input, &output)
        }
        Command::List { storage_dir } => list(storage_dir),
    };

    if let Err(e) = &result {
        log::error!("{:#}", e);
    }
    result
}
