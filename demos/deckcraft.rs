//! Command-line front end for the presentation engine.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example deckcraft -- properties deck.pptx
//! cargo run --example deckcraft -- split deck.pptx -o out/
//! cargo run --example deckcraft -- slide deck.pptx 3 -o out/
//! cargo run --example deckcraft -- thumbnails deck.pptx --width 320 --format jpg -o out/
//! cargo run --example deckcraft -- merge a.pptx b.pptx --reuse-masters --name all -o out/
//! cargo run --example deckcraft -- render template.pptx -D doc.title=Report -o out/
//! ```
//!
//! Set `RUST_LOG=debug` to see what the engine does.

use clap::{Parser, Subcommand, ValueEnum};
use deckcraft::presentation::{Artifact, BackendKind, EngineConfig, MapRenderer};
use std::fs;
use std::path::{Path, PathBuf};

/// Inspect, split, merge, render and thumbnail .pptx decks
#[derive(Parser, Debug)]
#[command(name = "deckcraft", version)]
struct Args {
    /// Slide isolation strategy
    #[arg(long, value_enum, default_value = "cloning")]
    backend: BackendArg,

    /// JSON engine configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory that receives output files
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Subtractive,
    Cloning,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Subtractive => BackendKind::Subtractive,
            BackendArg::Cloning => BackendKind::Cloning,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the properties record as JSON
    Properties { deck: PathBuf },
    /// Write one deck per slide
    Split { deck: PathBuf },
    /// Write a single slide (0-based index) as a deck
    Slide { deck: PathBuf, index: usize },
    /// Write slide images
    Thumbnails {
        deck: PathBuf,
        /// Only this slide (0-based index)
        #[arg(long)]
        index: Option<usize>,
        /// Maximum image width; 0 keeps the page size
        #[arg(long, default_value_t = 0)]
        width: u32,
        /// png, jpg or jpeg
        #[arg(long)]
        format: Option<String>,
        /// Include hidden slides
        #[arg(long)]
        all: bool,
    },
    /// Concatenate decks
    Merge {
        #[arg(required = true)]
        decks: Vec<PathBuf>,
        #[arg(long)]
        reuse_masters: bool,
        #[arg(long)]
        name: Option<String>,
    },
    /// Render `${key}` expressions of a template deck
    Render {
        template: PathBuf,
        /// Binding as key=value
        #[arg(short = 'D', value_name = "KEY=VALUE")]
        define: Vec<String>,
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let backend = BackendKind::from(args.backend).backend(config);
    fs::create_dir_all(&args.output)?;

    let outputs: Vec<Artifact> = match args.command {
        Command::Properties { deck } => {
            let deck = Artifact::from_path(&deck)?;
            if let Some(record) = backend.properties(Some(&deck))? {
                println!("{}", record.to_json_pretty()?);
            }
            Vec::new()
        },
        Command::Split { deck } => backend.split(Some(&Artifact::from_path(&deck)?))?,
        Command::Slide { deck, index } => backend
            .get_slide(Some(&Artifact::from_path(&deck)?), index)?
            .into_iter()
            .collect(),
        Command::Thumbnails { deck, index, width, format, all } => {
            let deck = Artifact::from_path(&deck)?;
            match index {
                Some(index) => backend
                    .thumbnail(Some(&deck), index, width, format.as_deref())?
                    .into_iter()
                    .collect(),
                None => backend.thumbnails(Some(&deck), width, format.as_deref(), !all)?,
            }
        },
        Command::Merge { decks, reuse_masters, name } => {
            let decks = decks
                .iter()
                .map(Artifact::from_path)
                .collect::<Result<Vec<_>, _>>()?;
            backend
                .merge(Some(&decks), reuse_masters, name.as_deref())?
                .into_iter()
                .collect()
        },
        Command::Render { template, define, name } => {
            let bindings: MapRenderer = define
                .iter()
                .filter_map(|pair| pair.split_once('='))
                .collect();
            backend
                .render_template(Some(&Artifact::from_path(&template)?), &bindings, name.as_deref())?
                .into_iter()
                .collect()
        },
    };

    for artifact in &outputs {
        write_artifact(&args.output, artifact)?;
    }
    Ok(())
}

fn write_artifact(dir: &Path, artifact: &Artifact) -> Result<(), Box<dyn std::error::Error>> {
    let path = dir.join(artifact.file_name().unwrap_or("output.bin"));
    artifact.save(&path)?;
    println!("{} ({} bytes)", path.display(), artifact.len());
    Ok(())
}
