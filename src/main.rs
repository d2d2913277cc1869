//! Command-line interface for enlace-rs
//!
//! Usage:
//!   enlace characters <DOC>
//!   enlace network <DOC> --title <TITLE> [--window 15] [--centrality betweenness] [--walk-length 4] [--out DIR]
//!   enlace emotions <DOC> --lexicon <FILE> [--per-chapter] [--emotions joy,fear]
//!
//! `<DOC>` is an annotated document in JSON, as produced by the annotation
//! pipeline.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use enlace::export::{self, EdgeType};
use enlace::lexicon::parse_emotions;
use enlace::graph::DEFAULT_WALK_LENGTH;
use enlace::{
    analyse_network, analysis_emotion, build_network, Centrality, ChapterAlignment,
    CharacterExtractor, CharacterSet, Document, Emotion, EmotionConfig, EmotionLexicon,
    ExtractionConfig, GraphConfig, NetworkConfig, DEFAULT_WINDOW_SIZE,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "enlace",
    version,
    about = "Character networks and emotion analysis for annotated narrative text"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the characters found in a document
    Characters {
        /// Annotated document (JSON)
        doc: PathBuf,
        /// Print as a JSON array
        #[arg(short, long)]
        json: bool,
        /// Keep names that look like initials
        #[arg(long)]
        keep_initials: bool,
    },
    /// Build the character network and write edge/vertex tables for its
    /// giant component
    Network {
        /// Annotated document (JSON)
        doc: PathBuf,
        /// Book title, used for the output directory and file names
        #[arg(short, long)]
        title: String,
        /// Tokens scanned after each character mention
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_SIZE)]
        window: usize,
        /// Centrality measure written to the Size column (betweenness, page_rank)
        #[arg(short, long, default_value_t = Centrality::Betweenness)]
        centrality: Centrality,
        /// Random-walk length for community detection
        #[arg(long, default_value_t = DEFAULT_WALK_LENGTH)]
        walk_length: usize,
        /// Output directory
        #[arg(short, long, default_value = "save/Networks")]
        out: PathBuf,
    },
    /// Score emotions against a lexicon
    Emotions {
        /// Annotated document (JSON)
        doc: PathBuf,
        /// Lexicon file (word emotion value)
        #[arg(short, long)]
        lexicon: PathBuf,
        /// Score each chapter separately
        #[arg(short, long)]
        per_chapter: bool,
        /// Comma-separated emotions (default: the eight basic emotions)
        #[arg(short, long)]
        emotions: Option<String>,
        /// Do not pad chapters without an emotion with 0.0
        #[arg(long)]
        ragged: bool,
        /// Write the report as JSON into this directory instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Book title, used for the output file name
        #[arg(short, long, default_value = "book")]
        title: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("enlace={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_document(path: &Path) -> Option<Document> {
    match Document::from_path(path) {
        Ok(doc) => Some(doc),
        Err(e) => {
            eprintln!("Error reading document '{}': {}", path.display(), e);
            None
        }
    }
}

fn cmd_characters(doc_path: &Path, json: bool, keep_initials: bool) -> i32 {
    let Some(doc) = load_document(doc_path) else {
        return 1;
    };

    let config = ExtractionConfig {
        initials: !keep_initials,
        ..Default::default()
    };
    let characters = CharacterSet::new(CharacterExtractor::with_config(config).extract(&doc));

    if json {
        match serde_json::to_string_pretty(&characters.display_names()) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error serializing to JSON: {}", e);
                return 1;
            }
        }
    } else {
        for name in characters.display_names() {
            println!("{}", name);
        }
    }
    0
}

fn cmd_network(doc_path: &Path, title: &str, window: usize, graph: GraphConfig, out: &Path) -> i32 {
    let Some(doc) = load_document(doc_path) else {
        return 1;
    };

    let characters = CharacterSet::new(CharacterExtractor::new().extract(&doc));
    let network = build_network(&doc, &characters, NetworkConfig { window_size: window });
    debug!(edges = network.len(), "network ready");

    let analysis = analyse_network(&characters, &network, graph);
    let vertices = match analysis.vertex_table() {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let edges = export::edge_table(&analysis.network, EdgeType::Undirected);

    let dir = out.join(title);
    let written = export::write_new(
        &dir,
        &format!("{} - vertices", title),
        "csv",
        &export::vertices_to_csv(&vertices),
    )
    .and_then(|v| {
        export::write_new(
            &dir,
            &format!("{} - edges", title),
            "csv",
            &export::edges_to_csv(&edges),
        )
        .map(|e| (v, e))
    });

    match written {
        Ok((v, e)) => {
            println!(
                "{} characters, {} edges, {} communities\n{}\n{}",
                analysis.characters.len(),
                analysis.network.len(),
                analysis.community_count(),
                v.display(),
                e.display()
            );
            0
        }
        Err(e) => {
            eprintln!("Error writing network: {}", e);
            1
        }
    }
}

fn cmd_emotions(
    doc_path: &Path,
    lexicon_path: &Path,
    per_chapter: bool,
    emotions: Option<&str>,
    ragged: bool,
    out: Option<&Path>,
    title: &str,
) -> i32 {
    // Configuration errors are reported before any analysis
    let emotions = match emotions.map(parse_emotions) {
        Some(Ok(list)) => list,
        Some(Err(e)) => {
            eprintln!("Error: {}", e);
            return 1;
        }
        None => Emotion::BASIC.to_vec(),
    };
    let lexicon = match EmotionLexicon::from_path(lexicon_path) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error reading lexicon '{}': {}", lexicon_path.display(), e);
            return 1;
        }
    };
    let Some(doc) = load_document(doc_path) else {
        return 1;
    };

    let config = EmotionConfig {
        emotions,
        per_chapter,
        alignment: if ragged {
            ChapterAlignment::Ragged
        } else {
            ChapterAlignment::ZeroFill
        },
    };
    let report = match analysis_emotion(&doc, &lexicon, config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if let Some(dir) = out {
        match export::write_json(dir, &format!("Emotions - {}", title), &report) {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                eprintln!("Error writing report: {}", e);
                return 1;
            }
        }
    } else {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing to JSON: {}", e);
                return 1;
            }
        }
    }
    0
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Commands::Characters {
            doc,
            json,
            keep_initials,
        } => cmd_characters(&doc, json, keep_initials),
        Commands::Network {
            doc,
            title,
            window,
            centrality,
            walk_length,
            out,
        } => cmd_network(
            &doc,
            &title,
            window,
            GraphConfig {
                centrality,
                walk_length,
            },
            &out,
        ),
        Commands::Emotions {
            doc,
            lexicon,
            per_chapter,
            emotions,
            ragged,
            out,
            title,
        } => cmd_emotions(
            &doc,
            &lexicon,
            per_chapter,
            emotions.as_deref(),
            ragged,
            out.as_deref(),
            &title,
        ),
    };
    std::process::exit(code);
}
