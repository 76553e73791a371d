//! Replay a message script against a text area and print the result
//!
//! Usage:
//!   textarea-replay notes.txt script.yaml
//!   textarea-replay notes.txt script.yaml --json --height 320
//!
//! The script is a YAML list of messages (see `textarea_core::messages`).

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;

use textarea_core::error::Feedback;
use textarea_core::gutter::{GutterPaint, LayoutMode};
use textarea_core::layout::Viewport;
use textarea_core::messages::parse_script;
use textarea_core::undo::CommandState;
use textarea_core::update::update;
use textarea_core::{EditorConfig, TextArea};

#[derive(Parser, Debug)]
#[command(name = "textarea-replay", version)]
#[command(about = "Replay an edit script against a text file")]
struct Args {
    /// Initial document text
    #[arg(value_name = "TEXT_FILE")]
    text: PathBuf,

    /// YAML list of messages
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Config file (defaults to the user config)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Viewport height in pixels used for the gutter paint
    #[arg(long, default_value = "480")]
    height: f32,

    /// Print a JSON snapshot instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Snapshot {
    text: String,
    dot: usize,
    mark: usize,
    caret_line: usize,
    undo: CommandState,
    redo: CommandState,
    bookmarks: Vec<usize>,
    feedback: Vec<Feedback>,
    gutter: GutterPaint,
}

fn main() -> Result<()> {
    textarea_core::tracing::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EditorConfig::load_from(path).map_err(|e| anyhow!(e))?,
        None => EditorConfig::load(),
    };
    let text = std::fs::read_to_string(&args.text)
        .with_context(|| format!("Failed to read {}", args.text.display()))?;
    let script = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read {}", args.script.display()))?;
    let messages = parse_script(&script)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("Failed to parse {}", args.script.display()))?;

    let mut area = TextArea::new(&text, config).context("Failed to create text area")?;
    let mut feedback = Vec::new();
    for (i, msg) in messages.into_iter().enumerate() {
        let name = msg.name();
        update(&mut area, msg).with_context(|| format!("Message #{} ({}) failed", i, name))?;
        feedback.extend(area.take_feedback());
    }

    let mode = LayoutMode::Fixed(area.row_metrics());
    let gutter = area.paint_gutter(mode, Viewport::new(0.0, args.height))?;
    let snapshot = Snapshot {
        text: area.text(),
        dot: area.dot()?,
        mark: area.mark()?,
        caret_line: area.caret_line()?,
        undo: area.undo_command(),
        redo: area.redo_command(),
        bookmarks: area.bookmarks()?,
        feedback,
        gutter,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_text(&snapshot);
    }
    Ok(())
}

fn print_text(snapshot: &Snapshot) {
    println!("{}", snapshot.text);
    println!("----");
    println!(
        "caret: dot {} mark {} (line {})",
        snapshot.dot, snapshot.mark, snapshot.caret_line
    );
    println!("{} / {}", snapshot.undo.label, snapshot.redo.label);
    if !snapshot.bookmarks.is_empty() {
        println!("bookmarks: {:?}", snapshot.bookmarks);
    }
    for feedback in &snapshot.feedback {
        println!("feedback: {}", feedback.message());
    }
    println!("----");
    for cell in &snapshot.gutter.numbers {
        let marker = if cell.active { '>' } else { ' ' };
        let fold = snapshot
            .gutter
            .folds
            .iter()
            .find(|g| g.line == cell.line)
            .map(|g| format!("{:?}", g.state))
            .unwrap_or_default();
        let icon = snapshot
            .gutter
            .icons
            .iter()
            .find(|i| i.line == cell.line)
            .map(|i| i.icon.as_str())
            .unwrap_or("");
        println!("{}{:>6} {:<10} {}", marker, cell.label, fold, icon);
    }
}
