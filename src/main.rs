//! Scacchiera command line: load a position, play moves, report the result.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use scacchiera::board::PieceInfo;
use scacchiera::eval::MaterialScore;
use scacchiera::fen::START_FEN;
use scacchiera::{Color, Game, GameStatus};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect a chess position or play a move list", long_about = None)]
struct Args {
    /// Starting FEN position
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,

    /// Moves in coordinate notation, e.g. e2e4 e7e5 g1f3
    #[arg(short, long, num_args = 1..)]
    moves: Vec<String>,

    /// Take back this many moves after playing the list
    #[arg(long, default_value_t = 0)]
    undo: usize,

    /// List legal moves for 'w' or 'b' instead of the side to move
    #[arg(long)]
    side: Option<String>,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    fen: String,
    side_to_move: Color,
    status: GameStatus,
    in_check: bool,
    material: MaterialScore,
    history: Vec<String>,
    legal_moves: BTreeMap<String, Vec<String>>,
    pieces: Vec<PieceInfo>,
}

fn parse_side(text: &str) -> Result<Color> {
    match text.to_lowercase().as_str() {
        "w" | "white" => Ok(Color::White),
        "b" | "black" => Ok(Color::Black),
        _ => anyhow::bail!("Invalid side: use 'w' or 'b'"),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    scacchiera::init();

    let mut game = Game::from_fen(&args.fen).with_context(|| format!("cannot load FEN '{}'", args.fen))?;
    for text in &args.moves {
        game.play_uci(text)
            .with_context(|| format!("move {} rejected in {}", text, game.fen()))?;
    }
    if args.undo > 0 {
        let done = game.undo_move(args.undo);
        log::info!("took back {done} of {} moves", args.undo);
    }

    let side = args.side.as_deref().map(parse_side).transpose()?;
    let report = Report {
        fen: game.fen(),
        side_to_move: game.side_to_move(),
        status: game.status(),
        in_check: game.is_in_check(),
        material: game.material_advantage(),
        history: game.history_moves(),
        legal_moves: game.all_legal_moves(side),
        pieces: game.snapshot(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("FEN:      {}", report.fen);
    println!("To move:  {}", report.side_to_move);
    println!("Status:   {:?}", report.status);
    println!("Material: w {:+} / b {:+}", report.material.w, report.material.b);
    if !report.history.is_empty() {
        println!("History:  {}", report.history.join(" "));
    }
    let count: usize = report.legal_moves.values().map(Vec::len).sum();
    println!("Legal moves ({count}):");
    for (from, targets) in &report.legal_moves {
        println!("  {from}: {}", targets.join(" "));
    }
    Ok(())
}
