use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use scacchiera::fen::{self, START_FEN};
use scacchiera::movegen;
use shakmaty::fen::Fen;
use shakmaty::{Chess, Position};

#[derive(Parser, Debug)]
#[command(author, version, about = "Count move-tree leaves of a position", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = String::from(START_FEN))]
    fen: String,

    #[arg(short, long, default_value_t = 4)]
    depth: u32,

    /// Print the node count below every root move
    #[arg(long)]
    divide: bool,

    /// Count pseudo-legal moves (no king-safety filter)
    #[arg(long)]
    pseudo: bool,

    /// Cross-check the legal count against shakmaty
    #[arg(long)]
    compare: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    scacchiera::init();

    let mut pos = fen::parse(&args.fen).with_context(|| format!("bad FEN '{}'", args.fen))?;
    println!("Running perft on FEN: '{}' at depth {}", args.fen, args.depth);

    if args.divide {
        let mut total = 0u64;
        for (mv, nodes) in movegen::perft_divide(&mut pos, args.depth) {
            println!("{mv}: {nodes}");
            total += nodes;
        }
        println!("\nNodes searched: {total}");
        return Ok(());
    }

    let start = Instant::now();
    let nodes = if args.pseudo {
        movegen::perft_pseudo(&mut pos, args.depth)
    } else {
        movegen::perft(&mut pos, args.depth)
    };
    let duration = start.elapsed();
    println!(
        "perft({}) = {} nodes ({} ms, {:.2} Mnps)",
        args.depth,
        nodes,
        duration.as_millis(),
        nodes as f64 / (duration.as_micros().max(1) as f64)
    );

    if args.compare {
        let reference = shakmaty_position(&args.fen)?;
        let expected = perft_shakmaty(&reference, args.depth);
        println!("Shakmaty perft({}) = {} nodes", args.depth, expected);
        if !args.pseudo && expected != nodes {
            return Err(anyhow!("mismatch: {nodes} vs shakmaty {expected}"));
        }
    }
    Ok(())
}

fn shakmaty_position(fen: &str) -> Result<Chess> {
    if fen == START_FEN {
        return Ok(Chess::default());
    }
    let fen: Fen = fen.parse().map_err(|e| anyhow!("shakmaty rejected FEN: {e}"))?;
    fen.into_position(shakmaty::CastlingMode::Standard)
        .map_err(|e| anyhow!("shakmaty rejected position: {e}"))
}

fn perft_shakmaty(pos: &Chess, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0;
    let moves = pos.legal_moves();
    for m in moves {
        let mut new_pos = pos.clone();
        new_pos.play_unchecked(&m);
        nodes += perft_shakmaty(&new_pos, depth - 1);
    }
    nodes
}
