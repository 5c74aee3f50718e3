use scacchiera::fen::{self, START_FEN};
use scacchiera::movegen;
use shakmaty::{Chess, Position};

fn perft_shakmaty(pos: &Chess, depth: u32) -> u64 {
    if depth == 0 { return 1; }
    let mut nodes = 0u64;
    for m in pos.legal_moves() {
        let mut new_pos = pos.clone();
        new_pos.play_unchecked(&m);
        nodes += perft_shakmaty(&new_pos, depth-1);
    }
    nodes
}

#[test]
fn perft_regression_starting_pos() {
    scacchiera::init();

    // prepare shakmaty pos
    let pos: Chess = Chess::default();

    let mut position = fen::parse(START_FEN).expect("parse start FEN");

    for depth in 1..=3u32 {
        let expected = perft_shakmaty(&pos, depth);
        let got = movegen::perft(&mut position, depth);
        assert_eq!(got, expected, "perft mismatch at depth {}: got {} expected {}", depth, got, expected);
    }
    // the tree walk must leave the position as it found it
    assert_eq!(fen::to_fen(&position), START_FEN);
}

#[test]
fn pseudo_legal_oracle_20_400() {
    let mut position = fen::parse(START_FEN).unwrap();
    assert_eq!(movegen::perft_pseudo(&mut position, 1), 20);
    assert_eq!(movegen::perft_pseudo(&mut position, 2), 400);
}

#[test]
fn divide_sums_to_perft() {
    let mut position = fen::parse("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let total: u64 = movegen::perft_divide(&mut position, 2).iter().map(|&(_, n)| n).sum();
    assert_eq!(total, movegen::perft(&mut position, 2));
}
