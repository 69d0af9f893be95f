//! Integration tests: move trees built from real game notation.
//!
//! Positions in the tree are checked against positions replayed directly with
//! shakmaty.

use chess_core::{build_tree, parse_notation, MoveTree, PositionEngine, PositionKey, StandardChess};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Chess, Color, EnPassantMode, Position, Role, Square};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tree_for(notation: &str) -> MoveTree<Chess> {
    let tokens = parse_notation(notation).expect("notation should parse");
    let built = build_tree(&StandardChess, &tokens);
    assert!(built.errors.is_empty(), "unexpected errors: {:?}", built.errors);
    built.tree
}

/// Key of the position reached by playing `moves` from the start.
fn key_after(moves: &[&str]) -> PositionKey {
    let mut pos = Chess::default();
    for text in moves {
        let san: SanPlus = text.parse().expect("valid SAN");
        let mv = san.san.to_move(&pos).expect("legal move");
        pos.play_unchecked(mv);
    }
    PositionKey::from_fen(&Fen::from_position(&pos, EnPassantMode::Legal).to_string())
}

const MINIATURE: &str = r#"[Event "Live Chess"]
[Site "Chess.com"]
[White "hero"]
[Black "villain"]
[Result "1-0"]
[ECO "C41"]

1. e4 {[%clk 0:09:58]} e5 2. Nf3 d6 3. Bc4 Bg4?! (3... Nf6 4. Ng5 d5 5. exd5)
4. Nc3 g6?? 5. Nxe5! Bxd1 (5... dxe5 6. Qxg4) 6. Bxf7+ Ke7 7. Nd5# 1-0"#;

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[test]
fn test_main_line_depth_equals_ply_count() {
    let tree = tree_for("1. d4 d5 2. c4 e6 3. Nc3 Nf6 4. Bg5 Be7 5. e3 O-O");
    let end = tree.jump_to_end(tree.root());
    assert_eq!(tree.node(end).ply, 10);
    assert_eq!(tree.main_line().len(), 10);
    assert_eq!(tree.len(), 11);
    assert!(tree.walk().all(|step| step.depth == 0 && !step.is_variation));
}

#[test]
fn test_legal_mate_miniature() {
    let tree = tree_for(MINIATURE);
    assert_eq!(
        tree.main_line(),
        ["e4", "e5", "Nf3", "d6", "Bc4", "Bg4", "Nc3", "g6", "Nxe5", "Bxd1", "Bxf7+", "Ke7", "Nd5#"]
    );
    // 13 main-line plies, 4 + 2 in variations
    assert_eq!(tree.len(), 1 + 13 + 4 + 2);
}

#[test]
fn test_variations_hang_off_position_before_move() {
    let tree = tree_for(MINIATURE);

    for step in tree.walk().filter(|step| step.is_variation) {
        let node = tree.node(step.id);
        let parent = tree.node(node.parent.expect("variation has a parent"));
        let main_sibling = tree.node(parent.children[0]);

        assert_eq!(node.ply, main_sibling.ply);
        assert_eq!(tree.path_to(step.id).len(), node.ply);
    }

    // 3... Nf6 branches from the position after 3. Bc4
    let after_bc4 = tree.select_branch(tree.root(), 0).and_then(|n| {
        (0..4).try_fold(n, |id, _| tree.advance(id))
    });
    let after_bc4 = after_bc4.expect("main line reaches 3. Bc4");
    assert_eq!(tree.node(after_bc4).key, key_after(&["e4", "e5", "Nf3", "d6", "Bc4"]));
    let nf6 = tree.select_branch(after_bc4, 1).expect("3... Nf6 branch");
    assert_eq!(tree.node(nf6).move_text.as_deref(), Some("Nf6"));
    assert_eq!(tree.node(nf6).label().as_deref(), Some("3... Nf6"));
}

#[test]
fn test_every_node_matches_replayed_position() {
    let tree = tree_for(MINIATURE);
    for step in tree.walk() {
        let path = tree.path_to(step.id);
        assert_eq!(tree.node(step.id).key, key_after(&path), "at {path:?}");
    }
}

#[test]
fn test_walk_depths() {
    let tree = tree_for("1. e4 e5 (1... c5 2. Nf3 (2. c3 d5) 2... d6) 2. Nf3");
    let depths: Vec<(String, usize, bool)> = tree
        .walk()
        .skip(1)
        .map(|step| {
            let text = tree.node(step.id).move_text.clone().unwrap_or_default();
            (text, step.depth, step.is_variation)
        })
        .collect();

    let expected = [
        ("e4", 0, false),
        ("e5", 0, false),
        ("Nf3", 0, false),
        ("c5", 1, true),
        ("Nf3", 1, false),
        ("d6", 1, false),
        ("c3", 2, true),
        ("d5", 2, false),
    ];
    let expected: Vec<(String, usize, bool)> =
        expected.iter().map(|&(m, d, v)| (m.to_string(), d, v)).collect();
    assert_eq!(depths, expected);
}

#[test]
fn test_json_export_follows_tree_shape() {
    let tree = tree_for("1. e4 e5 (1... c5 2. Nf3) 2. Nf3");
    let json = tree.to_json();

    let after_e4 = &json["children"][0];
    assert_eq!(after_e4["move"], "e4");
    let replies: Vec<&str> = after_e4["children"]
        .as_array()
        .expect("children array")
        .iter()
        .filter_map(|child| child["move"].as_str())
        .collect();
    assert_eq!(replies, ["e5", "c5"]);
    assert_eq!(after_e4["children"][1]["children"][0]["ply"], 3);

    // round-trips through text
    let text = serde_json::to_string(&json).unwrap();
    let reparsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(reparsed, json);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn test_illegal_branch_is_dropped_and_tree_kept() {
    let tokens = parse_notation("1. e4 e5 (1... Qxf2 2. Kxf2) 2. Nf3 Nc6").unwrap();
    let built = build_tree(&StandardChess, &tokens);

    assert_eq!(built.errors.len(), 1);
    let error = &built.errors[0];
    assert_eq!(error.move_text, "Qxf2");
    assert_eq!(error.ply, 2);
    assert!(!error.path.is_main_line());
    assert_eq!(built.tree.main_line(), ["e4", "e5", "Nf3", "Nc6"]);
    assert_eq!(built.tree.len(), 5);
}

#[test]
fn test_malformed_notation_is_rejected() {
    assert!(parse_notation("1. e4 (e5").is_err());
    assert!(parse_notation("1. e4 e5 2. Nf3 {unterminated").is_err());
    assert!(parse_notation("( 1. e4 )").is_err());
    assert!(parse_notation("[Event \"x\"]\n\n*").is_err());
}

// ---------------------------------------------------------------------------
// Engine queries
// ---------------------------------------------------------------------------

#[test]
fn test_cursor_positions_answer_board_queries() {
    let tree = tree_for("1. e4 e5 2. Nf3 Nc6 3. Bb5");
    let engine = StandardChess;

    let mut cursor = tree.cursor();
    cursor.jump_to_end();
    let position = &cursor.node().position;
    assert_eq!(engine.side_to_move(position), Color::Black);
    assert_eq!(
        engine.piece_at(position, Square::B5).map(|p| p.role),
        Some(Role::Bishop)
    );

    assert!(cursor.retreat());
    assert_eq!(engine.piece_at(&cursor.node().position, Square::B5), None);
    cursor.jump_to_start();
    assert_eq!(cursor.current(), tree.root());
    assert!(!cursor.retreat());
}
