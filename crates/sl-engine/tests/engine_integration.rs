//! End-to-end engine behavior against loaded configurations

use std::sync::Arc;

use approx::assert_relative_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;
use sl_engine::{
    ConfigError, GameConfig, GameDefinition, GameMode, SessionOptions, SlotEngine, SymbolWindow,
    WinKind,
};

const SAMPLE_GAME: &str = include_str!("../../../configs/sample_game.json");

fn sample_game() -> Arc<GameDefinition> {
    Arc::new(GameConfig::from_json(SAMPLE_GAME).unwrap().build().unwrap())
}

/// The sample game's 20 line patterns over a 5x3 window
fn twenty_line_rows() -> Vec<Vec<usize>> {
    GameConfig::from_json(SAMPLE_GAME).unwrap().base.paylines
}

#[test]
fn test_sample_game_loads() {
    let game = sample_game();
    assert_eq!(game.base().line_count(), 20);
    assert_eq!(game.base().reel_sets.sets().len(), 2);
    assert_eq!(game.base().window_height, 3);

    let free = game.freespins().unwrap();
    assert!(free.collection.tags_values());
    assert_eq!(free.collection.threshold, 6);
    assert_eq!(free.collection.values.as_ref().unwrap().values().len(), 5);
    assert_eq!(free.extra["volatilityTag"], "medium");
    assert!(game.symbol_names().contains(&"SCATTER".to_string()));
}

#[test]
fn test_middle_row_line_contribution() {
    let config = json!({
        "base": {
            "symbols": { "P1": {}, "X": {}, "Y": {} },
            "reel_sets": [ { "reels": [["P1"], ["P1"], ["P1"], ["P1"], ["P1"]], "weight": 1 } ],
            "paylines": twenty_line_rows(),
            "paytable": { "P1": { "5": 50 } },
            "window_height": 3
        }
    });
    let game = Arc::new(GameConfig::from_json(&config.to_string()).unwrap().build().unwrap());
    let engine = SlotEngine::with_rng(Arc::clone(&game), ChaCha8Rng::seed_from_u64(1));

    let symbols = &game.base().symbols;
    let [p1, x, y] = ["P1", "X", "Y"].map(|n| symbols.lookup(n).unwrap());
    let window = SymbolWindow::from_rows(&[
        vec![x, y, x, y, x],
        vec![p1, p1, p1, p1, p1],
        vec![y, x, y, x, y],
    ]);

    let eval = engine.scan_window(&window, 1.0);
    assert_eq!(eval.wins.len(), 1);
    assert_eq!(eval.wins[0].line_index, Some(0));
    assert_eq!(eval.wins[0].symbols.len(), 5);
    assert_relative_eq!(eval.payout, 2.5);
}

#[test]
fn test_trigger_runs_exactly_ten_free_spins() {
    let config = json!({
        "base": {
            "symbols": { "A": {}, "SC": { "is_scatter": true } },
            "reel_sets": [ { "reels": [["SC"], ["SC"], ["SC"], ["SC"], ["SC"]], "weight": 1 } ],
            "paylines": [[0, 0, 0, 0, 0]],
            "paytable": {
                "SC": { "5": { "payout": 0, "triggers": { "name": "bonus", "count": 10 } } }
            },
            "window_height": 1
        },
        "freespins": {
            "symbols": { "A": {} },
            "reel_sets": [ { "reels": [["A"], ["A"], ["A"], ["A"], ["A"]], "weight": 1 } ],
            "paylines": [[0, 0, 0, 0, 0]],
            "paytable": { "A": { "5": 4 } },
            "window_height": 1
        }
    });
    let game = Arc::new(GameConfig::from_json(&config.to_string()).unwrap().build().unwrap());
    let mut engine = SlotEngine::with_rng(game, ChaCha8Rng::seed_from_u64(7));

    let result = engine.play_session(1.0, SessionOptions::recorded());

    assert_eq!(result.spins, 11);
    assert_eq!(result.free_spins_played, 10);
    assert_eq!(result.bonus_triggered.as_ref().map(|t| t.count), Some(10));
    assert_relative_eq!(result.base, 0.0);
    assert_relative_eq!(result.bonus, 40.0);
    assert_relative_eq!(result.wins_by_symbol["A"], 40.0);
    assert!(!result.truncated);

    let opening = &result.all_spins[0];
    assert_eq!(opening.state, GameMode::Base);
    assert_eq!(opening.wins[0].kind, WinKind::Scatter);
    let award = opening.bonus_triggered.as_ref().unwrap();
    assert_eq!((award.name.as_str(), award.spins_awarded), ("bonus", 10));
    assert!(result.all_spins[1..].iter().all(|s| s.state == GameMode::FreeSpins));
    assert_eq!(engine.mode(), GameMode::Base);
}

#[test]
fn test_sample_sessions_are_consistent() {
    let game = sample_game();
    let mut engine = SlotEngine::with_rng(game, ChaCha8Rng::seed_from_u64(2024));
    let mut features = 0;

    for _ in 0..2_000 {
        let result = engine.play_session(1.0, SessionOptions::recorded());
        assert_relative_eq!(result.total, result.base + result.bonus, epsilon = 1e-9);
        assert!(result.total >= 0.0);
        assert_eq!(result.spins as usize, result.all_spins.len());
        assert_eq!(engine.mode(), GameMode::Base);

        for spin in &result.all_spins {
            let valued = spin.window.iter().flatten().any(|label| label.starts_with("CP_"));
            if valued {
                assert_eq!(spin.state, GameMode::FreeSpins);
            }
            assert!(spin.wins.iter().all(|w| w.payout >= 0.0));
        }
        if result.free_spins_played > 0 {
            features += 1;
            assert!(result.bonus_triggered.is_some());
        }
    }
    assert!(features > 0);
}

#[test]
fn test_seeded_engines_repeat() {
    let game = sample_game();
    let mut a = SlotEngine::with_rng(Arc::clone(&game), ChaCha8Rng::seed_from_u64(99));
    let mut b = SlotEngine::with_rng(game, ChaCha8Rng::seed_from_u64(99));
    for _ in 0..200 {
        assert_eq!(
            a.play_session(1.0, SessionOptions::default()),
            b.play_session(1.0, SessionOptions::default())
        );
    }
}

#[test]
fn test_unknown_reel_symbol_fails_load() {
    let broken = SAMPLE_GAME.replacen(r#""WILD": { "is_wild": true },"#, "", 1);
    let err = GameConfig::from_json(&broken).unwrap().build().unwrap_err();
    match err {
        ConfigError::UnknownSymbol { mode, symbol, .. } => {
            assert_eq!(mode, "base");
            assert_eq!(symbol, "WILD");
        }
        other => panic!("unexpected error: {other}"),
    }
}
