//! Territorial wars: the round-by-round combat state machine

pub mod engine;

pub use engine::{
    find_ongoing_war_at, resolve_round, RoundOutcome, War, WarState, BATTLE_SCORE_DELTA,
    VICTORY_SCORE,
};
