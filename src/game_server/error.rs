//! Errors surfaced by the game server to the command layer.

use thiserror::Error;

use crate::game_server::simulation::Screen;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown racer: {0}")]
    UnknownRacer(String),
    #[error("pick a racer before starting")]
    NoRacerSelected,
    #[error("expected the {expected:?} screen, currently on {actual:?}")]
    WrongScreen { expected: Screen, actual: Screen },
    #[error("no race in progress")]
    NoActiveRace,
    #[error("invalid race config: {0}")]
    InvalidConfig(&'static str),
}
