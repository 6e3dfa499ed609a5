//! Game Server Module
//!
//! Runs the percentage quiz race in Rust: question generation, the race and
//! question clocks, scoring, and the screen flow. Communicates with the JS
//! frontend via Tauri commands.

pub mod error;
pub mod question;
pub mod race;
pub mod racer;
pub mod simulation;
pub mod timers;

pub use error::GameError;
pub use question::{Archetype, Question, QuestionGenerator};
pub use race::{Answer, EndReason, GameOver, Race, RaceConfig, RaceEvent, RaceSnapshot, RaceStatus};
pub use racer::{Racer, RacerId, Standing};
pub use simulation::{GameServer, Screen, ServerStats};
