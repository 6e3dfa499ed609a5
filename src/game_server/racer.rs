//! Racer - Player avatar and track standing
//!
//! The racer is cosmetic: it is carried through the race for display and
//! never influences scoring or questions.

use serde::{Deserialize, Serialize};

use crate::game_server::error::GameError;

/// Racer identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RacerId {
    Car,
    Animal,
    Robot,
}

/// Display data for a racer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Racer {
    pub id: RacerId,
    pub name: String,
    pub icon: String,
}

impl Racer {
    /// Racers offered on the selection screen
    pub fn roster() -> Vec<Racer> {
        [RacerId::Car, RacerId::Animal, RacerId::Robot]
            .into_iter()
            .map(Racer::from)
            .collect()
    }

    /// Look up a racer by its string id (`"car"`, `"animal"`, `"robot"`)
    pub fn find(id: &str) -> Result<Racer, GameError> {
        Self::roster()
            .into_iter()
            .find(|r| r.id.as_str() == id)
            .ok_or_else(|| GameError::UnknownRacer(id.to_string()))
    }
}

impl RacerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RacerId::Car => "car",
            RacerId::Animal => "animal",
            RacerId::Robot => "robot",
        }
    }
}

impl From<RacerId> for Racer {
    fn from(id: RacerId) -> Self {
        let (name, icon) = match id {
            RacerId::Car => ("Car Racer", "🚗"),
            RacerId::Animal => ("Animal Racer", "🐆"),
            RacerId::Robot => ("Robot Racer", "🤖"),
        };
        Self {
            id,
            name: name.to_string(),
            icon: icon.to_string(),
        }
    }
}

impl Default for Racer {
    fn default() -> Self {
        Racer::from(RacerId::Car)
    }
}

/// Place shown next to the progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    Finished,
    First,
    Second,
    Third,
}

impl Standing {
    /// Standing for a track position in `[0, finish_line]`
    pub fn from_position(position: u32, finish_line: u32) -> Self {
        // Thresholds are fractions of the finish line: 3/4 and 1/2
        if position >= finish_line {
            Standing::Finished
        } else if position * 4 >= finish_line * 3 {
            Standing::First
        } else if position * 2 >= finish_line {
            Standing::Second
        } else {
            Standing::Third
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Standing::Finished => "1st Place! 🏁",
            Standing::First => "1st",
            Standing::Second => "2nd",
            Standing::Third => "3rd",
        }
    }
}
