//! Simulation - Main game server
//!
//! Manages the screen flow (racer selection, gameplay, game over), forwards
//! ticks and answers into the active race, and provides the interface for
//! Tauri commands.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::game_server::error::GameError;
use crate::game_server::race::{Answer, GameOver, Race, RaceConfig, RaceEvent, RaceSnapshot};
use crate::game_server::racer::Racer;

/// Undrained events kept before the oldest are dropped
pub const MAX_PENDING_EVENTS: usize = 256;

/// Which screen the frontend should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Home,
    Gameplay,
    GameOver,
}

/// Server statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStats {
    pub screen: Screen,
    pub races_played: u32,
    pub ticks: u64,
    pub avg_tick_time_ms: f32,
    pub best_score: u32,
}

/// Main game server
pub struct GameServer {
    /// Current screen
    screen: Screen,
    /// Racer picked on the home screen
    selected_racer: Option<Racer>,
    /// Active or just-finished race
    race: Option<Race>,
    /// Result shown on the game over screen
    result: Option<GameOver>,
    /// Base configuration for new races
    config: RaceConfig,
    /// Events not yet picked up by the frontend, oldest first
    events: VecDeque<RaceEvent>,
    /// Recent tick processing times for averaging
    tick_times: Vec<f32>,
    ticks: u64,
    races_played: u32,
    best_score: u32,
}

impl GameServer {
    /// Create a new game server
    pub fn new() -> Self {
        Self::with_config(RaceConfig::default())
    }

    /// Create a game server whose races use `config` unless overridden
    pub fn with_config(config: RaceConfig) -> Self {
        Self {
            screen: Screen::Home,
            selected_racer: None,
            race: None,
            result: None,
            config,
            events: VecDeque::new(),
            tick_times: Vec::with_capacity(60),
            ticks: 0,
            races_played: 0,
            best_score: 0,
        }
    }

    fn expect_screen(&self, expected: Screen) -> Result<(), GameError> {
        if self.screen == expected {
            Ok(())
        } else {
            Err(GameError::WrongScreen {
                expected,
                actual: self.screen,
            })
        }
    }

    /// Pick a racer on the home screen
    pub fn select_racer(&mut self, id: &str) -> Result<Racer, GameError> {
        self.expect_screen(Screen::Home)?;
        let racer = Racer::find(id)?;
        log::info!("Selected {}", racer.name);
        self.selected_racer = Some(racer.clone());
        Ok(racer)
    }

    /// Start a race with the server's base configuration
    pub fn start_race(&mut self) -> Result<RaceSnapshot, GameError> {
        let config = self.config.clone();
        self.start_race_with(config)
    }

    /// Start a race with an explicit configuration
    pub fn start_race_with(&mut self, config: RaceConfig) -> Result<RaceSnapshot, GameError> {
        self.expect_screen(Screen::Home)?;
        config.validate()?;
        let racer = self.selected_racer.clone().ok_or(GameError::NoRacerSelected)?;

        let mut race = Race::new(config, racer);
        race.start();
        let snapshot = race.get_snapshot();

        self.race = Some(race);
        self.result = None;
        self.screen = Screen::Gameplay;
        self.collect_events();
        Ok(snapshot)
    }

    /// Advance the active race by one second
    pub fn tick(&mut self) -> Option<RaceSnapshot> {
        self.advance(Duration::from_secs(1))
    }

    /// Advance the active race by `delta`
    pub fn advance(&mut self, delta: Duration) -> Option<RaceSnapshot> {
        if self.screen != Screen::Gameplay {
            return self.get_snapshot();
        }

        // Track tick timing
        let tick_start = Instant::now();

        if let Some(race) = &mut self.race {
            race.advance(delta);
        }
        self.collect_events();

        let tick_time = tick_start.elapsed().as_secs_f32() * 1000.0;
        self.tick_times.push(tick_time);
        if self.tick_times.len() > 60 {
            self.tick_times.remove(0);
        }
        self.ticks += 1;

        self.get_snapshot()
    }

    /// Forward the player's answer to the active race
    pub fn submit_answer(&mut self, answer: Answer) -> Result<RaceSnapshot, GameError> {
        let race = match (&self.screen, &mut self.race) {
            (Screen::Gameplay, Some(race)) => race,
            _ => return Err(GameError::NoActiveRace),
        };

        if !race.submit_answer(answer) {
            log::debug!("Ignored answer {:?}", answer);
        }
        let snapshot = race.get_snapshot();
        self.collect_events();
        Ok(snapshot)
    }

    /// Leave the game over screen for a fresh racer selection
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.expect_screen(Screen::GameOver)?;
        self.screen = Screen::Home;
        self.selected_racer = None;
        self.result = None;
        self.race = None;
        log::info!("Back to racer selection");
        Ok(())
    }

    /// Pull race events and react to game over
    fn collect_events(&mut self) {
        let Some(race) = &mut self.race else {
            return;
        };

        for event in race.drain_events() {
            if let RaceEvent::GameOver(over) = &event {
                self.result = Some(*over);
                self.races_played += 1;
                self.best_score = self.best_score.max(over.final_score);
                self.screen = Screen::GameOver;
                log::info!("Game over: final score {}", over.final_score);
            }
            if self.events.len() == MAX_PENDING_EVENTS {
                self.events.pop_front();
            }
            self.events.push_back(event);
        }
    }

    /// Take the events produced since the last call.
    ///
    /// Callers that never drain only keep the newest `MAX_PENDING_EVENTS`;
    /// the last result stays available through `get_result`.
    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        self.events.drain(..).collect()
    }

    /// Get current race snapshot
    pub fn get_snapshot(&self) -> Option<RaceSnapshot> {
        self.race.as_ref().map(|r| r.get_snapshot())
    }

    /// Result of the last finished race
    pub fn get_result(&self) -> Option<GameOver> {
        self.result
    }

    pub fn selected_racer(&self) -> Option<&Racer> {
        self.selected_racer.as_ref()
    }

    /// Get server statistics
    pub fn get_stats(&self) -> ServerStats {
        let avg_tick_time = if self.tick_times.is_empty() {
            0.0
        } else {
            self.tick_times.iter().sum::<f32>() / self.tick_times.len() as f32
        };

        ServerStats {
            screen: self.screen,
            races_played: self.races_played,
            ticks: self.ticks,
            avg_tick_time_ms: avg_tick_time,
            best_score: self.best_score,
        }
    }

    /// Get current screen
    pub fn get_screen(&self) -> Screen {
        self.screen
    }
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_server::race::{EndReason, RaceStatus};

    fn seeded_server() -> GameServer {
        GameServer::with_config(RaceConfig {
            seed: Some(21),
            ..Default::default()
        })
    }

    #[test]
    fn test_cannot_start_without_racer() {
        let mut server = seeded_server();
        assert_eq!(server.start_race().unwrap_err(), GameError::NoRacerSelected);
        assert_eq!(server.get_screen(), Screen::Home);
    }

    #[test]
    fn test_unknown_racer_is_rejected() {
        let mut server = seeded_server();
        assert_eq!(
            server.select_racer("bike"),
            Err(GameError::UnknownRacer("bike".to_string()))
        );
        assert!(server.selected_racer().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut server = seeded_server();
        server.select_racer("car").unwrap();
        let config = RaceConfig {
            race_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(
            server.start_race_with(config),
            Err(GameError::InvalidConfig(_))
        ));
        assert_eq!(server.get_screen(), Screen::Home);
    }

    #[test]
    fn test_tick_outside_gameplay_is_noop() {
        let mut server = seeded_server();
        assert!(server.tick().is_none());
        assert_eq!(server.get_stats().ticks, 0);
        assert_eq!(server.submit_answer(Answer::Choice(5)), Err(GameError::NoActiveRace));
    }

    #[test]
    fn test_full_flow_home_to_game_over_and_back() {
        let mut server = seeded_server();
        server.select_racer("animal").unwrap();
        let snapshot = server.start_race().unwrap();
        assert_eq!(snapshot.status, RaceStatus::Active);
        assert_eq!(snapshot.racer.icon, "🐆");
        assert_eq!(server.get_screen(), Screen::Gameplay);
        assert!(matches!(
            server.select_racer("car"),
            Err(GameError::WrongScreen { .. })
        ));

        for _ in 0..90 {
            server.tick();
        }
        assert_eq!(server.get_screen(), Screen::GameOver);
        let result = server.get_result().unwrap();
        assert_eq!(result.final_score, 0);
        assert_eq!(result.reason, EndReason::TimeUp);

        let game_overs = server
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, RaceEvent::GameOver(_)))
            .count();
        assert_eq!(game_overs, 1);

        // Further ticks are ignored
        server.tick();
        assert_eq!(server.get_stats().ticks, 90);

        server.restart().unwrap();
        assert_eq!(server.get_screen(), Screen::Home);
        assert!(server.selected_racer().is_none());
        assert!(server.get_result().is_none());
        assert_eq!(server.get_stats().races_played, 1);
    }

    #[test]
    fn test_undrained_events_are_capped() {
        let mut server = GameServer::with_config(RaceConfig {
            race_seconds: 1200,
            seed: Some(33),
            ..Default::default()
        });
        server.select_racer("robot").unwrap();
        server.start_race().unwrap();

        // A question every 12s, each producing three events
        for _ in 0..1200 {
            server.tick();
        }
        assert_eq!(server.get_screen(), Screen::GameOver);

        let events = server.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        assert!(matches!(events.last(), Some(RaceEvent::GameOver(_))));
        assert!(server.drain_events().is_empty());
        assert_eq!(server.get_result().unwrap().final_score, 0);
    }

    #[test]
    fn test_restart_only_from_game_over() {
        let mut server = seeded_server();
        assert_eq!(
            server.restart(),
            Err(GameError::WrongScreen {
                expected: Screen::GameOver,
                actual: Screen::Home,
            })
        );
    }
}
