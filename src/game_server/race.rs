//! Race - Quiz race configuration and session state
//!
//! A race owns the race clock, the question clock, the score and the racer's
//! track position. Time only moves when the owner calls `tick` or `advance`;
//! every delayed effect is a timer in the race's own queue.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game_server::error::GameError;
use crate::game_server::question::{Question, QuestionGenerator};
use crate::game_server::racer::{Racer, Standing};
use crate::game_server::timers::{TimerId, TimerKind, Timers};

/// Interval of both race clocks
pub const ONE_SECOND: Duration = Duration::from_secs(1);

/// Race configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Overall time budget (seconds)
    pub race_seconds: u32,
    /// Time allowed per question (seconds)
    pub question_seconds: u32,
    /// Points per correct answer
    pub correct_reward: u32,
    /// Track gained per correct answer
    pub advance_step: u32,
    /// Track lost per wrong answer or timeout
    pub penalty_step: u32,
    /// Track position that ends the race
    pub finish_line: u32,
    /// How long answer feedback stays up before the next question
    pub feedback_delay_ms: u64,
    /// Length of the speed boost pulse
    pub boost_ms: u64,
    /// Delay between crossing the finish line and game over
    pub celebration_ms: u64,
    /// Question seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            race_seconds: 90,
            question_seconds: 10,
            correct_reward: 50,
            advance_step: 20,
            penalty_step: 5,
            finish_line: 100,
            feedback_delay_ms: 2000,
            boost_ms: 500,
            celebration_ms: 1000,
            seed: None,
        }
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        let checks = [
            (self.race_seconds == 0, "race_seconds must be positive"),
            (self.question_seconds == 0, "question_seconds must be positive"),
            (self.advance_step == 0, "advance_step must be positive"),
            (self.penalty_step == 0, "penalty_step must be positive"),
            (self.finish_line == 0, "finish_line must be positive"),
            (self.feedback_delay_ms == 0, "feedback_delay_ms must be positive"),
            (self.boost_ms == 0, "boost_ms must be positive"),
            (self.celebration_ms == 0, "celebration_ms must be positive"),
        ];
        match checks.into_iter().find(|(failed, _)| *failed) {
            Some((_, reason)) => Err(GameError::InvalidConfig(reason)),
            None => Ok(()),
        }
    }

    fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    fn boost(&self) -> Duration {
        Duration::from_millis(self.boost_ms)
    }

    fn celebration(&self) -> Duration {
        Duration::from_millis(self.celebration_ms)
    }
}

/// Race status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    NotStarted,
    Active,
    Ended,
}

/// A player's answer to the current question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Choice(u32),
    /// The question clock ran out
    NoAnswer,
}

/// Transient feedback shown after an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encouragement {
    GreatThinking,
    TryAgain,
}

impl Encouragement {
    pub fn message(&self) -> &'static str {
        match self {
            Encouragement::GreatThinking => "Great thinking!",
            Encouragement::TryAgain => "Try again!",
        }
    }
}

/// What ended the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TimeUp,
    FinishLine,
}

/// Terminal race result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub final_score: u32,
    pub reason: EndReason,
    pub time_remaining: u32,
}

/// Things that happened while the race advanced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceEvent {
    QuestionPresented {
        prompt: String,
    },
    AnswerResolved {
        answer: Answer,
        correct: bool,
        score: u32,
        position: u32,
    },
    QuestionTimedOut,
    FinishLineReached {
        score: u32,
    },
    GameOver(GameOver),
}

/// Styling hint for one answer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Highlight {
    Neutral,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionHint {
    pub value: u32,
    pub highlight: Highlight,
}

/// Complete race state
#[derive(Debug, Clone)]
pub struct Race {
    config: RaceConfig,
    racer: Racer,
    status: RaceStatus,
    generator: QuestionGenerator,
    timers: Timers,
    /// Virtual race time since construction
    now: Duration,
    time_remaining: u32,
    score: u32,
    position: u32,
    question: Option<Question>,
    question_time_remaining: u32,
    selected: Option<Answer>,
    encouragement: Option<Encouragement>,
    speed_boost: bool,
    question_clock: Option<TimerId>,
    next_question: Option<TimerId>,
    boost_timer: Option<TimerId>,
    finish_timer: Option<TimerId>,
    outcome: Option<GameOver>,
    events: Vec<RaceEvent>,
}

impl Race {
    /// Create a race that has not started yet
    pub fn new(config: RaceConfig, racer: Racer) -> Self {
        let generator = match config.seed {
            Some(seed) => QuestionGenerator::from_seed(seed),
            None => QuestionGenerator::from_entropy(),
        };

        Self {
            time_remaining: config.race_seconds,
            question_time_remaining: config.question_seconds,
            config,
            racer,
            status: RaceStatus::NotStarted,
            generator,
            timers: Timers::new(),
            now: Duration::ZERO,
            score: 0,
            position: 0,
            question: None,
            selected: None,
            encouragement: None,
            speed_boost: false,
            question_clock: None,
            next_question: None,
            boost_timer: None,
            finish_timer: None,
            outcome: None,
            events: Vec::new(),
        }
    }

    /// Start the clocks and show the first question.
    ///
    /// Returns false if the race was already started.
    pub fn start(&mut self) -> bool {
        if self.status != RaceStatus::NotStarted {
            return false;
        }

        self.status = RaceStatus::Active;
        self.time_remaining = self.config.race_seconds;
        self.score = 0;
        self.position = 0;
        self.timers.schedule(self.now, ONE_SECOND, TimerKind::RaceClock);
        self.present_question();

        log::info!(
            "Race started for {} ({}s on the clock)",
            self.racer.name,
            self.time_remaining
        );
        true
    }

    /// Advance the race by one second
    pub fn tick(&mut self) {
        self.advance(ONE_SECOND);
    }

    /// Advance virtual time, firing every timer that comes due on the way
    pub fn advance(&mut self, delta: Duration) {
        if self.status != RaceStatus::Active {
            return;
        }

        let target = self.now + delta;
        while self.status == RaceStatus::Active {
            let Some(fired) = self.timers.pop_due(target) else {
                break;
            };
            self.now = fired.due;
            log::trace!("{:?} fired at {}ms", fired.kind, self.now.as_millis());
            self.dispatch(fired.kind);
        }

        if self.status == RaceStatus::Active {
            self.now = target;
        }
    }

    /// Submit an answer for the current question.
    ///
    /// Returns false when the answer was ignored: the race is not active,
    /// or the player already answered this question. An answer arriving
    /// after the question timed out still counts.
    pub fn submit_answer(&mut self, answer: Answer) -> bool {
        if self.status != RaceStatus::Active {
            return false;
        }
        let Some(question) = &self.question else {
            return false;
        };

        match (self.selected, answer) {
            (None, _) => {}
            (Some(Answer::NoAnswer), Answer::Choice(_)) => {
                // Late answer replaces the timeout's feedback window
                if let Some(id) = self.next_question.take() {
                    self.timers.cancel(id);
                }
            }
            _ => return false,
        }

        let correct = matches!(answer, Answer::Choice(value) if question.is_correct(value));

        if let Some(id) = self.question_clock.take() {
            self.timers.cancel(id);
        }
        self.selected = Some(answer);

        if correct {
            self.score += self.config.correct_reward;
            self.position = (self.position + self.config.advance_step).min(self.config.finish_line);
            self.encouragement = Some(Encouragement::GreatThinking);
            self.start_boost();
        } else {
            self.position = self.position.saturating_sub(self.config.penalty_step);
            self.encouragement = Some(Encouragement::TryAgain);
        }

        log::debug!(
            "Answer {:?} ({}) -> score {}, position {}",
            answer,
            if correct { "correct" } else { "wrong" },
            self.score,
            self.position
        );
        self.events.push(RaceEvent::AnswerResolved {
            answer,
            correct,
            score: self.score,
            position: self.position,
        });

        self.next_question = Some(self.timers.schedule(
            self.now,
            self.config.feedback_delay(),
            TimerKind::NextQuestion,
        ));

        if self.position >= self.config.finish_line && self.finish_timer.is_none() {
            self.finish_timer = Some(self.timers.schedule(
                self.now,
                self.config.celebration(),
                TimerKind::FinishLine,
            ));
            self.events.push(RaceEvent::FinishLineReached { score: self.score });
            log::info!("{} crossed the finish line", self.racer.name);
        }

        true
    }

    fn dispatch(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::RaceClock => {
                // Clock stops once the finish line is crossed
                if self.finish_timer.is_some() {
                    return;
                }
                self.time_remaining = self.time_remaining.saturating_sub(1);
                if self.time_remaining == 0 {
                    self.end(EndReason::TimeUp);
                } else {
                    self.timers.schedule(self.now, ONE_SECOND, TimerKind::RaceClock);
                }
            }

            TimerKind::QuestionClock => {
                self.question_clock = None;
                self.question_time_remaining = self.question_time_remaining.saturating_sub(1);
                if self.question_time_remaining == 0 {
                    self.question_time_remaining = self.config.question_seconds;
                    log::debug!("Question timed out");
                    self.events.push(RaceEvent::QuestionTimedOut);
                    self.submit_answer(Answer::NoAnswer);
                } else {
                    self.arm_question_clock();
                }
            }

            TimerKind::NextQuestion => {
                self.next_question = None;
                self.present_question();
            }

            TimerKind::FinishLine => {
                self.finish_timer = None;
                self.end(EndReason::FinishLine);
            }

            TimerKind::BoostEnd => {
                self.boost_timer = None;
                self.speed_boost = false;
            }
        }
    }

    fn present_question(&mut self) {
        let question = self.generator.generate();
        self.events.push(RaceEvent::QuestionPresented {
            prompt: question.prompt.clone(),
        });

        self.question = Some(question);
        self.selected = None;
        self.encouragement = None;
        self.question_time_remaining = self.config.question_seconds;
        self.arm_question_clock();
    }

    fn arm_question_clock(&mut self) {
        if let Some(id) = self.question_clock.take() {
            self.timers.cancel(id);
        }
        self.question_clock = Some(self.timers.schedule(self.now, ONE_SECOND, TimerKind::QuestionClock));
    }

    fn start_boost(&mut self) {
        if let Some(id) = self.boost_timer.take() {
            self.timers.cancel(id);
        }
        self.speed_boost = true;
        self.boost_timer = Some(self.timers.schedule(self.now, self.config.boost(), TimerKind::BoostEnd));
    }

    /// Terminal transition; only the first call has any effect
    fn end(&mut self, reason: EndReason) {
        if self.status == RaceStatus::Ended {
            return;
        }

        self.status = RaceStatus::Ended;
        self.timers.clear();
        self.question_clock = None;
        self.next_question = None;
        self.boost_timer = None;
        self.finish_timer = None;

        let over = GameOver {
            final_score: self.score,
            reason,
            time_remaining: self.time_remaining,
        };
        self.outcome = Some(over);
        self.events.push(RaceEvent::GameOver(over));
        log::info!("Race over ({:?}) with score {}", reason, self.score);
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn status(&self) -> RaceStatus {
        self.status
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn racer(&self) -> &Racer {
        &self.racer
    }

    pub fn elapsed(&self) -> Duration {
        self.now
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn racer_position(&self) -> u32 {
        self.position
    }

    pub fn standing(&self) -> Standing {
        Standing::from_position(self.position, self.config.finish_line)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn question_time_remaining(&self) -> u32 {
        self.question_time_remaining
    }

    pub fn selected_answer(&self) -> Option<Answer> {
        self.selected
    }

    pub fn encouragement(&self) -> Option<Encouragement> {
        self.encouragement
    }

    pub fn speed_boost(&self) -> bool {
        self.speed_boost
    }

    pub fn outcome(&self) -> Option<GameOver> {
        self.outcome
    }

    /// Number of timers still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.timers.pending_count()
    }

    /// Styling hints for the current question's options
    pub fn option_hints(&self) -> Vec<OptionHint> {
        let Some(question) = &self.question else {
            return Vec::new();
        };

        question
            .options
            .iter()
            .map(|&value| {
                let highlight = match self.selected {
                    None => Highlight::Neutral,
                    Some(_) if question.is_correct(value) => Highlight::Correct,
                    Some(Answer::Choice(chosen)) if chosen == value => Highlight::Wrong,
                    Some(_) => Highlight::Neutral,
                };
                OptionHint { value, highlight }
            })
            .collect()
    }

    /// Get compact snapshot for IPC transfer
    pub fn get_snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            status: self.status,
            racer: self.racer.clone(),
            time_remaining: self.time_remaining,
            score: self.score,
            racer_position: self.position,
            standing: self.standing(),
            standing_label: self.standing().label().to_string(),
            question: self.question.clone(),
            options: self.option_hints(),
            question_time_remaining: self.question_time_remaining,
            selected_answer: self.selected,
            answers_locked: self.selected.is_some(),
            encouragement: self.encouragement.map(|e| e.message().to_string()),
            speed_boost: self.speed_boost,
            elapsed_ms: self.now.as_millis() as u64,
        }
    }
}

/// Compact race snapshot for IPC transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub status: RaceStatus,
    pub racer: Racer,
    pub time_remaining: u32,
    pub score: u32,
    pub racer_position: u32,
    pub standing: Standing,
    pub standing_label: String,
    pub question: Option<Question>,
    pub options: Vec<OptionHint>,
    pub question_time_remaining: u32,
    pub selected_answer: Option<Answer>,
    pub answers_locked: bool,
    pub encouragement: Option<String>,
    pub speed_boost: bool,
    pub elapsed_ms: u64,
}
