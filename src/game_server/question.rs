//! Question - Percentage question generation
//!
//! Each question comes from one of three archetypes picked uniformly at
//! random. Options are always positive, unique, and contain the correct
//! answer exactly once.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Percentages a question may ask about
pub const PERCENTS: [u32; 4] = [10, 25, 50, 75];
/// Base numbers a percentage is taken of
pub const BASES: [u32; 5] = [20, 40, 60, 80, 100];
/// Fixed option set of the reverse archetype
pub const REVERSE_OPTIONS: [u32; 4] = [50, 25, 75, 10];

const MAX_DISTRACTORS: usize = 3;

/// Question generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    /// "What is P% of N?"
    Basic,
    /// "Half of N is the same as what percent?"
    Reverse,
    /// "P% of N equals?"
    Calculation,
}

impl Archetype {
    pub const ALL: [Archetype; 3] = [Archetype::Basic, Archetype::Reverse, Archetype::Calculation];
}

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub archetype: Archetype,
    pub prompt: String,
    pub correct_answer: u32,
    /// Presentation order, already shuffled
    pub options: Vec<u32>,
}

impl Question {
    pub fn is_correct(&self, value: u32) -> bool {
        value == self.correct_answer
    }
}

/// Shuffle answer options in place (Fisher-Yates).
pub fn shuffle_options<R: Rng + ?Sized>(options: &mut [u32], rng: &mut R) {
    options.shuffle(rng);
}

/// Produces questions from its own random source.
#[derive(Debug, Clone)]
pub struct QuestionGenerator<R = StdRng> {
    rng: R,
}

impl QuestionGenerator<StdRng> {
    /// Deterministic generator for replays and tests
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng> QuestionGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate the next question. Never fails.
    pub fn generate(&mut self) -> Question {
        let archetype = Archetype::ALL[self.rng.gen_range(0..Archetype::ALL.len())];
        self.generate_archetype(archetype)
    }

    pub fn generate_archetype(&mut self, archetype: Archetype) -> Question {
        match archetype {
            Archetype::Basic => self.basic(),
            Archetype::Reverse => self.reverse(),
            Archetype::Calculation => self.calculation(),
        }
    }

    fn pick(&mut self, values: &[u32]) -> u32 {
        values[self.rng.gen_range(0..values.len())]
    }

    fn basic(&mut self) -> Question {
        let percent = self.pick(&PERCENTS);
        let base = self.pick(&BASES);
        let answer = percent_of(percent, base);
        let a = i64::from(answer);

        let candidates = [a + 10, a - 10, a + 5, i64::from(base * percent / 100) + 1];
        let options = self.assemble(answer, &candidates);

        Question {
            archetype: Archetype::Basic,
            prompt: format!("What is {}% of {}?", percent, base),
            correct_answer: answer,
            options,
        }
    }

    fn reverse(&mut self) -> Question {
        // Only the base reaches the prompt; the answer set is fixed.
        let base = self.pick(&BASES);
        let mut options = REVERSE_OPTIONS.to_vec();
        shuffle_options(&mut options, &mut self.rng);

        Question {
            archetype: Archetype::Reverse,
            prompt: format!("Half of {} is the same as what percent?", base),
            correct_answer: 50,
            options,
        }
    }

    fn calculation(&mut self) -> Question {
        let percent = self.pick(&PERCENTS);
        let base = self.pick(&BASES);
        let answer = percent_of(percent, base);
        let a = i64::from(answer);

        // floor(base * 0.3) in integer arithmetic
        let candidates = [a + 5, a - 5, i64::from(base * 3 / 10)];
        let options = self.assemble(answer, &candidates);

        Question {
            archetype: Archetype::Calculation,
            prompt: format!("{}% of {} equals?", percent, base),
            correct_answer: answer,
            options,
        }
    }

    /// Filter distractors, prepend the answer and shuffle.
    fn assemble(&mut self, answer: u32, candidates: &[i64]) -> Vec<u32> {
        let mut options = vec![answer];
        for &candidate in candidates {
            if options.len() > MAX_DISTRACTORS {
                break;
            }
            let Ok(value) = u32::try_from(candidate) else {
                continue;
            };
            if value == 0 || options.contains(&value) {
                continue;
            }
            options.push(value);
        }
        shuffle_options(&mut options, &mut self.rng);
        options
    }
}

/// All sampled combinations divide evenly.
fn percent_of(percent: u32, base: u32) -> u32 {
    percent * base / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(q: &Question) {
        assert_eq!(
            q.options.iter().filter(|&&o| o == q.correct_answer).count(),
            1,
            "{:?}",
            q
        );
        assert!(q.options.iter().all(|&o| o > 0), "{:?}", q);
        assert!((2..=4).contains(&q.options.len()), "{:?}", q);
        let mut sorted = q.options.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), q.options.len(), "duplicate option in {:?}", q);
    }

    #[test]
    fn test_percent_of_is_exact() {
        for percent in PERCENTS {
            for base in BASES {
                assert_eq!(percent * base % 100, 0);
            }
        }
        assert_eq!(percent_of(25, 60), 15);
        assert_eq!(percent_of(75, 20), 15);
    }

    #[test]
    fn test_every_archetype_is_well_formed() {
        let mut generator = QuestionGenerator::from_seed(7);
        for archetype in Archetype::ALL {
            for _ in 0..200 {
                let q = generator.generate_archetype(archetype);
                assert_eq!(q.archetype, archetype);
                assert_well_formed(&q);
            }
        }
    }

    #[test]
    fn test_basic_always_has_three_distractors() {
        let mut generator = QuestionGenerator::from_seed(11);
        for _ in 0..200 {
            let q = generator.generate_archetype(Archetype::Basic);
            assert_eq!(q.options.len(), 4);
            assert!(q.prompt.starts_with("What is "));
            assert!(q.options.contains(&(q.correct_answer + 10)));
            assert!(q.options.contains(&(q.correct_answer + 5)));
        }
    }

    #[test]
    fn test_reverse_uses_fixed_options() {
        let mut generator = QuestionGenerator::from_seed(3);
        let q = generator.generate_archetype(Archetype::Reverse);
        assert_eq!(q.correct_answer, 50);
        let mut options = q.options.clone();
        options.sort_unstable();
        assert_eq!(options, vec![10, 25, 50, 75]);
        assert!(q.prompt.starts_with("Half of "));
        assert!(q.prompt.ends_with(" is the same as what percent?"));
    }

    #[test]
    fn test_calculation_drops_non_positive_and_duplicate_distractors() {
        let mut generator = QuestionGenerator::from_seed(0);
        // 10% of 20 = 2: 2-5 is dropped
        // 25% of 100 = 25: 25+5 collides with floor(100 * 0.3)
        let mut seen_short = false;
        for _ in 0..500 {
            let q = generator.generate_archetype(Archetype::Calculation);
            if q.prompt == "10% of 20 equals?" {
                let mut options = q.options.clone();
                options.sort_unstable();
                assert_eq!(options, vec![2, 6, 7]);
                seen_short = true;
            }
            if q.prompt == "25% of 100 equals?" {
                let mut options = q.options.clone();
                options.sort_unstable();
                assert_eq!(options, vec![20, 25, 30]);
            }
        }
        assert!(seen_short);
    }

    #[test]
    fn test_same_seed_same_questions() {
        let mut a = QuestionGenerator::from_seed(42);
        let mut b = QuestionGenerator::from_seed(42);
        for _ in 0..50 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn test_all_archetypes_are_reachable() {
        let mut generator = QuestionGenerator::from_seed(99);
        let mut seen = Vec::new();
        for _ in 0..100 {
            let archetype = generator.generate().archetype;
            if !seen.contains(&archetype) {
                seen.push(archetype);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_shuffle_keeps_values() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut options = vec![1, 2, 3, 4];
        shuffle_options(&mut options, &mut rng);
        options.sort_unstable();
        assert_eq!(options, vec![1, 2, 3, 4]);
    }
}
