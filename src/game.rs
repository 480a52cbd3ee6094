use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

/// Smallest and largest value a puzzle number can take
pub const MIN_NUMBER: u32 = 1;
pub const MAX_NUMBER: u32 = 10;

/// Trailing numbers that never contribute to the target
const DECOY_COUNT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("need at least 3 numbers per puzzle, got {count}")]
    TooFewNumbers { count: usize },
    #[error("the countdown needs at least 1 second")]
    ZeroSeconds,
}

/// Settings for a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub random_number_count: usize,
    pub initial_seconds: u64,
}

impl GameConfig {
    pub fn new(random_number_count: usize, initial_seconds: u64) -> Result<Self, ConfigError> {
        let config = Self {
            random_number_count,
            initial_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.random_number_count < 3 {
            return Err(ConfigError::TooFewNumbers {
                count: self.random_number_count,
            });
        }
        if self.initial_seconds < 1 {
            return Err(ConfigError::ZeroSeconds);
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            random_number_count: 6,
            initial_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// One round of the puzzle: the numbers on the board, the target, the
/// player's picks and the countdown.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    numbers: Vec<u32>,
    target: u32,
    selected: Vec<usize>,
    status: GameStatus,
    remaining_secs: u64,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Self {
        let numbers = (0..config.random_number_count)
            .map(|_| rng.gen_range(MIN_NUMBER..=MAX_NUMBER))
            .collect();

        Self::build(config, numbers)
    }

    /// Start a round on a fixed board instead of a random one
    pub fn with_numbers(numbers: Vec<u32>, initial_seconds: u64) -> Self {
        let config = GameConfig {
            random_number_count: numbers.len(),
            initial_seconds,
        };

        Self::build(config, numbers)
    }

    fn build(config: GameConfig, numbers: Vec<u32>) -> Self {
        // boards shorter than the decoy tail have an empty prefix, so the target is 0
        let prefix = numbers.len().saturating_sub(DECOY_COUNT);
        let target: u32 = numbers[..prefix].iter().sum();

        info!(?numbers, target, seconds = config.initial_seconds, "new puzzle");

        Self {
            config,
            numbers,
            target,
            selected: Vec::new(),
            status: GameStatus::Playing,
            remaining_secs: config.initial_seconds,
        }
    }

    /// A fresh round with the same settings
    pub fn reset(&self) -> Self {
        self.reset_with_rng(&mut rand::thread_rng())
    }

    pub fn reset_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        info!(previous = %self.status, "play again");
        Self::with_rng(self.config, rng)
    }

    /// Pick the number at `index`.
    ///
    /// Picking is one-way: an index that is already selected stays selected
    /// and the call does nothing. Nothing can be picked once the round is
    /// over. Returns whether the pick was taken.
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.status != GameStatus::Playing
            || index >= self.numbers.len()
            || self.is_selected(index)
        {
            debug!(index, status = %self.status, "selection ignored");
            return false;
        }

        self.selected.push(index);
        self.recompute_status();
        true
    }

    fn recompute_status(&mut self) {
        let sum = self.selected_sum();
        let status = match sum.cmp(&self.target) {
            std::cmp::Ordering::Less => GameStatus::Playing,
            std::cmp::Ordering::Greater => GameStatus::Lost,
            std::cmp::Ordering::Equal => GameStatus::Won,
        };

        if status != self.status {
            info!(sum, target = self.target, %status, "round over");
        }
        self.status = status;
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) {
        if self.status != GameStatus::Playing {
            return;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            info!(sum = self.selected_sum(), target = self.target, "out of time");
            self.status = GameStatus::Lost;
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// Selected indices in the order they were picked
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Whether the tile at `index` can no longer be picked
    pub fn is_disabled(&self, index: usize) -> bool {
        self.is_over() || self.is_selected(index)
    }

    pub fn is_over(&self) -> bool {
        self.status != GameStatus::Playing
    }

    pub fn selected_sum(&self) -> u32 {
        self.selected.iter().map(|&i| self.numbers[i]).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn example() -> GameSession {
        GameSession::with_numbers(vec![3, 5, 2, 7], 10)
    }

    #[test]
    fn config_rejects_too_few_numbers() {
        assert_matches!(
            GameConfig::new(2, 10),
            Err(ConfigError::TooFewNumbers { count: 2 })
        );
    }

    #[test]
    fn config_rejects_zero_seconds() {
        assert_eq!(GameConfig::new(4, 0), Err(ConfigError::ZeroSeconds));
    }

    #[test]
    fn config_accepts_minimum() {
        let config = GameConfig::new(3, 1).unwrap();
        assert_eq!(config.random_number_count, 3);
        assert_eq!(config.initial_seconds, 1);
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn new_session_starts_playing() {
        let session = example();
        assert_eq!(session.status(), GameStatus::Playing);
        assert_eq!(session.remaining_secs(), 10);
        assert!(session.selected().is_empty());
        assert_eq!(session.target(), 8);
    }

    #[test]
    fn target_is_sum_of_all_but_last_two() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in 3..20 {
            let config = GameConfig::new(count, 5).unwrap();
            let session = GameSession::with_rng(config, &mut rng);

            assert_eq!(session.numbers().len(), count);
            let expected: u32 = session.numbers()[..count - 2].iter().sum();
            assert_eq!(session.target(), expected);
        }
    }

    #[test]
    fn numbers_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = GameConfig::new(200, 5).unwrap();
        let session = GameSession::with_rng(config, &mut rng);

        assert!(session
            .numbers()
            .iter()
            .all(|n| (MIN_NUMBER..=MAX_NUMBER).contains(n)));
    }

    #[test]
    fn degenerate_board_has_zero_target() {
        let session = GameSession::with_numbers(vec![4, 9], 5);
        assert_eq!(session.target(), 0);
        assert_eq!(session.status(), GameStatus::Playing);
    }

    #[test]
    fn under_target_keeps_playing() {
        let mut session = example();
        assert!(session.toggle(0));
        assert!(session.toggle(2));

        assert_eq!(session.selected_sum(), 5);
        assert_eq!(session.status(), GameStatus::Playing);
        assert_eq!(session.selected(), &[0, 2]);
    }

    #[test]
    fn over_target_loses() {
        let mut session = example();
        session.toggle(0);
        session.toggle(2);
        session.toggle(1);

        assert_eq!(session.selected_sum(), 10);
        assert_eq!(session.status(), GameStatus::Lost);
    }

    #[test]
    fn exact_target_wins_in_any_order() {
        for order in [[0, 1], [1, 0]] {
            let mut session = example();
            for i in order {
                session.toggle(i);
            }
            assert_eq!(session.status(), GameStatus::Won);
        }

        // decoys count too
        let mut session = GameSession::with_numbers(vec![4, 4, 1, 7], 10);
        session.toggle(3);
        session.toggle(2);
        assert_eq!(session.status(), GameStatus::Won);
    }

    #[test]
    fn reselecting_is_a_no_op() {
        let mut session = example();
        assert!(session.toggle(2));
        assert!(!session.toggle(2));

        assert_eq!(session.selected(), &[2]);
        assert_eq!(session.selected_sum(), 2);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut session = example();
        assert!(!session.toggle(4));
        assert!(session.selected().is_empty());
        assert_eq!(session.status(), GameStatus::Playing);
    }

    #[test]
    fn no_selection_after_round_is_over() {
        let mut session = example();
        session.toggle(3);
        assert_eq!(session.status(), GameStatus::Lost);

        assert!(!session.toggle(0));
        assert_eq!(session.selected(), &[3]);

        let mut won = example();
        won.toggle(0);
        won.toggle(1);
        assert!(!won.toggle(2));
        assert_eq!(won.selected(), &[0, 1]);
        assert_eq!(won.status(), GameStatus::Won);
    }

    #[test]
    fn running_out_of_time_loses() {
        let mut session = example();
        session.toggle(0);
        session.toggle(2);

        for _ in 0..9 {
            session.tick();
            assert_eq!(session.status(), GameStatus::Playing);
        }
        session.tick();

        assert_eq!(session.remaining_secs(), 0);
        assert_eq!(session.status(), GameStatus::Lost);
    }

    #[test]
    fn remaining_never_goes_negative() {
        let mut session = GameSession::with_numbers(vec![1, 2, 3], 2);
        for _ in 0..10 {
            session.tick();
        }
        assert_eq!(session.remaining_secs(), 0);
        assert_eq!(session.status(), GameStatus::Lost);
    }

    #[test]
    fn tick_after_win_changes_nothing() {
        let mut session = example();
        session.toggle(0);
        session.toggle(1);
        assert_eq!(session.status(), GameStatus::Won);

        for _ in 0..20 {
            session.tick();
        }
        assert_eq!(session.status(), GameStatus::Won);
        assert_eq!(session.remaining_secs(), 10);
    }

    #[test]
    fn disabled_tracks_selection_and_status() {
        let mut session = example();
        assert!(!session.is_disabled(0));
        session.toggle(0);
        assert!(session.is_disabled(0));
        assert!(!session.is_disabled(1));

        session.toggle(3);
        assert!(session.is_over());
        assert!((0..4).all(|i| session.is_disabled(i)));
    }

    #[test]
    fn reset_builds_an_independent_round() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = GameConfig::new(5, 30).unwrap();
        let mut first = GameSession::with_rng(config, &mut rng);
        first.toggle(0);
        first.tick();
        let numbers_before = first.numbers().to_vec();

        let second = first.reset_with_rng(&mut rng);

        assert_eq!(second.config(), config);
        assert_eq!(second.status(), GameStatus::Playing);
        assert_eq!(second.remaining_secs(), 30);
        assert!(second.selected().is_empty());
        assert_eq!(first.numbers(), numbers_before.as_slice());
        assert_eq!(first.selected(), &[0]);
        assert_eq!(first.remaining_secs(), 29);
    }

    #[test]
    fn status_displays_uppercase() {
        assert_eq!(GameStatus::Playing.to_string(), "PLAYING");
        assert_eq!(GameStatus::Won.to_string(), "WON");
        assert_eq!(GameStatus::Lost.to_string(), "LOST");
    }
}
