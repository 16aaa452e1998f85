use std::time::{Duration, Instant};

use crate::game::StepOutcome;

/// Stats kept across the games of one session
pub struct GameMetrics {
    pub started_at: Instant,
    pub elapsed: Duration,
    pub best_score: u32,
    pub games_finished: u32,
    pub boards_cleared: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            elapsed: Duration::ZERO,
            best_score: 0,
            games_finished: 0,
            boards_cleared: 0,
        }
    }

    /// Refresh the running clock of the current game
    pub fn tick_clock(&mut self) {
        self.elapsed = self.started_at.elapsed();
    }

    pub fn restart_clock(&mut self) {
        self.started_at = Instant::now();
        self.elapsed = Duration::ZERO;
    }

    /// Count a finished game. Non-terminal outcomes are ignored.
    pub fn record(&mut self, outcome: StepOutcome, score: u32) {
        if !outcome.is_terminal() {
            return;
        }
        self.games_finished += 1;
        if outcome == StepOutcome::Won {
            self.boards_cleared += 1;
        }
        self.best_score = self.best_score.max(score);
    }

    /// `mm:ss` of the current game
    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed.as_secs();
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_record_finished_games() {
        let mut metrics = GameMetrics::new();

        metrics.record(StepOutcome::Ate, 4);
        assert_eq!(metrics.games_finished, 0);
        assert_eq!(metrics.best_score, 0);

        metrics.record(StepOutcome::GameOver, 10);
        metrics.record(StepOutcome::GameOver, 5);
        assert_eq!(metrics.best_score, 10);
        assert_eq!(metrics.games_finished, 2);

        metrics.record(StepOutcome::Won, 24);
        assert_eq!(metrics.best_score, 24);
        assert_eq!(metrics.games_finished, 3);
        assert_eq!(metrics.boards_cleared, 1);
    }

    #[test]
    fn test_restart_clock() {
        let mut metrics = GameMetrics::new();
        std::thread::sleep(Duration::from_millis(50));
        metrics.tick_clock();
        assert!(metrics.elapsed.as_millis() >= 50);

        metrics.restart_clock();
        metrics.tick_clock();
        assert!(metrics.elapsed.as_millis() < 50);
    }
}
