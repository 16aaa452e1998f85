use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use log::debug;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, Interval, interval, interval_at};

use crate::game::{Direction, GameConfig, GameEngine, StepOutcome};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Keyboard-driven game: owns the engine and drives its ticks.
pub struct HumanMode {
    engine: GameEngine,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    /// Last direction pressed since the previous tick
    pending_direction: Option<Direction>,
    tick_delay: Duration,
    /// Cleared once a step reports a terminal outcome, set again on restart
    ticking: bool,
}

impl HumanMode {
    pub fn new(config: GameConfig, seed: Option<u64>) -> Result<Self> {
        let mut engine = match seed {
            Some(seed) => GameEngine::with_seed(config, seed),
            None => GameEngine::new(config),
        }
        .context("Failed to create game engine")?;
        engine.init();
        let tick_delay = engine.config().speed.tick_delay(0);
        let ticking = !engine.is_over();

        Ok(Self {
            engine,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            pending_direction: None,
            tick_delay,
            ticking,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick_timer = interval(self.tick_delay);

        // Render at 30 FPS (33ms per frame)
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        if self.handle_event(event) {
                            tick_timer = Self::timer(self.tick_delay);
                        }
                    }
                }

                _ = tick_timer.tick(), if self.ticking => {
                    let outcome = self.update_game()?;
                    if !outcome.is_terminal() {
                        let delay = self.engine.config().speed.tick_delay(self.engine.score());
                        if delay != self.tick_delay {
                            debug!("tick delay now {:?}", delay);
                            self.tick_delay = delay;
                            tick_timer = Self::timer(delay);
                        }
                    }
                }

                _ = render_timer.tick() => {
                    if self.ticking {
                        self.metrics.tick_clock();
                    }
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.engine, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn timer(period: Duration) -> Interval {
        interval_at(Instant::now() + period, period)
    }

    /// Returns true when the game was restarted and the tick timer must be
    /// rebuilt.
    fn handle_event(&mut self, event: Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        // Only process key press events, not release
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Turn(dir) => {
                self.pending_direction = Some(dir);
                false
            }
            KeyAction::Restart => {
                self.reset_game();
                true
            }
            KeyAction::Quit => {
                self.should_quit = true;
                false
            }
            KeyAction::None => false,
        }
    }

    fn update_game(&mut self) -> Result<StepOutcome> {
        if let Some(dir) = self.pending_direction.take() {
            if !self.engine.set_direction(dir).is_accepted() {
                debug!("ignored turn to {:?}", dir);
            }
        }

        let outcome = self
            .engine
            .next_step()
            .context("Failed to advance game")?;
        self.metrics.record(outcome, self.engine.score());
        if outcome.is_terminal() {
            self.ticking = false;
        }
        Ok(outcome)
    }

    fn reset_game(&mut self) {
        self.engine.init();
        self.metrics.restart_clock();
        self.pending_direction = None;
        self.tick_delay = self.engine.config().speed.tick_delay(0);
        self.ticking = !self.engine.is_over();
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Phase, Position};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_game_initialization() {
        let mode = HumanMode::new(GameConfig::small(), Some(5)).unwrap();
        assert_eq!(mode.engine.phase(), Phase::Initialized);
        assert_eq!(mode.engine.score(), 0);
        assert_eq!(mode.tick_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_config_fails() {
        assert!(HumanMode::new(GameConfig::new(0, 0), None).is_err());
    }

    #[test]
    fn test_snake_waits_for_first_key() {
        let mut mode = HumanMode::new(GameConfig::small(), Some(5)).unwrap();
        assert_eq!(mode.update_game().unwrap(), StepOutcome::Idle);

        mode.handle_event(key(KeyCode::Up));
        let outcome = mode.update_game().unwrap();
        assert!(matches!(outcome, StepOutcome::Moved | StepOutcome::Ate));
        assert_eq!(mode.engine.direction(), Some(Direction::Up));
        assert_eq!(mode.pending_direction, None);
    }

    #[test]
    fn test_last_key_wins_between_ticks() {
        let mut mode = HumanMode::new(GameConfig::small(), Some(5)).unwrap();
        mode.handle_event(key(KeyCode::Up));
        mode.handle_event(key(KeyCode::Left));
        mode.update_game().unwrap();
        assert_eq!(mode.engine.direction(), Some(Direction::Left));
    }

    #[test]
    fn test_game_reset() {
        let mut mode = HumanMode::new(GameConfig::small(), Some(5)).unwrap();
        mode.handle_event(key(KeyCode::Right));
        mode.update_game().unwrap();

        assert!(mode.handle_event(key(KeyCode::Char('r'))));
        assert_eq!(mode.engine.phase(), Phase::Initialized);
        assert_eq!(mode.engine.steps(), 0);
        assert_eq!(mode.engine.direction(), None);
    }

    #[test]
    fn test_ticking_stops_on_game_over_until_restart() {
        let mut mode = HumanMode::new(GameConfig::small(), Some(5)).unwrap();
        assert!(mode.ticking);

        // Curled snake that bites itself on the next step up
        mode.engine = GameEngine::restore(
            GameConfig::small(),
            vec![
                Position::new(1, 1),
                Position::new(1, 2),
                Position::new(0, 2),
                Position::new(0, 1),
                Position::new(0, 0),
            ],
            Position::new(4, 4),
            Some(Direction::Up),
        )
        .unwrap();

        assert_eq!(mode.update_game().unwrap(), StepOutcome::GameOver);
        assert!(!mode.ticking);
        assert_eq!(mode.metrics.games_finished, 1);

        assert!(mode.handle_event(key(KeyCode::Char('r'))));
        assert!(mode.ticking);
        assert_eq!(mode.engine.phase(), Phase::Initialized);
    }

    #[test]
    fn test_single_cell_board_never_ticks() {
        let mode = HumanMode::new(GameConfig::new(1, 1), Some(5)).unwrap();
        assert!(!mode.ticking);
    }

    #[test]
    fn test_quit_key() {
        let mut mode = HumanMode::new(GameConfig::small(), Some(5)).unwrap();
        assert!(!mode.handle_event(key(KeyCode::Char('q'))));
        assert!(mode.should_quit);
    }
}
