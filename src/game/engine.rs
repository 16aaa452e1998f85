use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashSet;

use super::{
    action::{Direction, Turn},
    config::GameConfig,
    error::EngineError,
    state::{Board, Cell, Position, Snake},
};

/// Lifecycle of a single game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    NotInitialized,
    Initialized,
    Running,
    /// The head ran into the body
    GameOver,
    /// No empty cell left to put food on
    Won,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::GameOver | Phase::Won)
    }
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No direction chosen yet, nothing moved
    Idle,
    Moved,
    Ate,
    GameOver,
    Won,
}

impl StepOutcome {
    /// The driver should stop ticking after a terminal outcome
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepOutcome::GameOver | StepOutcome::Won)
    }
}

/// Read-only copy of everything a renderer needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<Cell>>,
    pub snake: Vec<Position>,
    pub food: Option<Position>,
    pub direction: Option<Direction>,
    pub score: u32,
    pub steps: u32,
    pub phase: Phase,
}

/// The game engine. Owns the board, the snake, the food and the score of
/// one game; every mutation goes through `&mut self`.
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
    board: Board,
    snake: Snake,
    food: Option<Position>,
    direction: Option<Direction>,
    score: u32,
    steps: u32,
    phase: Phase,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as `new`, but every random placement is reproducible from `seed`
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, EngineError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, EngineError> {
        config.validate()?;
        let board = Board::new(config.grid_width, config.grid_height);
        Ok(Self {
            config,
            rng,
            board,
            snake: Snake::from_body(Vec::new()),
            food: None,
            direction: None,
            score: 0,
            steps: 0,
            phase: Phase::NotInitialized,
        })
    }

    /// Rebuild an engine around a known layout, ready to tick.
    pub fn restore(
        config: GameConfig,
        body: Vec<Position>,
        food: Position,
        direction: Option<Direction>,
    ) -> Result<Self, EngineError> {
        let mut engine = Self::new(config)?;

        if body.is_empty() {
            return Err(EngineError::InvalidLayout("snake has no segments".into()));
        }
        if let Some(pos) = body
            .iter()
            .chain(std::iter::once(&food))
            .find(|pos| !engine.board.is_in_bounds(**pos))
        {
            return Err(EngineError::InvalidLayout(format!(
                "{:?} is outside the board",
                pos
            )));
        }
        let distinct: HashSet<Position> = body.iter().copied().collect();
        if distinct.len() != body.len() {
            return Err(EngineError::InvalidLayout(
                "snake segments overlap".into(),
            ));
        }
        if distinct.contains(&food) {
            return Err(EngineError::InvalidLayout("food is on the snake".into()));
        }

        engine.snake = Snake::from_body(body);
        engine.food = Some(food);
        engine.direction = direction;
        engine.phase = Phase::Initialized;
        engine.board.rebuild(&engine.snake, engine.food);
        Ok(engine)
    }

    /// Start (or restart) a game: food first, then a one-segment snake,
    /// each on a random empty cell.
    pub fn init(&mut self) {
        self.snake = Snake::from_body(Vec::new());
        self.food = None;
        self.direction = None;
        self.score = 0;
        self.steps = 0;
        self.phase = Phase::Initialized;

        self.food = self.random_empty_cell();
        match self.random_empty_cell() {
            Some(pos) => self.snake = Snake::new(pos),
            None => {
                // 1x1 board: the snake takes the only cell and there is
                // nowhere left for food.
                if let Some(pos) = self.food.take() {
                    self.snake = Snake::new(pos);
                }
                self.phase = Phase::Won;
            }
        }
        self.board.rebuild(&self.snake, self.food);
        debug!(
            "game initialized: snake at {:?}, food at {:?}",
            self.head(),
            self.food
        );
    }

    pub fn go_up(&mut self) -> Turn {
        self.set_direction(Direction::Up)
    }

    pub fn go_down(&mut self) -> Turn {
        self.set_direction(Direction::Down)
    }

    pub fn go_left(&mut self) -> Turn {
        self.set_direction(Direction::Left)
    }

    pub fn go_right(&mut self) -> Turn {
        self.set_direction(Direction::Right)
    }

    /// Change heading unless it would reverse straight into the neck.
    pub fn set_direction(&mut self, direction: Direction) -> Turn {
        if self.phase.is_terminal() {
            return Turn::Rejected;
        }
        if let Some(current) = self.direction {
            if current.is_opposite(direction) {
                debug!("rejected reversal from {:?} to {:?}", current, direction);
                return Turn::Rejected;
            }
        }
        self.direction = Some(direction);
        Turn::Accepted
    }

    /// Advance the game by one tick.
    pub fn next_step(&mut self) -> Result<StepOutcome, EngineError> {
        match self.phase {
            Phase::NotInitialized => return Err(EngineError::NotInitialized),
            Phase::GameOver => return Ok(StepOutcome::GameOver),
            Phase::Won => return Ok(StepOutcome::Won),
            Phase::Initialized | Phase::Running => {}
        }

        let Some(direction) = self.direction else {
            return Ok(StepOutcome::Idle);
        };
        self.phase = Phase::Running;
        self.steps += 1;

        let next = self.next_head_position(direction);
        let ate = self.food == Some(next);

        if ate {
            self.snake.grow_into(next);
            self.score += 1;
            self.food = self.random_empty_cell();
            debug!("food eaten, score {}, new food at {:?}", self.score, self.food);
        } else {
            self.snake.shift_to(next);
        }

        self.board.rebuild(&self.snake, self.food);
        trace!("board after step {}:\n{}", self.steps, self.board);

        if self.snake.bites_itself() {
            self.phase = Phase::GameOver;
            info!(
                "game over after {} steps with score {}",
                self.steps, self.score
            );
            return Ok(StepOutcome::GameOver);
        }

        if ate && self.food.is_none() {
            self.phase = Phase::Won;
            info!("board filled with score {}", self.score);
            return Ok(StepOutcome::Won);
        }

        Ok(if ate {
            StepOutcome::Ate
        } else {
            StepOutcome::Moved
        })
    }

    /// Where the head would land on the next tick in `direction`
    fn next_head_position(&self, direction: Direction) -> Position {
        self.snake
            .head()
            .stepped(direction, self.config.grid_width, self.config.grid_height)
    }

    /// Uniform pick among the cells holding neither snake nor food
    fn random_empty_cell(&mut self) -> Option<Position> {
        self.board.rebuild(&self.snake, self.food);
        self.board.empty_cells().choose(&mut self.rng).copied()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.config.grid_width
    }

    pub fn height(&self) -> usize {
        self.config.grid_height
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell(&self, pos: Position) -> Cell {
        self.board.cell(pos)
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    /// `None` until the game is initialized
    pub fn head(&self) -> Option<Position> {
        if self.snake.is_empty() {
            None
        } else {
            Some(self.snake.head())
        }
    }

    pub fn food(&self) -> Option<Position> {
        self.food
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            width: self.width(),
            height: self.height(),
            cells: self.board.rows().map(|row| row.to_vec()).collect(),
            snake: self.snake.body.clone(),
            food: self.food,
            direction: self.direction,
            score: self.score,
            steps: self.steps,
            phase: self.phase,
        }
    }
}
