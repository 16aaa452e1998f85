use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A cell coordinate on the board, row first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step one cell in `direction`, wrapping to the opposite edge of the
    /// same axis when leaving a `width x height` board.
    pub fn stepped(&self, direction: Direction, width: usize, height: usize) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: wrap_axis(self.row, dr, height),
            col: wrap_axis(self.col, dc, width),
        }
    }

    /// Two positions collide iff both coordinates are equal
    pub fn collides(&self, other: Position) -> bool {
        self == &other
    }
}

fn wrap_axis(value: usize, delta: i32, size: usize) -> usize {
    match delta {
        d if d < 0 => {
            if value == 0 {
                size - 1
            } else {
                value - 1
            }
        }
        d if d > 0 => {
            if value + 1 >= size {
                0
            } else {
                value + 1
            }
        }
        _ => value,
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
}

impl Snake {
    /// A fresh one-segment snake
    pub fn new(head: Position) -> Self {
        Self { body: vec![head] }
    }

    pub fn from_body(body: Vec<Position>) -> Self {
        Self { body }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().iter().any(|seg| seg.collides(pos))
    }

    /// True when any non-head segment sits on the head
    pub fn bites_itself(&self) -> bool {
        self.collides_with_body(self.head())
    }

    /// Put a new head at `pos`; every existing segment keeps its place.
    pub fn grow_into(&mut self, pos: Position) {
        self.body.insert(0, pos);
    }

    /// Move the head to `pos`, each trailing segment taking the place its
    /// predecessor held before the move.
    pub fn shift_to(&mut self, pos: Position) {
        self.body.insert(0, pos);
        self.body.pop();
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Empty only before the game is initialized
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Contents of a single board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Snake,
    Food,
}

impl Cell {
    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Snake => 'x',
            Cell::Food => 'o',
        }
    }
}

/// Row-major grid view derived from the snake and food positions.
///
/// The board is never edited cell by cell; it is rebuilt after every change
/// to the snake or the food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.width + pos.col
    }

    /// Cell at `pos`; out-of-bounds positions read as empty
    pub fn cell(&self, pos: Position) -> Cell {
        if self.is_in_bounds(pos) {
            self.cells[self.index(pos)]
        } else {
            Cell::Empty
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width)
    }

    pub fn empty_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Empty)
            .map(|(idx, _)| Position::new(idx / self.width, idx % self.width))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    pub fn rebuild(&mut self, snake: &Snake, food: Option<Position>) {
        self.cells.fill(Cell::Empty);
        if let Some(food) = food {
            let idx = self.index(food);
            self.cells[idx] = Cell::Food;
        }
        for &seg in &snake.body {
            let idx = self.index(seg);
            self.cells[idx] = Cell::Snake;
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let symbols: Vec<String> = row.iter().map(|c| c.symbol().to_string()).collect();
            writeln!(f, "[{}]", symbols.join("|"))?;
        }
        Ok(())
    }
}
