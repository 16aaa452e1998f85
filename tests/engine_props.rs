//! Invariant tests for the engine driven through its public API.

use proptest::prelude::*;
use std::collections::HashSet;
use wrap_snake::game::{
    Cell, Direction, GameConfig, GameEngine, Phase, Position, StepOutcome, Turn,
};

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

fn assert_consistent(engine: &GameEngine) {
    let body = &engine.snake().body;
    let distinct: HashSet<Position> = body.iter().copied().collect();
    if engine.phase() != Phase::GameOver {
        assert_eq!(distinct.len(), body.len(), "segments overlap: {:?}", body);
    }
    for seg in body {
        assert!(seg.row < engine.height() && seg.col < engine.width());
        assert_eq!(engine.cell(*seg), Cell::Snake);
    }
    if let Some(food) = engine.food() {
        assert!(!distinct.contains(&food));
        assert_eq!(engine.cell(food), Cell::Food);
    }

    let snake_cells = engine
        .board()
        .rows()
        .flatten()
        .filter(|c| **c == Cell::Snake)
        .count();
    assert_eq!(snake_cells, distinct.len());
}

proptest! {
    #[test]
    fn reversal_rejected_iff_opposite(current in direction(), next in direction()) {
        let mut engine = GameEngine::with_seed(GameConfig::small(), 0).unwrap();
        engine.init();
        prop_assert_eq!(engine.set_direction(current), Turn::Accepted);

        let turn = engine.set_direction(next);
        if next == current.opposite() {
            prop_assert_eq!(turn, Turn::Rejected);
            prop_assert_eq!(engine.direction(), Some(current));
        } else {
            prop_assert_eq!(turn, Turn::Accepted);
            prop_assert_eq!(engine.direction(), Some(next));
        }
    }

    #[test]
    fn head_wraps_off_every_edge(
        width in 1usize..12,
        height in 1usize..12,
        dir in direction(),
        along in 0usize..12,
    ) {
        let (row, col) = match dir {
            Direction::Up => (0, along % width),
            Direction::Down => (height - 1, along % width),
            Direction::Left => (along % height, 0),
            Direction::Right => (along % height, width - 1),
        };
        let start = Position::new(row, col);
        let landed = start.stepped(dir, width, height);
        let expected = match dir {
            Direction::Up => Position::new(height - 1, col),
            Direction::Down => Position::new(0, col),
            Direction::Left => Position::new(row, width - 1),
            Direction::Right => Position::new(row, 0),
        };
        prop_assert_eq!(landed, expected);
    }

    #[test]
    fn random_games_keep_invariants(
        seed in any::<u64>(),
        width in 2usize..8,
        height in 2usize..8,
        turns in prop::collection::vec(direction(), 1..200),
    ) {
        let mut engine = GameEngine::with_seed(GameConfig::new(width, height), seed).unwrap();
        engine.init();
        assert_consistent(&engine);

        for dir in turns {
            engine.set_direction(dir);
            let before = engine.snake().body.clone();
            let score = engine.score();
            let food = engine.food();
            let next = before[0].stepped(engine.direction().unwrap(), width, height);

            let outcome = engine.next_step().unwrap();
            let after = &engine.snake().body;

            match outcome {
                StepOutcome::Ate | StepOutcome::Won => {
                    prop_assert_eq!(Some(next), food);
                    prop_assert_eq!(after.len(), before.len() + 1);
                    prop_assert_eq!(engine.score(), score + 1);
                    prop_assert_eq!(&after[1..], &before[..]);
                }
                StepOutcome::Moved | StepOutcome::GameOver => {
                    prop_assert_eq!(after.len(), before.len());
                    prop_assert_eq!(after[0], next);
                    prop_assert_eq!(&after[1..], &before[..before.len() - 1]);
                    prop_assert_eq!(engine.score(), score);
                }
                StepOutcome::Idle => unreachable!("direction is always set"),
            }
            assert_consistent(&engine);

            if outcome.is_terminal() {
                prop_assert!(engine.is_over());
                break;
            }
        }
    }
}

#[test]
fn sweeping_the_board_ends_the_game() {
    // Four steps right then one down visits every cell of a 4x4 board, so
    // the snake keeps finding food until it runs into itself.
    let mut engine = GameEngine::with_seed(GameConfig::new(4, 4), 11).unwrap();
    engine.init();
    engine.go_right();

    let mut ticks = 0;
    loop {
        let outcome = engine.next_step().unwrap();
        ticks += 1;
        if outcome.is_terminal() || ticks > 10_000 {
            break;
        }
        if ticks % 4 == 0 {
            engine.go_down();
            engine.next_step().unwrap();
            engine.go_right();
        }
    }
    assert!(ticks <= 10_000);
    assert!(engine.is_over());
}
