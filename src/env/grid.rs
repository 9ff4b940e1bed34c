//! Grid navigation task

use crate::{
    encoding::{CoordinateEncoder, StateEncoder, StateVector},
    error::{Error, Result},
    ports::{Environment, Step},
};

/// Grid moves, in action-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL.get(index).copied().ok_or(Error::UnknownActionIndex {
            index,
            count: Self::ALL.len(),
        })
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Move::Up => (0, -1),
            Move::Down => (0, 1),
            Move::Left => (-1, 0),
            Move::Right => (1, 0),
        }
    }
}

/// Square grid with a single goal cell.
///
/// Moves off the board leave the agent against the edge. Every move costs
/// `step_reward`; entering the goal pays `goal_reward` and ends the episode.
/// Episodes that run `max_steps` moves are cut short.
#[derive(Debug, Clone)]
pub struct GridWorld {
    size: i32,
    start: (i32, i32),
    goal: (i32, i32),
    max_steps: usize,
    goal_reward: f64,
    step_reward: f64,
    position: (i32, i32),
    steps: usize,
}

impl GridWorld {
    /// 4×4 grid from (0, 0) to (3, 0), +10 at the goal, −0.1 per move, 50 moves.
    pub fn new() -> Self {
        Self {
            size: 4,
            start: (0, 0),
            goal: (3, 0),
            max_steps: 50,
            goal_reward: 10.0,
            step_reward: -0.1,
            position: (0, 0),
            steps: 0,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    pub fn goal(&self) -> (i32, i32) {
        self.goal
    }
}

impl Default for GridWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for GridWorld {
    fn action_count(&self) -> usize {
        Move::ALL.len()
    }

    fn state_size(&self) -> usize {
        CoordinateEncoder.state_size()
    }

    fn reset(&mut self) -> StateVector {
        self.position = self.start;
        self.steps = 0;
        self.state()
    }

    fn state(&self) -> StateVector {
        CoordinateEncoder.encode(&self.position)
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        let (dx, dy) = Move::from_index(action)?.delta();
        let (x, y) = self.position;
        self.position = (
            (x + dx).clamp(0, self.size - 1),
            (y + dy).clamp(0, self.size - 1),
        );
        self.steps += 1;

        let reached = self.position == self.goal;
        Ok(Step {
            next_state: self.state(),
            reward: if reached {
                self.goal_reward
            } else {
                self.step_reward
            },
            terminal: reached,
            done: reached || self.steps >= self.max_steps,
            success: reached,
        })
    }
}
