#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Supply of upcoming pipes handed to the player.
//!
//! The queue always holds at least its visible length. Consuming the head
//! draws a fresh shape uniformly from [`PipeShape::RANDOM`]. Undo pushes a
//! pipe back onto the head. A single replacement token turns the head into a
//! cross once per queue.

use std::{collections::VecDeque, num::NonZeroUsize};

use pipeflow_core::{Pipe, PipeShape};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Lookahead queue of pipes waiting to be placed.
#[derive(Clone, Debug)]
pub struct PipeQueue {
    pipes: VecDeque<Pipe>,
    length: NonZeroUsize,
    rng: ChaCha8Rng,
    replace_available: bool,
}

impl PipeQueue {
    /// Creates a queue filled with random pipes drawn from `rng`.
    #[must_use]
    pub fn new(length: NonZeroUsize, rng: ChaCha8Rng) -> Self {
        Self::with_pipes(length, Vec::new(), rng)
    }

    /// Creates a queue whose first entries are `pipes` in order, topped up
    /// with random pipes until `length` are available.
    #[must_use]
    pub fn with_pipes(length: NonZeroUsize, pipes: Vec<Pipe>, rng: ChaCha8Rng) -> Self {
        let mut queue = Self {
            pipes: pipes.into_iter().collect(),
            length,
            rng,
            replace_available: true,
        };
        queue.refill();
        queue
    }

    /// Creates a random queue from a fixed seed.
    #[must_use]
    pub fn seeded(length: NonZeroUsize, seed: u64) -> Self {
        Self::new(length, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Number of pipes shown to the player.
    #[must_use]
    pub const fn length(&self) -> NonZeroUsize {
        self.length
    }

    /// Pipe that the next placement will use.
    #[must_use]
    pub fn peek(&self) -> Pipe {
        match self.pipes.front() {
            Some(pipe) => *pipe,
            None => unreachable!("pipe queue is refilled after every removal"),
        }
    }

    /// Pipes visible to the player, head first.
    pub fn visible(&self) -> impl Iterator<Item = Pipe> + '_ {
        self.pipes.iter().copied().take(self.length.get())
    }

    /// Removes and returns the head, drawing new pipes so the queue keeps
    /// its visible length.
    pub fn consume(&mut self) -> Pipe {
        let head = self.peek();
        let _ = self.pipes.pop_front();
        self.refill();
        head
    }

    /// Returns `pipe` to the head of the queue.
    pub fn undo(&mut self, pipe: Pipe) {
        self.pipes.push_front(pipe);
    }

    /// Whether the cross replacement has not been spent yet.
    #[must_use]
    pub const fn replace_available(&self) -> bool {
        self.replace_available
    }

    /// Spends the replacement token to turn the head into a cross.
    ///
    /// Returns `false` without touching the queue once the token is gone.
    pub fn try_replace_head_with_cross(&mut self) -> bool {
        if !self.replace_available {
            return false;
        }
        self.replace_available = false;
        if let Some(head) = self.pipes.front_mut() {
            *head = Pipe::new(PipeShape::Cross);
        }
        debug!("head of pipe queue replaced with a cross");
        true
    }

    fn refill(&mut self) {
        while self.pipes.len() < self.length.get() {
            let shape = PipeShape::RANDOM
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(PipeShape::Horizontal);
            self.pipes.push_back(Pipe::new(shape));
        }
    }
}
