//! Where die faces come from.

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::StdRng;

use super::Die;

/// A source of die faces.
///
/// Resolvers take `&mut dyn RandomSource` so tests and replays can script
/// exact faces while normal play draws from a seeded [`StdRng`].
pub trait RandomSource {
    /// Draw one face of `die`, in `1..=die.sides()`.
    fn roll_die(&mut self, die: Die) -> u32;
}

impl RandomSource for StdRng {
    fn roll_die(&mut self, die: Die) -> u32 {
        self.random_range(1..=die.sides().max(1))
    }
}

/// Replays a fixed sequence of faces.
///
/// Once the script runs out the last face repeats (or 1 if the script was
/// empty). Faces are clamped to the die being rolled.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
    last: Option<u32>,
    drawn: usize,
}

impl ScriptedDice {
    /// Script the given faces.
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            last: None,
            drawn: 0,
        }
    }

    /// Number of faces drawn so far.
    pub fn drawn(&self) -> usize {
        self.drawn
    }

    /// Number of scripted faces not yet drawn.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl RandomSource for ScriptedDice {
    fn roll_die(&mut self, die: Die) -> u32 {
        let face = self.faces.pop_front().or(self.last).unwrap_or(1);
        self.last = Some(face);
        self.drawn += 1;
        face.clamp(1, die.sides().max(1))
    }
}
