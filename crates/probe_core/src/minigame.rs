//! Launch-timing minigame: a cursor sweeping 0..=100 that the player stops
//! as close to the target as they can.

use crate::Constants;
use serde::{Deserialize, Serialize};

/// Distance under which a stop counts as a perfect launch.
const PERFECT_WINDOW: f32 = 2.0;

/// Quality band of a stopped sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepBand {
    Perfect,
    Great,
    Good,
    Bad,
}

impl SweepBand {
    pub fn label(self) -> &'static str {
        match self {
            SweepBand::Perfect => "PERFECT",
            SweepBand::Great => "GREAT",
            SweepBand::Good => "GOOD",
            SweepBand::Bad => "BAD",
        }
    }
}

/// Terminal score of one sweep. Computed exactly once, at the stop action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchGrade {
    pub score: u32,
    pub band: SweepBand,
}

/// One running sweep. Transient: never part of the persisted configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinigameSession {
    /// Cursor position, always within [0, 100].
    pub position: f32,
    /// +1.0 sweeping right, -1.0 sweeping left.
    pub direction: f32,
    pub active: bool,
    pub step: f32,
    pub target_pos: f32,
    pub tolerance: f32,
}

impl MinigameSession {
    pub fn new(constants: &Constants) -> Self {
        MinigameSession {
            position: 0.0,
            direction: 1.0,
            active: true,
            step: constants.sweep_step,
            target_pos: constants.sweep_target_pos,
            tolerance: constants.sweep_tolerance,
        }
    }

    /// Advance one animation frame. The cursor clamps at the rails and the
    /// direction flips exactly there, never before.
    pub fn tick(&mut self) {
        if !self.active {
            return;
        }
        let next = self.position + self.direction * self.step;
        if next >= 100.0 {
            self.position = 100.0;
            self.direction = -1.0;
        } else if next <= 0.0 {
            self.position = 0.0;
            self.direction = 1.0;
        } else {
            self.position = next;
        }
    }

    /// Stop the sweep and grade it. Returns `None` when the session already
    /// stopped — a second stop never re-scores.
    pub fn stop(&mut self) -> Option<LaunchGrade> {
        if !self.active {
            return None;
        }
        self.active = false;
        let distance = (self.position - self.target_pos).abs();
        Some(grade_for_distance(distance, self.tolerance))
    }
}

/// Score banding by distance from the target. Thresholds are strict so a
/// distance exactly on a boundary falls to the worse band.
pub fn grade_for_distance(distance: f32, tolerance: f32) -> LaunchGrade {
    if distance < PERFECT_WINDOW {
        LaunchGrade {
            score: 100,
            band: SweepBand::Perfect,
        }
    } else if distance < tolerance / 2.0 {
        LaunchGrade {
            score: 80,
            band: SweepBand::Great,
        }
    } else if distance < tolerance {
        LaunchGrade {
            score: 50,
            band: SweepBand::Good,
        }
    } else {
        LaunchGrade {
            score: 10,
            band: SweepBand::Bad,
        }
    }
}
