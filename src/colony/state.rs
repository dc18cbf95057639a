use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Playing,
    /// Terminal until the game is reset.
    Dead,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    phase: Phase,
    pub first_goal: bool,
    pub show_hint: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: Phase::Playing,
            first_goal: true,
            show_hint: true,
        }
    }
}

impl GameState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn set_dead(&mut self) {
        if self.phase != Phase::Dead {
            tracing::warn!("Colony is dead");
        }
        self.phase = Phase::Dead;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
