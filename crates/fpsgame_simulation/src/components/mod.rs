//! ECS Components для combatant entity
//!
//! Организация по доменам:
//! - actor: health и control gate (Combatant, Health, MovementControl, SpawnPoint)
//! - player: player control marker (Player)
//! - input: абстрактный input source (CombatInputEvent → CombatInput)
//! - look: camera pitch/yaw, цель для recoil (LookControl)

pub mod actor;
pub mod input;
pub mod look;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use input::{CombatInput, CombatInputEvent, TriggerInput};
pub use look::*;
pub use player::*;
