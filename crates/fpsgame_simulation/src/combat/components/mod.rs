//! Combat components

pub mod collision;
pub mod projectile;
pub mod weapon;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod projectile_tests;
#[cfg(test)]
mod weapon_tests;

// Re-export all components
pub use collision::*;
pub use projectile::*;
pub use weapon::*;
