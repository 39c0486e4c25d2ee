//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod adversary;
pub mod collision;
pub mod ledger;
pub mod progression;
pub mod projectile;
pub mod registry;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weapon;

pub use adversary::{Adversary, Boss, BossKind, BossShot};
pub use collision::{Battlefield, StrikeResult, Target, TargetKey, TargetSet, sd_circle};
pub use ledger::{DamageLedger, LedgerEntry};
pub use progression::CHOICES_PER_LEVEL;
pub use projectile::{AreaEffect, Motion, Projectile};
pub use registry::{EntityId, Registry};
pub use snapshot::Snapshot;
pub use state::{OrbitHit, Phase, Pickup, PickupKind, Player, SimState, WeaponChange};
pub use tick::{TickInput, advance};
pub use weapon::{Emission, FireContext, MAX_TIER, Pattern, Weapon, WeaponKind};
