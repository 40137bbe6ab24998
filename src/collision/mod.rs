pub mod arbiter;
pub mod broad_phase;
pub mod collision_pair;
pub mod colliders;
pub mod contact;
pub mod narrow_phase;

pub use arbiter::{Arbiter, MAX_CONTACTS};
pub use broad_phase::{BroadPhaseStrategy, BruteForce};
pub use collision_pair::CollisionPair;
pub use contact::{Contact, FeatureId};
