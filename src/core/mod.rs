pub mod world;
pub mod config;
pub mod storage;
pub mod events;

pub use self::config::{RestingTolerances, SimulationConfig};
pub use self::events::{BodyEvent, BodyEventType, CollisionEvent, CollisionListener, EventQueue};
pub use self::storage::{BodyStorage, JointStorage, Storage};
pub use self::world::World;

/// A unique identifier for a body in the physics world.
///
/// Handles are allocated by the owning world; equality and hashing compare
/// the handle value, never object identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u32);

/// A unique identifier for a joint in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointHandle(pub(crate) u32);
