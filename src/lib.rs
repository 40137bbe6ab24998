pub mod math;
pub mod shapes;
pub mod bodies;
pub mod collision;
pub mod joints;
pub mod forces;
pub mod core;

/// Re-export common types for easier usage
pub use crate::core::{World, SimulationConfig, BodyHandle, JointHandle};
pub use crate::bodies::Body;
pub use crate::shapes::Shape;
pub use crate::math::Vector2;

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Degenerate constraint: {0}")]
        DegenerateConstraint(String),

        #[error("Internal error: {0}")]
        InternalError(String),
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
