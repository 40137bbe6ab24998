use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Tolerances driving the optional resting-body detection
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RestingTolerances {
    /// Velocity above which a striking body wakes (or keeps awake) its target
    pub hit_tolerance: f32,

    /// Rotation change per frame above which a body cannot rest
    pub rotation_tolerance: f32,

    /// Position change per frame above which a body cannot rest
    pub position_tolerance: f32,
}

/// Configuration parameters for the physics simulation
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// The fixed time step for the simulation
    pub time_step: f32,

    /// Gravity applied to gravity-affected bodies during force integration
    pub gravity: Vector2,

    /// The number of sequential-impulse iterations per step
    pub iterations: u32,

    /// Global velocity damping factor applied each step; 1.0 is lossless
    pub damping: f32,

    /// Resting-body detection thresholds; `None` disables the feature
    pub resting_tolerances: Option<RestingTolerances>,

    /// Exclusion-mask bits ignored by the pair filter (world-level override)
    pub ignored_mask_bits: u64,
}

impl SimulationConfig {
    /// Creates a configuration with the given gravity and iteration count
    pub fn new(gravity: Vector2, iterations: u32) -> Self {
        Self {
            gravity,
            iterations,
            ..Self::default()
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            gravity: Vector2::new(0.0, 10.0),
            iterations: 10,
            damping: 1.0,
            resting_tolerances: None,
            ignored_mask_bits: 0,
        }
    }
}
