use std::collections::VecDeque;

use crate::core::BodyHandle;
use crate::math::Vector2;

/// A collision event, emitted exactly once per newly-formed contacting pair
/// per step (persisting contacts do not re-fire)
#[derive(Debug, Clone, Copy)]
pub struct CollisionEvent {
    /// Simulation time at which the contact formed
    pub time: f32,

    /// The first body of the pair
    pub body_a: BodyHandle,

    /// The second body of the pair
    pub body_b: BodyHandle,

    /// A representative contact point in world space
    pub point: Vector2,

    /// Contact normal, pointing away from the first body
    pub normal: Vector2,

    /// Penetration depth at the representative point (positive = overlapping)
    pub penetration_depth: f32,
}

/// Types of body events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEventType {
    /// A body has been added to the world
    Added,

    /// A body has been removed from the world
    Removed,

    /// A body has been classified as resting
    Resting,

    /// A resting body has been re-activated
    Woken,
}

/// An event related to a single body
#[derive(Debug, Clone, Copy)]
pub struct BodyEvent {
    /// The type of body event
    pub event_type: BodyEventType,

    /// The body that the event refers to
    pub body: BodyHandle,
}

/// Receives collision notifications as they happen during a step
pub trait CollisionListener {
    /// Called once for every newly-formed contacting pair
    fn collision_occurred(&mut self, event: &CollisionEvent);
}

/// A queue of physics events, cleared at the start of every step
#[derive(Debug, Default)]
pub struct EventQueue {
    collision_events: VecDeque<CollisionEvent>,
    body_events: VecDeque<BodyEvent>,
}

impl EventQueue {
    /// Creates a new empty event queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collision event to the queue
    pub fn add_collision_event(&mut self, event: CollisionEvent) {
        self.collision_events.push_back(event);
    }

    /// Adds a body event to the queue
    pub fn add_body_event(&mut self, event: BodyEvent) {
        self.body_events.push_back(event);
    }

    /// Gets the next collision event from the queue
    pub fn next_collision_event(&mut self) -> Option<CollisionEvent> {
        self.collision_events.pop_front()
    }

    /// Gets the next body event from the queue
    pub fn next_body_event(&mut self) -> Option<BodyEvent> {
        self.body_events.pop_front()
    }

    /// Returns whether there are any collision events in the queue
    pub fn has_collision_events(&self) -> bool {
        !self.collision_events.is_empty()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.collision_events.is_empty() && self.body_events.is_empty()
    }

    /// Clears all events from the queue
    pub fn clear(&mut self) {
        self.collision_events.clear();
        self.body_events.clear();
    }

    /// Gets all collision events involving a specific body
    pub fn collision_events_for_body(&self, body: BodyHandle) -> Vec<&CollisionEvent> {
        self.collision_events
            .iter()
            .filter(|e| e.body_a == body || e.body_b == body)
            .collect()
    }

    /// Gets all body events of a specific type
    pub fn body_events_of_type(&self, event_type: BodyEventType) -> Vec<&BodyEvent> {
        self.body_events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}
