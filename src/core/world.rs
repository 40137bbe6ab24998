//! The physics world: body and joint storage plus the fixed-timestep
//! simulation loop.

use std::collections::HashSet;

use log::debug;

use crate::bodies::Body;
use crate::collision::{narrow_phase, Arbiter, BroadPhaseStrategy, BruteForce, CollisionPair};
use crate::core::config::{RestingTolerances, SimulationConfig};
use crate::core::events::{
    BodyEvent, BodyEventType, CollisionEvent, CollisionListener, EventQueue,
};
use crate::core::storage::{BodyStorage, JointStorage, Storage};
use crate::core::{BodyHandle, JointHandle};
use crate::error::PhysicsError;
use crate::forces::ForceSource;
use crate::joints::Joint;
use crate::math::{Aabb, Vector2};
use crate::Result;

// Bodies slower than this (after solving) may fall asleep; the per-frame
// position and rotation tolerances are user configured
const RESTING_VELOCITY_TOLERANCE: f32 = 0.05;
const RESTING_ANGULAR_TOLERANCE: f32 = 0.05;

/// The simulation world.
///
/// Owns the bodies, joints, arbiters and force sources, and advances them
/// with [`World::step`]. The step order is fixed: forces, collision
/// detection, velocity integration, constraint pre-step, the iterative
/// impulse loop, position integration, then resting classification.
pub struct World {
    bodies: BodyStorage<Body>,
    joints: JointStorage<Box<dyn Joint>>,
    arbiters: Vec<Arbiter>,
    force_sources: Vec<Box<dyn ForceSource>>,
    listeners: Vec<Box<dyn CollisionListener>>,
    strategy: Box<dyn BroadPhaseStrategy>,
    config: SimulationConfig,
    events: EventQueue,
    simulation_time: f32,

    // Scratch buffer reused across steps for broad-phase input
    bounds_scratch: Vec<(BodyHandle, Aabb)>,
}

impl World {
    /// Creates a world with the given gravity and solver iteration count,
    /// using the brute-force broad phase
    pub fn new(gravity: Vector2, iterations: u32) -> Self {
        Self::with_config(SimulationConfig::new(gravity, iterations))
    }

    /// Creates a world from a full configuration
    pub fn with_config(config: SimulationConfig) -> Self {
        Self::with_strategy(config, Box::new(BruteForce::new()))
    }

    /// Creates a world with a custom broad-phase strategy
    pub fn with_strategy(config: SimulationConfig, strategy: Box<dyn BroadPhaseStrategy>) -> Self {
        Self {
            bodies: BodyStorage::new(),
            joints: JointStorage::new(),
            arbiters: Vec::new(),
            force_sources: Vec::new(),
            listeners: Vec::new(),
            strategy,
            config,
            events: EventQueue::new(),
            simulation_time: 0.0,
            bounds_scratch: Vec::new(),
        }
    }

    /// Adds a body to the world
    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let handle = self.bodies.add(body);
        self.events.add_body_event(BodyEvent {
            event_type: BodyEventType::Added,
            body: handle,
        });
        handle
    }

    /// Removes a body, dropping its arbiters and any joints attached to it
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<Body> {
        let body = self.bodies.remove(handle).ok_or_else(|| {
            PhysicsError::ResourceNotFound(format!("Body with handle {:?} not found", handle))
        })?;

        self.arbiters.retain(|arbiter| !arbiter.pair().involves(handle));

        let attached: Vec<JointHandle> = self
            .joints
            .iter()
            .filter(|(_, joint)| joint.involves(handle))
            .map(|(joint_handle, _)| joint_handle)
            .collect();
        for joint_handle in attached {
            self.joints.remove(joint_handle);
        }

        self.events.add_body_event(BodyEvent {
            event_type: BodyEventType::Removed,
            body: handle,
        });

        Ok(body)
    }

    /// Gets a reference to a body
    pub fn get_body(&self, handle: BodyHandle) -> Result<&Body> {
        self.bodies.get_body(handle)
    }

    /// Gets a mutable reference to a body
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut Body> {
        self.bodies.get_body_mut(handle)
    }

    /// Adds a joint; both bodies are woken so the constraint takes effect
    /// immediately
    pub fn add_joint(&mut self, joint: Box<dyn Joint>) -> JointHandle {
        let (a, b) = joint.bodies();
        if let Ok(body) = self.bodies.get_body_mut(a) {
            body.wake();
        }
        if let Ok(body) = self.bodies.get_body_mut(b) {
            body.wake();
        }
        self.joints.add(joint)
    }

    /// Removes a joint
    pub fn remove_joint(&mut self, handle: JointHandle) -> Result<()> {
        self.joints.get_joint(handle)?;
        self.joints.remove(handle);
        Ok(())
    }

    /// Adds an external force source; returns its index for later removal
    pub fn add_force_source(&mut self, source: Box<dyn ForceSource>) -> usize {
        self.force_sources.push(source);
        self.force_sources.len() - 1
    }

    /// Removes the force source at the given index, returning it.
    ///
    /// Indices of sources added after the removed one shift down by one.
    pub fn remove_force_source(&mut self, index: usize) -> Result<Box<dyn ForceSource>> {
        if index >= self.force_sources.len() {
            return Err(PhysicsError::ResourceNotFound(format!(
                "Force source with index {} not found",
                index
            )));
        }
        Ok(self.force_sources.remove(index))
    }

    /// Removes all force sources
    pub fn clear_force_sources(&mut self) {
        self.force_sources.clear();
    }

    /// Registers a collision listener, called once per newly-formed pair
    pub fn add_listener(&mut self, listener: Box<dyn CollisionListener>) {
        self.listeners.push(listener);
    }

    /// Enables resting-body detection with the given tolerances
    pub fn enable_resting_detection(
        &mut self,
        hit_tolerance: f32,
        rotation_tolerance: f32,
        position_tolerance: f32,
    ) {
        self.config.resting_tolerances = Some(RestingTolerances {
            hit_tolerance,
            rotation_tolerance,
            position_tolerance,
        });
    }

    /// Disables resting-body detection, waking every resting body
    pub fn disable_resting_detection(&mut self) {
        self.config.resting_tolerances = None;
        for (_, body) in self.bodies.iter_mut() {
            body.wake();
        }
    }

    /// The current gravity
    pub fn gravity(&self) -> Vector2 {
        self.config.gravity
    }

    /// Changes the gravity
    pub fn set_gravity(&mut self, gravity: Vector2) {
        self.config.gravity = gravity;
    }

    /// Changes the solver iteration count
    pub fn set_iterations(&mut self, iterations: u32) {
        self.config.iterations = iterations;
    }

    /// Changes the global damping factor (1.0 is lossless)
    pub fn set_damping(&mut self, damping: f32) {
        self.config.damping = damping;
    }

    /// Changes which exclusion-mask bits the pair filter ignores
    pub fn set_ignored_mask_bits(&mut self, bits: u64) {
        self.config.ignored_mask_bits = bits;
    }

    /// The event queue filled during the last step
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Mutable access to the event queue, for draining
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// The currently live arbiters
    pub fn arbiters(&self) -> &[Arbiter] {
        &self.arbiters
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of joints in the world
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Total simulated time
    pub fn simulation_time(&self) -> f32 {
        self.simulation_time
    }

    /// Removes everything from the world
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.joints.clear();
        self.arbiters.clear();
        self.force_sources.clear();
        self.events.clear();
        self.simulation_time = 0.0;
    }

    /// Advances the simulation by the configured fixed time step
    pub fn step(&mut self) -> Result<()> {
        self.step_dt(self.config.time_step)
    }

    /// Advances the simulation by an explicit time step
    pub fn step_dt(&mut self, dt: f32) -> Result<()> {
        self.events.clear();
        let inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };

        // 1. External force sources
        for source in &mut self.force_sources {
            source.apply(&mut self.bodies, dt);
        }

        // 2. Frame-start bookkeeping for resting detection; jointed bodies
        // can never rest since the joint may move them at any time
        if self.config.resting_tolerances.is_some() {
            for (_, body) in self.bodies.iter_mut() {
                body.start_frame();
            }
            let jointed: Vec<BodyHandle> = self
                .joints
                .iter()
                .flat_map(|(_, joint)| {
                    let (a, b) = joint.bodies();
                    [a, b]
                })
                .collect();
            for handle in jointed {
                if let Ok(body) = self.bodies.get_body_mut(handle) {
                    body.wake();
                }
            }
        }

        // 3. Collision detection and arbiter maintenance
        self.update_arbiters()?;

        // 4. Integrate forces into velocities
        let gravity = self.config.gravity;
        let damping = self.config.damping;
        for (_, body) in self.bodies.iter_mut() {
            if !body.is_enabled() || body.is_resting() {
                continue;
            }
            body.integrate_forces(gravity, damping, dt);
        }

        // 5. Pre-step the solver state
        for arbiter in &mut self.arbiters {
            let pair = arbiter.pair();
            let skip = {
                let a = self.bodies.get_body(pair.body_a())?;
                let b = self.bodies.get_body(pair.body_b())?;
                a.is_resting() && b.is_resting()
            };
            if skip {
                continue;
            }
            arbiter.pre_step(&mut self.bodies, inv_dt, damping)?;
        }
        for (_, joint) in self.joints.iter_mut() {
            joint.pre_step(&mut self.bodies, inv_dt)?;
        }

        // 6. Sequential impulse iterations
        for _ in 0..self.config.iterations {
            for arbiter in &mut self.arbiters {
                let pair = arbiter.pair();
                let skip = {
                    let a = self.bodies.get_body(pair.body_a())?;
                    let b = self.bodies.get_body(pair.body_b())?;
                    a.is_resting() && b.is_resting()
                };
                if skip {
                    continue;
                }
                arbiter.apply_impulse(&mut self.bodies)?;
            }
            for (_, joint) in self.joints.iter_mut() {
                joint.apply_impulse(&mut self.bodies)?;
            }
        }

        // 7. Integrate velocities into positions
        for (_, body) in self.bodies.iter_mut() {
            if !body.is_enabled() || body.is_static() {
                continue;
            }
            body.integrate_position(dt);
        }

        // 8. Resting classification
        if let Some(tolerances) = self.config.resting_tolerances {
            self.classify_resting(tolerances);
        }

        self.simulation_time += dt;
        Ok(())
    }

    /// Runs broad and narrow phase and merges the results into the arbiter
    /// list. Pairs with no remaining contacts lose their arbiter; pairs
    /// frozen by resting keep theirs untouched.
    fn update_arbiters(&mut self) -> Result<()> {
        self.bounds_scratch.clear();
        for (handle, body) in self.bodies.iter() {
            if body.is_enabled() {
                self.bounds_scratch
                    .push((handle, body.shape().world_bounds(body.position())));
            }
        }
        self.strategy.update(&self.bounds_scratch);
        let candidates = self.strategy.candidate_pairs();

        let hit_tolerance = self.config.resting_tolerances.map(|t| t.hit_tolerance);
        let ignored_bits = self.config.ignored_mask_bits;

        let mut touched: HashSet<CollisionPair> = HashSet::new();
        let mut frozen: HashSet<CollisionPair> = HashSet::new();

        for (handle_a, handle_b) in candidates {
            let (pair, contacts, touch_info) = {
                let a = self.bodies.get_body(handle_a)?;
                let b = self.bodies.get_body(handle_b)?;

                if !a.is_enabled() || !b.is_enabled() {
                    continue;
                }
                if (a.bitmask() & b.bitmask()) & !ignored_bits != 0 {
                    continue;
                }
                if a.excludes(handle_b) || b.excludes(handle_a) {
                    continue;
                }

                let pair = CollisionPair::new(handle_a, handle_b, a.is_static(), b.is_static());

                // Two immovable bodies (static or frozen by resting) have
                // nothing to resolve; their arbiter, if any, stays as is
                if a.inv_mass() == 0.0
                    && b.inv_mass() == 0.0
                    && a.inv_inertia() == 0.0
                    && b.inv_inertia() == 0.0
                {
                    frozen.insert(pair);
                    continue;
                }

                let first = self.bodies.get_body(pair.body_a())?;
                let second = self.bodies.get_body(pair.body_b())?;
                let contacts = match narrow_phase::collide(first, second) {
                    Some(contacts) => contacts,
                    None => continue,
                };
                if contacts.is_empty() {
                    continue;
                }

                // Resting bookkeeping: note the touch, and whether either
                // side counts as a hard hit on the other
                let touch_info = hit_tolerance.map(|tolerance| {
                    let hard_on_first = !second.is_resting()
                        && second.velocity().length() + second.angular_velocity().abs()
                            > tolerance;
                    let hard_on_second = !first.is_resting()
                        && first.velocity().length() + first.angular_velocity().abs() > tolerance;
                    (hard_on_first, hard_on_second)
                });

                (pair, contacts, touch_info)
            };

            if let Some((hard_on_first, hard_on_second)) = touch_info {
                let first = self.bodies.get_body_mut(pair.body_a())?;
                first.record_touch(pair.body_b(), hard_on_first);
                if hard_on_first && first.is_resting() && !first.is_static() {
                    first.wake();
                    self.events.add_body_event(BodyEvent {
                        event_type: BodyEventType::Woken,
                        body: pair.body_a(),
                    });
                }

                let second = self.bodies.get_body_mut(pair.body_b())?;
                second.record_touch(pair.body_a(), hard_on_second);
                if hard_on_second && second.is_resting() && !second.is_static() {
                    second.wake();
                    self.events.add_body_event(BodyEvent {
                        event_type: BodyEventType::Woken,
                        body: pair.body_b(),
                    });
                }
            }

            touched.insert(pair);
            self.merge_arbiter(pair, contacts)?;
        }

        // Frozen pairs skipped narrow phase, but a retained arbiter is
        // still a live contact. The touch has to be re-recorded every
        // frame or a resting stack loses its support chain
        if hit_tolerance.is_some() {
            for arbiter in &self.arbiters {
                let pair = arbiter.pair();
                if !frozen.contains(&pair) {
                    continue;
                }
                if let Ok(first) = self.bodies.get_body_mut(pair.body_a()) {
                    first.record_touch(pair.body_b(), false);
                }
                if let Ok(second) = self.bodies.get_body_mut(pair.body_b()) {
                    second.record_touch(pair.body_a(), false);
                }
            }
        }

        self.arbiters
            .retain(|arbiter| touched.contains(&arbiter.pair()) || frozen.contains(&arbiter.pair()));

        Ok(())
    }

    /// Folds a fresh contact set into the pair's arbiter, creating it (and
    /// firing the collision event) when the pair is new
    fn merge_arbiter(&mut self, pair: CollisionPair, contacts: Vec<crate::collision::Contact>) -> Result<()> {
        if let Some(arbiter) = self.arbiters.iter_mut().find(|a| a.pair() == pair) {
            arbiter.update_contacts(&contacts);
            return Ok(());
        }

        let (first, second) = (
            self.bodies.get_body(pair.body_a())?,
            self.bodies.get_body(pair.body_b())?,
        );
        let mut arbiter = Arbiter::new(pair, first, second);
        arbiter.update_contacts(&contacts);

        let event = CollisionEvent {
            time: self.simulation_time,
            body_a: pair.body_a(),
            body_b: pair.body_b(),
            point: contacts[0].position,
            normal: contacts[0].normal,
            penetration_depth: -contacts[0].separation,
        };
        self.events.add_collision_event(event);
        for listener in &mut self.listeners {
            listener.collision_occurred(&event);
        }
        debug!(
            "new contact pair {:?} / {:?} ({} contacts)",
            pair.body_a(),
            pair.body_b(),
            contacts.len()
        );

        self.arbiters.push(arbiter);
        Ok(())
    }

    /// End-of-step resting classification.
    ///
    /// Wakes resting bodies that moved or were struck, then puts slow,
    /// unstruck bodies to sleep if they are transitively supported by a
    /// static body through the touching graph.
    fn classify_resting(&mut self, tolerances: RestingTolerances) {
        let handles = self.bodies.handles();

        // Wake pass
        for handle in &handles {
            let Some(body) = self.bodies.get_mut(*handle) else {
                continue;
            };
            if body.is_static() || !body.is_resting() {
                continue;
            }
            if body.was_hit_this_frame()
                || body.movement_since_frame_start() > tolerances.position_tolerance
                || body.rotation_since_frame_start() > tolerances.rotation_tolerance
            {
                body.wake();
                self.events.add_body_event(BodyEvent {
                    event_type: BodyEventType::Woken,
                    body: *handle,
                });
            }
        }

        // Stable set: bodies that are already resting or slow enough to
        // rest this frame
        let mut stable: HashSet<BodyHandle> = HashSet::new();
        for handle in &handles {
            let Some(body) = self.bodies.get(*handle) else {
                continue;
            };
            if body.is_static() {
                continue;
            }
            if body.is_resting() {
                stable.insert(*handle);
                continue;
            }
            if !body.was_hit_this_frame()
                && body.movement_since_frame_start() < tolerances.position_tolerance
                && body.rotation_since_frame_start() < tolerances.rotation_tolerance
                && body.velocity().length() < RESTING_VELOCITY_TOLERANCE
                && body.angular_velocity().abs() < RESTING_ANGULAR_TOLERANCE
            {
                stable.insert(*handle);
            }
        }

        // A candidate may rest only when a static body is reachable from it
        // through stable touching bodies
        for handle in &handles {
            let Some(body) = self.bodies.get(*handle) else {
                continue;
            };
            if body.is_static() || body.is_resting() || !stable.contains(handle) {
                continue;
            }

            if self.supported_by_static(*handle, &stable) {
                if let Some(body) = self.bodies.get_mut(*handle) {
                    body.set_resting();
                    self.events.add_body_event(BodyEvent {
                        event_type: BodyEventType::Resting,
                        body: *handle,
                    });
                }
            }
        }
    }

    /// Breadth-first search through the touching graph, restricted to
    /// stable bodies, looking for a static support
    fn supported_by_static(&self, start: BodyHandle, stable: &HashSet<BodyHandle>) -> bool {
        let mut visited: HashSet<BodyHandle> = HashSet::new();
        let mut queue = vec![start];
        visited.insert(start);

        while let Some(current) = queue.pop() {
            let Some(body) = self.bodies.get(current) else {
                continue;
            };
            for touched in body.touching() {
                let Some(other) = self.bodies.get(*touched) else {
                    continue;
                };
                if other.is_static() {
                    return true;
                }
                if stable.contains(touched) && visited.insert(*touched) {
                    queue.push(*touched);
                }
            }
        }

        false
    }
}
