//! Persistent contact constraint between one pair of bodies.
//!
//! An arbiter lives as long as its pair keeps touching. Each step the fresh
//! contact set is merged into the old one by feature id so accumulated
//! impulses survive, which is what lets stacks converge over a handful of
//! iterations instead of hundreds.

use crate::bodies::Body;
use crate::collision::collision_pair::CollisionPair;
use crate::collision::contact::Contact;
use crate::core::storage::BodyStorage;
use crate::math::{Vector2, EPSILON};
use crate::Result;

/// Hard cap on the number of contacts an arbiter tracks
pub const MAX_CONTACTS: usize = 10;

// Fraction of the remaining penetration corrected per step
const BIAS_FACTOR: f32 = 0.8;

// Penetration left uncorrected so resting contacts stay in touch
const ALLOWED_PENETRATION: f32 = 0.01;

/// The contact-solving state for one colliding pair
pub struct Arbiter {
    pair: CollisionPair,
    contacts: Vec<Contact>,
    friction: f32,
}

impl Arbiter {
    /// Creates an arbiter for the pair; friction combines as the geometric
    /// mean of the two bodies' coefficients
    pub fn new(pair: CollisionPair, body_a: &Body, body_b: &Body) -> Self {
        Self {
            pair,
            contacts: Vec::new(),
            friction: (body_a.friction() * body_b.friction()).sqrt(),
        }
    }

    /// The pair this arbiter solves
    pub fn pair(&self) -> CollisionPair {
        self.pair
    }

    /// The current contact set
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Returns whether any contacts remain
    pub fn has_contacts(&self) -> bool {
        !self.contacts.is_empty()
    }

    /// Replaces the contact set with this step's contacts, carrying the
    /// accumulated impulses of any contact whose feature id persists
    pub fn update_contacts(&mut self, fresh: &[Contact]) {
        let mut merged = Vec::with_capacity(fresh.len().min(MAX_CONTACTS));

        for new_contact in fresh.iter().take(MAX_CONTACTS) {
            let mut contact = *new_contact;
            if let Some(old) = self
                .contacts
                .iter()
                .find(|c| c.feature == new_contact.feature)
            {
                contact.accumulated_normal_impulse = old.accumulated_normal_impulse;
                contact.accumulated_tangent_impulse = old.accumulated_tangent_impulse;
            }
            merged.push(contact);
        }

        self.contacts = merged;
    }

    /// Precomputes effective masses and bias velocities, and applies the
    /// warm-starting impulse. The warm-start is scaled by the damping
    /// factor so a lossy world does not re-inject last step's full impulse.
    pub fn pre_step(
        &mut self,
        bodies: &mut BodyStorage<Body>,
        inv_dt: f32,
        damping: f32,
    ) -> Result<()> {
        let (body_a, body_b) = bodies.get_pair_mut(self.pair.body_a(), self.pair.body_b())?;
        let restitution = body_a.restitution() * body_b.restitution();

        for contact in &mut self.contacts {
            let r1 = contact.position - body_a.position();
            let r2 = contact.position - body_b.position();
            let normal = contact.normal;

            // Effective mass along the normal
            let rn1 = r1.dot(&normal);
            let rn2 = r2.dot(&normal);
            let k_normal = body_a.inv_mass()
                + body_b.inv_mass()
                + body_a.inv_inertia() * (r1.dot(&r1) - rn1 * rn1)
                + body_b.inv_inertia() * (r2.dot(&r2) - rn2 * rn2);
            contact.mass_normal = if k_normal > EPSILON {
                1.0 / k_normal
            } else {
                0.0
            };

            // Effective mass along the tangent
            let tangent = Vector2::new(normal.y, -normal.x);
            let rt1 = r1.dot(&tangent);
            let rt2 = r2.dot(&tangent);
            let k_tangent = body_a.inv_mass()
                + body_b.inv_mass()
                + body_a.inv_inertia() * (r1.dot(&r1) - rt1 * rt1)
                + body_b.inv_inertia() * (r2.dot(&r2) - rt2 * rt2);
            contact.mass_tangent = if k_tangent > EPSILON {
                1.0 / k_tangent
            } else {
                0.0
            };

            // Push-out velocity for the biased channel, leaving a small
            // allowed penetration so contacts do not separate and re-form
            // every other frame
            contact.bias =
                -BIAS_FACTOR * inv_dt * (contact.separation + ALLOWED_PENETRATION).min(0.0);

            // Restitution target from the approach velocity
            let relative_velocity = body_b.velocity() + Vector2::cross_scalar(body_b.angular_velocity(), &r2)
                - body_a.velocity()
                - Vector2::cross_scalar(body_a.angular_velocity(), &r1);
            let approach = relative_velocity.dot(&normal);
            contact.restitution_bias = if approach < 0.0 {
                -restitution * approach
            } else {
                0.0
            };

            // Warm start with the impulses carried over from last step
            let impulse = (normal * contact.accumulated_normal_impulse
                + tangent * contact.accumulated_tangent_impulse)
                * damping;
            body_a.adjust_velocity(-impulse * body_a.inv_mass());
            body_a.adjust_angular_velocity(-body_a.inv_inertia() * r1.cross(&impulse));
            body_b.adjust_velocity(impulse * body_b.inv_mass());
            body_b.adjust_angular_velocity(body_b.inv_inertia() * r2.cross(&impulse));

            contact.accumulated_bias_impulse = 0.0;
        }

        Ok(())
    }

    /// One Gauss-Seidel pass over the contacts: normal impulse with
    /// accumulated clamping, bias impulse on the separate biased channel,
    /// then friction clamped by the friction cone
    pub fn apply_impulse(&mut self, bodies: &mut BodyStorage<Body>) -> Result<()> {
        let (body_a, body_b) = bodies.get_pair_mut(self.pair.body_a(), self.pair.body_b())?;

        for contact in &mut self.contacts {
            let r1 = contact.position - body_a.position();
            let r2 = contact.position - body_b.position();
            let normal = contact.normal;
            let tangent = Vector2::new(normal.y, -normal.x);

            // Normal impulse
            let relative_velocity = body_b.velocity() + Vector2::cross_scalar(body_b.angular_velocity(), &r2)
                - body_a.velocity()
                - Vector2::cross_scalar(body_a.angular_velocity(), &r1);
            let vn = relative_velocity.dot(&normal);
            let delta = contact.mass_normal * (contact.restitution_bias - vn);

            let old = contact.accumulated_normal_impulse;
            contact.accumulated_normal_impulse = (old + delta).max(0.0);
            let applied = contact.accumulated_normal_impulse - old;

            let impulse = normal * applied;
            body_a.adjust_velocity(-impulse * body_a.inv_mass());
            body_a.adjust_angular_velocity(-body_a.inv_inertia() * r1.cross(&impulse));
            body_b.adjust_velocity(impulse * body_b.inv_mass());
            body_b.adjust_angular_velocity(body_b.inv_inertia() * r2.cross(&impulse));

            // Bias impulse, on the channel that only moves positions
            let biased_velocity = body_b.biased_velocity()
                + Vector2::cross_scalar(body_b.biased_angular_velocity(), &r2)
                - body_a.biased_velocity()
                - Vector2::cross_scalar(body_a.biased_angular_velocity(), &r1);
            let vnb = biased_velocity.dot(&normal);
            let delta_bias = contact.mass_normal * (contact.bias - vnb);

            let old_bias = contact.accumulated_bias_impulse;
            contact.accumulated_bias_impulse = (old_bias + delta_bias).max(0.0);
            let applied_bias = contact.accumulated_bias_impulse - old_bias;

            let bias_impulse = normal * applied_bias;
            body_a.adjust_biased_velocity(-bias_impulse * body_a.inv_mass());
            body_a.adjust_biased_angular_velocity(-body_a.inv_inertia() * r1.cross(&bias_impulse));
            body_b.adjust_biased_velocity(bias_impulse * body_b.inv_mass());
            body_b.adjust_biased_angular_velocity(body_b.inv_inertia() * r2.cross(&bias_impulse));

            // Friction impulse, clamped by the friction cone around the
            // accumulated normal impulse
            let relative_velocity = body_b.velocity() + Vector2::cross_scalar(body_b.angular_velocity(), &r2)
                - body_a.velocity()
                - Vector2::cross_scalar(body_a.angular_velocity(), &r1);
            let vt = relative_velocity.dot(&tangent);
            let delta_tangent = contact.mass_tangent * (-vt);

            let max_tangent = self.friction * contact.accumulated_normal_impulse;
            let old_tangent = contact.accumulated_tangent_impulse;
            contact.accumulated_tangent_impulse =
                (old_tangent + delta_tangent).clamp(-max_tangent, max_tangent);
            let applied_tangent = contact.accumulated_tangent_impulse - old_tangent;

            let tangent_impulse = tangent * applied_tangent;
            body_a.adjust_velocity(-tangent_impulse * body_a.inv_mass());
            body_a.adjust_angular_velocity(-body_a.inv_inertia() * r1.cross(&tangent_impulse));
            body_b.adjust_velocity(tangent_impulse * body_b.inv_mass());
            body_b.adjust_angular_velocity(body_b.inv_inertia() * r2.cross(&tangent_impulse));
        }

        Ok(())
    }
}
