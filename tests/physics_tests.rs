use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use planar_phys::core::{BodyEventType, CollisionEvent, CollisionListener};
use planar_phys::forces::Wind;
use planar_phys::shapes::{BoxShape, Circle};
use planar_phys::{Body, Vector2, World};

#[test]
fn test_free_fall_matches_integrator() {
    // Gravity points down the +y axis in this engine
    let mut world = World::new(Vector2::new(0.0, 10.0), 10);
    let ball = world.add_body(Body::new(Circle::new(0.5).into(), 1.0).unwrap());

    // Semi-implicit Euler: v += g dt, then x += v dt
    let dt = 1.0 / 60.0;
    let mut expected_velocity = 0.0;
    let mut expected_y = 0.0;

    for _ in 0..60 {
        world.step().unwrap();

        expected_velocity += 10.0 * dt;
        expected_y += expected_velocity * dt;

        let body = world.get_body(ball).unwrap();
        assert!((body.velocity().y - expected_velocity).abs() < 0.01);
        assert!((body.position().y - expected_y).abs() < 0.01);
    }
}

#[test]
fn test_falling_box_lands_on_ground() {
    let mut world = World::new(Vector2::new(0.0, 10.0), 10);

    // Ground spans y in [-1, 1]; its top surface is at y = -1
    let _ground = world.add_body(Body::new_static(BoxShape::new(20.0, 2.0).into()));

    let mut falling = Body::new(BoxShape::new(2.0, 2.0).into(), 1.0).unwrap();
    falling.set_position(Vector2::new(0.0, -5.0));
    let falling_handle = world.add_body(falling);

    for _ in 0..300 {
        world.step().unwrap();
    }

    // The box should sit with its bottom face on the ground, so its
    // center ends up near y = -2 (small penetration slack allowed)
    let body = world.get_body(falling_handle).unwrap();
    assert!((body.position().y - (-2.0)).abs() < 0.2);
    assert!(body.position().x.abs() < 0.2);
    assert!(body.velocity().length() < 0.5);
}

#[test]
fn test_ball_bounces_with_restitution() {
    let mut world = World::new(Vector2::new(0.0, 10.0), 10);

    let mut ground = Body::new_static(BoxShape::new(20.0, 2.0).into());
    ground.set_restitution(1.0);
    world.add_body(ground);

    // Ball dropped 1.5 units above its contact point at y = -1.5
    let mut ball = Body::new(Circle::new(0.5).into(), 1.0).unwrap();
    ball.set_position(Vector2::new(0.0, -3.0));
    ball.set_restitution(0.8);
    let ball_handle = world.add_body(ball);

    let mut contacted = false;
    let mut rebound_top = f32::MAX;

    for _ in 0..180 {
        world.step().unwrap();

        let position = world.get_body(ball_handle).unwrap().position();
        if position.y > -1.7 {
            contacted = true;
        }
        if contacted {
            // Up is -y, so the rebound peak is the smallest y seen
            rebound_top = rebound_top.min(position.y);
        }
    }

    assert!(contacted);

    // With restitution 0.8 the ball should come back up a good part of
    // the drop, but never above its release point
    assert!(rebound_top < -1.9);
    assert!(rebound_top > -3.0);
}

#[test]
fn test_overlapping_circles_separate_gently() {
    let mut world = World::new(Vector2::zero(), 10);

    let a = world.add_body(Body::new(Circle::new(1.0).into(), 1.0).unwrap());
    let mut overlapping = Body::new(Circle::new(1.0).into(), 1.0).unwrap();
    overlapping.set_position(Vector2::new(1.0, 0.0));
    let b = world.add_body(overlapping);

    for _ in 0..120 {
        world.step().unwrap();
    }

    // Positional correction pushes the pair apart without launching them:
    // the bias channel moves positions but never feeds the real velocity
    let pos_a = world.get_body(a).unwrap().position();
    let pos_b = world.get_body(b).unwrap().position();
    let distance = pos_a.distance(&pos_b);
    assert!(distance > 1.9);
    assert!(distance < 2.2);

    assert!(world.get_body(a).unwrap().velocity().length() < 0.05);
    assert!(world.get_body(b).unwrap().velocity().length() < 0.05);
}

#[test]
fn test_large_box_settles_within_tight_tolerances() {
    let mut world = World::new(Vector2::new(0.0, 10.0), 10);

    let mut ground = Body::new_static(BoxShape::new(40.0, 2.0).into());
    ground.set_friction(0.2);
    world.add_body(ground);

    let mut crate_box = Body::new(BoxShape::new(10.0, 10.0).into(), 1.0).unwrap();
    crate_box.set_position(Vector2::new(0.0, -8.0));
    crate_box.set_friction(0.2);
    crate_box.set_restitution(0.0);
    let crate_handle = world.add_body(crate_box);

    // Let it touch down and settle
    for _ in 0..300 {
        world.step().unwrap();
    }
    let settled = world.get_body(crate_handle).unwrap().position();

    // Once settled it must hold position and stay essentially motionless
    for _ in 0..60 {
        world.step().unwrap();

        let body = world.get_body(crate_handle).unwrap();
        assert!(body.position().distance(&settled) < 0.02);
        assert!(body.velocity().length() < 0.01);
    }

    // Its bottom face sits on the ground top at y = -1
    assert!((settled.y - (-6.0)).abs() < 0.1);
}

#[test]
fn test_friction_stops_sliding_box() {
    let mut world = World::new(Vector2::new(0.0, 10.0), 10);
    world.add_body(Body::new_static(BoxShape::new(40.0, 2.0).into()));

    let mut slider = Body::new(BoxShape::new(2.0, 2.0).into(), 1.0).unwrap();
    slider.set_position(Vector2::new(0.0, -1.99));
    slider.set_velocity(Vector2::new(5.0, 0.0));
    let slider_handle = world.add_body(slider);

    for _ in 0..120 {
        world.step().unwrap();
    }

    // Coulomb friction bleeds the slide off within the first second or so
    let body = world.get_body(slider_handle).unwrap();
    assert!(body.velocity().x.abs() < 0.5);
    assert!(body.position().x > 0.5);
}

#[test]
fn test_box_comes_to_rest() {
    let mut world = World::new(Vector2::new(0.0, 10.0), 10);
    world.enable_resting_detection(0.5, 0.05, 0.05);

    world.add_body(Body::new_static(BoxShape::new(20.0, 2.0).into()));

    let mut falling = Body::new(BoxShape::new(2.0, 2.0).into(), 1.0).unwrap();
    falling.set_position(Vector2::new(0.0, -3.0));
    let falling_handle = world.add_body(falling);

    let mut resting_event_seen = false;
    for _ in 0..300 {
        world.step().unwrap();
        if !world
            .events()
            .body_events_of_type(BodyEventType::Resting)
            .is_empty()
        {
            resting_event_seen = true;
        }
    }

    assert!(resting_event_seen);

    let body = world.get_body(falling_handle).unwrap();
    assert!(body.is_resting());
    assert!(body.velocity().is_zero());

    // A resting body stays put when nothing disturbs it
    let settled = body.position();
    for _ in 0..60 {
        world.step().unwrap();
    }
    let after = world.get_body(falling_handle).unwrap().position();
    assert!(settled.distance(&after) < 1.0e-3);
}

#[test]
fn test_box_settling_on_resting_box_also_rests() {
    let mut world = World::new(Vector2::new(0.0, 10.0), 10);
    world.enable_resting_detection(1.0, 0.05, 0.05);

    world.add_body(Body::new_static(BoxShape::new(20.0, 2.0).into()));

    let mut lower = Body::new(BoxShape::new(2.0, 2.0).into(), 1.0).unwrap();
    lower.set_position(Vector2::new(0.0, -3.0));
    let lower_handle = world.add_body(lower);

    for _ in 0..300 {
        world.step().unwrap();
    }
    assert!(world.get_body(lower_handle).unwrap().is_resting());

    // Drop a second box onto the already-resting one, gently enough
    // that the support is not knocked awake
    let mut upper = Body::new(BoxShape::new(2.0, 2.0).into(), 1.0).unwrap();
    upper.set_position(Vector2::new(0.0, -4.02));
    let upper_handle = world.add_body(upper);

    for _ in 0..600 {
        world.step().unwrap();
    }

    // The upper box is supported through the lower one, which in turn
    // touches the ground, even though that pair froze long ago
    assert!(world.get_body(lower_handle).unwrap().is_resting());
    let upper = world.get_body(upper_handle).unwrap();
    assert!(upper.is_resting());
    assert!(upper.velocity().is_zero());
}

#[test]
fn test_settling_contact_never_gains_energy() {
    let mut world = World::new(Vector2::new(0.0, 10.0), 10);
    world.add_body(Body::new_static(BoxShape::new(20.0, 2.0).into()));

    // Start slightly overlapped and moving into the ground so the
    // contact is live from the first step
    let mut block = Body::new(BoxShape::new(2.0, 2.0).into(), 1.0).unwrap();
    block.set_position(Vector2::new(0.0, -1.95));
    block.set_velocity(Vector2::new(0.0, 1.0));
    block.set_restitution(0.0);
    let block_handle = world.add_body(block);

    let energy = |world: &World| {
        let body = world.get_body(block_handle).unwrap();
        0.5 * body.mass() * body.velocity().length_squared()
            + 0.5 * body.inertia() * body.angular_velocity() * body.angular_velocity()
    };

    // Kinetic plus rotational energy must never grow while the block
    // settles; positional correction may move it but never feeds the
    // real velocity
    let mut previous = energy(&world);
    for _ in 0..180 {
        world.step().unwrap();
        let current = energy(&world);
        assert!(current <= previous + 1.0e-4);
        previous = current;
    }
    assert!(previous < 1.0e-3);
}

struct CountingListener(Arc<AtomicUsize>);

impl CollisionListener for CountingListener {
    fn collision_occurred(&mut self, _event: &CollisionEvent) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_listener_fires_once_per_new_pair() {
    let mut world = World::new(Vector2::new(0.0, 10.0), 10);

    let count = Arc::new(AtomicUsize::new(0));
    world.add_listener(Box::new(CountingListener(count.clone())));

    world.add_body(Body::new_static(BoxShape::new(20.0, 2.0).into()));
    let mut ball = Body::new(Circle::new(0.5).into(), 1.0).unwrap();
    ball.set_position(Vector2::new(0.0, -1.6));
    world.add_body(ball);

    for _ in 0..30 {
        world.step().unwrap();
    }

    // Contact persists across steps; only its formation is reported
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_removed_body_leaves_no_contacts() {
    let mut world = World::new(Vector2::zero(), 10);

    let a = world.add_body(Body::new(Circle::new(1.0).into(), 1.0).unwrap());
    let mut close = Body::new(Circle::new(1.0).into(), 1.0).unwrap();
    close.set_position(Vector2::new(1.0, 0.0));
    world.add_body(close);

    world.step().unwrap();
    assert_eq!(world.arbiters().len(), 1);

    world.remove_body(a).unwrap();
    assert!(world.arbiters().is_empty());
    assert_eq!(
        world
            .events()
            .body_events_of_type(BodyEventType::Removed)
            .len(),
        1
    );
}

#[test]
fn test_wind_accelerates_dynamic_bodies() {
    let mut world = World::new(Vector2::zero(), 10);
    world.add_force_source(Box::new(Wind::new(Vector2::new(5.0, 0.0))));

    let ball = world.add_body(Body::new(Circle::new(0.5).into(), 1.0).unwrap());

    let mut post = Body::new_static(Circle::new(0.5).into());
    post.set_position(Vector2::new(0.0, 10.0));
    let post_handle = world.add_body(post);

    for _ in 0..60 {
        world.step().unwrap();
    }

    let body = world.get_body(ball).unwrap();
    assert!(body.velocity().x > 4.0);
    assert!(body.position().x > 0.0);

    // Static bodies ignore force sources
    let post = world.get_body(post_handle).unwrap();
    assert_eq!(post.position(), Vector2::new(0.0, 10.0));
}
