//! Box-box collision via the separating axis test plus reference-face
//! clipping. Up to two contacts are produced, each tagged with the clip
//! edges that generated it so the arbiter can warm-start across frames.

use crate::bodies::Body;
use crate::collision::contact::{Contact, FeatureId};
use crate::math::{Matrix2, Vector2};
use crate::shapes::Shape;

// Preference for keeping the current reference axis: a challenger must beat
// it by 5% relative plus a small absolute slop, which keeps the axis (and
// with it the contact features) stable across frames
const RELATIVE_TOLERANCE: f32 = 0.95;
const ABSOLUTE_TOLERANCE: f32 = 0.01;

const NO_EDGE: u8 = 0;
const EDGE_1: u8 = 1;
const EDGE_2: u8 = 2;
const EDGE_3: u8 = 3;
const EDGE_4: u8 = 4;

#[derive(Clone, Copy, PartialEq)]
enum Axis {
    FaceAX,
    FaceAY,
    FaceBX,
    FaceBY,
}

#[derive(Clone, Copy, Default)]
struct FeaturePair {
    in_edge_1: u8,
    out_edge_1: u8,
    in_edge_2: u8,
    out_edge_2: u8,
}

impl FeaturePair {
    fn flip(&mut self) {
        std::mem::swap(&mut self.in_edge_1, &mut self.in_edge_2);
        std::mem::swap(&mut self.out_edge_1, &mut self.out_edge_2);
    }

    fn id(&self) -> FeatureId {
        FeatureId::from_edges(
            self.in_edge_1,
            self.out_edge_1,
            self.in_edge_2,
            self.out_edge_2,
        )
    }
}

#[derive(Clone, Copy)]
struct ClipVertex {
    v: Vector2,
    fp: FeaturePair,
}

fn column(m: &Matrix2, i: usize) -> Vector2 {
    Vector2::new(m.m[0][i], m.m[1][i])
}

fn abs_matrix(m: &Matrix2) -> Matrix2 {
    Matrix2::new(
        m.m[0][0].abs(),
        m.m[0][1].abs(),
        m.m[1][0].abs(),
        m.m[1][1].abs(),
    )
}

fn abs_vector(v: Vector2) -> Vector2 {
    Vector2::new(v.x.abs(), v.y.abs())
}

/// Clips the segment to the half-plane `dot(normal, p) <= offset`, tagging
/// freshly-cut vertices with the clipping edge number
fn clip_segment_to_line(
    input: &[ClipVertex; 2],
    normal: Vector2,
    offset: f32,
    clip_edge: u8,
) -> ([ClipVertex; 2], usize) {
    let mut out = *input;
    let mut count = 0;

    let distance_0 = normal.dot(&input[0].v) - offset;
    let distance_1 = normal.dot(&input[1].v) - offset;

    if distance_0 <= 0.0 {
        out[count] = input[0];
        count += 1;
    }
    if distance_1 <= 0.0 {
        out[count] = input[1];
        count += 1;
    }

    if distance_0 * distance_1 < 0.0 {
        let interp = distance_0 / (distance_0 - distance_1);
        let mut vertex = ClipVertex {
            v: input[0].v + (input[1].v - input[0].v) * interp,
            fp: FeaturePair::default(),
        };
        if distance_0 > 0.0 {
            vertex.fp = input[0].fp;
            vertex.fp.in_edge_1 = clip_edge;
            vertex.fp.in_edge_2 = NO_EDGE;
        } else {
            vertex.fp = input[1].fp;
            vertex.fp.out_edge_1 = clip_edge;
            vertex.fp.out_edge_2 = NO_EDGE;
        }
        out[count] = vertex;
        count += 1;
    }

    (out, count)
}

/// Finds the incident edge on the other box: the edge most anti-parallel to
/// the reference face normal
fn incident_edge(
    half: Vector2,
    position: Vector2,
    rotation: &Matrix2,
    normal: Vector2,
) -> [ClipVertex; 2] {
    let local_normal = -rotation.transpose().multiply_vector(normal);
    let n_abs = abs_vector(local_normal);

    let (v0, fp0, v1, fp1);
    if n_abs.x > n_abs.y {
        if local_normal.x >= 0.0 {
            v0 = Vector2::new(half.x, -half.y);
            fp0 = FeaturePair {
                in_edge_2: EDGE_3,
                out_edge_2: EDGE_4,
                ..Default::default()
            };
            v1 = Vector2::new(half.x, half.y);
            fp1 = FeaturePair {
                in_edge_2: EDGE_4,
                out_edge_2: EDGE_1,
                ..Default::default()
            };
        } else {
            v0 = Vector2::new(-half.x, half.y);
            fp0 = FeaturePair {
                in_edge_2: EDGE_1,
                out_edge_2: EDGE_2,
                ..Default::default()
            };
            v1 = Vector2::new(-half.x, -half.y);
            fp1 = FeaturePair {
                in_edge_2: EDGE_2,
                out_edge_2: EDGE_3,
                ..Default::default()
            };
        }
    } else if local_normal.y >= 0.0 {
        v0 = Vector2::new(half.x, half.y);
        fp0 = FeaturePair {
            in_edge_2: EDGE_4,
            out_edge_2: EDGE_1,
            ..Default::default()
        };
        v1 = Vector2::new(-half.x, half.y);
        fp1 = FeaturePair {
            in_edge_2: EDGE_1,
            out_edge_2: EDGE_2,
            ..Default::default()
        };
    } else {
        v0 = Vector2::new(-half.x, -half.y);
        fp0 = FeaturePair {
            in_edge_2: EDGE_2,
            out_edge_2: EDGE_3,
            ..Default::default()
        };
        v1 = Vector2::new(half.x, -half.y);
        fp1 = FeaturePair {
            in_edge_2: EDGE_3,
            out_edge_2: EDGE_4,
            ..Default::default()
        };
    }

    [
        ClipVertex {
            v: position + rotation.multiply_vector(v0),
            fp: fp0,
        },
        ClipVertex {
            v: position + rotation.multiply_vector(v1),
            fp: fp1,
        },
    ]
}

/// Collides two boxes, producing up to two contacts
pub fn collide(body_a: &Body, body_b: &Body) -> Vec<Contact> {
    let (Shape::Box(box_a), Shape::Box(box_b)) = (body_a.shape(), body_b.shape()) else {
        return Vec::new();
    };

    let half_a = box_a.half_extents();
    let half_b = box_b.half_extents();
    let position_a = body_a.position();
    let position_b = body_b.position();

    let rot_a = Matrix2::rotation(body_a.rotation());
    let rot_b = Matrix2::rotation(body_b.rotation());
    let rot_a_t = rot_a.transpose();
    let rot_b_t = rot_b.transpose();

    let dp = position_b - position_a;
    let d_a = rot_a_t.multiply_vector(dp);
    let d_b = rot_b_t.multiply_vector(dp);

    let c = rot_a_t.multiply_matrix(&rot_b);
    let abs_c = abs_matrix(&c);
    let abs_c_t = abs_c.transpose();

    // Face axes of A
    let face_a = abs_vector(d_a) - half_a - abs_c.multiply_vector(half_b);
    if face_a.x > 0.0 || face_a.y > 0.0 {
        return Vec::new();
    }

    // Face axes of B
    let face_b = abs_vector(d_b) - abs_c_t.multiply_vector(half_a) - half_b;
    if face_b.x > 0.0 || face_b.y > 0.0 {
        return Vec::new();
    }

    // Pick the reference axis with hysteresis toward the current best
    let mut axis = Axis::FaceAX;
    let mut separation = face_a.x;
    let mut normal = if d_a.x > 0.0 {
        column(&rot_a, 0)
    } else {
        -column(&rot_a, 0)
    };

    if face_a.y > RELATIVE_TOLERANCE * separation + ABSOLUTE_TOLERANCE * half_a.y {
        axis = Axis::FaceAY;
        separation = face_a.y;
        normal = if d_a.y > 0.0 {
            column(&rot_a, 1)
        } else {
            -column(&rot_a, 1)
        };
    }

    if face_b.x > RELATIVE_TOLERANCE * separation + ABSOLUTE_TOLERANCE * half_b.x {
        axis = Axis::FaceBX;
        separation = face_b.x;
        normal = if d_b.x > 0.0 {
            column(&rot_b, 0)
        } else {
            -column(&rot_b, 0)
        };
    }

    if face_b.y > RELATIVE_TOLERANCE * separation + ABSOLUTE_TOLERANCE * half_b.y {
        axis = Axis::FaceBY;
        normal = if d_b.y > 0.0 {
            column(&rot_b, 1)
        } else {
            -column(&rot_b, 1)
        };
    }

    // Reference face setup
    let front_normal;
    let front;
    let side_normal;
    let neg_side;
    let pos_side;
    let neg_edge;
    let pos_edge;
    let incident;

    match axis {
        Axis::FaceAX => {
            front_normal = normal;
            front = position_a.dot(&front_normal) + half_a.x;
            side_normal = column(&rot_a, 1);
            let side = position_a.dot(&side_normal);
            neg_side = -side + half_a.y;
            pos_side = side + half_a.y;
            neg_edge = EDGE_3;
            pos_edge = EDGE_1;
            incident = incident_edge(half_b, position_b, &rot_b, front_normal);
        }
        Axis::FaceAY => {
            front_normal = normal;
            front = position_a.dot(&front_normal) + half_a.y;
            side_normal = column(&rot_a, 0);
            let side = position_a.dot(&side_normal);
            neg_side = -side + half_a.x;
            pos_side = side + half_a.x;
            neg_edge = EDGE_2;
            pos_edge = EDGE_4;
            incident = incident_edge(half_b, position_b, &rot_b, front_normal);
        }
        Axis::FaceBX => {
            front_normal = -normal;
            front = position_b.dot(&front_normal) + half_b.x;
            side_normal = column(&rot_b, 1);
            let side = position_b.dot(&side_normal);
            neg_side = -side + half_b.y;
            pos_side = side + half_b.y;
            neg_edge = EDGE_3;
            pos_edge = EDGE_1;
            incident = incident_edge(half_a, position_a, &rot_a, front_normal);
        }
        Axis::FaceBY => {
            front_normal = -normal;
            front = position_b.dot(&front_normal) + half_b.y;
            side_normal = column(&rot_b, 0);
            let side = position_b.dot(&side_normal);
            neg_side = -side + half_b.x;
            pos_side = side + half_b.x;
            neg_edge = EDGE_2;
            pos_edge = EDGE_4;
            incident = incident_edge(half_a, position_a, &rot_a, front_normal);
        }
    }

    // Clip the incident edge against the two side planes of the reference face
    let (clipped_1, count_1) = clip_segment_to_line(&incident, -side_normal, neg_side, neg_edge);
    if count_1 < 2 {
        return Vec::new();
    }
    let (clipped_2, count_2) = clip_segment_to_line(&clipped_1, side_normal, pos_side, pos_edge);
    if count_2 < 2 {
        return Vec::new();
    }

    let mut contacts = Vec::with_capacity(2);
    for clip in &clipped_2 {
        let separation = front_normal.dot(&clip.v) - front;
        if separation <= 0.0 {
            let mut fp = clip.fp;
            if axis == Axis::FaceBX || axis == Axis::FaceBY {
                fp.flip();
            }
            contacts.push(Contact::new(
                clip.v - front_normal * separation,
                normal,
                separation,
                fp.id(),
            ));
        }
    }

    contacts
}
