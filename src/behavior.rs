//! Behavior target generation.
//!
//! A behavior is a timed, parametric target shape that particles converge
//! toward after an eligible single tap. Target positions are a pure
//! function of particle index, particle count, the tap's world-space
//! center, and the shape scale; only the per-particle depth jitter (and
//! the line's orientation) consume randomness.
//!
//! | kind | shape |
//! |------|-------|
//! | [`BehaviorKind::Swarm`] | loose disk around the center, denser in the middle |
//! | [`BehaviorKind::Circle`] | evenly spaced ring |
//! | [`BehaviorKind::Line`] | one randomly oriented segment through the center |
//! | [`BehaviorKind::Triangle`] | particles walked along three edges |

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::Rng;

/// How long a behavior stays active after a tap, in milliseconds.
pub const BEHAVIOR_DURATION_MS: f64 = 2400.0;

/// Per-tick exponential approach factor while a behavior is active.
pub const APPROACH_FACTOR: f32 = 0.07;

/// Swarm disk radius as a fraction of the shorter world bound.
const SWARM_RADIUS: f32 = 0.18;

/// Circle and triangle radius as a fraction of the shorter world bound.
const RING_RADIUS: f32 = 0.28;

/// Line length as a fraction of the shorter world bound.
const LINE_LENGTH: f32 = 0.7;

/// The parametric shapes a tap can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorKind {
    Swarm,
    Circle,
    Line,
    Triangle,
}

impl BehaviorKind {
    /// All kinds, in selection order.
    pub const ALL: [BehaviorKind; 4] = [
        BehaviorKind::Swarm,
        BehaviorKind::Circle,
        BehaviorKind::Line,
        BehaviorKind::Triangle,
    ];

    /// Pick a kind uniformly at random.
    pub fn random(rng: &mut SmallRng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Write one target per particle into `targets` (3 floats each).
///
/// `size` is the shorter side of the current world bounds; all shapes
/// scale with it so the pattern stays on screen at any aspect ratio.
pub fn write_targets(
    kind: BehaviorKind,
    center: Vec3,
    size: f32,
    rng: &mut SmallRng,
    targets: &mut [f32],
) {
    let count = targets.len() / 3;
    if count == 0 {
        return;
    }

    match kind {
        BehaviorKind::Swarm => {
            for i in 0..count {
                let angle = rng.gen::<f32>() * TAU;
                let radius = rng.gen::<f32>() * SWARM_RADIUS * size;
                let depth = rng.gen_range(-60.0..60.0);
                write_target(
                    targets,
                    i,
                    center + Vec3::new(angle.cos() * radius, angle.sin() * radius, depth),
                );
            }
        }
        BehaviorKind::Circle => {
            let radius = RING_RADIUS * size;
            for i in 0..count {
                let angle = (i as f32 / count as f32) * TAU;
                let depth = rng.gen_range(-40.0..40.0);
                write_target(
                    targets,
                    i,
                    center + Vec3::new(angle.cos() * radius, angle.sin() * radius, depth),
                );
            }
        }
        BehaviorKind::Line => {
            // One orientation per activation, shared by every particle.
            let angle = rng.gen::<f32>() * PI;
            let direction = Vec2::new(angle.cos(), angle.sin()) * LINE_LENGTH * size;
            let span = (count - 1).max(1) as f32;
            for i in 0..count {
                let t = i as f32 / span - 0.5;
                let depth = rng.gen_range(-30.0..30.0);
                write_target(
                    targets,
                    i,
                    center + Vec3::new(direction.x * t, direction.y * t, depth),
                );
            }
        }
        BehaviorKind::Triangle => {
            let radius = RING_RADIUS * size;
            let vertices: [Vec2; 3] = std::array::from_fn(|k| {
                let angle = (k as f32 / 3.0) * TAU - FRAC_PI_2;
                Vec2::new(angle.cos(), angle.sin()) * radius
            });
            for i in 0..count {
                let t = i as f32 / count as f32;
                let scaled = t * 3.0;
                let edge = (scaled as usize).min(2);
                let edge_t = scaled - edge as f32;
                let point = vertices[edge].lerp(vertices[(edge + 1) % 3], edge_t);
                let depth = rng.gen_range(-20.0..20.0);
                write_target(targets, i, center + Vec3::new(point.x, point.y, depth));
            }
        }
    }
}

#[inline]
fn write_target(targets: &mut [f32], index: usize, target: Vec3) {
    let base = index * 3;
    targets[base] = target.x;
    targets[base + 1] = target.y;
    targets[base + 2] = target.z;
}
