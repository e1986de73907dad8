//! Particle field buffers.
//!
//! Particles are stored as parallel `Vec<f32>` buffers (3 floats per
//! particle) rather than a `Vec<Particle>`: the position and color
//! buffers are handed to the rendering collaborator as-is, and the
//! per-tick loops stay tight over contiguous floats.
//!
//! Buffer roles:
//!
//! | buffer | written |
//! |--------|---------|
//! | `initial` | once, at seeding (grid or random) |
//! | `scatter` | once, at seeding (dissolve destination) |
//! | `positions` | every tick |
//! | `velocities` | once, at seeding |
//! | `behavior_targets` | on each behavior activation |
//! | `colors` | on each eligible single tap |

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::camera::WorldBounds;

/// World units between neighboring grid particles.
pub const GRID_SPACING: f32 = 18.0;

/// Lower bound on the particle count, even for a zero-area viewport.
pub const MIN_PARTICLES: usize = 600;

/// Depth range for scatter destinations and randomly seeded particles.
const SCATTER_DEPTH: f32 = 100.0;

/// Per-frame drift speed range on the x and y axes.
const DRIFT_XY: f32 = 0.3;

/// Per-frame drift speed range on the z axis, deliberately smaller.
const DRIFT_Z: f32 = 0.15;

/// Color saturation and lightness for the randomized hue palette.
const COLOR_SATURATION: f32 = 0.7;
const COLOR_LIGHTNESS: f32 = 0.55;

/// Owns all per-particle buffers for one session.
///
/// The particle count is fixed at construction; a viewport resize changes
/// the wrap bounds but never reallocates the field.
#[derive(Debug)]
pub struct ParticleField {
    count: usize,
    initial: Vec<f32>,
    scatter: Vec<f32>,
    positions: Vec<f32>,
    velocities: Vec<f32>,
    behavior_targets: Vec<f32>,
    colors: Vec<f32>,
    positions_dirty: bool,
    colors_dirty: bool,
}

impl ParticleField {
    /// Seed a field for the given world bounds.
    ///
    /// The first `columns * rows` particles sit on a centered grid at
    /// z = 0; if that grid is smaller than `min_count`, the remainder is
    /// seeded at fully random positions. Every particle gets a random
    /// scatter destination inside the bounds and a small fixed drift
    /// velocity. Positions start at the grid/seed positions.
    pub fn new(bounds: WorldBounds, spacing: f32, min_count: usize, rng: &mut SmallRng) -> Self {
        let (columns, rows) = grid_dimensions(bounds, spacing);
        let count = (columns * rows).max(min_count);

        let half_w = bounds.half_width();
        let half_h = bounds.half_height();

        let mut initial = Vec::with_capacity(count * 3);
        let mut scatter = Vec::with_capacity(count * 3);
        let mut velocities = Vec::with_capacity(count * 3);

        for i in 0..count {
            let seed = if i < columns * rows {
                let col = i % columns;
                let row = i / columns;
                Vec3::new(
                    (col as f32 - (columns - 1) as f32 * 0.5) * spacing,
                    (row as f32 - (rows - 1) as f32 * 0.5) * spacing,
                    0.0,
                )
            } else {
                random_in_bounds(half_w, half_h, rng)
            };
            initial.extend_from_slice(&seed.to_array());

            let destination = random_in_bounds(half_w, half_h, rng);
            scatter.extend_from_slice(&destination.to_array());

            velocities.push(rng.gen_range(-DRIFT_XY..DRIFT_XY));
            velocities.push(rng.gen_range(-DRIFT_XY..DRIFT_XY));
            velocities.push(rng.gen_range(-DRIFT_Z..DRIFT_Z));
        }

        let positions = initial.clone();

        Self {
            count,
            initial,
            scatter,
            positions,
            velocities,
            behavior_targets: vec![0.0; count * 3],
            colors: vec![1.0; count * 3],
            positions_dirty: true,
            colors_dirty: true,
        }
    }

    /// Number of particles. Fixed for the field's lifetime.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current positions, 3 floats per particle.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Current colors in linear RGB, 3 floats per particle.
    #[inline]
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Position buffer as raw bytes, for direct GPU upload.
    pub fn positions_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Color buffer as raw bytes, for direct GPU upload.
    pub fn colors_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Behavior target buffer, writable by the behavior generator.
    #[inline]
    pub(crate) fn behavior_targets_mut(&mut self) -> &mut [f32] {
        &mut self.behavior_targets
    }

    /// Whether positions changed since the last call; clears the flag.
    pub fn take_positions_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.positions_dirty, false)
    }

    /// Whether colors changed since the last call; clears the flag.
    pub fn take_colors_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.colors_dirty, false)
    }

    /// Interpolate every position between its seed and scatter destination.
    ///
    /// `t` is the eased dissolve progress: 0 puts particles back on the
    /// grid, 1 puts them at their scatter destinations.
    pub(crate) fn blend_toward_scatter(&mut self, t: f32) {
        for i in 0..self.positions.len() {
            self.positions[i] = self.initial[i] + (self.scatter[i] - self.initial[i]) * t;
        }
        self.positions_dirty = true;
    }

    /// One step of free drift: add each particle's fixed velocity, then
    /// wrap x and y against the current bounds. z is left unbounded.
    pub(crate) fn drift_and_wrap(&mut self, bounds: WorldBounds) {
        let half_w = bounds.half_width();
        let half_h = bounds.half_height();

        for p in 0..self.count {
            let base = p * 3;
            self.positions[base] += self.velocities[base];
            self.positions[base + 1] += self.velocities[base + 1];
            self.positions[base + 2] += self.velocities[base + 2];

            let x = self.positions[base];
            if x.abs() > half_w {
                self.positions[base] = -x.signum() * half_w;
            }
            let y = self.positions[base + 1];
            if y.abs() > half_h {
                self.positions[base + 1] = -y.signum() * half_h;
            }
        }
        self.positions_dirty = true;
    }

    /// One step of exponential approach toward the behavior targets.
    pub(crate) fn approach_targets(&mut self, factor: f32) {
        for i in 0..self.positions.len() {
            self.positions[i] += (self.behavior_targets[i] - self.positions[i]) * factor;
        }
        self.positions_dirty = true;
    }

    /// Assign every particle an independent random hue at fixed
    /// saturation/lightness, converted to linear RGB.
    pub fn randomize_colors(&mut self, rng: &mut SmallRng) {
        for p in 0..self.count {
            let rgb = hsl_to_rgb(rng.gen::<f32>(), COLOR_SATURATION, COLOR_LIGHTNESS);
            let base = p * 3;
            self.colors[base] = srgb_to_linear(rgb.x);
            self.colors[base + 1] = srgb_to_linear(rgb.y);
            self.colors[base + 2] = srgb_to_linear(rgb.z);
        }
        self.colors_dirty = true;
    }
}

/// Grid dimensions for the given bounds and spacing.
pub fn grid_dimensions(bounds: WorldBounds, spacing: f32) -> (usize, usize) {
    if spacing <= 0.0 {
        return (0, 0);
    }
    let columns = (bounds.width / spacing).floor().max(0.0) as usize;
    let rows = (bounds.height / spacing).floor().max(0.0) as usize;
    (columns, rows)
}

fn random_in_bounds(half_w: f32, half_h: f32, rng: &mut SmallRng) -> Vec3 {
    Vec3::new(
        if half_w > 0.0 { rng.gen_range(-half_w..half_w) } else { 0.0 },
        if half_h > 0.0 { rng.gen_range(-half_h..half_h) } else { 0.0 },
        rng.gen_range(-SCATTER_DEPTH..SCATTER_DEPTH),
    )
}

/// Convert HSL to sRGB.
///
/// * `h` - 0.0 to 1.0, wrapping through the hue circle
/// * `s` - 0.0 (gray) to 1.0 (vivid)
/// * `l` - 0.0 (black) to 1.0 (white)
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = l - c * 0.5;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}

/// Exact sRGB electro-optical transfer function.
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
