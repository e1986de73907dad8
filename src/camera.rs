//! Camera and viewport projection.
//!
//! The particle field lives on the z = 0 plane, viewed by a perspective
//! camera at `(0, 0, distance)` looking at the origin. Two derived
//! quantities drive the rest of the simulation:
//!
//! - [`Camera::visible_bounds`] - the world-space rectangle visible at
//!   the particle plane, used for grid seeding and toroidal wrapping.
//! - [`Camera::screen_to_world`] - pixel coordinates unprojected through
//!   the inverse view-projection onto the particle plane, used to center
//!   shape behaviors on a tap.

use glam::{Mat4, Vec2, Vec3};

use crate::error::ProjectionError;

/// Rays closer to parallel than this against the particle plane are
/// treated as non-intersecting.
const RAY_EPSILON: f32 = 1e-6;

/// World-space extent visible at the particle plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    /// Visible width in world units.
    pub width: f32,
    /// Visible height in world units.
    pub height: f32,
}

impl WorldBounds {
    /// Half the visible width; the x wrap limit.
    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    /// Half the visible height; the y wrap limit.
    #[inline]
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Shorter side of the bounds; behaviors scale their shapes by this.
    #[inline]
    pub fn size(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Perspective camera with a fixed working distance from the particle plane.
///
/// The camera itself never moves; only the viewport (and with it the
/// aspect ratio) changes at runtime.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Vertical field of view in radians.
    fov_y: f32,
    near: f32,
    far: f32,
    /// Distance from the camera to the z = 0 particle plane.
    distance: f32,
    /// Viewport size in pixels.
    viewport: Vec2,
}

impl Camera {
    /// Create a camera from a vertical field of view in degrees.
    pub fn new(fov_y_degrees: f32, near: f32, far: f32, distance: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
            near,
            far,
            distance,
            viewport: Vec2::new(800.0, 600.0),
        }
    }

    /// Field of view (degrees) that makes one world unit at the particle
    /// plane span exactly one pixel for the given viewport height.
    ///
    /// Useful when the grid spacing should line up with pixel spacing.
    pub fn fov_for_pixel_match(viewport_height: f32, distance: f32) -> f32 {
        (2.0 * (viewport_height / (2.0 * distance)).atan()).to_degrees()
    }

    /// Update the viewport size in pixels.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    /// Current viewport size in pixels.
    #[inline]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Distance from the camera to the particle plane.
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Viewport aspect ratio (width over height).
    #[inline]
    pub fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    /// World-space extent visible at the particle plane.
    ///
    /// `height = 2 * tan(fov / 2) * distance`, `width = height * aspect`.
    pub fn visible_bounds(&self) -> WorldBounds {
        let height = 2.0 * (self.fov_y * 0.5).tan() * self.distance;
        WorldBounds {
            width: height * self.aspect(),
            height,
        }
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.distance), Vec3::ZERO, Vec3::Y)
    }

    fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), self.near, self.far)
    }

    /// Unproject a pixel coordinate onto the z = 0 particle plane.
    ///
    /// Builds a pick ray through the near and far planes and intersects
    /// it with the particle plane. Fails if the viewport is empty, the
    /// view-projection matrix is singular, or the ray never crosses the
    /// plane; callers skip behavior generation for that gesture.
    pub fn screen_to_world(&self, px: f32, py: f32) -> Result<Vec3, ProjectionError> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return Err(ProjectionError::EmptyViewport);
        }

        let view_proj = self.projection_matrix() * self.view_matrix();
        if view_proj.determinant().abs() < f32::EPSILON {
            return Err(ProjectionError::SingularMatrix);
        }
        let inverse = view_proj.inverse();

        // Pixel -> normalized device coordinates, y flipped.
        let ndc = Vec2::new(
            (px / self.viewport.x) * 2.0 - 1.0,
            1.0 - (py / self.viewport.y) * 2.0,
        );

        // glam's perspective_rh maps depth to [0, 1].
        let ray_origin = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let ray_end = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let ray_dir = ray_end - ray_origin;

        if ray_dir.z.abs() < RAY_EPSILON {
            return Err(ProjectionError::RayParallelToPlane);
        }

        let t = -ray_origin.z / ray_dir.z;
        let hit = ray_origin + ray_dir * t;
        Ok(Vec3::new(hit.x, hit.y, 0.0))
    }
}

impl Default for Camera {
    /// 75 degree vertical fov at a working distance of 400 world units.
    fn default() -> Self {
        Self::new(75.0, 0.1, 2000.0, 400.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_bounds_formula() {
        let mut camera = Camera::new(60.0, 0.1, 1000.0, 100.0);
        camera.set_viewport(200.0, 100.0);

        let bounds = camera.visible_bounds();
        let expected_height = 2.0 * 30.0_f32.to_radians().tan() * 100.0;
        assert!((bounds.height - expected_height).abs() < 0.01);
        assert!((bounds.width - expected_height * 2.0).abs() < 0.01);
    }

    #[test]
    fn test_pixel_match_fov() {
        let fov = Camera::fov_for_pixel_match(600.0, 400.0);
        let mut camera = Camera::new(fov, 0.1, 2000.0, 400.0);
        camera.set_viewport(800.0, 600.0);

        let bounds = camera.visible_bounds();
        assert!((bounds.width - 800.0).abs() < 0.01);
        assert!((bounds.height - 600.0).abs() < 0.01);
    }

    #[test]
    fn test_screen_center_hits_origin() {
        let mut camera = Camera::default();
        camera.set_viewport(800.0, 600.0);

        let hit = camera.screen_to_world(400.0, 300.0).unwrap();
        assert!(hit.length() < 0.01);
    }

    #[test]
    fn test_screen_corners_hit_bounds() {
        let fov = Camera::fov_for_pixel_match(600.0, 400.0);
        let mut camera = Camera::new(fov, 0.1, 2000.0, 400.0);
        camera.set_viewport(800.0, 600.0);

        let bounds = camera.visible_bounds();
        let top_left = camera.screen_to_world(0.0, 0.0).unwrap();
        assert!((top_left.x - (-bounds.half_width())).abs() < 0.5);
        assert!((top_left.y - bounds.half_height()).abs() < 0.5);

        let bottom_right = camera.screen_to_world(800.0, 600.0).unwrap();
        assert!((bottom_right.x - bounds.half_width()).abs() < 0.5);
        assert!((bottom_right.y - (-bounds.half_height())).abs() < 0.5);
    }

    #[test]
    fn test_empty_viewport_is_unprojectable() {
        let mut camera = Camera::default();
        camera.set_viewport(0.0, 0.0);

        assert_eq!(
            camera.screen_to_world(10.0, 10.0),
            Err(ProjectionError::EmptyViewport)
        );
    }
}
