//! Model / view / projection math.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// First rotation: about (0, 1, 1) at π/2 rad per simulated second.
pub const SPIN_AXIS: Vec3 = Vec3::new(0.0, 1.0, 1.0);
pub const SPIN_RATE: f32 = FRAC_PI_2;

/// Second rotation, in the frame left by the first: about +X at π/4 rad/s.
pub const TUMBLE_AXIS: Vec3 = Vec3::X;
pub const TUMBLE_RATE: f32 = FRAC_PI_4;

/// Model matrix at simulated time `t` seconds.
///
/// `R_spin(t) * R_tumble(t)`: the tumble is applied in model space first,
/// then the spin carries the result.
pub fn model_matrix(t: f32) -> Mat4 {
    let spin = Mat4::from_axis_angle(SPIN_AXIS.normalize(), t * SPIN_RATE);
    let tumble = Mat4::from_axis_angle(TUMBLE_AXIS, t * TUMBLE_RATE);
    spin * tumble
}

/// Fixed perspective camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view, radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(3.0, 0.0, 0.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
            fov_y: FRAC_PI_4,
            near: 1.0,
            far: 10.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Right-handed projection with a `0..1` depth range (wgpu clip space).
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }
}

/// Uniform block layout shared with `shaders/mesh.wgsl` (`Transforms`).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

impl TransformUniform {
    pub const SIZE: u64 = size_of::<TransformUniform>() as u64;

    pub fn new(model: Mat4, view: Mat4, proj: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            normal: normal_matrix(model).to_cols_array_2d(),
        }
    }

    /// Transforms for simulated time `t` seen through `camera`.
    pub fn at(t: f32, camera: &Camera, aspect: f32) -> Self {
        Self::new(model_matrix(t), camera.view(), camera.projection(aspect))
    }
}

/// `transpose(inverse(model))`: keeps normals perpendicular under
/// non-uniform scale.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    model.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    const EPS: f32 = 1e-5;

    fn approx(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, EPS)
    }

    // ── model ─────────────────────────────────────────────────────────────

    #[test]
    fn model_at_zero_is_identity() {
        assert!(approx(model_matrix(0.0), Mat4::IDENTITY));
    }

    #[test]
    fn model_is_deterministic() {
        for t in [0.07, 1.0, 3.5, 120.25] {
            assert_eq!(model_matrix(t), model_matrix(t));
        }
    }

    #[test]
    fn model_is_a_proper_rotation() {
        let m = model_matrix(2.3);
        assert!((m.determinant() - 1.0).abs() < EPS);
        assert!(approx(m * m.transpose(), Mat4::IDENTITY));
    }

    #[test]
    fn tumble_is_applied_before_spin() {
        // The tumble axis is +X, so +X only sees the spin.
        let t = 0.7;
        let spin = Mat4::from_axis_angle(SPIN_AXIS.normalize(), t * SPIN_RATE);
        let got = model_matrix(t).transform_vector3(Vec3::X);
        let want = spin.transform_vector3(Vec3::X);
        assert!(got.abs_diff_eq(want, EPS));
    }

    #[test]
    fn spin_axis_is_fixed_when_tumble_is_a_full_turn() {
        // t = 8: tumble = 2π (identity), spin = 4π (identity).
        assert!(model_matrix(8.0).abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn normal_matrix_of_rotation_is_rotation() {
        let m = model_matrix(1.3);
        assert!(approx(normal_matrix(m), m));
    }

    #[test]
    fn normal_matrix_handles_non_uniform_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        // Surface x = y has normal (1, -1, 0); after scaling x by 2 the
        // surface is x = 2y whose normal is (1, -2, 0).
        let n = normal_matrix(m).transform_vector3(Vec3::new(1.0, -1.0, 0.0)).normalize();
        assert!(n.abs_diff_eq(Vec3::new(1.0, -2.0, 0.0).normalize(), EPS));
    }

    // ── camera ────────────────────────────────────────────────────────────

    #[test]
    fn view_moves_eye_to_origin() {
        let cam = Camera::default();
        let v = cam.view();
        assert!(v.transform_point3(cam.eye).abs_diff_eq(Vec3::ZERO, EPS));
        assert!(v.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), EPS));
    }

    #[test]
    fn view_up_is_world_z() {
        let v = Camera::default().view();
        let up = v.transform_vector3(Vec3::Z);
        assert!(up.abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn projection_depth_range_is_zero_to_one() {
        let cam = Camera::default();
        let p = cam.projection(1.125);
        let near = p * Vec4::new(0.0, 0.0, -cam.near, 1.0);
        let far = p * Vec4::new(0.0, 0.0, -cam.far, 1.0);
        assert!((near.z / near.w).abs() < EPS);
        assert!((far.z / far.w - 1.0).abs() < EPS);
    }

    #[test]
    fn projection_is_time_invariant() {
        let cam = Camera::default();
        let a = TransformUniform::at(0.0, &cam, 1.5);
        let b = TransformUniform::at(9.0, &cam, 1.5);
        assert_eq!(a.view, b.view);
        assert_eq!(a.proj, b.proj);
        assert_ne!(a.model, b.model);
    }

    // ── uniform ───────────────────────────────────────────────────────────

    #[test]
    fn uniform_is_four_mat4() {
        assert_eq!(TransformUniform::SIZE, 4 * 64);
        assert_eq!(bytemuck::bytes_of(&TransformUniform::zeroed()).len(), 256);
    }
}
