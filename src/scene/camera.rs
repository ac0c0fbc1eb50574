use glam::{vec3, Mat4, Vec3};

pub const FOV_Y: f32 = 45.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1500.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    eye: Vec3,
    target: Vec3,
    up: Vec3,
    // degrees
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(FOV_Y, 1.0, NEAR, FAR)
    }
}

impl PerspectiveCamera {
    pub const DEFAULT_POSITION: Vec3 = vec3(1.0, 1.0, 1.0);

    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            eye: Self::DEFAULT_POSITION,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn get_view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn build_view_proj_matrix(&self) -> Mat4 {
        self.projection * self.get_view()
    }

    pub fn position(&self) -> Vec3 {
        self.eye
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_eye(&mut self, eye: Vec3) {
        self.eye = eye;
    }

    /// Takes effect after the next `update_projection_matrix`.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn looks_at_target() {
        let mut camera = PerspectiveCamera::default();
        camera.set_eye(vec3(0.0, 0.0, 2.0));
        camera.look_at(Vec3::ZERO);

        let in_view = camera.get_view().transform_point3(Vec3::ZERO);

        assert_abs_diff_eq!(in_view.x, 0.0);
        assert_abs_diff_eq!(in_view.y, 0.0);
        assert_abs_diff_eq!(in_view.z, -2.0);
    }

    #[test]
    fn projection_follows_aspect() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(2.0);
        camera.update_projection_matrix();

        assert_eq!(
            camera.projection_matrix(),
            Mat4::perspective_rh(FOV_Y.to_radians(), 2.0, NEAR, FAR)
        );
    }
}
