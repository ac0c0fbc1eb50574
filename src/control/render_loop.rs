use std::f32::consts::{PI, TAU};

use glam::vec3;
use serde::Deserialize;
use winit::window::Window;

use crate::{error::DrawError, scene::graph::SceneGraph};

/// Surface yaw added every frame, in radians.
pub const SURFACE_SPIN: f32 = -0.01;
/// Distance of the orbiting camera from the planet centre.
pub const ORBIT_DISTANCE: f32 = 2.0;

/// Maps an angle into `[-PI, PI]` so per-frame steps keep their f32 precision.
fn wrap_angle(angle: f32) -> f32 {
    if angle.abs() <= PI {
        angle
    } else {
        angle - TAU * (angle / TAU).round()
    }
}

/// Camera orbit, advanced once per frame.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraState {
    pub orbit_angle: f32,
    pub orbit_angular_velocity: f32,
    pub auto_rotate_enabled: bool,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            orbit_angle: 0.0,
            orbit_angular_velocity: 0.0,
            auto_rotate_enabled: true,
        }
    }
}

/// Host primitive that schedules the next tick (vsync, redraw request...).
pub trait FrameScheduler {
    fn request_next_frame(&self);
}

impl FrameScheduler for Window {
    fn request_next_frame(&self) {
        self.request_redraw();
    }
}

pub trait FrameRenderer {
    fn draw(&mut self, scene: &mut SceneGraph) -> Result<(), DrawError>;
}

/// Runs forever once started; there is no paused or stopped state.
#[derive(Debug, Default)]
pub struct RenderLoop {
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances the animation, schedules the next frame and draws this one.
    ///
    /// A draw failure is returned as is; the next frame has already been
    /// requested by then.
    pub fn tick(
        &mut self,
        scene: &mut SceneGraph,
        state: &mut CameraState,
        scheduler: &dyn FrameScheduler,
        renderer: &mut dyn FrameRenderer,
    ) -> Result<(), DrawError> {
        let yaw = &mut scene.planet_mut().surface_mut().transform.rotation.y;
        *yaw = wrap_angle(*yaw) + SURFACE_SPIN;

        if state.auto_rotate_enabled {
            state.orbit_angle = wrap_angle(state.orbit_angle) + state.orbit_angular_velocity;
            let (sin, cos) = state.orbit_angle.sin_cos();
            let target = scene.planet().root().transform.position;
            scene
                .camera
                .set_eye(vec3(ORBIT_DISTANCE * sin, 0.0, ORBIT_DISTANCE * cos));
            scene.camera.look_at(target);
        }

        scheduler.request_next_frame();
        self.frames += 1;

        renderer.draw(scene)
    }
}
