use std::collections::VecDeque;

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::{announcement::AnnouncementControl, render_loop::CameraState};

/// Change of orbit angular velocity per key press, radians per frame.
pub const ORBIT_VELOCITY_STEP: f32 = 0.005;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlAction {
    PlayAnnouncement,
    StopAnnouncement,
    ToggleAutoRotation,
    SlowDownOrbit,
    SpeedUpOrbit,
}

impl ControlAction {
    pub fn from_key(keycode: KeyCode) -> Option<Self> {
        use ControlAction::*;
        match keycode {
            KeyCode::KeyP => Some(PlayAnnouncement),
            KeyCode::KeyS => Some(StopAnnouncement),
            KeyCode::KeyR => Some(ToggleAutoRotation),
            KeyCode::ArrowLeft => Some(SlowDownOrbit),
            KeyCode::ArrowRight => Some(SpeedUpOrbit),
            _ => None,
        }
    }
}

/// Queues key presses and applies them once per frame.
#[derive(Debug, Default)]
pub struct InputController {
    actions_to_process: VecDeque<ControlAction>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the event was consumed.
    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(keycode),
                        repeat: false,
                        ..
                    },
                ..
            } => self.push_key(*keycode),
            _ => false,
        }
    }

    pub fn push_key(&mut self, keycode: KeyCode) -> bool {
        match ControlAction::from_key(keycode) {
            Some(action) => {
                self.actions_to_process.push_back(action);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, state: &mut CameraState, announcement: &mut AnnouncementControl) {
        self.actions_to_process
            .drain(..)
            .for_each(|action| match action {
                ControlAction::PlayAnnouncement => announcement.play_announcement(),
                ControlAction::StopAnnouncement => announcement.stop_announcement(),
                ControlAction::ToggleAutoRotation => {
                    state.auto_rotate_enabled = !state.auto_rotate_enabled;
                    log::info!("Auto rotation: {}", state.auto_rotate_enabled);
                }
                ControlAction::SlowDownOrbit => {
                    state.orbit_angular_velocity -= ORBIT_VELOCITY_STEP;
                    log::debug!("Orbit velocity: {}", state.orbit_angular_velocity);
                }
                ControlAction::SpeedUpOrbit => {
                    state.orbit_angular_velocity += ORBIT_VELOCITY_STEP;
                    log::debug!("Orbit velocity: {}", state.orbit_angular_velocity);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    use crate::control::announcement::{LoggedAnnouncement, Playback};

    use super::*;

    #[rstest]
    #[case(KeyCode::KeyP, Some(ControlAction::PlayAnnouncement))]
    #[case(KeyCode::KeyS, Some(ControlAction::StopAnnouncement))]
    #[case(KeyCode::KeyR, Some(ControlAction::ToggleAutoRotation))]
    #[case(KeyCode::ArrowLeft, Some(ControlAction::SlowDownOrbit))]
    #[case(KeyCode::ArrowRight, Some(ControlAction::SpeedUpOrbit))]
    #[case(KeyCode::KeyQ, None)]
    fn maps_keys(#[case] keycode: KeyCode, #[case] expected: Option<ControlAction>) {
        assert_eq!(ControlAction::from_key(keycode), expected);
    }

    #[test]
    fn actions_apply_in_order_once() {
        let mut controller = InputController::new();
        let mut state = CameraState::default();
        let player = LoggedAnnouncement::default();
        let mut announcement = AnnouncementControl::new(Box::new(player.clone()));

        [
            KeyCode::ArrowRight,
            KeyCode::ArrowRight,
            KeyCode::ArrowLeft,
            KeyCode::KeyR,
            KeyCode::KeyP,
        ]
        .into_iter()
        .for_each(|key| {
            controller.push_key(key);
        });
        controller.apply(&mut state, &mut announcement);
        controller.apply(&mut state, &mut announcement);

        assert_abs_diff_eq!(state.orbit_angular_velocity, ORBIT_VELOCITY_STEP);
        assert!(!state.auto_rotate_enabled);
        assert_eq!(player.playback(), Playback::Playing);
    }

    #[test]
    fn unmapped_keys_are_not_consumed() {
        let mut controller = InputController::new();
        assert!(!controller.push_key(KeyCode::KeyZ));
    }
}
