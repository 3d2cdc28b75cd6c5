use crate::config::{BOOST_FACTOR, CAMERA_SPEED, LOOK_SENSITIVITY, PRECISE_FACTOR};
use crate::simulation::OrientationFrame;

/// Held state of the eight control keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub boost: bool,
    pub precise: bool,
}

/// Input gathered during one frame, drained once by the main loop
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub cursor_delta: (f32, f32),
    pub keys: ControlKeys,
    pub toggle_ui: bool,
    pub quit: bool,
}

impl FrameInput {
    /// Clear per-frame events while keeping held keys
    pub fn begin_frame(&mut self) {
        self.cursor_delta = (0.0, 0.0);
        self.toggle_ui = false;
        self.quit = false;
    }
}

/// What the current session state lets the camera do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CameraPermissions {
    pub movement: bool,
    pub look: bool,
}

/// Apply one frame of input to the camera, honoring `permissions`
pub fn apply_camera_input(
    frame: &mut OrientationFrame,
    input: &FrameInput,
    dt: f32,
    permissions: CameraPermissions,
) {
    if permissions.look {
        let (dx, dy) = input.cursor_delta;
        if dx != 0.0 {
            frame.yaw(dx * LOOK_SENSITIVITY * dt);
        }
        if dy != 0.0 {
            frame.pitch(dy * LOOK_SENSITIVITY * dt);
        }
    }

    if !permissions.movement {
        return;
    }

    let keys = &input.keys;
    let mut step = CAMERA_SPEED * dt;
    if keys.boost {
        step *= BOOST_FACTOR;
    }
    if keys.precise {
        step *= PRECISE_FACTOR;
    }

    if keys.forward {
        frame.move_forward(step);
    }
    if keys.back {
        frame.move_forward(-step);
    }
    if keys.right {
        frame.move_right(step);
    }
    if keys.left {
        frame.move_right(-step);
    }
    if keys.up {
        frame.move_up(step);
    }
    if keys.down {
        frame.move_up(-step);
    }
}
