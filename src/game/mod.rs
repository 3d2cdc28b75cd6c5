pub mod controls;
pub mod overlay;
pub mod session;
pub mod tutorial;

pub use controls::{apply_camera_input, CameraPermissions, ControlKeys, FrameInput};
pub use overlay::{Arrow, AudioSignal, OverlayCommand, OverlaySnapshot, StagedVelocity};
pub use session::{ContinueChoice, ControlMode, GameState, RoundSession, SessionAction, SessionEvent};
pub use tutorial::TutorialStep;
