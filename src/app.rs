use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

use hypersphere_catch::config::{BackendKind, GameConfig};
use hypersphere_catch::error::AppError;
use hypersphere_catch::game::{
    apply_camera_input, AudioSignal, ControlMode, FrameInput, OverlayCommand, RoundSession,
    SessionAction, SessionEvent,
};
use hypersphere_catch::gpu::{GpuContext, GpuPhysics, PresentationFrame, RenderPipeline, SceneBuffers};
use hypersphere_catch::simulation::{
    CpuPhysics, Ensemble, OrientationFrame, Particle, PhysicsBackend, TARGET_INDEX,
};

/// Longest frame step fed to the session and physics, in seconds
const MAX_FRAME_DT: f32 = 0.1;

/// Slider increments for the key-bound overlay controls
const COMPONENT_STEP: f32 = 0.1;
const MAGNITUDE_STEP: f32 = 0.05;
const CATCH_RADIUS_STEP: f32 = 0.05;
const SPEED_STEP: f32 = 0.25;
const VOLUME_STEP: i32 = 10;

const AXIS_NAMES: [char; 4] = ['x', 'y', 'z', 'w'];

/// Application state
pub struct App {
    config: GameConfig,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    physics: Option<Box<dyn PhysicsBackend>>,
    scene: Option<SceneBuffers>,
    render_pipeline: Option<RenderPipeline>,
    session: RoundSession,
    camera: OrientationFrame,
    /// Latest snapshot read back from the physics backend
    particles: Vec<Particle>,
    input: FrameInput,
    audio: AudioSignal,
    /// Direction component edited by the arrow keys
    selected_axis: usize,
    last_frame: Instant,
    fps_counter: FpsCounter,
    error: Option<AppError>,
}

impl App {
    pub fn new(config: GameConfig) -> Self {
        Self {
            session: RoundSession::new(config.clone()),
            config,
            window: None,
            gpu: None,
            physics: None,
            scene: None,
            render_pipeline: None,
            camera: OrientationFrame::default(),
            particles: Vec::new(),
            input: FrameInput::default(),
            audio: AudioSignal::default(),
            selected_axis: 0,
            last_frame: Instant::now(),
            fps_counter: FpsCounter::new(),
            error: None,
        }
    }

    /// Error that stopped the event loop, if any
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        log::info!("Initializing hypersphere simulation...");

        // Create window
        let window_attrs = Window::default_attributes()
            .with_title("Hypersphere Catch - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        // Initialize GPU
        log::info!("Creating GPU context...");
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;

        log::info!("Creating {:?} physics backend...", self.config.backend);
        let physics: Box<dyn PhysicsBackend> = match self.config.backend {
            BackendKind::Gpu => Box::new(GpuPhysics::new(
                gpu.device.clone(),
                gpu.queue.clone(),
                self.config.physics,
            )),
            BackendKind::Cpu => Box::new(CpuPhysics::new(self.config.physics)),
        };

        log::info!("Creating render pipeline...");
        let render_pipeline = RenderPipeline::new(&gpu.device, gpu.format());
        let scene = SceneBuffers::new(&gpu.device, self.config.particle_count);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.physics = Some(physics);
        self.scene = Some(scene);
        self.render_pipeline = Some(render_pipeline);

        self.respawn();
        self.grab_cursor(true);
        self.last_frame = Instant::now();

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Mouse: Look around");
        log::info!("  W/S, A/D, Q/E: Move along the hypersphere");
        log::info!("  Shift/Ctrl: Boost/precise movement");
        log::info!("  Tab: Toggle camera/UI mode");
        log::info!("  Enter/Space: Apply/keep target velocity and continue");
        log::info!("  1-4, Up/Down: Edit staged direction component");
        log::info!("  [/]: Staged speed, -/=: Catch radius, ,/.: Simulation speed");
        log::info!("  M, 9/0: Audio toggle and volume");
        log::info!("  R: Restart, Escape: Quit");
        Ok(())
    }

    /// Spawn a fresh ensemble and fully reload the backend
    fn respawn(&mut self) {
        let ensemble = Ensemble::from_config(&mut rand::thread_rng(), &self.config);
        if let Some(physics) = self.physics.as_mut() {
            physics.load(&ensemble.particles);
            log::info!(
                "Spawned {} particles on the {} backend",
                physics.len(),
                physics.name()
            );
        }
        self.particles = ensemble.particles;
        self.camera = OrientationFrame::default();
    }

    fn frame(&mut self) -> Result<(), AppError> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32().min(MAX_FRAME_DT);
        self.last_frame = now;

        // 1. Input
        if self.input.toggle_ui {
            self.session.toggle_control_mode();
            self.sync_cursor();
            log::info!("Control mode: {:?}", self.session.control_mode());
        }
        apply_camera_input(&mut self.camera, &self.input, dt, self.session.camera_permissions());
        self.camera.renormalize();
        self.input.begin_frame();

        // 2. Session
        let mode_before = self.session.control_mode();
        let events = self.session.update(dt, &self.particles, self.camera.position);
        for event in &events {
            self.on_session_event(event);
        }
        if self.session.control_mode() != mode_before {
            self.sync_cursor();
        }

        // 3. Physics step, then readback after the barrier
        let Some(physics) = self.physics.as_mut() else {
            return Ok(());
        };
        if self.session.physics_enabled() {
            physics.step(self.session.physics_dt(dt))?;
        }
        let snapshot = physics.snapshot()?;
        self.particles.clone_from(&snapshot.particles);
        log::trace!("Snapshot version {}", snapshot.version);

        // 4. Present
        self.render();

        if let Some(fps) = self.fps_counter.tick() {
            self.update_title(Some(fps));
        } else if !events.is_empty() {
            self.update_title(None);
        }
        Ok(())
    }

    fn render(&mut self) {
        let (Some(gpu), Some(scene), Some(render)) = (
            self.gpu.as_ref(),
            self.scene.as_mut(),
            self.render_pipeline.as_ref(),
        ) else {
            return;
        };

        let frame = PresentationFrame {
            camera: &self.camera,
            viewport: gpu.viewport(),
            particles: &self.particles,
            arrow: self.session.arrow(self.particles.get(TARGET_INDEX)),
        };
        scene.upload(&gpu.device, &gpu.queue, &frame);

        // Get surface texture
        let output = match gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Reconfigure surface
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        let bind_group = render.create_bind_group(
            &gpu.device,
            &scene.particle_buffer,
            &scene.view_params_buffer,
        );
        render.draw(&mut encoder, &view, &bind_group);

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn on_session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::RoundEnded { outcome: Some(outcome), .. } if self.audio.enabled => {
                let cue = if outcome.caught { "catch" } else { "miss" };
                log::debug!("Audio cue '{}' at {}%", cue, self.audio.volume());
            }
            SessionEvent::ScoreSampled(score) => log::debug!("Cluster score {:.1}", score),
            SessionEvent::TutorialAdvanced(step) => log::info!("{}", step.hint()),
            _ => {}
        }
    }

    /// Run an overlay command and carry out what it asks of the particle store
    fn dispatch(&mut self, command: OverlayCommand) -> Result<(), AppError> {
        let target = self.particles.get(TARGET_INDEX).copied();
        match self.session.handle_command(command, target.as_ref()) {
            Some(SessionAction::WriteTargetVelocity(velocity)) => {
                if let (Some(physics), Some(mut target)) = (self.physics.as_mut(), target) {
                    target.velocity = velocity;
                    physics.write_particle(TARGET_INDEX, target)?;
                    self.particles[TARGET_INDEX] = target;
                    log::info!("Target velocity set to speed {:.2}", velocity.length());
                }
            }
            Some(SessionAction::Restart) => self.respawn(),
            None => {}
        }
        self.sync_cursor();
        self.update_title(None);
        Ok(())
    }

    fn handle_key(&mut self, key_code: KeyCode, pressed: bool) -> Result<(), AppError> {
        // Held movement keys
        let keys = &mut self.input.keys;
        match key_code {
            KeyCode::KeyW => keys.forward = pressed,
            KeyCode::KeyS => keys.back = pressed,
            KeyCode::KeyD => keys.right = pressed,
            KeyCode::KeyA => keys.left = pressed,
            KeyCode::KeyE => keys.up = pressed,
            KeyCode::KeyQ => keys.down = pressed,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => keys.boost = pressed,
            KeyCode::ControlLeft | KeyCode::ControlRight => keys.precise = pressed,
            _ => {}
        }

        if !pressed {
            return Ok(());
        }

        let overlay = self.session.overlay();
        match key_code {
            KeyCode::Escape => self.input.quit = true,
            KeyCode::Tab => self.input.toggle_ui = true,

            // Pause screen buttons
            KeyCode::Enter => self.dispatch(OverlayCommand::ApplyAndContinue)?,
            KeyCode::Space => self.dispatch(OverlayCommand::KeepAndContinue)?,
            KeyCode::KeyR => self.dispatch(OverlayCommand::Restart)?,

            // Staged velocity sliders
            KeyCode::Digit1 | KeyCode::Digit2 | KeyCode::Digit3 | KeyCode::Digit4 => {
                self.selected_axis = match key_code {
                    KeyCode::Digit1 => 0,
                    KeyCode::Digit2 => 1,
                    KeyCode::Digit3 => 2,
                    _ => 3,
                };
                log::info!("Editing direction component {}", AXIS_NAMES[self.selected_axis]);
            }
            KeyCode::ArrowUp | KeyCode::ArrowDown => {
                let sign = if key_code == KeyCode::ArrowUp { 1.0 } else { -1.0 };
                let axis = self.selected_axis;
                let value = overlay.staged.direction[axis] + sign * COMPONENT_STEP;
                self.dispatch(OverlayCommand::SetStagedComponent { axis, value })?;
            }
            KeyCode::BracketLeft => self.dispatch(OverlayCommand::SetStagedMagnitude(
                overlay.staged.magnitude - MAGNITUDE_STEP,
            ))?,
            KeyCode::BracketRight => self.dispatch(OverlayCommand::SetStagedMagnitude(
                overlay.staged.magnitude + MAGNITUDE_STEP,
            ))?,

            // Live settings
            KeyCode::Minus => self.dispatch(OverlayCommand::SetCatchRadius(
                overlay.catch_radius - CATCH_RADIUS_STEP,
            ))?,
            KeyCode::Equal => self.dispatch(OverlayCommand::SetCatchRadius(
                overlay.catch_radius + CATCH_RADIUS_STEP,
            ))?,
            KeyCode::Comma => self.dispatch(OverlayCommand::SetSpeedMultiplier(
                overlay.speed_multiplier - SPEED_STEP,
            ))?,
            KeyCode::Period => self.dispatch(OverlayCommand::SetSpeedMultiplier(
                overlay.speed_multiplier + SPEED_STEP,
            ))?,

            // Audio
            KeyCode::KeyM => {
                self.audio.toggle();
                log::info!("Audio {}", if self.audio.enabled { "ON" } else { "OFF" });
            }
            KeyCode::Digit9 | KeyCode::Digit0 => {
                let step = if key_code == KeyCode::Digit0 { VOLUME_STEP } else { -VOLUME_STEP };
                self.audio.set_volume(self.audio.volume() as i32 + step);
                log::info!("Volume: {}%", self.audio.volume());
            }

            _ => {}
        }
        Ok(())
    }

    fn sync_cursor(&self) {
        self.grab_cursor(self.session.control_mode() == ControlMode::Camera);
    }

    fn grab_cursor(&self, grab: bool) {
        let Some(window) = &self.window else {
            return;
        };
        let result = if grab {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = result {
            log::warn!("Cursor grab failed: {}", e);
        }
        window.set_cursor_visible(!grab);
    }

    fn update_title(&self, fps: Option<f64>) {
        if let Some(window) = &self.window {
            let status = self.session.overlay().status_line();
            match fps {
                Some(fps) => window.set_title(&format!("Hypersphere Catch - {:.0} FPS - {}", fps, status)),
                None => window.set_title(&format!("Hypersphere Catch - {}", status)),
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Err(e) = self.handle_key(key_code, event.state.is_pressed()) {
                        self.fail(event_loop, e);
                        return;
                    }
                    if self.input.quit {
                        log::info!("Escape pressed, exiting...");
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    gpu.resize(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    self.fail(event_loop, e);
                    return;
                }
                // Request another frame immediately
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.cursor_delta.0 += delta.0 as f32;
            self.input.cursor_delta.1 += delta.1 as f32;
        }
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
