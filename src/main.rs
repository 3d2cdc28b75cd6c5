mod app;

use app::App;
use hypersphere_catch::config::GameConfig;
use hypersphere_catch::error::AppError;
use winit::event_loop::{ControlFlow, EventLoop};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    log::info!("Hypersphere Catch");

    let config = GameConfig::from_env()?;
    log::info!(
        "{} particles, {} rounds, {:?} backend",
        config.particle_count,
        config.max_rounds,
        config.backend
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
