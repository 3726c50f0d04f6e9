use lamina_engine::device::GpuInit;
use lamina_engine::logging::{init_logging, LoggingConfig};
use lamina_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::PhysicalSize;

mod overlay;
mod plane;

use plane::PlaneApp;

const WINDOW_TITLE: &str = "OpenGL Plane with Normals and Lighting";

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: WINDOW_TITLE.to_string(),
        initial_size: PhysicalSize::new(800, 600),
        resizable: false,
    };

    Runtime::run(config, GpuInit::default(), PlaneApp::new())
}
