use anyhow::Result;
use winit::dpi::LogicalSize;

use mandel_engine::device::GpuInit;
use mandel_engine::logging::{init_logging, LoggingConfig};
use mandel_engine::window::{Runtime, RuntimeConfig};
use mandel_view::{FractalApp, ViewerConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = ViewerConfig::default();
    config.validate()?;

    let runtime = RuntimeConfig {
        title: "Mandelbrot".to_string(),
        initial_size: LogicalSize::new(1024.0, 768.0),
    };

    // Shader output is final color; an sRGB surface would re-encode it.
    let gpu = GpuInit {
        prefer_srgb: false,
        ..GpuInit::default()
    };

    log::info!("starting viewer: {config:?}");
    Runtime::run(runtime, gpu, FractalApp::new(config))
}
