use anyhow::{bail, Context};
use winit::dpi::LogicalSize;

use trigon_engine::device::GpuInit;
use trigon_engine::logging::{init_logging, LoggingConfig};
use trigon_engine::render::{Geometry, QuadGrid};
use trigon_engine::window::{RenderSetup, Runtime, RuntimeConfig};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let scene = std::env::args().nth(1);
    let (title, geometry) = match scene.as_deref() {
        None | Some("triangle") => ("trigon: triangle", Geometry::triangle()),
        Some("grid") => ("trigon: quad grid", Geometry::quad_grid(QuadGrid::default())),
        Some(other) => bail!("unknown scene {other:?} (expected \"triangle\" or \"grid\")"),
    };

    log::info!("{title}: {} vertices", geometry.vertex_count());

    let config = RuntimeConfig {
        title: title.to_string(),
        initial_size: LogicalSize::new(800.0, 600.0),
    };

    Runtime::run(config, GpuInit::default(), RenderSetup::new(geometry))
        .context("trigon demo failed")
}
