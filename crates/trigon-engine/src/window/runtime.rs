use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{GpuContext, GpuInit, WindowSurface};
use crate::render::{
    FrameOutcome, Geometry, RenderConfig, RenderCore, RenderError, ShaderArtifact, ViewDelegate,
};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "trigon".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
        }
    }
}

/// What the render core draws once the window exists.
#[derive(Debug, Clone)]
pub struct RenderSetup {
    pub geometry: Geometry,
    pub shader: ShaderArtifact,
    pub render: RenderConfig,
}

impl RenderSetup {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            shader: ShaderArtifact::vertex_color(),
            render: RenderConfig::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and renders `setup` into it until the window closes.
    ///
    /// Returns an error if the window or render core cannot be created, or if
    /// the surface becomes permanently unusable.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit, setup: RenderSetup) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, setup);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// The view side of the render core: owns the surface and delivers callbacks.
struct ViewHost<'w> {
    surface: WindowSurface<'w>,
    core: RenderCore<GpuContext>,
}

impl<'w> ViewHost<'w> {
    fn new(window: &'w Window, gpu_init: GpuInit, setup: RenderSetup) -> Result<Self, RenderError> {
        let (gpu, surface) = pollster::block_on(GpuContext::for_window(window, gpu_init))?;

        let RenderSetup {
            geometry,
            shader,
            render,
        } = setup;
        let mut core = RenderCore::new(gpu, geometry)
            .with_shader(shader)
            .with_config(render);
        core.initialize(&surface)?;

        Ok(Self { surface, core })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.surface.resize(size);
        self.core.on_resize(size.into());
    }

    fn render(&mut self) -> FrameOutcome {
        self.core.on_render(&mut self.surface)
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    host: ViewHost<'this>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    setup: Option<RenderSetup>,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, setup: RenderSetup) -> Self {
        Self {
            config,
            gpu_init,
            setup: Some(setup),
            entry: None,
            failure: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let setup = self
            .setup
            .take()
            .ok_or_else(|| anyhow!("render setup already consumed"))?;

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            window,
            host_builder: |w| ViewHost::new(w, gpu_init, setup),
        }
        .try_build()
        .context("failed to initialize the render core")
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.entry = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: one render tick per display refresh.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                // Drops the surface, the render core and its device.
                self.entry = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_host_mut(|host| host.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_host_mut(|host| host.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                if entry.with_host_mut(|host| host.render()) == FrameOutcome::Fatal {
                    self.fail(event_loop, anyhow!("surface can no longer be rendered to"));
                }
            }

            _ => {}
        }
    }
}
