use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::backend::wgpu::WgpuBackend;
use crate::core::{LaunchError, PendingLaunch};
use crate::device::{match_backing_size, GpuInit};
use crate::input::platform::winit::{logical_width, translate_window_event};
use crate::input::RangeDrag;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "chroma".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window, draws the quad once and waits for the window to close.
    ///
    /// The context is acquired when the window is created; the quad is drawn on
    /// the window's first redraw. A failed launch closes the event loop and is
    /// returned from here.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    drag: RangeDrag,

    window: Window,

    #[borrows(window)]
    #[covariant]
    launch: PendingLaunch<WgpuBackend<'this>>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,

    entry: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit) -> Self {
        Self {
            config,
            gpu_init,
            entry: None,
            failure: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let entry = WindowEntryTryBuilder {
            drag: RangeDrag::default(),
            window,
            launch_builder: |w| PendingLaunch::acquire(|| WgpuBackend::new(w, gpu_init)),
        }
        .try_build()
        .map_err(|e: LaunchError| anyhow::Error::new(e))?;

        entry.with_launch(|l| {
            let info = l.backend().gpu().adapter_info();
            log::info!("context ready on {} ({:?})", info.name, info.backend);
        });
        entry.with_window(|w| w.request_redraw());

        self.entry = Some(entry);
        Ok(())
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
        if self.entry.is_some() || self.failure.is_some() {
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
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

        match &event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                event_loop.exit();
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                entry.with_launch_mut(|l| {
                    let gpu = l.backend_mut().gpu_mut();
                    let size = gpu.window().inner_size();
                    if match_backing_size(gpu, size.width, size.height) {
                        log::debug!("surface resized to {}x{}", size.width, size.height);
                    }
                });
            }

            WindowEvent::RedrawRequested => {
                match entry.with_launch_mut(|l| l.draw_first_frame()) {
                    Ok(true) => log::info!("first frame presented"),
                    Ok(false) => {}
                    Err(e) => self.fail(event_loop, anyhow::Error::new(e)),
                }
            }

            _ => {
                entry.with_mut(|fields| {
                    let Some(ev) = translate_window_event(fields.window, &event) else {
                        return;
                    };
                    let width = logical_width(fields.window);
                    if fields.drag.handle(ev, width) {
                        log::trace!("range value {}", fields.drag.value());
                    }
                });
            }
        }
    }
}
