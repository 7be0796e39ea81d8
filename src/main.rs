//! Plexus: ambient particle network
//!
//! Drifting points joined by proximity lines, with a camera that leans toward the pointer.

use plexus_renderer::{Camera, GpuContext, NetworkRenderer, RendererError};
use plexus_simulation::{
    pointer_to_ndc, EdgeBuffer, FrameHandle, FrameState, FrameTick, NetworkEngine,
    NetworkParams, RenderBackend, SchedulerState, Viewport,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    error::EventLoopError,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const REDUCED_MOTION_ENV: &str = "PLEXUS_REDUCED_MOTION";
const REDUCED_MOTION_ARG: &str = "--reduced-motion";
const FRAME_STATS_WINDOW: usize = 100;

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// The user's motion preference, read once at startup
fn reduced_motion_requested() -> bool {
    std::env::args().skip(1).any(|arg| arg == REDUCED_MOTION_ARG)
        || std::env::var(REDUCED_MOTION_ENV)
            .map(|value| is_truthy(&value))
            .unwrap_or(false)
}

struct GpuState {
    context: GpuContext,
    renderer: NetworkRenderer,
    camera: Camera,
    viewport: Viewport,
}

impl GpuState {
    async fn new(window: Arc<Window>, params: &NetworkParams) -> Result<Self, RendererError> {
        let size = window.inner_size();
        let viewport = Viewport::new(
            size.width,
            size.height,
            window.scale_factor(),
            params.style.max_pixel_ratio,
        );
        let (width, height) = viewport.surface_size();

        let context = GpuContext::new(window, width, height).await?;
        let renderer = NetworkRenderer::new(
            &context.device,
            context.format(),
            params.style,
            params.particle_count,
            params.edge_capacity() * EdgeBuffer::VERTICES_PER_EDGE,
        );

        log::info!(
            "✓ Surface {}x{} (pixel ratio {:.2}, {:?})",
            width,
            height,
            viewport.pixel_ratio(),
            context.format()
        );

        Ok(Self {
            context,
            renderer,
            camera: Camera::new(width, height),
            viewport,
        })
    }

    fn reconfigure(&self) {
        self.context.reconfigure();
    }
}

impl RenderBackend for GpuState {
    type Error = wgpu::SurfaceError;

    fn present(&mut self, frame: &FrameState<'_>) -> Result<(), Self::Error> {
        let output = self.context.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uploads = frame.buffers.pending_uploads();
        if uploads.points {
            self.renderer.upload_points(&self.context.queue, frame.points);
        }
        if uploads.edges {
            self.renderer.upload_edges(
                &self.context.queue,
                frame.buffers.edge_positions(),
                frame.buffers.edge_colors(),
            );
        }

        self.camera.position = frame.camera_position;
        self.camera.rotation_y = frame.rotation_y;

        self.renderer.render(
            &self.context.device,
            &self.context.queue,
            &view,
            &self.camera,
            self.context.config.height,
            frame.buffers.edge_draw_range(),
        );

        output.present();
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.viewport = viewport;
        let (width, height) = viewport.surface_size();
        self.context.resize(width, height);
        self.camera.resize(width, height);
    }
}

/// The window counts as hidden while any of these hold
#[derive(Debug, Default, Clone, Copy)]
struct Visibility {
    occluded: bool,
    minimized: bool,
    suspended: bool,
}

impl Visibility {
    fn hidden(&self) -> bool {
        self.occluded || self.minimized || self.suspended
    }
}

/// Rolling frame time average for the window title
struct FrameStats {
    frame_times: VecDeque<f32>,
    last_frame: Option<Instant>,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(FRAME_STATS_WINDOW),
            last_frame: None,
        }
    }

    /// Record a frame at `now`. Returns `(fps, average ms)` once two frames have been seen.
    fn record(&mut self, now: Instant) -> Option<(f32, f32)> {
        let last = self.last_frame.replace(now)?;
        let frame_time = now.duration_since(last).as_secs_f32() * 1000.0;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > FRAME_STATS_WINDOW {
            self.frame_times.pop_front();
        }

        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        if avg_frame_time <= 0.0 {
            return None;
        }
        Some((1000.0 / avg_frame_time, avg_frame_time))
    }

    /// Forget the last timestamp so a pause does not show up as one long frame
    fn reset_clock(&mut self) {
        self.last_frame = None;
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    engine: NetworkEngine,
    // Handle the next RedrawRequested belongs to
    pending: Option<FrameHandle>,
    visibility: Visibility,
    stats: FrameStats,
}

impl App {
    fn new(engine: NetworkEngine) -> Self {
        Self {
            window: None,
            gpu_state: None,
            engine,
            pending: None,
            visibility: Visibility::default(),
            stats: FrameStats::new(),
        }
    }

    fn schedule(&mut self, handle: Option<FrameHandle>) {
        if let Some(handle) = handle {
            self.pending = Some(handle);
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn update_visibility(&mut self, update: impl FnOnce(&mut Visibility)) {
        let was_hidden = self.visibility.hidden();
        update(&mut self.visibility);
        let hidden = self.visibility.hidden();

        if hidden != was_hidden {
            if hidden {
                self.stats.reset_clock();
            }
            let handle = self.engine.set_hidden(hidden, Instant::now());
            self.schedule(handle);
        }
    }

    fn current_viewport(&self) -> Option<Viewport> {
        let window = self.window.as_ref()?;
        let size = window.inner_size();
        Some(Viewport::new(
            size.width,
            size.height,
            window.scale_factor(),
            self.engine.params().style.max_pixel_ratio,
        ))
    }

    fn apply_viewport(&mut self) {
        let Some(viewport) = self.current_viewport() else {
            return;
        };

        self.update_visibility(|v| v.minimized = viewport.is_empty());

        if let Some(gpu_state) = &mut self.gpu_state {
            self.engine.resize(viewport, gpu_state);
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_surface_error(&mut self, error: wgpu::SurfaceError, event_loop: &ActiveEventLoop) {
        match error {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                if let Some(gpu_state) = &self.gpu_state {
                    gpu_state.reconfigure();
                }
            }
            wgpu::SurfaceError::OutOfMemory => {
                log::error!("GPU out of memory, exiting");
                self.engine.stop();
                event_loop.exit();
            }
            e => log::warn!("Render error: {:?}", e),
        }
    }

    fn update_title(&self, fps: Option<(f32, f32)>) {
        let Some(window) = &self.window else {
            return;
        };
        let particles = self.engine.store().len();
        let edges = self.engine.last_stats().edges;

        let title = match fps {
            Some((fps, frame_time)) => format!(
                "Plexus - {:.0} FPS ({:.2}ms) - {} particles, {} edges",
                fps, frame_time, particles, edges
            ),
            None => format!("Plexus - {} particles, {} edges", particles, edges),
        };
        window.set_title(&title);
    }

    // In static mode every repaint lands in `engine.redraw`, which re-presents the frozen
    // frame and never advances the simulation.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };

        let now = Instant::now();
        let result = match self.pending.take() {
            Some(handle) => self
                .engine
                .frame(handle, now, gpu_state)
                .map(|tick| matches!(tick, FrameTick::Advanced { .. })),
            // Nothing scheduled (static mode, or the host asked for a repaint)
            None => self.engine.redraw(gpu_state).map(|_| false),
        };

        match result {
            Ok(true) => {
                let fps = self.stats.record(now);
                self.update_title(fps);
            }
            Ok(false) => {}
            Err(e) => self.handle_surface_error(e, event_loop),
        }

        // The next frame was scheduled before rendering, even if rendering failed
        let next = self.engine.scheduled_frame();
        self.schedule(next);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            self.update_visibility(|v| v.suspended = false);
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Plexus")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let params = *self.engine.params();
        let gpu_state = match pollster::block_on(GpuState::new(window.clone(), &params)) {
            Ok(gpu_state) => gpu_state,
            Err(e) => {
                log::error!("Failed to initialize GPU: {}", e);
                event_loop.exit();
                return;
            }
        };

        self.window = Some(window);
        let gpu_state = self.gpu_state.insert(gpu_state);

        match self.engine.start(Instant::now(), gpu_state) {
            Ok(handle) => self.schedule(handle),
            Err(e) => self.handle_surface_error(e, event_loop),
        }

        if self.engine.state() == SchedulerState::Static {
            self.update_title(None);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.update_visibility(|v| v.suspended = true);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                self.engine.stop();
                self.pending = None;
                event_loop.exit();
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.apply_viewport();
            }

            WindowEvent::Occluded(occluded) => {
                self.update_visibility(|v| v.occluded = occluded);
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    let ndc = pointer_to_ndc(position.x, position.y, size.width, size.height);
                    self.engine.pointer_moved(ndc);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

fn main() -> Result<(), EventLoopError> {
    // RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting plexus network background...");

    let reduced_motion = reduced_motion_requested();
    let params = NetworkParams::for_motion_preference(reduced_motion);
    let engine = NetworkEngine::new(params, reduced_motion, &mut rand::rng());
    if engine.reduced_motion() {
        log::info!("Reduced motion: particles frozen, single static frame");
    }

    let event_loop = EventLoop::new()?;
    // Frames are driven by redraw requests; idle while paused or static
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(engine);
    event_loop.run_app(&mut app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_truthy_values() {
        for value in ["1", "true", "YES", " on "] {
            assert!(is_truthy(value), "{value:?}");
        }
        for value in ["", "0", "false", "off", "maybe"] {
            assert!(!is_truthy(value), "{value:?}");
        }
    }

    #[test]
    fn test_visibility_hidden_until_all_clear() {
        let mut visibility = Visibility::default();
        assert!(!visibility.hidden());

        visibility.occluded = true;
        visibility.minimized = true;
        assert!(visibility.hidden());

        visibility.occluded = false;
        assert!(visibility.hidden());

        visibility.minimized = false;
        assert!(!visibility.hidden());

        visibility.suspended = true;
        assert!(visibility.hidden());
    }

    #[test]
    fn test_frame_stats_average() {
        let mut stats = FrameStats::new();
        let t0 = Instant::now();

        assert!(stats.record(t0).is_none());

        let (fps, ms) = stats.record(t0 + Duration::from_millis(20)).unwrap();
        assert!((ms - 20.0).abs() < 0.01);
        assert!((fps - 50.0).abs() < 0.1);
    }

    #[test]
    fn test_frame_stats_window_is_bounded() {
        let mut stats = FrameStats::new();
        let t0 = Instant::now();

        for i in 0..500 {
            stats.record(t0 + Duration::from_millis(i * 16));
        }

        assert_eq!(stats.frame_times.len(), FRAME_STATS_WINDOW);
    }

    #[test]
    fn test_frame_stats_reset_skips_gap() {
        let mut stats = FrameStats::new();
        let t0 = Instant::now();

        stats.record(t0);
        stats.record(t0 + Duration::from_millis(16));
        stats.reset_clock();

        // A long pause is not counted as a frame
        assert!(stats.record(t0 + Duration::from_secs(10)).is_none());
        assert_eq!(stats.frame_times.len(), 1);
    }
}
