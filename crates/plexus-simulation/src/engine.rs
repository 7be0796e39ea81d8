//! The per-frame pipeline and its lifecycle
//!
//! Each frame runs, in order: particle integration, proximity graph build, render buffer
//! commit, camera steering, then one render. The hosting application owns a single
//! [`NetworkEngine`] and forwards its window events to it.

use crate::graph::{GraphStats, ProximityGraph};
use crate::parallax::ParallaxController;
use crate::params::NetworkParams;
use crate::scheduler::{FrameHandle, FrameScheduler, SchedulerState};
use crate::sync::RenderBuffers;
use crate::viewport::Viewport;
use glam::{Vec2, Vec3};
use plexus_core::ParticleStore;
use rand::Rng;
use std::time::Instant;

/// Read-only view of everything a backend needs to draw one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameState<'a> {
    /// Point cloud positions, one per particle
    pub points: &'a [[f32; 3]],
    pub buffers: &'a RenderBuffers,
    pub camera_position: Vec3,
    /// Scene rotation about Y, radians
    pub rotation_y: f32,
}

/// The rendering capability the engine drives
pub trait RenderBackend {
    type Error;

    /// Upload whatever `frame.buffers.pending_uploads()` flags, then render one frame.
    fn present(&mut self, frame: &FrameState<'_>) -> Result<(), Self::Error>;

    /// Apply a new output size and pixel density
    fn resize(&mut self, viewport: Viewport);
}

/// What a frame callback did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameTick {
    Advanced { dt: f32, stats: GraphStats },
    /// The handle was cancelled or already used; nothing changed
    Stale,
}

pub struct NetworkEngine {
    params: NetworkParams,
    reduced_motion: bool,
    store: ParticleStore,
    graph: ProximityGraph,
    buffers: RenderBuffers,
    parallax: ParallaxController,
    scheduler: FrameScheduler,
    rotation_y: f32,
    last_stats: GraphStats,
}

impl NetworkEngine {
    /// Scatter `params.particle_count` particles and allocate every buffer up front.
    pub fn new<R: Rng + ?Sized>(params: NetworkParams, reduced_motion: bool, rng: &mut R) -> Self {
        let store = ParticleStore::random(
            params.particle_count,
            params.range,
            params.velocity_range,
            rng,
        );
        Self::with_store(params, reduced_motion, store)
    }

    /// Build around an existing particle store
    pub fn with_store(
        params: NetworkParams,
        reduced_motion: bool,
        mut store: ParticleStore,
    ) -> Self {
        store.set_frozen(reduced_motion);

        log::info!(
            "✓ Initialized {} particles (range {}, link distance {}, {:?})",
            store.len(),
            params.range,
            params.max_dist,
            params.neighbor_search
        );

        let edge_capacity = store.len() * store.len().saturating_sub(1) / 2;

        Self {
            graph: ProximityGraph::new(&params),
            buffers: RenderBuffers::new(edge_capacity),
            parallax: ParallaxController::new(params.parallax_gain, params.parallax_smoothing),
            scheduler: FrameScheduler::new(params.frame_interval, params.max_dt),
            params,
            reduced_motion,
            store,
            rotation_y: 0.0,
            last_stats: GraphStats::default(),
        }
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn buffers(&self) -> &RenderBuffers {
        &self.buffers
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// The frame callback currently outstanding, if any
    pub fn scheduled_frame(&self) -> Option<FrameHandle> {
        self.scheduler.outstanding()
    }

    pub fn last_stats(&self) -> GraphStats {
        self.last_stats
    }

    pub fn camera_position(&self) -> Vec3 {
        let offset = self.parallax.offset();
        Vec3::new(offset.x, offset.y, self.params.camera_distance)
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Start the loop. Under reduced motion one static frame is rendered immediately and
    /// nothing is ever scheduled; otherwise the first frame is scheduled.
    pub fn start<B: RenderBackend>(
        &mut self,
        now: Instant,
        backend: &mut B,
    ) -> Result<Option<FrameHandle>, B::Error> {
        let handle = self.scheduler.start(now, self.reduced_motion);

        if self.scheduler.state() == SchedulerState::Static && handle.is_none() {
            log::info!("Reduced motion requested: rendering a single static frame");
            self.advance(0.0);
            self.present(backend)?;
        } else if handle.is_some() {
            log::info!("Animation loop started");
        }

        Ok(handle)
    }

    /// Run one frame for `handle`. Stale handles are ignored.
    pub fn frame<B: RenderBackend>(
        &mut self,
        handle: FrameHandle,
        now: Instant,
        backend: &mut B,
    ) -> Result<FrameTick, B::Error> {
        let Some(dt) = self.scheduler.begin_frame(handle, now) else {
            log::debug!("Ignoring stale frame callback {:?}", handle);
            return Ok(FrameTick::Stale);
        };

        // Reschedule first so a failed render does not end the loop.
        self.scheduler.schedule_next();

        let stats = self.advance(dt);
        self.present(backend)?;

        Ok(FrameTick::Advanced { dt, stats })
    }

    /// Re-render the current buffers without advancing anything (e.g. after the host lost
    /// the surface contents while paused or static).
    pub fn redraw<B: RenderBackend>(&mut self, backend: &mut B) -> Result<(), B::Error> {
        self.present(backend)
    }

    fn advance(&mut self, dt: f32) -> GraphStats {
        self.store.integrate(dt);

        let stats = self
            .graph
            .build(self.store.positions(), self.buffers.edges_mut());
        self.buffers.commit(stats);

        self.parallax.update(dt);
        if !self.reduced_motion {
            self.rotation_y += self.params.spin_rate * dt;
        }

        self.last_stats = stats;
        stats
    }

    fn frame_state(&self) -> FrameState<'_> {
        FrameState {
            points: self.store.positions(),
            buffers: &self.buffers,
            camera_position: self.camera_position(),
            rotation_y: self.rotation_y,
        }
    }

    fn present<B: RenderBackend>(&mut self, backend: &mut B) -> Result<(), B::Error> {
        backend.present(&self.frame_state())?;
        self.buffers.mark_uploaded();
        Ok(())
    }

    /// Cancel the outstanding frame. Returns the cancelled handle.
    pub fn pause(&mut self) -> Option<FrameHandle> {
        let cancelled = self.scheduler.pause();
        if cancelled.is_some() {
            log::debug!("Paused, cancelled {:?}", cancelled);
        }
        cancelled
    }

    /// Resume after a pause with a fresh time reference. Returns the new frame handle.
    pub fn resume(&mut self, now: Instant) -> Option<FrameHandle> {
        let handle = self.scheduler.resume(now);
        if handle.is_some() {
            log::debug!("Resumed, scheduled {:?}", handle);
        }
        handle
    }

    /// Visibility change from the host
    pub fn set_hidden(&mut self, hidden: bool, now: Instant) -> Option<FrameHandle> {
        if hidden {
            self.pause();
            None
        } else {
            self.resume(now)
        }
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
        log::debug!("Animation loop stopped");
    }

    /// Latest pointer sample in normalized device coordinates
    pub fn pointer_moved(&mut self, ndc: Vec2) {
        self.parallax.set_pointer(ndc);
    }

    /// Viewport changes only touch the backend, never the simulation
    pub fn resize<B: RenderBackend>(&mut self, viewport: Viewport, backend: &mut B) {
        log::debug!(
            "Resize to {}x{} (scale {:.2})",
            viewport.width,
            viewport.height,
            viewport.scale_factor
        );
        backend.resize(viewport);
    }
}
