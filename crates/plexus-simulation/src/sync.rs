//! Render buffer synchronisation
//!
//! Owns the edge buffer handed to the rendering backend and tracks what must be re-uploaded
//! and how much of it is valid this frame.

use crate::graph::{EdgeBuffer, GraphStats};
use std::ops::Range;

/// Buffers the backend has to re-upload before drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UploadFlags {
    pub points: bool,
    pub edges: bool,
}

impl UploadFlags {
    pub fn any(&self) -> bool {
        self.points || self.edges
    }
}

#[derive(Debug, Clone)]
pub struct RenderBuffers {
    edges: EdgeBuffer,
    edge_vertices: u32,
    pending: UploadFlags,
}

impl RenderBuffers {
    /// Allocate storage for `edge_capacity` edges. The storage never grows.
    pub fn new(edge_capacity: usize) -> Self {
        log::info!(
            "Edge buffers: {} edges ({} KiB per attribute)",
            edge_capacity,
            edge_capacity * EdgeBuffer::VERTICES_PER_EDGE * std::mem::size_of::<[f32; 3]>() / 1024
        );

        Self {
            edges: EdgeBuffer::with_capacity(edge_capacity),
            edge_vertices: 0,
            pending: UploadFlags::default(),
        }
    }

    /// Exclusive access for the graph builder during one frame's write
    pub fn edges_mut(&mut self) -> &mut EdgeBuffer {
        &mut self.edges
    }

    pub fn edges(&self) -> &EdgeBuffer {
        &self.edges
    }

    /// Commit this frame's writes: mark points and edges for upload and clip the draw range
    /// to exactly the edges written, so stale slots from earlier frames are never drawn.
    pub fn commit(&mut self, stats: GraphStats) {
        debug_assert_eq!(stats.edges, self.edges.len());
        debug_assert!(self.edges.len() <= self.edges.capacity());

        self.edge_vertices = self.edges.vertex_count() as u32;
        self.pending = UploadFlags {
            points: true,
            edges: true,
        };
    }

    /// Vertex range of the line segments to draw
    pub fn edge_draw_range(&self) -> Range<u32> {
        0..self.edge_vertices
    }

    pub fn pending_uploads(&self) -> UploadFlags {
        self.pending
    }

    /// Called once the backend has consumed the pending uploads
    pub fn mark_uploaded(&mut self) {
        self.pending = UploadFlags::default();
    }

    /// Edge vertex positions inside the draw range
    pub fn edge_positions(&self) -> &[[f32; 3]] {
        &self.edges.positions()[..self.edge_vertices as usize]
    }

    /// Edge vertex colours inside the draw range
    pub fn edge_colors(&self) -> &[[f32; 3]] {
        &self.edges.colors()[..self.edge_vertices as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ProximityGraph;
    use crate::params::NetworkParams;

    #[test]
    fn test_commit_sets_draw_range_and_flags() {
        let params = NetworkParams {
            particle_count: 3,
            max_dist: 2.0,
            ..NetworkParams::default()
        };
        let mut graph = ProximityGraph::new(&params);
        let mut buffers = RenderBuffers::new(params.edge_capacity());
        assert!(!buffers.pending_uploads().any());

        let positions = [[0.0; 3], [1.0, 0.0, 0.0], [9.0, 0.0, 0.0]];
        let stats = graph.build(&positions, buffers.edges_mut());
        buffers.commit(stats);

        assert_eq!(buffers.edge_draw_range(), 0..2);
        assert_eq!(
            buffers.pending_uploads(),
            UploadFlags {
                points: true,
                edges: true
            }
        );
        assert_eq!(buffers.edge_positions().len(), 2);
        assert_eq!(buffers.edge_colors().len(), 2);

        buffers.mark_uploaded();
        assert!(!buffers.pending_uploads().any());
    }

    #[test]
    fn test_draw_range_excludes_stale_slots() {
        let params = NetworkParams {
            particle_count: 3,
            max_dist: 2.0,
            ..NetworkParams::default()
        };
        let mut graph = ProximityGraph::new(&params);
        let mut buffers = RenderBuffers::new(params.edge_capacity());

        let dense = [[0.0; 3], [0.5, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let stats = graph.build(&dense, buffers.edges_mut());
        buffers.commit(stats);
        assert_eq!(buffers.edge_draw_range(), 0..6);

        let sparse = [[0.0; 3], [5.0, 0.0, 0.0], [-5.0, 0.0, 0.0]];
        let stats = graph.build(&sparse, buffers.edges_mut());
        buffers.commit(stats);
        assert_eq!(buffers.edge_draw_range(), 0..0);
        assert!(buffers.edge_positions().is_empty());
    }
}
