//! Proximity graph construction
//!
//! Every frame the full edge set is rebuilt from the current positions: one edge for each
//! unordered pair `(i, j)`, `i < j`, closer than `max_dist`. Edges are written into a
//! fixed-capacity vertex buffer (two endpoints, each with a position and a colour) and never
//! kept across frames.

use crate::grid::SpatialGrid;
use crate::params::{NeighborSearch, NetworkParams};
use glam::Vec3;
use plexus_core::EdgeColorRamp;
use std::ops::ControlFlow;

/// A transient link between two particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Lower particle index
    pub a: u32,
    /// Higher particle index
    pub b: u32,
    pub distance: f32,
}

/// Fixed-capacity line-segment buffer.
///
/// Storage for every edge is allocated up front. `len` edges at the front are valid; anything
/// after that is left over from earlier frames and must not be drawn.
#[derive(Debug, Clone)]
pub struct EdgeBuffer {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    len: usize,
}

impl EdgeBuffer {
    /// Vertices written per edge
    pub const VERTICES_PER_EDGE: usize = 2;

    pub fn with_capacity(edges: usize) -> Self {
        let vertices = edges * Self::VERTICES_PER_EDGE;
        Self {
            positions: vec![[0.0; 3]; vertices],
            colors: vec![[0.0; 3]; vertices],
            len: 0,
        }
    }

    /// Forget the edges of the previous frame. The storage is kept.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append one edge. Returns `false`, leaving the buffer untouched, when it is full.
    pub fn push(&mut self, start: [f32; 3], end: [f32; 3], color: [f32; 3]) -> bool {
        if self.is_full() {
            return false;
        }

        let slot = self.len * Self::VERTICES_PER_EDGE;
        self.positions[slot] = start;
        self.positions[slot + 1] = end;
        self.colors[slot] = color;
        self.colors[slot + 1] = color;
        self.len += 1;
        true
    }

    /// Edges written this frame
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.positions.len() / Self::VERTICES_PER_EDGE
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity()
    }

    /// Valid vertex count, i.e. the draw range
    pub fn vertex_count(&self) -> usize {
        self.len * Self::VERTICES_PER_EDGE
    }

    /// Endpoint positions of the valid edges
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions[..self.vertex_count()]
    }

    /// Endpoint colours of the valid edges
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors[..self.vertex_count()]
    }
}

/// Result of one graph build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphStats {
    pub edges: usize,
    /// The buffer filled up and the remaining pairs were dropped
    pub saturated: bool,
}

/// Builds the proximity graph for a fixed particle count
#[derive(Debug, Clone)]
pub struct ProximityGraph {
    max_dist: f32,
    ramp: EdgeColorRamp,
    grid: Option<SpatialGrid>,
    warned_saturation: bool,
}

impl ProximityGraph {
    pub fn new(params: &NetworkParams) -> Self {
        let grid = match params.neighbor_search {
            NeighborSearch::AllPairs => None,
            NeighborSearch::UniformGrid => Some(SpatialGrid::new(
                params.range,
                params.max_dist,
                params.particle_count,
            )),
        };

        Self {
            max_dist: params.max_dist,
            ramp: params.edge_colors,
            grid,
            warned_saturation: false,
        }
    }

    pub fn max_dist(&self) -> f32 {
        self.max_dist
    }

    pub fn neighbor_search(&self) -> NeighborSearch {
        if self.grid.is_some() {
            NeighborSearch::UniformGrid
        } else {
            NeighborSearch::AllPairs
        }
    }

    /// Visit every edge of the current positions until `visit` breaks.
    pub fn for_each_edge<F>(&mut self, positions: &[[f32; 3]], mut visit: F)
    where
        F: FnMut(Edge) -> ControlFlow<()>,
    {
        let max_dist = self.max_dist;
        let mut check = |i: usize, j: usize| -> ControlFlow<()> {
            let distance = Vec3::from_array(positions[i]).distance(Vec3::from_array(positions[j]));
            if distance < max_dist {
                visit(Edge {
                    a: i as u32,
                    b: j as u32,
                    distance,
                })
            } else {
                ControlFlow::Continue(())
            }
        };

        match self.grid.as_mut() {
            Some(grid) => {
                grid.rebuild(positions);
                let _ = grid.for_each_candidate_pair(&mut check);
            }
            None => {
                let _ = for_each_pair(positions.len(), &mut check);
            }
        }
    }

    /// Collect the edges of the current positions
    pub fn edges(&mut self, positions: &[[f32; 3]]) -> Vec<Edge> {
        let mut edges = Vec::new();
        self.for_each_edge(positions, |edge| {
            edges.push(edge);
            ControlFlow::Continue(())
        });
        edges
    }

    /// Rebuild `out` from the current positions.
    ///
    /// Writing stops as soon as the buffer is full; nothing past its capacity is touched.
    pub fn build(&mut self, positions: &[[f32; 3]], out: &mut EdgeBuffer) -> GraphStats {
        out.clear();

        let ramp = self.ramp;
        let max_dist = self.max_dist;
        let mut saturated = false;

        self.for_each_edge(positions, |edge| {
            let color = ramp.color_for_distance(edge.distance, max_dist);
            if out.push(positions[edge.a as usize], positions[edge.b as usize], color) {
                ControlFlow::Continue(())
            } else {
                saturated = true;
                ControlFlow::Break(())
            }
        });

        if saturated && !self.warned_saturation {
            log::warn!(
                "Edge buffer saturated at {} edges; remaining pairs dropped",
                out.capacity()
            );
            self.warned_saturation = true;
        }

        GraphStats {
            edges: out.len(),
            saturated,
        }
    }
}

/// Enumerate every unordered pair `(i, j)`, `i < j`.
fn for_each_pair<F>(count: usize, mut visit: F) -> ControlFlow<()>
where
    F: FnMut(usize, usize) -> ControlFlow<()>,
{
    for i in 0..count {
        for j in (i + 1)..count {
            visit(i, j)?;
        }
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plexus_core::ParticleStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params_with(max_dist: f32, count: usize) -> NetworkParams {
        NetworkParams {
            max_dist,
            particle_count: count,
            ..NetworkParams::default()
        }
    }

    fn pairs(edges: &[Edge]) -> Vec<(u32, u32)> {
        let mut pairs: Vec<_> = edges.iter().map(|e| (e.a, e.b)).collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_four_particle_scenario() {
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [10.0, 10.0, 10.0],
            [1.5, 0.0, 0.0],
        ];
        let params = params_with(2.0, positions.len());
        let mut graph = ProximityGraph::new(&params);

        let edges = graph.edges(&positions);
        assert_eq!(pairs(&edges), vec![(0, 1), (0, 3), (1, 3)]);

        let distance = |a, b| edges.iter().find(|e| e.a == a && e.b == b).unwrap().distance;
        assert!((distance(0, 1) - 1.0).abs() < 1e-6);
        assert!((distance(0, 3) - 1.5).abs() < 1e-6);
        assert!((distance(1, 3) - 0.5).abs() < 1e-6);

        let mut buffer = EdgeBuffer::with_capacity(params.edge_capacity());
        let stats = graph.build(&positions, &mut buffer);
        assert_eq!(stats.edges, 3);
        assert!(!stats.saturated);
        assert_eq!(buffer.vertex_count(), 6);
    }

    #[test]
    fn test_threshold_is_strict() {
        let positions = [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let mut graph = ProximityGraph::new(&params_with(2.0, 2));

        assert!(graph.edges(&positions).is_empty());
    }

    #[test]
    fn test_coincident_particles_link_but_never_self() {
        let positions = [[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]];
        let mut graph = ProximityGraph::new(&params_with(2.0, 2));

        let edges = graph.edges(&positions);
        assert_eq!(pairs(&edges), vec![(0, 1)]);
        assert_eq!(edges[0].distance, 0.0);
    }

    #[test]
    fn test_edges_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        let store = ParticleStore::random(150, 18.0, 0.02, &mut rng);
        let mut graph = ProximityGraph::new(&params_with(3.4, store.len()));
        let positions = store.positions();

        let edges = graph.edges(positions);
        for edge in &edges {
            assert!(edge.a < edge.b);
        }

        let mut expected = Vec::new();
        for i in 0..positions.len() {
            for j in 0..positions.len() {
                if i == j {
                    continue;
                }
                let d = Vec3::from_array(positions[i]).distance(Vec3::from_array(positions[j]));
                if d < 3.4 && i < j {
                    expected.push((i as u32, j as u32));
                }
            }
        }
        assert_eq!(pairs(&edges), expected);
    }

    #[test]
    fn test_edge_vertices_and_colors() {
        let positions = [[0.0, 0.0, 0.0], [0.0, 1.7, 0.0]];
        let params = params_with(3.4, 2);
        let mut graph = ProximityGraph::new(&params);
        let mut buffer = EdgeBuffer::with_capacity(params.edge_capacity());

        graph.build(&positions, &mut buffer);

        assert_eq!(buffer.positions(), &[[0.0, 0.0, 0.0], [0.0, 1.7, 0.0]]);
        let expected = params.edge_colors.color_for_distance(1.7, 3.4);
        assert_eq!(buffer.colors(), &[expected, expected]);
    }

    #[test]
    fn test_build_halts_at_capacity() {
        // Five coincident particles make ten edges; only four fit.
        let positions = [[0.0; 3]; 5];
        let mut graph = ProximityGraph::new(&params_with(1.0, 5));
        let mut buffer = EdgeBuffer::with_capacity(4);

        let stats = graph.build(&positions, &mut buffer);

        assert!(stats.saturated);
        assert_eq!(stats.edges, 4);
        assert_eq!(buffer.len(), buffer.capacity());
        assert!(!buffer.push([0.0; 3], [0.0; 3], [0.0; 3]));
    }

    #[test]
    fn test_full_capacity_never_overflows() {
        // Every pair linked: the worst case fills the buffer exactly.
        let count = 12;
        let positions = vec![[0.0; 3]; count];
        let params = params_with(1.0, count);
        let mut graph = ProximityGraph::new(&params);
        let mut buffer = EdgeBuffer::with_capacity(params.edge_capacity());

        let stats = graph.build(&positions, &mut buffer);

        assert_eq!(stats.edges, count * (count - 1) / 2);
        assert!(!stats.saturated);
        assert!(buffer.len() <= buffer.capacity());
    }

    #[test]
    fn test_rebuild_shrinks_valid_range() {
        let params = params_with(2.0, 3);
        let mut graph = ProximityGraph::new(&params);
        let mut buffer = EdgeBuffer::with_capacity(params.edge_capacity());

        let clustered = [[0.0; 3], [0.5, 0.0, 0.0], [1.0, 0.0, 0.0]];
        assert_eq!(graph.build(&clustered, &mut buffer).edges, 3);

        let spread = [[0.0; 3], [5.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        assert_eq!(graph.build(&spread, &mut buffer).edges, 1);
        assert_eq!(buffer.positions().len(), 2);
    }

    #[test]
    fn test_empty_and_single_particle() {
        let mut graph = ProximityGraph::new(&params_with(2.0, 1));
        let mut buffer = EdgeBuffer::with_capacity(0);

        assert_eq!(graph.build(&[], &mut buffer), GraphStats::default());
        assert_eq!(graph.build(&[[0.0; 3]], &mut buffer), GraphStats::default());
    }
}
