//! Uniform spatial grid for neighbour search
//!
//! Cells are at least `max_dist` wide, so any pair closer than `max_dist` sits in the same or
//! an adjacent cell. Particles past the domain walls are clamped into the border cells, which
//! keeps that property. Storage is sized once and reused every frame (counting sort).

use std::ops::ControlFlow;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    half_extent: f32,
    cell_size: f32,
    cells_per_axis: usize,
    /// Prefix offsets into `entries`, one slot per cell plus a terminator
    cell_start: Vec<u32>,
    /// Write cursors used while filling `entries`
    cursor: Vec<u32>,
    /// Particle indices grouped by cell
    entries: Vec<u32>,
    /// Cell index per particle
    cell_of: Vec<u32>,
}

impl SpatialGrid {
    pub fn new(range: f32, max_dist: f32, particle_capacity: usize) -> Self {
        let cells_per_axis = ((range / max_dist).floor() as usize).max(1);
        let cell_size = range / cells_per_axis as f32;
        let cells = cells_per_axis.pow(3);

        log::debug!(
            "Spatial grid: {}³ cells of {:.2} units",
            cells_per_axis,
            cell_size
        );

        Self {
            half_extent: range * 0.5,
            cell_size,
            cells_per_axis,
            cell_start: vec![0; cells + 1],
            cursor: vec![0; cells],
            entries: Vec::with_capacity(particle_capacity),
            cell_of: Vec::with_capacity(particle_capacity),
        }
    }

    pub fn cells_per_axis(&self) -> usize {
        self.cells_per_axis
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn axis_cell(&self, coordinate: f32) -> usize {
        let cell = ((coordinate + self.half_extent) / self.cell_size).floor().max(0.0) as usize;
        cell.min(self.cells_per_axis - 1)
    }

    /// Flat cell index for a position
    pub fn cell_index(&self, position: [f32; 3]) -> usize {
        let n = self.cells_per_axis;
        let x = self.axis_cell(position[0]);
        let y = self.axis_cell(position[1]);
        let z = self.axis_cell(position[2]);
        (z * n + y) * n + x
    }

    /// Re-bin all particles
    pub fn rebuild(&mut self, positions: &[[f32; 3]]) {
        let cells = self.cursor.len();

        self.cell_start.fill(0);
        self.cell_of.clear();
        for &position in positions {
            let cell = self.cell_index(position);
            self.cell_of.push(cell as u32);
            self.cell_start[cell + 1] += 1;
        }

        for cell in 0..cells {
            self.cell_start[cell + 1] += self.cell_start[cell];
        }
        self.cursor.copy_from_slice(&self.cell_start[..cells]);

        self.entries.clear();
        self.entries.resize(positions.len(), 0);
        for (particle, &cell) in self.cell_of.iter().enumerate() {
            let slot = &mut self.cursor[cell as usize];
            self.entries[*slot as usize] = particle as u32;
            *slot += 1;
        }
    }

    /// Particles binned into one cell
    pub fn cell_entries(&self, cell: usize) -> &[u32] {
        let start = self.cell_start[cell] as usize;
        let end = self.cell_start[cell + 1] as usize;
        &self.entries[start..end]
    }

    /// Visit each unordered pair `(i, j)`, `i < j`, whose cells touch. Every pair within
    /// `max_dist` is among them, each exactly once.
    pub fn for_each_candidate_pair<F>(&self, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(usize, usize) -> ControlFlow<()>,
    {
        let n = self.cells_per_axis as isize;

        for (i, &cell) in self.cell_of.iter().enumerate() {
            let cell = cell as isize;
            let (cx, cy, cz) = (cell % n, (cell / n) % n, cell / (n * n));

            for dz in -1..=1 {
                let z = cz + dz;
                if z < 0 || z >= n {
                    continue;
                }
                for dy in -1..=1 {
                    let y = cy + dy;
                    if y < 0 || y >= n {
                        continue;
                    }
                    for dx in -1..=1 {
                        let x = cx + dx;
                        if x < 0 || x >= n {
                            continue;
                        }

                        let neighbor = ((z * n + y) * n + x) as usize;
                        for &j in self.cell_entries(neighbor) {
                            let j = j as usize;
                            if j > i {
                                visit(i, j)?;
                            }
                        }
                    }
                }
            }
        }

        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, ProximityGraph};
    use crate::params::{NeighborSearch, NetworkParams};
    use plexus_core::ParticleStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sorted_pairs(edges: Vec<Edge>) -> Vec<(u32, u32)> {
        let mut pairs: Vec<_> = edges.into_iter().map(|e| (e.a, e.b)).collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_cells_are_at_least_max_dist() {
        let grid = SpatialGrid::new(18.0, 3.4, 10);

        assert_eq!(grid.cells_per_axis(), 5);
        assert!(grid.cell_size() >= 3.4);
    }

    #[test]
    fn test_out_of_domain_positions_clamp_to_border() {
        let grid = SpatialGrid::new(18.0, 3.4, 1);

        assert_eq!(grid.cell_index([-9.5, -9.5, -9.5]), 0);
        assert_eq!(grid.cell_index([9.5, 9.5, 9.5]), 124);
        assert_eq!(grid.cell_index([9.0, 9.0, 9.0]), 124);
    }

    #[test]
    fn test_rebuild_bins_every_particle_once() {
        let mut rng = StdRng::seed_from_u64(5);
        let store = ParticleStore::random(300, 18.0, 0.02, &mut rng);
        let mut grid = SpatialGrid::new(18.0, 3.4, store.len());

        grid.rebuild(store.positions());

        let mut seen: Vec<u32> = (0..125).flat_map(|c| grid.cell_entries(c).to_vec()).collect();
        seen.sort();
        assert_eq!(seen, (0..300).collect::<Vec<u32>>());
    }

    #[test]
    fn test_grid_matches_all_pairs() {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut store = ParticleStore::random(220, 18.0, 0.02, &mut rng);

        let all_pairs = NetworkParams::default();
        let gridded = NetworkParams {
            neighbor_search: NeighborSearch::UniformGrid,
            ..NetworkParams::default()
        };
        let mut brute = ProximityGraph::new(&all_pairs);
        let mut binned = ProximityGraph::new(&gridded);
        assert_eq!(binned.neighbor_search(), NeighborSearch::UniformGrid);

        for _ in 0..50 {
            store.integrate(3.0);
            let expected = sorted_pairs(brute.edges(store.positions()));
            let actual = sorted_pairs(binned.edges(store.positions()));
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_grid_handles_particles_past_the_wall() {
        let positions = [[9.03, 0.0, 0.0], [6.0, 0.0, 0.0], [-9.02, 0.0, 0.0]];
        let params = NetworkParams {
            neighbor_search: NeighborSearch::UniformGrid,
            particle_count: positions.len(),
            ..NetworkParams::default()
        };
        let mut graph = ProximityGraph::new(&params);

        assert_eq!(sorted_pairs(graph.edges(&positions)), vec![(0, 1)]);
    }
}
