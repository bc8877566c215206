/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for efficient neighbor lookups.
 * It hashes 3D space into cubic cells so a neighbor query only looks at the
 * block of cells around the querying agent instead of the whole population.
 *
 * The grid stores agent indices, never the agents themselves. It is rebuilt
 * from scratch every time positions change; bucket allocations from the
 * previous build are reused where the cell is still occupied.
 */

use ahash::AHashMap;
use glam::{IVec3, Vec3};

use crate::agent::Agent;
use crate::error::{Result, SimError};

pub struct SpatialGrid {
    cell_size: f32,
    cells: AHashMap<IVec3, Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SimError::InvalidCellSize(cell_size));
        }

        Ok(Self {
            cell_size,
            cells: AHashMap::new(),
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    // Convert a world position to its integer cell key
    #[inline]
    pub fn cell_key(&self, position: Vec3) -> IVec3 {
        (position / self.cell_size).floor().as_ivec3()
    }

    /// Drop every entry. Buckets that held agents keep their allocation for
    /// the next build; buckets that were already empty are released.
    pub fn clear(&mut self) {
        self.cells.retain(|_, bucket| {
            let keep = !bucket.is_empty();
            bucket.clear();
            keep
        });
    }

    #[inline]
    pub fn insert(&mut self, index: usize, position: Vec3) {
        let key = self.cell_key(position);
        self.cells.entry(key).or_default().push(index);
    }

    /// Replace the grid contents with the current agent positions.
    pub fn build(&mut self, agents: &[Agent]) {
        self.clear();
        for (index, agent) in agents.iter().enumerate() {
            self.insert(index, agent.position);
        }
    }

    /// Number of cells holding at least one agent.
    pub fn occupied_cells(&self) -> usize {
        self.cells.values().filter(|bucket| !bucket.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.values().all(Vec::is_empty)
    }

    /// Indices of agents within `radius` of `agents[index]` (strictly less),
    /// excluding the agent itself and any candidate rejected by `predicate`.
    ///
    /// The search covers the 27 surrounding cells when `radius` fits in one
    /// cell and widens the block for larger radii, so the result never
    /// depends on the chosen cell size. When the block would hold more cells
    /// than the grid has, the occupied cells are walked instead.
    pub fn query_neighbors<P>(&self, agents: &[Agent], index: usize, radius: f32, predicate: P) -> Vec<usize>
    where
        P: Fn(&Agent) -> bool,
    {
        let mut result = Vec::new();
        self.query_neighbors_into(agents, index, radius, predicate, &mut result);
        result
    }

    /// Same as `query_neighbors`, appending into a caller-owned buffer.
    pub fn query_neighbors_into<P>(
        &self,
        agents: &[Agent],
        index: usize,
        radius: f32,
        predicate: P,
        out: &mut Vec<usize>,
    ) where
        P: Fn(&Agent) -> bool,
    {
        let Some(agent) = agents.get(index) else {
            return;
        };
        if radius.is_nan() || radius <= 0.0 || self.cells.is_empty() {
            return;
        }

        let center = self.cell_key(agent.position);
        let reach = ((radius / self.cell_size).ceil() as i32).max(1);

        let mut visit = |bucket: &[usize]| {
            for &candidate_index in bucket {
                if candidate_index == index {
                    continue;
                }
                let Some(candidate) = agents.get(candidate_index) else {
                    continue;
                };
                if !predicate(candidate) {
                    continue;
                }
                if agent.position.distance(candidate.position) < radius {
                    out.push(candidate_index);
                }
            }
        };

        let side = 2 * i64::from(reach) + 1;
        let block = side.saturating_mul(side).saturating_mul(side);

        if block <= self.cells.len() as i64 {
            for dx in -reach..=reach {
                for dy in -reach..=reach {
                    for dz in -reach..=reach {
                        if let Some(bucket) = self.cells.get(&(center + IVec3::new(dx, dy, dz))) {
                            visit(bucket.as_slice());
                        }
                    }
                }
            }
            return;
        }

        // Block larger than the grid: walk the occupied cells instead, in the
        // same x-then-y-then-z order the block loop would visit them
        let mut keys: Vec<IVec3> = self
            .cells
            .iter()
            .filter(|(key, bucket)| !bucket.is_empty() && within_reach(**key, center, reach))
            .map(|(key, _)| *key)
            .collect();
        keys.sort_unstable_by_key(|key| key.to_array());

        for key in keys {
            if let Some(bucket) = self.cells.get(&key) {
                visit(bucket.as_slice());
            }
        }
    }
}

// Chebyshev distance between cell keys, widened so extreme keys cannot overflow
fn within_reach(key: IVec3, center: IVec3, reach: i32) -> bool {
    (0..3).all(|axis| (i64::from(key[axis]) - i64::from(center[axis])).abs() <= i64::from(reach))
}
