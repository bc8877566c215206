/*
 * Collision Module
 *
 * Hard collision resolution run after the force pass. Force-based separation
 * cannot guarantee that bodies stop overlapping within one timestep, so this
 * pass moves positions directly. Velocities and orientations are left alone.
 */

use rand::RngCore;

use crate::agent::Agent;
use crate::debug::CollisionStats;
use crate::forces::DEGENERATE_DISTANCE;
use crate::math::random_unit_vector;
use crate::spatial_grid::SpatialGrid;

/// Bodies are searched for out to this multiple of the agent's own radius.
pub const CONTACT_SEARCH_FACTOR: f32 = 3.0;

/// Moves overlapping agents apart. `grid` has been built from the current
/// positions before the call.
pub trait CollisionResolver: Send + Sync {
    fn resolve(&self, agents: &mut [Agent], grid: &SpatialGrid, rng: &mut dyn RngCore) -> CollisionStats;
}

/// Each agent in an overlapping pair pushes itself out by half the overlap,
/// from its own point of view, visiting agents in slice order. Later agents
/// see the corrections made by earlier ones, so the outcome depends on order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfOverlapResolver;

impl CollisionResolver for HalfOverlapResolver {
    fn resolve(&self, agents: &mut [Agent], grid: &SpatialGrid, rng: &mut dyn RngCore) -> CollisionStats {
        let mut stats = CollisionStats::default();
        let mut nearby = Vec::new();

        for index in 0..agents.len() {
            let radius = agents[index].collision_radius();

            nearby.clear();
            grid.query_neighbors_into(agents, index, radius * CONTACT_SEARCH_FACTOR, |_| true, &mut nearby);

            for &other_index in &nearby {
                let other_position = agents[other_index].position;
                let other_radius = agents[other_index].collision_radius();
                let agent = &mut agents[index];

                let diff = agent.position - other_position;
                let distance = diff.length();

                if distance < DEGENERATE_DISTANCE {
                    agent.position += random_unit_vector(rng) * radius;
                    stats.degenerate_contacts += 1;
                    stats.contacts += 1;
                    continue;
                }

                let min_distance = radius + other_radius;
                if distance < min_distance {
                    let overlap = min_distance - distance;
                    agent.position += (diff / distance) * (overlap * 0.5);
                    stats.contacts += 1;
                }
            }
        }

        stats
    }
}

/// Deepest pairwise overlap among `agents`, found through `grid`, which must
/// be built from the current positions. Costs a full neighbor sweep.
pub fn max_overlap(agents: &[Agent], grid: &SpatialGrid) -> f32 {
    let mut deepest = 0.0f32;
    let mut nearby = Vec::new();

    for (index, agent) in agents.iter().enumerate() {
        let radius = agent.collision_radius();
        nearby.clear();
        grid.query_neighbors_into(agents, index, radius * CONTACT_SEARCH_FACTOR, |_| true, &mut nearby);

        for other in nearby.iter().filter_map(|&i| agents.get(i)) {
            let overlap = radius + other.collision_radius() - agent.position.distance(other.position);
            deepest = deepest.max(overlap);
        }
    }
    deepest
}
