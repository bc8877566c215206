/*
 * Physics Module
 *
 * This module drives the flocking simulation one tick at a time:
 *
 * Pass 1 (forces): the spatial grid is built from the current positions and
 * every agent computes separation, alignment, cohesion, boundary and wander
 * forces against a frozen snapshot of the population, then integrates its own
 * velocity, position and orientation. No agent sees another agent's update
 * from the same pass, which lets the pass run on the rayon pool.
 *
 * Pass 2 (collisions): the grid is rebuilt from the moved positions and the
 * collision resolver pushes overlapping bodies apart.
 *
 * Randomness comes from a seeded generator owned by the engine. Pass 1 gives
 * each agent its own stream so parallel and sequential runs agree exactly.
 */

use std::time::Instant;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{trace, warn};

use crate::agent::Agent;
use crate::bounds::Bounds;
use crate::collision::{self, CollisionResolver, HalfOverlapResolver};
use crate::debug::TickStats;
use crate::error::Result;
use crate::forces::{self, Forces};
use crate::math::look_rotation;
use crate::params::SimulationParams;
use crate::spatial_grid::SpatialGrid;

/// Separation looks this many collision radii out.
pub const SEPARATION_SEARCH_FACTOR: f32 = 4.0;
/// Below this speed an agent keeps its current orientation.
pub const MIN_TURN_SPEED: f32 = 0.1;

pub struct FlockingEngine {
    bounds: Bounds,
    params: SimulationParams,
    grid: SpatialGrid,
    resolver: Box<dyn CollisionResolver>,
    rng: ChaCha8Rng,
    snapshot: Vec<Agent>,
}

impl FlockingEngine {
    pub fn new(bounds: Bounds, params: SimulationParams) -> Result<Self> {
        Self::with_resolver(bounds, params, Box::new(HalfOverlapResolver))
    }

    /// Engine using a custom hard-collision strategy for pass 2.
    pub fn with_resolver(
        bounds: Bounds,
        params: SimulationParams,
        resolver: Box<dyn CollisionResolver>,
    ) -> Result<Self> {
        bounds.validate()?;
        params.validate()?;
        let grid = SpatialGrid::new(params.effective_cell_size())?;

        Ok(Self {
            bounds,
            params,
            grid,
            resolver,
            rng: ChaCha8Rng::seed_from_u64(params.seed),
            snapshot: Vec::new(),
        })
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Replace the swimmable volume used by the boundary force. Safe between
    /// ticks; the grid and generator are untouched.
    pub fn set_bounds(&mut self, bounds: Bounds) -> Result<()> {
        bounds.validate()?;
        self.bounds = bounds;
        Ok(())
    }

    /// Advance every agent by `delta` seconds.
    pub fn tick(&mut self, agents: &mut [Agent], delta: f32) -> TickStats {
        let started = Instant::now();

        if !delta.is_finite() || delta <= 0.0 {
            warn!(delta, "skipping tick with non-positive timestep");
            return TickStats {
                agents: agents.len(),
                ..TickStats::default()
            };
        }

        // Pass 1: forces against a frozen copy of the population
        self.grid.build(agents);
        self.snapshot.clear();
        self.snapshot.extend_from_slice(agents);

        let tick_seed: u64 = self.rng.gen();
        let bounds = self.bounds;
        let margin = self.params.boundary_margin;
        let grid = &self.grid;
        let snapshot = self.snapshot.as_slice();

        let step = |(index, agent): (usize, &mut Agent)| {
            let mut rng = agent_rng(tick_seed, index);
            let forces = compute_forces(grid, snapshot, index, &bounds, margin, &mut rng);
            integrate(agent, forces.acceleration(&agent.behavior), delta);
        };

        if self.params.parallel {
            agents.par_iter_mut().enumerate().for_each(step);
        } else {
            agents.iter_mut().enumerate().for_each(step);
        }

        // Pass 2: hard collisions against the moved positions
        self.grid.build(agents);
        let occupied_cells = self.grid.occupied_cells();
        let collisions = self.resolver.resolve(agents, &self.grid, &mut self.rng);

        let stats = TickStats {
            agents: agents.len(),
            occupied_cells,
            contacts: collisions.contacts,
            degenerate_contacts: collisions.degenerate_contacts,
            elapsed: started.elapsed(),
        };

        trace!(
            agents = stats.agents,
            cells = stats.occupied_cells,
            contacts = stats.contacts,
            degenerate = stats.degenerate_contacts,
            "tick complete"
        );

        stats
    }

    /// Deepest overlap between any two agents at their current positions.
    /// Rebuilds the grid, so call it for reports rather than every tick.
    pub fn max_overlap(&mut self, agents: &[Agent]) -> f32 {
        self.grid.build(agents);
        collision::max_overlap(agents, &self.grid)
    }
}

// Independent stream per agent index, so work order never changes the draws
fn agent_rng(tick_seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(tick_seed);
    rng.set_stream(index as u64);
    rng
}

/// Every steering force acting on `agents[index]`, read from `agents` alone.
pub fn compute_forces<R: Rng + ?Sized>(
    grid: &SpatialGrid,
    agents: &[Agent],
    index: usize,
    bounds: &Bounds,
    margin: f32,
    rng: &mut R,
) -> Forces {
    let agent = &agents[index];
    let params = &agent.behavior;

    // Flock with own species only
    let flock = grid.query_neighbors(agents, index, params.perception_radius, |other| other.same_species(agent));

    // Keep clear of everyone
    let nearby = grid.query_neighbors(
        agents,
        index,
        agent.collision_radius() * SEPARATION_SEARCH_FACTOR,
        |_| true,
    );

    Forces {
        separation: forces::separation(agent, agents, &nearby, rng),
        alignment: forces::alignment(agent, agents, &flock),
        cohesion: forces::cohesion(agent, agents, &flock),
        boundary: forces::boundary_avoidance(agent.position, bounds, margin),
        wander: forces::wander(rng, params.wander_strength),
    }
}

/// Apply `acceleration` for `delta` seconds: speed is capped at the agent's
/// max speed and the heading turns toward the velocity at a bounded rate.
pub fn integrate(agent: &mut Agent, acceleration: Vec3, delta: f32) {
    let params = agent.behavior;

    agent.velocity += acceleration * delta;
    agent.velocity = agent.velocity.clamp_length_max(params.max_speed);
    agent.position += agent.velocity * delta;

    if agent.velocity.length() > MIN_TURN_SPEED {
        let target = look_rotation(agent.velocity);
        let t = (params.turn_speed * delta).clamp(0.0, 1.0);
        agent.orientation = agent.orientation.slerp(target, t).normalize();
    }
}
