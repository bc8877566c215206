/*
 * Shoal - Module Definitions
 *
 * Real-time 3D schooling simulation core. A uniform spatial grid feeds
 * species-aware flocking forces; a hard collision pass then keeps bodies from
 * overlapping. Rendering and animation consume `AgentSnapshot`s.
 */

// Re-export key components for easier access
pub use agent::{Agent, AgentId, AgentSnapshot, BehaviorParams, SpeciesId};
pub use bounds::Bounds;
pub use collision::{CollisionResolver, HalfOverlapResolver};
pub use config::AquariumConfig;
pub use debug::{StatsAccumulator, TickStats};
pub use error::{Result, SimError};
pub use params::SimulationParams;
pub use physics::FlockingEngine;
pub use registry::{AgentRegistry, SpeciesTemplate};
pub use spatial_grid::SpatialGrid;

// Define modules
pub mod agent;
pub mod bounds;
pub mod collision;
pub mod config;
pub mod debug;
pub mod error;
pub mod forces;
pub mod math;
pub mod params;
pub mod physics;
pub mod registry;
pub mod spatial_grid;

// Collision radius as a multiple of body size
pub const COLLISION_RADIUS_FACTOR: f32 = 1.5;
