/*
 * Agent Module
 *
 * This module defines the Agent struct: one schooling creature with its
 * kinematic state, body size and per-instance behavior parameters.
 * The flocking engine owns an agent's kinematics only for the duration of a
 * tick; between ticks the registry holds the records.
 */

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::COLLISION_RADIUS_FACTOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{}", self.0)
    }
}

/// Agents flock (align and cohere) only with others of the same species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeciesId(pub u32);

/// Tunable flocking behavior. Copied by value from the species template at
/// spawn, so editing one agent never leaks into another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorParams {
    pub perception_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub max_speed: f32,
    pub turn_speed: f32,
    pub wander_strength: f32,
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self {
            perception_radius: 20.0,
            separation_weight: 1.2,
            alignment_weight: 1.0,
            cohesion_weight: 0.8,
            max_speed: 5.0,
            turn_speed: 3.0,
            wander_strength: 0.5,
        }
    }
}

impl BehaviorParams {
    pub fn validate(&self) -> Result<()> {
        check_positive("perception_radius", self.perception_radius)?;
        check_non_negative("separation_weight", self.separation_weight)?;
        check_non_negative("alignment_weight", self.alignment_weight)?;
        check_non_negative("cohesion_weight", self.cohesion_weight)?;
        check_non_negative("max_speed", self.max_speed)?;
        check_non_negative("turn_speed", self.turn_speed)?;
        check_non_negative("wander_strength", self.wander_strength)?;
        Ok(())
    }
}

pub(crate) fn check_positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}

pub(crate) fn check_non_negative(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    pub species: SpeciesId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    pub size: f32,
    pub behavior: BehaviorParams,
    // Animation phase, advanced by the registry and never by the engine
    pub swim_phase: f32,
    pub swim_frequency: f32,
}

impl Agent {
    pub fn new(
        id: AgentId,
        species: SpeciesId,
        position: Vec3,
        size: f32,
        behavior: BehaviorParams,
    ) -> Result<Self> {
        check_positive("size", size)?;
        behavior.validate()?;

        Ok(Self {
            id,
            species,
            position,
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            size,
            behavior,
            swim_phase: 0.0,
            swim_frequency: 0.0,
        })
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// Effective solid radius used for separation and hard collisions.
    #[inline]
    pub fn collision_radius(&self) -> f32 {
        self.size * COLLISION_RADIUS_FACTOR
    }

    #[inline]
    pub fn same_species(&self, other: &Agent) -> bool {
        self.species == other.species
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            species: self.species,
            position: self.position,
            velocity: self.velocity,
            orientation: self.orientation,
            size: self.size,
            swim_phase: self.swim_phase,
        }
    }
}

/// Read-only copy of an agent's kinematic state for animation and rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub species: SpeciesId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    pub size: f32,
    pub swim_phase: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_radius_scales_with_size() {
        let agent = Agent::new(AgentId(0), SpeciesId(0), Vec3::ZERO, 2.0, BehaviorParams::default()).unwrap();
        assert_eq!(agent.collision_radius(), 3.0);
    }

    #[test]
    fn rejects_non_positive_size() {
        let err = Agent::new(AgentId(0), SpeciesId(0), Vec3::ZERO, 0.0, BehaviorParams::default());
        assert!(matches!(err, Err(SimError::InvalidParameter { name: "size", .. })));
    }

    #[test]
    fn rejects_non_positive_perception() {
        let behavior = BehaviorParams {
            perception_radius: 0.0,
            ..BehaviorParams::default()
        };
        assert!(behavior.validate().is_err());
        assert!(Agent::new(AgentId(0), SpeciesId(0), Vec3::ZERO, 1.0, behavior).is_err());
    }

    #[test]
    fn behavior_is_copied_not_shared() {
        let template = BehaviorParams::default();
        let mut a = Agent::new(AgentId(0), SpeciesId(0), Vec3::ZERO, 1.0, template).unwrap();
        let b = Agent::new(AgentId(1), SpeciesId(0), Vec3::ZERO, 1.0, template).unwrap();
        a.behavior.max_speed = 99.0;
        assert_eq!(b.behavior.max_speed, template.max_speed);
    }
}
