/*
 * Agent Registry Module
 *
 * Owns the species catalog, the live agent records and the flocking engine.
 * Handles the agent lifecycle (spawn and removal), advances the swim-phase
 * accumulator used by animation, and hands out read-only snapshots.
 */

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::{check_positive, Agent, AgentId, AgentSnapshot, BehaviorParams, SpeciesId};
use crate::bounds::Bounds;
use crate::debug::TickStats;
use crate::error::{Result, SimError};
use crate::math::look_rotation;
use crate::params::SimulationParams;
use crate::physics::FlockingEngine;

/// Shared starting point for every agent of a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesTemplate {
    pub name: String,
    pub size_min: f32,
    pub size_max: f32,
    #[serde(default)]
    pub behavior: BehaviorParams,
    #[serde(default = "default_swim_frequency")]
    pub swim_frequency: f32,
}

fn default_swim_frequency() -> f32 {
    6.0
}

impl SpeciesTemplate {
    pub fn validate(&self) -> Result<()> {
        check_positive("size_min", self.size_min)?;
        check_positive("size_max", self.size_max)?;
        if self.size_max < self.size_min {
            return Err(SimError::InvalidParameter {
                name: "size_max",
                value: self.size_max,
            });
        }
        self.behavior.validate()
    }
}

/// The built-in aquarium species.
pub fn default_species() -> Vec<SpeciesTemplate> {
    let base = BehaviorParams::default();
    vec![
        SpeciesTemplate {
            name: "clownfish".into(),
            size_min: 1.5,
            size_max: 2.5,
            behavior: BehaviorParams {
                max_speed: 5.0,
                perception_radius: 20.0,
                cohesion_weight: 0.6,
                ..base
            },
            swim_frequency: 8.0,
        },
        SpeciesTemplate {
            name: "neontetra".into(),
            size_min: 0.8,
            size_max: 1.2,
            behavior: BehaviorParams {
                max_speed: 8.0,
                perception_radius: 15.0,
                alignment_weight: 1.2,
                cohesion_weight: 1.0,
                ..base
            },
            swim_frequency: 10.0,
        },
        SpeciesTemplate {
            name: "angelfish".into(),
            size_min: 2.0,
            size_max: 3.5,
            behavior: BehaviorParams {
                max_speed: 3.0,
                turn_speed: 2.0,
                cohesion_weight: 0.3,
                alignment_weight: 0.5,
                ..base
            },
            swim_frequency: 3.0,
        },
        SpeciesTemplate {
            name: "goldfish".into(),
            size_min: 2.0,
            size_max: 4.0,
            behavior: BehaviorParams {
                max_speed: 4.0,
                wander_strength: 0.8,
                ..base
            },
            swim_frequency: 4.0,
        },
        SpeciesTemplate {
            name: "guppy".into(),
            size_min: 0.6,
            size_max: 1.0,
            behavior: BehaviorParams {
                max_speed: 6.0,
                perception_radius: 12.0,
                ..base
            },
            swim_frequency: 12.0,
        },
    ]
}

pub struct AgentRegistry {
    species: Vec<SpeciesTemplate>,
    agents: Vec<Agent>,
    engine: FlockingEngine,
    rng: ChaCha8Rng,
    next_id: u64,
}

impl AgentRegistry {
    /// Registry over `bounds` with the built-in species catalog.
    pub fn new(bounds: Bounds, params: SimulationParams) -> Result<Self> {
        let engine = FlockingEngine::new(bounds, params)?;
        let mut registry = Self {
            species: Vec::new(),
            agents: Vec::new(),
            engine,
            // Separate stream from the engine's generator
            rng: ChaCha8Rng::seed_from_u64(params.seed ^ 0xA5A5_A5A5_A5A5_A5A5),
            next_id: 0,
        };
        for template in default_species() {
            registry.add_species(template)?;
        }
        Ok(registry)
    }

    /// Add a species, or replace the one with the same name. Agents already
    /// spawned keep the parameters they were created with.
    pub fn add_species(&mut self, template: SpeciesTemplate) -> Result<SpeciesId> {
        template.validate()?;
        if let Some(id) = self.species_id(&template.name) {
            self.species[id.0 as usize] = template;
            return Ok(id);
        }
        let id = SpeciesId(self.species.len() as u32);
        self.species.push(template);
        Ok(id)
    }

    pub fn species_id(&self, name: &str) -> Option<SpeciesId> {
        self.species
            .iter()
            .position(|t| t.name == name)
            .map(|i| SpeciesId(i as u32))
    }

    pub fn species(&self, id: SpeciesId) -> Option<&SpeciesTemplate> {
        self.species.get(id.0 as usize)
    }

    pub fn species_catalog(&self) -> &[SpeciesTemplate] {
        &self.species
    }

    /// Create `count` agents of a species inside `area`, or inside the
    /// central part of the tank when no area is given.
    pub fn spawn(&mut self, species_name: &str, count: usize, area: Option<Bounds>) -> Result<Vec<AgentId>> {
        let species = self
            .species_id(species_name)
            .ok_or_else(|| SimError::UnknownSpecies(species_name.to_string()))?;
        let template = self.species[species.0 as usize].clone();

        let area = match area {
            Some(area) => {
                area.validate()?;
                area
            }
            None => self.default_spawn_area(),
        };

        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            let agent = self.create_agent(species, &template, &area)?;
            spawned.push(agent.id);
            self.agents.push(agent);
        }

        debug!(species = species_name, count, total = self.agents.len(), "spawned agents");
        Ok(spawned)
    }

    fn create_agent(&mut self, species: SpeciesId, template: &SpeciesTemplate, area: &Bounds) -> Result<Agent> {
        let rng = &mut self.rng;

        let size = if template.size_max > template.size_min {
            rng.gen_range(template.size_min..template.size_max)
        } else {
            template.size_min
        };
        let position = area.random_point(rng);

        // Mostly horizontal heading at half cruising speed
        let heading = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-0.25..0.25),
            rng.gen_range(-1.0..1.0),
        );
        let heading = if heading.length_squared() > 0.0 { heading.normalize() } else { Vec3::X };
        let velocity = heading * template.behavior.max_speed * 0.5;

        let id = AgentId(self.next_id);
        self.next_id += 1;

        let mut agent = Agent::new(id, species, position, size, template.behavior)?
            .with_velocity(velocity)
            .with_orientation(look_rotation(heading));
        agent.swim_phase = self.rng.gen_range(0.0..TAU);
        agent.swim_frequency = template.swim_frequency;
        Ok(agent)
    }

    fn default_spawn_area(&self) -> Bounds {
        self.engine.bounds().scaled(Vec3::new(0.8, 0.6, 0.8))
    }

    /// Remove every agent of a species. Returns how many were removed.
    pub fn remove_species(&mut self, species_name: &str) -> usize {
        let Some(species) = self.species_id(species_name) else {
            return 0;
        };
        let before = self.agents.len();
        self.agents.retain(|a| a.species != species);
        let removed = before - self.agents.len();

        if removed > 0 {
            info!(species = species_name, removed, "removed agents");
        }
        removed
    }

    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let index = self.agents.iter().position(|a| a.id == id)?;
        Some(self.agents.remove(index))
    }

    /// Live agent count per species, in catalog order, skipping empty ones.
    pub fn species_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<SpeciesId, usize> = BTreeMap::new();
        for agent in &self.agents {
            *counts.entry(agent.species).or_default() += 1;
        }
        counts
            .into_iter()
            .filter_map(|(id, count)| self.species(id).map(|t| (t.name.clone(), count)))
            .collect()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn bounds(&self) -> &Bounds {
        self.engine.bounds()
    }

    /// Resize the swimmable volume, e.g. when the tank changes size.
    pub fn set_bounds(&mut self, bounds: Bounds) -> Result<()> {
        self.engine.set_bounds(bounds)
    }

    /// Run one simulation tick, then advance every swim phase. The phase is
    /// an accumulator and never wraps; consumers take it modulo a period.
    pub fn update(&mut self, delta: f32) -> TickStats {
        let stats = self.engine.tick(&mut self.agents, delta);

        if delta.is_finite() && delta > 0.0 {
            for agent in &mut self.agents {
                agent.swim_phase += delta * agent.swim_frequency;
            }
        }
        stats
    }

    /// Deepest overlap left between any two live agents.
    pub fn max_overlap(&mut self) -> f32 {
        self.engine.max_overlap(&self.agents)
    }

    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents.iter().map(Agent::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AgentRegistry {
        let tank = Bounds::centered(100.0, 60.0, 50.0).unwrap();
        AgentRegistry::new(tank.swimmable(5.0).unwrap(), SimulationParams::default()).unwrap()
    }

    #[test]
    fn catalog_has_builtin_species() {
        let registry = registry();
        let names: Vec<_> = registry.species_catalog().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["clownfish", "neontetra", "angelfish", "goldfish", "guppy"]);
        assert_eq!(registry.species_id("guppy"), Some(SpeciesId(4)));
    }

    #[test]
    fn spawn_uses_template_and_area() {
        let mut registry = registry();
        let ids = registry.spawn("neontetra", 15, None).unwrap();
        assert_eq!(ids.len(), 15);

        let area = registry.default_spawn_area();
        for agent in registry.agents() {
            assert!(area.contains(agent.position));
            assert!((0.8..=1.2).contains(&agent.size));
            assert_eq!(agent.behavior.max_speed, 8.0);
            assert!((agent.speed() - 4.0).abs() < 1e-4);
            assert!((0.0..TAU).contains(&agent.swim_phase));
        }
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut registry = registry();
        let first = registry.spawn("guppy", 3, None).unwrap();
        let second = registry.spawn("goldfish", 2, None).unwrap();
        assert_eq!(first, vec![AgentId(0), AgentId(1), AgentId(2)]);
        assert_eq!(second, vec![AgentId(3), AgentId(4)]);
    }

    #[test]
    fn unknown_species_is_an_error() {
        let mut registry = registry();
        let err = registry.spawn("shark", 1, None).unwrap_err();
        assert!(matches!(err, SimError::UnknownSpecies(name) if name == "shark"));
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_species_keeps_others() {
        let mut registry = registry();
        registry.spawn("guppy", 4, None).unwrap();
        registry.spawn("clownfish", 2, None).unwrap();

        assert_eq!(registry.remove_species("guppy"), 4);
        assert_eq!(registry.remove_species("guppy"), 0);
        assert_eq!(registry.remove_species("shark"), 0);
        assert_eq!(registry.species_counts(), vec![("clownfish".to_string(), 2)]);
    }

    #[test]
    fn update_advances_swim_phase() {
        let mut registry = registry();
        registry.spawn("angelfish", 1, None).unwrap();
        let before = registry.agents()[0].swim_phase;

        registry.update(0.01);
        let after = registry.agents()[0].swim_phase;
        assert!((after - (before + 0.01 * 3.0)).abs() < 1e-5);
        assert_eq!(registry.snapshots()[0].swim_phase, after);
    }

    #[test]
    fn swim_phase_never_decreases() {
        let mut registry = registry();
        registry.spawn("guppy", 1, None).unwrap();
        let start = registry.agents()[0].swim_phase;

        let mut previous = start;
        for _ in 0..120 {
            registry.update(1.0 / 60.0);
            let phase = registry.agents()[0].swim_phase;
            assert!(phase > previous, "phase went from {previous} to {phase}");
            previous = phase;
        }
        // Two seconds at 12 Hz runs well past a full turn without wrapping
        assert!((previous - start - 24.0).abs() < 1e-3);

        registry.update(0.0);
        assert_eq!(registry.agents()[0].swim_phase, previous);
    }

    #[test]
    fn replacing_a_species_does_not_touch_live_agents() {
        let mut registry = registry();
        registry.spawn("goldfish", 1, None).unwrap();

        let mut template = registry.species(SpeciesId(3)).unwrap().clone();
        template.behavior.max_speed = 1.0;
        assert_eq!(registry.add_species(template).unwrap(), SpeciesId(3));

        assert_eq!(registry.agents()[0].behavior.max_speed, 4.0);
    }

    #[test]
    fn invalid_template_is_rejected() {
        let mut registry = registry();
        let template = SpeciesTemplate {
            name: "ghost".into(),
            size_min: 2.0,
            size_max: 1.0,
            behavior: BehaviorParams::default(),
            swim_frequency: 1.0,
        };
        assert!(registry.add_species(template).is_err());
    }
}
