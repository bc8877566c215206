/*
 * Configuration Module
 *
 * Scenario settings for the headless runner, loadable from TOML. Every field
 * has a default matching the stock aquarium, so a config file only needs to
 * name what it changes.
 */

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::check_positive;
use crate::bounds::Bounds;
use crate::error::Result;
use crate::params::SimulationParams;
use crate::registry::SpeciesTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    // Gap kept between the glass and the swimmable volume
    pub swim_margin: f32,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 60.0,
            depth: 50.0,
            swim_margin: 5.0,
        }
    }
}

impl TankConfig {
    pub fn bounds(&self) -> Result<Bounds> {
        Bounds::centered(self.width, self.height, self.depth)
    }

    pub fn swimmable_area(&self) -> Result<Bounds> {
        self.bounds()?.swimmable(self.swim_margin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub species: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AquariumConfig {
    pub tank: TankConfig,
    pub simulation: SimulationParams,
    pub ticks: u64,
    pub timestep: f32,
    pub species: Vec<SpeciesTemplate>,
    pub spawn: Vec<SpawnConfig>,
}

impl Default for AquariumConfig {
    fn default() -> Self {
        Self {
            tank: TankConfig::default(),
            simulation: SimulationParams::default(),
            ticks: 3600,
            timestep: 1.0 / 60.0,
            species: Vec::new(),
            spawn: vec![
                SpawnConfig { species: "neontetra".into(), count: 15 },
                SpawnConfig { species: "clownfish".into(), count: 3 },
                SpawnConfig { species: "angelfish".into(), count: 2 },
                SpawnConfig { species: "guppy".into(), count: 8 },
                SpawnConfig { species: "goldfish".into(), count: 3 },
            ],
        }
    }
}

impl AquariumConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tank.swimmable_area()?;
        self.simulation.validate()?;
        check_positive("timestep", self.timestep)?;
        for template in &self.species {
            template.validate()?;
        }
        Ok(())
    }
}
