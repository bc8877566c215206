/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct holding the engine-wide
 * tuning values. Per-agent behavior lives on each agent (see agent.rs);
 * these settings apply to the whole tank.
 */

use serde::{Deserialize, Serialize};

use crate::agent::{check_non_negative, BehaviorParams};
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    // Distance from a wall at which the boundary push starts
    pub boundary_margin: f32,
    // Grid cell edge; falls back to the default perception radius
    pub cell_size: Option<f32>,
    pub seed: u64,
    // Run the force pass on the rayon pool
    pub parallel: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            boundary_margin: 10.0,
            cell_size: None,
            seed: 0x5EED_F154,
            parallel: true,
        }
    }
}

impl SimulationParams {
    pub fn effective_cell_size(&self) -> f32 {
        self.cell_size
            .unwrap_or_else(|| BehaviorParams::default().perception_radius)
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative("boundary_margin", self.boundary_margin)?;
        let cell_size = self.effective_cell_size();
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SimError::InvalidCellSize(cell_size));
        }
        Ok(())
    }
}
