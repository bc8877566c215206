/*
 * Error Module
 *
 * Configuration errors for the simulation core. Degenerate geometry never
 * shows up here; it is resolved locally inside the force and collision passes.
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),

    #[error("invalid bounds: min {min:?} must not exceed max {max:?}")]
    InvalidBounds { min: [f32; 3], max: [f32; 3] },

    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f32 },

    #[error("unknown species: {0}")]
    UnknownSpecies(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
