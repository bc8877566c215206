/*
 * Bounds Module
 *
 * Axis-aligned box describing the swimmable region of the tank.
 */

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Build a box from two corners, rejecting inverted or non-finite boxes.
    pub fn new(min: Vec3, max: Vec3) -> Result<Self> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Box of the given dimensions centered on the origin, like a tank.
    pub fn centered(width: f32, height: f32, depth: f32) -> Result<Self> {
        let half = Vec3::new(width, height, depth) / 2.0;
        Self::new(-half, half)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min.cmpgt(self.max).any() {
            return Err(SimError::InvalidBounds {
                min: self.min.to_array(),
                max: self.max.to_array(),
            });
        }
        Ok(())
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Grow (or shrink, for negative amounts) every face by `amount`.
    pub fn expanded(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    /// Interior region kept clear of the walls by `margin` on every side.
    pub fn swimmable(&self, margin: f32) -> Result<Self> {
        Self::new(self.min + Vec3::splat(margin), self.max - Vec3::splat(margin))
    }

    /// Central sub-box scaled per axis around the center.
    pub fn scaled(&self, factors: Vec3) -> Self {
        let center = self.center();
        let half = self.size() * factors * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let t = Vec3::new(rng.gen(), rng.gen(), rng.gen());
        self.min + self.size() * t
    }
}
