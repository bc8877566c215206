/*
 * Forces Module
 *
 * The individual steering forces that make up an agent's acceleration:
 * 1. Separation: push away from any nearby body, of any species
 * 2. Alignment: match the average velocity of same-species neighbors
 * 3. Cohesion: head for the center of same-species neighbors
 * 4. Boundary avoidance: turn back from the tank walls
 * 5. Wander: a small random nudge, fresh every tick
 *
 * All functions read only the slice they are given, so the force pass can
 * hand them a frozen snapshot of the population.
 */

use glam::Vec3;
use rand::Rng;

use crate::agent::{Agent, BehaviorParams};
use crate::bounds::Bounds;
use crate::math::{random_in_sphere, random_unit_vector};

/// Weight multiplier applied on top of an agent's separation weight.
pub const SEPARATION_EMPHASIS: f32 = 3.0;
/// Weight multiplier applied to the boundary push.
pub const BOUNDARY_EMPHASIS: f32 = 2.0;
/// Centers closer than this are treated as coincident.
pub const DEGENERATE_DISTANCE: f32 = 0.001;

const DEGENERATE_PUSH: f32 = 10.0;
const CONTACT_STRENGTH: f32 = 20.0;
// The soft shell reaches out to this multiple of the contact distance
const SHELL_EXTENT: f32 = 2.5;
const SHELL_STRENGTH: f32 = 2.0;

/// Unweighted steering forces for one agent in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Forces {
    pub separation: Vec3,
    pub alignment: Vec3,
    pub cohesion: Vec3,
    pub boundary: Vec3,
    pub wander: Vec3,
}

impl Forces {
    /// Weighted sum of the forces using the agent's behavior parameters.
    pub fn acceleration(&self, behavior: &BehaviorParams) -> Vec3 {
        self.separation * (behavior.separation_weight * SEPARATION_EMPHASIS)
            + self.alignment * behavior.alignment_weight
            + self.cohesion * behavior.cohesion_weight
            + self.boundary * BOUNDARY_EMPHASIS
            + self.wander
    }
}

/// Repulsion from every body in `nearby`. Inside the contact distance the push
/// grows with the square of the overlap; just outside it a gentler shell
/// starts steering away early.
pub fn separation<R: Rng + ?Sized>(agent: &Agent, agents: &[Agent], nearby: &[usize], rng: &mut R) -> Vec3 {
    let radius = agent.collision_radius();
    let mut force = Vec3::ZERO;

    for other in nearby.iter().filter_map(|&i| agents.get(i)) {
        let diff = agent.position - other.position;
        let distance = diff.length();

        if distance < DEGENERATE_DISTANCE {
            // Same spot: no direction to push along, pick one at random
            force += random_unit_vector(rng) * DEGENERATE_PUSH;
            continue;
        }

        let min_distance = radius + other.collision_radius();
        let away = diff / distance;

        if distance < min_distance {
            let overlap = 1.0 - distance / min_distance;
            force += away * (overlap * overlap * CONTACT_STRENGTH);
        } else if distance < min_distance * SHELL_EXTENT {
            let proximity = 1.0 - (distance - min_distance) / (min_distance * (SHELL_EXTENT - 1.0));
            force += away * (proximity * SHELL_STRENGTH);
        }
    }

    force
}

/// Average neighbor velocity minus the agent's own.
pub fn alignment(agent: &Agent, agents: &[Agent], neighbors: &[usize]) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0usize;

    for other in neighbors.iter().filter_map(|&i| agents.get(i)) {
        sum += other.velocity;
        count += 1;
    }

    if count == 0 {
        return Vec3::ZERO;
    }
    sum / count as f32 - agent.velocity
}

/// Unit vector toward the neighbor centroid.
pub fn cohesion(agent: &Agent, agents: &[Agent], neighbors: &[usize]) -> Vec3 {
    let mut center = Vec3::ZERO;
    let mut count = 0usize;

    for other in neighbors.iter().filter_map(|&i| agents.get(i)) {
        center += other.position;
        count += 1;
    }

    if count == 0 {
        return Vec3::ZERO;
    }
    (center / count as f32 - agent.position).normalize_or_zero()
}

/// Per-axis push back toward the interior: 0 at `margin` from a face,
/// 1 at the face itself, and larger still past it.
pub fn boundary_avoidance(position: Vec3, bounds: &Bounds, margin: f32) -> Vec3 {
    if margin <= 0.0 {
        return Vec3::ZERO;
    }

    let mut force = Vec3::ZERO;
    for axis in 0..3 {
        let pos = position[axis];
        let min = bounds.min[axis];
        let max = bounds.max[axis];

        if pos < min + margin {
            force[axis] = (margin - (pos - min)) / margin;
        } else if pos > max - margin {
            force[axis] = -(margin - (max - pos)) / margin;
        }
    }
    force
}

pub fn wander<R: Rng + ?Sized>(rng: &mut R, strength: f32) -> Vec3 {
    random_in_sphere(rng, strength)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentId, SpeciesId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn agent_at(id: u64, position: Vec3, size: f32) -> Agent {
        Agent::new(AgentId(id), SpeciesId(0), position, size, BehaviorParams::default()).unwrap()
    }

    #[test]
    fn separation_inside_contact_uses_squared_overlap() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // Radii 1.5 each, contact distance 3, centers 1.5 apart: overlap 0.5
        let agents = vec![agent_at(0, Vec3::ZERO, 1.0), agent_at(1, Vec3::new(1.5, 0.0, 0.0), 1.0)];
        let force = separation(&agents[0], &agents, &[1], &mut rng);
        assert!((force - Vec3::new(-5.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn separation_shell_is_gentle_and_fades() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // Contact 3, shell ends at 7.5; at 4.5 proximity is 1 - 1.5/4.5
        let agents = vec![agent_at(0, Vec3::ZERO, 1.0), agent_at(1, Vec3::new(0.0, 4.5, 0.0), 1.0)];
        let force = separation(&agents[0], &agents, &[1], &mut rng);
        let expected = (1.0 - 1.5 / 4.5) * 2.0;
        assert!((force.y + expected).abs() < 1e-5);
        assert_eq!(force.x, 0.0);

        let agents = vec![agent_at(0, Vec3::ZERO, 1.0), agent_at(1, Vec3::new(0.0, 7.6, 0.0), 1.0)];
        assert_eq!(separation(&agents[0], &agents, &[1], &mut rng), Vec3::ZERO);
    }

    #[test]
    fn separation_breaks_coincident_ties() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let agents = vec![agent_at(0, Vec3::ONE, 1.0), agent_at(1, Vec3::ONE, 1.0)];
        let force = separation(&agents[0], &agents, &[1], &mut rng);
        assert!(force.is_finite());
        assert!((force.length() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn alignment_is_average_minus_own() {
        let mut agents = vec![
            agent_at(0, Vec3::ZERO, 1.0),
            agent_at(1, Vec3::X, 1.0),
            agent_at(2, Vec3::Y, 1.0),
        ];
        agents[0].velocity = Vec3::new(1.0, 0.0, 0.0);
        agents[1].velocity = Vec3::new(2.0, 0.0, 0.0);
        agents[2].velocity = Vec3::new(0.0, 2.0, 0.0);

        let force = alignment(&agents[0], &agents, &[1, 2]);
        assert!((force - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-6);
        assert_eq!(alignment(&agents[0], &agents, &[]), Vec3::ZERO);
    }

    #[test]
    fn cohesion_is_unit_toward_centroid() {
        let agents = vec![
            agent_at(0, Vec3::ZERO, 1.0),
            agent_at(1, Vec3::new(4.0, 2.0, 0.0), 1.0),
            agent_at(2, Vec3::new(4.0, -2.0, 0.0), 1.0),
        ];
        let force = cohesion(&agents[0], &agents, &[1, 2]);
        assert!((force - Vec3::X).length() < 1e-6);
        assert_eq!(cohesion(&agents[0], &agents, &[]), Vec3::ZERO);
    }

    #[test]
    fn cohesion_at_centroid_is_zero_not_nan() {
        let agents = vec![
            agent_at(0, Vec3::ZERO, 1.0),
            agent_at(1, Vec3::X, 1.0),
            agent_at(2, Vec3::NEG_X, 1.0),
        ];
        assert_eq!(cohesion(&agents[0], &agents, &[1, 2]), Vec3::ZERO);
    }

    #[test]
    fn boundary_push_scales_linearly() {
        let bounds = Bounds::centered(100.0, 60.0, 50.0).unwrap();

        assert_eq!(boundary_avoidance(Vec3::ZERO, &bounds, 10.0), Vec3::ZERO);

        let at_face = boundary_avoidance(Vec3::new(50.0, -30.0, 0.0), &bounds, 10.0);
        assert_eq!(at_face, Vec3::new(-1.0, 1.0, 0.0));

        let halfway = boundary_avoidance(Vec3::new(0.0, 0.0, -20.0), &bounds, 10.0);
        assert!((halfway.z - 0.5).abs() < 1e-6);

        assert_eq!(boundary_avoidance(Vec3::new(50.0, 0.0, 0.0), &bounds, 0.0), Vec3::ZERO);
    }

    #[test]
    fn acceleration_applies_fixed_emphasis() {
        let forces = Forces {
            separation: Vec3::X,
            alignment: Vec3::Y,
            cohesion: Vec3::Z,
            boundary: Vec3::NEG_X,
            wander: Vec3::ZERO,
        };
        let behavior = BehaviorParams {
            separation_weight: 1.0,
            alignment_weight: 0.5,
            cohesion_weight: 0.25,
            ..BehaviorParams::default()
        };
        let accel = forces.acceleration(&behavior);
        assert!((accel - Vec3::new(1.0, 0.5, 0.25)).length() < 1e-6);
    }
}
