/*
 * Math Helpers
 *
 * Random sampling and orientation helpers shared by the force pass,
 * the collision pass and the registry. Every function takes its generator
 * explicitly so results are reproducible from a seed.
 */

use std::f32::consts::TAU;

use glam::{Mat3, Quat, Vec3};
use rand::Rng;

/// Local axis an agent swims along. `look_rotation` maps it onto the heading.
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// World up used when building orientations.
pub const UP: Vec3 = Vec3::Y;

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();

    Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

/// Uniformly distributed point inside a ball of the given radius.
pub fn random_in_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    if radius <= 0.0 {
        return Vec3::ZERO;
    }
    let r = rng.gen::<f32>().cbrt() * radius;
    random_unit_vector(rng) * r
}

/// Rotation that turns `FORWARD` onto `direction`, keeping `UP` as close to +Y
/// as possible. `direction` does not need to be normalized.
pub fn look_rotation(direction: Vec3) -> Quat {
    // The basis z axis points away from the heading
    let mut z = -direction;
    if z.length_squared() == 0.0 {
        z = Vec3::Z;
    }
    z = z.normalize();

    let mut x = UP.cross(z);
    if x.length_squared() == 0.0 {
        // Heading parallel to up: nudge z off the pole
        if UP.z.abs() == 1.0 {
            z.x += 0.0001;
        } else {
            z.z += 0.0001;
        }
        z = z.normalize();
        x = UP.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);

    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn unit_vectors_have_unit_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_samples_stay_inside_radius() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..1000 {
            let v = random_in_sphere(&mut rng, 2.5);
            assert!(v.length() <= 2.5 + 1e-4);
        }
        assert_eq!(random_in_sphere(&mut rng, 0.0), Vec3::ZERO);
    }

    #[test]
    fn look_rotation_points_forward_along_direction() {
        let directions = [
            Vec3::X,
            Vec3::NEG_X,
            Vec3::Z,
            Vec3::NEG_Z,
            Vec3::new(1.0, 0.5, -2.0),
            Vec3::new(-0.3, -0.8, 0.1),
        ];
        for dir in directions {
            let q = look_rotation(dir);
            let forward = q * FORWARD;
            assert!(
                forward.distance(dir.normalize()) < 1e-4,
                "dir {dir:?} mapped to {forward:?}"
            );
            assert!((q.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn look_rotation_handles_vertical_heading() {
        let q = look_rotation(Vec3::Y);
        assert!(q.is_finite());
        assert!((q * FORWARD).dot(Vec3::Y) > 0.999);

        let q = look_rotation(Vec3::NEG_Y);
        assert!(q.is_finite());
        assert!((q * FORWARD).dot(Vec3::NEG_Y) > 0.999);
    }
}
