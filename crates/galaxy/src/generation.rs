//! Seeded initial-condition generation for a disc galaxy population.
//!
//! Builds the fixed star/planet/dust population the solver steps: a stellar
//! bulge plus an exponential disc, with star colors derived from blackbody
//! temperature, and near-circular tangential velocities from the enclosed
//! mass. Generation is fully deterministic for a given seed.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3, Vector4};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use serde::{Deserialize, Serialize};

use crate::forces::G;
use crate::particle::{Particle, ParticleKind};
use crate::sampling::{sample_exponential_disc_radius, sample_gaussian, sample_power_law};

/// Population counts and disc geometry for [`generate`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GalaxyProfile {
    /// Number of stars.
    pub stars: usize,
    /// Number of planets.
    pub planets: usize,
    /// Number of dust motes.
    pub dust: usize,
    /// Outer radius of the disc.
    pub disc_radius: f64,
    /// Gaussian thickness of the disc (standard deviation of z).
    pub disc_thickness: f64,
    /// Radius of the central bulge.
    pub bulge_radius: f64,
    /// Fraction of the stars placed in the bulge rather than the disc.
    pub bulge_fraction: f64,
}

impl Default for GalaxyProfile {
    fn default() -> Self {
        Self {
            stars: 1_024,
            planets: 512,
            dust: 2_048,
            disc_radius: 40.0,
            disc_thickness: 1.5,
            bulge_radius: 6.0,
            bulge_fraction: 0.25,
        }
    }
}

impl GalaxyProfile {
    /// Total number of particles the profile generates.
    pub fn population(&self) -> usize {
        self.stars + self.planets + self.dust
    }
}

/// Generates the full population for a profile.
///
/// Positions and masses are drawn first; every particle then receives a
/// near-circular tangential velocity from the mass enclosed inside its
/// orbital radius, so the disc starts close to rotational equilibrium.
///
/// # Examples
///
/// ```
/// use galaxy::generation::{generate, GalaxyProfile};
///
/// let profile = GalaxyProfile {
///     stars: 32,
///     planets: 8,
///     dust: 16,
///     ..GalaxyProfile::default()
/// };
///
/// let particles = generate(&profile, 42);
/// assert_eq!(particles.len(), 56);
///
/// // Same seed, same population.
/// let again = generate(&profile, 42);
/// assert_eq!(particles[17].position, again[17].position);
/// ```
pub fn generate(profile: &GalaxyProfile, seed: u64) -> Vec<Particle> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    let mut particles = Vec::with_capacity(profile.population());

    for _ in 0..profile.stars {
        particles.push(spawn_star(profile, &mut rng));
    }
    for _ in 0..profile.planets {
        particles.push(spawn_planet(profile, &mut rng));
    }
    for _ in 0..profile.dust {
        particles.push(spawn_dust(profile, &mut rng));
    }

    assign_circular_velocities(&mut particles, profile, &mut rng);
    particles
}

fn spawn_star(profile: &GalaxyProfile, rng: &mut ChaChaRng) -> Particle {
    let in_bulge = rng.random::<f64>() < profile.bulge_fraction;
    let position = if in_bulge {
        bulge_position(profile, rng)
    } else {
        disc_position(profile, rng)
    };

    // Salpeter-like mass function; hotter (bluer) stars are heavier.
    let mass = sample_power_law(rng, 0.1, 8.0, -2.3);
    let temperature = 5_800.0 * mass.powf(0.55);
    let radius = 0.05 * mass.powf(0.8);

    Particle::new(
        ParticleKind::Star,
        mass,
        radius,
        position,
        Vector3::zeros(),
        blackbody_color(temperature),
    )
}

fn spawn_planet(profile: &GalaxyProfile, rng: &mut ChaChaRng) -> Particle {
    let position = disc_position(profile, rng);
    let mass = sample_power_law(rng, 1e-6, 1e-3, -2.0);
    let tint = rng.random_range(0.2..0.7);
    Particle::new(
        ParticleKind::Planet,
        mass,
        0.01,
        position,
        Vector3::zeros(),
        Vector4::new(tint, tint * rng.random_range(0.7..1.0), rng.random_range(0.3..0.8), 1.0),
    )
}

fn spawn_dust(profile: &GalaxyProfile, rng: &mut ChaChaRng) -> Particle {
    let position = disc_position(profile, rng);
    let mass = rng.random_range(1e-9..1e-7);
    let shade = rng.random_range(0.3..0.6);
    Particle::new(
        ParticleKind::Dust,
        mass,
        0.002,
        position,
        Vector3::zeros(),
        Vector4::new(shade, shade, shade, 0.35),
    )
}

fn bulge_position(profile: &GalaxyProfile, rng: &mut ChaChaRng) -> Point3<f64> {
    let sigma = profile.bulge_radius / 2.0;
    Point3::new(
        sample_gaussian(rng, 0.0, sigma),
        sample_gaussian(rng, 0.0, sigma),
        sample_gaussian(rng, 0.0, sigma),
    )
}

fn disc_position(profile: &GalaxyProfile, rng: &mut ChaChaRng) -> Point3<f64> {
    let radius = sample_exponential_disc_radius(rng, profile.disc_radius / 4.0, profile.disc_radius);
    let angle = rng.random_range(0.0..2.0 * PI);
    Point3::new(
        radius * angle.cos(),
        radius * angle.sin(),
        sample_gaussian(rng, 0.0, profile.disc_thickness),
    )
}

/// Gives every particle a near-circular velocity tangential to the disc
/// plane, from v² = G · M(r) / r with M(r) estimated as the mass fraction
/// inside radius r.
fn assign_circular_velocities(
    particles: &mut [Particle],
    profile: &GalaxyProfile,
    rng: &mut ChaChaRng,
) {
    let total_mass: f64 = particles.iter().map(|p| p.mass).sum();
    for particle in particles.iter_mut() {
        let radial = Vector3::new(particle.position.x, particle.position.y, 0.0);
        let r = radial.norm();
        if r < 1e-9 {
            continue;
        }
        let enclosed = total_mass * (r / profile.disc_radius).clamp(0.0, 1.0);
        let speed = (G * enclosed / r).sqrt() * rng.random_range(0.95..1.05);
        let tangent = Vector3::new(-radial.y, radial.x, 0.0) / r;
        particle.velocity = tangent * speed;
    }
}

/// Blackbody temperature to normalized RGBA, approximating the Planckian
/// locus (Tanner Helland's curve-fit coefficients), blended toward white for
/// a realistic whitish stellar appearance.
pub fn blackbody_color(temperature: f64) -> Vector4<f64> {
    const MIN_TEMP: f64 = 1_000.0;
    const MAX_TEMP: f64 = 40_000.0;
    const DESATURATION_BLEND: f64 = 0.3;

    let temp = temperature.clamp(MIN_TEMP, MAX_TEMP) / 100.0;

    let red = if temp <= 66.0 {
        255.0
    } else {
        329.698_727_446 * (temp - 60.0).powf(-0.133_204_759_2)
    };

    let green = if temp <= 66.0 {
        99.470_802_586_1 * temp.ln() - 161.119_568_166_1
    } else {
        288.122_169_528_3 * (temp - 60.0).powf(-0.075_514_849_2)
    };

    let blue = if temp >= 66.0 {
        255.0
    } else if temp <= 19.0 {
        0.0
    } else {
        138.517_731_223_1 * (temp - 10.0).ln() - 305.044_792_730_7
    };

    let normalize = |channel: f64| -> f64 {
        let c = channel.clamp(0.0, 255.0) / 255.0;
        c * (1.0 - DESATURATION_BLEND) + DESATURATION_BLEND
    };

    Vector4::new(normalize(red), normalize(green), normalize(blue), 1.0)
}
