//! Full-pipeline galaxy demo
//!
//! Generates a seeded disc galaxy, then steps it through the complete
//! build → aggregate → evaluate/illuminate → integrate pipeline while
//! tracking conservation diagnostics and lighting coverage.
//!
//! Run with: cargo run --package galaxy --example spiral_galaxy

use nalgebra::{Point3, Vector3};
use octree::SceneCube;

use galaxy::generation::{generate, GalaxyProfile};
use galaxy::particle::ParticleKind;
use galaxy::simulation::{Simulation, SimulationConfig};

fn main() {
    println!("Disc Galaxy: Shared-Tree Gravity + Lighting\n");
    println!("{}", "=".repeat(60));

    let profile = GalaxyProfile {
        stars: 2_000,
        planets: 500,
        dust: 4_000,
        ..GalaxyProfile::default()
    };
    let particles = generate(&profile, 42);

    println!("Population: {} particles", particles.len());
    println!("  stars:   {}", profile.stars);
    println!("  planets: {}", profile.planets);
    println!("  dust:    {}", profile.dust);

    let scene = SceneCube::centered(Point3::origin(), profile.disc_radius * 4.0);
    let config = SimulationConfig::for_scene(scene, particles.len());
    println!("\nConfiguration:");
    println!("  opening angle θ: {}", config.opening_angle);
    println!("  softening:       {:.2e}", config.softening);
    println!("  attenuation:     {}", config.attenuation_distance);
    println!("  scene edge:      {}", scene.edge());

    let mut simulation = Simulation::new(config, particles);

    let initial_momentum = simulation.state().total_momentum();
    let initial_ke = simulation.state().kinetic_energy();

    let dt = 0.01;
    let n_steps = 100;
    println!("\nStepping {} × dt = {} ...", n_steps, dt);

    for step in 0..n_steps {
        if let Err(error) = simulation.step(dt) {
            eprintln!("step {step} failed: {error}");
            return;
        }

        if (step + 1) % 20 == 0 {
            let state = simulation.state();
            let momentum_drift = (state.total_momentum() - initial_momentum).norm();
            let lit: usize = simulation
                .state()
                .particles
                .iter()
                .zip(simulation.lighting())
                .filter(|(particle, packet)| {
                    particle.kind != ParticleKind::Star && packet.lit_count() > 0
                })
                .count();
            println!(
                "t={:.2}: KE={:.3e}, |Δp|={:.2e}, lit non-stars: {}",
                state.time,
                state.kinetic_energy(),
                momentum_drift,
                lit
            );
        }
    }

    println!("\n{}", "=".repeat(60));
    let state = simulation.state();
    println!("Final diagnostics:");
    println!("  time:            {:.2}", state.time);
    println!("  kinetic energy:  {:.3e} (initial {:.3e})", state.kinetic_energy(), initial_ke);
    println!(
        "  momentum drift:  {:.2e}",
        (state.total_momentum() - initial_momentum).norm()
    );
    println!("  diverged:        {}", state.has_diverged());

    // A sample lighting probe at the disc edge.
    let probe = Vector3::new(profile.disc_radius, 0.0, 0.0);
    let lit_example = simulation
        .lighting()
        .iter()
        .enumerate()
        .find(|(index, packet)| {
            state.particles[*index].kind == ParticleKind::Planet && packet.lit_count() > 0
        });
    match lit_example {
        Some((index, packet)) => {
            let strongest = &packet.slots[0];
            println!(
                "\nPlanet {} is lit by {} emitter(s); strongest at ({:.1}, {:.1}, {:.1})",
                index,
                packet.lit_count(),
                strongest.position.x,
                strongest.position.y,
                strongest.position.z
            );
        }
        None => println!("\nNo planet found inside any star's attenuation radius (probe at {probe:?})"),
    }

    println!("\nDemo complete!");
}
