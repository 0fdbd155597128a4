//! Falling seasonal particles: petals, leaves and snow

use crate::canvas::Raster;
use crate::palette::{ParticleKind, Rgba, SeasonPalette};
use rand::Rng;
use std::f32::consts::TAU;

/// Pointer influence radius in world units
const REPEL_RADIUS: f32 = 100.0;
const REPEL_STRENGTH: f32 = 5.0;
/// Where a particle re-enters after falling off the bottom
const RESPAWN_Y: f32 = -10.0;

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
}

impl Particle {
    /// Spawn somewhere in the band just above the viewport
    fn spawn<R: Rng + ?Sized>(width: f32, height: f32, rng: &mut R) -> Self {
        Self {
            x: rng.gen::<f32>() * width,
            y: rng.gen::<f32>() * height - height,
            size: rng.gen_range(2.0..5.0),
            speed_x: rng.gen_range(-1.0..1.0),
            speed_y: rng.gen_range(1.0..3.0),
            rotation: rng.gen::<f32>() * TAU,
            rotation_speed: rng.gen_range(-0.05..0.05),
        }
    }

    /// Advance one frame; `pointer` is in world units
    pub fn update<R: Rng + ?Sized>(&mut self, pointer: Option<(f32, f32)>, width: f32, height: f32, rng: &mut R) {
        self.y += self.speed_y;
        self.x += self.speed_x + (self.y * 0.01).sin() * 0.5;
        self.rotation += self.rotation_speed;

        if let Some((px, py)) = pointer {
            let dx = self.x - px;
            let dy = self.y - py;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < REPEL_RADIUS && dist > f32::EPSILON {
                let force = (REPEL_RADIUS - dist) / REPEL_RADIUS;
                self.x += dx / dist * force * REPEL_STRENGTH;
                self.y += dy / dist * force * REPEL_STRENGTH;
            }
        }

        if self.y > height {
            self.y = RESPAWN_Y;
            self.x = rng.gen::<f32>() * width;
        }
    }

    fn draw(&self, raster: &mut Raster, kind: ParticleKind, color: Rgba) {
        match kind {
            ParticleKind::Snow => raster.fill_circle(self.x, self.y, self.size / 2.0, color),
            _ => raster.fill_ellipse(self.x, self.y, self.size, self.size / 2.0, self.rotation, color),
        }
    }
}

/// All particles of the current season
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    kind: ParticleKind,
    color: Rgba,
    particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new<R: Rng + ?Sized>(palette: &SeasonPalette, width: f32, height: f32, rng: &mut R) -> Self {
        let count = particle_count(palette.particle_kind);
        let color = palette.particle_color.unwrap_or(palette.accent);
        let particles = (0..count).map(|_| Particle::spawn(width, height, rng)).collect();
        Self {
            kind: palette.particle_kind,
            color,
            particles,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, pointer: Option<(f32, f32)>, width: f32, height: f32, rng: &mut R) {
        for particle in &mut self.particles {
            particle.update(pointer, width, height, rng);
        }
    }

    pub fn draw(&self, raster: &mut Raster) {
        for particle in &self.particles {
            particle.draw(raster, self.kind, self.color);
        }
    }
}

/// Snow falls thick; petals and leaves are sparse
pub fn particle_count(kind: ParticleKind) -> usize {
    match kind {
        ParticleKind::None => 0,
        ParticleKind::Snow => 100,
        ParticleKind::Petal | ParticleKind::Leaf => 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Season;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn still(x: f32, y: f32) -> Particle {
        Particle {
            x,
            y,
            size: 3.0,
            speed_x: 0.0,
            speed_y: 0.0,
            rotation: 0.0,
            rotation_speed: 0.0,
        }
    }

    #[test]
    fn counts_follow_season() {
        let mut rng = StdRng::seed_from_u64(1);
        let counts: Vec<usize> = Season::ALL
            .iter()
            .map(|s| ParticleSystem::new(&s.palette(), 800.0, 900.0, &mut rng).particles.len())
            .collect();
        assert_eq!(counts, vec![30, 0, 30, 100]);
    }

    #[test]
    fn particles_start_above_the_viewport() {
        let mut rng = StdRng::seed_from_u64(2);
        let system = ParticleSystem::new(&Season::Winter.palette(), 800.0, 900.0, &mut rng);
        for p in &system.particles {
            assert!(p.y < 0.0 && p.y >= -900.0);
            assert!(p.x >= 0.0 && p.x <= 800.0);
            assert!((2.0..5.0).contains(&p.size));
            assert!((1.0..3.0).contains(&p.speed_y));
        }
    }

    #[test]
    fn pointer_pushes_particles_away() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut p = still(100.0, 100.0);
        p.update(Some((90.0, 100.0)), 800.0, 900.0, &mut rng);
        // drift first, then a push proportional to how close the pointer is
        let drifted = 100.0 + (1.0_f32).sin() * 0.5;
        let expected = drifted + (100.0 - (drifted - 90.0)) / 100.0 * 5.0;
        assert!((p.x - expected).abs() < 1e-3);
    }

    #[test]
    fn distant_pointer_is_ignored() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut near = still(100.0, 100.0);
        let mut far = near.clone();
        near.update(None, 800.0, 900.0, &mut rng);
        far.update(Some((500.0, 500.0)), 800.0, 900.0, &mut rng);
        assert_eq!(near.x, far.x);
        assert_eq!(near.y, far.y);
    }

    #[test]
    fn particles_respawn_at_the_top() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut p = still(10.0, 899.0);
        p.speed_y = 2.0;
        p.update(None, 800.0, 900.0, &mut rng);
        assert_eq!(p.y, RESPAWN_Y);
        assert!(p.x >= 0.0 && p.x <= 800.0);
    }

    #[test]
    fn drawing_marks_the_raster() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut raster = Raster::new(80, 45);
        let mut system = ParticleSystem::new(&Season::Winter.palette(), 800.0, 900.0, &mut rng);
        for p in &mut system.particles {
            p.y = 450.0;
        }
        system.draw(&mut raster);
        let (w, h) = raster.dot_size();
        assert!((0..h).any(|y| (0..w).any(|x| raster.dot(x, y).is_some())));
    }
}
