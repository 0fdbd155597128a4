//! The occasional bird (or UFO) crossing the sky

use crate::canvas::Raster;
use crate::palette::{Rgba, TRUNK};
use rand::Rng;

/// How far outside the viewport a flyer starts and ends
const OFFSCREEN_MARGIN: f32 = 50.0;

const HULL: Rgba = Rgba::rgb(0xa9, 0xa9, 0xa9);
const DOME: Rgba = Rgba::rgb(0x00, 0xff, 0xff);
const LIGHTS: Rgba = Rgba::rgb(0xff, 0xff, 0x00);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlyerKind {
    Bird,
    Ufo,
}

#[derive(Debug, Clone)]
pub struct FlyingObject {
    pub kind: FlyerKind,
    pub x: f32,
    pub y: f32,
    /// +1 flies right, -1 flies left
    pub direction: f32,
    pub speed: f32,
    pub active: bool,
    /// Frames left before the next crossing
    pub cooldown: f32,
}

impl FlyingObject {
    pub fn new<R: Rng + ?Sized>(width: f32, height: f32, rng: &mut R) -> Self {
        let mut flyer = Self {
            kind: FlyerKind::Bird,
            x: 0.0,
            y: 0.0,
            direction: 1.0,
            speed: 0.0,
            active: false,
            cooldown: 0.0,
        };
        flyer.reset(width, height, rng);
        flyer
    }

    /// Park offscreen with a fresh cooldown and course
    pub fn reset<R: Rng + ?Sized>(&mut self, width: f32, height: f32, rng: &mut R) {
        self.kind = if rng.gen_bool(0.5) { FlyerKind::Bird } else { FlyerKind::Ufo };
        self.y = rng.gen_range(50.0..(height * 0.4).max(50.1));
        self.direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.x = if self.direction > 0.0 {
            -OFFSCREEN_MARGIN
        } else {
            width + OFFSCREEN_MARGIN
        };
        self.speed = rng.gen_range(0.5..1.5);
        self.active = false;
        self.cooldown = rng.gen_range(200.0..500.0);
    }

    pub fn update<R: Rng + ?Sized>(&mut self, width: f32, height: f32, rng: &mut R) {
        if !self.active {
            self.cooldown -= 1.0;
            if self.cooldown <= 0.0 {
                self.active = true;
                // UFOs are the rare sighting
                self.kind = if rng.gen::<f32>() > 0.8 { FlyerKind::Ufo } else { FlyerKind::Bird };
            }
            return;
        }

        self.x += self.speed * self.direction;
        let gone = if self.direction > 0.0 {
            self.x > width + OFFSCREEN_MARGIN
        } else {
            self.x < -OFFSCREEN_MARGIN
        };
        if gone {
            self.reset(width, height, rng);
        }
    }

    pub fn draw(&self, raster: &mut Raster) {
        if !self.active {
            return;
        }
        let (x, y, dir) = (self.x, self.y, self.direction);
        match self.kind {
            FlyerKind::Bird => {
                raster.stroke_quad((x - 10.0 * dir, y - 5.0), (x, y + 5.0), (x + 10.0 * dir, y - 5.0), 2.0, TRUNK);
            }
            FlyerKind::Ufo => {
                raster.fill_ellipse(x, y, 20.0, 8.0, 0.0, HULL);
                fill_upper_half(raster, x, y - 5.0, 8.0, DOME);
                for i in [-10.0, 0.0, 10.0] {
                    raster.fill_circle(x + i * dir, y + 2.0, 2.0, LIGHTS);
                }
            }
        }
    }
}

fn fill_upper_half(raster: &mut Raster, cx: f32, cy: f32, radius: f32, color: Rgba) {
    let (pcx, pcy) = raster.to_dots(cx, cy);
    let r = (radius * raster.scale()).max(0.5);
    for dy in (pcy - r).floor() as i32..pcy.ceil() as i32 {
        for dx in (pcx - r).floor() as i32..=(pcx + r).ceil() as i32 {
            let ox = dx as f32 + 0.5 - pcx;
            let oy = dy as f32 + 0.5 - pcy;
            if oy <= 0.0 && ox * ox + oy * oy <= r * r {
                raster.put_dot(dx, dy, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn reset_parks_offscreen() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let flyer = FlyingObject::new(800.0, 900.0, &mut rng);
            assert!(!flyer.active);
            assert!(flyer.x == -50.0 || flyer.x == 850.0);
            assert!((50.0..360.0).contains(&flyer.y));
            assert!((200.0..500.0).contains(&flyer.cooldown));
        }
    }

    #[test]
    fn activates_after_cooldown_and_crosses() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut flyer = FlyingObject::new(800.0, 900.0, &mut rng);
        let mut frames = 0;
        while !flyer.active {
            flyer.update(800.0, 900.0, &mut rng);
            frames += 1;
            assert!(frames <= 500);
        }
        let start = flyer.x;
        flyer.update(800.0, 900.0, &mut rng);
        assert!((flyer.x - start).abs() > 0.0);
        assert_eq!((flyer.x - start).signum(), flyer.direction);
    }

    #[test]
    fn resets_after_leaving() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut flyer = FlyingObject::new(800.0, 900.0, &mut rng);
        flyer.active = true;
        flyer.direction = 1.0;
        flyer.x = 850.0;
        flyer.update(800.0, 900.0, &mut rng);
        assert!(!flyer.active);
    }

    #[test]
    fn inactive_flyer_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(4);
        let flyer = FlyingObject::new(800.0, 900.0, &mut rng);
        let mut raster = Raster::new(80, 45);
        flyer.draw(&mut raster);
        let (w, h) = raster.dot_size();
        assert!((0..h).all(|y| (0..w).all(|x| raster.dot(x, y).is_none())));
    }

    #[test]
    fn ufo_has_a_cyan_dome() {
        let mut raster = Raster::new(80, 45);
        let flyer = FlyingObject {
            kind: FlyerKind::Ufo,
            x: 400.0,
            y: 200.0,
            direction: 1.0,
            speed: 1.0,
            active: true,
            cooldown: 0.0,
        };
        flyer.draw(&mut raster);
        let (dx, dy) = raster.to_dots(400.0, 193.0);
        assert_eq!(raster.dot(dx as usize, dy as usize), Some(DOME));
    }
}
