//! Static decoration: ink-wash mountains, clouds and the hanko seal

use crate::canvas::Raster;
use crate::palette::{Rgba, VERMILION};
use rand::prelude::*;

const CLOUD_COUNT: usize = 4;
const CLOUD_GREY: (u8, u8, u8) = (200, 200, 200);
const HANKO_SIZE: f32 = 60.0;
const HANKO_MARGIN: f32 = 100.0;
const HANKO_TILT: f32 = -0.1;
const HANKO_WEAR_SPOTS: usize = 50;

/// Paint mountains and clouds into an empty background layer
pub fn paint_background<R: Rng + ?Sized>(raster: &mut Raster, rng: &mut R) {
    if raster.is_empty() {
        return;
    }
    let height = raster.world_height();
    paint_mountain(raster, height * 0.75, Rgba::rgba(40, 40, 40, 0.08), 120.0, rng);
    paint_mountain(raster, height * 0.85, Rgba::rgba(30, 30, 30, 0.12), 80.0, rng);

    for _ in 0..CLOUD_COUNT {
        let x = rng.gen_range(0.0..raster.world_width());
        let y = rng.gen_range(0.0..height * 0.4);
        let size = rng.gen_range(80.0..200.0);
        paint_cloud(raster, x, y, size, rng);
    }
}

/// Jagged ridge points across the full width, starting and ending at `base_y`
pub fn ridge_points<R: Rng + ?Sized>(width: f32, base_y: f32, amplitude: f32, rng: &mut R) -> Vec<(f32, f32)> {
    let mut points = vec![(0.0, base_y)];
    let mut x = 0.0;
    loop {
        x += rng.gen_range(50.0..150.0);
        if x >= width {
            break;
        }
        points.push((x, base_y - rng.gen_range(0.0..amplitude)));
    }
    points.push((width, base_y));
    points
}

/// Smooth ridge points into a polyline by running a quadratic curve through
/// successive midpoints
fn smooth_ridge(points: &[(f32, f32)]) -> Vec<(f32, f32)> {
    const SEGMENT_STEPS: usize = 8;
    let mut outline = vec![points[0]];
    let mut cursor = points[0];

    for pair in points.windows(2) {
        let (ctrl, next) = (pair[0], pair[1]);
        let target = ((ctrl.0 + next.0) / 2.0, (ctrl.1 + next.1) / 2.0);
        for step in 1..=SEGMENT_STEPS {
            let t = step as f32 / SEGMENT_STEPS as f32;
            let u = 1.0 - t;
            outline.push((
                u * u * cursor.0 + 2.0 * u * t * ctrl.0 + t * t * target.0,
                u * u * cursor.1 + 2.0 * u * t * ctrl.1 + t * t * target.1,
            ));
        }
        cursor = target;
    }

    if let Some(last) = points.last() {
        outline.push(*last);
    }
    outline
}

/// Ridge height at `x` along a polyline sorted by x
fn ridge_height(outline: &[(f32, f32)], x: f32) -> Option<f32> {
    outline.windows(2).find_map(|seg| {
        let (a, b) = (seg[0], seg[1]);
        if x < a.0 || x > b.0 {
            return None;
        }
        let span = b.0 - a.0;
        if span <= f32::EPSILON {
            return Some(a.1.min(b.1));
        }
        Some(a.1 + (b.1 - a.1) * (x - a.0) / span)
    })
}

fn paint_mountain<R: Rng + ?Sized>(raster: &mut Raster, base_y: f32, color: Rgba, amplitude: f32, rng: &mut R) {
    let width = raster.world_width();
    let height = raster.world_height();
    let outline = smooth_ridge(&ridge_points(width, base_y, amplitude, rng));

    // ink holds full strength for the top 40% of the gradient, then fades out
    let top = base_y - amplitude;
    let scale = raster.scale();
    let (dots_w, dots_h) = raster.dot_size();

    for dx in 0..dots_w {
        let x = (dx as f32 + 0.5) / scale;
        let Some(ridge) = ridge_height(&outline, x) else {
            continue;
        };
        let first_row = (ridge * scale).ceil().max(0.0) as usize;
        for dy in first_row..dots_h {
            let y = (dy as f32 + 0.5) / scale;
            let t = ((y - top) / (height - top)).clamp(0.0, 1.0);
            let strength = if t <= 0.4 { 1.0 } else { 1.0 - (t - 0.4) / 0.6 };
            raster.put_dot(dx as i32, dy as i32, color.fade(strength));
        }
    }
}

fn paint_cloud<R: Rng + ?Sized>(raster: &mut Raster, x: f32, y: f32, size: f32, rng: &mut R) {
    let puffs = rng.gen_range(3..6);
    let scale = raster.scale();

    for _ in 0..puffs {
        let radius = size * rng.gen_range(0.6..1.2);
        let cx = x + rng.gen_range(-size / 2.0..size / 2.0);
        let cy = y + rng.gen_range(-size / 4.0..size / 4.0);

        let (pcx, pcy) = raster.to_dots(cx, cy);
        let reach = radius * scale;
        for dy in (pcy - reach).floor() as i32..=(pcy + reach).ceil() as i32 {
            for dx in (pcx - reach).floor() as i32..=(pcx + reach).ceil() as i32 {
                let d = ((dx as f32 + 0.5 - pcx).powi(2) + (dy as f32 + 0.5 - pcy).powi(2)).sqrt() / reach;
                let alpha = cloud_falloff(d);
                if alpha > 0.0 {
                    let (r, g, b) = CLOUD_GREY;
                    raster.put_dot(dx, dy, Rgba::rgba(r, g, b, alpha));
                }
            }
        }
    }
}

/// Radial opacity of a cloud puff at normalised distance `d` from its centre
pub fn cloud_falloff(d: f32) -> f32 {
    if d >= 1.0 {
        0.0
    } else if d <= 0.6 {
        0.08 - (0.08 - 0.02) * d / 0.6
    } else {
        0.02 * (1.0 - (d - 0.6) / 0.4)
    }
}

/// Stamp the red "江戸 AI" seal in the bottom-right corner.
///
/// `seed` fixes the worn spots so the seal does not flicker between frames.
pub fn draw_hanko(raster: &mut Raster, seed: u64) {
    let cx = raster.world_width() - HANKO_MARGIN;
    let cy = raster.world_height() - HANKO_MARGIN;
    let half = HANKO_SIZE / 2.0;
    let (sin, cos) = HANKO_TILT.sin_cos();
    let rotate = |x: f32, y: f32| (cx + x * cos - y * sin, cy + x * sin + y * cos);

    let corners = [
        rotate(-half, -half),
        rotate(half, -half),
        rotate(half, half),
        rotate(-half, half),
    ];
    for i in 0..corners.len() {
        let a = corners[i];
        let b = corners[(i + 1) % corners.len()];
        let mid = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
        raster.stroke_quad(a, mid, b, 3.0, VERMILION);
    }

    // "江戸" is four cells wide, "AI" two
    let cell_w = 2.0 / raster.scale();
    raster.put_text(cx - 2.0 * cell_w, cy - 10.0, "江戸", VERMILION);
    raster.put_text(cx - cell_w, cy + 15.0, "AI", VERMILION);

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..HANKO_WEAR_SPOTS {
        let (wx, wy) = rotate(rng.gen_range(-half..half), rng.gen_range(-half..half));
        let (dx, dy) = raster.to_dots(wx, wy);
        raster.clear_dot(dx as i32, dy as i32);
    }
}
