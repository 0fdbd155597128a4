//! Sub-cell raster standing in for a drawing canvas.
//!
//! Geometry is expressed in world units, where the viewport is always
//! `REFERENCE_HEIGHT` units tall. The raster stores 2x4 dots per terminal
//! cell (the braille grid) plus one optional glyph per cell, and composites
//! straight-alpha colours as it goes.

use crate::palette::Rgba;
use crate::terminal::{Terminal, WIDE_TAIL};

/// Height of the viewport in world units
pub const REFERENCE_HEIGHT: f32 = 900.0;

/// Braille cell dimensions in dots
pub const DOTS_X: usize = 2;
pub const DOTS_Y: usize = 4;

/// Base Unicode code point for braille patterns (U+2800)
const BRAILLE_BASE: u32 = 0x2800;

/// Dots at or above this opacity become braille marks; fainter ones only tint
/// the cell background
const INK_THRESHOLD: f32 = 0.35;

/// A glyph placed in a terminal cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub color: Rgba,
}

#[derive(Clone)]
pub struct Raster {
    cols: usize,
    rows: usize,
    width: usize,
    height: usize,
    scale: f32,
    dots: Vec<Option<Rgba>>,
    glyphs: Vec<Option<Glyph>>,
}

impl Raster {
    /// Blank raster covering `cols` x `rows` terminal cells
    pub fn new(cols: u16, rows: u16) -> Self {
        let cols = cols as usize;
        let rows = rows as usize;
        let width = cols * DOTS_X;
        let height = rows * DOTS_Y;
        let scale = if height == 0 {
            1.0
        } else {
            height as f32 / REFERENCE_HEIGHT
        };

        Self {
            cols,
            rows,
            width,
            height,
            scale,
            dots: vec![None; width * height],
            glyphs: vec![None; cols * rows],
        }
    }

    pub fn cells(&self) -> (u16, u16) {
        (self.cols as u16, self.rows as u16)
    }

    /// Size in dots
    pub fn dot_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Dots per world unit
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Viewport width in world units
    pub fn world_width(&self) -> f32 {
        self.width as f32 / self.scale
    }

    /// Viewport height in world units
    pub fn world_height(&self) -> f32 {
        self.height as f32 / self.scale
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn clear(&mut self) {
        self.dots.fill(None);
        self.glyphs.fill(None);
    }

    /// World coordinates to (fractional) dot coordinates
    pub fn to_dots(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale, y * self.scale)
    }

    /// World coordinates of the centre of a terminal cell
    pub fn cell_center(&self, col: u16, row: u16) -> (f32, f32) {
        let dx = (col as usize * DOTS_X) as f32 + DOTS_X as f32 / 2.0;
        let dy = (row as usize * DOTS_Y) as f32 + DOTS_Y as f32 / 2.0;
        (dx / self.scale, dy / self.scale)
    }

    pub fn dot(&self, dx: usize, dy: usize) -> Option<Rgba> {
        if dx < self.width && dy < self.height {
            self.dots[dy * self.width + dx]
        } else {
            None
        }
    }

    pub fn glyph(&self, col: usize, row: usize) -> Option<Glyph> {
        if col < self.cols && row < self.rows {
            self.glyphs[row * self.cols + col]
        } else {
            None
        }
    }

    /// Composite a colour onto one dot; out-of-range dots are ignored
    pub fn put_dot(&mut self, dx: i32, dy: i32, color: Rgba) {
        if color.a <= 0.0 || dx < 0 || dy < 0 {
            return;
        }
        let (dx, dy) = (dx as usize, dy as usize);
        if dx >= self.width || dy >= self.height {
            return;
        }
        let slot = &mut self.dots[dy * self.width + dx];
        *slot = Some(match *slot {
            Some(existing) => color.composite(existing),
            None => color,
        });
    }

    /// Erase one dot back to transparent
    pub fn clear_dot(&mut self, dx: i32, dy: i32) {
        if dx >= 0 && dy >= 0 && (dx as usize) < self.width && (dy as usize) < self.height {
            self.dots[dy as usize * self.width + dx as usize] = None;
        }
    }

    /// Place a glyph in the cell containing world point (x, y)
    pub fn put_glyph(&mut self, x: f32, y: f32, ch: char, color: Rgba) {
        let (px, py) = self.to_dots(x, y);
        let col = (px.floor() as i32).div_euclid(DOTS_X as i32);
        let row = (py.floor() as i32).div_euclid(DOTS_Y as i32);
        self.put_glyph_cell(col, row, ch, color);
    }

    fn put_glyph_cell(&mut self, col: i32, row: i32, ch: char, color: Rgba) {
        if color.a <= 0.0 || col < 0 || row < 0 {
            return;
        }
        let (col, row) = (col as usize, row as usize);
        if col < self.cols && row < self.rows {
            self.glyphs[row * self.cols + col] = Some(Glyph { ch, color });
        }
    }

    /// Write a string left to right starting at the cell holding (x, y)
    pub fn put_text(&mut self, x: f32, y: f32, text: &str, color: Rgba) {
        let (px, py) = self.to_dots(x, y);
        let col = (px.floor() as i32).div_euclid(DOTS_X as i32);
        let row = (py.floor() as i32).div_euclid(DOTS_Y as i32);
        let mut offset = 0;
        for ch in text.chars() {
            self.put_glyph_cell(col + offset, row, ch, color);
            // wide CJK characters occupy two cells
            offset += if is_wide(ch) { 2 } else { 1 };
        }
    }

    /// Axis-aligned rectangle, at least one dot in each direction
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let (x0, y0) = self.to_dots(x, y);
        let (x1, y1) = self.to_dots(x + w, y + h);
        let (x0, x1) = (x0.floor() as i32, (x1.ceil() as i32).max(x0.floor() as i32 + 1));
        let (y0, y1) = (y0.floor() as i32, (y1.ceil() as i32).max(y0.floor() as i32 + 1));
        for dy in y0..y1 {
            for dx in x0..x1 {
                self.put_dot(dx, dy, color);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        self.fill_ellipse(cx, cy, radius, radius, 0.0, color);
    }

    /// Filled ellipse with radii `rx`, `ry` rotated by `rotation` radians
    pub fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, rotation: f32, color: Rgba) {
        let (pcx, pcy) = self.to_dots(cx, cy);
        let rx = (rx * self.scale).max(0.5);
        let ry = (ry * self.scale).max(0.5);
        let reach = rx.max(ry);
        let (sin, cos) = rotation.sin_cos();

        let mut hit = false;
        for dy in (pcy - reach).floor() as i32..=(pcy + reach).ceil() as i32 {
            for dx in (pcx - reach).floor() as i32..=(pcx + reach).ceil() as i32 {
                let ox = dx as f32 + 0.5 - pcx;
                let oy = dy as f32 + 0.5 - pcy;
                let lx = ox * cos + oy * sin;
                let ly = -ox * sin + oy * cos;
                if (lx / rx).powi(2) + (ly / ry).powi(2) <= 1.0 {
                    self.put_dot(dx, dy, color);
                    hit = true;
                }
            }
        }
        if !hit {
            self.put_dot(pcx.floor() as i32, pcy.floor() as i32, color);
        }
    }

    /// Stroke a quadratic bezier with round caps.
    ///
    /// Each dot is covered at most once per stroke so translucent ink does
    /// not darken where the pen overlaps itself.
    pub fn stroke_quad(&mut self, start: (f32, f32), ctrl: (f32, f32), end: (f32, f32), width: f32, color: Rgba) {
        let p0 = self.to_dots(start.0, start.1);
        let p1 = self.to_dots(ctrl.0, ctrl.1);
        let p2 = self.to_dots(end.0, end.1);
        let radius = (width * self.scale / 2.0).max(0.5);

        let approx_len = distance(p0, p1) + distance(p1, p2);
        let steps = ((approx_len * 2.0).ceil() as usize).max(2);

        let mut covered: Vec<(i32, i32)> = Vec::new();
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let u = 1.0 - t;
            let px = u * u * p0.0 + 2.0 * u * t * p1.0 + t * t * p2.0;
            let py = u * u * p0.1 + 2.0 * u * t * p1.1 + t * t * p2.1;
            stamp_disc(&mut covered, px, py, radius);
        }

        covered.sort_unstable();
        covered.dedup();
        for (dx, dy) in covered {
            self.put_dot(dx, dy, color);
        }
    }

    /// Composite another raster of the same size on top of this one
    pub fn draw_over(&mut self, other: &Raster) {
        self.draw_rotated(other, (0.0, 0.0), 0.0);
    }

    /// Composite `other` rotated by `angle` radians about world point `pivot`
    pub fn draw_rotated(&mut self, other: &Raster, pivot: (f32, f32), angle: f32) {
        if angle == 0.0 && other.width == self.width && other.height == self.height {
            for (i, src) in other.dots.iter().enumerate() {
                if let Some(color) = src {
                    self.put_dot((i % self.width) as i32, (i / self.width) as i32, *color);
                }
            }
        } else {
            let (px, py) = self.to_dots(pivot.0, pivot.1);
            let (sin, cos) = angle.sin_cos();
            for dy in 0..self.height {
                for dx in 0..self.width {
                    let ox = dx as f32 + 0.5 - px;
                    let oy = dy as f32 + 0.5 - py;
                    // inverse rotation: where did this dot come from
                    let sx = ox * cos + oy * sin + px;
                    let sy = -ox * sin + oy * cos + py;
                    if sx < 0.0 || sy < 0.0 {
                        continue;
                    }
                    if let Some(color) = other.dot(sx as usize, sy as usize) {
                        self.put_dot(dx as i32, dy as i32, color);
                    }
                }
            }
        }

        let (px, py) = self.to_dots(pivot.0, pivot.1);
        let (sin, cos) = angle.sin_cos();
        for row in 0..other.rows {
            for col in 0..other.cols {
                if let Some(glyph) = other.glyphs[row * other.cols + col] {
                    let ox = (col * DOTS_X) as f32 + 1.0 - px;
                    let oy = (row * DOTS_Y) as f32 + 2.0 - py;
                    let x = ox * cos - oy * sin + px;
                    let y = ox * sin + oy * cos + py;
                    self.put_glyph_cell(
                        (x.floor() as i32).div_euclid(DOTS_X as i32),
                        (y.floor() as i32).div_euclid(DOTS_Y as i32),
                        glyph.ch,
                        glyph.color,
                    );
                }
            }
        }
    }

    /// Resolve one terminal cell against the paper colour.
    ///
    /// Returns (character, foreground, background).
    pub fn resolve_cell(&self, col: usize, row: usize, paper: Rgba) -> (char, Rgba, Rgba) {
        let mut wash = [0u32; 3];
        let mut ink = [0u32; 3];
        let mut ink_count = 0u32;
        let mut bits: u8 = 0;

        for (bit, (ox, oy)) in BRAILLE_BITS.iter().enumerate() {
            let dot = self.dot(col * DOTS_X + ox, row * DOTS_Y + oy);
            let alpha = dot.map(|c| c.a).unwrap_or(0.0);
            let color = dot.map(|c| c.over(paper)).unwrap_or(paper);

            if alpha >= INK_THRESHOLD {
                bits |= 1 << bit;
                ink[0] += color.r as u32;
                ink[1] += color.g as u32;
                ink[2] += color.b as u32;
                ink_count += 1;
            } else {
                wash[0] += color.r as u32;
                wash[1] += color.g as u32;
                wash[2] += color.b as u32;
            }
        }

        let wash_count = 8 - ink_count;
        let background = if wash_count == 0 {
            paper
        } else {
            Rgba::rgb(
                (wash[0] / wash_count) as u8,
                (wash[1] / wash_count) as u8,
                (wash[2] / wash_count) as u8,
            )
        };

        if let Some(glyph) = self.glyph(col, row) {
            return (glyph.ch, glyph.color.over(background), background);
        }

        if ink_count == 0 {
            return (' ', background, background);
        }

        let foreground = Rgba::rgb(
            (ink[0] / ink_count) as u8,
            (ink[1] / ink_count) as u8,
            (ink[2] / ink_count) as u8,
        );
        let ch = char::from_u32(BRAILLE_BASE + bits as u32).unwrap_or(' ');
        (ch, foreground, background)
    }

    /// Copy the raster into the terminal back buffer
    pub fn blit_to(&self, term: &mut Terminal, paper: Rgba) {
        for row in 0..self.rows {
            let mut col = 0;
            while col < self.cols {
                let (ch, fg, bg) = self.resolve_cell(col, row, paper);
                term.set_cell(col as i32, row as i32, ch, Some(fg.to_color()), Some(bg.to_color()));
                if is_wide(ch) && col + 1 < self.cols {
                    term.set_cell(col as i32 + 1, row as i32, WIDE_TAIL, None, Some(bg.to_color()));
                    col += 1;
                }
                col += 1;
            }
        }
    }
}

/// Dot offsets within a cell, in braille bit order
const BRAILLE_BITS: [(usize, usize); 8] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (1, 0),
    (1, 1),
    (1, 2),
    (0, 3),
    (1, 3),
];

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn stamp_disc(covered: &mut Vec<(i32, i32)>, px: f32, py: f32, radius: f32) {
    if radius <= 0.5 {
        covered.push((px.floor() as i32, py.floor() as i32));
        return;
    }
    let r2 = radius * radius;
    for dy in (py - radius).floor() as i32..=(py + radius).ceil() as i32 {
        for dx in (px - radius).floor() as i32..=(px + radius).ceil() as i32 {
            let ox = dx as f32 + 0.5 - px;
            let oy = dy as f32 + 0.5 - py;
            if ox * ox + oy * oy <= r2 {
                covered.push((dx, dy));
            }
        }
    }
}

/// Number of terminal cells `text` occupies
pub fn text_cells(text: &str) -> usize {
    text.chars().map(|ch| if is_wide(ch) { 2 } else { 1 }).sum()
}

/// CJK ideographs and kana render two cells wide
fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F | 0x2E80..=0x303E | 0x3041..=0x33FF | 0x3400..=0x4DBF |
        0x4E00..=0x9FFF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF | 0xFF00..=0xFF60 |
        0xFFE0..=0xFFE6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{PAPER, TRUNK};

    #[test]
    fn world_is_reference_height() {
        let raster = Raster::new(80, 45);
        assert_eq!(raster.dot_size(), (160, 180));
        assert!((raster.world_height() - REFERENCE_HEIGHT).abs() < 1e-3);
        assert!((raster.scale() - 0.2).abs() < 1e-6);
        assert!((raster.world_width() - 800.0).abs() < 1e-2);
    }

    #[test]
    fn cell_center_maps_back_into_cell() {
        let mut raster = Raster::new(80, 45);
        let (x, y) = raster.cell_center(10, 7);
        raster.put_glyph(x, y, '*', TRUNK);
        assert_eq!(raster.glyph(10, 7).map(|g| g.ch), Some('*'));
    }

    #[test]
    fn zero_sized_raster_is_safe() {
        let mut raster = Raster::new(0, 0);
        assert!(raster.is_empty());
        raster.fill_circle(10.0, 10.0, 5.0, TRUNK);
        raster.stroke_quad((0.0, 0.0), (5.0, 5.0), (10.0, 10.0), 3.0, TRUNK);
        raster.put_glyph(1.0, 1.0, 'x', TRUNK);
    }

    #[test]
    fn stroke_covers_each_dot_once() {
        let mut raster = Raster::new(40, 25);
        let ink = TRUNK.fade(0.5);
        raster.stroke_quad((100.0, 450.0), (200.0, 400.0), (300.0, 450.0), 30.0, ink);

        let (w, h) = raster.dot_size();
        let mut marked = 0;
        for dy in 0..h {
            for dx in 0..w {
                if let Some(color) = raster.dot(dx, dy) {
                    assert!((color.a - 0.5).abs() < 1e-4);
                    marked += 1;
                }
            }
        }
        assert!(marked > 20);
    }

    #[test]
    fn overlapping_strokes_accumulate() {
        let mut raster = Raster::new(10, 10);
        let ink = TRUNK.fade(0.5);
        raster.fill_rect(0.0, 0.0, 50.0, 50.0, ink);
        raster.fill_rect(0.0, 0.0, 50.0, 50.0, ink);
        let dot = raster.dot(0, 0).expect("dot painted");
        assert!((dot.a - 0.75).abs() < 1e-4);
    }

    #[test]
    fn unrotated_blit_copies_dots_and_glyphs() {
        let mut src = Raster::new(20, 10);
        src.fill_rect(100.0, 100.0, 40.0, 40.0, TRUNK);
        src.put_glyph(300.0, 300.0, '1', TRUNK);

        let mut dst = Raster::new(20, 10);
        dst.draw_over(&src);

        let (w, h) = src.dot_size();
        for dy in 0..h {
            for dx in 0..w {
                assert_eq!(src.dot(dx, dy), dst.dot(dx, dy));
            }
        }
        for row in 0..10 {
            for col in 0..20 {
                assert_eq!(src.glyph(col, row), dst.glyph(col, row));
            }
        }
    }

    #[test]
    fn rotation_about_pivot_keeps_pivot() {
        let mut src = Raster::new(40, 40);
        src.fill_circle(200.0, 450.0, 10.0, TRUNK);
        let mut dst = Raster::new(40, 40);
        dst.draw_rotated(&src, (200.0, 450.0), 0.3);

        let (px, py) = dst.to_dots(200.0, 450.0);
        assert!(dst.dot(px as usize, py as usize).is_some());
    }

    #[test]
    fn solid_cell_becomes_full_braille() {
        let mut raster = Raster::new(4, 4);
        raster.fill_rect(0.0, 0.0, 1000.0, 1000.0, TRUNK);
        let (ch, fg, _) = raster.resolve_cell(0, 0, PAPER);
        assert_eq!(ch, '\u{28FF}');
        assert_eq!(fg, TRUNK);
    }

    #[test]
    fn faint_wash_only_tints_background() {
        let mut raster = Raster::new(4, 4);
        raster.fill_rect(0.0, 0.0, 1000.0, 1000.0, TRUNK.fade(0.1));
        let (ch, _, bg) = raster.resolve_cell(1, 1, PAPER);
        assert_eq!(ch, ' ');
        assert_ne!(bg, PAPER);
    }

    #[test]
    fn glyph_wins_over_dots() {
        let mut raster = Raster::new(4, 4);
        raster.fill_rect(0.0, 0.0, 1000.0, 1000.0, TRUNK);
        raster.put_glyph(10.0, 10.0, '0', Rgba::rgb(0, 255, 0));
        let (ch, fg, _) = raster.resolve_cell(0, 0, PAPER);
        assert_eq!(ch, '0');
        assert_eq!(fg, Rgba::rgb(0, 255, 0));
    }

    #[test]
    fn wide_text_advances_two_cells() {
        let mut raster = Raster::new(10, 2);
        raster.put_text(0.0, 0.0, "江A", TRUNK);
        assert_eq!(raster.glyph(0, 0).map(|g| g.ch), Some('江'));
        assert_eq!(raster.glyph(1, 0), None);
        assert_eq!(raster.glyph(2, 0).map(|g| g.ch), Some('A'));
        assert_eq!(text_cells("江A"), 3);
    }
}
