//! Seasonal colour palettes and the colour type shared by every layer

use chrono::Datelike;
use crossterm::style::Color;
use rand::Rng;

/// An sRGB colour with straight (non-premultiplied) alpha in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with its alpha multiplied by `alpha`
    pub fn fade(self, alpha: f32) -> Self {
        Self {
            a: (self.a * alpha).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Composite `self` over an opaque `base` colour
    pub fn over(self, base: Rgba) -> Rgba {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |top: u8, bottom: u8| -> u8 {
            (top as f32 * a + bottom as f32 * (1.0 - a)).round() as u8
        };
        Rgba::rgb(mix(self.r, base.r), mix(self.g, base.g), mix(self.b, base.b))
    }

    /// Source-over compositing of `self` onto a possibly translucent `dst`
    pub fn composite(self, dst: Rgba) -> Rgba {
        let sa = self.a.clamp(0.0, 1.0);
        let da = dst.a.clamp(0.0, 1.0) * (1.0 - sa);
        let out_a = sa + da;
        if out_a <= f32::EPSILON {
            return Rgba::rgba(0, 0, 0, 0.0);
        }
        let mix = |s: u8, d: u8| -> u8 { ((s as f32 * sa + d as f32 * da) / out_a).round() as u8 };
        Rgba::rgba(mix(self.r, dst.r), mix(self.g, dst.g), mix(self.b, dst.b), out_a)
    }

    pub fn to_color(self) -> Color {
        Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Ink used for every branch
pub const TRUNK: Rgba = Rgba::rgb(0x2c, 0x2c, 0x2c);
/// Washi paper behind the whole scene
pub const PAPER: Rgba = Rgba::rgb(0xfc, 0xfb, 0xf9);
/// Vermilion of the hanko seal
pub const VERMILION: Rgba = Rgba::rgb(0xd9, 0x3a, 0x3a);

/// What falls from the sky during a season
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    None,
    Petal,
    Leaf,
    Snow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// Northern-hemisphere season for a calendar month (1-12)
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    pub fn palette(&self) -> SeasonPalette {
        match self {
            Season::Spring => SeasonPalette {
                season: *self,
                leaf_colors: &SPRING_LEAVES,
                accent: Rgba::rgb(0xff, 0x14, 0x93),
                particle_color: Some(Rgba::rgba(255, 105, 180, 0.8)),
                particle_kind: ParticleKind::Petal,
            },
            Season::Summer => SeasonPalette {
                season: *self,
                leaf_colors: &SUMMER_LEAVES,
                accent: Rgba::rgb(0x00, 0xff, 0x00),
                particle_color: None,
                particle_kind: ParticleKind::None,
            },
            Season::Autumn => SeasonPalette {
                season: *self,
                leaf_colors: &AUTUMN_LEAVES,
                accent: Rgba::rgb(0xff, 0x45, 0x00),
                particle_color: Some(Rgba::rgba(204, 85, 0, 0.8)),
                particle_kind: ParticleKind::Leaf,
            },
            Season::Winter => SeasonPalette {
                season: *self,
                leaf_colors: &WINTER_LEAVES,
                accent: Rgba::rgb(0x00, 0xff, 0xff),
                particle_color: Some(Rgba::rgba(200, 220, 255, 0.9)),
                particle_kind: ParticleKind::Snow,
            },
        }
    }
}

const SPRING_LEAVES: [Rgba; 3] = [
    Rgba::rgba(255, 183, 197, 0.8),
    Rgba::rgba(255, 192, 203, 0.8),
    Rgba::rgb(0xff, 0x69, 0xb4),
];
const SUMMER_LEAVES: [Rgba; 1] = [Rgba::rgba(74, 108, 74, 0.8)];
const AUTUMN_LEAVES: [Rgba; 3] = [
    Rgba::rgba(204, 85, 0, 0.8),
    Rgba::rgba(218, 165, 32, 0.8),
    Rgba::rgba(165, 42, 42, 0.8),
];
const WINTER_LEAVES: [Rgba; 2] = [Rgba::rgba(255, 255, 255, 0.9), Rgba::rgba(240, 248, 255, 0.9)];

/// Colours and weather for one generation cycle
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonPalette {
    pub season: Season,
    pub leaf_colors: &'static [Rgba],
    /// "Digital" highlight used by some symbolic leaves
    pub accent: Rgba,
    pub particle_color: Option<Rgba>,
    pub particle_kind: ParticleKind,
}

impl SeasonPalette {
    pub fn random_leaf_color<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgba {
        self.leaf_colors[rng.gen_range(0..self.leaf_colors.len())]
    }
}

/// How the season is chosen on each regeneration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonChoice {
    Random,
    /// Follow the local calendar month
    Auto,
    Fixed(Season),
}

impl SeasonChoice {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "random" | "any" => Some(SeasonChoice::Random),
            "auto" | "now" => Some(SeasonChoice::Auto),
            "spring" | "haru" => Some(SeasonChoice::Fixed(Season::Spring)),
            "summer" | "natsu" => Some(SeasonChoice::Fixed(Season::Summer)),
            "autumn" | "fall" | "aki" => Some(SeasonChoice::Fixed(Season::Autumn)),
            "winter" | "fuyu" => Some(SeasonChoice::Fixed(Season::Winter)),
            _ => None,
        }
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Season {
        match self {
            SeasonChoice::Random => Season::ALL[rng.gen_range(0..Season::ALL.len())],
            SeasonChoice::Auto => Season::from_month(chrono::Local::now().month()),
            SeasonChoice::Fixed(season) => *season,
        }
    }
}
