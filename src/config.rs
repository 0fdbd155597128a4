use crate::palette::SeasonChoice;

/// Shape parameters for tree generation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthParams {
    /// Child length relative to the parent, before the random 0.7-1.0 factor
    pub growth_factor: f32,
    pub width_factor: f32,
    /// Maximum deviation of a child from its parent's angle (radians)
    pub branch_angle: f32,
    /// Candidate branches at or below this length turn into leaves
    pub min_length: f32,
    pub max_depth: u32,
}

/// Deepest tree the scene will grow; size grows as 3^depth
pub const MAX_DEPTH_LIMIT: u32 = 16;

impl GrowthParams {
    /// Set `max_depth`, clamped to `MAX_DEPTH_LIMIT`. Returns false if it had to clamp.
    pub fn set_max_depth(&mut self, depth: u32) -> bool {
        self.max_depth = depth.min(MAX_DEPTH_LIMIT);
        depth <= MAX_DEPTH_LIMIT
    }
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            growth_factor: 0.8,
            width_factor: 0.7,
            branch_angle: 0.4,
            min_length: 5.0,
            max_depth: 12,
        }
    }
}

/// How the grown tree moves in the wind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindMode {
    /// Blit the cached tree, rotated about the base of the trunk
    Cached,
    /// Re-walk the tree every frame with per-branch sway
    Branch,
}

impl WindMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cached" | "cache" | "global" => Some(WindMode::Cached),
            "branch" | "branches" | "live" => Some(WindMode::Branch),
            _ => None,
        }
    }
}

/// Which phrase set the haiku endpoint serves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaikuLang {
    English,
    Japanese,
    /// Assemble a line from kami/naka/shimo word lists
    Composed,
}

impl HaikuLang {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Some(HaikuLang::English),
            "ja" | "jp" | "japanese" => Some(HaikuLang::Japanese),
            "composed" | "kami" => Some(HaikuLang::Composed),
            _ => None,
        }
    }
}

/// Configuration for the growing bonsai scene
#[derive(Clone, Debug)]
pub struct BonsaiConfig {
    pub print: bool,
    pub time_step: f32,
    pub seed: Option<u64>,
    pub season: SeasonChoice,
    pub growth: GrowthParams,
    pub wind: WindMode,
    /// Base URL of the haiku API; `None` shows local phrases instead
    pub api_base: Option<String>,
    pub haiku_lang: HaikuLang,
}

impl Default for BonsaiConfig {
    fn default() -> Self {
        Self {
            print: false,
            time_step: 0.016,
            seed: None,
            season: SeasonChoice::Random,
            growth: GrowthParams::default(),
            wind: WindMode::Cached,
            api_base: None,
            haiku_lang: HaikuLang::English,
        }
    }
}

/// Configuration for the haiku API server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: String,
    pub lang: HaikuLang,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            lang: HaikuLang::English,
        }
    }
}
