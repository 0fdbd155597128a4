//! Scene state: one generation of tree, background and weather, advanced a
//! frame at a time.
//!
//! A regeneration builds a complete [`Generation`] first and swaps it in
//! whole, so a frame never mixes a new tree with an old cache.

use crate::canvas::{text_cells, Raster, DOTS_X};
use crate::config::{BonsaiConfig, GrowthParams, WindMode};
use crate::flyer::FlyingObject;
use crate::palette::{SeasonChoice, SeasonPalette, TRUNK};
use crate::particles::ParticleSystem;
use crate::render::{render_tree, Counters, RenderContext, Sway};
use crate::scenery::{draw_hanko, paint_background};
use crate::tree::{self, BranchNode};
use rand::Rng;
use std::f32::consts::FRAC_PI_2;

/// Progress added per frame while growing
pub const GROWTH_SPEED: f32 = 0.005;
/// Wind clock advance per frame once grown
pub const WIND_SPEED: f32 = 0.02;
/// Peak rotation of the cached tree (radians)
pub const GLOBAL_SWAY: f32 = 0.015;
/// Peak sway of the outermost twigs in branch wind mode
const BRANCH_SWAY: f32 = 0.05;
/// Caption baseline in world units
const CAPTION_Y: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// No tree yet
    Idle,
    Growing { progress: f32 },
    Grown { wind_time: f32 },
}

/// Everything tied to one regeneration
struct Generation {
    palette: SeasonPalette,
    tree: BranchNode,
    trunk_angle: f32,
    background: Raster,
    /// Fully grown tree, filled on the first grown frame in cached wind mode
    tree_cache: Option<Raster>,
    particles: ParticleSystem,
    flyer: FlyingObject,
    hanko_seed: u64,
}

impl Generation {
    fn new<R: Rng + ?Sized>(cols: u16, rows: u16, season: SeasonChoice, growth: &GrowthParams, rng: &mut R) -> Self {
        let palette = season.pick(rng).palette();

        let mut background = Raster::new(cols, rows);
        paint_background(&mut background, rng);

        let width = background.world_width();
        let height = background.world_height();
        let trunk_length = rng.gen_range(height * 0.15..=height * 0.25);
        let trunk_width = rng.gen_range(15.0..25.0);
        let trunk_angle = -FRAC_PI_2 + rng.gen_range(-0.1..0.1);
        let tree = tree::generate(trunk_length, trunk_width, growth.max_depth, growth, &palette, rng);

        let particles = ParticleSystem::new(&palette, width, height, rng);
        let flyer = FlyingObject::new(width, height, rng);

        Self {
            palette,
            tree,
            trunk_angle,
            background,
            tree_cache: None,
            particles,
            flyer,
            hanko_seed: rng.gen(),
        }
    }
}

pub struct Scene {
    season: SeasonChoice,
    growth: GrowthParams,
    wind: WindMode,
    phase: Phase,
    current: Option<Generation>,
    frame: Raster,
    /// Pointer position in world units
    pointer: Option<(f32, f32)>,
    caption: Option<String>,
    last_counters: Counters,
}

impl Scene {
    pub fn new(cols: u16, rows: u16, config: &BonsaiConfig) -> Self {
        Self {
            season: config.season,
            growth: config.growth,
            wind: config.wind,
            phase: Phase::Idle,
            current: None,
            frame: Raster::new(cols, rows),
            pointer: None,
            caption: None,
            last_counters: Counters::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tree(&self) -> Option<&BranchNode> {
        self.current.as_ref().map(|g| &g.tree)
    }

    /// Start over with a fresh palette, tree and weather
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (cols, rows) = self.frame.cells();
        let next = Generation::new(cols, rows, self.season, &self.growth, rng);
        log::info!(
            "generated {} bonsai: {} branches over {} levels, {} leaves",
            next.palette.season.name(),
            next.tree.branch_count(),
            next.tree.max_path_len(),
            next.tree.leaf_count()
        );
        self.current = Some(next);
        self.phase = Phase::Growing { progress: 0.0 };
    }

    /// New viewport size; every cache is sized to the old one so the whole
    /// scene is generated again
    pub fn resize<R: Rng + ?Sized>(&mut self, cols: u16, rows: u16, rng: &mut R) {
        self.frame = Raster::new(cols, rows);
        self.current = None;
        self.phase = Phase::Idle;
        self.regenerate(rng);
    }

    /// Pointer moved to a terminal cell
    pub fn set_pointer(&mut self, col: u16, row: u16) {
        self.pointer = Some(self.frame.cell_center(col, row));
    }

    pub fn set_caption(&mut self, text: impl Into<String>) {
        self.caption = Some(text.into());
    }

    /// Jump straight to the fully grown tree
    pub fn finish_growth(&mut self) {
        if self.current.is_some() {
            self.phase = Phase::Growing { progress: 1.0 };
            self.enter_grown();
        }
    }

    /// Advance one frame
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.phase {
            Phase::Idle => return,
            Phase::Growing { progress } => {
                let progress = (progress + GROWTH_SPEED).min(1.0);
                self.phase = Phase::Growing { progress };
                if progress >= 1.0 {
                    self.enter_grown();
                }
            }
            Phase::Grown { wind_time } => {
                self.phase = Phase::Grown {
                    wind_time: wind_time + WIND_SPEED,
                };
            }
        }

        let width = self.frame.world_width();
        let height = self.frame.world_height();
        if let Some(generation) = self.current.as_mut() {
            generation.particles.update(self.pointer, width, height, rng);
            generation.flyer.update(width, height, rng);
        }
    }

    fn enter_grown(&mut self) {
        let Some(generation) = self.current.as_mut() else {
            return;
        };
        if self.wind == WindMode::Cached && generation.tree_cache.is_none() {
            let (cols, rows) = self.frame.cells();
            let mut cache = Raster::new(cols, rows);
            let base = trunk_base(&cache);
            let ctx = RenderContext {
                max_depth: self.growth.max_depth,
                sway: None,
            };
            render_tree(&mut cache, &generation.tree, base, generation.trunk_angle, 1.0, &ctx);
            generation.tree_cache = Some(cache);
        }
        self.phase = Phase::Grown { wind_time: 0.0 };
    }

    /// Compose the current frame
    pub fn draw(&mut self) -> &Raster {
        self.frame.clear();
        self.last_counters = Counters::default();

        let Some(generation) = self.current.as_ref() else {
            return &self.frame;
        };

        self.frame.draw_over(&generation.background);
        let base = trunk_base(&self.frame);
        let max_depth = self.growth.max_depth;

        match self.phase {
            Phase::Idle => {}
            Phase::Growing { progress } => {
                let ctx = RenderContext { max_depth, sway: None };
                self.last_counters =
                    render_tree(&mut self.frame, &generation.tree, base, generation.trunk_angle, progress, &ctx);
            }
            Phase::Grown { wind_time } => {
                match (&generation.tree_cache, self.wind) {
                    (Some(cache), WindMode::Cached) => {
                        self.frame.draw_rotated(cache, base, wind_time.sin() * GLOBAL_SWAY);
                    }
                    _ => {
                        let ctx = RenderContext {
                            max_depth,
                            sway: Some(Sway {
                                time: wind_time,
                                amplitude: BRANCH_SWAY,
                            }),
                        };
                        self.last_counters =
                            render_tree(&mut self.frame, &generation.tree, base, generation.trunk_angle, 1.0, &ctx);
                    }
                }
                draw_hanko(&mut self.frame, generation.hanko_seed);
            }
        }

        generation.particles.draw(&mut self.frame);
        generation.flyer.draw(&mut self.frame);

        if let Some(caption) = &self.caption {
            let cell_w = DOTS_X as f32 / self.frame.scale();
            let x = self.frame.world_width() / 2.0 - text_cells(caption) as f32 * cell_w / 2.0;
            self.frame.put_text(x, CAPTION_Y, caption, TRUNK);
        }

        &self.frame
    }
}

/// Trunk base: bottom centre of the viewport
fn trunk_base(raster: &Raster) -> (f32, f32) {
    (raster.world_width() / 2.0, raster.world_height())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Season;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn has_tree_cache(scene: &Scene) -> bool {
        scene.current.as_ref().is_some_and(|g| g.tree_cache.is_some())
    }

    fn config(season: Season, wind: WindMode) -> BonsaiConfig {
        BonsaiConfig {
            season: SeasonChoice::Fixed(season),
            wind,
            growth: GrowthParams {
                max_depth: 6,
                ..GrowthParams::default()
            },
            ..BonsaiConfig::default()
        }
    }

    fn grown_scene(wind: WindMode) -> (Scene, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        let mut scene = Scene::new(80, 40, &config(Season::Summer, wind));
        scene.regenerate(&mut rng);
        scene.finish_growth();
        (scene, rng)
    }

    #[test]
    fn starts_idle_and_draws_blank() {
        let mut scene = Scene::new(40, 20, &BonsaiConfig::default());
        assert_eq!(scene.phase(), Phase::Idle);
        let frame = scene.draw();
        let (w, h) = frame.dot_size();
        assert!((0..h).all(|y| (0..w).all(|x| frame.dot(x, y).is_none())));
    }

    #[test]
    fn growth_reaches_grown_and_caches() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut scene = Scene::new(60, 30, &config(Season::Spring, WindMode::Cached));
        scene.regenerate(&mut rng);
        assert_eq!(scene.phase(), Phase::Growing { progress: 0.0 });

        let mut frames = 0;
        while matches!(scene.phase(), Phase::Growing { .. }) {
            scene.update(&mut rng);
            frames += 1;
            assert!(frames <= 201);
        }
        assert!(frames >= 199);
        assert!(has_tree_cache(&scene));

        scene.update(&mut rng);
        match scene.phase() {
            Phase::Grown { wind_time } => assert!((wind_time - WIND_SPEED).abs() < 1e-6),
            other => panic!("unexpected phase {:?}", other),
        }
    }

    #[test]
    fn regenerating_mid_growth_starts_over() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut scene = Scene::new(60, 30, &config(Season::Summer, WindMode::Cached));
        scene.regenerate(&mut rng);
        for _ in 0..100 {
            scene.update(&mut rng);
        }
        scene.draw();
        assert!(scene.last_counters.branches > 0);

        scene.regenerate(&mut rng);
        assert_eq!(scene.phase(), Phase::Growing { progress: 0.0 });
        assert!(!has_tree_cache(&scene));
        scene.draw();
        assert_eq!(scene.last_counters, Counters::default());
    }

    #[test]
    fn fresh_generation_frame_is_just_background() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut scene = Scene::new(60, 30, &config(Season::Summer, WindMode::Cached));
        scene.regenerate(&mut rng);
        scene.update(&mut rng);
        scene.regenerate(&mut rng);

        let background = scene.current.as_ref().map(|g| g.background.clone()).expect("generation");
        let frame = scene.draw();
        let (w, h) = frame.dot_size();
        for y in 0..h {
            for x in 0..w {
                assert_eq!(frame.dot(x, y), background.dot(x, y));
            }
        }
    }

    #[test]
    fn resize_regenerates_at_new_size() {
        let (mut scene, mut rng) = grown_scene(WindMode::Cached);
        assert!(has_tree_cache(&scene));
        scene.resize(100, 50, &mut rng);
        assert_eq!(scene.frame.cells(), (100, 50));
        assert_eq!(scene.phase(), Phase::Growing { progress: 0.0 });
        assert!(!has_tree_cache(&scene));
        let (w, _) = scene.draw().dot_size();
        assert_eq!(w, 200);
    }

    #[test]
    fn grown_scene_stamps_hanko() {
        let (mut scene, _) = grown_scene(WindMode::Cached);
        let frame = scene.draw();
        let (cols, rows) = frame.cells();
        let found = (0..rows as usize).any(|r| (0..cols as usize).any(|c| frame.glyph(c, r).map(|g| g.ch) == Some('戸')));
        assert!(found);
    }

    #[test]
    fn branch_wind_redraws_every_branch() {
        let (mut scene, mut rng) = grown_scene(WindMode::Branch);
        assert!(!has_tree_cache(&scene));
        scene.update(&mut rng);
        scene.draw();
        let expected = scene.tree().map(|t| t.branch_count()).unwrap_or(0);
        assert_eq!(scene.last_counters.branches, expected);
    }

    #[test]
    fn pointer_is_tracked_in_world_units() {
        let mut scene = Scene::new(80, 45, &BonsaiConfig::default());
        scene.set_pointer(40, 22);
        let (x, y) = scene.pointer.expect("pointer set");
        assert!((x - 405.0).abs() < 1.0);
        assert!((y - 450.0).abs() < 1.0);
    }

    #[test]
    fn caption_is_drawn_on_top() {
        let (mut scene, _) = grown_scene(WindMode::Cached);
        scene.set_caption("old pond");
        let frame = scene.draw();
        let (cols, _) = frame.cells();
        let row = (CAPTION_Y * frame.scale()) as usize / 4;
        let text: String = (0..cols as usize).filter_map(|c| frame.glyph(c, row).map(|g| g.ch)).collect();
        assert!(text.contains("old pond"));
    }
}
