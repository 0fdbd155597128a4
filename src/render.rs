//! Growth-aware tree rendering
//!
//! Depth levels are revealed one after another as `progress` runs from 0 to
//! 1: the trunk grows first, and each level only starts once its parent is
//! nearly done.

use crate::canvas::Raster;
use crate::palette::TRUNK;
use crate::tree::{BranchNode, LeafData, LeafKind};

/// Children start once their parent is this far grown
const CHILD_THRESHOLD: f32 = 0.8;
/// Leaves start fading in past this local growth
const LEAF_THRESHOLD: f32 = 0.9;
const BRANCH_ALPHA: f32 = 0.8;

/// Time-varying wind applied per branch
#[derive(Clone, Copy, Debug)]
pub struct Sway {
    pub time: f32,
    /// Angle (radians) reached by the outermost level
    pub amplitude: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct RenderContext {
    pub max_depth: u32,
    pub sway: Option<Sway>,
}

/// What a render pass drew
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    pub branches: usize,
    /// Branches drawn at less than full length
    pub partial: usize,
    pub leaves: usize,
}

impl Counters {
    fn add(&mut self, other: Counters) {
        self.branches += other.branches;
        self.partial += other.partial;
        self.leaves += other.leaves;
    }
}

/// Progress interval during which depth `level` (0 = trunk) grows.
///
/// Levels 0..=max_depth share the whole 0..1 range so the outermost twigs
/// finish exactly at progress 1.
pub fn reveal_window(level: u32, max_depth: u32) -> (f32, f32) {
    let levels = max_depth.saturating_add(1) as f32;
    (level as f32 / levels, level.saturating_add(1) as f32 / levels)
}

/// How much of a branch at `level` is grown for a global `progress`
pub fn local_growth(level: u32, max_depth: u32, progress: f32) -> f32 {
    let (start, end) = reveal_window(level, max_depth);
    ((progress - start) / (end - start)).clamp(0.0, 1.0)
}

/// Rendered length of `node` at `progress`
pub fn branch_extent(node: &BranchNode, max_depth: u32, progress: f32) -> f32 {
    let level = max_depth.saturating_sub(node.depth_remaining);
    node.length * local_growth(level, max_depth, progress)
}

/// Draw `node` and everything grown beneath it, anchored at `anchor`.
pub fn render_tree(
    raster: &mut Raster,
    node: &BranchNode,
    anchor: (f32, f32),
    parent_angle: f32,
    progress: f32,
    ctx: &RenderContext,
) -> Counters {
    let mut counters = Counters::default();

    let level = ctx.max_depth.saturating_sub(node.depth_remaining);
    let growth = local_growth(level, ctx.max_depth, progress);
    if growth <= 0.0 {
        return counters;
    }

    let mut angle = parent_angle + node.relative_angle;
    if let Some(sway) = ctx.sway {
        let reach = (level + 1) as f32 / (ctx.max_depth + 1) as f32;
        angle += (sway.time + level as f32 * 0.5).sin() * sway.amplitude * reach;
    }

    let length = branch_extent(node, ctx.max_depth, progress);
    let (sin, cos) = angle.sin_cos();
    let end = (anchor.0 + cos * length, anchor.1 + sin * length);

    // curvature grows with the branch
    let (ox, oy) = node.curve_offset;
    let bend = (ox * cos - oy * sin, ox * sin + oy * cos);
    let mid = ((anchor.0 + end.0) / 2.0, (anchor.1 + end.1) / 2.0);
    let ctrl = (mid.0 + bend.0 * growth, mid.1 + bend.1 * growth);

    raster.stroke_quad(anchor, ctrl, end, node.width * growth, TRUNK.fade(BRANCH_ALPHA));
    counters.branches += 1;
    if growth < 1.0 {
        counters.partial += 1;
    }

    if growth > CHILD_THRESHOLD {
        for child in &node.children {
            counters.add(render_tree(raster, child, end, angle, progress, ctx));
        }
    }

    if growth > LEAF_THRESHOLD {
        let alpha = ((growth - LEAF_THRESHOLD) * 10.0).min(1.0);
        for leaf in &node.leaves {
            render_leaf(raster, end, leaf, alpha);
            counters.leaves += 1;
        }
    }

    counters
}

fn render_leaf(raster: &mut Raster, tip: (f32, f32), leaf: &LeafData, alpha: f32) {
    let x = tip.0 + leaf.offset.0;
    let y = tip.1 + leaf.offset.1;
    let color = leaf.color.fade(alpha);

    match leaf.kind {
        LeafKind::Symbolic { glyph } => raster.put_glyph(x, y, glyph, color),
        LeafKind::Block => raster.fill_rect(x, y, leaf.size, leaf.size, color),
    }
}
