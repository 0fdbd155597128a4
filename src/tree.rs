//! Procedural bonsai structure
//!
//! The tree is generated once per cycle and never mutated afterwards; the
//! renderer derives all transient state (growth, sway) from it each frame.

use crate::config::GrowthParams;
use crate::palette::{Rgba, SeasonPalette};
use rand::Rng;

/// How a leaf is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeafKind {
    /// A single "digital" character, `0` or `1`
    Symbolic { glyph: char },
    /// A filled square
    Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafData {
    pub kind: LeafKind,
    pub color: Rgba,
    /// Edge of a `Block` leaf in world units; a `Symbolic` leaf always fills one cell
    pub size: f32,
    /// Fixed offset from the tip of the branch the leaf hangs from
    pub offset: (f32, f32),
}

/// One branch and the subtree growing from its tip
#[derive(Debug, Clone, PartialEq)]
pub struct BranchNode {
    pub length: f32,
    pub width: f32,
    /// Counts down to 0 at the outermost twigs
    pub depth_remaining: u32,
    /// Perturbation of the quadratic control point, in branch-local space
    pub curve_offset: (f32, f32),
    /// Angle relative to the parent's resolved angle, 0 for the trunk
    pub relative_angle: f32,
    pub children: Vec<BranchNode>,
    pub leaves: Vec<LeafData>,
}

impl BranchNode {
    /// Number of nodes on the longest root-to-tip path
    pub fn max_path_len(&self) -> u32 {
        1 + self
            .children
            .iter()
            .map(BranchNode::max_path_len)
            .max()
            .unwrap_or(0)
    }

    pub fn branch_count(&self) -> usize {
        1 + self.children.iter().map(BranchNode::branch_count).sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len() + self.children.iter().map(BranchNode::leaf_count).sum::<usize>()
    }
}

fn generate_leaf<R: Rng + ?Sized>(palette: &SeasonPalette, rng: &mut R) -> LeafData {
    let symbolic = rng.gen_bool(0.5);
    let leaf_color = palette.random_leaf_color(rng);

    let kind = if symbolic {
        LeafKind::Symbolic {
            glyph: if rng.gen_bool(0.5) { '0' } else { '1' },
        }
    } else {
        LeafKind::Block
    };
    let color = if symbolic && rng.gen_bool(0.3) {
        palette.accent
    } else {
        leaf_color
    };
    let size = if symbolic {
        rng.gen_range(10.0..14.0)
    } else {
        rng.gen_range(5.0..12.0)
    };

    LeafData {
        kind,
        color,
        size,
        offset: (rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)),
    }
}

/// Grow a tree from the trunk down to `max_depth` levels of branching.
///
/// Candidate branches shorter than `params.min_length` become leaf clusters
/// on their parent instead, so recursion always bottoms out.
pub fn generate<R: Rng + ?Sized>(
    initial_length: f32,
    initial_width: f32,
    max_depth: u32,
    params: &GrowthParams,
    palette: &SeasonPalette,
    rng: &mut R,
) -> BranchNode {
    build_branch(initial_length, initial_width, max_depth, 0.0, params, palette, rng)
}

fn build_branch<R: Rng + ?Sized>(
    length: f32,
    width: f32,
    depth: u32,
    relative_angle: f32,
    params: &GrowthParams,
    palette: &SeasonPalette,
    rng: &mut R,
) -> BranchNode {
    let mut node = BranchNode {
        length,
        width,
        depth_remaining: depth,
        curve_offset: (rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)),
        relative_angle,
        children: Vec::new(),
        leaves: Vec::new(),
    };

    if depth == 0 {
        let leaf_count = rng.gen_range(5..10);
        node.leaves = (0..leaf_count).map(|_| generate_leaf(palette, rng)).collect();
        return node;
    }

    let branch_count = rng.gen_range(2..=3);
    for _ in 0..branch_count {
        let child_length = length * params.growth_factor * rng.gen_range(0.7_f32..1.0);
        let child_width = width * params.width_factor;
        let angle = rng.gen_range(-params.branch_angle..params.branch_angle);

        if child_length > params.min_length {
            let child = build_branch(child_length, child_width, depth - 1, angle, params, palette, rng);
            node.children.push(child);
        } else {
            node.leaves.push(generate_leaf(palette, rng));
            if rng.gen_bool(0.5) {
                node.leaves.push(generate_leaf(palette, rng));
            }
        }
    }

    node
}
