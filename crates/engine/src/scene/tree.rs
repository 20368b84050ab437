use glam::Vec2;

use super::entity::{palette_color, FractalTree, Rgb};
use super::rng::with_seed;

/// One drawn tree segment in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub start: Vec2,
    pub end: Vec2,
    pub width: f32,
    pub color: Rgb,
}

/// Per-node jitter multiplier in `[1 - range, 1 + range]`, derived
/// purely from the node seed. `range == 0` collapses it to exactly 1,
/// which is what makes an unjittered tree perfectly symmetric.
pub fn randomness_factor(seed: u64, range: f32) -> f32 {
    (1.0 - range) + 2.0 * range * ((seed % 101) as f32 / 100.0)
}

struct Node {
    position: Vec2,
    heading_degrees: f32,
    length: f32,
    width: f32,
    depth: u32,
    seed: u64,
}

/// Expands a tree into its segment list. Fully deterministic in the
/// tree parameters: all randomness flows through per-node seeds, never
/// through a shared stream, so two expansions of the same tree are
/// identical no matter what else draws random numbers in between.
pub fn generate(tree: &FractalTree) -> Vec<Branch> {
    let mut branches = Vec::new();
    grow(
        Node {
            position: tree.anchor,
            heading_degrees: tree.orientation_degrees,
            length: tree.length,
            width: tree.width,
            depth: tree.depth,
            seed: tree.seed,
        },
        tree,
        &mut branches,
    );
    branches
}

fn grow(node: Node, tree: &FractalTree, out: &mut Vec<Branch>) {
    if node.depth == 0 || node.length <= 0.0 {
        return;
    }

    // Heading zero points up; positive headings lean clockwise.
    let radians = node.heading_degrees.to_radians();
    let direction = Vec2::new(radians.sin(), radians.cos());
    let end = node.position + direction * node.length;
    out.push(Branch {
        start: node.position,
        end,
        width: node.width,
        color: palette_color(node.seed),
    });

    if node.depth == 1 {
        return;
    }

    let (left_seed, right_seed) =
        with_seed(node.seed, |rng| (rng.next_int() as u64, rng.next_int() as u64));

    for (child_seed, side) in [(left_seed, -1.0), (right_seed, 1.0)] {
        let r = randomness_factor(child_seed, tree.random_range);
        grow(
            Node {
                position: end,
                heading_degrees: node.heading_degrees + side * tree.split_angle * r,
                length: node.length * tree.split_decay * r,
                width: node.width * tree.split_decay * r,
                depth: node.depth - 1,
                seed: child_seed,
            },
            tree,
            out,
        );
    }
}
