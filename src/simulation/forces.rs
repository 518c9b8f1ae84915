//! The four forces applied on every tick.
//!
//! Each force reads node positions and writes velocities, except centering
//! which translates positions directly. Forces are applied in order
//! link → many-body → center → collide, then positions are integrated.

use super::SimNode;
use super::random::Lcg;
use crate::graph::NodeId;
use crate::spatial::SpatialIndex;

/// Minimum squared distance used by the many-body force.
const DISTANCE_MIN_2: f64 = 1.0;

/// A spring between two node slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Source slot.
    pub source: usize,
    /// Target slot.
    pub target: usize,
    /// Rest length.
    pub distance: f64,
    /// Spring stiffness, `1 / min(degree(source), degree(target))`.
    pub strength: f64,
    /// Share of the correction applied to the target, by degree ratio.
    pub bias: f64,
}

impl Link {
    /// Build a link, deriving stiffness and bias from endpoint degrees.
    pub fn new(source: usize, target: usize, distance: f64, degrees: &[usize]) -> Self {
        let ds = degrees.get(source).copied().unwrap_or(1).max(1) as f64;
        let dt = degrees.get(target).copied().unwrap_or(1).max(1) as f64;
        Self {
            source,
            target,
            distance,
            strength: 1.0 / ds.min(dt),
            bias: ds / (ds + dt),
        }
    }
}

/// Pull linked nodes toward their rest length.
pub fn apply_links(nodes: &mut [SimNode], links: &[Link], alpha: f64, random: &mut Lcg) {
    for link in links {
        if link.source == link.target {
            continue;
        }
        let (s, t) = (nodes[link.source], nodes[link.target]);

        let mut x = t.x + t.vx - s.x - s.vx;
        if x == 0.0 {
            x = random.jiggle();
        }
        let mut y = t.y + t.vy - s.y - s.vy;
        if y == 0.0 {
            y = random.jiggle();
        }

        let l = (x * x + y * y).sqrt();
        let k = (l - link.distance) / l * alpha * link.strength;
        x *= k;
        y *= k;

        let target = &mut nodes[link.target];
        target.vx -= x * link.bias;
        target.vy -= y * link.bias;

        let source = &mut nodes[link.source];
        source.vx += x * (1.0 - link.bias);
        source.vy += y * (1.0 - link.bias);
    }
}

/// Pairwise repulsion (negative strength) or attraction (positive).
///
/// Exact O(n²): every node feels every other node.
pub fn apply_many_body(nodes: &mut [SimNode], strength: f64, alpha: f64, random: &mut Lcg) {
    if strength == 0.0 {
        return;
    }
    let n = nodes.len();
    for i in 0..n {
        let (xi, yi) = (nodes[i].x, nodes[i].y);
        let (mut vx, mut vy) = (0.0, 0.0);
        for (j, other) in nodes.iter().enumerate() {
            if i == j {
                continue;
            }
            let mut x = other.x - xi;
            let mut y = other.y - yi;
            let mut l = x * x + y * y;
            if x == 0.0 {
                x = random.jiggle();
                l += x * x;
            }
            if y == 0.0 {
                y = random.jiggle();
                l += y * y;
            }
            if l < DISTANCE_MIN_2 {
                l = (DISTANCE_MIN_2 * l).sqrt();
            }
            let w = strength * alpha / l;
            vx += x * w;
            vy += y * w;
        }
        nodes[i].vx += vx;
        nodes[i].vy += vy;
    }
}

/// Translate every node so the centroid lands on `(cx, cy)`.
pub fn apply_center(nodes: &mut [SimNode], cx: f64, cy: f64) {
    if nodes.is_empty() {
        return;
    }
    let n = nodes.len() as f64;
    let (sx, sy) = nodes
        .iter()
        .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
    let (dx, dy) = (sx / n - cx, sy / n - cy);
    for node in nodes.iter_mut() {
        node.x -= dx;
        node.y -= dy;
    }
}

/// Push apart overlapping circles, using their predicted next positions.
///
/// Candidate pairs come from an R-tree rebuilt over `x + vx, y + vy`;
/// only pairs within `r_i + max_radius` are examined.
pub fn apply_collide(
    nodes: &mut [SimNode],
    spatial: &mut SpatialIndex,
    max_radius: f64,
    random: &mut Lcg,
) {
    if max_radius <= 0.0 {
        return;
    }
    spatial.rebuild(
        nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n.x + n.vx, n.y + n.vy)),
    );

    for i in 0..nodes.len() {
        let ri = nodes[i].radius;
        if ri <= 0.0 {
            continue;
        }
        let xi = nodes[i].x + nodes[i].vx;
        let yi = nodes[i].y + nodes[i].vy;
        let ri2 = ri * ri;

        for j in spatial.in_radius(xi, yi, ri + max_radius) {
            let j = j.index();
            if j <= i {
                continue;
            }
            let rj = nodes[j].radius;
            let r = ri + rj;
            let mut x = xi - nodes[j].x - nodes[j].vx;
            let mut y = yi - nodes[j].y - nodes[j].vy;
            let mut l = x * x + y * y;
            if l >= r * r {
                continue;
            }
            if x == 0.0 {
                x = random.jiggle();
                l += x * x;
            }
            if y == 0.0 {
                y = random.jiggle();
                l += y * y;
            }
            let d = l.sqrt();
            let k = (r - d) / d;
            x *= k;
            y *= k;

            let rj2 = rj * rj;
            let w = rj2 / (ri2 + rj2);
            nodes[i].vx += x * w;
            nodes[i].vy += y * w;
            nodes[j].vx -= x * (1.0 - w);
            nodes[j].vy -= y * (1.0 - w);
        }
    }
}
