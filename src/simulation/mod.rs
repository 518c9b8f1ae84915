//! Force Simulation Core.
//!
//! Iteratively moves every unpinned node under four simultaneous forces:
//! link springs, pairwise repulsion, centering, and collision. A decaying
//! energy value (alpha) scales all forces; once it falls below `alpha_min`
//! the layout is settled and, unless running continuously, every node is
//! pinned where it stands.
//!
//! # Lifecycle
//!
//! `Initializing → Running → Settled`, or `Initializing → Running` forever
//! in continuous mode. Raising the alpha target (for example while a node
//! is dragged) moves a settled simulation back to `Running`.

mod forces;
mod random;

pub use forces::Link;
pub use random::Lcg;

use serde::Serialize;

use crate::config::GraphConfig;
use crate::graph::{GraphModel, NodeId};
use crate::spatial::SpatialIndex;

/// Radius of the first node on the initial spiral.
const INITIAL_RADIUS: f64 = 10.0;

/// Golden angle, `π(3 - √5)`.
const INITIAL_ANGLE: f64 = std::f64::consts::PI * 0.763_932_022_500_210_3;

/// Per-node simulation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimNode {
    /// Current x position.
    pub x: f64,
    /// Current y position.
    pub y: f64,
    /// X velocity.
    pub vx: f64,
    /// Y velocity.
    pub vy: f64,
    /// Pinned x coordinate; overrides the solver while set.
    pub fx: Option<f64>,
    /// Pinned y coordinate; overrides the solver while set.
    pub fy: Option<f64>,
    /// Effective collision radius.
    pub radius: f64,
}

impl SimNode {
    /// Create an unpinned node at rest.
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
            radius,
        }
    }

    /// Fix the node at `(x, y)` and move it there.
    pub fn pin(&mut self, x: f64, y: f64) {
        self.fx = Some(x);
        self.fy = Some(y);
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
    }

    /// Return the node to solver control.
    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }

    /// Check if either coordinate is pinned.
    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    /// Advance one step: pinned coordinates snap to the pin, free ones move
    /// by their decayed velocity.
    fn integrate(&mut self, velocity_retention: f64) {
        if let Some(fx) = self.fx {
            self.x = fx;
            self.vx = 0.0;
        } else {
            self.vx *= velocity_retention;
            if !self.vx.is_finite() {
                self.vx = 0.0;
            }
            self.x += self.vx;
        }
        if let Some(fy) = self.fy {
            self.y = fy;
            self.vy = 0.0;
        } else {
            self.vy *= velocity_retention;
            if !self.vy.is_finite() {
                self.vy = 0.0;
            }
            self.y += self.vy;
        }
    }
}

/// Simulation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Built but not yet stepped.
    Initializing,
    /// Stepping; energy above threshold or running continuously.
    Running,
    /// Energy fell below threshold; every node pinned.
    Settled,
}

/// Result of a single [`Simulation::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing happened: the simulation is settled.
    Idle,
    /// Positions advanced.
    Moved,
    /// Positions advanced and this step settled the simulation.
    Settled,
}

/// The force-directed solver for one session.
#[derive(Debug)]
pub struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<Link>,
    alpha: f64,
    alpha_min: f64,
    alpha_decay: f64,
    alpha_target: f64,
    velocity_decay: f64,
    strength: f64,
    center: (f64, f64),
    continuous: bool,
    max_radius: f64,
    iteration: u64,
    phase: Phase,
    random: Lcg,
    spatial: SpatialIndex,
}

impl Simulation {
    /// Build a simulation from a validated model.
    ///
    /// Nodes without a supplied position are placed on a phyllotaxis spiral
    /// around the drawing-area center.
    pub fn new(model: &GraphModel, config: &GraphConfig) -> Self {
        let (cx, cy) = config.center();

        let nodes: Vec<SimNode> = model
            .node_ids()
            .map(|id| {
                let (x, y) = model.initial_position(id).unwrap_or_else(|| {
                    let i = id.index() as f64;
                    let radius = INITIAL_RADIUS * (0.5 + i).sqrt();
                    let angle = i * INITIAL_ANGLE;
                    (cx + radius * angle.cos(), cy + radius * angle.sin())
                });
                SimNode::new(x, y, config.collide_radius(model.radius(id)))
            })
            .collect();

        let degrees: Vec<usize> = model.node_ids().map(|id| model.degree(id)).collect();
        let links = model
            .endpoints()
            .iter()
            .map(|&(s, t)| Link::new(s.index(), t.index(), config.link_distance, &degrees))
            .collect();

        let max_radius = nodes.iter().map(|n| n.radius).fold(0.0, f64::max);
        if config.collision_radius < config.node_radius {
            log::debug!(
                "collision radius {} below node radius {}; using node radius",
                config.collision_radius,
                config.node_radius
            );
        }

        Self {
            nodes,
            links,
            alpha: 1.0,
            alpha_min: config.alpha_min,
            alpha_decay: config.alpha_decay,
            alpha_target: 0.0,
            velocity_decay: config.velocity_decay,
            strength: -config.node_distance,
            center: (cx, cy),
            continuous: config.animate_nodes,
            max_radius,
            iteration: 0,
            phase: Phase::Initializing,
            random: Lcg::default(),
            spatial: SpatialIndex::new(),
        }
    }

    // =========================================================================
    // Stepping
    // =========================================================================

    /// Advance the simulation by one tick.
    pub fn step(&mut self) -> StepOutcome {
        if self.phase == Phase::Settled {
            return StepOutcome::Idle;
        }
        self.phase = Phase::Running;
        self.iteration += 1;

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        forces::apply_links(&mut self.nodes, &self.links, self.alpha, &mut self.random);
        forces::apply_many_body(&mut self.nodes, self.strength, self.alpha, &mut self.random);
        forces::apply_center(&mut self.nodes, self.center.0, self.center.1);
        forces::apply_collide(
            &mut self.nodes,
            &mut self.spatial,
            self.max_radius,
            &mut self.random,
        );

        let retention = 1.0 - self.velocity_decay;
        for node in &mut self.nodes {
            node.integrate(retention);
        }

        if self.alpha < self.alpha_min && !self.continuous {
            self.settle();
            log::info!("simulation settled after {} iterations", self.iteration);
            return StepOutcome::Settled;
        }
        StepOutcome::Moved
    }

    /// Step until settled or `max_iterations` steps have run.
    ///
    /// Returns the number of steps taken.
    pub fn run_until_settled(&mut self, max_iterations: usize) -> usize {
        let mut steps = 0;
        while steps < max_iterations {
            match self.step() {
                StepOutcome::Idle => break,
                StepOutcome::Settled => {
                    steps += 1;
                    break;
                }
                StepOutcome::Moved => steps += 1,
            }
        }
        steps
    }

    /// Pin every node where it stands and stop.
    pub fn settle(&mut self) {
        for node in &mut self.nodes {
            let (x, y) = (node.x, node.y);
            node.pin(x, y);
        }
        self.phase = Phase::Settled;
    }

    /// Set the energy the simulation relaxes toward.
    ///
    /// A positive target wakes a settled simulation.
    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target.max(0.0);
        if target > 0.0 {
            self.restart();
        }
    }

    /// Move a settled simulation back to `Running`.
    pub fn restart(&mut self) {
        if self.phase == Phase::Settled {
            log::debug!("simulation reheated at alpha {:.4}", self.alpha);
            self.phase = Phase::Running;
        }
    }

    // =========================================================================
    // Node Access
    // =========================================================================

    /// Pin a node at `(x, y)`. The position is visible to the very next step.
    pub fn pin(&mut self, id: NodeId, x: f64, y: f64) -> bool {
        match self.nodes.get_mut(id.index()) {
            Some(node) => {
                node.pin(x, y);
                true
            }
            None => false,
        }
    }

    /// Clear a node's pin.
    pub fn unpin(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id.index()) {
            Some(node) => {
                node.unpin();
                true
            }
            None => false,
        }
    }

    /// A single node's state.
    pub fn node(&self, id: NodeId) -> Option<&SimNode> {
        self.nodes.get(id.index())
    }

    /// A node's position.
    pub fn position(&self, id: NodeId) -> Option<(f64, f64)> {
        self.node(id).map(|n| (n.x, n.y))
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current energy.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Energy the simulation relaxes toward.
    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    /// Steps taken so far.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Lifecycle state.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check if the simulation is settled.
    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Settled
    }

    /// Move the centering target (drawing area resized).
    pub fn set_center(&mut self, cx: f64, cy: f64) {
        self.center = (cx, cy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphDescription;

    fn simulation(
        nodes: &[&str],
        links: &[(&str, &str)],
        config: &GraphConfig,
    ) -> (GraphModel, Simulation) {
        let description =
            GraphDescription::from_pairs(nodes.iter().copied(), links.iter().copied());
        let model = GraphModel::from_description(&description).unwrap();
        let sim = Simulation::new(&model, config);
        (model, sim)
    }

    fn settling() -> GraphConfig {
        GraphConfig {
            animate_nodes: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_phase() {
        let (_, mut sim) = simulation(&["a", "b"], &[("a", "b")], &settling());
        assert_eq!(sim.phase(), Phase::Initializing);
        assert_eq!(sim.step(), StepOutcome::Moved);
        assert_eq!(sim.phase(), Phase::Running);
    }

    #[test]
    fn test_initial_spiral_distinct_positions() {
        let (_, sim) = simulation(&["a", "b", "c", "d"], &[], &settling());
        let nodes = sim.nodes();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                assert!(nodes[i].x != nodes[j].x || nodes[i].y != nodes[j].y);
            }
        }
    }

    #[test]
    fn test_settles_in_300_steps_and_pins() {
        let (_, mut sim) = simulation(&["a", "b", "c"], &[("a", "b"), ("b", "c")], &settling());
        let steps = sim.run_until_settled(1_000);
        assert!((299..=301).contains(&steps), "settled after {steps} steps");
        assert!(sim.is_settled());
        for node in sim.nodes() {
            assert_eq!(node.fx, Some(node.x));
            assert_eq!(node.fy, Some(node.y));
        }
        assert_eq!(sim.step(), StepOutcome::Idle);
    }

    #[test]
    fn test_continuous_never_settles() {
        let (_, mut sim) = simulation(&["a", "b"], &[("a", "b")], &GraphConfig::default());
        let steps = sim.run_until_settled(1_000);
        assert_eq!(steps, 1_000);
        assert_eq!(sim.phase(), Phase::Running);
        assert!(sim.nodes().iter().all(|n| !n.is_pinned()));
    }

    #[test]
    fn test_pinned_node_does_not_move() {
        let (model, mut sim) =
            simulation(&["a", "b", "c"], &[("a", "b"), ("b", "c")], &settling());
        let a = model.id_of("a").unwrap();
        sim.pin(a, 42.0, -7.0);
        for _ in 0..50 {
            sim.step();
            assert_eq!(sim.position(a), Some((42.0, -7.0)));
        }
    }

    #[test]
    fn test_linked_nodes_approach_rest_length() {
        let config = GraphConfig {
            node_distance: 0.0,
            animate_nodes: false,
            ..Default::default()
        };
        let (_, mut sim) = simulation(&["a", "b"], &[("a", "b")], &config);
        sim.run_until_settled(1_000);
        let (a, b) = (sim.nodes()[0], sim.nodes()[1]);
        let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
        assert!((d - 30.0).abs() < 1.0, "distance was {d}");
    }

    #[test]
    fn test_centroid_near_center() {
        let (_, mut sim) = simulation(&["a", "b", "c"], &[("a", "b")], &settling());
        sim.run_until_settled(1_000);
        let n = sim.nodes().len() as f64;
        let cx = sim.nodes().iter().map(|n| n.x).sum::<f64>() / n;
        let cy = sim.nodes().iter().map(|n| n.y).sum::<f64>() / n;
        assert!((cx - 400.0).abs() < 1.0);
        assert!((cy - 300.0).abs() < 1.0);
    }

    #[test]
    fn test_alpha_target_wakes_settled_simulation() {
        let (_, mut sim) = simulation(&["a", "b"], &[("a", "b")], &settling());
        sim.run_until_settled(1_000);
        assert!(sim.is_settled());

        sim.set_alpha_target(0.3);
        assert_eq!(sim.phase(), Phase::Running);
        assert_eq!(sim.step(), StepOutcome::Moved);
        assert!(sim.alpha() > sim.alpha_min);

        sim.set_alpha_target(0.0);
        let steps = sim.run_until_settled(1_000);
        assert!(steps > 0 && steps < 1_000);
        assert!(sim.is_settled());
    }

    #[test]
    fn test_unknown_node_pin_ignored() {
        let (_, mut sim) = simulation(&["a"], &[], &settling());
        assert!(!sim.pin(NodeId(5), 0.0, 0.0));
        assert!(!sim.unpin(NodeId(5)));
    }
}
