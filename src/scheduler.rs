//! Tick Scheduler and the render-binding event contract.
//!
//! The host calls [`TickScheduler::on_frame`] once per animation frame; each
//! call runs at most one simulation step and reports the result through a
//! [`RenderSink`]. Nothing here blocks: between frames control returns to
//! the host's event loop.

use serde::Serialize;
use std::rc::Rc;

use crate::graph::{EdgeId, GraphModel, NodeId};
use crate::interaction::{OpacityMap, ViewTransform};
use crate::simulation::{Phase, Simulation, StepOutcome};

/// A node's position in one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    /// Arena slot.
    pub id: NodeId,
    /// Caller-supplied identity.
    pub key: Rc<str>,
    /// X position in graph space.
    pub x: f64,
    /// Y position in graph space.
    pub y: f64,
}

/// An edge's endpoints in one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePosition {
    /// Position in the input link list.
    pub index: EdgeId,
    /// Source node.
    pub source: NodeId,
    /// Target node.
    pub target: NodeId,
    /// Source x.
    pub x1: f64,
    /// Source y.
    pub y1: f64,
    /// Target x.
    pub x2: f64,
    /// Target y.
    pub y2: f64,
}

/// Positions of every node and edge after one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Session this frame belongs to.
    pub generation: u64,
    /// Simulation step that produced it.
    pub iteration: u64,
    /// Energy after the step.
    pub alpha: f64,
    /// Node positions in arena order.
    pub nodes: Vec<NodePosition>,
    /// Edge endpoints in input order.
    pub edges: Vec<EdgePosition>,
}

impl Frame {
    /// Snapshot the simulation, resolving edge endpoints from node positions.
    pub fn capture(generation: u64, simulation: &Simulation, model: &GraphModel) -> Self {
        let sim_nodes = simulation.nodes();

        let nodes = model
            .node_ids()
            .zip(sim_nodes)
            .filter_map(|(id, node)| {
                model.key(id).map(|key| NodePosition {
                    id,
                    key: Rc::clone(key),
                    x: node.x,
                    y: node.y,
                })
            })
            .collect();

        let edges = model
            .endpoints()
            .iter()
            .enumerate()
            .map(|(i, &(source, target))| {
                let s = &sim_nodes[source.index()];
                let t = &sim_nodes[target.index()];
                EdgePosition {
                    index: EdgeId(i as u32),
                    source,
                    target,
                    x1: s.x,
                    y1: s.y,
                    x2: t.x,
                    y2: t.y,
                }
            })
            .collect();

        Self {
            generation,
            iteration: simulation.iteration(),
            alpha: simulation.alpha(),
            nodes,
            edges,
        }
    }

    /// Position of a node by identity.
    pub fn position(&self, key: &str) -> Option<(f64, f64)> {
        self.nodes
            .iter()
            .find(|n| &*n.key == key)
            .map(|n| (n.x, n.y))
    }
}

/// Everything the engine tells the render binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GraphEvent {
    /// Positions after a simulation step.
    Frame(Frame),
    /// The simulation settled; no more frames until it is woken.
    Stopped {
        /// Session that settled.
        generation: u64,
        /// Steps taken.
        iterations: u64,
    },
    /// Show or hide the loading indicator.
    Loading {
        /// Whether the indicator should be shown.
        visible: bool,
    },
    /// Hover highlighting changed.
    Opacity(OpacityMap),
    /// The view transform changed.
    Transform(ViewTransform),
}

/// Observer that receives engine events.
pub trait RenderSink {
    /// Deliver one event.
    fn emit(&mut self, event: GraphEvent);
}

impl<F: FnMut(GraphEvent)> RenderSink for F {
    fn emit(&mut self, event: GraphEvent) {
        self(event)
    }
}

/// Drives one session's simulation, one step per frame.
#[derive(Debug)]
pub struct TickScheduler {
    simulation: Simulation,
    generation: u64,
    cancelled: bool,
    loading: bool,
}

impl TickScheduler {
    /// Create a scheduler for a session.
    ///
    /// When `loading` is set, the loading indicator is hidden on settle.
    pub fn new(simulation: Simulation, generation: u64, loading: bool) -> Self {
        Self {
            simulation,
            generation,
            cancelled: false,
            loading,
        }
    }

    /// Run one step and report it. Returns true while more frames are wanted.
    pub fn on_frame(&mut self, model: &GraphModel, sink: &mut dyn RenderSink) -> bool {
        if self.cancelled {
            return false;
        }
        match self.simulation.step() {
            StepOutcome::Idle => false,
            StepOutcome::Moved => {
                sink.emit(GraphEvent::Frame(self.frame(model)));
                true
            }
            StepOutcome::Settled => {
                sink.emit(GraphEvent::Frame(self.frame(model)));
                self.emit_stopped(sink);
                false
            }
        }
    }

    /// Pin every node now and stop, as if the energy had decayed.
    pub fn settle_now(&mut self, model: &GraphModel, sink: &mut dyn RenderSink) {
        if self.cancelled || self.simulation.is_settled() {
            return;
        }
        self.simulation.settle();
        sink.emit(GraphEvent::Frame(self.frame(model)));
        self.emit_stopped(sink);
    }

    fn emit_stopped(&mut self, sink: &mut dyn RenderSink) {
        sink.emit(GraphEvent::Stopped {
            generation: self.generation,
            iterations: self.simulation.iteration(),
        });
        if self.loading {
            self.loading = false;
            sink.emit(GraphEvent::Loading { visible: false });
        }
    }

    /// Stop scheduling for good; later frames are no-ops.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Check if more frames are wanted.
    pub fn is_active(&self) -> bool {
        !self.cancelled && !self.simulation.is_settled()
    }

    /// Snapshot the current positions.
    pub fn frame(&self, model: &GraphModel) -> Frame {
        Frame::capture(self.generation, &self.simulation, model)
    }

    /// Session generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Lifecycle state of the driven simulation.
    pub fn phase(&self) -> Phase {
        self.simulation.phase()
    }

    /// The driven simulation.
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Mutable access for applying gesture commands between frames.
    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }
}
