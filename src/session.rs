//! ForceGraph - one layout session and everything it owns.
//!
//! A session ties together the validated [`GraphModel`], the
//! [`TickScheduler`] driving its [`Simulation`], and the
//! [`InteractionController`]. All mutation happens on the caller's thread:
//! gestures enqueue commands, and [`ForceGraph::tick`] applies them before
//! stepping, so a drag-move between two frames is seen by the very next step.
//!
//! Replacing the graph cancels the running scheduler before the new one is
//! built; two sessions never tick in the same frame.

use crate::config::GraphConfig;
use crate::error::Result;
use crate::graph::{GraphDescription, GraphModel, NodeId};
use crate::interaction::{Command, DeltaMode, InteractionController, ViewTransform};
use crate::scheduler::{Frame, GraphEvent, RenderSink, TickScheduler};
use crate::simulation::{Phase, Simulation};
use crate::spatial::SpatialIndex;

/// Model and scheduler of the running session.
#[derive(Debug)]
struct Session {
    model: GraphModel,
    scheduler: TickScheduler,
}

/// The force-directed layout engine.
#[derive(Debug)]
pub struct ForceGraph {
    config: GraphConfig,
    description: Option<GraphDescription>,
    generation: u64,
    session: Option<Session>,
    controller: InteractionController,
    /// Node positions as of the last hit-test, rebuilt lazily after a tick.
    hit_index: SpatialIndex,
    hit_dirty: bool,
}

impl Default for ForceGraph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl ForceGraph {
    /// Create an idle engine. Nothing happens until a graph is supplied.
    pub fn new(config: GraphConfig) -> Self {
        let controller = InteractionController::new(&config);
        Self {
            config,
            description: None,
            generation: 0,
            session: None,
            controller,
            hit_index: SpatialIndex::new(),
            hit_dirty: true,
        }
    }

    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Start a session for a graph, replacing any running one.
    ///
    /// `None` or a graph with no nodes leaves the engine idle and emits
    /// nothing. An invalid graph is rejected before any simulation runs; the
    /// previous session is discarded either way. The view is reset only when
    /// a new session starts.
    pub fn set_graph(
        &mut self,
        description: Option<&GraphDescription>,
        sink: &mut dyn RenderSink,
    ) -> Result<()> {
        let previous_view = self.controller.view();
        self.stop();

        let Some(description) = description.filter(|d| !d.is_empty()) else {
            log::debug!("no graph data; engine idle");
            self.controller.restore_view(previous_view);
            return Ok(());
        };

        let model = match GraphModel::from_description(description) {
            Ok(model) => model,
            Err(err) => {
                self.controller.restore_view(previous_view);
                return Err(err);
            }
        };
        let simulation = Simulation::new(&model, &self.config);
        let loading = !self.config.animate_nodes;

        self.generation += 1;
        log::debug!(
            "session {} started with {} nodes and {} edges",
            self.generation,
            model.node_count(),
            model.edge_count()
        );

        if previous_view != ViewTransform::IDENTITY {
            sink.emit(GraphEvent::Transform(ViewTransform::IDENTITY));
        }
        if loading {
            sink.emit(GraphEvent::Loading { visible: true });
        }

        self.description = Some(description.clone());
        self.session = Some(Session {
            model,
            scheduler: TickScheduler::new(simulation, self.generation, loading),
        });
        Ok(())
    }

    /// Replace the configuration and restart the current graph under it.
    pub fn set_config(&mut self, config: GraphConfig, sink: &mut dyn RenderSink) -> Result<()> {
        self.config = config;
        let description = self.description.take();
        self.set_graph(description.as_ref(), sink)
    }

    /// Cancel the running session and reset interaction state.
    pub fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.scheduler.cancel();
            log::debug!("session {} cancelled", session.scheduler.generation());
        }
        self.description = None;
        self.controller = InteractionController::new(&self.config);
        self.hit_index.clear();
        self.hit_dirty = true;
    }

    /// Resize the drawing area; the centering force follows.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.width = width;
        self.config.height = height;
        let (cx, cy) = self.config.center();
        if let Some(session) = self.session.as_mut() {
            session.scheduler.simulation_mut().set_center(cx, cy);
        }
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Run one animation frame: apply queued gestures, then step once.
    ///
    /// Returns true while more frames are wanted.
    pub fn tick(&mut self, sink: &mut dyn RenderSink) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Session { model, scheduler } = session;

        let simulation = scheduler.simulation_mut();
        for command in self.controller.drain_commands() {
            let applied = match command {
                Command::Pin { node, x, y } => simulation.pin(node, x, y),
                Command::Unpin { node } => simulation.unpin(node),
                Command::AlphaTarget(target) => {
                    simulation.set_alpha_target(target);
                    true
                }
            };
            if !applied {
                log::warn!("dropping {:?}: node not in session", command);
            }
        }

        self.hit_dirty = true;
        scheduler.on_frame(model, sink)
    }

    /// Tick until settled or `max_frames` frames have run.
    ///
    /// Returns the number of frames that stepped the simulation.
    pub fn run_until_settled(&mut self, max_frames: usize, sink: &mut dyn RenderSink) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.is_active() {
            frames += 1;
            if !self.tick(sink) {
                break;
            }
        }
        frames
    }

    /// Pin every node where it stands and stop now.
    pub fn settle_now(&mut self, sink: &mut dyn RenderSink) {
        if let Some(session) = self.session.as_mut() {
            session.scheduler.settle_now(&session.model, sink);
            self.hit_dirty = true;
        }
    }

    /// Check if the host should keep requesting frames.
    pub fn is_active(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.scheduler.is_active())
            || self.controller.has_pending()
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Wheel zoom about a screen point.
    pub fn wheel(
        &mut self,
        delta_y: f64,
        mode: DeltaMode,
        sx: f64,
        sy: f64,
        sink: &mut dyn RenderSink,
    ) {
        if let Some(event) = self.controller.wheel(delta_y, mode, sx, sy) {
            sink.emit(event);
        }
    }

    /// Pinch zoom about a screen point.
    pub fn pinch(&mut self, ratio: f64, sx: f64, sy: f64, sink: &mut dyn RenderSink) {
        if let Some(event) = self.controller.pinch(ratio, sx, sy) {
            sink.emit(event);
        }
    }

    /// Pan the view by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64, sink: &mut dyn RenderSink) {
        if let Some(event) = self.controller.pan(dx, dy) {
            sink.emit(event);
        }
    }

    /// Pointer entered the node with identity `key`.
    pub fn hover_enter(&mut self, key: &str, sink: &mut dyn RenderSink) {
        let Some((model, node)) = resolve(self.session.as_ref(), key) else {
            return;
        };
        if let Some(event) = self.controller.hover_enter(model, node) {
            sink.emit(event);
        }
    }

    /// Pointer left the hovered node.
    pub fn hover_leave(&mut self, sink: &mut dyn RenderSink) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if let Some(event) = self.controller.hover_leave(&session.model) {
            sink.emit(event);
        }
    }

    /// Start dragging the node with identity `key` at a graph-space position.
    pub fn drag_start(&mut self, key: &str, x: f64, y: f64) -> bool {
        match resolve(self.session.as_ref(), key) {
            Some((_, node)) => self.controller.drag_start(node, x, y),
            None => false,
        }
    }

    /// Move the dragged node to a graph-space position.
    pub fn drag_move(&mut self, x: f64, y: f64) -> bool {
        self.controller.drag_move(x, y)
    }

    /// Release the dragged node.
    pub fn drag_end(&mut self) -> bool {
        self.controller.drag_end()
    }

    // =========================================================================
    // Pointer Input
    // =========================================================================

    /// Node drawn under a screen point, if any.
    pub fn node_at(&mut self, sx: f64, sy: f64) -> Option<NodeId> {
        let session = self.session.as_ref()?;
        if self.hit_dirty {
            let positions = session.scheduler.simulation().nodes();
            self.hit_index.rebuild(
                positions
                    .iter()
                    .enumerate()
                    .map(|(i, n)| (NodeId(i as u32), n.x, n.y)),
            );
            self.hit_dirty = false;
        }

        let (gx, gy) = self.controller.view().invert(sx, sy);
        let radius_of = |id: NodeId| session.model.radius(id).unwrap_or(self.config.node_radius);
        let max_radius = session
            .model
            .node_ids()
            .map(radius_of)
            .fold(0.0, f64::max);

        self.hit_index
            .nearest_first(gx, gy, max_radius)
            .into_iter()
            .find(|&(id, d2)| {
                let r = radius_of(id);
                d2 <= r * r
            })
            .map(|(id, _)| id)
    }

    /// Pointer pressed at a screen position.
    pub fn pointer_down(&mut self, sx: f64, sy: f64) {
        let hit = self.node_at(sx, sy).and_then(|id| {
            let session = self.session.as_ref()?;
            let (x, y) = session.scheduler.simulation().position(id)?;
            Some((id, x, y))
        });
        self.controller.pointer_down(sx, sy, hit);
    }

    /// Pointer moved to a screen position.
    pub fn pointer_move(&mut self, sx: f64, sy: f64, sink: &mut dyn RenderSink) {
        let hit = self.node_at(sx, sy);
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if let Some(event) = self.controller.pointer_move(&session.model, sx, sy, hit) {
            sink.emit(event);
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        self.controller.pointer_up();
    }

    /// Pointer left the drawing area.
    pub fn pointer_leave(&mut self, sink: &mut dyn RenderSink) {
        let Some(session) = self.session.as_ref() else {
            self.controller.pointer_up();
            return;
        };
        if let Some(event) = self.controller.pointer_leave(&session.model) {
            sink.emit(event);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Generation of the latest started session.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Lifecycle state of the running simulation.
    pub fn phase(&self) -> Option<Phase> {
        self.session.as_ref().map(|s| s.scheduler.phase())
    }

    /// The running session's model.
    pub fn model(&self) -> Option<&GraphModel> {
        self.session.as_ref().map(|s| &s.model)
    }

    /// The running simulation.
    pub fn simulation(&self) -> Option<&Simulation> {
        self.session.as_ref().map(|s| s.scheduler.simulation())
    }

    /// Snapshot of the current positions.
    pub fn frame(&self) -> Option<Frame> {
        self.session
            .as_ref()
            .map(|s| s.scheduler.frame(&s.model))
    }

    /// Position of a node by identity.
    pub fn position(&self, key: &str) -> Option<(f64, f64)> {
        let session = self.session.as_ref()?;
        let id = session.model.id_of(key)?;
        session.scheduler.simulation().position(id)
    }

    /// Current view transform.
    pub fn view(&self) -> ViewTransform {
        self.controller.view()
    }

    /// Currently hovered node.
    pub fn hovered(&self) -> Option<NodeId> {
        self.controller.hovered()
    }
}

/// Look up a gesture's node by identity, warning when it is unknown.
fn resolve<'a>(session: Option<&'a Session>, key: &str) -> Option<(&'a GraphModel, NodeId)> {
    let session = session?;
    match session.model.id_of(key) {
        Some(node) => Some((&session.model, node)),
        None => {
            log::warn!("gesture names unknown node {:?}", key);
            None
        }
    }
}
