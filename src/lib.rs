//! Force Graph Engine - WASM Module
//!
//! This crate positions the nodes of a node-link graph with an iterative
//! force simulation and lets a user perturb it (drag, zoom, hover) while it
//! runs or after it settles. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen; rendering stays on the JS side,
//! which receives positions, opacities and view transforms as events.
//!
//! # Architecture
//!
//! - `graph`: Graph Model using petgraph's StableGraph
//! - `spatial`: R-tree spatial indexing for collision and hit testing
//! - `simulation`: Force Simulation Core (link, many-body, center, collide)
//! - `scheduler`: Tick Scheduler and the emitted event contract
//! - `interaction`: Zoom, hover and drag handlers
//! - `session`: `ForceGraph`, the layout session tying it all together

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod scheduler;
pub mod session;
pub mod simulation;
pub mod spatial;

pub use config::GraphConfig;
pub use error::{Error, Result};
pub use graph::{GraphDescription, GraphModel, NodeId};
pub use interaction::{DeltaMode, ViewTransform};
pub use scheduler::{Frame, GraphEvent, RenderSink};
pub use session::ForceGraph;
pub use simulation::Phase;

/// Initialize the WASM module: console logging and panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    let _ = console_log::init_with_level(log::Level::Debug);
    console_error_panic_hook::set_once();
}

/// Decode an optional JS value, treating `null`/`undefined` as absent.
fn decode<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<Option<T>> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map(Some)
        .map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Main entry point for the layout engine.
///
/// Every call that can produce events returns them as an array of tagged
/// objects (`{type: "frame", ...}`, `{type: "stopped", ...}`, ...), in the
/// order they were emitted.
#[wasm_bindgen]
pub struct ForceGraphWasm {
    graph: ForceGraph,
}

impl ForceGraphWasm {
    fn collect(
        &mut self,
        f: impl FnOnce(&mut ForceGraph, &mut dyn RenderSink),
    ) -> std::result::Result<JsValue, JsError> {
        let mut events: Vec<GraphEvent> = Vec::new();
        f(&mut self.graph, &mut |e: GraphEvent| events.push(e));
        Ok(serde_wasm_bindgen::to_value(&events)?)
    }
}

#[wasm_bindgen]
impl ForceGraphWasm {
    /// Create an idle engine. `config` may be omitted for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<ForceGraphWasm, JsError> {
        let config: GraphConfig = decode(config)?.unwrap_or_default();
        Ok(Self {
            graph: ForceGraph::new(config),
        })
    }

    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Start a session for `{nodes, links}`, replacing any running one.
    ///
    /// Throws if an edge names an unknown node; `null` or an empty node
    /// list leaves the engine idle.
    #[wasm_bindgen(js_name = setGraph)]
    pub fn set_graph(&mut self, data: JsValue) -> std::result::Result<JsValue, JsError> {
        let description: Option<GraphDescription> = decode(data)?;
        let mut result = Ok(());
        let events = self.collect(|graph, sink| {
            result = graph.set_graph(description.as_ref(), sink);
        })?;
        result?;
        Ok(events)
    }

    /// Replace the configuration and restart the current graph under it.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> std::result::Result<JsValue, JsError> {
        let config: GraphConfig = decode(config)?.unwrap_or_default();
        let mut result = Ok(());
        let events = self.collect(|graph, sink| {
            result = graph.set_config(config, sink);
        })?;
        result?;
        Ok(events)
    }

    /// Cancel the running session.
    pub fn stop(&mut self) {
        self.graph.stop();
    }

    /// Resize the drawing area.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.graph.resize(width, height);
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Run one animation frame. Call from `requestAnimationFrame` while
    /// `isActive()` is true.
    pub fn tick(&mut self) -> std::result::Result<JsValue, JsError> {
        self.collect(|graph, sink| {
            graph.tick(sink);
        })
    }

    /// Tick until settled without emitting frames; returns frames run.
    #[wasm_bindgen(js_name = runUntilSettled)]
    pub fn run_until_settled(&mut self, max_frames: usize) -> usize {
        self.graph.run_until_settled(max_frames, &mut |_: GraphEvent| {})
    }

    /// Pin every node where it stands and stop.
    #[wasm_bindgen(js_name = settleNow)]
    pub fn settle_now(&mut self) -> std::result::Result<JsValue, JsError> {
        self.collect(|graph, sink| graph.settle_now(sink))
    }

    /// Check if more frames are wanted.
    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.graph.is_active()
    }

    /// Generation of the latest started session.
    pub fn generation(&self) -> u64 {
        self.graph.generation()
    }

    /// Lifecycle state: "initializing", "running", "settled", or undefined.
    pub fn phase(&self) -> std::result::Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.graph.phase())?)
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Wheel zoom. `delta_mode` is the DOM `WheelEvent.deltaMode`.
    pub fn wheel(
        &mut self,
        delta_y: f64,
        delta_mode: u32,
        sx: f64,
        sy: f64,
    ) -> std::result::Result<JsValue, JsError> {
        let mode = DeltaMode::from_dom(delta_mode);
        self.collect(|graph, sink| graph.wheel(delta_y, mode, sx, sy, sink))
    }

    /// Pinch zoom by a distance ratio about a screen point.
    pub fn pinch(&mut self, ratio: f64, sx: f64, sy: f64) -> std::result::Result<JsValue, JsError> {
        self.collect(|graph, sink| graph.pinch(ratio, sx, sy, sink))
    }

    /// Pan by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> std::result::Result<JsValue, JsError> {
        self.collect(|graph, sink| graph.pan(dx, dy, sink))
    }

    /// Pointer entered the node with identity `key`.
    #[wasm_bindgen(js_name = hoverEnter)]
    pub fn hover_enter(&mut self, key: &str) -> std::result::Result<JsValue, JsError> {
        self.collect(|graph, sink| graph.hover_enter(key, sink))
    }

    /// Pointer left the hovered node.
    #[wasm_bindgen(js_name = hoverLeave)]
    pub fn hover_leave(&mut self) -> std::result::Result<JsValue, JsError> {
        self.collect(|graph, sink| graph.hover_leave(sink))
    }

    /// Start dragging a node at a graph-space position.
    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, key: &str, x: f64, y: f64) -> bool {
        self.graph.drag_start(key, x, y)
    }

    /// Move the dragged node.
    #[wasm_bindgen(js_name = dragMove)]
    pub fn drag_move(&mut self, x: f64, y: f64) -> bool {
        self.graph.drag_move(x, y)
    }

    /// Release the dragged node.
    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self) -> bool {
        self.graph.drag_end()
    }

    // =========================================================================
    // Pointer Input
    // =========================================================================

    /// Pointer pressed at a screen position.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, sx: f64, sy: f64) {
        self.graph.pointer_down(sx, sy);
    }

    /// Pointer moved to a screen position.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, sx: f64, sy: f64) -> std::result::Result<JsValue, JsError> {
        self.collect(|graph, sink| graph.pointer_move(sx, sy, sink))
    }

    /// Pointer released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.graph.pointer_up();
    }

    /// Pointer left the drawing area.
    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) -> std::result::Result<JsValue, JsError> {
        self.collect(|graph, sink| graph.pointer_leave(sink))
    }

    /// Identity of the node drawn under a screen point.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&mut self, sx: f64, sy: f64) -> Option<String> {
        let id = self.graph.node_at(sx, sy)?;
        self.graph.model()?.key(id).map(|k| k.to_string())
    }

    // =========================================================================
    // Position Access
    // =========================================================================

    /// Current positions as [x0, y0, x1, y1, ...] in input order.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float64Array {
        let positions: Vec<f64> = self
            .graph
            .simulation()
            .map(|sim| sim.nodes().iter().flat_map(|n| [n.x, n.y]).collect())
            .unwrap_or_default();
        Float64Array::from(&positions[..])
    }

    /// Current edge endpoints as [x1, y1, x2, y2, ...] in input order.
    #[wasm_bindgen(js_name = getEdgeEndpoints)]
    pub fn get_edge_endpoints(&self) -> Float64Array {
        let endpoints: Vec<f64> = self
            .graph
            .frame()
            .map(|frame| {
                frame
                    .edges
                    .iter()
                    .flat_map(|e| [e.x1, e.y1, e.x2, e.y2])
                    .collect()
            })
            .unwrap_or_default();
        Float64Array::from(&endpoints[..])
    }

    /// Position of a node by identity, as [x, y].
    #[wasm_bindgen(js_name = getPosition)]
    pub fn get_position(&self, key: &str) -> Option<Vec<f64>> {
        self.graph.position(key).map(|(x, y)| vec![x, y])
    }

    /// The view transform as an SVG/canvas matrix [a, b, c, d, e, f].
    #[wasm_bindgen(js_name = viewMatrix)]
    pub fn view_matrix(&self) -> Vec<f64> {
        self.graph.view().matrix().to_vec()
    }
}
