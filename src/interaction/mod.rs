//! Interaction Controller: zoom, hover and drag.
//!
//! Zoom and hover only touch view state and answer immediately with a
//! [`GraphEvent`]. Drag affects the simulation, so it is modelled as a
//! producer of [`Command`]s queued here and applied by the session before
//! the next tick; the simulation keeps a single writer per tick.
//!
//! Besides the gesture-level API, the controller routes raw pointer input
//! (down/move/up/leave in screen coordinates) to the right handler: a press
//! on a node drags it, a press on the background pans, and an idle move
//! updates hover.

mod drag;
mod hover;
mod view;
mod zoom;

pub use drag::{DRAG_ALPHA_TARGET, Drag};
pub use hover::{Hover, OpacityMap};
pub use view::ViewTransform;
pub use zoom::{DeltaMode, Zoom};

use std::collections::VecDeque;

use crate::config::GraphConfig;
use crate::graph::{GraphModel, NodeId};
use crate::scheduler::GraphEvent;

/// A mutation requested by a gesture, applied before the next tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Pin a node at a graph-space position.
    Pin {
        /// Node to pin.
        node: NodeId,
        /// Pinned x.
        x: f64,
        /// Pinned y.
        y: f64,
    },
    /// Return a node to solver control.
    Unpin {
        /// Node to release.
        node: NodeId,
    },
    /// Set the energy the simulation relaxes toward.
    AlphaTarget(f64),
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    /// Offset from the pointer to the grabbed node's center, in graph space.
    Dragging { dx: f64, dy: f64 },
    /// Last pointer position, in screen space.
    Panning { sx: f64, sy: f64 },
}

/// Zoom, hover and drag handlers plus the shared view transform.
#[derive(Debug, Clone)]
pub struct InteractionController {
    view: ViewTransform,
    zoom: Zoom,
    hover: Hover,
    drag: Drag,
    gesture: Gesture,
    queue: VecDeque<Command>,
}

impl InteractionController {
    /// Build handlers from the session configuration.
    pub fn new(config: &GraphConfig) -> Self {
        Self {
            view: ViewTransform::IDENTITY,
            zoom: Zoom::new(config),
            hover: Hover::new(config),
            drag: Drag::new(config),
            gesture: Gesture::Idle,
            queue: VecDeque::new(),
        }
    }

    /// Current view transform.
    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Put back a view the render binding still shows, without an event.
    pub fn restore_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    /// Currently hovered node.
    pub fn hovered(&self) -> Option<NodeId> {
        self.hover.hovered()
    }

    /// Node being dragged.
    pub fn dragging(&self) -> Option<NodeId> {
        self.drag.active()
    }

    // =========================================================================
    // Zoom
    // =========================================================================

    fn set_view(&mut self, view: Option<ViewTransform>) -> Option<GraphEvent> {
        let view = view?;
        self.view = view;
        Some(GraphEvent::Transform(view))
    }

    /// Wheel increment about a screen point.
    pub fn wheel(
        &mut self,
        delta_y: f64,
        mode: DeltaMode,
        sx: f64,
        sy: f64,
    ) -> Option<GraphEvent> {
        let view = self.zoom.wheel(&self.view, delta_y, mode, sx, sy);
        self.set_view(view)
    }

    /// Pinch increment about a screen point.
    pub fn pinch(&mut self, ratio: f64, sx: f64, sy: f64) -> Option<GraphEvent> {
        let view = self.zoom.pinch(&self.view, ratio, sx, sy);
        self.set_view(view)
    }

    /// Pan by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Option<GraphEvent> {
        let view = self.zoom.pan(&self.view, dx, dy);
        self.set_view(view)
    }

    // =========================================================================
    // Hover
    // =========================================================================

    /// Pointer entered a node.
    pub fn hover_enter(&mut self, model: &GraphModel, node: NodeId) -> Option<GraphEvent> {
        self.hover.enter(model, node).map(GraphEvent::Opacity)
    }

    /// Pointer left the hovered node.
    pub fn hover_leave(&mut self, model: &GraphModel) -> Option<GraphEvent> {
        self.hover.leave(model).map(GraphEvent::Opacity)
    }

    // =========================================================================
    // Drag
    // =========================================================================

    /// Start dragging a node at a graph-space position.
    pub fn drag_start(&mut self, node: NodeId, x: f64, y: f64) -> bool {
        let commands = self.drag.start(node, x, y);
        self.enqueue(commands)
    }

    /// Move the dragged node to a graph-space position.
    pub fn drag_move(&mut self, x: f64, y: f64) -> bool {
        let commands = self.drag.move_to(x, y);
        self.enqueue(commands)
    }

    /// Release the dragged node.
    pub fn drag_end(&mut self) -> bool {
        let commands = self.drag.end();
        self.enqueue(commands)
    }

    fn enqueue(&mut self, commands: Vec<Command>) -> bool {
        let queued = !commands.is_empty();
        self.queue.extend(commands);
        queued
    }

    /// Take every pending command, oldest first.
    pub fn drain_commands(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.queue.drain(..)
    }

    /// Check if commands are waiting for the next tick.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    // =========================================================================
    // Pointer Routing
    // =========================================================================

    /// Pointer pressed at a screen position. `hit` is the node under the
    /// pointer with its current graph-space position.
    pub fn pointer_down(&mut self, sx: f64, sy: f64, hit: Option<(NodeId, f64, f64)>) {
        if let Some((node, nx, ny)) = hit
            && self.drag.is_enabled()
        {
            let (gx, gy) = self.view.invert(sx, sy);
            self.gesture = Gesture::Dragging {
                dx: nx - gx,
                dy: ny - gy,
            };
            self.drag_start(node, nx, ny);
        } else if self.zoom.is_enabled() {
            self.gesture = Gesture::Panning { sx, sy };
        }
    }

    /// Pointer moved to a screen position. `hit` is the node under it.
    pub fn pointer_move(
        &mut self,
        model: &GraphModel,
        sx: f64,
        sy: f64,
        hit: Option<NodeId>,
    ) -> Option<GraphEvent> {
        match self.gesture {
            Gesture::Dragging { dx, dy } => {
                let (gx, gy) = self.view.invert(sx, sy);
                self.drag_move(gx + dx, gy + dy);
                None
            }
            Gesture::Panning { sx: last_x, sy: last_y } => {
                self.gesture = Gesture::Panning { sx, sy };
                self.pan(sx - last_x, sy - last_y)
            }
            Gesture::Idle => {
                if hit == self.hover.hovered() {
                    return None;
                }
                match hit {
                    Some(node) => self.hover_enter(model, node),
                    None => self.hover_leave(model),
                }
            }
        }
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        if let Gesture::Dragging { .. } = self.gesture {
            self.drag_end();
        }
        self.gesture = Gesture::Idle;
    }

    /// Pointer left the drawing area.
    pub fn pointer_leave(&mut self, model: &GraphModel) -> Option<GraphEvent> {
        self.pointer_up();
        self.hover_leave(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphDescription;

    fn model() -> GraphModel {
        let description = GraphDescription::from_pairs(["a", "b", "c"], [("a", "b")]);
        GraphModel::from_description(&description).unwrap()
    }

    fn controller(config: GraphConfig) -> InteractionController {
        InteractionController::new(&config)
    }

    #[test]
    fn test_press_on_node_drags_with_grab_offset() {
        let mut ctl = controller(GraphConfig::default());
        let model = model();

        ctl.pointer_down(102.0, 98.0, Some((NodeId(0), 100.0, 100.0)));
        assert_eq!(ctl.dragging(), Some(NodeId(0)));

        ctl.pointer_move(&model, 152.0, 48.0, None);
        ctl.pointer_up();

        let commands: Vec<_> = ctl.drain_commands().collect();
        assert_eq!(
            commands,
            vec![
                Command::AlphaTarget(DRAG_ALPHA_TARGET),
                Command::Pin { node: NodeId(0), x: 100.0, y: 100.0 },
                Command::Pin { node: NodeId(0), x: 150.0, y: 50.0 },
                Command::AlphaTarget(0.0),
            ]
        );
        assert!(!ctl.has_pending());
        assert_eq!(ctl.dragging(), None);
    }

    #[test]
    fn test_drag_respects_zoom() {
        let mut ctl = controller(GraphConfig {
            zoom_depth: 4.0,
            ..Default::default()
        });
        let model = model();
        ctl.pinch(2.0, 0.0, 0.0);
        assert_eq!(ctl.view().k, 2.0);

        // Node at graph (50, 50) is drawn at screen (100, 100)
        ctl.pointer_down(100.0, 100.0, Some((NodeId(1), 50.0, 50.0)));
        ctl.pointer_move(&model, 120.0, 100.0, None);
        let last = ctl.drain_commands().last();
        assert_eq!(last, Some(Command::Pin { node: NodeId(1), x: 60.0, y: 50.0 }));
    }

    #[test]
    fn test_press_on_background_pans_when_zoom_enabled() {
        let mut ctl = controller(GraphConfig {
            zoom_depth: 2.0,
            ..Default::default()
        });
        let model = model();
        ctl.pointer_down(10.0, 10.0, None);
        let event = ctl.pointer_move(&model, 25.0, 5.0, None);
        let expected = ViewTransform {
            x: 15.0,
            y: -5.0,
            k: 1.0,
        };
        assert_eq!(event, Some(GraphEvent::Transform(expected)));
        assert_eq!(ctl.view(), expected);
    }

    #[test]
    fn test_background_press_without_zoom_does_nothing() {
        let mut ctl = controller(GraphConfig::default());
        let model = model();
        ctl.pointer_down(10.0, 10.0, None);
        assert_eq!(ctl.pointer_move(&model, 25.0, 5.0, None), None);
        assert_eq!(ctl.view(), ViewTransform::IDENTITY);
    }

    #[test]
    fn test_idle_move_updates_hover_on_change_only() {
        let mut ctl = controller(GraphConfig {
            hover_opacity: 0.5,
            ..Default::default()
        });
        let model = model();

        let Some(GraphEvent::Opacity(map)) = ctl.pointer_move(&model, 0.0, 0.0, Some(NodeId(0)))
        else {
            panic!("expected opacity event");
        };
        assert_eq!(map.nodes, vec![1.0, 1.0, 0.5]);
        assert_eq!(ctl.pointer_move(&model, 1.0, 0.0, Some(NodeId(0))), None);

        let Some(GraphEvent::Opacity(map)) = ctl.pointer_leave(&model) else {
            panic!("expected opacity event");
        };
        assert!(map.nodes.iter().all(|&o| o == 1.0));
    }

    #[test]
    fn test_disabled_drag_press_on_node_is_not_a_drag() {
        let mut ctl = controller(GraphConfig {
            enable_drag: false,
            ..Default::default()
        });
        ctl.pointer_down(0.0, 0.0, Some((NodeId(0), 0.0, 0.0)));
        assert_eq!(ctl.dragging(), None);
        assert!(!ctl.has_pending());
    }
}
