//! Node dragging.
//!
//! The drag handler never touches simulation state directly: it produces
//! [`Command`]s that the session applies before the next tick.

use super::Command;
use crate::config::GraphConfig;
use crate::graph::NodeId;

/// Energy target while a node is held.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;

/// Drag handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    enabled: bool,
    pull_in: bool,
    active: Option<NodeId>,
}

impl Drag {
    /// Build from the session configuration.
    pub fn new(config: &GraphConfig) -> Self {
        Self {
            enabled: config.enable_drag,
            pull_in: config.pull_in,
            active: None,
        }
    }

    /// Check if dragging is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The node being dragged.
    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Grab a node at `(x, y)` in graph space: pin it there and reheat.
    pub fn start(&mut self, node: NodeId, x: f64, y: f64) -> Vec<Command> {
        if !self.enabled {
            return Vec::new();
        }
        let mut commands = Vec::with_capacity(2);
        match self.active {
            None => commands.push(Command::AlphaTarget(DRAG_ALPHA_TARGET)),
            Some(previous) if previous != node && self.pull_in => {
                commands.push(Command::Unpin { node: previous });
            }
            Some(_) => {}
        }
        self.active = Some(node);
        commands.push(Command::Pin { node, x, y });
        commands
    }

    /// Move the held node.
    pub fn move_to(&mut self, x: f64, y: f64) -> Vec<Command> {
        match self.active {
            Some(node) => vec![Command::Pin { node, x, y }],
            None => Vec::new(),
        }
    }

    /// Release the held node. With pull-in, the solver takes it back.
    pub fn end(&mut self) -> Vec<Command> {
        let Some(node) = self.active.take() else {
            return Vec::new();
        };
        let mut commands = vec![Command::AlphaTarget(0.0)];
        if self.pull_in {
            commands.push(Command::Unpin { node });
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(enabled: bool, pull_in: bool) -> Drag {
        Drag::new(&GraphConfig {
            enable_drag: enabled,
            pull_in,
            ..Default::default()
        })
    }

    #[test]
    fn test_drag_lifecycle_keeps_pin() {
        let mut drag = drag(true, false);
        let a = NodeId(0);

        assert_eq!(
            drag.start(a, 1.0, 2.0),
            vec![
                Command::AlphaTarget(DRAG_ALPHA_TARGET),
                Command::Pin { node: a, x: 1.0, y: 2.0 },
            ]
        );
        assert_eq!(drag.active(), Some(a));
        assert_eq!(drag.move_to(5.0, 6.0), vec![Command::Pin { node: a, x: 5.0, y: 6.0 }]);
        assert_eq!(drag.end(), vec![Command::AlphaTarget(0.0)]);
        assert_eq!(drag.active(), None);
    }

    #[test]
    fn test_pull_in_unpins_on_release() {
        let mut drag = drag(true, true);
        drag.start(NodeId(2), 0.0, 0.0);
        assert_eq!(
            drag.end(),
            vec![Command::AlphaTarget(0.0), Command::Unpin { node: NodeId(2) }]
        );
    }

    #[test]
    fn test_restart_on_other_node_releases_first() {
        let mut pulling = drag(true, true);
        pulling.start(NodeId(0), 0.0, 0.0);
        assert_eq!(
            pulling.start(NodeId(1), 3.0, 4.0),
            vec![
                Command::Unpin { node: NodeId(0) },
                Command::Pin { node: NodeId(1), x: 3.0, y: 4.0 },
            ]
        );
        assert_eq!(pulling.active(), Some(NodeId(1)));
        assert_eq!(
            pulling.end(),
            vec![Command::AlphaTarget(0.0), Command::Unpin { node: NodeId(1) }]
        );

        let mut keeping = drag(true, false);
        keeping.start(NodeId(0), 0.0, 0.0);
        assert_eq!(
            keeping.start(NodeId(1), 3.0, 4.0),
            vec![Command::Pin { node: NodeId(1), x: 3.0, y: 4.0 }]
        );
    }

    #[test]
    fn test_disabled_drag_produces_nothing() {
        let mut drag = drag(false, false);
        assert!(drag.start(NodeId(0), 1.0, 1.0).is_empty());
        assert!(drag.move_to(2.0, 2.0).is_empty());
        assert!(drag.end().is_empty());
    }

    #[test]
    fn test_move_without_start_ignored() {
        let mut drag = drag(true, false);
        assert!(drag.move_to(2.0, 2.0).is_empty());
        assert!(drag.end().is_empty());
    }
}
