//! Session configuration.
//!
//! Every field is optional on the wire; missing fields fall back to the
//! defaults below. A config is handed to the session at start and never
//! shared between sessions.

use serde::{Deserialize, Serialize};

/// Configuration for a layout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
    /// Repulsion strength between every pair of nodes (default: 100).
    /// Larger values push nodes further apart.
    pub node_distance: f64,
    /// Maximum zoom scale. 0 disables zooming (default: 0).
    pub zoom_depth: f64,
    /// Allow zooming out below the base scale (default: false).
    pub enable_zoom_out: bool,
    /// Allow dragging nodes (default: true).
    pub enable_drag: bool,
    /// Opacity applied to nodes and edges not adjacent to the hovered node (default: 1).
    pub hover_opacity: f64,
    /// Keep the simulation running instead of pinning nodes on settle (default: true).
    pub animate_nodes: bool,
    /// Minimum collision radius (default: 0).
    pub collision_radius: f64,
    /// Default node radius (default: 10).
    pub node_radius: f64,
    /// Release a dragged node back to the solver on drag end (default: false).
    pub pull_in: bool,
    /// Drawing area width (default: 800).
    pub width: f64,
    /// Drawing area height (default: 600).
    pub height: f64,
    /// Rest length of every link spring (default: 30).
    pub link_distance: f64,
    /// Energy below which the simulation is settled (default: 0.001).
    pub alpha_min: f64,
    /// Fraction of the remaining energy removed each tick (default: ~0.0228).
    pub alpha_decay: f64,
    /// Fraction of velocity lost each tick (default: 0.4).
    pub velocity_decay: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f64;
        Self {
            node_distance: 100.0,
            zoom_depth: 0.0,
            enable_zoom_out: false,
            enable_drag: true,
            hover_opacity: 1.0,
            animate_nodes: true,
            collision_radius: 0.0,
            node_radius: 10.0,
            pull_in: false,
            width: 800.0,
            height: 600.0,
            link_distance: 30.0,
            alpha_min,
            // Reaches alpha_min from 1 in 300 ticks.
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
        }
    }
}

impl GraphConfig {
    /// Effective collision radius for a node with the given radius override.
    ///
    /// Never below `max(collision_radius, node_radius)`; an override can only
    /// enlarge it.
    pub fn collide_radius(&self, radius: Option<f64>) -> f64 {
        let floor = self.collision_radius.max(self.node_radius);
        radius.map_or(floor, |r| floor.max(r))
    }

    /// Zoom scale bounds, or `None` when zooming is disabled.
    pub fn scale_extent(&self) -> Option<(f64, f64)> {
        if !(self.zoom_depth > 0.0) {
            return None;
        }
        let max = self.zoom_depth.max(1.0);
        let min = if self.enable_zoom_out { 1.0 / max } else { 1.0 };
        Some((min, max))
    }

    /// Hover opacity clamped to `[0, 1]`.
    pub fn dim_opacity(&self) -> f64 {
        self.hover_opacity.clamp(0.0, 1.0)
    }

    /// Target point of the centering force.
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert_eq!(config.node_distance, 100.0);
        assert_eq!(config.zoom_depth, 0.0);
        assert!(!config.enable_zoom_out);
        assert!(config.enable_drag);
        assert_eq!(config.hover_opacity, 1.0);
        assert!(config.animate_nodes);
        assert_eq!(config.collision_radius, 0.0);
        assert_eq!(config.node_radius, 10.0);
        assert!(!config.pull_in);
    }

    #[test]
    fn test_alpha_decay_reaches_min_in_300_ticks() {
        let config = GraphConfig::default();
        let mut alpha = 1.0_f64;
        for _ in 0..300 {
            alpha += (0.0 - alpha) * config.alpha_decay;
        }
        assert!((alpha - config.alpha_min).abs() < 1e-9);
    }

    #[test]
    fn test_collide_radius_uses_max() {
        let config = GraphConfig::default();
        assert_eq!(config.collide_radius(None), 10.0);
        assert_eq!(config.collide_radius(Some(4.0)), 10.0);
        assert_eq!(config.collide_radius(Some(12.0)), 12.0);

        let config = GraphConfig {
            collision_radius: 25.0,
            ..Default::default()
        };
        assert_eq!(config.collide_radius(None), 25.0);
        assert_eq!(config.collide_radius(Some(40.0)), 40.0);
    }

    #[test]
    fn test_scale_extent() {
        assert_eq!(GraphConfig::default().scale_extent(), None);

        let config = GraphConfig {
            zoom_depth: 3.0,
            ..Default::default()
        };
        assert_eq!(config.scale_extent(), Some((1.0, 3.0)));

        let config = GraphConfig {
            zoom_depth: 4.0,
            enable_zoom_out: true,
            ..Default::default()
        };
        assert_eq!(config.scale_extent(), Some((0.25, 4.0)));
    }

    #[test]
    fn test_deserialize_partial_camel_case() {
        let config: GraphConfig =
            serde_json::from_str(r#"{"nodeDistance": 250, "pullIn": true, "zoomDepth": 2}"#)
                .unwrap();
        assert_eq!(config.node_distance, 250.0);
        assert!(config.pull_in);
        assert_eq!(config.zoom_depth, 2.0);
        assert_eq!(config.node_radius, 10.0);
    }
}
