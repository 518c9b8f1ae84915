//! Wheel and pinch zoom, plus background panning.

use serde::{Deserialize, Serialize};

use super::view::ViewTransform;
use crate::config::GraphConfig;

/// Unit of a wheel delta, as reported by DOM `WheelEvent.deltaMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeltaMode {
    /// Pixels.
    #[default]
    Pixel,
    /// Lines.
    Line,
    /// Pages.
    Page,
}

impl DeltaMode {
    /// Map a raw DOM `deltaMode` value.
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }

    /// Exponent per delta unit.
    fn factor(self) -> f64 {
        match self {
            Self::Pixel => 0.002,
            Self::Line => 0.05,
            Self::Page => 1.0,
        }
    }
}

/// Zoom handler. Disabled when the configured depth is 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    extent: Option<(f64, f64)>,
}

impl Zoom {
    /// Build from the session configuration.
    pub fn new(config: &GraphConfig) -> Self {
        Self {
            extent: config.scale_extent(),
        }
    }

    /// Check if zooming is enabled.
    pub fn is_enabled(&self) -> bool {
        self.extent.is_some()
    }

    /// Scale bounds, if enabled.
    pub fn extent(&self) -> Option<(f64, f64)> {
        self.extent
    }

    /// Zoom to `k` (clamped) about a screen point.
    pub fn scale_to(&self, view: &ViewTransform, k: f64, fx: f64, fy: f64) -> Option<ViewTransform> {
        let (min, max) = self.extent?;
        if k.is_nan() {
            return Some(*view);
        }
        Some(view.scaled_about(k.clamp(min, max), fx, fy))
    }

    /// Apply a wheel increment: `k · 2^(-delta · factor)`.
    pub fn wheel(
        &self,
        view: &ViewTransform,
        delta_y: f64,
        mode: DeltaMode,
        fx: f64,
        fy: f64,
    ) -> Option<ViewTransform> {
        let k = view.k * (-delta_y * mode.factor()).exp2();
        self.scale_to(view, k, fx, fy)
    }

    /// Apply a pinch increment: `k · ratio`.
    pub fn pinch(&self, view: &ViewTransform, ratio: f64, fx: f64, fy: f64) -> Option<ViewTransform> {
        self.scale_to(view, view.k * ratio, fx, fy)
    }

    /// Pan by a screen-space delta.
    pub fn pan(&self, view: &ViewTransform, dx: f64, dy: f64) -> Option<ViewTransform> {
        self.extent?;
        Some(view.translated(dx, dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoom(depth: f64, zoom_out: bool) -> Zoom {
        Zoom::new(&GraphConfig {
            zoom_depth: depth,
            enable_zoom_out: zoom_out,
            ..Default::default()
        })
    }

    #[test]
    fn test_disabled_zoom_does_nothing() {
        let zoom = zoom(0.0, true);
        assert!(!zoom.is_enabled());
        assert_eq!(zoom.wheel(&ViewTransform::IDENTITY, -100.0, DeltaMode::Pixel, 0.0, 0.0), None);
        assert_eq!(zoom.pinch(&ViewTransform::IDENTITY, 2.0, 0.0, 0.0), None);
        assert_eq!(zoom.pan(&ViewTransform::IDENTITY, 5.0, 5.0), None);
    }

    #[test]
    fn test_scale_clamped_to_depth() {
        let zoom = zoom(3.0, false);
        let mut view = ViewTransform::IDENTITY;
        for _ in 0..50 {
            view = zoom.wheel(&view, -1_000.0, DeltaMode::Pixel, 10.0, 10.0).unwrap();
            assert!((1.0..=3.0).contains(&view.k));
        }
        assert_eq!(view.k, 3.0);
        for _ in 0..50 {
            view = zoom.wheel(&view, 1_000.0, DeltaMode::Page, 10.0, 10.0).unwrap();
            assert!((1.0..=3.0).contains(&view.k));
        }
        assert_eq!(view.k, 1.0);
    }

    #[test]
    fn test_overflowing_gesture_reaches_bounds() {
        let zoom = zoom(3.0, false);
        let view = zoom.wheel(&ViewTransform::IDENTITY, -1e6, DeltaMode::Pixel, 0.0, 0.0).unwrap();
        assert_eq!(view.k, 3.0);
        let view = zoom.wheel(&view, 1e6, DeltaMode::Pixel, 0.0, 0.0).unwrap();
        assert_eq!(view.k, 1.0);
        let view = zoom.pinch(&view, f64::NAN, 0.0, 0.0).unwrap();
        assert_eq!(view, ViewTransform::IDENTITY);
    }

    #[test]
    fn test_zoom_out_allowed_when_enabled() {
        let zoom = zoom(4.0, true);
        let view = zoom.pinch(&ViewTransform::IDENTITY, 0.01, 0.0, 0.0).unwrap();
        assert_eq!(view.k, 0.25);
    }

    #[test]
    fn test_wheel_direction() {
        let zoom = zoom(10.0, true);
        let view = zoom.wheel(&ViewTransform::IDENTITY, -100.0, DeltaMode::Pixel, 0.0, 0.0).unwrap();
        assert!(view.k > 1.0);
        let view = zoom.wheel(&view, 300.0, DeltaMode::Pixel, 0.0, 0.0).unwrap();
        assert!(view.k < 1.0);
    }

    #[test]
    fn test_delta_mode_from_dom() {
        assert_eq!(DeltaMode::from_dom(0), DeltaMode::Pixel);
        assert_eq!(DeltaMode::from_dom(1), DeltaMode::Line);
        assert_eq!(DeltaMode::from_dom(2), DeltaMode::Page);
    }
}
