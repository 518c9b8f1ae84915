//! Pan/scale transform applied at render time.

use serde::{Deserialize, Serialize};

/// Screen = graph · k + (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Horizontal pan offset in screen pixels.
    pub x: f64,
    /// Vertical pan offset in screen pixels.
    pub y: f64,
    /// Scale factor.
    pub k: f64,
}

impl ViewTransform {
    /// No pan, unit scale.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    /// Map a graph-space point to screen space.
    pub fn apply(&self, gx: f64, gy: f64) -> (f64, f64) {
        (gx * self.k + self.x, gy * self.k + self.y)
    }

    /// Map a screen-space point to graph space.
    pub fn invert(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    /// Rescale to `k`, keeping the screen point `(fx, fy)` over the same
    /// graph point.
    pub fn scaled_about(&self, k: f64, fx: f64, fy: f64) -> Self {
        let (gx, gy) = self.invert(fx, fy);
        Self {
            x: fx - gx * k,
            y: fy - gy * k,
            k,
        }
    }

    /// Shift by a screen-space delta.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            k: self.k,
        }
    }

    /// Affine matrix `[a, b, c, d, e, f]` as used by SVG and canvas.
    pub fn matrix(&self) -> [f64; 6] {
        [self.k, 0.0, 0.0, self.k, self.x, self.y]
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_invert() {
        let view = ViewTransform {
            x: 10.0,
            y: -5.0,
            k: 2.0,
        };
        assert_eq!(view.apply(3.0, 4.0), (16.0, 3.0));
        assert_eq!(view.invert(16.0, 3.0), (3.0, 4.0));
    }

    #[test]
    fn test_scaled_about_keeps_focal_point() {
        let view = ViewTransform::IDENTITY.translated(20.0, 30.0);
        let before = view.invert(100.0, 50.0);
        let zoomed = view.scaled_about(2.5, 100.0, 50.0);
        let after = zoomed.invert(100.0, 50.0);
        assert!((before.0 - after.0).abs() < 1e-9);
        assert!((before.1 - after.1).abs() < 1e-9);
        assert_eq!(zoomed.k, 2.5);
    }

    #[test]
    fn test_matrix() {
        let view = ViewTransform {
            x: 1.0,
            y: 2.0,
            k: 3.0,
        };
        assert_eq!(view.matrix(), [3.0, 0.0, 0.0, 3.0, 1.0, 2.0]);
    }
}
