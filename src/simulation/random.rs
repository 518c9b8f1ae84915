//! Deterministic random source for jiggling coincident nodes.
//!
//! Two nodes at exactly the same coordinate have no direction to push each
//! other in; a tiny random offset breaks the tie. A fixed-seed LCG keeps
//! layouts reproducible across runs.

const A: u64 = 1_664_525;
const C: u64 = 1_013_904_223;
const M: u64 = 1 << 32;

/// Linear congruential generator over `[0, 1)`.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Create a generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed % M }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (A * self.state + C) % M;
        self.state as f64 / M as f64
    }

    /// A non-zero offset in `(-5e-7, 5e-7)`.
    pub fn jiggle(&mut self) -> f64 {
        let v = (self.next_f64() - 0.5) * 1e-6;
        if v == 0.0 { 1e-7 } else { v }
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(1)
    }
}
