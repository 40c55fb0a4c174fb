//! Node loads - forces and moments applied directly to nodes

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Loads applied directly at a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodalLoads {
    /// Force in X direction (N)
    pub fx: f64,
    /// Force in Y direction (N)
    pub fy: f64,
    /// Moment about the out-of-plane axis (N·m), counter-clockwise positive
    pub moment: f64,
}

impl NodalLoads {
    pub fn new(fx: f64, fy: f64, moment: f64) -> Self {
        Self { fx, fy, moment }
    }

    /// Create a force-only node load
    pub fn force(fx: f64, fy: f64) -> Self {
        Self::new(fx, fy, 0.0)
    }

    /// Create a load in X direction
    pub fn fx(value: f64) -> Self {
        Self::new(value, 0.0, 0.0)
    }

    /// Create a load in Y direction
    pub fn fy(value: f64) -> Self {
        Self::new(0.0, value, 0.0)
    }

    /// Create a moment-only node load
    pub fn moment(value: f64) -> Self {
        Self::new(0.0, 0.0, value)
    }

    /// Get the load as an array [FX, FY, MZ]
    pub fn as_array(&self) -> [f64; 3] {
        [self.fx, self.fy, self.moment]
    }

    pub fn is_zero(&self) -> bool {
        self.fx == 0.0 && self.fy == 0.0 && self.moment == 0.0
    }
}

impl AddAssign for NodalLoads {
    fn add_assign(&mut self, rhs: Self) {
        self.fx += rhs.fx;
        self.fy += rhs.fy;
        self.moment += rhs.moment;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_accumulate() {
        let mut loads = NodalLoads::fy(-1000.0);
        loads += NodalLoads::new(200.0, -500.0, 10.0);
        assert_eq!(loads.as_array(), [200.0, -1500.0, 10.0]);
        assert!(!loads.is_zero());
        assert!(NodalLoads::default().is_zero());
    }
}
