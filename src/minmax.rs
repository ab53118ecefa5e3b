//! Min / max ranges for float and integer values, plus the optional fixed
//! range a column can carry into the bar layout.

use serde::{Deserialize, Serialize};

/// Min / max range for f64 values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Range64 {
    pub min: f64,
    pub max: f64,
}

impl Range64 {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range with min = +inf and max = -inf, ready for repeated `fit_val_in_range`
    pub fn infinity() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn set(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
    }

    pub fn set_infinity(&mut self) {
        *self = Self::infinity();
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn in_range(&self, val: f64) -> bool {
        val >= self.min && val <= self.max
    }

    pub fn is_low(&self, val: f64) -> bool {
        val < self.min
    }

    pub fn is_high(&self, val: f64) -> bool {
        val > self.max
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// 1 / range, or 0 for an empty range
    pub fn scale(&self) -> f64 {
        let r = self.range();
        if r != 0.0 {
            1.0 / r
        } else {
            0.0
        }
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.max + self.min)
    }

    /// Grow to include `other`; returns true if anything changed.
    pub fn fit_in_range(&mut self, other: Range64) -> bool {
        let mut adj = false;
        if other.min < self.min {
            self.min = other.min;
            adj = true;
        }
        if other.max > self.max {
            self.max = other.max;
            adj = true;
        }
        adj
    }

    /// Grow to include `val`; returns true if anything changed.
    pub fn fit_val_in_range(&mut self, val: f64) -> bool {
        let mut adj = false;
        if val < self.min {
            self.min = val;
            adj = true;
        }
        if val > self.max {
            self.max = val;
            adj = true;
        }
        adj
    }

    /// Clip, then map into 0..1
    pub fn norm_val(&self, val: f64) -> f64 {
        (self.clip_val(val) - self.min) * self.scale()
    }

    /// Inverse of `norm_val`
    pub fn proj_val(&self, val: f64) -> f64 {
        self.min + val * self.range()
    }

    pub fn clip_val(&self, val: f64) -> f64 {
        if val < self.min {
            return self.min;
        }
        if val > self.max {
            return self.max;
        }
        val
    }

    pub fn clip_norm_val(&self, val: f64) -> f64 {
        if val < self.min {
            return 0.0;
        }
        if val > self.max {
            return 1.0;
        }
        self.norm_val(val)
    }
}

/// Min / max range for integer values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn set(&mut self, min: i64, max: i64) {
        self.min = min;
        self.max = max;
    }

    pub fn set_infinity(&mut self) {
        self.min = i64::MAX;
        self.max = -i64::MAX;
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn in_range(&self, val: i64) -> bool {
        val >= self.min && val <= self.max
    }

    pub fn is_low(&self, val: i64) -> bool {
        val < self.min
    }

    pub fn is_high(&self, val: i64) -> bool {
        val > self.max
    }

    pub fn range(&self) -> i64 {
        self.max - self.min
    }

    pub fn scale(&self) -> f32 {
        let r = self.range();
        if r != 0 {
            1.0 / r as f32
        } else {
            0.0
        }
    }

    pub fn midpoint(&self) -> f32 {
        0.5 * (self.max + self.min) as f32
    }

    pub fn fit_in_range(&mut self, other: IntRange) -> bool {
        let mut adj = false;
        if other.min < self.min {
            self.min = other.min;
            adj = true;
        }
        if other.max > self.max {
            self.max = other.max;
            adj = true;
        }
        adj
    }

    pub fn fit_val_in_range(&mut self, val: i64) -> bool {
        let mut adj = false;
        if val < self.min {
            self.min = val;
            adj = true;
        }
        if val > self.max {
            self.max = val;
            adj = true;
        }
        adj
    }

    pub fn norm_val(&self, val: i64) -> f32 {
        (self.clip_val(val) - self.min) as f32 * self.scale()
    }

    pub fn proj_val(&self, val: f32) -> f32 {
        self.min as f32 + val * self.range() as f32
    }

    pub fn clip_val(&self, val: i64) -> i64 {
        if val < self.min {
            return self.min;
        }
        if val > self.max {
            return self.max;
        }
        val
    }

    pub fn clip_norm_val(&self, val: i64) -> f32 {
        if val < self.min {
            return 0.0;
        }
        if val > self.max {
            return 1.0;
        }
        self.norm_val(val)
    }
}

/// Optional fixed display range of a column. Only the flagged ends apply.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedRange {
    pub fix_min: bool,
    pub min: f64,
    pub fix_max: bool,
    pub max: f64,
}

impl FixedRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            fix_min: min.is_some(),
            min: min.unwrap_or_default(),
            fix_max: max.is_some(),
            max: max.unwrap_or_default(),
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.fix_min || self.fix_max
    }

    /// Clamp `val` against the fixed ends only
    pub fn clip(&self, val: f64) -> f64 {
        let mut v = val;
        if self.fix_min && v < self.min {
            v = self.min;
        }
        if self.fix_max && v > self.max {
            v = self.max;
        }
        v
    }
}
