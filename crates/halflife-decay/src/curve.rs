//! Analytic survival curve for display and comparison.
//!
//! Points are computed as `t = t_max * i / resolution` rather than by
//! accumulating a step, so billion-year spans stay exact at the end point.
//! The model is unit-agnostic: labels and unit conversion belong to the
//! renderer.

use halflife_core::constants::{CURVE_SPAN_HALF_LIVES, TIMELINE_SPAN_HALF_LIVES};
use halflife_core::error::SimError;
use halflife_core::types::HalfLife;
use serde::Serialize;

use crate::law::remaining_fraction;

/// One point of the survival curve.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    pub t: f64,
    /// Fraction of the population remaining at `t`, in `(0, 1]`.
    pub fraction: f64,
}

/// Pure functions over the analytic decay curve.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveModel;

impl CurveModel {
    /// `resolution + 1` evenly spaced points from `0` to `t_max` inclusive.
    ///
    /// Fails with [`SimError::InvalidInput`] if `t_max` is negative or not
    /// finite, or `resolution` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use halflife_core::HalfLife;
    /// use halflife_decay::CurveModel;
    /// let h = HalfLife::new(10.0).unwrap();
    /// let pts: Vec<_> = CurveModel::curve_points(h, 20.0, 2).unwrap().collect();
    /// assert_eq!(pts.len(), 3);
    /// assert_eq!(pts[1].fraction, 0.5);
    /// assert_eq!(pts[2].fraction, 0.25);
    /// ```
    pub fn curve_points(
        half_life: HalfLife,
        t_max: f64,
        resolution: usize,
    ) -> Result<CurvePoints, SimError> {
        if !t_max.is_finite() || t_max < 0.0 {
            return Err(SimError::invalid(format!(
                "t_max must be non-negative and finite, got {t_max}"
            )));
        }
        if resolution == 0 {
            return Err(SimError::invalid("curve resolution must be at least 1"));
        }
        Ok(CurvePoints {
            half_life,
            t_max,
            resolution,
            next: 0,
        })
    }

    /// Analytic count of `initial` particles still undecayed at `t`.
    pub fn expected_remaining(half_life: HalfLife, initial: usize, t: f64) -> f64 {
        initial as f64 * remaining_fraction(half_life, t)
    }

    /// Time window of the survival graph: at least three half-lives, and
    /// always wide enough to include `now`.
    pub fn display_span(half_life: HalfLife, now: f64) -> f64 {
        now.max(half_life.get() * CURVE_SPAN_HALF_LIVES)
    }

    /// Time window of the event timeline: four half-lives.
    pub fn timeline_span(half_life: HalfLife) -> f64 {
        half_life.get() * TIMELINE_SPAN_HALF_LIVES
    }

    /// Whole multiples of the half-life within `[0, span]`, for axis ticks.
    pub fn half_life_marks(half_life: HalfLife, span: f64) -> Vec<f64> {
        let h = half_life.get();
        if !span.is_finite() || span < 0.0 {
            return Vec::new();
        }
        let count = (span / h).floor() as usize;
        (0..=count).map(|i| i as f64 * h).collect()
    }
}

/// Lazy iterator over [`CurvePoint`]s. Cloning restarts from the clone's position.
#[derive(Debug, Clone)]
pub struct CurvePoints {
    half_life: HalfLife,
    t_max: f64,
    resolution: usize,
    next: usize,
}

impl Iterator for CurvePoints {
    type Item = CurvePoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.resolution {
            return None;
        }
        let i = self.next;
        self.next += 1;
        let t = if i == self.resolution {
            self.t_max
        } else {
            self.t_max * (i as f64 / self.resolution as f64)
        };
        Some(CurvePoint {
            t,
            fraction: remaining_fraction(self.half_life, t),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.resolution + 1).saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for CurvePoints {}
