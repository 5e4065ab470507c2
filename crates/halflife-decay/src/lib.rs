//! # halflife-decay: Exponential decay law and survival curve.
//!
//! - **Lifetime sampling**: inverse-transform sampling of the exponential
//!   distribution, `L = -ln(U) / λ` with `U` uniform on `(0, 1)`.
//! - **Survival fraction**: the closed form `0.5^(t / H)`.
//! - **Curve model**: evenly spaced `(t, fraction)` points for display and
//!   comparison against the discrete simulation.

pub mod curve;
pub mod law;

pub use curve::{CurveModel, CurvePoint, CurvePoints};
pub use law::{remaining_fraction, sample_lifetime, ExponentialLaw};
