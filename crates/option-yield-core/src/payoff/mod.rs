pub mod curve;

pub use curve::{generate_curve, generate_curve_with, PayoffCurve, PayoffSample, Position};
