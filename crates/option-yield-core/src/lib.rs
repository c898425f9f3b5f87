pub mod error;
pub mod math;
pub mod types;

#[cfg(feature = "pricing")]
pub mod pricing;

#[cfg(feature = "yield_analysis")]
pub mod yield_analysis;

#[cfg(feature = "payoff")]
pub mod payoff;

pub use error::OptionYieldError;
pub use types::*;

/// Standard result type for all option-yield operations
pub type OptionYieldResult<T> = Result<T, OptionYieldError>;
