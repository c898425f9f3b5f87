pub mod seller;

pub use seller::{analyze_yield, SellerStance, SellerYield, YieldMetrics, YieldQuality};
