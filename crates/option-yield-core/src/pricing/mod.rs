pub mod black_scholes;
pub mod expiry;
pub mod valuation;

pub use black_scholes::{
    breakeven, calculate_all, delta, gamma, intrinsic_value, price, probability_itm, rho, theta,
    vega, BlackScholes, ContractTerms, GreeksResult, OptionPricer,
};
