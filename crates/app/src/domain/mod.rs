//! Trolley Domain Concerns

pub mod baskets;
pub mod discounts;
pub mod shipping;
pub mod totals;
