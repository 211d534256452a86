//! Policy models and analysis

pub mod iam;
pub mod trust;
