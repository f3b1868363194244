//! Preliminary corporate carbon emission estimates.
//!
//! - Scope 1: fossil fuel combustion (gas, diesel, gasoline, coal)
//! - Scope 2: purchased electricity, by regional power grid
//!
//! Inputs are loosely typed JSON so that partially filled client forms still
//! produce an estimate; unknown keys and unparseable values contribute zero.

pub mod estimate;
pub mod factors;

pub use estimate::{
    estimate_total_emissions, scope1_emissions, scope2_emissions, ElectricityData, EmissionEstimate,
    EstimateRequest, FuelData,
};
pub use factors::{factor_table, FactorTable, Fuel, GridRegion};
