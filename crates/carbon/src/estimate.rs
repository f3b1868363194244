//! Scope 1 and scope 2 emission arithmetic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::factors::{Fuel, GridRegion};

/// Fuel key to consumption, as sent by clients.
///
/// Values may be numbers or numeric strings; anything else is ignored.
pub type FuelData = BTreeMap<String, Value>;

/// Purchased electricity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ElectricityData {
    pub consumption_kwh: Option<Value>,
    pub region: Option<Value>,
}

/// Body of an estimate request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EstimateRequest {
    pub fuel_data: FuelData,
    pub electricity_data: ElectricityData,
}

/// Emissions in tCO₂, each rounded to 4 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionEstimate {
    pub total_emissions: f64,
    pub scope1_emissions: f64,
    pub scope2_emissions: f64,
}

/// Read a quantity from a JSON number or numeric string.
pub fn quantity(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Direct emissions from fuel combustion.
pub fn scope1_emissions(fuel_data: &FuelData) -> f64 {
    fuel_data
        .iter()
        .filter_map(|(key, consumption)| {
            let fuel = Fuel::from_key(key)?;
            match quantity(consumption) {
                Some(amount) => Some(amount * fuel.factor()),
                None => {
                    if !consumption.is_null() {
                        debug!(fuel = %key, value = %consumption, "Ignoring unparseable fuel consumption");
                    }
                    None
                }
            }
        })
        .sum()
}

/// Indirect emissions from purchased electricity.
///
/// Zero when the consumption is absent, zero or unparseable, or when the
/// grid region is absent or unknown.
pub fn scope2_emissions(electricity: &ElectricityData) -> f64 {
    let Some(region) = electricity
        .region
        .as_ref()
        .and_then(Value::as_str)
        .and_then(GridRegion::from_key)
    else {
        return 0.0;
    };

    match electricity.consumption_kwh.as_ref().and_then(quantity) {
        Some(kwh) if kwh != 0.0 => kwh / 1000.0 * region.factor(),
        _ => 0.0,
    }
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Scope 1 plus scope 2, rounded after summation.
pub fn estimate_total_emissions(fuel_data: &FuelData, electricity: &ElectricityData) -> EmissionEstimate {
    let scope1 = scope1_emissions(fuel_data);
    let scope2 = scope2_emissions(electricity);

    EmissionEstimate {
        total_emissions: round4(scope1 + scope2),
        scope1_emissions: round4(scope1),
        scope2_emissions: round4(scope2),
    }
}

impl EstimateRequest {
    pub fn estimate(&self) -> EmissionEstimate {
        estimate_total_emissions(&self.fuel_data, &self.electricity_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quantity_parsing() {
        assert_eq!(quantity(&json!(2)), Some(2.0));
        assert_eq!(quantity(&json!(" 1.5 ")), Some(1.5));
        assert_eq!(quantity(&json!("abc")), None);
        assert_eq!(quantity(&json!("NaN")), None);
        assert_eq!(quantity(&json!(true)), None);
        assert_eq!(quantity(&Value::Null), None);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(1.23456), 1.2346);
        assert_eq!(round4(-0.00004), -0.0);
        assert_eq!(round4(10.0), 10.0);
    }

    #[test]
    fn test_zero_consumption_is_zero_scope2() {
        let e = ElectricityData {
            consumption_kwh: Some(json!(0)),
            region: Some(json!("North")),
        };
        assert_eq!(scope2_emissions(&e), 0.0);
    }
}
