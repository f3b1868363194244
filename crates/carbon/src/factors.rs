//! Emission factor tables.
//!
//! Scope 1 factors are per activity unit of fuel burned. Scope 2 factors are
//! the 2022 regional grid averages published by the Ministry of Ecology and
//! Environment, in tCO₂/MWh.

use serde::Serialize;

/// Fossil fuels with a known combustion factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fuel {
    Gas,
    Diesel,
    Gasoline,
    Coal,
}

impl Fuel {
    pub const ALL: [Fuel; 4] = [Fuel::Gas, Fuel::Diesel, Fuel::Gasoline, Fuel::Coal];

    /// Look up a fuel by its request key. Keys are case-sensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "gas" => Some(Fuel::Gas),
            "diesel" => Some(Fuel::Diesel),
            "gasoline" => Some(Fuel::Gasoline),
            "coal" => Some(Fuel::Coal),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Fuel::Gas => "gas",
            Fuel::Diesel => "diesel",
            Fuel::Gasoline => "gasoline",
            Fuel::Coal => "coal",
        }
    }

    /// tCO₂ per activity unit.
    pub fn factor(&self) -> f64 {
        match self {
            Fuel::Gas => 21.62,
            Fuel::Diesel => 3.096,
            Fuel::Gasoline => 2.925,
            Fuel::Coal => 1.900,
        }
    }

    /// Activity unit the factor applies to.
    pub fn unit(&self) -> &'static str {
        match self {
            Fuel::Gas => "10^4 m3",
            Fuel::Diesel | Fuel::Gasoline | Fuel::Coal => "t",
        }
    }
}

/// Regional power grids with a published average factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GridRegion {
    North,
    Northeast,
    East,
    Central,
    Northwest,
    South,
    #[serde(rename = "National_Avg")]
    NationalAvg,
}

impl GridRegion {
    pub const ALL: [GridRegion; 7] = [
        GridRegion::North,
        GridRegion::Northeast,
        GridRegion::East,
        GridRegion::Central,
        GridRegion::Northwest,
        GridRegion::South,
        GridRegion::NationalAvg,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "North" => Some(GridRegion::North),
            "Northeast" => Some(GridRegion::Northeast),
            "East" => Some(GridRegion::East),
            "Central" => Some(GridRegion::Central),
            "Northwest" => Some(GridRegion::Northwest),
            "South" => Some(GridRegion::South),
            "National_Avg" => Some(GridRegion::NationalAvg),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            GridRegion::North => "North",
            GridRegion::Northeast => "Northeast",
            GridRegion::East => "East",
            GridRegion::Central => "Central",
            GridRegion::Northwest => "Northwest",
            GridRegion::South => "South",
            GridRegion::NationalAvg => "National_Avg",
        }
    }

    /// tCO₂ per MWh.
    pub fn factor(&self) -> f64 {
        match self {
            GridRegion::North => 0.5921,
            GridRegion::Northeast => 0.5594,
            GridRegion::East => 0.5703,
            GridRegion::Central => 0.4233,
            GridRegion::Northwest => 0.4908,
            GridRegion::South => 0.3854,
            GridRegion::NationalAvg => 0.5386,
        }
    }

    /// Provinces served by the grid.
    pub fn coverage(&self) -> &'static str {
        match self {
            GridRegion::North => "Beijing, Tianjin, Hebei, Shanxi, Shandong",
            GridRegion::Northeast => "Liaoning, Jilin, Heilongjiang",
            GridRegion::East => "Shanghai, Jiangsu, Zhejiang, Anhui, Fujian",
            GridRegion::Central => "Henan, Hubei, Hunan, Jiangxi, Sichuan, Chongqing",
            GridRegion::Northwest => "Shaanxi, Gansu, Qinghai, Ningxia, Xinjiang",
            GridRegion::South => "Guangdong, Guangxi, Hainan, Yunnan, Guizhou",
            GridRegion::NationalAvg => "national average",
        }
    }
}

/// One row of the published factor listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FactorEntry {
    pub key: &'static str,
    pub factor: f64,
    pub unit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<&'static str>,
}

/// All supported fuels and grid regions, for client pickers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FactorTable {
    pub fuels: Vec<FactorEntry>,
    pub grid_regions: Vec<FactorEntry>,
}

pub fn factor_table() -> FactorTable {
    FactorTable {
        fuels: Fuel::ALL
            .iter()
            .map(|f| FactorEntry {
                key: f.key(),
                factor: f.factor(),
                unit: f.unit(),
                coverage: None,
            })
            .collect(),
        grid_regions: GridRegion::ALL
            .iter()
            .map(|r| FactorEntry {
                key: r.key(),
                factor: r.factor(),
                unit: "MWh",
                coverage: Some(r.coverage()),
            })
            .collect(),
    }
}
