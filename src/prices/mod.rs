use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoredEntrantRow;

/// One hand-maintained price entry: (season, round, circuit, entrant) -> cost.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PriceRow {
    pub season: u16,
    pub round: u32,
    pub circuit: String,
    pub code: String, // driver short code or constructor id
    pub cost: f64,
}

type PriceKey = (u16, u32, String, String);

fn key_of(row: &PriceRow) -> PriceKey {
    (row.season, row.round, row.circuit.clone(), row.code.clone())
}

/// The two independent price tables, keyed for lookup.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    drivers: HashMap<PriceKey, f64>,
    constructors: HashMap<PriceKey, f64>,
}

impl PriceBook {
    pub fn from_rows(drivers: Vec<PriceRow>, constructors: Vec<PriceRow>) -> Self {
        Self {
            drivers: drivers.into_iter().map(|r| (key_of(&r), r.cost)).collect(),
            constructors: constructors
                .into_iter()
                .map(|r| (key_of(&r), r.cost))
                .collect(),
        }
    }

    /// Load both price tables from their YAML files
    pub fn load(driver_path: &Path, constructor_path: &Path) -> Result<Self> {
        Ok(Self::from_rows(
            load_price_file(driver_path)?,
            load_price_file(constructor_path)?,
        ))
    }

    pub fn driver_cost(
        &self,
        season: u16,
        round: u32,
        circuit: &str,
        driver: &str,
    ) -> Option<f64> {
        self.drivers
            .get(&(season, round, circuit.to_string(), driver.to_string()))
            .copied()
    }

    pub fn constructor_cost(
        &self,
        season: u16,
        round: u32,
        circuit: &str,
        constructor: &str,
    ) -> Option<f64> {
        self.constructors
            .get(&(season, round, circuit.to_string(), constructor.to_string()))
            .copied()
    }
}

fn load_price_file(path: &Path) -> Result<Vec<PriceRow>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read price file at {}", path.display()))?;
    serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse price file: invalid YAML in {}", path.display()))
}

/// A scored row with its joined costs. Missing prices stay missing; they are
/// never interpolated and never drop the row.
#[derive(Debug, Clone)]
pub struct PricedEntrantRow {
    pub scored: ScoredEntrantRow,
    pub driver_cost: Option<f64>,
    pub constructor_cost: Option<f64>,
}

/// Left-join the scored table against both price tables. Preserves the row
/// count and ordering of the scored side.
pub fn attach_prices(scored: Vec<ScoredEntrantRow>, book: &PriceBook) -> Vec<PricedEntrantRow> {
    scored
        .into_iter()
        .map(|row| {
            let r = &row.result;
            let driver_cost = book.driver_cost(r.season, r.round, &r.circuit, &r.driver);
            let constructor_cost =
                book.constructor_cost(r.season, r.round, &r.circuit, &r.constructor);
            PricedEntrantRow {
                scored: row,
                driver_cost,
                constructor_cost,
            }
        })
        .collect()
}
