//! Load the raw and cleaned car-listing CSVs and validate the schema the
//! dashboard depends on. Both frames are read once at startup and owned by
//! the `App` for the process lifetime; every derived view recomputes from
//! these immutable tables.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Columns the cleaned dataset must carry for the dashboard to operate.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Price",
    "Company_Name",
    "Kilometers_Driven",
    "Year",
    "Power_value",
    "Fuel_Type",
    "Transmission",
];

#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
}

/// The two source tables. Immutable after load.
pub struct CarDatasets {
    pub raw: DataFrame,
    pub clean: DataFrame,
}

impl CarDatasets {
    pub fn load(raw_path: &Path, clean_path: &Path, options: &LoadOptions) -> Result<Self> {
        let raw = read_csv(raw_path, options)?;
        let clean = read_csv(clean_path, options)?;
        validate_clean_schema(&clean)?;
        Ok(Self { raw, clean })
    }

    /// Distinct brand names in first-occurrence order.
    pub fn brands(&self) -> Result<Vec<String>> {
        let column = self.clean.column("Company_Name")?;
        let strings = column.as_materialized_series().str()?;
        let mut seen = std::collections::HashSet::new();
        let mut brands = Vec::new();
        for brand in strings.iter().flatten() {
            if seen.insert(brand) {
                brands.push(brand.to_string());
            }
        }
        Ok(brands)
    }

    /// Observed [min, max] of the manufacturing year column. `None` when the
    /// cleaned dataset has no rows.
    pub fn year_bounds(&self) -> Result<Option<(i64, i64)>> {
        let years = self
            .clean
            .column("Year")?
            .as_materialized_series()
            .cast(&DataType::Int64)?;
        let years = years.i64()?;
        let mut bounds: Option<(i64, i64)> = None;
        for year in years.iter().flatten() {
            bounds = Some(match bounds {
                None => (year, year),
                Some((lo, hi)) => (lo.min(year), hi.max(year)),
            });
        }
        Ok(bounds)
    }
}

fn read_csv(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let pl_path = PlPath::Local(Arc::from(path));
    let mut reader = LazyCsvReader::new(pl_path);
    if let Some(delimiter) = options.delimiter {
        reader = reader.with_separator(delimiter);
    }
    if let Some(has_header) = options.has_header {
        reader = reader.with_has_header(has_header);
    }
    let df = reader.finish()?.collect()?;
    Ok(df)
}

/// Missing required columns in the cleaned dataset are a fatal startup
/// condition; report all of them at once.
fn validate_clean_schema(clean: &DataFrame) -> Result<()> {
    let schema = clean.schema();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| schema.get(name).is_none())
        .copied()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(eyre!(
            "cleaned dataset is missing required column(s): {}",
            missing.join(", ")
        ))
    }
}
