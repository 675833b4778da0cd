//! Dataset-wide facts for the Insights & Conclusion page. Always computed
//! from the full cleaned dataset; the Analysis-page filters never apply.

use color_eyre::Result;
use polars::prelude::*;

use crate::columns::is_numeric_dtype;
use crate::stats;

#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub total_records: usize,
    /// Brand of the maximum-price row, first occurrence winning ties.
    pub most_expensive_brand: Option<String>,
    /// Mode of the fuel-type column.
    pub most_common_fuel: Option<String>,
    /// Numeric column (other than price) with the highest signed correlation
    /// with price. Ranks by raw coefficient, not magnitude, so a strong
    /// negative correlate ranks below a weak positive one.
    pub strongest_price_driver: Option<String>,
}

impl Insights {
    pub fn compute(clean: &DataFrame) -> Result<Self> {
        Ok(Self {
            total_records: clean.height(),
            most_expensive_brand: most_expensive_brand(clean)?,
            most_common_fuel: stats::string_mode(
                clean.column("Fuel_Type")?.as_materialized_series(),
            )?,
            strongest_price_driver: strongest_price_driver(clean)?,
        })
    }
}

fn most_expensive_brand(clean: &DataFrame) -> Result<Option<String>> {
    let prices = clean
        .column("Price")?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let prices = prices.f64()?;

    let mut best: Option<(usize, f64)> = None;
    for (idx, price) in prices.iter().enumerate() {
        if let Some(price) = price {
            match best {
                // Strictly greater keeps the first occurrence on ties.
                Some((_, max)) if price <= max => {}
                _ => best = Some((idx, price)),
            }
        }
    }

    let Some((idx, _)) = best else {
        return Ok(None);
    };
    let brands = clean.column("Company_Name")?.as_materialized_series().clone();
    let brands = brands.str()?;
    Ok(brands.get(idx).map(|s| s.to_string()))
}

fn strongest_price_driver(clean: &DataFrame) -> Result<Option<String>> {
    let schema = clean.schema();
    let numeric_cols: Vec<String> = schema
        .iter()
        .filter(|(name, dtype)| is_numeric_dtype(dtype) && name.as_str() != "Price")
        .map(|(name, _)| name.to_string())
        .collect();

    let mut best: Option<(String, f64)> = None;
    for name in numeric_cols {
        let Some(r) = stats::pearson_columns(clean, "Price", &name)? else {
            continue;
        };
        if r.is_nan() {
            continue;
        }
        match &best {
            Some((_, best_r)) if r <= *best_r => {}
            _ => best = Some((name, r)),
        }
    }
    Ok(best.map(|(name, _)| name))
}
