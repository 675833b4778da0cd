//! Chart selection and data preparation. `select_chart` is the decision
//! table mapping {analysis mode, column types} to a chart archetype;
//! `build_chart` prepares the points/bins/groups that archetype needs from
//! the working view. Rendering happens in `widgets::chart_view`.

use color_eyre::Result;
use polars::prelude::*;

use crate::columns::ColumnPartition;
use crate::stats::{self, CorrelationMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Univariate,
    Bivariate,
    Multivariate,
}

impl AnalysisMode {
    pub fn title(&self) -> &'static str {
        match self {
            AnalysisMode::Univariate => "Univariate",
            AnalysisMode::Bivariate => "Bivariate",
            AnalysisMode::Multivariate => "Multivariate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultivariateMethod {
    CorrelationHeatmap,
    FuelVsPrice,
}

impl MultivariateMethod {
    pub fn title(&self) -> &'static str {
        match self {
            MultivariateMethod::CorrelationHeatmap => "Correlation Heatmap",
            MultivariateMethod::FuelVsPrice => "Fuel vs Price",
        }
    }
}

/// One render cycle's worth of user chart choices. `primary` is the
/// univariate column or the bivariate X axis; `secondary` is the bivariate Y.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub mode: AnalysisMode,
    pub primary: String,
    pub secondary: String,
    pub method: MultivariateMethod,
}

/// The chart archetypes the dashboard can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Horizontal count-by-category bars.
    CategoryCounts,
    /// Histogram with a smoothed density overlay.
    Histogram,
    /// Scatter plot with the Pearson correlation surfaced.
    Scatter,
    /// Box plot of a numeric column grouped by a categorical one.
    BoxPlot,
    /// Counts of X, grouped/colored by Y.
    GroupedCounts,
    /// Annotated pairwise correlation matrix.
    CorrelationHeatmap,
    /// Mean price by fuel type, split by transmission.
    FuelVsPrice,
}

/// The decision table. Columns missing from the partition count as
/// categorical, which keeps the fall-through branches total.
pub fn select_chart(request: &ChartRequest, partition: &ColumnPartition) -> ChartKind {
    match request.mode {
        AnalysisMode::Univariate => {
            if partition.is_numeric(&request.primary) {
                ChartKind::Histogram
            } else {
                ChartKind::CategoryCounts
            }
        }
        AnalysisMode::Bivariate => {
            let x_numeric = partition.is_numeric(&request.primary);
            let y_numeric = partition.is_numeric(&request.secondary);
            if x_numeric && y_numeric {
                ChartKind::Scatter
            } else if !x_numeric && y_numeric {
                ChartKind::BoxPlot
            } else {
                ChartKind::GroupedCounts
            }
        }
        AnalysisMode::Multivariate => match request.method {
            MultivariateMethod::CorrelationHeatmap => ChartKind::CorrelationHeatmap,
            MultivariateMethod::FuelVsPrice => ChartKind::FuelVsPrice,
        },
    }
}

/// Five-number summary for one box-plot group.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub label: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub count: usize,
}

/// Prepared data for one chart archetype.
#[derive(Debug, Clone)]
pub enum ChartData {
    /// The working view (or the relevant columns) had no usable rows.
    NoData { reason: String },
    CategoryCounts {
        column: String,
        entries: Vec<(String, u64)>,
    },
    Histogram {
        column: String,
        /// (lower boundary, count) per bin.
        bins: Vec<(f64, u64)>,
        bin_width: f64,
        /// Smoothed density curve, scaled to expected counts per bin.
        density: Vec<(f64, f64)>,
    },
    Scatter {
        x: String,
        y: String,
        points: Vec<(f64, f64)>,
        correlation: Option<f64>,
    },
    BoxPlot {
        x: String,
        y: String,
        groups: Vec<BoxStats>,
    },
    GroupedCounts {
        x: String,
        hue: String,
        x_labels: Vec<String>,
        hue_labels: Vec<String>,
        /// counts[xi][hi] = rows with x_labels[xi] and hue_labels[hi].
        counts: Vec<Vec<u64>>,
    },
    CorrelationHeatmap { matrix: CorrelationMatrix },
    FuelVsPrice {
        fuels: Vec<String>,
        transmissions: Vec<String>,
        /// mean_price[fi][ti], None when the combination has no rows.
        mean_price: Vec<Vec<Option<f64>>>,
    },
}

/// The Pearson coefficient as surfaced next to a scatter plot, rounded to
/// three decimal places.
pub fn rounded_correlation(r: f64) -> f64 {
    (r * 1000.0).round() / 1000.0
}

/// Prepare chart data for the current request over the working view.
/// Never errors on an empty view; degrades to `ChartData::NoData`.
pub fn build_chart(view: &DataFrame, request: &ChartRequest) -> Result<ChartData> {
    let partition = ColumnPartition::from_frame(view);
    let kind = select_chart(request, &partition);

    if view.height() == 0 {
        return Ok(ChartData::NoData {
            reason: "no data in current selection".to_string(),
        });
    }

    match kind {
        ChartKind::CategoryCounts => category_counts(view, &request.primary),
        ChartKind::Histogram => histogram(view, &request.primary),
        ChartKind::Scatter => scatter(view, &request.primary, &request.secondary),
        ChartKind::BoxPlot => box_plot(view, &request.primary, &request.secondary),
        ChartKind::GroupedCounts => grouped_counts(view, &request.primary, &request.secondary),
        ChartKind::CorrelationHeatmap => correlation_heatmap(view),
        ChartKind::FuelVsPrice => fuel_vs_price(view),
    }
}

/// Column values as strings (numeric columns included), nulls as None.
fn string_values(view: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let series = view
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let strings = series.str()?;
    Ok(strings.iter().map(|v| v.map(|s| s.to_string())).collect())
}

/// Column values as f64, nulls as None.
fn float_values(view: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let series = view
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.iter().collect())
}

fn category_counts(view: &DataFrame, column: &str) -> Result<ChartData> {
    let values = string_values(view, column)?;
    let mut order: Vec<String> = Vec::new();
    let mut counts: std::collections::HashMap<String, u64> = std::collections::HashMap::new();
    for value in values.into_iter().flatten() {
        let entry = counts.entry(value.clone()).or_insert(0);
        if *entry == 0 {
            order.push(value);
        }
        *entry += 1;
    }
    if order.is_empty() {
        return Ok(ChartData::NoData {
            reason: format!("column {} has no values", column),
        });
    }
    let entries = order.into_iter().map(|v| {
        let count = counts[&v];
        (v, count)
    }).collect();
    Ok(ChartData::CategoryCounts {
        column: column.to_string(),
        entries,
    })
}

fn histogram(view: &DataFrame, column: &str) -> Result<ChartData> {
    let mut values: Vec<f64> = float_values(view, column)?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Ok(ChartData::NoData {
            reason: format!("column {} has no values", column),
        });
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = values.len();
    let min = values[0];
    let max = values[n - 1];

    if max <= min {
        // Constant column: one bin holding everything, no curve to draw.
        return Ok(ChartData::Histogram {
            column: column.to_string(),
            bins: vec![(min, n as u64)],
            bin_width: 1.0,
            density: Vec::new(),
        });
    }

    let num_bins = ((n as f64).sqrt().round() as usize).clamp(5, 40);
    let bin_width = (max - min) / num_bins as f64;
    let mut bins: Vec<(f64, u64)> = (0..num_bins)
        .map(|i| (min + i as f64 * bin_width, 0_u64))
        .collect();
    for &v in &values {
        let idx = (((v - min) / bin_width) as usize).min(num_bins - 1);
        bins[idx].1 += 1;
    }

    let density = density_curve(&values, min, max, bin_width);

    Ok(ChartData::Histogram {
        column: column.to_string(),
        bins,
        bin_width,
        density,
    })
}

/// Gaussian kernel density estimate across [min, max], scaled to expected
/// counts per bin so the curve overlays the histogram bars directly.
fn density_curve(sorted: &[f64], min: f64, max: f64, bin_width: f64) -> Vec<(f64, f64)> {
    let n = sorted.len();
    if n < 2 {
        return Vec::new();
    }

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = variance.sqrt();
    let q1 = stats::quantile_sorted(sorted, 0.25).unwrap_or(f64::NAN);
    let q3 = stats::quantile_sorted(sorted, 0.75).unwrap_or(f64::NAN);
    let iqr = q3 - q1;

    // Silverman's rule of thumb.
    let spread = if iqr > 0.0 { std.min(iqr / 1.34) } else { std };
    let bandwidth = 0.9 * spread * (n as f64).powf(-0.2);
    if !(bandwidth.is_finite()) || bandwidth <= 0.0 {
        return Vec::new();
    }

    const SAMPLES: usize = 200;
    let norm = 1.0 / ((n as f64) * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    (0..SAMPLES)
        .map(|i| {
            let x = min + (max - min) * i as f64 / (SAMPLES - 1) as f64;
            let density: f64 = sorted
                .iter()
                .map(|&v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            // Density -> expected count in a bin of bin_width at x.
            (x, density * n as f64 * bin_width)
        })
        .collect()
}

fn scatter(view: &DataFrame, x: &str, y: &str) -> Result<ChartData> {
    let xs = float_values(view, x)?;
    let ys = float_values(view, y)?;
    let points: Vec<(f64, f64)> = xs
        .into_iter()
        .zip(ys)
        .filter_map(|(xv, yv)| match (xv, yv) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((a, b)),
            _ => None,
        })
        .collect();
    if points.is_empty() {
        return Ok(ChartData::NoData {
            reason: format!("no paired values for {} vs {}", x, y),
        });
    }
    let correlation = stats::pearson_columns(view, x, y)?.map(rounded_correlation);
    Ok(ChartData::Scatter {
        x: x.to_string(),
        y: y.to_string(),
        points,
        correlation,
    })
}

fn box_plot(view: &DataFrame, x: &str, y: &str) -> Result<ChartData> {
    let labels = string_values(view, x)?;
    let values = float_values(view, y)?;

    let mut order: Vec<String> = Vec::new();
    let mut grouped: std::collections::HashMap<String, Vec<f64>> =
        std::collections::HashMap::new();
    for (label, value) in labels.into_iter().zip(values) {
        if let (Some(label), Some(value)) = (label, value) {
            if !value.is_finite() {
                continue;
            }
            let entry = grouped.entry(label.clone()).or_default();
            if entry.is_empty() {
                order.push(label);
            }
            entry.push(value);
        }
    }

    let mut groups = Vec::with_capacity(order.len());
    for label in order {
        let mut values = grouped.remove(&label).unwrap_or_default();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let count = values.len();
        let (min, max) = (values[0], values[count - 1]);
        groups.push(BoxStats {
            label,
            min,
            q1: stats::quantile_sorted(&values, 0.25).unwrap_or(min),
            median: stats::quantile_sorted(&values, 0.5).unwrap_or(min),
            q3: stats::quantile_sorted(&values, 0.75).unwrap_or(max),
            max,
            count,
        });
    }

    if groups.is_empty() {
        return Ok(ChartData::NoData {
            reason: format!("no paired values for {} vs {}", x, y),
        });
    }
    Ok(ChartData::BoxPlot {
        x: x.to_string(),
        y: y.to_string(),
        groups,
    })
}

fn grouped_counts(view: &DataFrame, x: &str, hue: &str) -> Result<ChartData> {
    let xs = string_values(view, x)?;
    let hues = string_values(view, hue)?;

    let mut x_labels: Vec<String> = Vec::new();
    let mut hue_labels: Vec<String> = Vec::new();
    let mut counts: std::collections::HashMap<(String, String), u64> =
        std::collections::HashMap::new();

    for (xv, hv) in xs.into_iter().zip(hues) {
        if let (Some(xv), Some(hv)) = (xv, hv) {
            if !x_labels.contains(&xv) {
                x_labels.push(xv.clone());
            }
            if !hue_labels.contains(&hv) {
                hue_labels.push(hv.clone());
            }
            *counts.entry((xv, hv)).or_insert(0) += 1;
        }
    }

    if x_labels.is_empty() {
        return Ok(ChartData::NoData {
            reason: format!("no paired values for {} vs {}", x, hue),
        });
    }

    let matrix: Vec<Vec<u64>> = x_labels
        .iter()
        .map(|xv| {
            hue_labels
                .iter()
                .map(|hv| {
                    counts
                        .get(&(xv.clone(), hv.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    Ok(ChartData::GroupedCounts {
        x: x.to_string(),
        hue: hue.to_string(),
        x_labels,
        hue_labels,
        counts: matrix,
    })
}

fn correlation_heatmap(view: &DataFrame) -> Result<ChartData> {
    match stats::correlation_matrix(view) {
        Ok(matrix) => Ok(ChartData::CorrelationHeatmap { matrix }),
        Err(_) => Ok(ChartData::NoData {
            reason: "need at least 2 numeric columns for a correlation heatmap".to_string(),
        }),
    }
}

/// Mean price by fuel type split by transmission. Fixed columns, not
/// user-selectable.
fn fuel_vs_price(view: &DataFrame) -> Result<ChartData> {
    let fuels_col = string_values(view, "Fuel_Type")?;
    let trans_col = string_values(view, "Transmission")?;
    let prices = float_values(view, "Price")?;

    let mut fuels: Vec<String> = Vec::new();
    let mut transmissions: Vec<String> = Vec::new();
    let mut sums: std::collections::HashMap<(String, String), (f64, u64)> =
        std::collections::HashMap::new();

    for ((fuel, trans), price) in fuels_col.into_iter().zip(trans_col).zip(prices) {
        if let (Some(fuel), Some(trans), Some(price)) = (fuel, trans, price) {
            if !price.is_finite() {
                continue;
            }
            if !fuels.contains(&fuel) {
                fuels.push(fuel.clone());
            }
            if !transmissions.contains(&trans) {
                transmissions.push(trans.clone());
            }
            let entry = sums.entry((fuel, trans)).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
        }
    }

    if fuels.is_empty() {
        return Ok(ChartData::NoData {
            reason: "no fuel/transmission/price rows in current selection".to_string(),
        });
    }

    let mean_price: Vec<Vec<Option<f64>>> = fuels
        .iter()
        .map(|fuel| {
            transmissions
                .iter()
                .map(|trans| {
                    sums.get(&(fuel.clone(), trans.clone()))
                        .map(|(sum, count)| sum / *count as f64)
                })
                .collect()
        })
        .collect();

    Ok(ChartData::FuelVsPrice {
        fuels,
        transmissions,
        mean_price,
    })
}
