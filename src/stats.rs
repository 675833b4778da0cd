//! Descriptive statistics over polars frames: means, mode, Pearson
//! correlation, and the pairwise correlation matrix behind the heatmap.

use color_eyre::Result;
use polars::prelude::*;

use crate::columns::is_numeric_dtype;

/// Pairwise Pearson correlations over a frame's numeric columns.
#[derive(Clone, Debug)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub correlations: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns, if both are present.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.correlations[i][j])
    }
}

/// Convert a numeric series to Vec<f64>, handling both integer and float types.
/// Nulls are dropped.
pub fn numeric_values(series: &Series) -> Vec<f64> {
    if let Ok(f64_series) = series.f64() {
        f64_series.iter().flatten().collect()
    } else {
        match series.cast(&DataType::Float64) {
            Ok(cast_series) => match cast_series.f64() {
                Ok(f64_series) => f64_series.iter().flatten().collect(),
                Err(_) => Vec::new(),
            },
            Err(_) => Vec::new(),
        }
    }
}

/// Mean of a numeric series; `None` when the series has no non-null values.
pub fn series_mean(series: &Series) -> Option<f64> {
    series.mean()
}

/// Mode of a string column: the most frequent value, first-encountered order
/// breaking ties. `None` for an empty or all-null series.
pub fn string_mode(series: &Series) -> Result<Option<String>> {
    let strings = series.str()?;
    let mut order: Vec<&str> = Vec::new();
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for value in strings.iter().flatten() {
        let entry = counts.entry(value).or_insert(0);
        if *entry == 0 {
            order.push(value);
        }
        *entry += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for value in &order {
        let count = counts[value];
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    Ok(best.map(|(value, _)| value.to_string()))
}

/// Pearson correlation of two same-length numeric series. Returns `None`
/// when fewer than 2 paired values exist or either side has zero variance.
pub fn pearson(a: &Series, b: &Series) -> Option<f64> {
    let values1 = numeric_values(a);
    let values2 = numeric_values(b);
    if values1.len() != values2.len() || values1.len() < 2 {
        return None;
    }

    let mean1: f64 = values1.iter().sum::<f64>() / values1.len() as f64;
    let mean2: f64 = values2.iter().sum::<f64>() / values2.len() as f64;

    let numerator: f64 = values1
        .iter()
        .zip(values2.iter())
        .map(|(v1, v2)| (v1 - mean1) * (v2 - mean2))
        .sum();

    let var1: f64 = values1.iter().map(|v| (v - mean1).powi(2)).sum();
    let var2: f64 = values2.iter().map(|v| (v - mean2).powi(2)).sum();

    if var1 == 0.0 || var2 == 0.0 {
        return None;
    }

    Some(numerator / (var1.sqrt() * var2.sqrt()))
}

/// Pearson correlation between two columns of a frame, nulls dropped pairwise.
pub fn pearson_columns(df: &DataFrame, col1_name: &str, col2_name: &str) -> Result<Option<f64>> {
    let col1 = df.column(col1_name)?;
    let col2 = df.column(col2_name)?;

    let mask = col1.is_not_null() & col2.is_not_null();
    let col1_clean = col1.filter(&mask)?;
    let col2_clean = col2.filter(&mask)?;

    Ok(pearson(
        col1_clean.as_materialized_series(),
        col2_clean.as_materialized_series(),
    ))
}

/// Pairwise correlation matrix over all numeric columns. The diagonal is 1.0;
/// pairs without enough data are NaN. Errors when fewer than 2 numeric
/// columns exist.
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    let schema = df.schema();
    let numeric_cols: Vec<String> = schema
        .iter()
        .filter(|(_, dtype)| is_numeric_dtype(dtype))
        .map(|(name, _)| name.to_string())
        .collect();

    if numeric_cols.len() < 2 {
        return Err(color_eyre::eyre::eyre!(
            "Need at least 2 numeric columns for a correlation matrix"
        ));
    }

    let n = numeric_cols.len();
    let mut correlations = vec![vec![1.0; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let r = pearson_columns(df, &numeric_cols[i], &numeric_cols[j])?.unwrap_or(f64::NAN);
            correlations[i][j] = r;
            correlations[j][i] = r; // symmetric
        }
    }

    Ok(CorrelationMatrix {
        columns: numeric_cols,
        correlations,
    })
}

/// Linear-interpolated quantile of pre-sorted values, q in [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let weight = pos - lower as f64;
    Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect_positive() {
        let a = Series::new("a".into(), &[1.0_f64, 2.0, 3.0, 4.0]);
        let b = Series::new("b".into(), &[2.0_f64, 4.0, 6.0, 8.0]);
        let r = pearson(&a, &b).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_symmetric_and_bounded() {
        let a = Series::new("a".into(), &[1.0_f64, 5.0, 2.0, 9.0, 3.0]);
        let b = Series::new("b".into(), &[7.0_f64, 1.0, 4.0, 2.0, 8.0]);
        let ab = pearson(&a, &b).unwrap();
        let ba = pearson(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-12);
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_pearson_zero_variance() {
        let a = Series::new("a".into(), &[3.0_f64, 3.0, 3.0]);
        let b = Series::new("b".into(), &[1.0_f64, 2.0, 3.0]);
        assert!(pearson(&a, &b).is_none());
    }

    #[test]
    fn test_pearson_empty() {
        let a = Series::new("a".into(), Vec::<f64>::new());
        let b = Series::new("b".into(), Vec::<f64>::new());
        assert!(pearson(&a, &b).is_none());
    }

    #[test]
    fn test_string_mode_first_encounter_tie() {
        let s = Series::new(
            "fuel".into(),
            &["Diesel", "Petrol", "Diesel", "Petrol", "CNG"],
        );
        // Diesel and Petrol both occur twice; Diesel was seen first.
        assert_eq!(string_mode(&s).unwrap(), Some("Diesel".to_string()));
    }

    #[test]
    fn test_string_mode_empty() {
        let s = Series::new("fuel".into(), Vec::<String>::new());
        assert_eq!(string_mode(&s).unwrap(), None);
    }

    #[test]
    fn test_correlation_matrix_shape_and_diagonal() {
        let df = df!(
            "x" => &[1.0_f64, 2.0, 3.0, 4.0],
            "y" => &[2.0_f64, 4.0, 6.0, 8.0],
            "name" => &["a", "b", "c", "d"]
        )
        .unwrap();

        let m = correlation_matrix(&df).unwrap();
        assert_eq!(m.columns, vec!["x", "y"]);
        assert!((m.correlations[0][0] - 1.0).abs() < 1e-12);
        assert!((m.correlations[0][1] - m.correlations[1][0]).abs() < 1e-12);
        assert!((m.get("x", "y").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_matrix_needs_two_numeric() {
        let df = df!("x" => &[1.0_f64, 2.0], "name" => &["a", "b"]).unwrap();
        assert!(correlation_matrix(&df).is_err());
    }

    #[test]
    fn test_quantile_sorted() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&values, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&values, 0.5), Some(3.0));
        assert_eq!(quantile_sorted(&values, 1.0), Some(5.0));
        assert_eq!(quantile_sorted(&values, 0.25), Some(2.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }
}
