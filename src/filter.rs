//! Filter engine: derive the working view of the cleaned dataset from the
//! selected brand set and manufacturing-year interval.

use color_eyre::Result;
use polars::prelude::*;

/// Rows of `clean` whose brand is in `brands` AND whose year lies inside
/// `[min_year, max_year]`, inclusive both ends. An empty brand set yields an
/// empty view; so does an inverted interval (`min_year > max_year`). All
/// columns are carried through unchanged.
pub fn working_view(
    clean: &DataFrame,
    brands: &[String],
    min_year: i64,
    max_year: i64,
) -> Result<DataFrame> {
    let mut brand_expr: Option<Expr> = None;
    for brand in brands {
        let eq = col("Company_Name").eq(lit(brand.as_str()));
        brand_expr = Some(match brand_expr {
            Some(current) => current.or(eq),
            None => eq,
        });
    }
    // No brands selected: nothing matches, deliberately no fallback to "all".
    let brand_expr = brand_expr.unwrap_or_else(|| lit(false));

    let year_expr = col("Year")
        .gt_eq(lit(min_year))
        .and(col("Year").lt_eq(lit(max_year)));

    let df = clean.clone().lazy().filter(brand_expr.and(year_expr)).collect()?;
    Ok(df)
}

/// Analysis-page filter controls: one checkbox per brand plus the two ends of
/// the year range. Defaults select everything.
#[derive(Debug, Clone)]
pub struct FilterState {
    pub brands: Vec<(String, bool)>,
    pub year_bounds: (i64, i64),
    pub year_selected: (i64, i64),
}

impl FilterState {
    pub fn new(brands: Vec<String>, year_bounds: (i64, i64)) -> Self {
        Self {
            brands: brands.into_iter().map(|b| (b, true)).collect(),
            year_bounds,
            year_selected: year_bounds,
        }
    }

    pub fn selected_brands(&self) -> Vec<String> {
        self.brands
            .iter()
            .filter(|(_, selected)| *selected)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn toggle_brand(&mut self, index: usize) {
        if let Some((_, selected)) = self.brands.get_mut(index) {
            *selected = !*selected;
        }
    }

    pub fn select_all_brands(&mut self) {
        for (_, selected) in &mut self.brands {
            *selected = true;
        }
    }

    pub fn clear_brands(&mut self) {
        for (_, selected) in &mut self.brands {
            *selected = false;
        }
    }

    pub fn adjust_year_start(&mut self, delta: i64) {
        let (lo, _) = self.year_bounds;
        let (start, end) = self.year_selected;
        self.year_selected.0 = (start + delta).clamp(lo, end);
    }

    pub fn adjust_year_end(&mut self, delta: i64) {
        let (_, hi) = self.year_bounds;
        let (start, end) = self.year_selected;
        self.year_selected.1 = (end + delta).clamp(start, hi);
    }

    /// Apply the current controls to the cleaned dataset.
    pub fn apply(&self, clean: &DataFrame) -> Result<DataFrame> {
        let (min_year, max_year) = self.year_selected;
        working_view(clean, &self.selected_brands(), min_year, max_year)
    }
}
