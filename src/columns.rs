//! Partition a frame's columns into numeric and categorical groups by dtype.

use polars::prelude::*;

pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

pub fn is_categorical_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(..))
}

/// Disjoint, exhaustive split of a schema's column names. Numeric covers the
/// integer/float dtypes; everything else lands in `categorical` so the
/// partition always covers the full schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPartition {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnPartition {
    pub fn from_schema(schema: &Schema) -> Self {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for (name, dtype) in schema.iter() {
            if is_numeric_dtype(dtype) {
                numeric.push(name.to_string());
            } else {
                categorical.push(name.to_string());
            }
        }
        Self {
            numeric,
            categorical,
        }
    }

    pub fn from_frame(df: &DataFrame) -> Self {
        Self::from_schema(&df.schema())
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|c| c == column)
    }

    /// All column names in schema order within each group.
    pub fn all_columns(&self) -> Vec<String> {
        let mut cols = self.numeric.clone();
        cols.extend(self.categorical.iter().cloned());
        cols
    }

    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_schema() {
        let df = df!(
            "Price" => &[5.0_f64, 10.0],
            "Company_Name" => &["BrandA", "BrandB"],
            "Year" => &[2018_i64, 2019]
        )
        .unwrap();

        let partition = ColumnPartition::from_frame(&df);
        assert_eq!(partition.numeric, vec!["Price", "Year"]);
        assert_eq!(partition.categorical, vec!["Company_Name"]);
        assert_eq!(partition.len(), df.width());

        for name in df.get_column_names() {
            let numeric = partition.is_numeric(name.as_str());
            let categorical = partition.is_categorical(name.as_str());
            assert!(numeric ^ categorical, "column {} must be in exactly one group", name);
        }
    }

    #[test]
    fn test_dtype_predicates() {
        assert!(is_numeric_dtype(&DataType::Int32));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(is_categorical_dtype(&DataType::String));
        assert!(!is_categorical_dtype(&DataType::UInt8));
    }

    #[test]
    fn test_empty_frame() {
        let df = DataFrame::empty();
        let partition = ColumnPartition::from_frame(&df);
        assert!(partition.is_empty());
    }
}
