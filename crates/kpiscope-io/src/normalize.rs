//! Wide/long shape detection and conversion to [`NormalizedRow`]s.

use chrono::NaiveDate;
use kpiscope_series::NormalizedRow;
use tracing::{debug, info, instrument};

use crate::domain::RawTable;
use crate::IoError;

const DATE_COLUMN: &str = "date";
const METRIC_NAME_COLUMN: &str = "metric_name";
const METRIC_VALUE_COLUMN: &str = "metric_value";

/// Layout of the metric values in a [`RawTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    /// One column per metric.
    Wide,
    /// A `metric_name` column naming the metric of each row's `metric_value`.
    Long,
}

/// Return [`TableShape::Long`] when both `metric_name` and `metric_value`
/// columns exist, otherwise [`TableShape::Wide`].
#[must_use]
pub fn detect_shape(table: &RawTable) -> TableShape {
    if table.column_index(METRIC_NAME_COLUMN).is_some()
        && table.column_index(METRIC_VALUE_COLUMN).is_some()
    {
        TableShape::Long
    } else {
        TableShape::Wide
    }
}

/// Which metric to extract and which columns to treat as dimensions.
///
/// When `dimensions` is `None`, dimensions are inferred. In a long table every
/// non-reserved column is a dimension. In a wide table numeric columns hold
/// other metrics, so only columns with at least one non-numeric cell become
/// dimensions; numeric ones must be requested explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    metric: String,
    dimensions: Option<Vec<String>>,
}

impl NormalizeOptions {
    /// Extract `metric` and infer dimensions.
    #[must_use]
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            dimensions: None,
        }
    }

    /// Use exactly these columns as dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: Vec<String>) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Return the metric name.
    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric
    }
}

/// Convert the rows of `table` that carry `options.metric` into normalized rows.
///
/// Rows keep their file order. Dimension cells are used verbatim, so an
/// empty cell becomes the empty category.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::MissingDateColumn`] | No `date` column |
/// | [`IoError::MetricNotFound`] | Wide table without a column named after the metric |
/// | [`IoError::NoRowsForMetric`] | No row carries the metric |
/// | [`IoError::UnparseableDate`] | Date cell is not `YYYY-MM-DD` (optionally followed by a time) |
/// | [`IoError::InvalidValue`] | Metric cell is empty, unparseable, or non-finite |
/// | [`IoError::ReservedDimension`] | A requested dimension is a reserved column |
/// | [`IoError::UnknownDimension`] | A requested dimension is not in the table |
#[instrument(skip_all, fields(metric = %options.metric, n_rows = table.len()))]
pub fn normalize(table: &RawTable, options: &NormalizeOptions) -> Result<Vec<NormalizedRow>, IoError> {
    let date_idx = table
        .column_index(DATE_COLUMN)
        .ok_or(IoError::MissingDateColumn)?;

    let shape = detect_shape(table);
    let (value_column, filter) = match shape {
        TableShape::Long => {
            let name_idx = table.column_index(METRIC_NAME_COLUMN);
            (METRIC_VALUE_COLUMN, name_idx)
        }
        TableShape::Wide => (options.metric.as_str(), None),
    };
    let value_idx = table
        .column_index(value_column)
        .ok_or_else(|| IoError::MetricNotFound {
            metric: options.metric.clone(),
            available: table.columns().to_vec(),
        })?;

    let selected: Vec<(usize, &Vec<String>)> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| filter.is_none_or(|i| row[i] == options.metric))
        .collect();
    if selected.is_empty() {
        return Err(IoError::NoRowsForMetric {
            metric: options.metric.clone(),
        });
    }

    let reserved: Vec<&str> = match shape {
        TableShape::Long => vec![DATE_COLUMN, METRIC_NAME_COLUMN, METRIC_VALUE_COLUMN],
        TableShape::Wide => vec![DATE_COLUMN, options.metric.as_str()],
    };
    let dimensions = resolve_dimensions(table, shape, &selected, &reserved, options)?;
    debug!(?shape, ?dimensions, n_selected = selected.len(), "columns resolved");

    let mut rows = Vec::with_capacity(selected.len());
    for (row_index, cells) in selected {
        let date = parse_date(&cells[date_idx]).ok_or_else(|| IoError::UnparseableDate {
            row_index,
            raw: cells[date_idx].clone(),
        })?;
        let raw = &cells[value_idx];
        let invalid = || IoError::InvalidValue {
            row_index,
            column: value_column.to_string(),
            raw: raw.clone(),
        };
        let value = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(invalid)?;
        let mut row = NormalizedRow::plain(date, value).map_err(|_| invalid())?;
        for (name, idx) in &dimensions {
            row = row.with_dimension(name, &cells[*idx]);
        }
        rows.push(row);
    }

    info!(n_rows = rows.len(), n_dimensions = dimensions.len(), "rows normalized");
    Ok(rows)
}

fn resolve_dimensions<'t>(
    table: &'t RawTable,
    shape: TableShape,
    selected: &[(usize, &Vec<String>)],
    reserved: &[&str],
    options: &NormalizeOptions,
) -> Result<Vec<(&'t str, usize)>, IoError> {
    if let Some(requested) = &options.dimensions {
        return requested
            .iter()
            .map(|name| {
                if reserved.contains(&name.as_str()) {
                    return Err(IoError::ReservedDimension { column: name.clone() });
                }
                let idx = table
                    .column_index(name)
                    .ok_or_else(|| IoError::UnknownDimension { column: name.clone() })?;
                Ok((table.columns()[idx].as_str(), idx))
            })
            .collect();
    }

    let mut dimensions = Vec::new();
    for (idx, name) in table.columns().iter().enumerate() {
        if reserved.contains(&name.as_str()) {
            continue;
        }
        let textual = selected
            .iter()
            .any(|(_, cells)| !cells[idx].is_empty() && cells[idx].parse::<f64>().is_err());
        if shape == TableShape::Wide && !textual {
            debug!(column = %name, "numeric column treated as a metric");
            continue;
        }
        dimensions.push((name.as_str(), idx));
    }
    Ok(dimensions)
}

/// Parse `YYYY-MM-DD`, ignoring a trailing time after `T` or a space.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = match raw.find(['T', ' ']) {
        Some(split) => &raw[..split],
        None => raw,
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
