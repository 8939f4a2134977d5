use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use super::error::{DataError, Result};
use super::model::TimeTable;

/// Name of the aggregate line the source files carry next to the localities.
pub const TOTAL_ENTITY: &str = "Total";

// ---------------------------------------------------------------------------
// Sheet layout – the fixed row positions of the RAIS exports
// ---------------------------------------------------------------------------

/// Row positions of the source workbook format.
///
/// Nothing here is inferred from content: if the exports change shape, this
/// constant is the single place to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    /// Physical rows above the data block (the title banner).
    pub title_rows: usize,
    /// Data row whose cells are the real column headers.
    pub header_row: usize,
    /// Data rows holding headers, subtotals and footnotes.
    pub discarded_rows: &'static [usize],
}

pub const RAIS_LAYOUT: SheetLayout = SheetLayout {
    title_rows: 1,
    header_row: 0,
    discarded_rows: &[0, 1, 26, 28, 29, 30, 31, 32],
};

/// Per-file parameters of the reshaping step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions<'a> {
    /// Header of the column that names the entities ("UF", "Município-São Paulo").
    pub strip_label: &'a str,
    /// Drop the "Total" entity.
    pub drop_total: bool,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the first sheet of a workbook and reshape it into a [`TimeTable`].
///
/// The only failure expected in practice is [`DataError::MissingFile`];
/// malformed numeric cells become missing values.
pub fn load_workbook(path: &Path, options: &LoadOptions<'_>) -> Result<TimeTable> {
    if !path.exists() {
        return Err(DataError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let mut workbook = open_workbook_auto(path).map_err(|source| DataError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .map_err(|source| DataError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

    let table = reshape(path, &range, options, &RAIS_LAYOUT).inspect_err(|e| {
        log::error!("{e}");
    })?;
    log::debug!(
        "{}: {} periods ({}) × {} localities",
        path.display(),
        table.periods().len(),
        table.period_span(),
        table.entities().len()
    );
    Ok(table)
}

/// Turn a raw sheet (entities along rows, periods along columns) into a
/// period-indexed table.
///
/// The locality names are taken from the column whose header cell equals
/// `options.strip_label`, wherever it sits in the header row. `origin` only
/// labels layout errors.
pub fn reshape(
    origin: &Path,
    range: &Range<Data>,
    options: &LoadOptions<'_>,
    layout: &SheetLayout,
) -> Result<TimeTable> {
    let layout_error = |reason: String| DataError::UnexpectedLayout {
        path: origin.to_path_buf(),
        reason,
    };
    let grid = dense_grid(range);
    let data_rows: Vec<&[Data]> = grid
        .iter()
        .skip(layout.title_rows)
        .map(Vec::as_slice)
        .collect();

    let header = data_rows
        .get(layout.header_row)
        .ok_or_else(|| layout_error(format!("no header row at data row {}", layout.header_row)))?;
    let name_col = header
        .iter()
        .position(|cell| cell_label(cell).as_deref() == Some(options.strip_label))
        .ok_or_else(|| layout_error(format!("header row has no '{}' column", options.strip_label)))?;

    let kept: Vec<&[Data]> = data_rows
        .iter()
        .enumerate()
        .filter(|(i, _)| !layout.discarded_rows.contains(i))
        .map(|(_, row)| *row)
        .filter(|row| !row.iter().all(is_blank))
        .collect();

    // After transposition the name column becomes the column header and
    // every other header cell becomes a period.
    let mut seen = HashSet::new();
    let mut entities: Vec<(String, &[Data])> = Vec::new();
    for row in kept {
        let Some(name) = row.get(name_col).and_then(cell_label) else {
            log::warn!("skipping a data row without a locality name");
            continue;
        };
        if options.drop_total && name == TOTAL_ENTITY {
            continue;
        }
        if !seen.insert(name.clone()) {
            log::warn!("duplicate locality '{name}', keeping the first occurrence");
            continue;
        }
        entities.push((name, row));
    }

    let mut seen = HashSet::new();
    let mut periods: Vec<(String, usize)> = Vec::new();
    for (col, cell) in header.iter().enumerate() {
        if col == name_col {
            continue;
        }
        let Some(label) = cell_label(cell) else {
            continue;
        };
        if !seen.insert(label.clone()) {
            log::warn!("duplicate period '{label}', keeping the first occurrence");
            continue;
        }
        periods.push((label, col));
    }
    periods.sort_by(|(a, _), (b, _)| compare_periods(a, b));

    let values: Vec<Vec<Option<f64>>> = periods
        .iter()
        .map(|(_, col)| {
            entities
                .iter()
                .map(|(_, row)| row.get(*col).and_then(coerce_number))
                .collect()
        })
        .collect();

    Ok(TimeTable::from_parts(
        periods.into_iter().map(|(label, _)| label).collect(),
        entities.into_iter().map(|(name, _)| name).collect(),
        values,
    ))
}

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

/// Copy the range into a grid addressed by absolute sheet coordinates.
fn dense_grid(range: &Range<Data>) -> Vec<Vec<Data>> {
    let Some((row0, col0)) = range.start() else {
        return Vec::new();
    };
    let (row0, col0) = (row0 as usize, col0 as usize);
    let (height, width) = range.get_size();
    let mut grid = vec![vec![Data::Empty; col0 + width]; row0 + height];
    for (r, c, cell) in range.used_cells() {
        grid[row0 + r][col0 + c] = cell.clone();
    }
    grid
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Textual label of a header or name cell, with numeric artifacts removed.
fn cell_label(cell: &Data) -> Option<String> {
    let label = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::Float(v) => format_number(*v),
        Data::Int(v) => v.to_string(),
        Data::String(s) => normalize_label(s),
        other => other.to_string(),
    };
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_string())
}

/// Canonical form of a period label: `"2006.0"` and `" 2006 "` become `"2006"`.
pub fn normalize_label(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => format_number(v),
        _ => trimmed.to_string(),
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// Numeric value of a cell; anything unparsable is missing.
pub fn coerce_number(cell: &Data) -> Option<f64> {
    let v = match cell {
        Data::Float(v) => *v,
        Data::Int(v) => *v as f64,
        Data::Bool(b) => f64::from(u8::from(*b)),
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Numeric periods ascending, then any non-numeric labels alphabetically.
fn compare_periods(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
