//! Aggregations behind the metric cards and charts.
//!
//! Missing values are always excluded, never treated as zero.

use super::error::Result;
use super::model::TimeTable;

/// Percentage change from `start` to `end`.
///
/// A zero `start` is defined as no change (`0.0`) instead of an infinite or
/// NaN result.
pub fn pct_change(start: f64, end: f64) -> f64 {
    if start == 0.0 {
        0.0
    } else {
        (end - start) / start * 100.0
    }
}

/// X coordinate of a period on a numeric axis; non-numeric labels fall back
/// to their position.
pub fn period_axis_value(label: &str, index: usize) -> f64 {
    label.parse::<f64>().unwrap_or(index as f64)
}

fn entity_indices(table: &TimeTable, names: &[String]) -> Result<Vec<usize>> {
    names.iter().map(|n| table.entity_index(n)).collect()
}

/// Candidate columns: the given names, or every entity when `None`.
fn candidate_indices(table: &TimeTable, names: Option<&[String]>) -> Result<Vec<usize>> {
    match names {
        Some(names) => entity_indices(table, names),
        None => Ok((0..table.entities().len()).collect()),
    }
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub first_period: String,
    pub last_period: String,
    pub total_start: f64,
    pub total_end: f64,
    pub change_pct: f64,
    /// Locality with the highest last-period value.
    pub leader: Option<(String, f64)>,
}

/// Totals and leader over `localities`; `None` for a table without periods.
pub fn summary(table: &TimeTable, localities: &[String]) -> Result<Option<Summary>> {
    let (Some(first), Some(last)) = (table.first_period(), table.last_period()) else {
        return Ok(None);
    };
    let cols = entity_indices(table, localities)?;
    let first_row = table.period_index(first)?;
    let last_row = table.period_index(last)?;

    let total = |row: usize| -> f64 {
        cols.iter()
            .filter_map(|&c| table.value_at(row, c))
            .sum()
    };
    let total_start = total(first_row);
    let total_end = total(last_row);

    let mut leader: Option<(usize, f64)> = None;
    for &c in &cols {
        if let Some(v) = table.value_at(last_row, c) {
            if leader.map_or(true, |(_, best)| v > best) {
                leader = Some((c, v));
            }
        }
    }

    Ok(Some(Summary {
        first_period: first.to_string(),
        last_period: last.to_string(),
        total_start,
        total_end,
        change_pct: pct_change(total_start, total_end),
        leader: leader.map(|(c, v)| (table.entities()[c].clone(), v)),
    }))
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// Up to `n` entities with the highest value at `period`, best first.
pub fn top_entities(table: &TimeTable, period: &str, n: usize) -> Result<Vec<String>> {
    let mut ranked = ranked_desc(table, period)?;
    ranked.truncate(n);
    Ok(ranked.into_iter().map(|(name, _)| name).collect())
}

/// The `top_n` largest values at `period`, in ascending order (bar-chart order).
pub fn ranking(table: &TimeTable, period: &str, top_n: usize) -> Result<Vec<(String, f64)>> {
    let mut ranked = ranked_desc(table, period)?;
    ranked.truncate(top_n);
    ranked.reverse();
    Ok(ranked)
}

fn ranked_desc(table: &TimeTable, period: &str) -> Result<Vec<(String, f64)>> {
    let row = table.period_index(period)?;
    let mut ranked: Vec<(String, f64)> = (0..table.entities().len())
        .filter_map(|c| {
            table
                .value_at(row, c)
                .map(|v| (table.entities()[c].clone(), v))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(ranked)
}

/// Change between the first and last period per entity, ascending, keeping
/// the `top_n` largest. Entities missing either endpoint are left out.
pub fn pct_change_by_entity(
    table: &TimeTable,
    localities: Option<&[String]>,
    top_n: usize,
) -> Result<Vec<(String, f64)>> {
    let (Some(first), Some(last)) = (table.first_period(), table.last_period()) else {
        return Ok(Vec::new());
    };
    let first_row = table.period_index(first)?;
    let last_row = table.period_index(last)?;

    let mut changes: Vec<(String, f64)> = candidate_indices(table, localities)?
        .into_iter()
        .filter_map(|c| {
            let start = table.value_at(first_row, c)?;
            let end = table.value_at(last_row, c)?;
            Some((table.entities()[c].clone(), pct_change(start, end)))
        })
        .collect();
    changes.sort_by(|a, b| a.1.total_cmp(&b.1));
    let skip = changes.len().saturating_sub(top_n);
    Ok(changes.split_off(skip))
}

// ---------------------------------------------------------------------------
// Heatmap & series
// ---------------------------------------------------------------------------

/// Entity × period matrix for the heatmap view.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub entities: Vec<String>,
    pub periods: Vec<String>,
    /// `values[entity][period]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    /// Smallest and largest present value.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Heatmap over the first `top_n` of `localities`, or over the `top_n`
/// largest entities of the last period when no selection is given.
pub fn heatmap(
    table: &TimeTable,
    localities: Option<&[String]>,
    top_n: usize,
) -> Result<Heatmap> {
    let entities: Vec<String> = match (localities, table.last_period()) {
        (Some(names), _) => names.iter().take(top_n).cloned().collect(),
        (None, Some(last)) => top_entities(table, last, top_n)?,
        (None, None) => Vec::new(),
    };
    let values = entities
        .iter()
        .map(|e| table.column(e))
        .collect::<Result<Vec<_>>>()?;
    Ok(Heatmap {
        entities,
        periods: table.periods().to_vec(),
        values,
    })
}

/// Plottable `(x, value)` points of one entity, skipping missing values.
pub fn series_points(table: &TimeTable, entity: &str) -> Result<Vec<(f64, f64)>> {
    let column = table.column(entity)?;
    Ok(table
        .periods()
        .iter()
        .enumerate()
        .zip(column)
        .filter_map(|((i, label), v)| v.map(|v| (period_axis_value(label, i), v)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::DataError;
    use crate::data::model::tests::table;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn long_table() -> TimeTable {
        let periods: Vec<String> = (2006..=2019).map(|y| y.to_string()).collect();
        let values = (0..periods.len())
            .map(|i| {
                vec![
                    Some(1000.0 + 50.0 * i as f64),
                    Some(0.0),
                    if i == 0 { None } else { Some(10.0) },
                ]
            })
            .collect();
        TimeTable::from_parts(periods, names(&["SP", "ZERO", "LATE"]), values)
    }

    #[test]
    fn pct_change_matches_the_formula() {
        let t = long_table();
        let start = t.value("2006", "SP").unwrap().unwrap();
        let end = t.value("2019", "SP").unwrap().unwrap();
        let changes = pct_change_by_entity(&t, Some(&names(&["SP"])), 5).unwrap();
        assert_eq!(changes.len(), 1);
        let expected = (end - start) / start * 100.0;
        assert!((changes[0].1 - expected).abs() < 1e-9);
        assert!((expected - 65.0).abs() < 1e-9);
    }

    #[test]
    fn zero_start_is_no_change() {
        assert_eq!(pct_change(0.0, 50.0), 0.0);
        let changes = pct_change_by_entity(&long_table(), None, 10).unwrap();
        let zero = changes.iter().find(|(n, _)| n == "ZERO").unwrap();
        assert_eq!(zero.1, 0.0);
        // LATE has no 2006 value and is excluded.
        assert!(changes.iter().all(|(n, _)| n != "LATE"));
    }

    #[test]
    fn summary_excludes_missing_values() {
        let s = summary(&table(), &names(&["SP", "MG", "AM"])).unwrap().unwrap();
        assert_eq!(s.first_period, "2006");
        assert_eq!(s.last_period, "2008");
        assert_eq!(s.total_start, 150.0);
        assert_eq!(s.total_end, 220.0);
        assert!((s.change_pct - 70.0 / 150.0 * 100.0).abs() < 1e-9);
        assert_eq!(s.leader, Some(("SP".to_string(), 150.0)));
    }

    #[test]
    fn summary_rejects_unknown_localities() {
        assert!(matches!(
            summary(&table(), &names(&["RJ"])),
            Err(DataError::InvalidReference { .. })
        ));
    }

    #[test]
    fn ranking_is_ascending_top_n() {
        let r = ranking(&table(), "2008", 2).unwrap();
        assert_eq!(r, vec![("MG".to_string(), 60.0), ("SP".to_string(), 150.0)]);
        assert!(ranking(&table(), "1999", 2).is_err());
    }

    #[test]
    fn ranking_skips_missing() {
        let r = ranking(&table(), "2006", 10).unwrap();
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn heatmap_defaults_to_last_period_leaders() {
        let h = heatmap(&table(), None, 2).unwrap();
        assert_eq!(h.entities, names(&["SP", "MG"]));
        assert_eq!(h.values[1], vec![Some(50.0), Some(40.0), Some(60.0)]);
        assert_eq!(h.bounds(), Some((40.0, 150.0)));

        let picked = heatmap(&table(), Some(&names(&["AM", "SP", "MG"])), 2).unwrap();
        assert_eq!(picked.entities, names(&["AM", "SP"]));
    }

    #[test]
    fn series_skips_gaps() {
        let points = series_points(&table(), "AM").unwrap();
        assert_eq!(points, vec![(2007.0, 5.0), (2008.0, 10.0)]);
    }
}
