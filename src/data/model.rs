use std::fmt;
use std::str::FromStr;

use super::error::{DataError, Reference, Result};

// ---------------------------------------------------------------------------
// DatasetKey – the closed set of known datasets
// ---------------------------------------------------------------------------

/// Identifier of one of the four RAIS series the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetKey {
    EstablishmentsByState,
    EstablishmentsBySpMunicipality,
    EmployeesByState,
    EmployeesBySpMunicipality,
}

impl DatasetKey {
    pub const ALL: [DatasetKey; 4] = [
        DatasetKey::EstablishmentsByState,
        DatasetKey::EstablishmentsBySpMunicipality,
        DatasetKey::EmployeesByState,
        DatasetKey::EmployeesBySpMunicipality,
    ];

    /// Stable textual key, also used in export file names.
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKey::EstablishmentsByState => "estab_estados",
            DatasetKey::EstablishmentsBySpMunicipality => "estab_municipios_sp",
            DatasetKey::EmployeesByState => "empreg_estados",
            DatasetKey::EmployeesBySpMunicipality => "empreg_municipios_sp",
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetKey {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        DatasetKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DataError::invalid(Reference::Dataset, s))
    }
}

// ---------------------------------------------------------------------------
// TimeTable – periods × entities matrix
// ---------------------------------------------------------------------------

/// A period-indexed table: one row per period, one column per entity.
///
/// Built once by the loader and never mutated afterwards. Period labels are
/// unique and sorted in ascending numeric order, entity names are unique and
/// keep the spreadsheet order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTable {
    periods: Vec<String>,
    entities: Vec<String>,
    /// Row-major: `values[period][entity]`.
    values: Vec<Vec<Option<f64>>>,
}

impl TimeTable {
    pub(crate) fn from_parts(
        periods: Vec<String>,
        entities: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    ) -> Self {
        debug_assert_eq!(periods.len(), values.len());
        debug_assert!(values.iter().all(|row| row.len() == entities.len()));
        TimeTable {
            periods,
            entities,
            values,
        }
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn first_period(&self) -> Option<&str> {
        self.periods.first().map(String::as_str)
    }

    pub fn last_period(&self) -> Option<&str> {
        self.periods.last().map(String::as_str)
    }

    /// Human readable period range, e.g. `2006–2019`.
    pub fn period_span(&self) -> String {
        match (self.first_period(), self.last_period()) {
            (Some(first), Some(last)) => format!("{first}–{last}"),
            _ => String::new(),
        }
    }

    pub fn period_index(&self, period: &str) -> Result<usize> {
        self.periods
            .iter()
            .position(|p| p == period)
            .ok_or_else(|| DataError::invalid(Reference::Period, period))
    }

    pub fn entity_index(&self, entity: &str) -> Result<usize> {
        self.entities
            .iter()
            .position(|e| e == entity)
            .ok_or_else(|| DataError::invalid(Reference::Entity, entity))
    }

    pub fn value(&self, period: &str, entity: &str) -> Result<Option<f64>> {
        let row = self.period_index(period)?;
        let col = self.entity_index(entity)?;
        Ok(self.values[row][col])
    }

    /// Value by position; panics on out-of-range indices like slice indexing.
    pub fn value_at(&self, row: usize, col: usize) -> Option<f64> {
        self.values[row][col]
    }

    /// All entity values for one period, in entity order.
    pub fn row(&self, period: &str) -> Result<&[Option<f64>]> {
        let row = self.period_index(period)?;
        Ok(&self.values[row])
    }

    /// The series of one entity, in period order.
    pub fn column(&self, entity: &str) -> Result<Vec<Option<f64>>> {
        let col = self.entity_index(entity)?;
        Ok(self.values.iter().map(|row| row[col]).collect())
    }
}

// ---------------------------------------------------------------------------
// LabeledTable – a TimeTable plus its display metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable {
    pub key: DatasetKey,
    pub title: &'static str,
    /// Axis label for the values, e.g. "Nº de Empregados".
    pub unit_label: &'static str,
    pub description: &'static str,
    pub table: TimeTable,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn table() -> TimeTable {
        TimeTable::from_parts(
            vec!["2006".into(), "2007".into(), "2008".into()],
            vec!["SP".into(), "MG".into(), "AM".into()],
            vec![
                vec![Some(100.0), Some(50.0), None],
                vec![Some(120.0), Some(40.0), Some(5.0)],
                vec![Some(150.0), Some(60.0), Some(10.0)],
            ],
        )
    }

    #[test]
    fn key_parses_from_its_text_form() {
        for key in DatasetKey::ALL {
            assert_eq!(key.as_str().parse::<DatasetKey>().unwrap(), key);
        }
    }

    #[test]
    fn unknown_key_is_an_invalid_reference() {
        let err = "estab_paises".parse::<DatasetKey>().unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidReference {
                kind: Reference::Dataset,
                ..
            }
        ));
    }

    #[test]
    fn lookups_by_label() {
        let t = table();
        assert_eq!(t.value("2007", "MG").unwrap(), Some(40.0));
        assert_eq!(t.value("2006", "AM").unwrap(), None);
        assert_eq!(t.row("2008").unwrap(), &[Some(150.0), Some(60.0), Some(10.0)]);
        assert_eq!(t.column("SP").unwrap(), vec![Some(100.0), Some(120.0), Some(150.0)]);
        assert_eq!(t.period_span(), "2006–2008");
    }

    #[test]
    fn missing_labels_are_rejected() {
        let t = table();
        assert!(matches!(
            t.value("2020", "SP"),
            Err(DataError::InvalidReference {
                kind: Reference::Period,
                ..
            })
        ));
        assert!(matches!(
            t.column("RJ"),
            Err(DataError::InvalidReference {
                kind: Reference::Entity,
                ..
            })
        ));
    }
}
