use std::io::Write;

use super::error::{DataError, Result};
use super::model::{DatasetKey, TimeTable};

/// Header of the period column in exported files.
pub const PERIOD_HEADER: &str = "Ano";

/// Default file name offered when saving a dataset.
pub fn export_file_name(key: DatasetKey) -> String {
    format!("microeletronica_{key}.csv")
}

/// Plain integer rendering used for exported values.
pub fn format_integer(value: f64) -> String {
    let rounded = value.round();
    // Avoid "-0" for small negative values.
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded:.0}")
    }
}

/// Write the selected localities as CSV: one line per period, missing
/// values as empty fields.
pub fn write_csv<W: Write>(table: &TimeTable, localities: &[String], writer: W) -> Result<()> {
    let cols = localities
        .iter()
        .map(|name| table.entity_index(name))
        .collect::<Result<Vec<_>>>()?;

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(
        std::iter::once(PERIOD_HEADER).chain(localities.iter().map(String::as_str)),
    )?;
    for (row, period) in table.periods().iter().enumerate() {
        let mut record = Vec::with_capacity(cols.len() + 1);
        record.push(period.clone());
        record.extend(
            cols.iter()
                .map(|&c| table.value_at(row, c).map(format_integer).unwrap_or_default()),
        );
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn to_csv_string(table: &TimeTable, localities: &[String]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(table, localities, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| DataError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::table;

    #[test]
    fn header_and_missing_cells() {
        let csv = to_csv_string(&table(), &["AM".to_string(), "SP".to_string()]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Ano,AM,SP");
        assert_eq!(lines[1], "2006,,100");
        assert_eq!(lines[3], "2008,10,150");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn integers_are_rounded() {
        assert_eq!(format_integer(1234.4), "1234");
        assert_eq!(format_integer(1234.6), "1235");
        assert_eq!(format_integer(-0.2), "0");
    }

    #[test]
    fn unknown_locality_is_rejected() {
        assert!(to_csv_string(&table(), &["RJ".to_string()]).is_err());
    }

    #[test]
    fn file_name_uses_the_key() {
        assert_eq!(
            export_file_name(DatasetKey::EmployeesByState),
            "microeletronica_empreg_estados.csv"
        );
    }
}
