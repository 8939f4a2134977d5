//! Synthetic workbooks laid out exactly like the RAIS source files.
//!
//! Used by the `generate_sample` binary and by the test-suite; the writer
//! emits a minimal single-sheet `.xlsx` package (inline strings, no styles)
//! that calamine and spreadsheet applications both open.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Range};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::loader::{RAIS_LAYOUT, TOTAL_ENTITY};
use super::model::DatasetKey;

/// First data row (below the title row) holding an entity.
const FIRST_ENTITY_ROW: usize = 2;
/// Data row where the source files carry the aggregate line.
const TOTAL_ROW: usize = 27;
/// How many entities fit between the header block and the footer block.
pub const MAX_ENTITIES: usize = 24;

const NOTES: [&str; 6] = [
    "Vínculos ativos em 31/12",
    "{ñ class}",
    "Fonte: RAIS/MTE",
    "Nota: CNAE 2.0, divisão 26",
    "Elaboração própria",
    "Valores sujeitos a revisão",
];

// ---------------------------------------------------------------------------
// SampleSheet – description of one source workbook
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SampleSheet {
    pub title: String,
    /// Header of the entity-name column ("UF", "Município-São Paulo").
    pub strip_label: String,
    pub periods: Vec<i64>,
    /// `(entity, values per period)`; `None` is written as a `-` text cell.
    pub rows: Vec<(String, Vec<Option<f64>>)>,
    /// Append a "Total" line summing every entity.
    pub with_total: bool,
}

impl SampleSheet {
    /// A sheet shaped like the source file of `key`, including its total line.
    pub fn for_dataset(
        key: DatasetKey,
        periods: Vec<i64>,
        rows: Vec<(String, Vec<Option<f64>>)>,
    ) -> Self {
        let spec = key.spec();
        SampleSheet {
            title: format!("RAIS - {}", spec.title),
            strip_label: spec.strip_label.to_string(),
            periods,
            rows,
            with_total: true,
        }
    }

    /// Render the sheet as an absolute cell grid (row 0 = physical top row).
    pub fn to_grid(&self) -> Result<Vec<Vec<Data>>> {
        if self.rows.len() > MAX_ENTITIES {
            bail!(
                "{} entities do not fit the sheet layout (max {MAX_ENTITIES})",
                self.rows.len()
            );
        }
        let layout = &RAIS_LAYOUT;
        let width = self.periods.len() + 1;
        let data_rows = layout
            .discarded_rows
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .max(TOTAL_ROW)
            + 1;
        let mut grid = vec![vec![Data::Empty; width]; layout.title_rows + data_rows];
        let top = layout.title_rows;

        grid[0][0] = Data::String(self.title.clone());

        let header = &mut grid[top + layout.header_row];
        header[0] = Data::String(self.strip_label.clone());
        for (i, period) in self.periods.iter().enumerate() {
            header[i + 1] = Data::Float(*period as f64);
        }

        let notes = layout
            .discarded_rows
            .iter()
            .filter(|&&r| r != layout.header_row);
        for (&row, note) in notes.zip(NOTES.iter().cycle()) {
            grid[top + row][0] = Data::String((*note).to_string());
        }

        for (n, (name, values)) in self.rows.iter().enumerate() {
            let row = &mut grid[top + FIRST_ENTITY_ROW + n];
            row[0] = Data::String(name.clone());
            for (i, value) in values.iter().take(self.periods.len()).enumerate() {
                row[i + 1] = match value {
                    Some(v) => Data::Float(*v),
                    None => Data::String("-".to_string()),
                };
            }
        }

        if self.with_total {
            let row = &mut grid[top + TOTAL_ROW];
            row[0] = Data::String(TOTAL_ENTITY.to_string());
            for i in 0..self.periods.len() {
                let sum: f64 = self
                    .rows
                    .iter()
                    .filter_map(|(_, values)| values.get(i).copied().flatten())
                    .sum();
                row[i + 1] = Data::Float(sum);
            }
        }

        Ok(grid)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_xlsx(path, &self.title, &self.to_grid()?)
    }
}

// ---------------------------------------------------------------------------
// Grid helpers
// ---------------------------------------------------------------------------

/// Build an in-memory calamine range anchored at `A1`.
pub fn to_range(grid: &[Vec<Data>]) -> Range<Data> {
    let height = grid.len();
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    if height == 0 || width == 0 {
        return Range::empty();
    }
    let mut range = Range::new((0, 0), ((height - 1) as u32, (width - 1) as u32));
    for (r, row) in grid.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if *cell != Data::Empty {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
    }
    range
}

// ---------------------------------------------------------------------------
// Minimal .xlsx writer
// ---------------------------------------------------------------------------

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// Write `grid` as the only sheet of a new `.xlsx` file.
pub fn write_xlsx(path: &Path, sheet_name: &str, grid: &[Vec<Data>]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut zip = ZipWriter::new(file);

    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_xml(&sheet_title(sheet_name))
    );

    let parts: [(&str, String); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(grid)),
    ];
    for (name, body) in parts {
        zip.start_file(name, SimpleFileOptions::default())
            .with_context(|| format!("adding {name}"))?;
        zip.write_all(body.as_bytes())
            .with_context(|| format!("writing {name}"))?;
    }
    zip.finish().context("finishing xlsx archive")?;
    Ok(())
}

/// Sheet names are limited to 31 characters and may not contain `[]:*?/\`.
fn sheet_title(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    if cleaned.trim().is_empty() {
        "Planilha1".to_string()
    } else {
        cleaned
    }
}

fn sheet_xml(grid: &[Vec<Data>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in grid.iter().enumerate() {
        if row.iter().all(|c| *c == Data::Empty) {
            continue;
        }
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(c), r + 1);
            match cell {
                Data::Empty => {}
                Data::Float(v) => xml.push_str(&format!(r#"<c r="{reference}"><v>{v}</v></c>"#)),
                Data::Int(v) => xml.push_str(&format!(r#"<c r="{reference}"><v>{v}</v></c>"#)),
                Data::Bool(b) => xml.push_str(&format!(
                    r#"<c r="{reference}" t="b"><v>{}</v></c>"#,
                    u8::from(*b)
                )),
                other => xml.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    escape_xml(&other.to_string())
                )),
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Zero-based column index to spreadsheet letters (0 → A, 26 → AA).
fn column_name(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn xml_text_is_escaped() {
        assert_eq!(escape_xml("P&D <SP>"), "P&amp;D &lt;SP&gt;");
    }

    #[test]
    fn too_many_entities_are_refused() {
        let sheet = SampleSheet {
            title: "x".into(),
            strip_label: "UF".into(),
            periods: vec![2006],
            rows: (0..=MAX_ENTITIES)
                .map(|i| (format!("E{i}"), vec![Some(1.0)]))
                .collect(),
            with_total: false,
        };
        assert!(sheet.to_grid().is_err());
    }
}
