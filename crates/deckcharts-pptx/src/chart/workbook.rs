//! The workbook embedded behind every chart, holding the chart's data so the presentation editor
//! can reopen it.

use std::io::{Cursor, Write};

use zip::write::FileOptions;

use super::ChartData;
use crate::xml::escape_attr;
use crate::PptxError;

pub(crate) const SHEET_NAME: &str = "Sheet1";

/// Write a single-sheet XLSX: categories down column A from row 2, one column per series with
/// its name in row 1.
pub(crate) fn write_chart_workbook(data: &ChartData) -> Result<Vec<u8>, PptxError> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options =
            FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS_XML.as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(workbook_xml().as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(WORKBOOK_RELS_XML.as_bytes())?;

        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(worksheet_xml(data).as_bytes())?;

        zip.finish()?;
    }
    Ok(buffer.into_inner())
}

/// `A`, `B`, ..., `Z`, `AA`, ... for a zero-based column index.
pub(crate) fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Absolute A1 reference on the data sheet, e.g. `Sheet1!$B$2:$B$5`.
pub(crate) fn sheet_range(first_col: usize, first_row: usize, last_col: usize, last_row: usize) -> String {
    let start = format!("${}${}", column_letters(first_col), first_row);
    if (first_col, first_row) == (last_col, last_row) {
        return format!("{SHEET_NAME}!{start}");
    }
    format!("{SHEET_NAME}!{start}:${}${}", column_letters(last_col), last_row)
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>
"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>
"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>
"#;

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="{SHEET_NAME}" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>
"#
    )
}

fn worksheet_xml(data: &ChartData) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);
    out.push('\n');
    out.push_str("  <sheetData>\n");

    out.push_str(r#"    <row r="1">"#);
    for (idx, series) in data.series().iter().enumerate() {
        push_text_cell(&mut out, idx + 1, 1, &series.name);
    }
    out.push_str("</row>\n");

    for (row_idx, category) in data.categories().iter().enumerate() {
        let row = row_idx + 2;
        out.push_str(&format!(r#"    <row r="{row}">"#));
        push_text_cell(&mut out, 0, row, category);
        for (col_idx, series) in data.series().iter().enumerate() {
            if let Some(value) = series.values.get(row_idx).copied().flatten() {
                let cell = format!("{}{row}", column_letters(col_idx + 1));
                out.push_str(&format!(r#"<c r="{cell}"><v>{value}</v></c>"#));
            }
        }
        out.push_str("</row>\n");
    }

    out.push_str("  </sheetData>\n");
    out.push_str("</worksheet>\n");
    out
}

fn push_text_cell(out: &mut String, col: usize, row: usize, text: &str) {
    let cell = format!("{}{row}", column_letters(col));
    out.push_str(&format!(
        r#"<c r="{cell}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        escape_attr(text)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::SeriesValues;
    use std::io::Read;

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn sheet_ranges_are_absolute() {
        assert_eq!(sheet_range(1, 1, 1, 1), "Sheet1!$B$1");
        assert_eq!(sheet_range(0, 2, 0, 4), "Sheet1!$A$2:$A$4");
    }

    #[test]
    fn workbook_holds_the_dataset() {
        let data = ChartData::new(
            vec!["2021".into(), "<2022>".into()],
            vec![SeriesValues {
                name: "A & B_0".into(),
                values: vec![Some(1.5), None],
            }],
        )
        .unwrap();
        let bytes = write_chart_workbook(&data).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();

        let doc = roxmltree::Document::parse(&sheet).unwrap();
        let texts: Vec<_> = doc
            .descendants()
            .filter(|n| n.tag_name().name() == "t")
            .filter_map(|n| n.text())
            .collect();
        assert_eq!(texts, vec!["A & B_0", "2021", "<2022>"]);
        assert!(sheet.contains(r#"<c r="B2"><v>1.5</v></c>"#));
        assert!(!sheet.contains(r#"r="B3""#));
    }
}
