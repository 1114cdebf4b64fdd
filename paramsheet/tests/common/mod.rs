#![allow(dead_code)]

use paramsheet::cell_ref;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const SHEET_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#;

/// Worksheet XML for a grid of text cells; "" leaves the cell out.
///
/// Numbers are written as `<v>` values, everything else goes to `strings`.
pub fn sheet_xml(rows: &[&[&str]], strings: &mut Vec<String>) -> String {
    let mut xml = String::from(SHEET_HEADER);
    xml.push_str("<sheetData>");
    for (r, row) in rows.iter().enumerate() {
        xml.push_str(&format!(
            r#"<row r="{}" spans="1:{}">"#,
            r + 1,
            row.len().max(1)
        ));
        for (c, raw) in row.iter().enumerate() {
            if raw.is_empty() {
                continue;
            }
            let reference = cell_ref(c, r);
            if raw.parse::<f64>().is_ok() {
                xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, raw));
            } else {
                let index = match strings.iter().position(|s| s == raw) {
                    Some(index) => index,
                    None => {
                        strings.push(raw.to_string());
                        strings.len() - 1
                    }
                };
                xml.push_str(&format!(
                    r#"<c r="{}" t="s"><v>{}</v></c>"#,
                    reference, index
                ));
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Wrap raw `<row>` elements into a worksheet
pub fn raw_sheet_xml(rows: &str) -> String {
    format!("{}<sheetData>{}</sheetData></worksheet>", SHEET_HEADER, rows)
}

/// Write a workbook whose sheets are given as grids of text cells
pub fn create_mock_xlsx(path: &Path, sheets: &[(&str, &[&[&str]])]) -> anyhow::Result<()> {
    let mut strings = Vec::new();
    let sheets: Vec<(&str, String)> = sheets
        .iter()
        .map(|(name, rows)| (*name, sheet_xml(rows, &mut strings)))
        .collect();
    write_xlsx(path, &sheets, &strings)
}

/// Write a workbook from finished worksheet XML and a shared string table
pub fn write_xlsx(
    path: &Path,
    sheets: &[(&str, String)],
    shared_strings: &[String],
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options)?;
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
"#,
    );
    for (i, _) in sheets.iter().enumerate() {
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i + 1
        ));
    }
    content_types.push_str("</Types>");
    zip.write_all(content_types.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#.as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    let mut workbook_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
"#,
    );
    for (i, (name, _)) in sheets.iter().enumerate() {
        workbook_xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            name,
            i + 1,
            i + 1
        ));
    }
    workbook_xml.push_str("</sheets></workbook>");
    zip.write_all(workbook_xml.as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    let mut rels_xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for (i, _) in sheets.iter().enumerate() {
        rels_xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }
    rels_xml.push_str("</Relationships>");
    zip.write_all(rels_xml.as_bytes())?;

    if !shared_strings.is_empty() {
        zip.start_file("xl/sharedStrings.xml", options)?;
        let mut sst = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            shared_strings.len()
        );
        for s in shared_strings {
            sst.push_str(&format!("<si><t>{}</t></si>", escape(s)));
        }
        sst.push_str("</sst>");
        zip.write_all(sst.as_bytes())?;
    }

    for (i, (_, xml)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)?;
        zip.write_all(xml.as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Parameter sheet with one "Corridor" group and four biotope rows
pub const CORRIDOR: &[&[&str]] = &[
    &["", "", "Network name", "Corridor"],
    &["", "", "Average dispersal distance (metres)", "500"],
    &["", "", "Minimum dispersal probability", "0.05"],
    &[],
    &["", "BiotopeCode", "Biotope", "Quality", "Reproduction", "Friction"],
    &["", "1", "Forest", "1", "1", "1.5"],
    &["", "2", "Meadow", "2", "0", "5"],
    &["", "3", "Water", "0", "0", "0"],
    &["", "4", "Urban", "3", "1", "2.5"],
];
