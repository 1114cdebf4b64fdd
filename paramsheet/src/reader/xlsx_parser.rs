//! XLSX package parsing: relationships, sheet definitions, shared strings and
//! worksheet grids

use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

use super::parser_utils::{attr_value, parse_spans_end, read_text_node};
use super::{CellValue, Grid, ReadError, SheetDef};
use crate::cell_ref::{MAX_COLUMNS, MAX_ROWS, parse_col};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// An open XLSX package.
///
/// Relationships, sheet definitions and shared strings are decoded once when
/// the package is opened; worksheets are parsed on demand.
pub struct XlsxWorkbook<R: Read + Seek> {
    archive: ZipArchive<R>,
    relationships: HashMap<String, String>,
    sheet_defs: Vec<SheetDef>,
    shared_strings: Vec<String>,
}

impl XlsxWorkbook<BufReader<File>> {
    /// Open a workbook from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Opening workbook {}", path.display());
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> XlsxWorkbook<R> {
    /// Open a workbook from any seekable byte source
    pub fn from_reader(reader: R) -> Result<Self, ReadError> {
        let mut archive = ZipArchive::new(reader)?;

        let relationships = load_relationships(&mut archive)?;
        let sheet_defs = load_sheet_defs(&mut archive)?;
        if let Some(def) = sheet_defs
            .iter()
            .find(|def| !relationships.contains_key(&def.relationship_id))
        {
            return Err(ReadError::UnresolvedRelationship {
                sheet: def.name.clone(),
                id: def.relationship_id.clone(),
            });
        }
        let shared_strings = load_shared_strings(&mut archive)?;

        debug!(
            "Package has {} sheets, {} relationships, {} shared strings",
            sheet_defs.len(),
            relationships.len(),
            shared_strings.len()
        );

        Ok(Self {
            archive,
            relationships,
            sheet_defs,
            shared_strings,
        })
    }

    pub fn sheet_count(&self) -> usize {
        self.sheet_defs.len()
    }

    /// Get all sheet names in declaration order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheet_defs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet_name(&self, index: usize) -> Result<&str, ReadError> {
        self.sheet_def(index).map(|def| def.name.as_str())
    }

    pub fn shared_strings(&self) -> &[String] {
        &self.shared_strings
    }

    /// Package path of a worksheet, resolved through the relationship map
    pub fn sheet_path(&self, index: usize) -> Result<String, ReadError> {
        let def = self.sheet_def(index)?;
        let target = self
            .relationships
            .get(&def.relationship_id)
            .ok_or_else(|| ReadError::UnresolvedRelationship {
                sheet: def.name.clone(),
                id: def.relationship_id.clone(),
            })?;
        Ok(resolve_target(target))
    }

    /// Materialize a worksheet as a grid of cell values
    pub fn load_sheet_data(&mut self, index: usize) -> Result<Grid, ReadError> {
        let path = self.sheet_path(index)?;
        debug!("Loading sheet #{} from {}", index + 1, path);

        let xml = read_part(&mut self.archive, &path)?
            .ok_or_else(|| ReadError::format(&path, "worksheet part not found in package"))?;
        let grid = parse_sheet_xml(&path, &xml, &self.shared_strings)?;

        debug!(
            "Sheet #{} has {} rows, {} columns",
            index + 1,
            grid.row_count(),
            grid.width()
        );
        Ok(grid)
    }

    fn sheet_def(&self, index: usize) -> Result<&SheetDef, ReadError> {
        self.sheet_defs.get(index).ok_or(ReadError::SheetIndex {
            index,
            count: self.sheet_defs.len(),
        })
    }
}

/// Targets are relative to `xl/` unless they are absolute package paths
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// Read a whole package part; `None` if the archive has no such entry
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, ReadError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)
        .map_err(|e| ReadError::Zip(ZipError::Io(e)))?;
    Ok(Some(bytes))
}

fn required_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, ReadError> {
    read_part(archive, name)?.ok_or_else(|| ReadError::MissingPart(name.to_string()))
}

fn load_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<HashMap<String, String>, ReadError> {
    let xml = required_part(archive, WORKBOOK_RELS_PART)?;
    let mut reader = Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);
    let xml_err = |e: quick_xml::Error| ReadError::xml(WORKBOOK_RELS_PART, e);

    let mut rels = HashMap::new();
    let mut saw_root = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"Relationships" => saw_root = true,
                b"Relationship" => {
                    let id = attr_value(&e, b"Id").map_err(xml_err)?;
                    let target = attr_value(&e, b"Target").map_err(xml_err)?;
                    if let (Some(id), Some(target)) = (id, target) {
                        rels.insert(id, target);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(ReadError::xml(
            WORKBOOK_RELS_PART,
            "no <Relationships> root element",
        ));
    }
    Ok(rels)
}

fn load_sheet_defs<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<SheetDef>, ReadError> {
    let xml = required_part(archive, WORKBOOK_PART)?;
    let mut reader = Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);
    let xml_err = |e: quick_xml::Error| ReadError::xml(WORKBOOK_PART, e);

    let mut sheet_defs = Vec::new();
    let mut saw_root = false;
    let mut in_sheets = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"workbook" => saw_root = true,
                b"sheets" => in_sheets = true,
                b"sheet" if in_sheets => {
                    let name = attr_value(&e, b"name").map_err(xml_err)?;
                    let rid = attr_value(&e, b"id").map_err(xml_err)?;
                    match (name, rid) {
                        (Some(name), Some(relationship_id)) => sheet_defs.push(SheetDef {
                            name,
                            relationship_id,
                        }),
                        _ => {
                            return Err(ReadError::xml(
                                WORKBOOK_PART,
                                "<sheet> element without name or r:id",
                            ));
                        }
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"sheets" => in_sheets = false,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(ReadError::xml(WORKBOOK_PART, "no <workbook> root element"));
    }
    Ok(sheet_defs)
}

/// One entry per `<si>`; rich-text runs are concatenated, phonetic hints skipped
fn load_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<String>, ReadError> {
    let Some(xml) = read_part(archive, SHARED_STRINGS_PART)? else {
        debug!("No {} in package", SHARED_STRINGS_PART);
        return Ok(Vec::new());
    };
    let mut reader = Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(false);
    let xml_err = |e: quick_xml::Error| ReadError::xml(SHARED_STRINGS_PART, e);

    let mut strings = Vec::new();
    let mut current_string = String::new();
    let mut in_phonetic = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rPh" => in_phonetic = true,
                b"t" if !in_phonetic => {
                    current_string.push_str(&read_text_node(&mut reader).map_err(xml_err)?);
                }
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(e) => match e.local_name().as_ref() {
                b"rPh" => in_phonetic = false,
                b"si" => strings.push(std::mem::take(&mut current_string)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Build the grid of one worksheet.
///
/// Rows land at `r - 1`; row numbers the sheet skips stay empty. Each row is
/// pre-sized from its `spans` end and grows if a cell lies beyond it.
fn parse_sheet_xml(part: &str, xml: &[u8], shared_strings: &[String]) -> Result<Grid, ReadError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let fmt_err = |e: quick_xml::Error| ReadError::format(part, e.to_string());

    let mut raw_rows: Vec<(usize, Vec<CellValue>)> = Vec::new();
    let mut current_row: Option<(usize, Vec<CellValue>)> = None;
    let mut last_row_number = 0usize;
    let mut next_col = 0usize;
    let mut saw_sheet_data = false;

    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf).map_err(fmt_err)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"sheetData" => saw_sheet_data = true,
                b"row" => {
                    let number = match attr_value(e, b"r").map_err(fmt_err)? {
                        Some(r) => r
                            .parse::<usize>()
                            .ok()
                            .filter(|n| *n > 0)
                            .ok_or_else(|| {
                                ReadError::format(part, format!("invalid row number '{}'", r))
                            })?,
                        None => {
                            warn!("{}: row without 'r' attribute after row {}", part, last_row_number);
                            last_row_number + 1
                        }
                    };
                    if number > MAX_ROWS {
                        return Err(ReadError::format(
                            part,
                            format!("row number {} exceeds {}", number, MAX_ROWS),
                        ));
                    }
                    let width = match attr_value(e, b"spans").map_err(fmt_err)? {
                        Some(spans) => parse_spans_end(&spans).unwrap_or_else(|| {
                            warn!("{}: unreadable spans '{}' on row {}", part, spans, number);
                            0
                        }),
                        None => 0,
                    };
                    if width > MAX_COLUMNS {
                        return Err(ReadError::format(
                            part,
                            format!("spans end {} on row {} exceeds {}", width, number, MAX_COLUMNS),
                        ));
                    }
                    last_row_number = number;
                    next_col = 0;

                    let row = vec![CellValue::Empty; width];
                    if matches!(event, Event::Empty(_)) {
                        raw_rows.push((number, row));
                    } else {
                        current_row = Some((number, row));
                    }
                }
                b"c" => {
                    let col = match attr_value(e, b"r").map_err(fmt_err)? {
                        Some(reference) => parse_col(&reference).ok_or_else(|| {
                            ReadError::format(part, format!("invalid cell reference '{}'", reference))
                        })?,
                        None => next_col,
                    };
                    if col >= MAX_COLUMNS {
                        return Err(ReadError::format(
                            part,
                            format!("cell column {} exceeds {}", col + 1, MAX_COLUMNS),
                        ));
                    }
                    next_col = col + 1;

                    let value = if matches!(event, Event::Start(_)) {
                        let cell_type = attr_value(e, b"t").map_err(fmt_err)?;
                        parse_cell_contents(&mut reader, part, cell_type.as_deref(), shared_strings)?
                    } else {
                        CellValue::Empty
                    };

                    if let Some((_, row)) = current_row.as_mut()
                        && !value.is_empty()
                    {
                        if row.len() <= col {
                            row.resize(col + 1, CellValue::Empty);
                        }
                        row[col] = value;
                    }
                }
                _ => {}
            },
            Event::End(ref e) if e.local_name().as_ref() == b"row" => {
                if let Some(row) = current_row.take() {
                    raw_rows.push(row);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_sheet_data {
        return Err(ReadError::format(part, "no <sheetData> element"));
    }
    let row_count = raw_rows
        .iter()
        .map(|(number, _)| *number)
        .max()
        .ok_or_else(|| ReadError::format(part, "worksheet has no rows"))?;

    let mut rows = vec![Vec::new(); row_count];
    for (number, row) in raw_rows {
        rows[number - 1] = row;
    }
    Ok(Grid::from_rows(rows))
}

/// Read the children of a `<c>` element up to its end tag
fn parse_cell_contents<R: BufRead>(
    reader: &mut Reader<R>,
    part: &str,
    cell_type: Option<&str>,
    shared_strings: &[String],
) -> Result<CellValue, ReadError> {
    let fmt_err = |e: quick_xml::Error| ReadError::format(part, e.to_string());
    let mut value = CellValue::Empty;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(fmt_err)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"v" => {
                    let text = read_text_node(reader).map_err(fmt_err)?;
                    value = resolve_value(part, &text, cell_type, shared_strings)?;
                }
                b"is" => {
                    value = CellValue::Text(read_inline_string(reader).map_err(fmt_err)?);
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"c" => break,
            Event::Eof => return Err(ReadError::format(part, "unexpected end inside <c>")),
            _ => {}
        }
        buf.clear();
    }
    Ok(value)
}

fn resolve_value(
    part: &str,
    text: &str,
    cell_type: Option<&str>,
    shared_strings: &[String],
) -> Result<CellValue, ReadError> {
    if text.is_empty() {
        return Ok(CellValue::Empty);
    }
    match cell_type {
        Some("s") => {
            let index = text.trim().parse::<usize>().map_err(|_| {
                ReadError::format(part, format!("invalid shared string index '{}'", text))
            })?;
            shared_strings
                .get(index)
                .cloned()
                .map(CellValue::Text)
                .ok_or_else(|| {
                    ReadError::format(
                        part,
                        format!(
                            "shared string index {} out of range ({} strings)",
                            index,
                            shared_strings.len()
                        ),
                    )
                })
        }
        _ => Ok(CellValue::from_raw(text)),
    }
}

/// Inline strings can hold several `<t>` runs
fn read_inline_string<R: BufRead>(reader: &mut Reader<R>) -> quick_xml::Result<String> {
    let mut text = String::new();
    let mut in_phonetic = false;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rPh" => in_phonetic = true,
                b"t" if !in_phonetic => text.push_str(&read_text_node(reader)?),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"rPh" => in_phonetic = false,
                b"is" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}
