//! In-memory fixture builders shared by the integration tests.

#![allow(dead_code)]

use bidscope::{BidAnalysis, BidscopeError, ExtractionCapability, InlinePayload, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::io::{Cursor, Write};
use std::sync::Mutex;
use zip::write::{FileOptions, ZipWriter};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn zip_parts(parts: &[(&str, String)]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut cursor);
        let options = FileOptions::<'_, ()>::default();
        for (name, content) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    cursor.into_inner()
}

fn column_name(index: usize) -> String {
    let mut name = String::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    name
}

fn cell_xml(cell_ref: &str, value: &str) -> String {
    if value.parse::<f64>().is_ok() {
        format!(r#"<c r="{}"><v>{}</v></c>"#, cell_ref, value)
    } else {
        format!(
            r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
            cell_ref,
            escape_xml(value)
        )
    }
}

fn sheet_xml(rows: &[(u32, Vec<(String, &str)>)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (row_number, cells) in rows {
        xml.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (cell_ref, value) in cells {
            xml.push_str(&cell_xml(cell_ref, value));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn grid_sheet_xml(rows: &[Vec<&str>]) -> String {
    let rows: Vec<(u32, Vec<(String, &str)>)> = rows
        .iter()
        .enumerate()
        .map(|(r, row)| {
            let cells = row
                .iter()
                .enumerate()
                .map(|(c, value)| (format!("{}{}", column_name(c), r + 1), *value))
                .collect();
            (r as u32 + 1, cells)
        })
        .collect();
    sheet_xml(&rows)
}

/// Sheet XML holding only the given `(cell reference, value)` pairs, e.g. `("C4", "10")`.
fn placed_sheet_xml(cells: &[(&str, &str)]) -> String {
    let mut rows: std::collections::BTreeMap<u32, Vec<(String, &str)>> = std::collections::BTreeMap::new();
    for (cell_ref, value) in cells {
        let digits = cell_ref.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        let row_number: u32 = digits.parse().unwrap();
        rows.entry(row_number).or_default().push((cell_ref.to_string(), *value));
    }
    sheet_xml(&rows.into_iter().collect::<Vec<_>>())
}

/// Build an XLSX workbook whose sheets start at A1. Cells that parse as
/// numbers are stored as numbers, everything else as inline strings.
pub fn xlsx_bytes(sheets: &[(&str, Vec<Vec<&str>>)]) -> Vec<u8> {
    let sheets: Vec<(&str, String)> = sheets
        .iter()
        .map(|(name, rows)| (*name, grid_sheet_xml(rows)))
        .collect();
    workbook_bytes(&sheets)
}

/// Build a single-sheet XLSX workbook with cells placed at explicit references.
pub fn xlsx_cells(sheet_name: &str, cells: &[(&str, &str)]) -> Vec<u8> {
    workbook_bytes(&[(sheet_name, placed_sheet_xml(cells))])
}

fn workbook_bytes(sheets: &[(&str, String)]) -> Vec<u8> {
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut workbook_rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let mut parts = Vec::new();

    for (i, (name, xml)) in sheets.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            escape_xml(name)
        ));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
        parts.push((format!("xl/worksheets/sheet{n}.xml"), xml.clone()));
    }

    content_types.push_str("</Types>");
    workbook.push_str("</sheets></workbook>");
    workbook_rels.push_str("</Relationships>");

    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    let mut all: Vec<(&str, String)> = vec![
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", root_rels.to_string()),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", workbook_rels),
    ];
    for (name, xml) in &parts {
        all.push((name.as_str(), xml.clone()));
    }
    zip_parts(&all)
}

/// Build a DOCX document with one paragraph per entry.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;
    let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

    let mut document = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    for paragraph in paragraphs {
        document.push_str(&format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
            escape_xml(paragraph)
        ));
    }
    document.push_str("</w:body></w:document>");

    zip_parts(&[
        ("[Content_Types].xml", content_types.to_string()),
        ("_rels/.rels", rels.to_string()),
        ("word/document.xml", document),
    ])
}

/// Build a PDF with one page per entry; each page holds one line per string,
/// each line in its own text object.
pub fn pdf_bytes(pages: &[&[&str]]) -> Vec<u8> {
    let pages: Vec<Vec<Operation>> = pages
        .iter()
        .map(|lines| {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new("Td", vec![72.into(), (720 - 20 * i as i64).into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            operations
        })
        .collect();
    pdf_from_operations(pages)
}

/// Build a one-page PDF whose lines all sit inside a single text object,
/// moved down with `Td` between `Tj` operators.
pub fn pdf_single_text_object(lines: &[&str]) -> Vec<u8> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
    ];
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            operations.push(Operation::new("Td", vec![0.into(), (-20).into()]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));
    pdf_from_operations(vec![operations])
}

fn pdf_from_operations(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// A response that satisfies the declared schema.
pub fn sample_analysis_json() -> Value {
    json!({
        "solicitationDetails": {
            "title": "Dental Operatory Equipment",
            "agency": "Indian Health Service",
            "summary": "Replacement of operatory chairs and sterilization equipment."
        },
        "relevanceAnalysis": {
            "isRelevant": true,
            "reason": "Dental equipment; NAICS 423450 listed."
        },
        "keyRequirements": {
            "eligibility": ["Small business set-aside"],
            "objectives": ["Replace four operatory chairs"],
            "lineItems": [
                {
                    "name": "Dental chair",
                    "quantity": "4",
                    "description": "Operatory chair with delivery system",
                    "partNumber": null
                },
                { "name": "Autoclave", "quantity": 1, "description": null, "partNumber": "M11" }
            ],
            "productFit": {
                "type": "brand_name_or_equal",
                "details": "A-dec 500 or equal",
                "isCarriedBrand": false
            }
        },
        "submissionInstructions": {
            "deadline": "2026-05-01 14:00 local time",
            "formattingAndDelivery": ["Submit by email as a single PDF"]
        },
        "financials": { "budgetRange": null, "contractTerm": "Firm fixed price, one-time purchase" },
        "contactAndCompliance": {
            "pointOfContact": "J. Rivera, contracting officer",
            "complianceRequirements": ["SAM registration", "FAR 52.212-3"]
        },
        "flags_for_human_review": []
    })
}

pub fn sample_analysis() -> BidAnalysis {
    serde_json::from_value(sample_analysis_json()).unwrap()
}

/// What a [`ScriptedCapability`] saw for one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub schema: Value,
    pub payload: Option<InlinePayload>,
}

/// Capability that answers from a fixed script and records every call.
#[derive(Default)]
pub struct ScriptedCapability {
    answers: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedCapability {
    pub fn new(answers: Vec<Result<String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(raw: impl Into<String>) -> Self {
        Self::new(vec![Ok(raw.into())])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ExtractionCapability for ScriptedCapability {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn submit_extraction(&self, prompt: &str, schema: &Value, payload: Option<&InlinePayload>) -> Result<String> {
        self.calls.lock().unwrap().push(RecordedCall {
            prompt: prompt.to_string(),
            schema: schema.clone(),
            payload: payload.cloned(),
        });
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BidscopeError::capability("script exhausted")))
    }
}
