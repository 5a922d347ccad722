#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use docxide_flow::model::{
    CellBorders, CellContent, CellPadding, CellVAlign, TableBlock, TableCell, TableRow,
};
use docxide_flow::source::{
    AbstractNumbering, Indent, LevelDefinition, NumId, NumberingInstance, NumberingRef,
    ParagraphNode, ParagraphProps, StyleSheet,
};
use docxide_flow::{ConvertOptions, FlowDocument, SourceDocument};

pub const EPSILON: f32 = 0.01;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

const NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" "#,
    r#"xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape" "#,
    r#"xmlns:wpg="http://schemas.microsoft.com/office/word/2010/wordprocessingGroup" "#,
    r#"xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" "#,
    r#"xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml""#,
);

pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {NAMESPACES}><w:body>{body}</w:body></w:document>"#
    )
}

pub fn styles_xml(inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles {NAMESPACES}>{inner}</w:styles>"#
    )
}

pub fn numbering_xml(inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:numbering {NAMESPACES}>{inner}</w:numbering>"#
    )
}

pub fn rels_xml(rels: &[(&str, &str)]) -> String {
    let entries: String = rels
        .iter()
        .map(|(id, target)| {
            format!(r#"<Relationship Id="{id}" Type="http://example.invalid/rel" Target="{target}"/>"#)
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{entries}</Relationships>"#
    )
}

/// Package `(path, content)` parts into an in-memory .docx.
pub fn build_docx(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in parts {
        zip.start_file(*name, options).expect("start zip entry");
        zip.write_all(content.as_bytes()).expect("write zip entry");
    }
    zip.finish().expect("finish zip").into_inner()
}

pub fn convert(doc: &SourceDocument) -> FlowDocument {
    docxide_flow::convert_document(doc, &ConvertOptions::default())
}

pub fn indent(left: Option<f32>, first_line: Option<f32>, hanging: Option<f32>) -> Indent {
    Indent {
        left,
        right: None,
        first_line,
        hanging,
    }
}

pub fn list_paragraph(num_id: NumId, level: f64) -> ParagraphNode {
    let mut node = ParagraphNode::with_text("item");
    node.inline.numbering = Some(NumberingRef {
        num_id: Some(num_id),
        level: Some(level),
    });
    node
}

fn level(format: &str, text: &str, left: f32) -> LevelDefinition {
    LevelDefinition {
        format: Some(format.to_string()),
        start: Some(1),
        text: Some(text.to_string()),
        justification: Some("left".to_string()),
        suffix: None,
        paragraph: ParagraphProps {
            indent: Some(indent(Some(left), None, Some(360.0))),
            ..Default::default()
        },
        run: Default::default(),
    }
}

/// Numbering instance "1": decimal `%1.` at level 0, `%1.%2)` lower-letter
/// at level 1.
pub fn list_sheet() -> StyleSheet {
    let mut sheet = StyleSheet::default();
    let mut levels = BTreeMap::new();
    levels.insert(0, level("decimal", "%1.", 720.0));
    levels.insert(1, level("lowerLetter", "%1.%2)", 1440.0));
    sheet
        .numbering
        .abstracts
        .insert("10".to_string(), AbstractNumbering { levels });
    sheet.numbering.instances.insert(
        "1".to_string(),
        NumberingInstance {
            abstract_id: "10".to_string(),
            overrides: BTreeMap::new(),
        },
    );
    sheet
}

pub fn cell(id: usize, col_span: u32, row_span: u32) -> TableCell {
    TableCell {
        content: CellContent::empty_paragraph(id),
        col_span,
        row_span,
        continue_merge: false,
        borders: CellBorders::default(),
        padding: CellPadding::default(),
        vertical_align: CellVAlign::Top,
        background: None,
        width: None,
        no_wrap: false,
        source_attrs: Default::default(),
    }
}

pub fn row(grid_before: u32, cells: Vec<TableCell>) -> TableRow {
    TableRow {
        cells,
        height: None,
        header: false,
        cant_split: false,
        grid_before,
        source_attrs: Default::default(),
    }
}

pub fn table(id: usize, rows: Vec<TableRow>) -> TableBlock {
    TableBlock {
        id,
        style_id: None,
        column_widths: None,
        rows,
        width: None,
        indent: None,
        justification: None,
        layout: None,
        sdt: None,
        source_attrs: Default::default(),
        position: None,
    }
}
