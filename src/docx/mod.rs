//! WordprocessingML reader: unpacks a .docx and turns `word/document.xml`,
//! `word/styles.xml` and `word/numbering.xml` into a [`SourceDocument`].

mod drawing;
mod numbering;
mod props;
mod styles;

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use roxmltree::Node;

use crate::error::Error;
use crate::source::{
    BreakKind, CellNode, CellProps, ParagraphNode, RowNode, RowProps, RunContent, RunNode,
    SourceAttributes, SourceDocument, SourceNode, SourceSpan, StructuredContentMeta,
    StructuredContentNode, TableNode, TableProps, VMerge,
};
use crate::units::parse_number;

use numbering::parse_numbering;
use props::{
    border_set, cell_margins, paragraph_props, run_props, section_props, shading, table_width,
};
use styles::{ThemeFonts, parse_styles, parse_theme};

pub(super) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub(super) const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const WPD_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const PIC_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const WPS_NS: &str = "http://schemas.microsoft.com/office/word/2010/wordprocessingShape";
const WPG_NS: &str = "http://schemas.microsoft.com/office/word/2010/wordprocessingGroup";
const MC_NS: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// `w:sdtPr` children that name the kind of a content control.
const SDT_KINDS: &[&str] = &[
    "richText",
    "text",
    "comboBox",
    "dropDownList",
    "date",
    "picture",
    "docPartObj",
    "docPartList",
    "group",
    "citation",
    "bibliography",
    "equation",
    "checkbox",
];

pub(super) fn on_off(val: &str) -> bool {
    !matches!(val, "0" | "false" | "off")
}

pub(super) fn wml_bool(parent: Node, name: &str) -> Option<bool> {
    wml(parent, name).map(|n| n.attribute((WML_NS, "val")).is_none_or(on_off))
}

pub(super) fn is_wml(node: Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

pub(super) fn wml<'a>(node: Node<'a, 'a>, name: &str) -> Option<Node<'a, 'a>> {
    node.children().find(|n| is_wml(*n, name))
}

pub(super) fn wml_attr<'a>(node: Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

/// Numeric `w:` attribute in its stored unit.
pub(super) fn num_attr(node: Node, attr: &str) -> Option<f32> {
    node.attribute((WML_NS, attr)).and_then(parse_number)
}

/// Every attribute of `node`, keyed `prefix:name` when namespaced.
pub(super) fn attributes(node: Node) -> SourceAttributes {
    node.attributes()
        .map(|a| {
            let key = match a.namespace().and_then(|ns| node.lookup_prefix(ns)) {
                Some(prefix) => format!("{prefix}:{}", a.name()),
                None => a.name().to_string(),
            };
            (key, a.value().to_string())
        })
        .collect()
}

pub(super) fn span(node: Node) -> Option<SourceSpan> {
    let range = node.range();
    Some(SourceSpan {
        start: range.start,
        end: range.end,
    })
}

fn read_zip_text<R: Read + Seek>(zip: &mut zip::ZipArchive<R>, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

fn parse_rels_xml(xml_content: &str) -> HashMap<String, String> {
    let mut rels = HashMap::new();
    let xml = match roxmltree::Document::parse(xml_content) {
        Ok(xml) => xml,
        Err(e) => {
            log::warn!("Ignoring malformed relationships part: {e}");
            return rels;
        }
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() == "Relationship"
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            rels.insert(id.to_string(), target.to_string());
        }
    }
    rels
}

/// Read a .docx file from disk.
pub fn parse(path: &Path) -> Result<SourceDocument, Error> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    let zip = zip::ZipArchive::new(file)
        .map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))?;
    read_archive(zip)
}

/// Read a .docx held in memory.
pub fn parse_bytes(bytes: &[u8]) -> Result<SourceDocument, Error> {
    let zip = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|_| Error::InvalidDocx("data is not a ZIP archive".into()))?;
    read_archive(zip)
}

fn read_archive<R: Read + Seek>(mut zip: zip::ZipArchive<R>) -> Result<SourceDocument, Error> {
    let document_xml = read_zip_text(&mut zip, "word/document.xml").ok_or_else(|| {
        Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into())
    })?;

    let theme_name = zip
        .file_names()
        .find(|n| n.starts_with("word/theme/") && n.ends_with(".xml"))
        .map(str::to_string);
    let theme = theme_name
        .and_then(|name| read_zip_text(&mut zip, &name))
        .map(|xml| parse_theme(&xml))
        .unwrap_or_default();

    let styles_xml = read_zip_text(&mut zip, "word/styles.xml");
    let numbering_xml = read_zip_text(&mut zip, "word/numbering.xml");
    let rels = read_zip_text(&mut zip, "word/_rels/document.xml.rels")
        .map(|xml| parse_rels_xml(&xml))
        .unwrap_or_default();

    read_document(
        &document_xml,
        styles_xml.as_deref(),
        numbering_xml.as_deref(),
        &theme,
        &rels,
    )
}

/// Read already extracted package parts. Relationship targets and theme
/// fonts are unavailable on this path.
pub fn parse_parts(
    document_xml: &str,
    styles_xml: Option<&str>,
    numbering_xml: Option<&str>,
) -> Result<SourceDocument, Error> {
    read_document(
        document_xml,
        styles_xml,
        numbering_xml,
        &ThemeFonts::default(),
        &HashMap::new(),
    )
}

fn read_document(
    document_xml: &str,
    styles_xml: Option<&str>,
    numbering_xml: Option<&str>,
    theme: &ThemeFonts,
    rels: &HashMap<String, String>,
) -> Result<SourceDocument, Error> {
    let mut styles = parse_styles(styles_xml, theme);
    styles.numbering = parse_numbering(numbering_xml, theme);

    let xml = roxmltree::Document::parse(document_xml)?;
    let body = wml(xml.root_element(), "body")
        .ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let reader = Reader { theme, rels };
    Ok(SourceDocument {
        body: reader.blocks(body),
        final_section: wml(body, "sectPr").map(section_props),
        styles,
    })
}

pub(super) struct Reader<'r> {
    theme: &'r ThemeFonts,
    rels: &'r HashMap<String, String>,
}

impl Reader<'_> {
    /// Block-level children: paragraphs, tables and content controls.
    /// Tracked insertions and custom XML wrappers are transparent.
    fn blocks(&self, parent: Node) -> Vec<SourceNode> {
        let mut out = Vec::new();
        self.collect_blocks(parent, &mut out);
        out
    }

    fn collect_blocks(&self, parent: Node, out: &mut Vec<SourceNode>) {
        for node in parent.children() {
            if node.tag_name().namespace() != Some(WML_NS) {
                continue;
            }
            match node.tag_name().name() {
                "p" => out.push(SourceNode::Paragraph(self.paragraph(node))),
                "tbl" => out.push(SourceNode::Table(self.table(node))),
                "sdt" => out.push(SourceNode::StructuredContent(StructuredContentNode {
                    meta: wml(node, "sdtPr").map(sdt_meta).unwrap_or_default(),
                    children: wml(node, "sdtContent")
                        .map(|c| self.blocks(c))
                        .unwrap_or_default(),
                    span: span(node),
                })),
                "customXml" | "ins" | "smartTag" => self.collect_blocks(node, out),
                _ => {}
            }
        }
    }

    fn paragraph(&self, node: Node) -> ParagraphNode {
        let ppr = wml(node, "pPr");
        let mut runs = Vec::new();
        self.collect_runs(node, None, &mut runs);
        ParagraphNode {
            direct: Default::default(),
            inline: ppr.map(paragraph_props).unwrap_or_default(),
            list_rendering: None,
            section: ppr.and_then(|p| wml(p, "sectPr")).map(section_props),
            runs,
            source_attrs: attributes(node),
            span: span(node),
        }
    }

    fn hyperlink_target(&self, node: Node) -> Option<String> {
        if let Some(target) = node
            .attribute((REL_NS, "id"))
            .and_then(|id| self.rels.get(id))
        {
            return Some(target.clone());
        }
        node.attribute((WML_NS, "anchor"))
            .map(|anchor| format!("#{anchor}"))
    }

    /// Runs in reading order, descending through hyperlinks, inline
    /// content controls, fields and insertions. Deleted text is skipped.
    fn collect_runs(&self, parent: Node, hyperlink: Option<&str>, out: &mut Vec<RunNode>) {
        for node in parent.children() {
            if node.tag_name().namespace() != Some(WML_NS) {
                continue;
            }
            match node.tag_name().name() {
                "r" => out.push(self.run(node, hyperlink)),
                "hyperlink" => {
                    let target = self.hyperlink_target(node);
                    self.collect_runs(node, target.as_deref().or(hyperlink), out);
                }
                "sdt" => {
                    if let Some(content) = wml(node, "sdtContent") {
                        self.collect_runs(content, hyperlink, out);
                    }
                }
                "fldSimple" | "ins" | "smartTag" | "customXml" => {
                    self.collect_runs(node, hyperlink, out)
                }
                _ => {}
            }
        }
    }

    fn run(&self, node: Node, hyperlink: Option<&str>) -> RunNode {
        let mut content = Vec::new();
        for child in node.children() {
            match (child.tag_name().namespace(), child.tag_name().name()) {
                (Some(WML_NS), "t") => {
                    content.push(RunContent::Text(child.text().unwrap_or("").to_string()))
                }
                (Some(WML_NS), "tab") => content.push(RunContent::Tab),
                (Some(WML_NS), "br") => {
                    let kind = match child.attribute((WML_NS, "type")) {
                        Some("page") => BreakKind::Page,
                        Some("column") => BreakKind::Column,
                        _ => BreakKind::Line,
                    };
                    content.push(RunContent::Break(kind));
                }
                (Some(WML_NS), "cr") => content.push(RunContent::Break(BreakKind::Line)),
                (Some(WML_NS), "noBreakHyphen") => {
                    content.push(RunContent::Text("\u{2011}".to_string()))
                }
                (Some(WML_NS), "sym") => {
                    let ch = child
                        .attribute((WML_NS, "char"))
                        .and_then(|c| u32::from_str_radix(c, 16).ok())
                        .and_then(char::from_u32);
                    if let Some(ch) = ch {
                        content.push(RunContent::Text(ch.to_string()));
                    }
                }
                (Some(WML_NS), "drawing") => {
                    if let Some(drawing) = self.drawing(child) {
                        content.push(RunContent::Drawing(Box::new(drawing)));
                    }
                }
                (Some(MC_NS), "AlternateContent") => {
                    let drawing = child
                        .children()
                        .filter(|n| n.tag_name().namespace() == Some(MC_NS))
                        .flat_map(|n| n.children())
                        .find(|n| is_wml(*n, "drawing"))
                        .and_then(|d| self.drawing(d));
                    if let Some(drawing) = drawing {
                        content.push(RunContent::Drawing(Box::new(drawing)));
                    }
                }
                _ => {}
            }
        }

        RunNode {
            props: wml(node, "rPr")
                .map(|rpr| run_props(rpr, self.theme))
                .unwrap_or_default(),
            content,
            hyperlink: hyperlink.map(str::to_string),
            span: span(node),
        }
    }

    fn table(&self, node: Node) -> TableNode {
        let tbl_pr = wml(node, "tblPr");
        let props = tbl_pr
            .map(|pr| TableProps {
                style_id: wml_attr(pr, "tblStyle").map(str::to_string),
                width: wml(pr, "tblW").map(table_width),
                indent: wml(pr, "tblInd").and_then(|n| num_attr(n, "w")),
                justification: wml_attr(pr, "jc").map(str::to_string),
                layout: wml(pr, "tblLayout")
                    .and_then(|n| n.attribute((WML_NS, "type")))
                    .map(str::to_string),
                cell_margins: wml(pr, "tblCellMar").map(cell_margins),
                borders: wml(pr, "tblBorders").map(border_set),
                user_edited: false,
                column_grid: None,
            })
            .unwrap_or_default();

        let grid = wml(node, "tblGrid")
            .into_iter()
            .flat_map(|g| g.children())
            .filter(|n| is_wml(*n, "gridCol"))
            .filter_map(|n| num_attr(n, "w"))
            .collect();

        let rows = flattened(node, "tr")
            .into_iter()
            .map(|tr| self.row(tr))
            .collect();

        TableNode {
            props,
            grid,
            rows,
            source_attrs: attributes(node),
            span: span(node),
        }
    }

    fn row(&self, node: Node) -> RowNode {
        let props = wml(node, "trPr")
            .map(|pr| {
                let height = wml(pr, "trHeight");
                RowProps {
                    height: height.and_then(|h| num_attr(h, "val")),
                    height_rule: height
                        .and_then(|h| h.attribute((WML_NS, "hRule")))
                        .map(str::to_string),
                    cant_split: wml_bool(pr, "cantSplit"),
                    header: wml_bool(pr, "tblHeader"),
                    grid_before: wml_attr(pr, "gridBefore").and_then(|v| v.trim().parse().ok()),
                    grid_after: wml_attr(pr, "gridAfter").and_then(|v| v.trim().parse().ok()),
                }
            })
            .unwrap_or_default();

        RowNode {
            props,
            cells: flattened(node, "tc")
                .into_iter()
                .map(|tc| self.cell(tc))
                .collect(),
            source_attrs: attributes(node),
            span: span(node),
        }
    }

    fn cell(&self, node: Node) -> CellNode {
        let props = wml(node, "tcPr")
            .map(|pr| CellProps {
                width: wml(pr, "tcW").map(table_width),
                col_width_hints: None,
                grid_span: wml_attr(pr, "gridSpan").and_then(|v| v.trim().parse().ok()),
                row_span: None,
                v_merge: wml(pr, "vMerge").map(|m| match m.attribute((WML_NS, "val")) {
                    Some("restart") => VMerge::Restart,
                    _ => VMerge::Continue,
                }),
                v_align: wml_attr(pr, "vAlign").map(str::to_string),
                borders: wml(pr, "tcBorders").map(border_set),
                margins: wml(pr, "tcMar").map(cell_margins),
                shading: wml(pr, "shd").map(shading),
                no_wrap: wml_bool(pr, "noWrap"),
            })
            .unwrap_or_default();

        CellNode {
            props,
            content: self.blocks(node),
            source_attrs: attributes(node),
            span: span(node),
        }
    }
}

/// `name` children of `parent`, looking through content controls and
/// custom XML wrappers.
fn flattened<'a>(parent: Node<'a, 'a>, name: &str) -> Vec<Node<'a, 'a>> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        if is_wml(child, name) {
            nodes.push(child);
        } else if is_wml(child, "sdt") {
            if let Some(content) = wml(child, "sdtContent") {
                nodes.extend(flattened(content, name));
            }
        } else if is_wml(child, "customXml") {
            nodes.extend(flattened(child, name));
        }
    }
    nodes
}

fn sdt_meta(sdt_pr: Node) -> StructuredContentMeta {
    let kind = sdt_pr.children().find_map(|n| {
        let name = n.tag_name().name();
        SDT_KINDS.contains(&name).then(|| name.to_string())
    });
    StructuredContentMeta {
        id: wml_attr(sdt_pr, "id").map(str::to_string),
        tag: wml_attr(sdt_pr, "tag").map(str::to_string),
        alias: wml_attr(sdt_pr, "alias").map(str::to_string),
        kind,
        lock: wml_attr(sdt_pr, "lock").map(str::to_string),
    }
}
