use roxmltree::Node;

use crate::source::{DocDefaults, StyleDef, StyleKind, StyleSheet, TableStyleProps};

use super::props::{border_set, cell_margins, paragraph_props, run_props};
use super::{DML_NS, WML_NS, is_wml, on_off, wml, wml_attr};

fn dml<'a>(node: Node<'a, 'a>, name: &str) -> Option<Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(DML_NS))
}

fn latin_typeface<'a>(node: Node<'a, 'a>) -> Option<&'a str> {
    dml(node, "latin")
        .and_then(|n| n.attribute("typeface"))
        .filter(|tf| !tf.is_empty())
}

/// Major (headings) and minor (body) Latin fonts of the document theme.
#[derive(Clone, Debug, PartialEq)]
pub struct ThemeFonts {
    pub major: String,
    pub minor: String,
}

impl Default for ThemeFonts {
    fn default() -> Self {
        Self {
            major: String::from("Aptos Display"),
            minor: String::from("Aptos"),
        }
    }
}

pub(super) fn parse_theme(xml_content: &str) -> ThemeFonts {
    let mut fonts = ThemeFonts::default();
    let xml = match roxmltree::Document::parse(xml_content) {
        Ok(xml) => xml,
        Err(e) => {
            log::warn!("Ignoring malformed theme part: {e}");
            return fonts;
        }
    };

    for node in xml.descendants() {
        if node.tag_name().namespace() != Some(DML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "majorFont" => {
                if let Some(tf) = latin_typeface(node) {
                    fonts.major = tf.to_string();
                }
            }
            "minorFont" => {
                if let Some(tf) = latin_typeface(node) {
                    fonts.minor = tf.to_string();
                }
            }
            _ => {}
        }
    }

    fonts
}

pub(super) fn resolve_font(
    ascii: Option<&str>,
    ascii_theme: Option<&str>,
    h_ansi: Option<&str>,
    theme: &ThemeFonts,
) -> Option<String> {
    if let Some(f) = ascii {
        return Some(f.to_string());
    }
    match ascii_theme {
        Some("majorHAnsi" | "majorAscii") => Some(theme.major.clone()),
        Some("minorHAnsi" | "minorAscii") => Some(theme.minor.clone()),
        _ => h_ansi.map(str::to_string),
    }
}

pub(super) fn resolve_font_from_node(rfonts: Node, theme: &ThemeFonts) -> Option<String> {
    resolve_font(
        rfonts.attribute((WML_NS, "ascii")),
        rfonts.attribute((WML_NS, "asciiTheme")),
        rfonts.attribute((WML_NS, "hAnsi")),
        theme,
    )
}

fn style_kind(val: &str) -> Option<StyleKind> {
    match val {
        "paragraph" => Some(StyleKind::Paragraph),
        "character" => Some(StyleKind::Character),
        "table" => Some(StyleKind::Table),
        "numbering" => Some(StyleKind::Numbering),
        _ => None,
    }
}

fn doc_defaults(node: Node, theme: &ThemeFonts) -> DocDefaults {
    let mut defaults = DocDefaults::default();
    if let Some(rpr) = wml(node, "rPrDefault").and_then(|n| wml(n, "rPr")) {
        defaults.run = run_props(rpr, theme);
    }
    if let Some(ppr) = wml(node, "pPrDefault").and_then(|n| wml(n, "pPr")) {
        defaults.paragraph = paragraph_props(ppr);
    }
    // Without an explicit body font the theme's minor font applies.
    if defaults.run.font_family.is_none() {
        defaults.run.font_family = Some(theme.minor.clone());
    }
    defaults
}

fn style_def(node: Node, theme: &ThemeFonts) -> Option<StyleDef> {
    let kind = node
        .attribute((WML_NS, "type"))
        .map_or(Some(StyleKind::Paragraph), style_kind)?;
    let id = node.attribute((WML_NS, "styleId"))?;

    let mut style = StyleDef::new(id, kind);
    style.name = wml_attr(node, "name").map(str::to_string);
    style.based_on = wml_attr(node, "basedOn").map(str::to_string);
    style.is_default = node.attribute((WML_NS, "default")).is_some_and(on_off);
    if let Some(ppr) = wml(node, "pPr") {
        style.paragraph = paragraph_props(ppr);
    }
    if let Some(rpr) = wml(node, "rPr") {
        style.run = run_props(rpr, theme);
    }
    if kind == StyleKind::Table {
        let tbl_pr = wml(node, "tblPr");
        style.table = Some(TableStyleProps {
            borders: tbl_pr.and_then(|pr| wml(pr, "tblBorders")).map(border_set),
            cell_margins: tbl_pr.and_then(|pr| wml(pr, "tblCellMar")).map(cell_margins),
        });
    }
    Some(style)
}

/// `word/styles.xml` into a style sheet without numbering. A malformed part
/// yields theme-only defaults.
pub(super) fn parse_styles(xml_content: Option<&str>, theme: &ThemeFonts) -> StyleSheet {
    let mut sheet = StyleSheet::default();
    sheet.defaults.run.font_family = Some(theme.minor.clone());

    let Some(xml_content) = xml_content else {
        return sheet;
    };
    let xml = match roxmltree::Document::parse(xml_content) {
        Ok(xml) => xml,
        Err(e) => {
            log::warn!("Ignoring malformed styles part: {e}");
            return sheet;
        }
    };
    let root = xml.root_element();

    if let Some(node) = wml(root, "docDefaults") {
        sheet.defaults = doc_defaults(node, theme);
    }

    for node in root.children().filter(|n| is_wml(*n, "style")) {
        match style_def(node, theme) {
            Some(style) => sheet.insert(style),
            None => log::debug!(
                "Skipping style {:?} of type {:?}",
                node.attribute((WML_NS, "styleId")),
                node.attribute((WML_NS, "type"))
            ),
        }
    }

    sheet
}
