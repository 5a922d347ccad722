//! `w:pPr`, `w:rPr`, `w:sectPr` and the small property groups they share
//! with tables and styles. Values stay in their stored units.

use roxmltree::Node;

use crate::source::{
    BorderDef, BorderSet, CellMargins, ColumnsProps, FrameProps, HeaderFooterRef, Indent,
    LineRule, NumId, NumberingRef, PageMargins, ParagraphProps, RunProps, SectionProps, Shading,
    Spacing, TabKind, TabLeader, TabStopDef, TabStops, TableWidth, WidthKind,
};
use crate::units::parse_number;

use super::styles::{ThemeFonts, resolve_font_from_node};
use super::{REL_NS, WML_NS, attributes, is_wml, num_attr, on_off, wml, wml_attr, wml_bool};

fn str_attr(node: Node, attr: &str) -> Option<String> {
    node.attribute((WML_NS, attr)).map(str::to_string)
}

fn bool_attr(node: Node, attr: &str) -> Option<bool> {
    node.attribute((WML_NS, attr)).map(on_off)
}

fn u32_attr(node: Node, attr: &str) -> Option<u32> {
    node.attribute((WML_NS, attr))
        .and_then(|v| v.trim().parse::<u32>().ok())
}

/// First of several alternative child names (`left`/`start`).
fn wml_either<'a>(node: Node<'a, 'a>, names: &[&str]) -> Option<Node<'a, 'a>> {
    names.iter().find_map(|name| wml(node, name))
}

pub(super) fn border(node: Node) -> BorderDef {
    BorderDef {
        style: node
            .attribute((WML_NS, "val"))
            .unwrap_or("single")
            .to_string(),
        size: num_attr(node, "sz"),
        space: num_attr(node, "space"),
        color: str_attr(node, "color"),
    }
}

/// `w:pBdr`, `w:tblBorders` and `w:tcBorders` all share this layout.
pub(super) fn border_set(node: Node) -> BorderSet {
    let edge = |names: &[&str]| wml_either(node, names).map(border);
    BorderSet {
        top: edge(&["top"]),
        bottom: edge(&["bottom"]),
        left: edge(&["left", "start"]),
        right: edge(&["right", "end"]),
        between: edge(&["between"]),
        bar: edge(&["bar"]),
        inside_h: edge(&["insideH"]),
        inside_v: edge(&["insideV"]),
    }
}

pub(super) fn shading(node: Node) -> Shading {
    Shading {
        fill: str_attr(node, "fill"),
        color: str_attr(node, "color"),
        pattern: str_attr(node, "val"),
    }
}

pub(super) fn cell_margins(node: Node) -> CellMargins {
    let side = |names: &[&str]| wml_either(node, names).and_then(|n| num_attr(n, "w"));
    CellMargins {
        top: side(&["top"]),
        left: side(&["left", "start"]),
        bottom: side(&["bottom"]),
        right: side(&["right", "end"]),
    }
}

pub(super) fn table_width(node: Node) -> TableWidth {
    TableWidth {
        value: num_attr(node, "w").unwrap_or(0.0),
        kind: node
            .attribute((WML_NS, "type"))
            .map(WidthKind::parse)
            .unwrap_or(WidthKind::Dxa),
    }
}

fn spacing(node: Node) -> Spacing {
    Spacing {
        before: num_attr(node, "before"),
        after: num_attr(node, "after"),
        line: num_attr(node, "line"),
        line_rule: node
            .attribute((WML_NS, "lineRule"))
            .and_then(LineRule::parse),
        before_autospacing: bool_attr(node, "beforeAutospacing"),
        after_autospacing: bool_attr(node, "afterAutospacing"),
        contextual: None,
    }
}

fn indent(node: Node) -> Indent {
    let attr = |names: &[&str]| names.iter().find_map(|name| num_attr(node, name));
    Indent {
        left: attr(&["left", "start"]),
        right: attr(&["right", "end"]),
        first_line: attr(&["firstLine"]),
        hanging: attr(&["hanging"]),
    }
}

fn tab_stops(tabs: Node) -> TabStops {
    TabStops(
        tabs.children()
            .filter(|n| is_wml(*n, "tab"))
            .map(|n| TabStopDef {
                kind: n
                    .attribute((WML_NS, "val"))
                    .map(TabKind::parse)
                    .unwrap_or(TabKind::Left),
                leader: n.attribute((WML_NS, "leader")).and_then(TabLeader::parse),
                pos: num_attr(n, "pos"),
                original_pos: None,
                offset: None,
            })
            .collect(),
    )
}

fn numbering_ref(num_pr: Node) -> NumberingRef {
    NumberingRef {
        num_id: wml_attr(num_pr, "numId").map(NumId::from),
        level: wml_attr(num_pr, "ilvl").and_then(|v| v.trim().parse::<f64>().ok()),
    }
}

fn frame(node: Node) -> FrameProps {
    FrameProps {
        drop_cap: str_attr(node, "dropCap"),
        lines: u32_attr(node, "lines"),
        wrap: str_attr(node, "wrap"),
        h_anchor: str_attr(node, "hAnchor"),
        v_anchor: str_attr(node, "vAnchor"),
        x_align: str_attr(node, "xAlign"),
        y_align: str_attr(node, "yAlign"),
        x: num_attr(node, "x"),
        y: num_attr(node, "y"),
        width: num_attr(node, "w"),
        height: num_attr(node, "h"),
        h_space: num_attr(node, "hSpace"),
        v_space: num_attr(node, "vSpace"),
    }
}

pub(super) fn paragraph_props(ppr: Node) -> ParagraphProps {
    ParagraphProps {
        style_id: wml_attr(ppr, "pStyle").map(str::to_string),
        justification: wml_attr(ppr, "jc").map(str::to_string),
        spacing: wml(ppr, "spacing").map(spacing),
        indent: wml(ppr, "ind").map(indent),
        tabs: wml(ppr, "tabs").map(tab_stops),
        borders: wml(ppr, "pBdr").map(border_set),
        shading: wml(ppr, "shd").map(shading),
        numbering: wml(ppr, "numPr").map(numbering_ref),
        contextual_spacing: wml_bool(ppr, "contextualSpacing"),
        keep_next: wml_bool(ppr, "keepNext"),
        keep_lines: wml_bool(ppr, "keepLines"),
        page_break_before: wml_bool(ppr, "pageBreakBefore"),
        widow_control: wml_bool(ppr, "widowControl"),
        bidi: wml_bool(ppr, "bidi"),
        adjust_right_ind: wml_bool(ppr, "adjustRightInd"),
        outline_level: wml_attr(ppr, "outlineLvl").and_then(|v| v.trim().parse::<u8>().ok()),
        text_direction: wml_attr(ppr, "textDirection").map(str::to_string),
        frame: wml(ppr, "framePr").map(frame),
    }
}

/// `font_family` follows the same rules as the default font: explicit
/// `w:ascii`, then the theme slot, then `w:hAnsi`.
pub(super) fn run_props(rpr: Node, theme: &ThemeFonts) -> RunProps {
    RunProps {
        style_id: wml_attr(rpr, "rStyle").map(str::to_string),
        font_family: wml(rpr, "rFonts").and_then(|n| resolve_font_from_node(n, theme)),
        size: wml_attr(rpr, "sz").and_then(parse_number),
        bold: wml_bool(rpr, "b"),
        italic: wml_bool(rpr, "i"),
        underline: wml_attr(rpr, "u").map(str::to_string),
        strike: wml_bool(rpr, "strike"),
        double_strike: wml_bool(rpr, "dstrike"),
        caps: wml_bool(rpr, "caps"),
        small_caps: wml_bool(rpr, "smallCaps"),
        vanish: wml_bool(rpr, "vanish"),
        color: wml_attr(rpr, "color").map(str::to_string),
        highlight: wml_attr(rpr, "highlight").map(str::to_string),
        vert_align: wml_attr(rpr, "vertAlign").map(str::to_string),
        letter_spacing: wml_attr(rpr, "spacing").and_then(parse_number),
    }
}

fn header_footer_ref(node: Node) -> Option<HeaderFooterRef> {
    Some(HeaderFooterRef {
        kind: node
            .attribute((WML_NS, "type"))
            .unwrap_or("default")
            .to_string(),
        id: node.attribute((REL_NS, "id"))?.to_string(),
    })
}

pub(super) fn section_props(sect: Node) -> SectionProps {
    let pg_sz = wml(sect, "pgSz");
    let pg_mar = wml(sect, "pgMar");
    let margin = |attr: &str| pg_mar.and_then(|n| num_attr(n, attr));
    let pg_num = wml(sect, "pgNumType");

    let mut header_refs = Vec::new();
    let mut footer_refs = Vec::new();
    for child in sect.children().filter(|n| n.is_element()) {
        if is_wml(child, "headerReference") {
            header_refs.extend(header_footer_ref(child));
        } else if is_wml(child, "footerReference") {
            footer_refs.extend(header_footer_ref(child));
        }
    }

    SectionProps {
        kind: wml_attr(sect, "type").map(str::to_string),
        page_width: pg_sz.and_then(|n| num_attr(n, "w")),
        page_height: pg_sz.and_then(|n| num_attr(n, "h")),
        orientation: pg_sz.and_then(|n| str_attr(n, "orient")),
        margins: PageMargins {
            top: margin("top"),
            right: margin("right"),
            bottom: margin("bottom"),
            left: margin("left"),
            header: margin("header"),
            footer: margin("footer"),
            gutter: margin("gutter"),
        },
        columns: wml(sect, "cols").map(|cols| ColumnsProps {
            count: u32_attr(cols, "num"),
            space: num_attr(cols, "space"),
            equal_width: bool_attr(cols, "equalWidth"),
            separator: bool_attr(cols, "sep"),
        }),
        header_refs,
        footer_refs,
        page_number_format: pg_num.and_then(|n| str_attr(n, "fmt")),
        page_number_start: pg_num.and_then(|n| u32_attr(n, "start")),
        v_align: wml_attr(sect, "vAlign").map(str::to_string),
        title_page: wml_bool(sect, "titlePg"),
        source_attrs: attributes(sect),
    }
}
