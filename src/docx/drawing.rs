//! `w:drawing`: inline and anchored pictures, `wps` shapes and `wpg` groups.

use roxmltree::Node;

use crate::source::{
    AnchorProps, DocProperties, DrawingKind, DrawingNode, EffectExtent, Extent, GroupChild,
    GroupChildKind, ImageSource, ShapeSource, Transform, WrapProps,
};
use crate::units::parse_number;

use super::{
    DML_NS, PIC_NS, REL_NS, Reader, WPD_NS, WPG_NS, WPS_NS, attributes, is_wml, on_off, span,
};

fn child<'a>(node: Node<'a, 'a>, ns: &str, name: &str) -> Option<Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(ns))
}

fn wpd<'a>(node: Node<'a, 'a>, name: &str) -> Option<Node<'a, 'a>> {
    child(node, WPD_NS, name)
}

fn dml<'a>(node: Node<'a, 'a>, name: &str) -> Option<Node<'a, 'a>> {
    child(node, DML_NS, name)
}

fn number(node: Node, attr: &str) -> Option<f32> {
    node.attribute(attr).and_then(parse_number)
}

fn flag(node: Node, attr: &str) -> Option<bool> {
    node.attribute(attr).map(on_off)
}

fn extent(node: Option<Node>) -> Extent {
    node.map(|n| Extent {
        cx: number(n, "cx"),
        cy: number(n, "cy"),
    })
    .unwrap_or_default()
}

fn effect_extent(node: Node) -> EffectExtent {
    EffectExtent {
        left: number(node, "l"),
        top: number(node, "t"),
        right: number(node, "r"),
        bottom: number(node, "b"),
    }
}

fn transform(xfrm: Option<Node>) -> Transform {
    xfrm.map(|x| Transform {
        rotation: number(x, "rot"),
        flip_h: flag(x, "flipH"),
        flip_v: flag(x, "flipV"),
    })
    .unwrap_or_default()
}

/// `a:xfrm` of a shape-properties element (`pic:spPr`, `wps:spPr`,
/// `wpg:grpSpPr`).
fn xfrm_of<'a>(payload: Node<'a, 'a>, ns: &str, sp_pr: &str) -> Option<Node<'a, 'a>> {
    child(payload, ns, sp_pr).and_then(|pr| dml(pr, "xfrm"))
}

fn doc_properties(node: Option<Node>) -> DocProperties {
    node.map(|n| DocProperties {
        id: n.attribute("id").map(str::to_string),
        name: n.attribute("name").map(str::to_string),
        description: n.attribute("descr").map(str::to_string),
    })
    .unwrap_or_default()
}

/// `wp:align` text, or `wp:posOffset` in EMU.
fn position(node: Option<Node>) -> (Option<String>, Option<String>, Option<f32>) {
    let Some(node) = node else {
        return (None, None, None);
    };
    let relative = node.attribute("relativeFrom").map(str::to_string);
    let align = wpd(node, "align")
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string());
    let offset = wpd(node, "posOffset")
        .and_then(|n| n.text())
        .and_then(parse_number);
    (relative, align, offset)
}

fn anchor_props(container: Node) -> AnchorProps {
    let (h_relative_from, h_align, h_offset) = position(wpd(container, "positionH"));
    let (v_relative_from, v_align, v_offset) = position(wpd(container, "positionV"));
    AnchorProps {
        h_relative_from,
        v_relative_from,
        h_align,
        v_align,
        h_offset,
        v_offset,
        behind_doc: flag(container, "behindDoc"),
        relative_height: container
            .attribute("relativeHeight")
            .and_then(|v| v.trim().parse::<i64>().ok()),
        allow_overlap: flag(container, "allowOverlap"),
        layout_in_cell: flag(container, "layoutInCell"),
    }
}

const WRAP_ELEMENTS: &[(&str, &str)] = &[
    ("wrapNone", "none"),
    ("wrapSquare", "square"),
    ("wrapTight", "tight"),
    ("wrapThrough", "through"),
    ("wrapTopAndBottom", "topAndBottom"),
];

fn wrap_props(container: Node) -> Option<WrapProps> {
    let (node, kind) = container.children().find_map(|n| {
        if n.tag_name().namespace() != Some(WPD_NS) {
            return None;
        }
        WRAP_ELEMENTS
            .iter()
            .find(|(name, _)| *name == n.tag_name().name())
            .map(|(_, kind)| (n, *kind))
    })?;

    let polygon = wpd(node, "wrapPolygon")
        .into_iter()
        .flat_map(|poly| poly.children())
        .filter(|n| {
            n.tag_name().namespace() == Some(WPD_NS)
                && matches!(n.tag_name().name(), "start" | "lineTo")
        })
        .map(|n| {
            (
                n.attribute("x").unwrap_or_default().to_string(),
                n.attribute("y").unwrap_or_default().to_string(),
            )
        })
        .collect();

    Some(WrapProps {
        kind: Some(kind.to_string()),
        text: node.attribute("wrapText").map(str::to_string),
        dist_top: number(container, "distT"),
        dist_bottom: number(container, "distB"),
        dist_left: number(container, "distL"),
        dist_right: number(container, "distR"),
        polygon,
    })
}

fn solid_fill(node: Option<Node>) -> Option<String> {
    node.and_then(|n| dml(n, "solidFill"))
        .and_then(|f| dml(f, "srgbClr"))
        .and_then(|c| c.attribute("val"))
        .map(str::to_string)
}

/// Group member offset (`a:off`) and size (`a:ext`), EMU.
fn child_frame(xfrm: Option<Node>) -> (Option<f32>, Option<f32>, Extent) {
    let off = xfrm.and_then(|x| dml(x, "off"));
    (
        off.and_then(|o| number(o, "x")),
        off.and_then(|o| number(o, "y")),
        extent(xfrm.and_then(|x| dml(x, "ext"))),
    )
}

impl Reader<'_> {
    pub(super) fn drawing(&self, node: Node) -> Option<DrawingNode> {
        let container = node.children().find(|n| {
            n.tag_name().namespace() == Some(WPD_NS)
                && matches!(n.tag_name().name(), "inline" | "anchor")
        })?;
        let anchored = container.tag_name().name() == "anchor";

        let graphic_data = dml(container, "graphic").and_then(|g| dml(g, "graphicData"))?;
        let payload = graphic_data.children().find(|n| n.is_element())?;
        let (kind, xfrm) = match (payload.tag_name().namespace(), payload.tag_name().name()) {
            (Some(PIC_NS), "pic") => (
                DrawingKind::Image(self.image_source(payload)),
                xfrm_of(payload, PIC_NS, "spPr"),
            ),
            (Some(WPS_NS), "wsp") => (
                DrawingKind::Shape(self.shape_source(payload)),
                xfrm_of(payload, WPS_NS, "spPr"),
            ),
            (Some(WPG_NS), "wgp") => {
                let mut children = Vec::new();
                self.group_children(payload, &mut children);
                (
                    DrawingKind::Group(children),
                    xfrm_of(payload, WPG_NS, "grpSpPr"),
                )
            }
            (_, other) => {
                log::debug!("Skipping unsupported graphic '{other}'");
                return None;
            }
        };

        Some(DrawingNode {
            kind,
            extent: extent(wpd(container, "extent")),
            effect_extent: wpd(container, "effectExtent").map(effect_extent),
            transform: transform(xfrm),
            anchor: anchored.then(|| anchor_props(container)),
            wrap: if anchored { wrap_props(container) } else { None },
            z_index: None,
            doc_pr: doc_properties(wpd(container, "docPr")),
            source_attrs: attributes(container),
            span: span(container),
        })
    }

    fn image_source(&self, pic: Node) -> ImageSource {
        let blip = pic
            .descendants()
            .find(|n| n.tag_name().name() == "blip" && n.tag_name().namespace() == Some(DML_NS));
        let rel_id = blip
            .and_then(|b| b.attribute((REL_NS, "embed")).or(b.attribute((REL_NS, "link"))))
            .map(str::to_string);
        let target = rel_id.as_deref().and_then(|id| self.rels.get(id)).cloned();
        ImageSource { rel_id, target }
    }

    fn shape_source(&self, wsp: Node) -> ShapeSource {
        let sp_pr = child(wsp, WPS_NS, "spPr");
        let line = sp_pr.and_then(|pr| dml(pr, "ln"));
        let text = child(wsp, WPS_NS, "txbx")
            .and_then(|t| t.children().find(|n| is_wml(*n, "txbxContent")))
            .map(|content| self.blocks(content))
            .unwrap_or_default();
        ShapeSource {
            preset: sp_pr
                .and_then(|pr| dml(pr, "prstGeom"))
                .and_then(|g| g.attribute("prst"))
                .map(str::to_string),
            fill: solid_fill(sp_pr),
            stroke: solid_fill(line),
            stroke_width: line.and_then(|l| number(l, "w")),
            text,
        }
    }

    /// Members of a group in document order. Nested groups are flattened
    /// into their parent's coordinate space.
    fn group_children(&self, group: Node, out: &mut Vec<GroupChild>) {
        for node in group.children().filter(|n| n.is_element()) {
            let (kind, xfrm) = match (node.tag_name().namespace(), node.tag_name().name()) {
                (Some(WPS_NS), "wsp") => (
                    GroupChildKind::Shape(self.shape_source(node)),
                    xfrm_of(node, WPS_NS, "spPr"),
                ),
                (Some(PIC_NS), "pic") => (
                    GroupChildKind::Image(self.image_source(node)),
                    xfrm_of(node, PIC_NS, "spPr"),
                ),
                (Some(WPG_NS), "grpSp") => {
                    self.group_children(node, out);
                    continue;
                }
                _ => continue,
            };
            let (x, y, extent) = child_frame(xfrm);
            out.push(GroupChild {
                kind,
                x,
                y,
                extent,
                transform: transform(xfrm),
            });
        }
    }
}
