//! Geometry, anchoring and text wrap for images, vector shapes and shape
//! groups.

use crate::flow::paragraph_block;
use crate::model::{
    DrawingAnchor, DrawingBlock, DrawingCommon, DrawingGeometry, DrawingWrap, GroupShape,
    GroupShapeKind, HAlign, HRelativeFrom, ImageDrawing, ParagraphBlock, ShapeDrawing,
    ShapeGroupDrawing, VAlign, VRelativeFrom, WrapDistances, WrapText, WrapType,
};
use crate::source::{
    AnchorProps, DrawingKind, DrawingNode, EffectExtent, Extent, GroupChildKind, SourceNode,
    Transform, WrapProps,
};
use crate::units::{angle_to_degrees, emu_to_px, parse_number};

use super::{ResolveContext, normalize_color};

/// Word stores `relativeHeight` offset by this floor.
pub const RELATIVE_HEIGHT_BASE: i64 = 0xF00_0000;

pub fn wrap_type(val: &str) -> Option<WrapType> {
    match val {
        "none" => Some(WrapType::None),
        "square" => Some(WrapType::Square),
        "tight" => Some(WrapType::Tight),
        "through" => Some(WrapType::Through),
        "topAndBottom" => Some(WrapType::TopAndBottom),
        "inline" => Some(WrapType::Inline),
        _ => None,
    }
}

fn wrap_text(val: &str) -> Option<WrapText> {
    match val {
        "bothSides" => Some(WrapText::BothSides),
        "left" => Some(WrapText::Left),
        "right" => Some(WrapText::Right),
        "largest" => Some(WrapText::Largest),
        _ => None,
    }
}

pub fn h_relative_from(val: &str) -> Option<HRelativeFrom> {
    match val {
        "character" => Some(HRelativeFrom::Character),
        "column" => Some(HRelativeFrom::Column),
        "insideMargin" => Some(HRelativeFrom::InsideMargin),
        "leftMargin" => Some(HRelativeFrom::LeftMargin),
        "margin" => Some(HRelativeFrom::Margin),
        "outsideMargin" => Some(HRelativeFrom::OutsideMargin),
        "page" => Some(HRelativeFrom::Page),
        "rightMargin" => Some(HRelativeFrom::RightMargin),
        _ => None,
    }
}

pub fn v_relative_from(val: &str) -> Option<VRelativeFrom> {
    match val {
        "bottomMargin" => Some(VRelativeFrom::BottomMargin),
        "insideMargin" => Some(VRelativeFrom::InsideMargin),
        "line" => Some(VRelativeFrom::Line),
        "margin" => Some(VRelativeFrom::Margin),
        "outsideMargin" => Some(VRelativeFrom::OutsideMargin),
        "page" => Some(VRelativeFrom::Page),
        "paragraph" => Some(VRelativeFrom::Paragraph),
        "topMargin" => Some(VRelativeFrom::TopMargin),
        _ => None,
    }
}

fn h_align(val: &str) -> Option<HAlign> {
    match val {
        "left" => Some(HAlign::Left),
        "right" => Some(HAlign::Right),
        "center" => Some(HAlign::Center),
        "inside" => Some(HAlign::Inside),
        "outside" => Some(HAlign::Outside),
        _ => None,
    }
}

fn v_align(val: &str) -> Option<VAlign> {
    match val {
        "top" => Some(VAlign::Top),
        "bottom" => Some(VAlign::Bottom),
        "center" => Some(VAlign::Center),
        "inside" => Some(VAlign::Inside),
        "outside" => Some(VAlign::Outside),
        _ => None,
    }
}

/// EMU length in pixels, or 1 when missing or not positive.
fn dimension(emu: Option<f32>) -> f32 {
    emu.filter(|v| v.is_finite() && *v > 0.0)
        .map(emu_to_px)
        .unwrap_or(1.0)
}

fn emu_or_zero(emu: Option<f32>) -> f32 {
    emu.filter(|v| v.is_finite()).map(emu_to_px).unwrap_or(0.0)
}

pub fn geometry(extent: &Extent, transform: &Transform) -> DrawingGeometry {
    DrawingGeometry {
        width: dimension(extent.cx),
        height: dimension(extent.cy),
        rotation: transform
            .rotation
            .filter(|r| r.is_finite())
            .map(angle_to_degrees)
            .unwrap_or(0.0),
        flip_h: transform.flip_h.unwrap_or(false),
        flip_v: transform.flip_v.unwrap_or(false),
    }
}

/// Grow a shape's box by its effect extent (shadows, glow).
fn add_effect_extent(geometry: &mut DrawingGeometry, effect: Option<&EffectExtent>) {
    let Some(effect) = effect else {
        return;
    };
    geometry.width += emu_or_zero(effect.left) + emu_or_zero(effect.right);
    geometry.height += emu_or_zero(effect.top) + emu_or_zero(effect.bottom);
}

fn anchor(props: &AnchorProps) -> DrawingAnchor {
    DrawingAnchor {
        h_relative_from: props.h_relative_from.as_deref().and_then(h_relative_from),
        v_relative_from: props.v_relative_from.as_deref().and_then(v_relative_from),
        h_align: props.h_align.as_deref().and_then(h_align),
        v_align: props.v_align.as_deref().and_then(v_align),
        offset_h: emu_or_zero(props.h_offset),
        offset_v: emu_or_zero(props.v_offset),
        behind_doc: props.behind_doc.unwrap_or(false),
        allow_overlap: props.allow_overlap.unwrap_or(true),
        layout_in_cell: props.layout_in_cell.unwrap_or(true),
    }
}

/// Polygon vertices with both coordinates numeric; `None` if none are.
fn polygon(points: &[(String, String)]) -> Option<Vec<[f32; 2]>> {
    let points: Vec<[f32; 2]> = points
        .iter()
        .filter_map(|(x, y)| Some([parse_number(x)?, parse_number(y)?]))
        .collect();
    (!points.is_empty()).then_some(points)
}

fn wrap(props: Option<&WrapProps>, anchored: bool, behind_doc: bool) -> Option<DrawingWrap> {
    if !anchored {
        return Some(DrawingWrap {
            kind: WrapType::Inline,
            text: None,
            distances: WrapDistances::default(),
            polygon: None,
            behind_doc: false,
        });
    }
    let props = props?;
    let kind = props.kind.as_deref().and_then(wrap_type);
    if kind.is_none() {
        log::debug!("Discarding wrap type {:?}", props.kind);
    }
    Some(DrawingWrap {
        kind: kind?,
        text: props.text.as_deref().and_then(wrap_text),
        distances: WrapDistances {
            top: emu_or_zero(props.dist_top),
            bottom: emu_or_zero(props.dist_bottom),
            left: emu_or_zero(props.dist_left),
            right: emu_or_zero(props.dist_right),
        },
        polygon: polygon(&props.polygon),
        behind_doc,
    })
}

/// Stacking order: `relativeHeight` above Word's floor, else the direct
/// z-index.
pub fn z_index(node: &DrawingNode) -> Option<i64> {
    node.anchor
        .as_ref()
        .and_then(|a| a.relative_height)
        .map(|h| h.saturating_sub(RELATIVE_HEIGHT_BASE).max(0))
        .or(node.z_index)
}

/// Text box content as paragraphs. Tables inside text boxes are not
/// carried.
fn text_content(nodes: &[SourceNode], ctx: &mut ResolveContext, out: &mut Vec<ParagraphBlock>) {
    for node in nodes {
        match node {
            SourceNode::Paragraph(p) => out.push(paragraph_block(p, ctx, None)),
            SourceNode::StructuredContent(sdt) => text_content(&sdt.children, ctx, out),
            SourceNode::Table(_) => log::debug!("Skipping table inside text box"),
        }
    }
}

/// Build the drawing block for `node`. Images without a reference and
/// empty groups produce nothing.
pub fn build_drawing(node: &DrawingNode, ctx: &mut ResolveContext) -> Option<DrawingBlock> {
    let anchored = node.anchor.is_some();
    let behind_doc = node
        .anchor
        .as_ref()
        .and_then(|a| a.behind_doc)
        .unwrap_or(false);

    let mut geom = geometry(&node.extent, &node.transform);
    if matches!(node.kind, DrawingKind::Shape(_)) {
        add_effect_extent(&mut geom, node.effect_extent.as_ref());
    }

    let payload_ok = match &node.kind {
        DrawingKind::Image(img) => img.rel_id.is_some() || img.target.is_some(),
        DrawingKind::Shape(_) => true,
        DrawingKind::Group(children) => !children.is_empty(),
    };
    if !payload_ok {
        log::debug!("Dropping drawing {:?} with no content", node.doc_pr.name);
        return None;
    }

    let common = DrawingCommon {
        id: ctx.next_block_id(),
        geometry: geom,
        anchor: node.anchor.as_ref().map(anchor),
        wrap: wrap(node.wrap.as_ref(), anchored, behind_doc),
        z_index: z_index(node),
        name: node.doc_pr.name.clone(),
        description: node.doc_pr.description.clone(),
        sdt: None,
        source_attrs: ctx.source_attrs(&node.source_attrs),
        position: ctx.position(node.span),
    };

    let block = match &node.kind {
        DrawingKind::Image(img) => DrawingBlock::Image(ImageDrawing {
            common,
            rel_id: img.rel_id.clone(),
            target: img.target.clone(),
        }),
        DrawingKind::Shape(shape) => {
            let mut paragraphs = Vec::new();
            text_content(&shape.text, ctx, &mut paragraphs);
            DrawingBlock::Shape(ShapeDrawing {
                common,
                shape_kind: shape.preset.clone(),
                fill: shape.fill.as_deref().and_then(normalize_color),
                stroke: shape.stroke.as_deref().and_then(normalize_color),
                stroke_width: shape
                    .stroke_width
                    .filter(|w| w.is_finite() && *w >= 0.0)
                    .map(emu_to_px),
                text_content: (!paragraphs.is_empty()).then_some(paragraphs),
            })
        }
        DrawingKind::Group(children) => DrawingBlock::ShapeGroup(ShapeGroupDrawing {
            common,
            shapes: children
                .iter()
                .map(|child| {
                    let (kind, shape_kind, fill, stroke, rel_id) = match &child.kind {
                        GroupChildKind::Shape(s) => (
                            GroupShapeKind::Shape,
                            s.preset.clone(),
                            s.fill.as_deref().and_then(normalize_color),
                            s.stroke.as_deref().and_then(normalize_color),
                            None,
                        ),
                        GroupChildKind::Image(img) => {
                            (GroupShapeKind::Image, None, None, None, img.rel_id.clone())
                        }
                    };
                    GroupShape {
                        kind,
                        x: emu_or_zero(child.x),
                        y: emu_or_zero(child.y),
                        geometry: geometry(&child.extent, &child.transform),
                        shape_kind,
                        fill,
                        stroke,
                        rel_id,
                    }
                })
                .collect(),
        }),
    };
    Some(block)
}
