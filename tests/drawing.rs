mod common;

use common::approx;
use docxide_flow::model::{
    DrawingBlock, GroupShapeKind, HAlign, HRelativeFrom, VRelativeFrom, WrapText, WrapType,
};
use docxide_flow::resolve::ResolveContext;
use docxide_flow::resolve::drawing::{build_drawing, geometry, z_index};
use docxide_flow::source::{
    AnchorProps, DrawingKind, DrawingNode, EffectExtent, Extent, GroupChild, GroupChildKind,
    ImageSource, ParagraphNode, RunContent, ShapeSource, SourceDocument, SourceNode, StyleSheet,
    Transform, WrapProps,
};
use docxide_flow::ConvertOptions;

const EMU_PER_PX: f32 = 9525.0;

fn build(node: &DrawingNode) -> Option<DrawingBlock> {
    let sheet = StyleSheet::default();
    let options = ConvertOptions::default();
    let mut ctx = ResolveContext::new(&sheet, None, &options);
    build_drawing(node, &mut ctx)
}

fn image(rel_id: Option<&str>) -> DrawingNode {
    let mut node = DrawingNode::new(DrawingKind::Image(ImageSource {
        rel_id: rel_id.map(str::to_string),
        target: None,
    }));
    node.extent = Extent {
        cx: Some(100.0 * EMU_PER_PX),
        cy: Some(50.0 * EMU_PER_PX),
    };
    node
}

fn anchored(mut node: DrawingNode, wrap: WrapProps) -> DrawingNode {
    node.anchor = Some(AnchorProps::default());
    node.wrap = Some(wrap);
    node
}

fn wrap_kind(kind: &str) -> WrapProps {
    WrapProps {
        kind: Some(kind.to_string()),
        ..Default::default()
    }
}

#[test]
fn geometry_defaults_missing_dimensions_to_one() {
    let geom = geometry(&Extent::default(), &Transform::default());
    assert_eq!(geom.width, 1.0);
    assert_eq!(geom.height, 1.0);
    assert_eq!(geom.rotation, 0.0);

    let negative = Extent {
        cx: Some(-9525.0),
        cy: Some(0.0),
    };
    assert_eq!(geometry(&negative, &Transform::default()).width, 1.0);
}

#[test]
fn geometry_converts_emu_and_angles() {
    let extent = Extent {
        cx: Some(952_500.0),
        cy: Some(476_250.0),
    };
    let transform = Transform {
        rotation: Some(5_400_000.0),
        flip_h: Some(true),
        flip_v: None,
    };
    let geom = geometry(&extent, &transform);
    assert!(approx(geom.width, 100.0));
    assert!(approx(geom.height, 50.0));
    assert!(approx(geom.rotation, 90.0));
    assert!(geom.flip_h);
    assert!(!geom.flip_v);
}

#[test]
fn images_without_a_reference_are_dropped() {
    assert!(build(&image(None)).is_none());

    let linked = DrawingNode::new(DrawingKind::Image(ImageSource {
        rel_id: None,
        target: Some("media/image2.png".into()),
    }));
    assert!(matches!(build(&linked), Some(DrawingBlock::Image(_))));
}

#[test]
fn inline_drawings_wrap_inline() {
    let block = build(&image(Some("rId4"))).expect("image");
    let DrawingBlock::Image(img) = block else {
        panic!("expected image");
    };
    assert_eq!(img.rel_id.as_deref(), Some("rId4"));
    assert!(img.common.anchor.is_none());
    let wrap = img.common.wrap.expect("wrap");
    assert_eq!(wrap.kind, WrapType::Inline);
    assert!(approx(img.common.geometry.width, 100.0));
}

#[test]
fn unknown_wrap_type_is_discarded() {
    let node = anchored(image(Some("rId4")), wrap_kind("zigzag"));
    let block = build(&node).expect("image");
    assert!(block.common().wrap.is_none());
    assert!(block.common().anchor.is_some());
}

#[test]
fn anchored_wrap_distances_and_polygon() {
    let mut wrap = wrap_kind("tight");
    wrap.text = Some("largest".into());
    wrap.dist_left = Some(95_250.0);
    wrap.dist_right = Some(19_050.0);
    wrap.polygon = vec![
        ("0".into(), "0".into()),
        ("x".into(), "5".into()),
        ("21600".into(), "0".into()),
    ];
    let mut node = anchored(image(Some("rId4")), wrap);
    if let Some(anchor) = node.anchor.as_mut() {
        anchor.behind_doc = Some(true);
    }

    let block = build(&node).expect("image");
    let wrap = block.common().wrap.clone().expect("wrap");
    assert_eq!(wrap.kind, WrapType::Tight);
    assert_eq!(wrap.text, Some(WrapText::Largest));
    assert!(approx(wrap.distances.left, 10.0));
    assert!(approx(wrap.distances.right, 2.0));
    assert_eq!(wrap.distances.top, 0.0);
    assert_eq!(wrap.polygon, Some(vec![[0.0, 0.0], [21600.0, 0.0]]));
    assert!(wrap.behind_doc);
}

#[test]
fn polygon_without_numeric_points_is_omitted() {
    let mut wrap = wrap_kind("through");
    wrap.polygon = vec![("a".into(), "b".into())];
    let block = build(&anchored(image(Some("rId4")), wrap)).expect("image");
    assert_eq!(block.common().wrap.as_ref().and_then(|w| w.polygon.clone()), None);
}

#[test]
fn anchor_positions() {
    let mut node = image(Some("rId4"));
    node.anchor = Some(AnchorProps {
        h_relative_from: Some("page".into()),
        v_relative_from: Some("paragraph".into()),
        h_align: Some("center".into()),
        v_offset: Some(190_500.0),
        ..Default::default()
    });
    let anchor = build(&node)
        .and_then(|b| b.common().anchor.clone())
        .expect("anchor");
    assert_eq!(anchor.h_relative_from, Some(HRelativeFrom::Page));
    assert_eq!(anchor.v_relative_from, Some(VRelativeFrom::Paragraph));
    assert_eq!(anchor.h_align, Some(HAlign::Center));
    assert!(approx(anchor.offset_v, 20.0));
    assert_eq!(anchor.offset_h, 0.0);
    assert!(anchor.allow_overlap);
    assert!(anchor.layout_in_cell);
    assert!(!anchor.behind_doc);

    node.anchor = Some(AnchorProps {
        h_relative_from: Some("bogus".into()),
        allow_overlap: Some(false),
        ..Default::default()
    });
    let anchor = build(&node)
        .and_then(|b| b.common().anchor.clone())
        .expect("anchor");
    assert_eq!(anchor.h_relative_from, None);
    assert!(!anchor.allow_overlap);
}

#[test]
fn z_index_from_relative_height() {
    let mut node = image(Some("rId4"));
    node.z_index = Some(7);
    assert_eq!(z_index(&node), Some(7));

    node.anchor = Some(AnchorProps {
        relative_height: Some(251_659_264),
        ..Default::default()
    });
    assert_eq!(z_index(&node), Some(1024));

    node.anchor = Some(AnchorProps {
        relative_height: Some(12),
        ..Default::default()
    });
    assert_eq!(z_index(&node), Some(0));
}

#[test]
fn shapes_grow_by_their_effect_extent() {
    let mut node = DrawingNode::new(DrawingKind::Shape(ShapeSource {
        preset: Some("ellipse".into()),
        fill: Some("ffff00".into()),
        stroke: Some("auto".into()),
        stroke_width: Some(19_050.0),
        text: Vec::new(),
    }));
    node.extent = Extent {
        cx: Some(952_500.0),
        cy: Some(952_500.0),
    };
    node.effect_extent = Some(EffectExtent {
        left: Some(95_250.0),
        right: Some(95_250.0),
        top: None,
        bottom: Some(47_625.0),
    });

    let DrawingBlock::Shape(shape) = build(&node).expect("shape") else {
        panic!("expected shape");
    };
    assert!(approx(shape.common.geometry.width, 120.0));
    assert!(approx(shape.common.geometry.height, 105.0));
    assert_eq!(shape.shape_kind.as_deref(), Some("ellipse"));
    assert_eq!(shape.fill.as_deref(), Some("#FFFF00"));
    assert_eq!(shape.stroke, None);
    assert!(shape.stroke_width.is_some_and(|w| approx(w, 2.0)));
    assert!(shape.text_content.is_none());
}

#[test]
fn images_ignore_effect_extent() {
    let mut node = image(Some("rId4"));
    node.effect_extent = Some(EffectExtent {
        left: Some(95_250.0),
        ..Default::default()
    });
    let block = build(&node).expect("image");
    assert!(approx(block.common().geometry.width, 100.0));
}

#[test]
fn text_box_paragraphs_are_resolved() {
    let node = DrawingNode::new(DrawingKind::Shape(ShapeSource {
        text: vec![
            SourceNode::Paragraph(ParagraphNode::with_text("Boxed")),
            SourceNode::Paragraph(ParagraphNode::with_text("text")),
        ],
        ..Default::default()
    }));
    let DrawingBlock::Shape(shape) = build(&node).expect("shape") else {
        panic!("expected shape");
    };
    let paragraphs = shape.text_content.expect("text");
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(paragraphs[0].runs[0].text, "Boxed");
    assert!(paragraphs[0].id > shape.common.id);
}

#[test]
fn groups_carry_their_members() {
    assert!(build(&DrawingNode::new(DrawingKind::Group(Vec::new()))).is_none());

    let members = vec![
        GroupChild {
            kind: GroupChildKind::Shape(ShapeSource {
                preset: Some("rect".into()),
                fill: Some("00FF00".into()),
                ..Default::default()
            }),
            x: Some(9525.0),
            y: None,
            extent: Extent {
                cx: Some(95_250.0),
                cy: Some(95_250.0),
            },
            transform: Transform::default(),
        },
        GroupChild {
            kind: GroupChildKind::Image(ImageSource {
                rel_id: Some("rId3".into()),
                target: None,
            }),
            x: None,
            y: Some(19_050.0),
            extent: Extent::default(),
            transform: Transform::default(),
        },
    ];
    let DrawingBlock::ShapeGroup(group) =
        build(&DrawingNode::new(DrawingKind::Group(members))).expect("group")
    else {
        panic!("expected group");
    };
    assert_eq!(group.shapes.len(), 2);
    assert_eq!(group.shapes[0].kind, GroupShapeKind::Shape);
    assert!(approx(group.shapes[0].x, 1.0));
    assert!(approx(group.shapes[0].geometry.width, 10.0));
    assert_eq!(group.shapes[0].fill.as_deref(), Some("#00FF00"));
    assert_eq!(group.shapes[1].kind, GroupShapeKind::Image);
    assert!(approx(group.shapes[1].y, 2.0));
    assert_eq!(group.shapes[1].rel_id.as_deref(), Some("rId3"));
}

#[test]
fn drawings_follow_their_paragraph() {
    let mut para = ParagraphNode::with_text("caption");
    para.runs[0]
        .content
        .push(RunContent::Drawing(Box::new(image(Some("rId4")))));
    para.runs[0]
        .content
        .push(RunContent::Drawing(Box::new(image(None))));
    let doc = SourceDocument {
        body: vec![SourceNode::Paragraph(para)],
        ..Default::default()
    };
    let flow = common::convert(&doc);
    assert_eq!(flow.drawings().count(), 1);
    let para = flow.paragraphs().next().expect("paragraph");
    let drawing = flow.drawings().next().expect("drawing");
    assert_eq!(drawing.common().id, para.id + 1);
    assert_eq!(para.runs.len(), 1);
    assert_eq!(para.runs[0].text, "caption");
}
