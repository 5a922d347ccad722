mod common;

use std::collections::BTreeMap;

use common::{approx, indent, list_paragraph, list_sheet};
use docxide_flow::model::{Alignment, DropCapMode, FloatAlignment, ParagraphAttrs, ResolvedIndent};
use docxide_flow::resolve::ResolveContext;
use docxide_flow::resolve::paragraph::resolve_paragraph;
use docxide_flow::source::{
    FrameProps, LevelOverride, ListRendering, NumId, NumberingRef, ParagraphNode, RunNode,
    RunProps, Spacing, StructuredContentMeta, StyleDef, StyleKind, StyleSheet,
};
use docxide_flow::{ConvertOptions, ListCounterContext, ListCounters};

fn resolve(sheet: &StyleSheet, node: &ParagraphNode) -> ParagraphAttrs {
    let options = ConvertOptions::default();
    let mut counters = ListCounters::new();
    let mut ctx = ResolveContext::new(sheet, Some(&mut counters), &options);
    resolve_paragraph(node, &mut ctx, None)
}

fn resolve_all(sheet: &StyleSheet, nodes: &[ParagraphNode]) -> Vec<ParagraphAttrs> {
    let options = ConvertOptions::default();
    let mut counters = ListCounters::new();
    let mut ctx = ResolveContext::new(sheet, Some(&mut counters), &options);
    nodes
        .iter()
        .map(|n| resolve_paragraph(n, &mut ctx, None))
        .collect()
}

fn styled(style_id: &str) -> ParagraphNode {
    let mut node = ParagraphNode::with_text("text");
    node.inline.style_id = Some(style_id.to_string());
    node
}

fn markers(attrs: &[ParagraphAttrs]) -> Vec<String> {
    attrs
        .iter()
        .map(|a| {
            a.numbering
                .as_ref()
                .map(|n| n.marker_text.clone())
                .unwrap_or_default()
        })
        .collect()
}

// --- alignment ---

#[test]
fn rtl_with_adjusted_right_indent_is_right_aligned() {
    let mut node = ParagraphNode::with_text("text");
    node.inline.bidi = Some(true);
    node.inline.adjust_right_ind = Some(true);
    node.direct.justification = Some("center".into());
    let attrs = resolve(&StyleSheet::default(), &node);
    assert_eq!(attrs.alignment, Alignment::Right);
    assert!(attrs.rtl);
}

#[test]
fn direct_alignment_beats_inline() {
    let mut node = ParagraphNode::with_text("text");
    node.direct.justification = Some("center".into());
    node.inline.justification = Some("both".into());
    assert_eq!(resolve(&StyleSheet::default(), &node).alignment, Alignment::Center);
}

#[test]
fn unknown_alignment_falls_through() {
    let mut node = ParagraphNode::with_text("text");
    node.direct.justification = Some("sideways".into());
    node.inline.justification = Some("both".into());
    assert_eq!(resolve(&StyleSheet::default(), &node).alignment, Alignment::Justify);

    node.inline.justification = Some("end".into());
    assert_eq!(resolve(&StyleSheet::default(), &node).alignment, Alignment::Right);
}

#[test]
fn bidi_beats_style_alignment_but_not_inline() {
    let mut sheet = StyleSheet::default();
    let mut centered = StyleDef::new("Centered", StyleKind::Paragraph);
    centered.paragraph.justification = Some("center".into());
    sheet.insert(centered);

    let mut node = styled("Centered");
    assert_eq!(resolve(&sheet, &node).alignment, Alignment::Center);

    node.inline.bidi = Some(true);
    assert_eq!(resolve(&sheet, &node).alignment, Alignment::Right);

    node.inline.justification = Some("center".into());
    assert_eq!(resolve(&sheet, &node).alignment, Alignment::Center);
}

#[test]
fn alignment_defaults_to_left() {
    let attrs = resolve(&StyleSheet::default(), &ParagraphNode::with_text("text"));
    assert_eq!(attrs.alignment, Alignment::Left);
    assert!(!attrs.rtl);
}

// --- numbering ---

#[test]
fn numbering_id_zero_disables_numbering() {
    let sheet = list_sheet();
    for id in [NumId::from("0"), NumId::from(0), NumId::Number(-0.0)] {
        let options = ConvertOptions::default();
        let mut counters = ListCounters::new();
        {
            let mut ctx = ResolveContext::new(&sheet, Some(&mut counters), &options);
            let attrs = resolve_paragraph(&list_paragraph(id.clone(), 0.0), &mut ctx, None);
            assert!(attrs.numbering.is_none(), "{id:?} should not number");
            assert!(attrs.indent.is_none());
        }
        assert_eq!(counters.get("0", 0), 0);
        assert_eq!(counters.get("1", 0), 0);
    }
}

#[test]
fn other_numbering_ids_produce_numbering() {
    let sheet = list_sheet();
    for id in [
        NumId::from("1"),
        NumId::from(1),
        NumId::from(7),
        NumId::from("-0"),
        NumId::Number(-3.0),
    ] {
        let attrs = resolve(&sheet, &list_paragraph(id.clone(), 0.0));
        let numbering = attrs.numbering.expect("numbered");
        assert!(!numbering.synthetic, "{id:?}");
        assert_eq!(numbering.counter, 1);
    }
}

#[test]
fn numbering_disabled_by_direct_zero_over_style_list() {
    let mut sheet = list_sheet();
    let mut list_style = StyleDef::new("ListNumber", StyleKind::Paragraph);
    list_style.paragraph.numbering = Some(NumberingRef {
        num_id: Some(NumId::from("1")),
        level: Some(0.0),
    });
    sheet.insert(list_style);

    let node = styled("ListNumber");
    assert_eq!(resolve(&sheet, &node).numbering.map(|n| n.marker_text), Some("1.".into()));

    let mut node = styled("ListNumber");
    node.inline.numbering = Some(NumberingRef {
        num_id: Some(NumId::from("0")),
        level: None,
    });
    assert!(resolve(&sheet, &node).numbering.is_none());
}

#[test]
fn counters_advance_and_reset_deeper_levels() {
    let sheet = list_sheet();
    let items: Vec<ParagraphNode> = [0.0, 1.0, 1.0, 0.0, 1.0]
        .into_iter()
        .map(|lvl| list_paragraph(NumId::from("1"), lvl))
        .collect();
    let attrs = resolve_all(&sheet, &items);
    assert_eq!(markers(&attrs), vec!["1.", "1.a)", "1.b)", "2.", "2.a)"]);

    let last = attrs[4].numbering.as_ref().expect("numbered");
    assert_eq!(last.level, 1);
    assert_eq!(last.path, vec![2, 1]);
    assert_eq!(last.format.as_deref(), Some("lowerLetter"));
}

#[test]
fn counters_are_per_list() {
    let mut sheet = list_sheet();
    let instance = sheet.numbering.instances["1"].clone();
    sheet.numbering.instances.insert("2".into(), instance);

    let items = vec![
        list_paragraph(NumId::from("1"), 0.0),
        list_paragraph(NumId::from("2"), 0.0),
        list_paragraph(NumId::from("1"), 0.0),
    ];
    assert_eq!(markers(&resolve_all(&sheet, &items)), vec!["1.", "1.", "2."]);
}

#[test]
fn start_override_shifts_the_counter() {
    let mut sheet = list_sheet();
    let mut instance = sheet.numbering.instances["1"].clone();
    instance.overrides = BTreeMap::from([(
        0,
        LevelOverride {
            start: Some(5),
            level: None,
        },
    )]);
    sheet.numbering.instances.insert("3".into(), instance);

    let items = vec![
        list_paragraph(NumId::from("3"), 0.0),
        list_paragraph(NumId::from("3"), 0.0),
        list_paragraph(NumId::from("3"), 1.0),
    ];
    let attrs = resolve_all(&sheet, &items);
    assert_eq!(markers(&attrs), vec!["5.", "6.", "6.a)"]);

    // Parents stay raw store counts; only the item's own entry is shifted.
    let paths: Vec<Vec<u32>> = attrs
        .iter()
        .filter_map(|a| a.numbering.as_ref())
        .map(|n| n.path.clone())
        .collect();
    assert_eq!(paths, vec![vec![5], vec![6], vec![2, 1]]);
}

#[test]
fn level_indent_sits_between_style_and_inline() {
    let sheet = list_sheet();
    let attrs = resolve(&sheet, &list_paragraph(NumId::from("1"), 0.0));
    assert_eq!(
        attrs.indent,
        Some(ResolvedIndent {
            left: Some(48.0),
            right: None,
            first_line: None,
            hanging: Some(24.0),
        })
    );

    let mut node = list_paragraph(NumId::from("1"), 0.0);
    node.inline.indent = Some(indent(Some(1440.0), None, None));
    let attrs = resolve(&sheet, &node);
    let ind = attrs.indent.expect("indent");
    assert_eq!(ind.left, Some(96.0));
    assert_eq!(ind.hanging, Some(24.0));
}

#[test]
fn missing_definition_uses_rendering_hint() {
    let sheet = StyleSheet::default();
    let mut node = list_paragraph(NumId::from("99"), 0.0);
    node.list_rendering = Some(ListRendering {
        marker_text: Some("(i)".into()),
        num_fmt: Some("lowerRoman".into()),
        ..Default::default()
    });
    let numbering = resolve(&sheet, &node).numbering.expect("numbered");
    assert_eq!(numbering.marker_text, "(i)");
    assert_eq!(numbering.format.as_deref(), Some("lowerRoman"));
    assert!(!numbering.synthetic);

    let plain = resolve(&sheet, &list_paragraph(NumId::from("99"), 0.0));
    assert_eq!(plain.numbering.map(|n| n.marker_text), Some("1.".into()));
}

#[test]
fn rendering_hint_alone_synthesizes_numbering() {
    let mut node = ParagraphNode::with_text("item");
    node.list_rendering = Some(ListRendering {
        marker_text: Some("iii.".into()),
        path: vec![1, 3],
        ..Default::default()
    });
    let numbering = resolve(&StyleSheet::default(), &node)
        .numbering
        .expect("synthetic");
    assert!(numbering.synthetic);
    assert_eq!(numbering.list_id, "-1");
    assert_eq!(numbering.level, 1);
    assert_eq!(numbering.counter, 3);
    assert_eq!(numbering.marker_text, "iii.");

    node.list_rendering = Some(ListRendering::default());
    let numbering = resolve(&StyleSheet::default(), &node)
        .numbering
        .expect("synthetic");
    assert_eq!(numbering.path, vec![1]);
    assert_eq!(numbering.level, 0);
}

#[test]
fn reference_without_list_id_falls_back_to_rendering_hint() {
    let mut node = ParagraphNode::with_text("item");
    node.inline.numbering = Some(NumberingRef {
        num_id: None,
        level: Some(1.0),
    });
    node.list_rendering = Some(ListRendering {
        marker_text: Some("a)".into()),
        path: vec![1, 1],
        ..Default::default()
    });
    let numbering = resolve(&StyleSheet::default(), &node)
        .numbering
        .expect("synthetic");
    assert!(numbering.synthetic);
    assert_eq!(numbering.marker_text, "a)");
    assert_eq!(numbering.level, 1);

    node.inline.numbering = Some(NumberingRef {
        num_id: Some(NumId::from("")),
        level: None,
    });
    let numbering = resolve(&StyleSheet::default(), &node).numbering;
    assert_eq!(numbering.map(|n| n.marker_text), Some("a)".into()));

    node.list_rendering = None;
    assert!(resolve(&StyleSheet::default(), &node).numbering.is_none());
}

// --- spacing ---

#[test]
fn contextual_spacing_lookup_order() {
    let mut sheet = StyleSheet::default();
    let mut compact = StyleDef::new("Compact", StyleKind::Paragraph);
    compact.paragraph.contextual_spacing = Some(true);
    sheet.insert(compact);

    let mut node = styled("Compact");
    assert!(resolve(&sheet, &node).contextual_spacing);

    node.direct.contextual_spacing = Some(false);
    assert!(!resolve(&sheet, &node).contextual_spacing);

    node.inline.contextual_spacing = Some(true);
    assert!(resolve(&sheet, &node).contextual_spacing);

    node.direct.spacing = Some(Spacing {
        contextual: Some(false),
        ..Default::default()
    });
    assert!(!resolve(&sheet, &node).contextual_spacing);

    assert!(!resolve(&StyleSheet::default(), &ParagraphNode::with_text("x")).contextual_spacing);
}

#[test]
fn spacing_resolves_to_pixels_and_line_multiplier() {
    let mut sheet = StyleSheet::default();
    sheet.defaults.paragraph.spacing = Some(Spacing {
        after: Some(240.0),
        line: Some(360.0),
        ..Default::default()
    });
    let mut node = ParagraphNode::with_text("x");
    node.inline.spacing = Some(Spacing {
        before: Some(120.0),
        ..Default::default()
    });
    let spacing = resolve(&sheet, &node).spacing.expect("spacing");
    assert_eq!(spacing.before, Some(8.0));
    assert_eq!(spacing.after, Some(16.0));
    assert_eq!(spacing.line, Some(1.5));
}

// --- styles ---

fn heading_sheet() -> StyleSheet {
    let mut sheet = StyleSheet::default();
    let mut normal = StyleDef::new("Normal", StyleKind::Paragraph);
    normal.is_default = true;
    normal.paragraph.indent = Some(indent(None, Some(720.0), None));
    sheet.insert(normal);

    let mut heading = StyleDef::new("Heading1", StyleKind::Paragraph);
    heading.name = Some("heading 1".into());
    heading.based_on = Some("Normal".into());
    sheet.insert(heading);

    let mut titled = StyleDef::new("Chapter", StyleKind::Paragraph);
    titled.based_on = Some("Normal".into());
    titled.paragraph.outline_level = Some(0);
    titled.paragraph.indent = Some(indent(None, Some(360.0), None));
    sheet.insert(titled);

    let mut body = StyleDef::new("Body", StyleKind::Paragraph);
    body.based_on = Some("Normal".into());
    sheet.insert(body);
    sheet
}

#[test]
fn headings_drop_inherited_first_line_indent() {
    let sheet = heading_sheet();

    let attrs = resolve(&sheet, &styled("Heading1"));
    assert!(attrs.is_heading);
    assert_eq!(attrs.indent.and_then(|i| i.first_line), Some(0.0));

    let attrs = resolve(&sheet, &styled("Body"));
    assert!(!attrs.is_heading);
    assert_eq!(attrs.indent.and_then(|i| i.first_line), Some(48.0));
}

#[test]
fn heading_keeps_explicit_indents() {
    let sheet = heading_sheet();

    let attrs = resolve(&sheet, &styled("Chapter"));
    assert!(attrs.is_heading);
    assert_eq!(attrs.outline_level, Some(0));
    assert_eq!(attrs.indent.and_then(|i| i.first_line), Some(24.0));

    let mut node = styled("Heading1");
    node.inline.indent = Some(indent(None, Some(240.0), None));
    assert_eq!(
        resolve(&sheet, &node).indent.and_then(|i| i.first_line),
        Some(16.0)
    );
}

#[test]
fn default_paragraph_style_applies_without_a_style_id() {
    let sheet = heading_sheet();
    let attrs = resolve(&sheet, &ParagraphNode::with_text("x"));
    assert_eq!(attrs.style_id.as_deref(), Some("Normal"));
    assert_eq!(attrs.indent.and_then(|i| i.first_line), Some(48.0));
}

#[test]
fn cyclic_based_on_chain_terminates() {
    let mut sheet = StyleSheet::default();
    let mut a = StyleDef::new("A", StyleKind::Paragraph);
    a.based_on = Some("B".into());
    a.paragraph.keep_next = Some(true);
    let mut b = StyleDef::new("B", StyleKind::Paragraph);
    b.based_on = Some("A".into());
    b.paragraph.justification = Some("right".into());
    sheet.insert(a);
    sheet.insert(b);

    let attrs = resolve(&sheet, &styled("A"));
    assert!(attrs.keep_next);
    assert_eq!(attrs.alignment, Alignment::Right);
}

#[test]
fn table_style_only_fills_gaps() {
    let mut sheet = StyleSheet::default();
    let mut normal = StyleDef::new("Normal", StyleKind::Paragraph);
    normal.paragraph.spacing = Some(Spacing {
        after: Some(120.0),
        ..Default::default()
    });
    sheet.insert(normal);
    let mut grid = StyleDef::new("Grid", StyleKind::Table);
    grid.paragraph.spacing = Some(Spacing {
        before: Some(480.0),
        after: Some(240.0),
        ..Default::default()
    });
    grid.paragraph.justification = Some("center".into());
    sheet.insert(grid);

    let options = ConvertOptions::default();
    let mut ctx = ResolveContext::new(&sheet, None, &options);
    let table_style = ctx.resolved_style("Grid");
    let attrs = resolve_paragraph(&styled("Normal"), &mut ctx, table_style.as_deref());
    let spacing = attrs.spacing.expect("spacing");
    assert_eq!(spacing.before, Some(32.0));
    assert_eq!(spacing.after, Some(8.0));
    assert_eq!(attrs.alignment, Alignment::Center);
}

// --- frames and drop caps ---

#[test]
fn frame_alignment_becomes_float_alignment() {
    let mut node = ParagraphNode::with_text("aside");
    node.inline.frame = Some(FrameProps {
        x_align: Some("center".into()),
        x: Some(1440.0),
        width: Some(2880.0),
        ..Default::default()
    });
    let attrs = resolve(&StyleSheet::default(), &node);
    assert_eq!(attrs.float_alignment, Some(FloatAlignment::Center));
    let frame = attrs.frame.expect("frame");
    assert_eq!(frame.x, Some(96.0));
    assert_eq!(frame.width, Some(192.0));
    assert!(attrs.drop_cap.is_none());

    node.inline.frame = Some(FrameProps {
        x_align: Some("sideways".into()),
        ..Default::default()
    });
    let attrs = resolve(&StyleSheet::default(), &node);
    assert_eq!(attrs.float_alignment, None);
    assert_eq!(
        attrs.frame.and_then(|f| f.x_align).as_deref(),
        Some("sideways")
    );
}

#[test]
fn drop_cap_takes_the_first_text_run() {
    let mut node = ParagraphNode::default();
    node.runs.push(RunNode::default());
    let mut first = RunNode::text("Once");
    first.props = RunProps {
        size: Some(48.0),
        bold: Some(true),
        color: Some("c00000".into()),
        ..Default::default()
    };
    node.runs.push(first);
    node.inline.frame = Some(FrameProps {
        drop_cap: Some("drop".into()),
        wrap: Some("around".into()),
        ..Default::default()
    });

    let drop_cap = resolve(&StyleSheet::default(), &node)
        .drop_cap
        .expect("drop cap");
    assert_eq!(drop_cap.mode, DropCapMode::Drop);
    assert_eq!(drop_cap.lines, 3);
    assert_eq!(drop_cap.wrap.as_deref(), Some("around"));
    assert_eq!(drop_cap.run.text, "Once");
    assert!(approx(drop_cap.run.font_size, 32.0));
    assert!(drop_cap.run.bold);
    assert_eq!(drop_cap.run.color.as_deref(), Some("#C00000"));
}

#[test]
fn drop_cap_needs_text_and_a_known_mode() {
    let mut node = ParagraphNode::default();
    node.inline.frame = Some(FrameProps {
        drop_cap: Some("margin".into()),
        lines: Some(2),
        ..Default::default()
    });
    assert!(resolve(&StyleSheet::default(), &node).drop_cap.is_none());

    node.runs.push(RunNode::text("W"));
    let drop_cap = resolve(&StyleSheet::default(), &node)
        .drop_cap
        .expect("drop cap");
    assert_eq!(drop_cap.mode, DropCapMode::Margin);
    assert_eq!(drop_cap.lines, 2);
    assert!(approx(drop_cap.run.font_size, 16.0));

    node.inline.frame = Some(FrameProps {
        drop_cap: Some("none".into()),
        ..Default::default()
    });
    assert!(resolve(&StyleSheet::default(), &node).drop_cap.is_none());
}

#[test]
fn structured_content_is_memoized_per_pass() {
    let sheet = StyleSheet::default();
    let options = ConvertOptions::default();
    let mut ctx = ResolveContext::new(&sheet, None, &options);

    let meta = StructuredContentMeta {
        tag: Some("clause".into()),
        lock: Some("sdtContentLocked".into()),
        ..Default::default()
    };
    let first = ctx.structured_content(&meta);
    let second = ctx.structured_content(&meta);
    assert_eq!(first, second);
    assert_eq!(first.kind, "richText");
    assert!(first.locked);
    assert_eq!(ctx.cache.structured_content_entries(), 1);

    let unlocked = ctx.structured_content(&StructuredContentMeta {
        lock: Some("unlocked".into()),
        ..Default::default()
    });
    assert!(!unlocked.locked);
    assert_eq!(ctx.cache.structured_content_entries(), 2);

    ctx.cache.clear();
    assert_eq!(ctx.cache.structured_content_entries(), 0);
}
