mod common;

use common::approx;
use docxide_flow::model::{RunKind, VertAlign};
use docxide_flow::resolve::ResolveContext;
use docxide_flow::resolve::run::{font_size_px, resolve_run_props, resolve_runs};
use docxide_flow::source::{
    BreakKind, ParagraphNode, RunContent, RunNode, RunProps, StyleDef, StyleKind, StyleSheet,
};
use docxide_flow::ConvertOptions;

fn sheet() -> StyleSheet {
    let mut sheet = StyleSheet::default();
    sheet.defaults.run = RunProps {
        font_family: Some("Calibri".into()),
        size: Some(22.0),
        ..Default::default()
    };

    let mut heading = StyleDef::new("Heading1", StyleKind::Paragraph);
    heading.run = RunProps {
        size: Some(32.0),
        bold: Some(true),
        color: Some("2F5496".into()),
        ..Default::default()
    };
    sheet.insert(heading);

    let mut base = StyleDef::new("Emphasis", StyleKind::Character);
    base.run.italic = Some(true);
    sheet.insert(base);

    let mut strong = StyleDef::new("StrongEmphasis", StyleKind::Character);
    strong.based_on = Some("Emphasis".into());
    strong.run.bold = Some(false);
    strong.run.underline = Some("single".into());
    sheet.insert(strong);
    sheet
}

fn run_props(sheet: &StyleSheet, para_style: Option<&str>, direct: &RunProps) -> RunProps {
    let options = ConvertOptions::default();
    let mut ctx = ResolveContext::new(sheet, None, &options);
    let style = para_style.and_then(|id| ctx.resolved_style(id));
    resolve_run_props(&mut ctx, style.as_deref(), None, direct)
}

#[test]
fn run_props_cascade_through_styles() {
    let sheet = sheet();
    let props = run_props(&sheet, Some("Heading1"), &RunProps::default());
    assert_eq!(props.font_family.as_deref(), Some("Calibri"));
    assert_eq!(props.size, Some(32.0));
    assert_eq!(props.bold, Some(true));

    let direct = RunProps {
        style_id: Some("StrongEmphasis".into()),
        size: Some(20.0),
        ..Default::default()
    };
    let props = run_props(&sheet, Some("Heading1"), &direct);
    assert_eq!(props.size, Some(20.0));
    assert_eq!(props.italic, Some(true));
    assert_eq!(props.bold, Some(false));
    assert_eq!(props.underline.as_deref(), Some("single"));
    assert_eq!(props.color.as_deref(), Some("2F5496"));
}

#[test]
fn font_size_defaults_to_twelve_points() {
    assert!(approx(font_size_px(&RunProps::default()), 16.0));
    assert!(approx(
        font_size_px(&RunProps {
            size: Some(22.0),
            ..Default::default()
        }),
        14.6667
    ));
    assert!(approx(
        font_size_px(&RunProps {
            size: Some(0.0),
            ..Default::default()
        }),
        16.0
    ));
}

#[test]
fn content_items_become_runs() {
    let mut run = RunNode::text("Hello");
    run.content.extend([
        RunContent::Text(", world".into()),
        RunContent::Tab,
        RunContent::Text("tabbed".into()),
        RunContent::Break(BreakKind::Line),
        RunContent::Break(BreakKind::Page),
        RunContent::Break(BreakKind::Column),
    ]);
    run.props = RunProps {
        highlight: Some("yellow".into()),
        vert_align: Some("superscript".into()),
        color: Some("auto".into()),
        letter_spacing: Some(20.0),
        underline: Some("none".into()),
        ..Default::default()
    };
    run.hyperlink = Some("https://example.com".into());
    let node = ParagraphNode {
        runs: vec![run],
        ..Default::default()
    };

    let sheet = StyleSheet::default();
    let options = ConvertOptions::default();
    let mut ctx = ResolveContext::new(&sheet, None, &options);
    let runs = resolve_runs(&node, &mut ctx, None, None);

    let kinds: Vec<RunKind> = runs.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RunKind::Text,
            RunKind::Tab,
            RunKind::Text,
            RunKind::LineBreak,
            RunKind::PageBreak,
            RunKind::ColumnBreak,
        ]
    );
    assert_eq!(runs[0].text, "Hello, world");
    assert_eq!(runs[1].text, "\t");
    assert_eq!(runs[3].text, "\n");
    assert_eq!(runs[4].text, "");

    let first = &runs[0];
    assert_eq!(first.highlight.as_deref(), Some("#FFFF00"));
    assert_eq!(first.vert_align, VertAlign::Superscript);
    assert_eq!(first.color, None);
    assert_eq!(first.underline, None);
    assert!(first.letter_spacing.is_some_and(|s| approx(s, 1.3333)));
    assert!(runs.iter().all(|r| r.hyperlink.as_deref() == Some("https://example.com")));
}

#[test]
fn unknown_highlight_is_dropped() {
    let mut run = RunNode::text("x");
    run.props.highlight = Some("chartreuse".into());
    let node = ParagraphNode {
        runs: vec![run],
        ..Default::default()
    };
    let sheet = StyleSheet::default();
    let options = ConvertOptions::default();
    let mut ctx = ResolveContext::new(&sheet, None, &options);
    let runs = resolve_runs(&node, &mut ctx, None, None);
    assert_eq!(runs[0].highlight, None);
}
