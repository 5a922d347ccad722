//! Run formatting: doc defaults < table style < paragraph style <
//! character style chain < direct `w:rPr`.

use crate::model::{Run, RunKind, VertAlign};
use crate::source::{BreakKind, ParagraphNode, RunContent, RunNode, RunProps};
use crate::units::{half_points_to_px, twips_to_px};

use super::cascade::cascade;
use super::{ResolveContext, ResolvedStyle, normalize_color};

/// 12pt, used when neither defaults nor styles give a size.
pub const DEFAULT_FONT_SIZE_HALF_POINTS: f32 = 24.0;

/// Merge every run property source for one run.
pub fn resolve_run_props(
    ctx: &mut ResolveContext,
    para_style: Option<&ResolvedStyle>,
    table_style: Option<&ResolvedStyle>,
    direct: &RunProps,
) -> RunProps {
    let char_style = direct
        .style_id
        .as_deref()
        .and_then(|id| ctx.resolved_style(id));
    cascade([
        Some(&ctx.styles.defaults.run),
        table_style.map(|s| &s.run),
        para_style.map(|s| &s.run),
        char_style.as_deref().map(|s| &s.run),
        Some(direct),
    ])
    .unwrap_or_default()
}

fn highlight_hex(name: &str) -> Option<&'static str> {
    let hex = match name {
        "yellow" => "#FFFF00",
        "green" => "#00FF00",
        "cyan" => "#00FFFF",
        "magenta" => "#FF00FF",
        "red" => "#FF0000",
        "blue" => "#0000FF",
        "darkYellow" => "#808000",
        "darkGreen" => "#008000",
        "darkCyan" => "#008080",
        "darkMagenta" => "#800080",
        "darkRed" => "#800000",
        "darkBlue" => "#000080",
        "lightGray" => "#C0C0C0",
        "darkGray" => "#808080",
        "black" => "#000000",
        "white" => "#FFFFFF",
        _ => return None,
    };
    Some(hex)
}

fn vert_align(val: Option<&str>) -> VertAlign {
    match val {
        Some("superscript") => VertAlign::Superscript,
        Some("subscript") => VertAlign::Subscript,
        _ => VertAlign::Baseline,
    }
}

pub fn font_size_px(props: &RunProps) -> f32 {
    half_points_to_px(
        props
            .size
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE_HALF_POINTS),
    )
}

fn make_run(props: &RunProps, kind: RunKind, text: String, hyperlink: Option<&String>) -> Run {
    Run {
        kind,
        text,
        font_family: props.font_family.clone(),
        font_size: font_size_px(props),
        bold: props.bold.unwrap_or(false),
        italic: props.italic.unwrap_or(false),
        underline: props.underline.clone().filter(|u| u != "none"),
        strike: props.strike.unwrap_or(false),
        double_strike: props.double_strike.unwrap_or(false),
        caps: props.caps.unwrap_or(false),
        small_caps: props.small_caps.unwrap_or(false),
        vanish: props.vanish.unwrap_or(false),
        color: props.color.as_deref().and_then(normalize_color),
        highlight: props
            .highlight
            .as_deref()
            .and_then(highlight_hex)
            .map(str::to_string),
        vert_align: vert_align(props.vert_align.as_deref()),
        letter_spacing: props.letter_spacing.map(twips_to_px),
        hyperlink: hyperlink.cloned(),
    }
}

/// Resolve one run node into output runs, one per content item. Adjacent
/// text items merge; drawings are left to block assembly.
pub fn resolve_run(
    node: &RunNode,
    ctx: &mut ResolveContext,
    para_style: Option<&ResolvedStyle>,
    table_style: Option<&ResolvedStyle>,
) -> Vec<Run> {
    let props = resolve_run_props(ctx, para_style, table_style, &node.props);
    let link = node.hyperlink.as_ref();
    let mut out: Vec<Run> = Vec::new();
    for content in &node.content {
        match content {
            RunContent::Text(text) => {
                if let Some(last) = out.last_mut().filter(|r| r.kind == RunKind::Text) {
                    last.text.push_str(text);
                } else {
                    out.push(make_run(&props, RunKind::Text, text.clone(), link));
                }
            }
            RunContent::Tab => out.push(make_run(&props, RunKind::Tab, "\t".into(), link)),
            RunContent::Break(kind) => {
                let (kind, text) = match kind {
                    BreakKind::Line => (RunKind::LineBreak, "\n"),
                    BreakKind::Page => (RunKind::PageBreak, ""),
                    BreakKind::Column => (RunKind::ColumnBreak, ""),
                };
                out.push(make_run(&props, kind, text.to_string(), link));
            }
            RunContent::Drawing(_) => {}
        }
    }
    out
}

pub fn resolve_runs(
    node: &ParagraphNode,
    ctx: &mut ResolveContext,
    para_style: Option<&ResolvedStyle>,
    table_style: Option<&ResolvedStyle>,
) -> Vec<Run> {
    node.runs
        .iter()
        .flat_map(|r| resolve_run(r, ctx, para_style, table_style))
        .collect()
}

/// First run that carries visible text, with its resolved properties.
pub fn first_text_run<'n>(
    node: &'n ParagraphNode,
    ctx: &mut ResolveContext,
    para_style: Option<&ResolvedStyle>,
    table_style: Option<&ResolvedStyle>,
) -> Option<(&'n str, RunProps)> {
    node.runs.iter().find_map(|run| {
        let text = run.content.iter().find_map(|c| match c {
            RunContent::Text(t) if !t.is_empty() => Some(t.as_str()),
            _ => None,
        })?;
        Some((text, resolve_run_props(ctx, para_style, table_style, &run.props)))
    })
}
