//! Paragraph attribute resolution.
//!
//! Sources, lowest precedence first: document defaults, the enclosing
//! table style's paragraph properties, the paragraph style (with its
//! `basedOn` chain), the numbering level (indent only), `w:pPr`, and
//! attributes set directly on the node.

use crate::model::{
    Alignment, DropCap, DropCapMode, DropCapRun, FloatAlignment, NumberingProperties,
    ParagraphAttrs, ParagraphBorders, ParagraphFrame, ResolvedIndent, ResolvedShading,
    ResolvedSpacing, TabStop,
};
use crate::source::{
    BorderSet, FrameProps, Indent, LineRule, NumberingRef, ParagraphNode, ParagraphProps,
    Shading, Spacing, StyleKind, TabStops,
};
use crate::units::{LINE_UNITS, twips_to_px};

use super::cascade::{SourceRank, cascade, cascade_ranked};
use super::numbering::{
    ListCounterContext, MAX_LIST_LEVELS, SYNTHETIC_LIST_ID, build_numbering_path, clamp_level,
    format_marker, format_number, lookup_level,
};
use super::run::{first_text_run, font_size_px};
use super::{ResolveContext, ResolvedStyle, normalize_color, resolve_border};

/// Map a `w:jc` value onto an alignment. Unknown values give `None` so the
/// caller can fall through to the next source.
pub fn normalize_alignment(val: &str) -> Option<Alignment> {
    match val {
        "left" | "start" => Some(Alignment::Left),
        "right" | "end" => Some(Alignment::Right),
        "center" => Some(Alignment::Center),
        "both" | "justify" | "distribute" => Some(Alignment::Justify),
        _ => None,
    }
}

/// The paragraph property sources in cascade order, numbering excluded.
struct Sources<'s> {
    defaults: &'s ParagraphProps,
    table: Option<&'s ParagraphProps>,
    style: Option<&'s ParagraphProps>,
    inline: &'s ParagraphProps,
    direct: &'s ParagraphProps,
}

impl<'s> Sources<'s> {
    fn ranked(&self) -> [(SourceRank, Option<&'s ParagraphProps>); 5] {
        [
            (SourceRank::DocDefaults, Some(self.defaults)),
            (SourceRank::TableStyle, self.table),
            (SourceRank::Style, self.style),
            (SourceRank::Inline, Some(self.inline)),
            (SourceRank::Direct, Some(self.direct)),
        ]
    }

    /// Highest source that sets the field.
    fn pick<T>(&self, field: impl Fn(&ParagraphProps) -> Option<T>) -> Option<T> {
        self.ranked()
            .iter()
            .rev()
            .filter_map(|(_, s)| s.and_then(&field))
            .next()
    }

    fn flag(&self, field: impl Fn(&ParagraphProps) -> Option<bool>) -> bool {
        self.pick(field).unwrap_or(false)
    }

    fn nested<T: super::cascade::Cascade + 's>(
        &self,
        field: impl Fn(&'s ParagraphProps) -> Option<&'s T>,
    ) -> Option<T> {
        cascade(self.ranked().iter().map(|(_, s)| s.and_then(&field)))
    }
}

/// Resolve every paragraph-level attribute of `node`.
///
/// `table_style` is the style of the table the paragraph sits in, if any.
/// Numbering counters in `ctx` advance as a side effect.
pub fn resolve_paragraph(
    node: &ParagraphNode,
    ctx: &mut ResolveContext,
    table_style: Option<&ResolvedStyle>,
) -> ParagraphAttrs {
    let style = paragraph_style(node, ctx);
    resolve_with_style(node, ctx, style.as_deref(), table_style)
}

/// The paragraph's own style, or the document's default paragraph style.
pub(crate) fn paragraph_style(
    node: &ParagraphNode,
    ctx: &mut ResolveContext,
) -> Option<std::rc::Rc<ResolvedStyle>> {
    let id = node
        .direct
        .style_id
        .clone()
        .or_else(|| node.inline.style_id.clone())
        .or_else(|| {
            ctx.styles
                .default_style(StyleKind::Paragraph)
                .map(|s| s.id.clone())
        })?;
    ctx.resolved_style(&id)
}

pub(crate) fn resolve_with_style(
    node: &ParagraphNode,
    ctx: &mut ResolveContext,
    style: Option<&ResolvedStyle>,
    table_style: Option<&ResolvedStyle>,
) -> ParagraphAttrs {
    let sheet = ctx.styles;
    let src = Sources {
        defaults: &sheet.defaults.paragraph,
        table: table_style.map(|s| &s.paragraph),
        style: style.map(|s| &s.paragraph),
        inline: &node.inline,
        direct: &node.direct,
    };

    let bidi = src.flag(|p| p.bidi);
    let adjust_right_ind = src.flag(|p| p.adjust_right_ind);
    let alignment = resolve_alignment(&src, bidi, adjust_right_ind);

    // Numbering first: its level indent is a cascade source below.
    let numbering_ref: Option<NumberingRef> = src.nested(|p| p.numbering.as_ref());
    let numbering = resolve_numbering(node, numbering_ref.as_ref(), ctx);
    let level_indent = numbering.as_ref().and_then(|n| n.level_indent.as_ref());

    let mut indent_sources: Vec<(SourceRank, Option<&Indent>)> = src
        .ranked()
        .iter()
        .map(|(rank, s)| (*rank, s.and_then(|p| p.indent.as_ref())))
        .collect();
    indent_sources.push((SourceRank::Numbering, level_indent));
    let mut indent = cascade_ranked(&mut indent_sources);

    let is_heading = style.is_some_and(|s| s.is_heading);
    let explicit_indent = node.inline.indent.is_some()
        || node.direct.indent.is_some()
        || level_indent.is_some()
        || style.is_some_and(|s| s.own_indent);
    if is_heading && !explicit_indent {
        if let Some(ind) = indent.as_mut() {
            if ind.first_line.is_some() {
                ind.first_line = Some(0.0);
            }
            if ind.hanging.is_some() {
                ind.hanging = Some(0.0);
            }
        }
    }

    let spacing: Option<Spacing> = src.nested(|p| p.spacing.as_ref());
    let contextual_spacing = node
        .direct
        .spacing
        .as_ref()
        .and_then(|s| s.contextual)
        .or(node.inline.contextual_spacing)
        .or(node.direct.contextual_spacing)
        .or_else(|| {
            style.and_then(|s| {
                s.paragraph
                    .spacing
                    .as_ref()
                    .and_then(|sp| sp.contextual)
                    .or(s.paragraph.contextual_spacing)
            })
        })
        .unwrap_or(false);

    let tabs: Option<TabStops> = src.nested(|p| p.tabs.as_ref());
    let borders: Option<BorderSet> = src.nested(|p| p.borders.as_ref());
    let shading: Option<Shading> = src.nested(|p| p.shading.as_ref());

    // Frames come from styles and the paragraph itself only.
    let frame_props: Option<FrameProps> = cascade([
        src.style.and_then(|p| p.frame.as_ref()),
        node.inline.frame.as_ref(),
        node.direct.frame.as_ref(),
    ]);
    let frame = frame_props.as_ref().map(resolve_frame);
    let float_alignment = frame_props
        .as_ref()
        .and_then(|f| f.x_align.as_deref())
        .and_then(|x| match x {
            "left" => Some(FloatAlignment::Left),
            "right" => Some(FloatAlignment::Right),
            "center" => Some(FloatAlignment::Center),
            _ => None,
        });
    let drop_cap = frame_props
        .as_ref()
        .and_then(|f| resolve_drop_cap(node, f, ctx, style, table_style));

    ParagraphAttrs {
        style_id: style.map(|s| s.id.clone()),
        alignment,
        indent: indent.as_ref().map(indent_px),
        spacing: spacing.as_ref().map(spacing_px),
        contextual_spacing,
        borders: borders.as_ref().and_then(paragraph_borders),
        shading: shading.as_ref().and_then(resolve_shading),
        tab_stops: tabs.map(tab_stops_px).unwrap_or_default(),
        numbering: numbering.map(|n| n.props),
        rtl: bidi,
        text_direction: src.pick(|p| p.text_direction.clone()),
        frame,
        float_alignment,
        drop_cap,
        keep_next: src.flag(|p| p.keep_next),
        keep_lines: src.flag(|p| p.keep_lines),
        page_break_before: src.flag(|p| p.page_break_before),
        outline_level: src.pick(|p| p.outline_level),
        is_heading,
    }
}

fn resolve_alignment(src: &Sources, bidi: bool, adjust_right_ind: bool) -> Alignment {
    if bidi && adjust_right_ind {
        return Alignment::Right;
    }
    let explicit = |p: &ParagraphProps| p.justification.as_deref().and_then(normalize_alignment);
    if let Some(a) = explicit(src.direct) {
        return a;
    }
    if let Some(a) = explicit(src.inline) {
        return a;
    }
    if bidi {
        return Alignment::Right;
    }
    [src.style, src.table, Some(src.defaults)]
        .into_iter()
        .flatten()
        .find_map(explicit)
        .unwrap_or(Alignment::Left)
}

struct ResolvedNumbering {
    props: NumberingProperties,
    /// Level `w:ind`, twips; joins the indent cascade.
    level_indent: Option<Indent>,
}

fn resolve_numbering(
    node: &ParagraphNode,
    numbering: Option<&NumberingRef>,
    ctx: &mut ResolveContext,
) -> Option<ResolvedNumbering> {
    // A reference without a usable list id numbers like no reference.
    let Some(list_id) = numbering
        .and_then(|n| n.num_id.as_ref())
        .and_then(|id| id.normalized())
    else {
        return node.list_rendering.as_ref().map(synthesize_numbering);
    };
    if list_id == "0" {
        return None;
    }

    let level = clamp_level(numbering.and_then(|n| n.level).unwrap_or(0.0))
        .min(MAX_LIST_LEVELS - 1);
    let def = lookup_level(&ctx.styles.numbering, &list_id, level);
    if def.is_none() {
        log::debug!("No numbering definition for numId={list_id} ilvl={level}");
    }
    let start = def.as_ref().and_then(|d| d.start).unwrap_or(1);

    let counter = match ctx.counters.as_deref_mut() {
        Some(store) => advance_counter(store, &list_id, level, start),
        None => start,
    };
    let path = build_numbering_path(
        Some(&list_id),
        f64::from(level),
        counter,
        ctx.counters.as_deref().map(|c| c as &dyn ListCounterContext),
    );

    let hint = node.list_rendering.as_ref();
    let (marker_text, format, justification, suffix) = match &def {
        Some(d) => (
            format_marker(&ctx.styles.numbering, &list_id, d, &path),
            d.format.clone(),
            d.justification.clone(),
            d.suffix.clone(),
        ),
        None => (
            hint.and_then(|h| h.marker_text.clone())
                .unwrap_or_else(|| format!("{}.", format_number(counter, "decimal"))),
            hint.and_then(|h| h.num_fmt.clone()),
            hint.and_then(|h| h.justification.clone()),
            hint.and_then(|h| h.suffix.clone()),
        ),
    };
    let level_indent = def.as_ref().and_then(|d| d.paragraph.indent.clone());

    Some(ResolvedNumbering {
        props: NumberingProperties {
            list_id,
            level,
            counter,
            path,
            format,
            marker_text,
            justification,
            suffix,
            indent: level_indent
                .clone()
                .map(|i| indent_px(&cascade([Some(&i)]).unwrap_or_default())),
            synthetic: false,
        },
        level_indent,
    })
}

/// Increment the item's level and restart every deeper level. Returns the
/// displayed counter value.
fn advance_counter(store: &mut dyn ListCounterContext, list_id: &str, level: u8, start: u32) -> u32 {
    let raw = store.increment(list_id, level);
    for deeper in (level + 1)..MAX_LIST_LEVELS {
        store.reset(list_id, deeper);
    }
    let value = raw.saturating_add(i64::from(start)).saturating_sub(1).max(0);
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn synthesize_numbering(hint: &crate::source::ListRendering) -> ResolvedNumbering {
    let path = if hint.path.is_empty() {
        vec![1]
    } else {
        hint.path.clone()
    };
    let level = u8::try_from(path.len().saturating_sub(1))
        .unwrap_or(u8::MAX)
        .min(MAX_LIST_LEVELS - 1);
    let counter = path.last().copied().unwrap_or(1);
    ResolvedNumbering {
        props: NumberingProperties {
            list_id: SYNTHETIC_LIST_ID.to_string(),
            level,
            counter,
            path,
            format: hint.num_fmt.clone(),
            marker_text: hint.marker_text.clone().unwrap_or_default(),
            justification: hint.justification.clone(),
            suffix: hint.suffix.clone(),
            indent: None,
            synthetic: true,
        },
        level_indent: None,
    }
}

fn resolve_frame(frame: &FrameProps) -> ParagraphFrame {
    ParagraphFrame {
        wrap: frame.wrap.clone(),
        h_anchor: frame.h_anchor.clone(),
        v_anchor: frame.v_anchor.clone(),
        x_align: frame.x_align.clone(),
        y_align: frame.y_align.clone(),
        x: frame.x.map(twips_to_px),
        y: frame.y.map(twips_to_px),
        width: frame.width.map(twips_to_px),
        height: frame.height.map(twips_to_px),
        h_space: frame.h_space.map(twips_to_px),
        v_space: frame.v_space.map(twips_to_px),
    }
}

fn resolve_drop_cap(
    node: &ParagraphNode,
    frame: &FrameProps,
    ctx: &mut ResolveContext,
    style: Option<&ResolvedStyle>,
    table_style: Option<&ResolvedStyle>,
) -> Option<DropCap> {
    let mode = match frame.drop_cap.as_deref()? {
        "drop" => DropCapMode::Drop,
        "margin" => DropCapMode::Margin,
        _ => return None,
    };
    let Some((text, props)) = first_text_run(node, ctx, style, table_style) else {
        log::debug!("Drop cap without a text run, omitting");
        return None;
    };
    Some(DropCap {
        mode,
        lines: frame.lines.filter(|l| *l > 0).unwrap_or(3),
        wrap: frame.wrap.clone(),
        run: DropCapRun {
            text: text.to_string(),
            font_family: props.font_family.clone(),
            font_size: font_size_px(&props),
            bold: props.bold.unwrap_or(false),
            italic: props.italic.unwrap_or(false),
            color: props.color.as_deref().and_then(normalize_color),
        },
    })
}

pub fn indent_px(indent: &Indent) -> ResolvedIndent {
    ResolvedIndent {
        left: indent.left.map(twips_to_px),
        right: indent.right.map(twips_to_px),
        first_line: indent.first_line.map(twips_to_px),
        hanging: indent.hanging.map(twips_to_px),
    }
}

pub fn spacing_px(spacing: &Spacing) -> ResolvedSpacing {
    // A line value with no rule is proportional, as in Word.
    let line_rule = spacing
        .line_rule
        .or_else(|| spacing.line.map(|_| LineRule::Auto));
    let line = spacing.line.map(|l| match line_rule {
        Some(LineRule::Auto) | None => l / LINE_UNITS,
        Some(_) => twips_to_px(l),
    });
    ResolvedSpacing {
        before: spacing.before.map(twips_to_px),
        after: spacing.after.map(twips_to_px),
        line,
        line_rule,
        before_autospacing: spacing.before_autospacing,
        after_autospacing: spacing.after_autospacing,
    }
}

pub fn tab_stops_px(tabs: TabStops) -> Vec<TabStop> {
    tabs.0
        .into_iter()
        .filter_map(|t| {
            Some(TabStop {
                position: twips_to_px(t.normalized_position()?),
                alignment: t.kind,
                leader: t.leader,
            })
        })
        .collect()
}

fn paragraph_borders(set: &BorderSet) -> Option<ParagraphBorders> {
    let resolve = |b: &Option<crate::source::BorderDef>| b.as_ref().and_then(resolve_border);
    let borders = ParagraphBorders {
        top: resolve(&set.top),
        bottom: resolve(&set.bottom),
        left: resolve(&set.left),
        right: resolve(&set.right),
        between: resolve(&set.between),
        bar: resolve(&set.bar),
    };
    (borders != ParagraphBorders::default()).then_some(borders)
}

pub fn resolve_shading(shading: &Shading) -> Option<ResolvedShading> {
    let resolved = ResolvedShading {
        fill: shading.fill.as_deref().and_then(normalize_color),
        color: shading.color.as_deref().and_then(normalize_color),
        pattern: shading.pattern.clone().filter(|p| p != "nil" && p != "clear"),
    };
    (resolved != ResolvedShading::default()).then_some(resolved)
}
