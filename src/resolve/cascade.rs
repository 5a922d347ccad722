//! Priority-ordered merging of partial property bags.
//!
//! Sources are folded lowest precedence first. For each field the highest
//! source that defines it wins; undefined fields fall through. A handful of
//! WordprocessingML rules ride on top of that:
//!
//! - `left`/`right` indents of exactly zero are dropped after the fold, while
//!   a zero `first_line`/`hanging` is a real override and survives.
//! - `first_line` and `hanging` exclude each other: whichever a source sets
//!   clears the other one accumulated from below.
//! - tab stops merge by position; see [`TabStops`].

use crate::source::{
    BorderSet, FrameProps, Indent, NumberingRef, ParagraphProps, RunProps, Shading, Spacing,
    TabKind, TabStopDef, TabStops,
};

/// Where a paragraph property source sits in the cascade, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceRank {
    DocDefaults,
    TableStyle,
    Style,
    Numbering,
    Inline,
    Direct,
}

pub trait Cascade: Default {
    fn is_empty(&self) -> bool;

    /// Lay `higher` over `self`.
    fn overlay(&mut self, higher: &Self);

    /// Post-fold cleanup; runs once on the merged value.
    fn finish(self) -> Self {
        self
    }
}

/// Fold `sources` (lowest precedence first). `None` and empty sources are
/// skipped; the result is `None` if nothing contributed.
pub fn cascade<'a, T, I>(sources: I) -> Option<T>
where
    T: Cascade + 'a,
    I: IntoIterator<Item = Option<&'a T>>,
{
    let mut merged: Option<T> = None;
    for source in sources.into_iter().flatten() {
        if source.is_empty() {
            continue;
        }
        merged.get_or_insert_with(T::default).overlay(source);
    }
    merged.map(T::finish).filter(|m| !m.is_empty())
}

/// Same as [`cascade`] over ranked sources; ranks are sorted before folding
/// so callers can hand them over in any order.
pub fn cascade_ranked<'a, T>(sources: &mut [(SourceRank, Option<&'a T>)]) -> Option<T>
where
    T: Cascade + 'a,
{
    sources.sort_by_key(|(rank, _)| *rank);
    cascade(sources.iter().map(|(_, s)| *s))
}

macro_rules! take_some {
    ($dst:ident, $src:ident, $($field:ident),+ $(,)?) => {
        $(
            if $src.$field.is_some() {
                $dst.$field = $src.$field.clone();
            }
        )+
    };
}

impl Cascade for Spacing {
    fn is_empty(&self) -> bool {
        *self == Spacing::default()
    }

    fn overlay(&mut self, higher: &Self) {
        take_some!(
            self,
            higher,
            before,
            after,
            line,
            line_rule,
            before_autospacing,
            after_autospacing,
            contextual,
        );
    }
}

impl Cascade for Indent {
    fn is_empty(&self) -> bool {
        *self == Indent::default()
    }

    fn overlay(&mut self, higher: &Self) {
        take_some!(self, higher, left, right);
        // Within one source hanging beats firstLine.
        if higher.hanging.is_some() {
            self.hanging = higher.hanging;
            self.first_line = None;
        } else if higher.first_line.is_some() {
            self.first_line = higher.first_line;
            self.hanging = None;
        }
    }

    fn finish(mut self) -> Self {
        if self.left == Some(0.0) {
            self.left = None;
        }
        if self.right == Some(0.0) {
            self.right = None;
        }
        self
    }
}

impl Cascade for TabStops {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries are keyed by [`TabStopDef::normalized_position`]. A higher
    /// entry replaces the one at the same position, a `clear` entry removes
    /// it, and entries without a usable position are ignored.
    fn overlay(&mut self, higher: &Self) {
        for stop in &higher.0 {
            let Some(pos) = stop.normalized_position() else {
                continue;
            };
            let existing = self
                .0
                .iter()
                .position(|s| s.normalized_position() == Some(pos));
            match (existing, stop.kind) {
                (Some(i), TabKind::Clear) => {
                    self.0.remove(i);
                }
                (Some(i), _) => self.0[i] = stop.clone(),
                (None, TabKind::Clear) => {}
                (None, _) => self.0.push(stop.clone()),
            }
        }
    }

    fn finish(mut self) -> Self {
        self.0.retain(|s| s.kind != TabKind::Clear);
        self.0.sort_by(|a, b| {
            let pa = a.normalized_position().unwrap_or(0.0);
            let pb = b.normalized_position().unwrap_or(0.0);
            pa.total_cmp(&pb)
        });
        self
    }
}

impl Cascade for BorderSet {
    fn is_empty(&self) -> bool {
        *self == BorderSet::default()
    }

    fn overlay(&mut self, higher: &Self) {
        take_some!(self, higher, top, bottom, left, right, between, bar, inside_h, inside_v);
    }
}

impl Cascade for Shading {
    fn is_empty(&self) -> bool {
        *self == Shading::default()
    }

    fn overlay(&mut self, higher: &Self) {
        take_some!(self, higher, fill, color, pattern);
    }
}

impl Cascade for NumberingRef {
    fn is_empty(&self) -> bool {
        *self == NumberingRef::default()
    }

    fn overlay(&mut self, higher: &Self) {
        take_some!(self, higher, num_id, level);
    }
}

impl Cascade for FrameProps {
    fn is_empty(&self) -> bool {
        *self == FrameProps::default()
    }

    fn overlay(&mut self, higher: &Self) {
        take_some!(
            self, higher, drop_cap, lines, wrap, h_anchor, v_anchor, x_align, y_align, x, y,
            width, height, h_space, v_space,
        );
    }
}

fn overlay_nested<T: Cascade>(dst: &mut Option<T>, src: &Option<T>) {
    if let Some(s) = src {
        dst.get_or_insert_with(T::default).overlay(s);
    }
}

impl Cascade for ParagraphProps {
    fn is_empty(&self) -> bool {
        *self == ParagraphProps::default()
    }

    /// Scalar fields override; nested objects merge with their own rules.
    /// No `finish` cleanup happens here, so indents keep their zeros until
    /// the paragraph resolver folds the final cascade.
    fn overlay(&mut self, higher: &Self) {
        take_some!(
            self,
            higher,
            style_id,
            justification,
            contextual_spacing,
            keep_next,
            keep_lines,
            page_break_before,
            widow_control,
            bidi,
            adjust_right_ind,
            outline_level,
            text_direction,
        );
        overlay_nested(&mut self.spacing, &higher.spacing);
        overlay_nested(&mut self.indent, &higher.indent);
        overlay_nested(&mut self.tabs, &higher.tabs);
        overlay_nested(&mut self.borders, &higher.borders);
        overlay_nested(&mut self.shading, &higher.shading);
        overlay_nested(&mut self.numbering, &higher.numbering);
        overlay_nested(&mut self.frame, &higher.frame);
    }
}

impl Cascade for RunProps {
    fn is_empty(&self) -> bool {
        *self == RunProps::default()
    }

    fn overlay(&mut self, higher: &Self) {
        take_some!(
            self,
            higher,
            style_id,
            font_family,
            size,
            bold,
            italic,
            underline,
            strike,
            double_strike,
            caps,
            small_caps,
            vanish,
            color,
            highlight,
            vert_align,
            letter_spacing,
        );
    }
}

/// Convenience for tab stop construction in tests and readers.
pub fn tab_stops(stops: impl IntoIterator<Item = TabStopDef>) -> TabStops {
    TabStops(stops.into_iter().collect())
}
