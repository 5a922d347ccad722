pub mod cascade;
pub mod drawing;
pub mod numbering;
pub mod paragraph;
pub mod run;
pub mod section;
pub mod table;

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::model::{Border, StructuredContentInfo};
use crate::options::ConvertOptions;
use crate::source::{
    BorderDef, ParagraphProps, RunProps, StructuredContentMeta, StyleSheet, TableStyleProps,
};
use crate::units::{eighth_points_to_px, pt_to_px};

use cascade::Cascade;
use numbering::ListCounterContext;

/// A named style with its `basedOn` chain folded in.
#[derive(Clone, Debug, Default)]
pub struct ResolvedStyle {
    pub id: String,
    pub paragraph: ParagraphProps,
    pub run: RunProps,
    pub table: TableStyleProps,
    /// The style's own definition (not an ancestor) sets an indent.
    pub own_indent: bool,
    pub is_heading: bool,
}

/// Memoization for one conversion pass. Cleared between documents by
/// dropping it together with the [`ResolveContext`].
#[derive(Debug, Default)]
pub struct ConversionCache {
    styles: HashMap<String, Option<Rc<ResolvedStyle>>>,
    structured_content: HashMap<u64, StructuredContentInfo>,
}

impl ConversionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.styles.clear();
        self.structured_content.clear();
    }

    pub fn structured_content_entries(&self) -> usize {
        self.structured_content.len()
    }
}

pub struct ResolveContext<'a> {
    pub styles: &'a StyleSheet,
    pub counters: Option<&'a mut dyn ListCounterContext>,
    pub options: &'a ConvertOptions,
    pub cache: ConversionCache,
    next_id: usize,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        styles: &'a StyleSheet,
        counters: Option<&'a mut dyn ListCounterContext>,
        options: &'a ConvertOptions,
    ) -> Self {
        Self {
            styles,
            counters,
            options,
            cache: ConversionCache::new(),
            next_id: 0,
        }
    }

    pub fn next_block_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Look up a style by id with its ancestors folded in.
    pub fn resolved_style(&mut self, id: &str) -> Option<Rc<ResolvedStyle>> {
        if let Some(cached) = self.cache.styles.get(id) {
            return cached.clone();
        }
        let resolved = resolve_style_chain(self.styles, id).map(Rc::new);
        if resolved.is_none() {
            log::debug!("Style '{id}' not found, ignoring");
        }
        self.cache.styles.insert(id.to_string(), resolved.clone());
        resolved
    }

    /// Structured content metadata, memoized by a hash of the raw fields.
    pub fn structured_content(&mut self, meta: &StructuredContentMeta) -> StructuredContentInfo {
        let mut hasher = DefaultHasher::new();
        meta.hash(&mut hasher);
        let key = hasher.finish();
        self.cache
            .structured_content
            .entry(key)
            .or_insert_with(|| StructuredContentInfo {
                id: meta.id.clone(),
                tag: meta.tag.clone(),
                alias: meta.alias.clone(),
                kind: meta.kind.clone().unwrap_or_else(|| "richText".to_string()),
                locked: meta
                    .lock
                    .as_deref()
                    .is_some_and(|l| l != "unlocked"),
            })
            .clone()
    }

    pub fn source_attrs(
        &self,
        attrs: &crate::source::SourceAttributes,
    ) -> crate::source::SourceAttributes {
        if self.options.emit_source_attrs {
            attrs.clone()
        } else {
            crate::source::SourceAttributes::new()
        }
    }

    pub fn position(
        &self,
        span: Option<crate::source::SourceSpan>,
    ) -> Option<crate::source::SourceSpan> {
        span.filter(|_| self.options.include_positions)
    }
}

/// `Heading1`, `heading 2`, `HEADING9`.
pub fn is_heading_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    let Some(rest) = lower.strip_prefix("heading") else {
        return false;
    };
    let digits = rest.trim_start();
    digits.len() == 1 && digits.chars().all(|c| ('1'..='9').contains(&c))
}

fn resolve_style_chain(sheet: &StyleSheet, id: &str) -> Option<ResolvedStyle> {
    let own = sheet.get(id)?;

    let mut chain: Vec<&str> = Vec::new();
    let mut current = Some(id);
    while let Some(cur) = current {
        if chain.contains(&cur) {
            log::debug!("Cyclic basedOn chain at style '{cur}'");
            break;
        }
        let Some(style) = sheet.get(cur) else {
            break;
        };
        chain.push(cur);
        current = style.based_on.as_deref();
    }

    // Furthest ancestor first, each closer one overriding.
    let mut resolved = ResolvedStyle {
        id: id.to_string(),
        own_indent: own.paragraph.indent.is_some(),
        ..Default::default()
    };
    for ancestor in chain.iter().rev().filter_map(|a| sheet.get(a)) {
        resolved.paragraph.overlay(&ancestor.paragraph);
        resolved.run.overlay(&ancestor.run);
        if let Some(table) = &ancestor.table {
            if table.borders.is_some() {
                resolved.table.borders = table.borders.clone();
            }
            if table.cell_margins.is_some() {
                resolved.table.cell_margins = table.cell_margins.clone();
            }
        }
    }
    // The chain's style ids are not meaningful on the merged value.
    resolved.paragraph.style_id = Some(id.to_string());
    resolved.run.style_id = None;

    resolved.is_heading = resolved.paragraph.outline_level.is_some()
        || is_heading_name(id)
        || own.name.as_deref().is_some_and(is_heading_name);
    Some(resolved)
}

/// `#RRGGBB` from a WordprocessingML color value; `auto`, empty and
/// malformed values resolve to `None`.
pub fn normalize_color(val: &str) -> Option<String> {
    let hex = val.trim().trim_start_matches('#');
    if hex.is_empty() || hex.eq_ignore_ascii_case("auto") || hex.eq_ignore_ascii_case("none") {
        return None;
    }
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(format!("#{}", hex.to_ascii_uppercase()));
    }
    None
}

/// Resolve one border edge. `nil`/`none` mean "no border".
pub fn resolve_border(def: &BorderDef) -> Option<Border> {
    if def.style.is_empty() || def.style == "nil" || def.style == "none" {
        return None;
    }
    Some(Border {
        style: def.style.clone(),
        width: eighth_points_to_px(def.size.unwrap_or(4.0)),
        space: pt_to_px(def.space.unwrap_or(0.0)),
        color: def.color.as_deref().and_then(normalize_color),
    })
}
