//! Input side: the document tree as handed over by a reader, with every
//! formatting value still in its WordprocessingML unit (twips, EMU,
//! half-points, eighth-points). Nothing here is resolved.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Raw attributes of the consumed element, kept for round-tripping.
pub type SourceAttributes = BTreeMap<String, String>;

/// Byte range of the XML node a block was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LineRule {
    Auto,
    Exact,
    AtLeast,
}

impl LineRule {
    pub fn parse(val: &str) -> Option<Self> {
        match val {
            "auto" => Some(Self::Auto),
            "exact" => Some(Self::Exact),
            "atLeast" => Some(Self::AtLeast),
            _ => None,
        }
    }
}

/// `w:spacing`. `line` is in 240ths of a line for [`LineRule::Auto`],
/// twips otherwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spacing {
    pub before: Option<f32>,
    pub after: Option<f32>,
    pub line: Option<f32>,
    pub line_rule: Option<LineRule>,
    pub before_autospacing: Option<bool>,
    pub after_autospacing: Option<bool>,
    /// Contextual-spacing flag carried on the spacing object itself.
    pub contextual: Option<bool>,
}

/// `w:ind`, twips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Indent {
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub first_line: Option<f32>,
    pub hanging: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TabKind {
    Left,
    Center,
    Right,
    Decimal,
    Bar,
    Num,
    Clear,
}

impl TabKind {
    pub fn parse(val: &str) -> Self {
        match val {
            "center" => Self::Center,
            "right" | "end" => Self::Right,
            "decimal" => Self::Decimal,
            "bar" => Self::Bar,
            "num" => Self::Num,
            "clear" => Self::Clear,
            _ => Self::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TabLeader {
    Dot,
    Hyphen,
    Underscore,
    Heavy,
    MiddleDot,
}

impl TabLeader {
    pub fn parse(val: &str) -> Option<Self> {
        match val {
            "dot" => Some(Self::Dot),
            "hyphen" => Some(Self::Hyphen),
            "underscore" => Some(Self::Underscore),
            "heavy" => Some(Self::Heavy),
            "middleDot" => Some(Self::MiddleDot),
            _ => None,
        }
    }
}

/// One `w:tab`. Editors may carry the position under several names; see
/// [`TabStopDef::normalized_position`].
#[derive(Clone, Debug, PartialEq)]
pub struct TabStopDef {
    pub kind: TabKind,
    pub leader: Option<TabLeader>,
    pub pos: Option<f32>,
    pub original_pos: Option<f32>,
    pub offset: Option<f32>,
}

impl TabStopDef {
    pub fn new(kind: TabKind, pos: f32) -> Self {
        Self {
            kind,
            leader: None,
            pos: Some(pos),
            original_pos: None,
            offset: None,
        }
    }

    pub fn normalized_position(&self) -> Option<f32> {
        self.original_pos
            .or(self.pos)
            .or(self.offset)
            .filter(|p| p.is_finite())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabStops(pub Vec<TabStopDef>);

/// One border edge. `size` in eighths of a point, `space` in points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BorderDef {
    pub style: String,
    pub size: Option<f32>,
    pub space: Option<f32>,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BorderSet {
    pub top: Option<BorderDef>,
    pub bottom: Option<BorderDef>,
    pub left: Option<BorderDef>,
    pub right: Option<BorderDef>,
    pub between: Option<BorderDef>,
    pub bar: Option<BorderDef>,
    pub inside_h: Option<BorderDef>,
    pub inside_v: Option<BorderDef>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Shading {
    pub fill: Option<String>,
    pub color: Option<String>,
    pub pattern: Option<String>,
}

/// A numbering id as it arrives: readers produce text, editors sometimes
/// hand over plain numbers.
#[derive(Clone, Debug, PartialEq)]
pub enum NumId {
    Number(f64),
    Text(String),
}

impl NumId {
    /// Canonical string form. Integral numbers print without a fraction
    /// (so `-0.0` becomes `"0"`); NaN, infinities and empty strings have
    /// no form at all.
    pub fn normalized(&self) -> Option<String> {
        match self {
            NumId::Number(n) if !n.is_finite() => None,
            NumId::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            NumId::Number(n) => Some(n.to_string()),
            NumId::Text(s) if s.is_empty() => None,
            NumId::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for NumId {
    fn from(s: &str) -> Self {
        NumId::Text(s.to_string())
    }
}

impl From<i64> for NumId {
    fn from(n: i64) -> Self {
        NumId::Number(n as f64)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumberingRef {
    pub num_id: Option<NumId>,
    pub level: Option<f64>,
}

/// Precomputed list marker data some editors attach to list paragraphs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListRendering {
    pub marker_text: Option<String>,
    pub justification: Option<String>,
    pub num_fmt: Option<String>,
    pub suffix: Option<String>,
    pub path: Vec<u32>,
}

/// `w:framePr`. Enum values stay raw; positions in twips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameProps {
    pub drop_cap: Option<String>,
    pub lines: Option<u32>,
    pub wrap: Option<String>,
    pub h_anchor: Option<String>,
    pub v_anchor: Option<String>,
    pub x_align: Option<String>,
    pub y_align: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub h_space: Option<f32>,
    pub v_space: Option<f32>,
}

/// Paragraph property bag (`w:pPr` or direct node attributes).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphProps {
    pub style_id: Option<String>,
    pub justification: Option<String>,
    pub spacing: Option<Spacing>,
    pub indent: Option<Indent>,
    pub tabs: Option<TabStops>,
    pub borders: Option<BorderSet>,
    pub shading: Option<Shading>,
    pub numbering: Option<NumberingRef>,
    pub contextual_spacing: Option<bool>,
    pub keep_next: Option<bool>,
    pub keep_lines: Option<bool>,
    pub page_break_before: Option<bool>,
    pub widow_control: Option<bool>,
    pub bidi: Option<bool>,
    pub adjust_right_ind: Option<bool>,
    pub outline_level: Option<u8>,
    pub text_direction: Option<String>,
    pub frame: Option<FrameProps>,
}

/// Run property bag (`w:rPr`). `size` in half-points, `letter_spacing` in
/// twips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunProps {
    pub style_id: Option<String>,
    pub font_family: Option<String>,
    pub size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<String>,
    pub strike: Option<bool>,
    pub double_strike: Option<bool>,
    pub caps: Option<bool>,
    pub small_caps: Option<bool>,
    pub vanish: Option<bool>,
    pub color: Option<String>,
    pub highlight: Option<String>,
    pub vert_align: Option<String>,
    pub letter_spacing: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BreakKind {
    Line,
    Page,
    Column,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RunContent {
    Text(String),
    Tab,
    Break(BreakKind),
    Drawing(Box<DrawingNode>),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunNode {
    pub props: RunProps,
    pub content: Vec<RunContent>,
    pub hyperlink: Option<String>,
    pub span: Option<SourceSpan>,
}

impl RunNode {
    pub fn text(text: &str) -> Self {
        Self {
            content: vec![RunContent::Text(text.to_string())],
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphNode {
    /// Attributes set directly on the node by an editor; highest precedence.
    pub direct: ParagraphProps,
    /// `w:pPr`.
    pub inline: ParagraphProps,
    pub list_rendering: Option<ListRendering>,
    /// `w:sectPr` inside `w:pPr`: this paragraph ends a section.
    pub section: Option<SectionProps>,
    pub runs: Vec<RunNode>,
    pub source_attrs: SourceAttributes,
    pub span: Option<SourceSpan>,
}

impl ParagraphNode {
    pub fn with_text(text: &str) -> Self {
        Self {
            runs: vec![RunNode::text(text)],
            ..Default::default()
        }
    }
}

/// `w:sdtPr` fields that identify a structured content block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StructuredContentMeta {
    pub id: Option<String>,
    pub tag: Option<String>,
    pub alias: Option<String>,
    pub kind: Option<String>,
    pub lock: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructuredContentNode {
    pub meta: StructuredContentMeta,
    pub children: Vec<SourceNode>,
    pub span: Option<SourceSpan>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidthKind {
    Dxa,
    Pct,
    Auto,
    Nil,
}

impl WidthKind {
    pub fn parse(val: &str) -> Self {
        match val {
            "pct" => Self::Pct,
            "auto" => Self::Auto,
            "nil" => Self::Nil,
            _ => Self::Dxa,
        }
    }
}

/// `w:tblW`/`w:tcW`. `value` in twips for dxa, fiftieths of a percent for pct.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableWidth {
    pub value: f32,
    pub kind: WidthKind,
}

/// Cell margins in twips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellMargins {
    pub top: Option<f32>,
    pub left: Option<f32>,
    pub bottom: Option<f32>,
    pub right: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableProps {
    pub style_id: Option<String>,
    pub width: Option<TableWidth>,
    pub indent: Option<f32>,
    pub justification: Option<String>,
    pub layout: Option<String>,
    pub cell_margins: Option<CellMargins>,
    pub borders: Option<BorderSet>,
    /// Set by editors once the user has dragged column boundaries.
    pub user_edited: bool,
    /// Editor-maintained column grid in pixels.
    pub column_grid: Option<Vec<f32>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowProps {
    /// Twips.
    pub height: Option<f32>,
    pub height_rule: Option<String>,
    pub cant_split: Option<bool>,
    pub header: Option<bool>,
    pub grid_before: Option<u32>,
    pub grid_after: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VMerge {
    Restart,
    Continue,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellProps {
    pub width: Option<TableWidth>,
    /// Editor column widths in pixels, one per covered column.
    pub col_width_hints: Option<Vec<f32>>,
    pub grid_span: Option<u32>,
    pub row_span: Option<u32>,
    pub v_merge: Option<VMerge>,
    pub v_align: Option<String>,
    pub borders: Option<BorderSet>,
    pub margins: Option<CellMargins>,
    pub shading: Option<Shading>,
    pub no_wrap: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellNode {
    pub props: CellProps,
    pub content: Vec<SourceNode>,
    pub source_attrs: SourceAttributes,
    pub span: Option<SourceSpan>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowNode {
    pub props: RowProps,
    pub cells: Vec<CellNode>,
    pub source_attrs: SourceAttributes,
    pub span: Option<SourceSpan>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableNode {
    pub props: TableProps,
    /// `w:tblGrid` column widths in twips, unvalidated.
    pub grid: Vec<f32>,
    pub rows: Vec<RowNode>,
    pub source_attrs: SourceAttributes,
    pub span: Option<SourceSpan>,
}

/// Page margins in twips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageMargins {
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
    pub header: Option<f32>,
    pub footer: Option<f32>,
    pub gutter: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnsProps {
    pub count: Option<u32>,
    /// Twips.
    pub space: Option<f32>,
    pub equal_width: Option<bool>,
    pub separator: Option<bool>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderFooterRef {
    pub kind: String,
    pub id: String,
}

/// `w:sectPr`, lengths in twips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectionProps {
    pub kind: Option<String>,
    pub page_width: Option<f32>,
    pub page_height: Option<f32>,
    pub orientation: Option<String>,
    pub margins: PageMargins,
    pub columns: Option<ColumnsProps>,
    pub header_refs: Vec<HeaderFooterRef>,
    pub footer_refs: Vec<HeaderFooterRef>,
    pub page_number_format: Option<String>,
    pub page_number_start: Option<u32>,
    pub v_align: Option<String>,
    pub title_page: Option<bool>,
    pub source_attrs: SourceAttributes,
}

/// `wp:extent`, EMU.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extent {
    pub cx: Option<f32>,
    pub cy: Option<f32>,
}

/// `wp:effectExtent`, EMU.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EffectExtent {
    pub left: Option<f32>,
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
}

/// `a:xfrm` rotation (60000ths of a degree) and flips.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub rotation: Option<f32>,
    pub flip_h: Option<bool>,
    pub flip_v: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnchorProps {
    pub h_relative_from: Option<String>,
    pub v_relative_from: Option<String>,
    pub h_align: Option<String>,
    pub v_align: Option<String>,
    /// EMU.
    pub h_offset: Option<f32>,
    pub v_offset: Option<f32>,
    pub behind_doc: Option<bool>,
    pub relative_height: Option<i64>,
    pub allow_overlap: Option<bool>,
    pub layout_in_cell: Option<bool>,
}

/// Text wrapping around an anchored drawing. Distances in EMU, polygon
/// coordinates unparsed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WrapProps {
    pub kind: Option<String>,
    pub text: Option<String>,
    pub dist_top: Option<f32>,
    pub dist_bottom: Option<f32>,
    pub dist_left: Option<f32>,
    pub dist_right: Option<f32>,
    pub polygon: Vec<(String, String)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocProperties {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageSource {
    pub rel_id: Option<String>,
    pub target: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeSource {
    pub preset: Option<String>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    /// EMU.
    pub stroke_width: Option<f32>,
    /// Text box content (`w:txbxContent`).
    pub text: Vec<SourceNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GroupChildKind {
    Shape(ShapeSource),
    Image(ImageSource),
}

/// A member of a shape group, positioned in the group's child coordinate
/// space (EMU).
#[derive(Clone, Debug, PartialEq)]
pub struct GroupChild {
    pub kind: GroupChildKind,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub extent: Extent,
    pub transform: Transform,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawingKind {
    Image(ImageSource),
    Shape(ShapeSource),
    Group(Vec<GroupChild>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DrawingNode {
    pub kind: DrawingKind,
    pub extent: Extent,
    pub effect_extent: Option<EffectExtent>,
    pub transform: Transform,
    /// `None` for inline drawings.
    pub anchor: Option<AnchorProps>,
    pub wrap: Option<WrapProps>,
    pub z_index: Option<i64>,
    pub doc_pr: DocProperties,
    pub source_attrs: SourceAttributes,
    pub span: Option<SourceSpan>,
}

impl DrawingNode {
    pub fn new(kind: DrawingKind) -> Self {
        Self {
            kind,
            extent: Extent::default(),
            effect_extent: None,
            transform: Transform::default(),
            anchor: None,
            wrap: None,
            z_index: None,
            doc_pr: DocProperties::default(),
            source_attrs: SourceAttributes::new(),
            span: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SourceNode {
    Paragraph(ParagraphNode),
    Table(TableNode),
    StructuredContent(StructuredContentNode),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleKind {
    Paragraph,
    Character,
    Table,
    Numbering,
}

/// Table-style specific formatting. Its paragraph properties live in the
/// owning [`StyleDef::paragraph`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableStyleProps {
    pub borders: Option<BorderSet>,
    pub cell_margins: Option<CellMargins>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyleDef {
    pub id: String,
    pub name: Option<String>,
    pub kind: StyleKind,
    pub based_on: Option<String>,
    pub is_default: bool,
    pub paragraph: ParagraphProps,
    pub run: RunProps,
    pub table: Option<TableStyleProps>,
}

impl StyleDef {
    pub fn new(id: &str, kind: StyleKind) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            kind,
            based_on: None,
            is_default: false,
            paragraph: ParagraphProps::default(),
            run: RunProps::default(),
            table: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocDefaults {
    pub paragraph: ParagraphProps,
    pub run: RunProps,
}

/// One `w:lvl`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelDefinition {
    pub format: Option<String>,
    pub start: Option<u32>,
    pub text: Option<String>,
    pub justification: Option<String>,
    pub suffix: Option<String>,
    pub paragraph: ParagraphProps,
    pub run: RunProps,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbstractNumbering {
    pub levels: BTreeMap<u8, LevelDefinition>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelOverride {
    pub start: Option<u32>,
    pub level: Option<LevelDefinition>,
}

/// One `w:num`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumberingInstance {
    pub abstract_id: String,
    pub overrides: BTreeMap<u8, LevelOverride>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumberingDefinitions {
    pub abstracts: HashMap<String, AbstractNumbering>,
    pub instances: HashMap<String, NumberingInstance>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleSheet {
    pub defaults: DocDefaults,
    pub styles: HashMap<String, StyleDef>,
    pub numbering: NumberingDefinitions,
}

impl StyleSheet {
    pub fn insert(&mut self, style: StyleDef) {
        self.styles.insert(style.id.clone(), style);
    }

    pub fn get(&self, id: &str) -> Option<&StyleDef> {
        self.styles.get(id)
    }

    /// The style flagged `w:default="1"` for a kind.
    pub fn default_style(&self, kind: StyleKind) -> Option<&StyleDef> {
        self.styles
            .values()
            .find(|s| s.kind == kind && s.is_default)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceDocument {
    pub body: Vec<SourceNode>,
    /// Body-level `w:sectPr`: the last section.
    pub final_section: Option<SectionProps>,
    pub styles: StyleSheet,
}
