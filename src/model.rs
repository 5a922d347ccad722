//! Output side: flow blocks with every length in pixels.

use serde::Serialize;

use crate::source::{LineRule, SourceAttributes, SourceSpan, TabKind, TabLeader};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSpacing {
    pub before: Option<f32>,
    pub after: Option<f32>,
    /// Multiplier for [`LineRule::Auto`], pixels otherwise.
    pub line: Option<f32>,
    pub line_rule: Option<LineRule>,
    pub before_autospacing: Option<bool>,
    pub after_autospacing: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIndent {
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub first_line: Option<f32>,
    pub hanging: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabStop {
    pub position: f32,
    pub alignment: TabKind,
    pub leader: Option<TabLeader>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    pub style: String,
    pub width: f32,
    pub space: f32,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphBorders {
    pub top: Option<Border>,
    pub bottom: Option<Border>,
    pub left: Option<Border>,
    pub right: Option<Border>,
    pub between: Option<Border>,
    pub bar: Option<Border>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedShading {
    pub fill: Option<String>,
    pub color: Option<String>,
    pub pattern: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberingProperties {
    pub list_id: String,
    pub level: u8,
    pub counter: u32,
    /// One entry per level up to `level`. Parent entries are raw counts
    /// from the counter store; only the last entry includes the level's
    /// start value. `marker_text` shifts parents by their own start.
    pub path: Vec<u32>,
    pub format: Option<String>,
    pub marker_text: String,
    pub justification: Option<String>,
    pub suffix: Option<String>,
    pub indent: Option<ResolvedIndent>,
    /// Built from list rendering hints rather than a numbering definition.
    pub synthetic: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FloatAlignment {
    Left,
    Right,
    Center,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphFrame {
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DropCapMode {
    Drop,
    Margin,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropCapRun {
    pub text: String,
    pub font_family: Option<String>,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropCap {
    pub mode: DropCapMode,
    pub lines: u32,
    pub wrap: Option<String>,
    pub run: DropCapRun,
}

/// The resolved paragraph formatting. Built once by the resolver.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphAttrs {
    pub style_id: Option<String>,
    pub alignment: Alignment,
    pub indent: Option<ResolvedIndent>,
    pub spacing: Option<ResolvedSpacing>,
    pub contextual_spacing: bool,
    pub borders: Option<ParagraphBorders>,
    pub shading: Option<ResolvedShading>,
    pub tab_stops: Vec<TabStop>,
    pub numbering: Option<NumberingProperties>,
    pub rtl: bool,
    pub text_direction: Option<String>,
    pub frame: Option<ParagraphFrame>,
    pub float_alignment: Option<FloatAlignment>,
    pub drop_cap: Option<DropCap>,
    pub keep_next: bool,
    pub keep_lines: bool,
    pub page_break_before: bool,
    pub outline_level: Option<u8>,
    pub is_heading: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunKind {
    Text,
    Tab,
    LineBreak,
    PageBreak,
    ColumnBreak,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VertAlign {
    Baseline,
    Superscript,
    Subscript,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub kind: RunKind,
    pub text: String,
    pub font_family: Option<String>,
    /// Pixels.
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: Option<String>,
    pub strike: bool,
    pub double_strike: bool,
    pub caps: bool,
    pub small_caps: bool,
    pub vanish: bool,
    pub color: Option<String>,
    pub highlight: Option<String>,
    pub vert_align: VertAlign,
    pub letter_spacing: Option<f32>,
    pub hyperlink: Option<String>,
}

/// Identity of the structured content block (`w:sdt`) a block sits in.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContentInfo {
    pub id: Option<String>,
    pub tag: Option<String>,
    pub alias: Option<String>,
    pub kind: String,
    pub locked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphBlock {
    pub id: usize,
    pub attrs: ParagraphAttrs,
    pub runs: Vec<Run>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdt: Option<StructuredContentInfo>,
    pub source_attrs: SourceAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<SourceSpan>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HeightRule {
    Auto,
    AtLeast,
    Exact,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowHeight {
    pub value: f32,
    pub rule: HeightRule,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CellVAlign {
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellBorders {
    pub top: Option<Border>,
    pub bottom: Option<Border>,
    pub left: Option<Border>,
    pub right: Option<Border>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellPadding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for CellPadding {
    fn default() -> Self {
        // Word's 0.08in (108 twips) left/right cell margins.
        Self {
            top: 0.0,
            right: 7.2,
            bottom: 0.0,
            left: 7.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CellContent {
    Paragraph(Box<ParagraphBlock>),
    Blocks(Vec<FlowBlock>),
}

impl CellContent {
    pub fn empty_paragraph(id: usize) -> Self {
        CellContent::Paragraph(Box::new(ParagraphBlock {
            id,
            attrs: ParagraphAttrs::empty(),
            runs: Vec::new(),
            sdt: None,
            source_attrs: SourceAttributes::new(),
            position: None,
        }))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    pub content: CellContent,
    pub col_span: u32,
    pub row_span: u32,
    /// Placeholder for a row covered by a vertical merge above it.
    pub continue_merge: bool,
    pub borders: CellBorders,
    pub padding: CellPadding,
    pub vertical_align: CellVAlign,
    pub background: Option<String>,
    pub width: Option<f32>,
    pub no_wrap: bool,
    pub source_attrs: SourceAttributes,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub height: Option<RowHeight>,
    pub header: bool,
    pub cant_split: bool,
    pub grid_before: u32,
    pub source_attrs: SourceAttributes,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBlock {
    pub id: usize,
    pub style_id: Option<String>,
    /// `None` means the consumer sizes columns from content.
    pub column_widths: Option<Vec<f32>>,
    pub rows: Vec<TableRow>,
    pub width: Option<f32>,
    pub indent: Option<f32>,
    pub justification: Option<String>,
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdt: Option<StructuredContentInfo>,
    pub source_attrs: SourceAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<SourceSpan>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingGeometry {
    pub width: f32,
    pub height: f32,
    /// Degrees.
    pub rotation: f32,
    pub flip_h: bool,
    pub flip_v: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HRelativeFrom {
    Character,
    Column,
    InsideMargin,
    LeftMargin,
    Margin,
    OutsideMargin,
    Page,
    RightMargin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VRelativeFrom {
    BottomMargin,
    InsideMargin,
    Line,
    Margin,
    OutsideMargin,
    Page,
    Paragraph,
    TopMargin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HAlign {
    Left,
    Right,
    Center,
    Inside,
    Outside,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VAlign {
    Top,
    Bottom,
    Center,
    Inside,
    Outside,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingAnchor {
    pub h_relative_from: Option<HRelativeFrom>,
    pub v_relative_from: Option<VRelativeFrom>,
    pub h_align: Option<HAlign>,
    pub v_align: Option<VAlign>,
    pub offset_h: f32,
    pub offset_v: f32,
    pub behind_doc: bool,
    pub allow_overlap: bool,
    pub layout_in_cell: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WrapType {
    None,
    Square,
    Tight,
    Through,
    TopAndBottom,
    Inline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WrapText {
    BothSides,
    Left,
    Right,
    Largest,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrapDistances {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingWrap {
    pub kind: WrapType,
    pub text: Option<WrapText>,
    pub distances: WrapDistances,
    pub polygon: Option<Vec<[f32; 2]>>,
    pub behind_doc: bool,
}

/// Fields shared by every drawing kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingCommon {
    pub id: usize,
    pub geometry: DrawingGeometry,
    pub anchor: Option<DrawingAnchor>,
    pub wrap: Option<DrawingWrap>,
    pub z_index: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdt: Option<StructuredContentInfo>,
    pub source_attrs: SourceAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<SourceSpan>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDrawing {
    #[serde(flatten)]
    pub common: DrawingCommon,
    pub rel_id: Option<String>,
    pub target: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeDrawing {
    #[serde(flatten)]
    pub common: DrawingCommon,
    pub shape_kind: Option<String>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f32>,
    pub text_content: Option<Vec<ParagraphBlock>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupShapeKind {
    Shape,
    Image,
}

/// A group member, positioned relative to the group's top-left corner.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupShape {
    pub kind: GroupShapeKind,
    pub x: f32,
    pub y: f32,
    pub geometry: DrawingGeometry,
    pub shape_kind: Option<String>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub rel_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeGroupDrawing {
    #[serde(flatten)]
    pub common: DrawingCommon,
    pub shapes: Vec<GroupShape>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "drawingKind", rename_all = "camelCase")]
pub enum DrawingBlock {
    Image(ImageDrawing),
    Shape(ShapeDrawing),
    ShapeGroup(ShapeGroupDrawing),
}

impl DrawingBlock {
    pub fn common(&self) -> &DrawingCommon {
        match self {
            DrawingBlock::Image(d) => &d.common,
            DrawingBlock::Shape(d) => &d.common,
            DrawingBlock::ShapeGroup(d) => &d.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut DrawingCommon {
        match self {
            DrawingBlock::Image(d) => &mut d.common,
            DrawingBlock::Shape(d) => &mut d.common,
            DrawingBlock::ShapeGroup(d) => &mut d.common,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionBreakType {
    NextPage,
    Continuous,
    OddPage,
    EvenPage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMargins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
    pub header: f32,
    pub footer: f32,
    pub gutter: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnLayout {
    pub count: u32,
    pub gap: f32,
    pub separator: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFooterRefs {
    pub default: Option<String>,
    pub first: Option<String>,
    pub even: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageNumbering {
    pub format: String,
    pub start: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionVAlign {
    Top,
    Center,
    Bottom,
    Both,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub kind: SectionBreakType,
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub margins: PageMargins,
    pub columns: ColumnLayout,
    pub headers: HeaderFooterRefs,
    pub footers: HeaderFooterRefs,
    pub page_numbering: Option<PageNumbering>,
    pub vertical_align: Option<SectionVAlign>,
    pub title_page: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionBoundary {
    pub forces_page_break: bool,
    /// The break actually applied; `continuous` is upgraded to
    /// `nextPage` when the page geometry changes.
    pub effective_kind: SectionBreakType,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionBreakBlock {
    pub id: usize,
    pub section_index: usize,
    pub section: Section,
    pub boundary: SectionBoundary,
    pub source_attrs: SourceAttributes,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FlowBlock {
    Paragraph(ParagraphBlock),
    Table(TableBlock),
    Drawing(DrawingBlock),
    SectionBreak(SectionBreakBlock),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
    pub blocks: Vec<FlowBlock>,
    pub sections: Vec<Section>,
}

impl FlowDocument {
    pub fn paragraphs(&self) -> impl Iterator<Item = &ParagraphBlock> {
        self.blocks.iter().filter_map(|b| match b {
            FlowBlock::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableBlock> {
        self.blocks.iter().filter_map(|b| match b {
            FlowBlock::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn drawings(&self) -> impl Iterator<Item = &DrawingBlock> {
        self.blocks.iter().filter_map(|b| match b {
            FlowBlock::Drawing(d) => Some(d),
            _ => None,
        })
    }

    pub fn section_breaks(&self) -> impl Iterator<Item = &SectionBreakBlock> {
        self.blocks.iter().filter_map(|b| match b {
            FlowBlock::SectionBreak(s) => Some(s),
            _ => None,
        })
    }
}

impl ParagraphAttrs {
    /// Attributes of a paragraph with nothing set anywhere.
    pub fn empty() -> Self {
        Self {
            style_id: None,
            alignment: Alignment::Left,
            indent: None,
            spacing: None,
            contextual_spacing: false,
            borders: None,
            shading: None,
            tab_stops: Vec::new(),
            numbering: None,
            rtl: false,
            text_direction: None,
            frame: None,
            float_alignment: None,
            drop_cap: None,
            keep_next: false,
            keep_lines: false,
            page_break_before: false,
            outline_level: None,
            is_heading: false,
        }
    }
}
