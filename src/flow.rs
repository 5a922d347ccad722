//! Block assembly: walk the source tree in document order and emit flow
//! blocks.

use crate::model::{
    CellContent, FlowBlock, FlowDocument, ParagraphBlock, Section, SectionBreakBlock,
    StructuredContentInfo, TableBlock, TableCell, TableRow,
};
use crate::options::ConvertOptions;
use crate::resolve::drawing::build_drawing;
use crate::resolve::numbering::ListCounterContext;
use crate::resolve::paragraph::{paragraph_style, resolve_with_style};
use crate::resolve::run::resolve_runs;
use crate::resolve::section::{classify_boundary, default_section, extract_section_with};
use crate::resolve::table::{
    CellEdges, cell_background, cell_borders, cell_padding, cell_v_align, cell_width,
    max_block_id, place_cells, propagate_vertical_merges_with_ids, resolve_column_widths,
    row_height, width_px,
};
use crate::resolve::{ResolveContext, ResolvedStyle};
use crate::source::{
    CellNode, ParagraphNode, RunContent, SectionProps, SourceAttributes, SourceDocument,
    SourceNode, StyleKind, TableNode,
};
use crate::units::twips_to_px;

/// Convert `doc` with a fresh resolution context. `counters` carries list
/// numbering across calls when the caller wants it to.
pub fn convert<'a>(
    doc: &'a SourceDocument,
    options: &'a ConvertOptions,
    counters: Option<&'a mut dyn ListCounterContext>,
) -> FlowDocument {
    let mut ctx = ResolveContext::new(&doc.styles, counters, options);
    assemble(doc, &mut ctx)
}

/// Walk `doc` with an existing context.
pub fn assemble(doc: &SourceDocument, ctx: &mut ResolveContext) -> FlowDocument {
    let mut sections: Vec<(Section, SourceAttributes)> = Vec::new();
    collect_sections(&doc.body, &mut |props| {
        sections.push((
            extract_section_with(props, ctx.options.default_page),
            props.source_attrs.clone(),
        ));
    });
    if let Some(last) = &doc.final_section {
        sections.push((
            extract_section_with(last, ctx.options.default_page),
            last.source_attrs.clone(),
        ));
    }
    if sections.is_empty() {
        log::debug!("No section properties, using default page geometry");
        sections.push((default_section(ctx.options.default_page), SourceAttributes::new()));
    }

    let mut assembler = Assembler {
        ctx,
        sections: &sections,
        current: 0,
    };
    let mut blocks = Vec::new();
    assembler.open_section(0, &mut blocks);
    assembler.walk(&doc.body, None, None, true, &mut blocks);

    FlowDocument {
        blocks,
        sections: sections.into_iter().map(|(s, _)| s).collect(),
    }
}

/// Section properties in document order. Sections end at body-level
/// paragraphs, including those wrapped in structured content.
fn collect_sections(nodes: &[SourceNode], found: &mut impl FnMut(&SectionProps)) {
    for node in nodes {
        match node {
            SourceNode::Paragraph(p) => {
                if let Some(section) = &p.section {
                    found(section);
                }
            }
            SourceNode::StructuredContent(sdt) => collect_sections(&sdt.children, found),
            SourceNode::Table(_) => {}
        }
    }
}

struct Assembler<'r, 'a, 's> {
    ctx: &'r mut ResolveContext<'a>,
    sections: &'s [(Section, SourceAttributes)],
    current: usize,
}

impl Assembler<'_, '_, '_> {
    fn open_section(&mut self, index: usize, out: &mut Vec<FlowBlock>) {
        let Some((section, attrs)) = self.sections.get(index) else {
            return;
        };
        let prev = index
            .checked_sub(1)
            .and_then(|i| self.sections.get(i))
            .map(|(s, _)| s);
        out.push(FlowBlock::SectionBreak(SectionBreakBlock {
            id: self.ctx.next_block_id(),
            section_index: index,
            section: section.clone(),
            boundary: classify_boundary(prev, section),
            source_attrs: self.ctx.source_attrs(attrs),
        }));
        self.current = index;
    }

    fn walk(
        &mut self,
        nodes: &[SourceNode],
        table_style: Option<&ResolvedStyle>,
        sdt: Option<&StructuredContentInfo>,
        body: bool,
        out: &mut Vec<FlowBlock>,
    ) {
        for node in nodes {
            match node {
                SourceNode::Paragraph(p) => {
                    self.paragraph(p, table_style, sdt, out);
                    if body && p.section.is_some() {
                        self.open_section(self.current + 1, out);
                    }
                }
                SourceNode::Table(t) => {
                    if let Some(table) = self.table(t, sdt) {
                        out.push(FlowBlock::Table(table));
                    }
                }
                SourceNode::StructuredContent(content) => {
                    let info = self.ctx.structured_content(&content.meta);
                    self.walk(&content.children, table_style, Some(&info), body, out);
                }
            }
        }
    }

    /// The paragraph, then any drawings its runs carry.
    fn paragraph(
        &mut self,
        node: &ParagraphNode,
        table_style: Option<&ResolvedStyle>,
        sdt: Option<&StructuredContentInfo>,
        out: &mut Vec<FlowBlock>,
    ) {
        let mut block = paragraph_block(node, self.ctx, table_style);
        block.sdt = sdt.cloned();
        out.push(FlowBlock::Paragraph(block));

        let drawings = node
            .runs
            .iter()
            .flat_map(|r| &r.content)
            .filter_map(|c| match c {
                RunContent::Drawing(d) => Some(d),
                _ => None,
            });
        for drawing in drawings {
            if let Some(mut block) = build_drawing(drawing, self.ctx) {
                block.common_mut().sdt = sdt.cloned();
                out.push(FlowBlock::Drawing(block));
            }
        }
    }

    fn table(&mut self, node: &TableNode, sdt: Option<&StructuredContentInfo>) -> Option<TableBlock> {
        if node.rows.is_empty() {
            log::debug!("Dropping table with no rows");
            return None;
        }
        let id = self.ctx.next_block_id();
        let style_id = node.props.style_id.clone().or_else(|| {
            self.ctx
                .styles
                .default_style(StyleKind::Table)
                .map(|s| s.id.clone())
        });
        let style = style_id.as_deref().and_then(|s| self.ctx.resolved_style(s));

        let placements = place_cells(&node.rows);
        let column_widths = resolve_column_widths(node);
        let grid_cols = placements
            .iter()
            .flat_map(|row| row.iter().map(|p| p.col_start + p.col_span as usize))
            .max()
            .unwrap_or(0)
            .max(column_widths.as_ref().map_or(0, Vec::len));
        let row_count = node.rows.len();

        let mut rows = Vec::with_capacity(row_count);
        for (ri, (row, placed)) in node.rows.iter().zip(&placements).enumerate() {
            let mut cells = Vec::new();
            for (cell, place) in row.cells.iter().zip(placed) {
                if place.covered {
                    continue;
                }
                let Some(content) = self.cell_content(cell, style.as_deref()) else {
                    log::debug!("Dropping empty cell in row {ri}");
                    continue;
                };
                let edges = CellEdges {
                    first_row: ri == 0,
                    last_row: ri + place.row_span as usize >= row_count,
                    first_col: place.col_start == 0,
                    last_col: place.col_start + place.col_span as usize >= grid_cols,
                };
                cells.push(TableCell {
                    content,
                    col_span: place.col_span,
                    row_span: place.row_span,
                    continue_merge: false,
                    borders: cell_borders(
                        &cell.props,
                        node.props.borders.as_ref(),
                        style.as_deref(),
                        edges,
                    ),
                    padding: cell_padding(
                        cell.props.margins.as_ref(),
                        node.props.cell_margins.as_ref(),
                        style.as_deref(),
                    ),
                    vertical_align: cell_v_align(cell.props.v_align.as_deref()),
                    background: cell_background(cell.props.shading.as_ref()),
                    width: cell_width(&cell.props),
                    no_wrap: cell.props.no_wrap.unwrap_or(false),
                    source_attrs: self.ctx.source_attrs(&cell.source_attrs),
                });
            }
            rows.push(TableRow {
                cells,
                height: row_height(&row.props),
                header: row.props.header.unwrap_or(false),
                cant_split: row.props.cant_split.unwrap_or(false),
                grid_before: row.props.grid_before.unwrap_or(0),
                source_attrs: self.ctx.source_attrs(&row.source_attrs),
            });
        }

        if rows.iter().all(|r| r.cells.is_empty()) {
            log::debug!("Dropping table without content rows");
            return None;
        }

        Some(TableBlock {
            id,
            style_id: style.as_ref().map(|s| s.id.clone()).or(style_id),
            column_widths,
            rows,
            width: width_px(node.props.width.as_ref()),
            indent: node
                .props
                .indent
                .filter(|i| i.is_finite())
                .map(twips_to_px),
            justification: node.props.justification.clone(),
            layout: node.props.layout.clone(),
            sdt: sdt.cloned(),
            source_attrs: self.ctx.source_attrs(&node.source_attrs),
            position: self.ctx.position(node.span),
        })
    }

    /// A lone paragraph stays a paragraph; anything else is a block list.
    fn cell_content(&mut self, cell: &CellNode, style: Option<&ResolvedStyle>) -> Option<CellContent> {
        let mut blocks = Vec::new();
        self.walk(&cell.content, style, None, false, &mut blocks);
        match blocks.len() {
            0 => None,
            1 => match blocks.pop() {
                Some(FlowBlock::Paragraph(p)) => Some(CellContent::Paragraph(Box::new(p))),
                Some(other) => Some(CellContent::Blocks(vec![other])),
                None => None,
            },
            _ => Some(CellContent::Blocks(blocks)),
        }
    }
}

/// Resolve one paragraph with its runs.
pub(crate) fn paragraph_block(
    node: &ParagraphNode,
    ctx: &mut ResolveContext,
    table_style: Option<&ResolvedStyle>,
) -> ParagraphBlock {
    let id = ctx.next_block_id();
    let style = paragraph_style(node, ctx);
    let attrs = resolve_with_style(node, ctx, style.as_deref(), table_style);
    let runs = resolve_runs(node, ctx, style.as_deref(), table_style);
    ParagraphBlock {
        id,
        attrs,
        runs,
        sdt: None,
        source_attrs: ctx.source_attrs(&node.source_attrs),
        position: ctx.position(node.span),
    }
}

impl FlowDocument {
    /// Structural pass run before handing blocks to an exporter: every
    /// vertically merged cell gets its continuation placeholders back,
    /// nested tables included.
    pub fn prepare_for_export(&mut self) {
        let mut next_id = max_block_id(&self.blocks) + 1;
        for block in &mut self.blocks {
            prepare_block(block, &mut next_id);
        }
    }
}

fn prepare_block(block: &mut FlowBlock, next_id: &mut usize) {
    let FlowBlock::Table(table) = block else {
        return;
    };
    for cell in table.rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
        if let CellContent::Blocks(blocks) = &mut cell.content {
            for nested in blocks {
                prepare_block(nested, next_id);
            }
        }
    }
    propagate_vertical_merges_with_ids(table, next_id);
}
