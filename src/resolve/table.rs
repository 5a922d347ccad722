//! Table structure: column widths, merged cells, row heights and cell
//! decoration.

use crate::model::{
    CellBorders, CellContent, CellPadding, CellVAlign, FlowBlock, HeightRule, RowHeight,
    TableBlock, TableCell,
};
use crate::source::{
    BorderDef, BorderSet, CellMargins, CellProps, RowNode, RowProps, Shading, TableNode,
    TableWidth, VMerge, WidthKind,
};
use crate::units::twips_to_px;

use super::{ResolvedStyle, normalize_color, resolve_border};

fn valid_width(w: &f32) -> bool {
    w.is_finite() && *w > 0.0
}

/// Column widths in pixels, by priority: the editor grid when the user has
/// resized columns, per-cell width hints, the document `w:tblGrid`. `None`
/// leaves sizing to the consumer.
pub fn resolve_column_widths(table: &TableNode) -> Option<Vec<f32>> {
    if table.props.user_edited {
        let edited: Vec<f32> = table
            .props
            .column_grid
            .iter()
            .flatten()
            .copied()
            .filter(valid_width)
            .collect();
        if !edited.is_empty() {
            return Some(edited);
        }
        return document_grid(&table.grid);
    }
    cell_hint_widths(&table.rows).or_else(|| document_grid(&table.grid))
}

fn document_grid(grid: &[f32]) -> Option<Vec<f32>> {
    let widths: Vec<f32> = grid
        .iter()
        .copied()
        .filter(valid_width)
        .map(twips_to_px)
        .collect();
    (!widths.is_empty()).then_some(widths)
}

/// Widths from the first row in which every cell carries hints. A hint
/// list shorter than the cell's span is spread evenly over the span.
fn cell_hint_widths(rows: &[RowNode]) -> Option<Vec<f32>> {
    let row = rows.iter().find(|row| {
        !row.cells.is_empty()
            && row.cells.iter().all(|c| {
                c.props
                    .col_width_hints
                    .as_ref()
                    .is_some_and(|h| h.iter().any(valid_width))
            })
    })?;
    let mut widths = Vec::new();
    for cell in &row.cells {
        let span = cell.props.grid_span.filter(|s| *s > 0).unwrap_or(1) as usize;
        let hints: Vec<f32> = cell
            .props
            .col_width_hints
            .iter()
            .flatten()
            .copied()
            .filter(valid_width)
            .collect();
        if hints.len() >= span {
            widths.extend_from_slice(&hints[..span]);
        } else {
            let each = hints.iter().sum::<f32>() / span as f32;
            widths.extend(std::iter::repeat_n(each, span));
        }
    }
    Some(widths)
}

/// Where a source cell lands on the table grid once vertical merges are
/// folded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellPlacement {
    pub col_start: usize,
    pub col_span: u32,
    pub row_span: u32,
    /// Continuation of a merge started above; not emitted.
    pub covered: bool,
}

/// Lay out every cell on the grid and turn `w:vMerge` restart/continue
/// chains into row spans. A continue cell with nothing to continue stays a
/// normal cell.
pub fn place_cells(rows: &[RowNode]) -> Vec<Vec<CellPlacement>> {
    let mut placed: Vec<Vec<CellPlacement>> = rows
        .iter()
        .map(|row| {
            let mut col = row.props.grid_before.unwrap_or(0) as usize;
            row.cells
                .iter()
                .map(|cell| {
                    let col_span = cell.props.grid_span.filter(|s| *s > 0).unwrap_or(1);
                    let placement = CellPlacement {
                        col_start: col,
                        col_span,
                        row_span: cell.props.row_span.filter(|s| *s > 0).unwrap_or(1),
                        covered: false,
                    };
                    col += col_span as usize;
                    placement
                })
                .collect()
        })
        .collect();

    for r in 0..rows.len() {
        for c in 0..rows[r].cells.len() {
            if rows[r].cells[c].props.v_merge != Some(VMerge::Restart) || placed[r][c].covered {
                continue;
            }
            let start = placed[r][c].col_start;
            let mut span = 1;
            for below in (r + 1)..rows.len() {
                let Some(idx) = placed[below].iter().position(|p| p.col_start == start) else {
                    break;
                };
                if rows[below].cells[idx].props.v_merge != Some(VMerge::Continue) {
                    break;
                }
                placed[below][idx].covered = true;
                span += 1;
            }
            placed[r][c].row_span = span;
        }
    }
    placed
}

/// Row height in pixels. `auto` heights pass through as given; a missing
/// or unknown rule reads as `atLeast`.
pub fn row_height(props: &RowProps) -> Option<RowHeight> {
    let value = props.height.filter(|h| h.is_finite())?;
    let rule = match props.height_rule.as_deref() {
        Some("auto") => HeightRule::Auto,
        Some("exact") => HeightRule::Exact,
        Some("atLeast") | None => HeightRule::AtLeast,
        Some(other) => {
            log::debug!("Unknown row height rule '{other}', using atLeast");
            HeightRule::AtLeast
        }
    };
    let value = match rule {
        HeightRule::Auto => value,
        HeightRule::AtLeast | HeightRule::Exact => twips_to_px(value),
    };
    Some(RowHeight { value, rule })
}

pub fn cell_v_align(val: Option<&str>) -> CellVAlign {
    match val {
        Some("center" | "middle") => CellVAlign::Center,
        Some("bottom") => CellVAlign::Bottom,
        _ => CellVAlign::Top,
    }
}

pub fn cell_background(shading: Option<&Shading>) -> Option<String> {
    shading?.fill.as_deref().and_then(normalize_color)
}

/// Dxa widths in pixels; percentages and `auto` are left to the consumer.
pub fn width_px(width: Option<&TableWidth>) -> Option<f32> {
    let w = width?;
    (w.kind == WidthKind::Dxa && valid_width(&w.value)).then(|| twips_to_px(w.value))
}

pub fn cell_width(props: &CellProps) -> Option<f32> {
    width_px(props.width.as_ref()).or_else(|| {
        let hints = props.col_width_hints.as_ref()?;
        let total: f32 = hints.iter().copied().filter(valid_width).sum();
        (total > 0.0).then_some(total)
    })
}

/// Which table edges a cell touches.
#[derive(Clone, Copy, Debug, Default)]
pub struct CellEdges {
    pub first_row: bool,
    pub last_row: bool,
    pub first_col: bool,
    pub last_col: bool,
}

/// Project a table-level border set onto one cell: outer edges use the
/// outer borders, inner edges the `insideH`/`insideV` borders.
fn borders_at(set: &BorderSet, edges: CellEdges) -> [Option<&BorderDef>; 4] {
    fn pick<'b>(
        outer: &'b Option<BorderDef>,
        inner: &'b Option<BorderDef>,
        is_outer: bool,
    ) -> Option<&'b BorderDef> {
        if is_outer { outer.as_ref() } else { inner.as_ref() }
    }
    [
        pick(&set.top, &set.inside_h, edges.first_row),
        pick(&set.bottom, &set.inside_h, edges.last_row),
        pick(&set.left, &set.inside_v, edges.first_col),
        pick(&set.right, &set.inside_v, edges.last_col),
    ]
}

/// Cell borders: `w:tcBorders` per side, then the table's own
/// `w:tblBorders`, then the table style.
pub fn cell_borders(
    cell: &CellProps,
    table: Option<&BorderSet>,
    style: Option<&ResolvedStyle>,
    edges: CellEdges,
) -> CellBorders {
    let own = cell
        .borders
        .as_ref()
        .map(|b| [b.top.as_ref(), b.bottom.as_ref(), b.left.as_ref(), b.right.as_ref()])
        .unwrap_or_default();
    let direct = table.map(|t| borders_at(t, edges)).unwrap_or_default();
    let styled = style
        .and_then(|s| s.table.borders.as_ref())
        .map(|t| borders_at(t, edges))
        .unwrap_or_default();

    let side = |i: usize| {
        own[i]
            .or(direct[i])
            .or(styled[i])
            .and_then(resolve_border)
    };
    CellBorders {
        top: side(0),
        bottom: side(1),
        left: side(2),
        right: side(3),
    }
}

/// Cell padding in pixels: cell margins, then table margins, then the
/// table style, then Word's defaults.
pub fn cell_padding(
    cell: Option<&CellMargins>,
    table: Option<&CellMargins>,
    style: Option<&ResolvedStyle>,
) -> CellPadding {
    let styled = style.and_then(|s| s.table.cell_margins.as_ref());
    let sources = [cell, table, styled];
    let side = |get: fn(&CellMargins) -> Option<f32>| {
        sources
            .iter()
            .flatten()
            .find_map(|m| get(m))
            .filter(|v| v.is_finite())
            .map(twips_to_px)
    };
    let defaults = CellPadding::default();
    CellPadding {
        top: side(|m| m.top).unwrap_or(defaults.top),
        right: side(|m| m.right).unwrap_or(defaults.right),
        bottom: side(|m| m.bottom).unwrap_or(defaults.bottom),
        left: side(|m| m.left).unwrap_or(defaults.left),
    }
}

/// Re-insert continuation placeholders for vertically merged cells, as an
/// exporter needs one cell per row. Placeholder paragraphs take ids from
/// `next_id`.
pub fn propagate_vertical_merges_with_ids(table: &mut TableBlock, next_id: &mut usize) {
    for r in 0..table.rows.len() {
        // Origins of this row, left to right, with their grid columns.
        let mut origins: Vec<(usize, TableCell)> = Vec::new();
        let mut col = table.rows[r].grid_before as usize;
        for cell in &table.rows[r].cells {
            if cell.row_span > 1 && !cell.continue_merge {
                origins.push((col, cell.clone()));
            }
            col += cell.col_span.max(1) as usize;
        }

        for (start, origin) in origins {
            let last = (r + origin.row_span as usize).min(table.rows.len());
            for below in (r + 1)..last {
                let row = &mut table.rows[below];
                let Some(index) = insertion_index(&row.cells, row.grid_before as usize, start)
                else {
                    continue;
                };
                let mut placeholder = origin.clone();
                placeholder.row_span = 1;
                placeholder.continue_merge = true;
                placeholder.content = CellContent::empty_paragraph(*next_id);
                *next_id += 1;
                row.cells.insert(index, placeholder);
            }
        }
    }
}

/// [`propagate_vertical_merges_with_ids`] numbering placeholders after the
/// largest id already in the table.
pub fn propagate_vertical_merges(table: &mut TableBlock) {
    let mut next_id = max_table_id(table) + 1;
    propagate_vertical_merges_with_ids(table, &mut next_id);
}

/// Index at which a placeholder for grid column `start` goes, or `None`
/// when a continuation already sits there.
fn insertion_index(cells: &[TableCell], grid_before: usize, start: usize) -> Option<usize> {
    let mut col = grid_before;
    for (i, cell) in cells.iter().enumerate() {
        let end = col + cell.col_span.max(1) as usize;
        if start < end {
            if col <= start && cell.continue_merge {
                return None;
            }
            return Some(i);
        }
        col = end;
    }
    Some(cells.len())
}

pub(crate) fn max_table_id(table: &TableBlock) -> usize {
    let mut max = table.id;
    for cell in table.rows.iter().flat_map(|r| &r.cells) {
        let id = match &cell.content {
            CellContent::Paragraph(p) => p.id,
            CellContent::Blocks(blocks) => max_block_id(blocks),
        };
        max = max.max(id);
    }
    max
}

pub(crate) fn max_block_id(blocks: &[FlowBlock]) -> usize {
    blocks
        .iter()
        .map(|b| match b {
            FlowBlock::Paragraph(p) => p.id,
            FlowBlock::Table(t) => max_table_id(t),
            FlowBlock::Drawing(d) => d.common().id,
            FlowBlock::SectionBreak(s) => s.id,
        })
        .max()
        .unwrap_or(0)
}
