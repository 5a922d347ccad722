//! Section geometry and the page boundaries between sections.

use crate::model::{
    ColumnLayout, HeaderFooterRefs, Orientation, PageMargins, PageNumbering, PageSize, Section,
    SectionBoundary, SectionBreakType, SectionVAlign,
};
use crate::options::PageDefaults;
use crate::source::{HeaderFooterRef, SectionProps};
use crate::units::twips_to_px;

/// 1in page margins.
const DEFAULT_MARGIN_TWIPS: f32 = 1440.0;
/// 0.5in header and footer distance.
const DEFAULT_HEADER_TWIPS: f32 = 720.0;
/// Word's default space between columns.
const DEFAULT_COLUMN_GAP_TWIPS: f32 = 720.0;

/// Page sizes closer than this (px) count as equal.
const PAGE_SIZE_EPSILON: f32 = 0.5;

fn break_type(val: Option<&str>) -> SectionBreakType {
    match val {
        Some("continuous") => SectionBreakType::Continuous,
        Some("oddPage") => SectionBreakType::OddPage,
        Some("evenPage") => SectionBreakType::EvenPage,
        _ => SectionBreakType::NextPage,
    }
}

fn refs(list: &[HeaderFooterRef]) -> HeaderFooterRefs {
    let mut refs = HeaderFooterRefs::default();
    for r in list {
        match r.kind.as_str() {
            "default" => refs.default = Some(r.id.clone()),
            "first" => refs.first = Some(r.id.clone()),
            "even" => refs.even = Some(r.id.clone()),
            other => log::debug!("Ignoring header/footer reference type '{other}'"),
        }
    }
    refs
}

fn length(val: Option<f32>, default_twips: f32) -> f32 {
    twips_to_px(val.filter(|v| v.is_finite()).unwrap_or(default_twips))
}

/// Section geometry in pixels, Letter-sized when the page size is absent.
pub fn extract_section(props: &SectionProps) -> Section {
    extract_section_with(props, PageDefaults::Letter)
}

pub fn extract_section_with(props: &SectionProps, page: PageDefaults) -> Section {
    let (default_w, default_h) = page.size_twips();
    let width = twips_to_px(
        props
            .page_width
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(default_w),
    );
    let height = twips_to_px(
        props
            .page_height
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(default_h),
    );

    let orientation = match props.orientation.as_deref() {
        Some("landscape") => Orientation::Landscape,
        Some("portrait") => Orientation::Portrait,
        _ if width > height => Orientation::Landscape,
        _ => Orientation::Portrait,
    };

    let m = &props.margins;
    let margins = PageMargins {
        top: length(m.top, DEFAULT_MARGIN_TWIPS),
        right: length(m.right, DEFAULT_MARGIN_TWIPS),
        bottom: length(m.bottom, DEFAULT_MARGIN_TWIPS),
        left: length(m.left, DEFAULT_MARGIN_TWIPS),
        header: length(m.header, DEFAULT_HEADER_TWIPS),
        footer: length(m.footer, DEFAULT_HEADER_TWIPS),
        gutter: length(m.gutter, 0.0),
    };

    let columns = props.columns.as_ref();
    let columns = ColumnLayout {
        count: columns.and_then(|c| c.count).filter(|c| *c > 0).unwrap_or(1),
        gap: length(columns.and_then(|c| c.space), DEFAULT_COLUMN_GAP_TWIPS),
        separator: columns.and_then(|c| c.separator).unwrap_or(false),
    };

    let page_numbering = match (&props.page_number_format, props.page_number_start) {
        (Some(format), start) => Some(PageNumbering {
            format: format.clone(),
            start,
        }),
        (None, Some(start)) => Some(PageNumbering {
            format: "decimal".to_string(),
            start: Some(start),
        }),
        (None, None) => None,
    };

    let vertical_align = props.v_align.as_deref().and_then(|v| match v {
        "top" => Some(SectionVAlign::Top),
        "center" => Some(SectionVAlign::Center),
        "bottom" => Some(SectionVAlign::Bottom),
        "both" => Some(SectionVAlign::Both),
        _ => None,
    });

    Section {
        kind: break_type(props.kind.as_deref()),
        page_size: PageSize { width, height },
        orientation,
        margins,
        columns,
        headers: refs(&props.header_refs),
        footers: refs(&props.footer_refs),
        page_numbering,
        vertical_align,
        title_page: props.title_page.unwrap_or(false),
    }
}

/// The section used when a document has no `w:sectPr` at all.
pub fn default_section(page: PageDefaults) -> Section {
    extract_section_with(&SectionProps::default(), page)
}

fn same_page_size(a: &PageSize, b: &PageSize) -> bool {
    (a.width - b.width).abs() < PAGE_SIZE_EPSILON && (a.height - b.height).abs() < PAGE_SIZE_EPSILON
}

/// Decide how `next` starts after `prev`. A change of orientation or page
/// size always starts a new page, so a `continuous` section is upgraded to
/// `nextPage`. The first section (`prev` of `None`) starts the document.
pub fn classify_boundary(prev: Option<&Section>, next: &Section) -> SectionBoundary {
    let Some(prev) = prev else {
        return SectionBoundary {
            forces_page_break: false,
            effective_kind: next.kind,
        };
    };
    let geometry_changed =
        prev.orientation != next.orientation || !same_page_size(&prev.page_size, &next.page_size);
    match next.kind {
        SectionBreakType::Continuous if geometry_changed => SectionBoundary {
            forces_page_break: true,
            effective_kind: SectionBreakType::NextPage,
        },
        SectionBreakType::Continuous => SectionBoundary {
            forces_page_break: false,
            effective_kind: SectionBreakType::Continuous,
        },
        kind => SectionBoundary {
            forces_page_break: true,
            effective_kind: kind,
        },
    }
}
