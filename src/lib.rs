pub mod docx;
mod error;
pub mod flow;
pub mod model;
pub mod options;
pub mod resolve;
pub mod source;
pub mod units;

pub use error::Error;
pub use model::FlowDocument;
pub use options::{ConvertOptions, PageDefaults};
pub use resolve::numbering::{ListCounterContext, ListCounters};
pub use source::SourceDocument;

use std::path::Path;
use std::time::Instant;

/// Resolve an already parsed document. List counters start fresh.
pub fn convert_document(doc: &SourceDocument, options: &ConvertOptions) -> FlowDocument {
    let t0 = Instant::now();
    let mut counters = ListCounters::new();
    let flow = flow::convert(doc, options, Some(&mut counters));
    log::info!(
        "Timing: resolve={:.1}ms ({} blocks, {} sections)",
        t0.elapsed().as_secs_f64() * 1000.0,
        flow.blocks.len(),
        flow.sections.len(),
    );
    flow
}

pub fn convert_docx(input: &Path, options: &ConvertOptions) -> Result<FlowDocument, Error> {
    let t0 = Instant::now();

    let doc = docx::parse(input)?;
    let t_parse = t0.elapsed();

    let mut counters = ListCounters::new();
    let flow = flow::convert(&doc, options, Some(&mut counters));
    let t_total = t0.elapsed();

    log_timing(t_parse.as_secs_f64(), t_total.as_secs_f64(), &flow);
    Ok(flow)
}

pub fn convert_docx_bytes(input: &[u8], options: &ConvertOptions) -> Result<FlowDocument, Error> {
    let t0 = Instant::now();

    let doc = docx::parse_bytes(input)?;
    let t_parse = t0.elapsed();

    let mut counters = ListCounters::new();
    let flow = flow::convert(&doc, options, Some(&mut counters));
    let t_total = t0.elapsed();

    log_timing(t_parse.as_secs_f64(), t_total.as_secs_f64(), &flow);
    Ok(flow)
}

/// Serialize a flow document as JSON.
pub fn to_json(flow: &FlowDocument, pretty: bool) -> Result<String, Error> {
    let json = if pretty {
        serde_json::to_string_pretty(flow)?
    } else {
        serde_json::to_string(flow)?
    };
    Ok(json)
}

fn log_timing(parse: f64, total: f64, flow: &FlowDocument) {
    log::info!(
        "Timing: parse={:.1}ms, resolve={:.1}ms, total={:.1}ms ({} blocks, {} sections)",
        parse * 1000.0,
        (total - parse) * 1000.0,
        total * 1000.0,
        flow.blocks.len(),
        flow.sections.len(),
    );
}
