use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use docxide_flow::{ConvertOptions, PageDefaults};

#[derive(Parser)]
#[command(name = "docxide-flow")]
#[command(version)]
#[command(about = "Resolve a DOCX file into pixel-based flow blocks (JSON)", long_about = None)]
struct Cli {
    /// Input DOCX file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output JSON file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Attach source byte spans to blocks
    #[arg(long)]
    positions: bool,

    /// Leave raw source attribute bags out
    #[arg(long)]
    no_source_attrs: bool,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,

    /// Use A4 instead of Letter when a document has no page size
    #[arg(long)]
    a4: bool,

    /// Restore merged-cell placeholders as an exporter expects them
    #[arg(long)]
    export: bool,
}

fn run(cli: &Cli) -> Result<(), docxide_flow::Error> {
    let options = ConvertOptions::new()
        .with_positions(cli.positions)
        .with_source_attrs(!cli.no_source_attrs)
        .with_default_page(if cli.a4 {
            PageDefaults::A4
        } else {
            PageDefaults::Letter
        });

    let mut flow = docxide_flow::convert_docx(&cli.input, &options)?;
    if cli.export {
        flow.prepare_for_export();
    }
    let json = docxide_flow::to_json(&flow, cli.pretty)?;

    match &cli.output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
