use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;

use anyflow::cli::args::{CliArgs, OutputFormat};
use anyflow::cli::{driver, reporter::Reporter};

const EXIT_SUCCESS: i32 = 0;
const EXIT_FINDINGS: i32 = 1;

fn main() -> Result<()> {
    // Only installs a subscriber when ANYFLOW_LOG or RUST_LOG is set.
    anyflow::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let result = driver::run(&args)?;

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result.diagnostics())?);
        }
        OutputFormat::Text => {
            let is_terminal = std::io::stdout().is_terminal();
            let mut reporter = Reporter::new(args.use_color(is_terminal))
                .with_snippets(args.pretty.unwrap_or(is_terminal));
            for report in &result.files {
                if let Some(source) = &report.source {
                    reporter.add_source(report.file.as_str(), source.as_str());
                }
            }
            let rendered = reporter.render(&result.diagnostics());
            if !rendered.is_empty() {
                println!("{rendered}\n");
            }
            println!(
                "{}",
                reporter.format_summary(result.finding_count(), result.files.len())
            );
        }
    }

    std::process::exit(if result.has_findings() {
        EXIT_FINDINGS
    } else {
        EXIT_SUCCESS
    });
}
