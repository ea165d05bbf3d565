use anyhow::Context;
use clap::Parser;
use generator::profile::{build_ping_stream_from_config, write_ping_stream, GeneratorConfig};
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::export::export_gap_filler_trend;
use workflow::runner::{AnalysisReport, Runner};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline swath coverage workflow driver")]
struct Args {
    /// Run the pipeline over a generated swath and print a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Decoded ping-stream files to load
    #[arg(long, num_args = 0..)]
    files: Vec<PathBuf>,
    /// Scan acquisition parameters only; skip the sounding search
    #[arg(long, default_value_t = false)]
    params_only: bool,
    /// Write the water-depth-multiple trend table to this path
    #[arg(long)]
    export_trend: Option<PathBuf>,
    /// Write a synthetic ping stream to this path and exit
    #[arg(long)]
    generate: Option<PathBuf>,
    #[arg(long, default_value_t = 200)]
    pings: usize,
    #[arg(long, default_value_t = 64)]
    beams: usize,
    /// Emit two swaths per ping cycle in generated data
    #[arg(long, default_value_t = false)]
    dual_swath: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    if args.params_only {
        workflow_config.params_only = true;
    }

    let generator_config = GeneratorConfig {
        pings: args.pings,
        beams: args.beams,
        dual_swath: args.dual_swath,
        ..Default::default()
    };

    if let Some(path) = args.generate {
        let stream = build_ping_stream_from_config(&generator_config)?;
        write_ping_stream(&path, &stream)?;
        println!("Wrote {} pings to {}", stream.pings.len(), path.display());
        return Ok(());
    }

    let runner = Runner::new(workflow_config);

    if !args.files.is_empty() {
        let outcome = runner.run_files(&args.files);
        println!(
            "Batch -> converted {}, skipped {}, failed {}",
            outcome.summary.converted, outcome.summary.skipped, outcome.summary.failed
        );
        for error in &outcome.summary.errors {
            println!("  {}", error);
        }
        let report = runner
            .analyze(&outcome.table)
            .context("analyzing loaded files")?;
        print_report(&report, outcome.table.len());
        if let Some(path) = &args.export_trend {
            export_gap_filler_trend(path, &report.trend)?;
            println!("Trend table written to {}", path.display());
        }
        return Ok(());
    }

    if args.offline {
        let stream = build_ping_stream_from_config(&generator_config)?;
        runner.commit_stream("generated", &stream);
        let table = runner.snapshot();
        let report = runner.analyze(&table).context("analyzing generated swath")?;
        print_report(&report, table.len());
        if let Some(path) = &args.export_trend {
            export_gap_filler_trend(path, &report.trend)?;
            println!("Trend table written to {}", path.display());
        }
    }

    Ok(())
}

fn print_report(report: &AnalysisReport, pings: usize) {
    println!(
        "Analysis -> pings {}, soundings {}, after filters {}, plotted {}, trend bins {}, rate samples {}",
        pings,
        report.total_soundings,
        report.filtered_soundings,
        report.plotted_indices.len(),
        report.trend.len(),
        report.rate.as_ref().map_or(0, |samples| samples.len())
    );
}
