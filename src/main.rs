use anyhow::{Context, Result};
use clap::Parser;
use gramchart::data::{read_records, InputFormat};
use gramchart::preprocessor::{expand_variables, parse_assignments};
use gramchart::{build_chart, build_single_serie_chart, merge_deep, parse_chart_config};
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[command(name = "gramchart")]
#[command(about = "Turn records from stdin into chart series JSON using a mapping pipeline", long_about = None)]
struct Args {
    /// Mapping pipeline (e.g., 'series(name: status, x: month, y: count) | xorder(asc)')
    pipeline: String,

    /// Format of the records read from stdin
    #[arg(short, long, value_enum, default_value_t = InputFormat::Csv)]
    input: InputFormat,

    /// Build a single-series chart (pie, funnel, ...)
    #[arg(long)]
    single: bool,

    /// Pipeline variable, NAME=VALUE (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,

    /// JSON object deep-merged onto the output
    #[arg(long, value_name = "JSON")]
    overrides: Option<String>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Expand $variables, then parse the pipeline
    let variables = parse_assignments(&args.vars).context("Invalid --var")?;
    let pipeline = expand_variables(&args.pipeline, &variables)
        .context("Failed to expand pipeline variables")?;
    let config = parse_chart_config(&pipeline).context("Failed to parse pipeline")?;

    // Read records from stdin
    let records = read_records(io::stdin().lock(), args.input)
        .context("Failed to read records from stdin")?;
    log::debug!("Read {} records", records.len());

    let chart = if args.single {
        build_single_serie_chart(&records, &config, None)
    } else {
        build_chart(&records, &config, None)
    }
    .context("Failed to build chart")?;

    let mut output = serde_json::to_value(&chart).context("Failed to serialize chart")?;
    if let Some(raw) = &args.overrides {
        let overrides: serde_json::Value =
            serde_json::from_str(raw).context("--overrides is not valid JSON")?;
        merge_deep(&mut output, &[&overrides]);
    }

    let text = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("Failed to serialize output")?;

    // Write JSON to stdout
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", text).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
