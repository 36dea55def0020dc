use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use generator::profile::build_readings;
use magcore::export::{persist, ExportFormat};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;
use workflow::source::{load_notes, load_readings};

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Plans, summarizes and exports magnetometer field surveys")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Export format: csv, geojson, kml, shapefile or database
    #[arg(long)]
    format: Option<ExportFormat>,
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// JSON array of recorded readings; a synthetic walk is generated when absent
    #[arg(long)]
    readings: Option<PathBuf>,
    /// JSON array of field notes
    #[arg(long)]
    notes: Option<PathBuf>,
    /// Override the generator seed
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 4)]
    rows: u32,
    #[arg(long, default_value_t = 4)]
    cols: u32,
    /// Cell side in decimal degrees
    #[arg(long, default_value_t = 0.0005)]
    spacing: f64,
    /// Print the summary without writing the export
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(
            args.rows,
            args.cols,
            args.spacing,
            ExportFormat::Csv,
            PathBuf::from("exports"),
        )
    };
    if let Some(format) = args.format {
        config.export.format = format;
    }
    if let Some(dir) = args.output_dir {
        config.export.output_dir = dir;
    }
    if let Some(seed) = args.seed {
        config.generator.seed = seed;
    }
    config.export.dry_run |= args.dry_run;

    let now = Utc::now();
    let runner = Runner::new(config.clone());
    let project = runner.project(now);

    let readings = match &args.readings {
        Some(path) => load_readings(path)?,
        None => {
            let start = now - chrono::Duration::hours(2);
            build_readings(&config.generator, &runner.plan(), &project.id, start)
        }
    };
    let notes = match &args.notes {
        Some(path) => load_notes(path)?,
        None => Vec::new(),
    };

    let result = runner.execute(&project, &readings, &notes, now)?;

    println!(
        "Survey '{}' -> {} readings, {} notes, {} cells, coverage {:.1}% ({} done, {} active)",
        project.name,
        readings.len(),
        notes.len(),
        result.coverage.total,
        result.coverage.coverage_percent,
        result.coverage.completed,
        result.coverage.in_progress
    );
    let walk: Vec<String> = result.path.iter().take(8).map(|c| c.id()).collect();
    let ellipsis = if result.path.len() > walk.len() { " ..." } else { "" };
    println!("Walk order: {}{}", walk.join(" -> "), ellipsis);
    let empty = result.cells.iter().filter(|c| c.point_count == 0).count();
    if empty > 0 {
        println!("{} cells have no readings yet", empty);
    }
    if let Some(stats) = &result.statistics {
        println!(
            "Total field μT: min {:.3} max {:.3} mean {:.3} median {:.3} σ {:.3}",
            stats.min_field,
            stats.max_field,
            stats.mean_field,
            stats.median_field,
            stats.std_dev_field
        );
        println!(
            "Duration {} h, area {:.4} km², mean accuracy {}",
            stats.duration_hours,
            stats.area_km2,
            stats
                .mean_accuracy
                .map(|a| format!("{:.2} m", a))
                .unwrap_or_else(|| "n/a".into())
        );
    }
    if let Some(anomalies) = &result.anomalies {
        println!(
            "Anomalies: {} ({} high), threshold ±{:.3} μT",
            anomalies.len(),
            anomalies.high_count(),
            anomalies.threshold
        );
        for anomaly in anomalies.top() {
            println!(
                "  #{:<4} {:>8.3} μT  Δ {:>7.3}  {}",
                anomaly.index, anomaly.reading.total_field, anomaly.deviation, anomaly.severity
            );
        }
    }

    let Some(output) = &result.output else {
        return Ok(());
    };

    let out_dir = &config.export.output_dir;
    let path = persist(output, out_dir)
        .with_context(|| format!("writing export to {}", out_dir.display()))?;
    println!("Wrote {} ({})", path.display(), output.mime_type());

    let report = format!(
        "{} project={} format={} readings={} coverage={:.1} anomalies={} path={}\n",
        now.to_rfc3339(),
        project.name,
        config.export.format,
        readings.len(),
        result.coverage.coverage_percent,
        result.anomalies.as_ref().map_or(0, |a| a.len()),
        path.display()
    );
    fs::create_dir_all(out_dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(out_dir.join("survey_runs.log"))?;
    file.write_all(report.as_bytes())?;

    Ok(())
}
