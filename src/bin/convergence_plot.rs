use anyhow::anyhow;
use clap::Parser;
use csv::ReaderBuilder;
use plotters::prelude::*;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render a log-log convergence plot from shell_gravity CSV output"
)]
struct Cli {
    #[arg(long)]
    input: String,
    #[arg(long, default_value = "artifacts/convergence.png")]
    output: PathBuf,
    #[arg(long, default_value = "mean_magnitude_m_s2")]
    metric: String,
    #[arg(long, default_value_t = 1000)]
    width: u32,
    #[arg(long, default_value_t = 700)]
    height: u32,
}

#[derive(Debug, Clone, Copy)]
struct TierPoint {
    numpoints: f64,
    value: f64,
    spread: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let points = read_points(&cli.input, &cli.metric)?;
    if points.is_empty() {
        return Err(anyhow!("No tiers with a positive {} in {}", cli.metric, cli.input));
    }

    let x_min = points.iter().map(|p| p.numpoints).fold(f64::INFINITY, f64::min);
    let x_max = points.iter().map(|p| p.numpoints).fold(f64::NEG_INFINITY, f64::max);
    let y_min = points.iter().map(lower_bar).fold(f64::INFINITY, f64::min);
    let y_max = points
        .iter()
        .map(|p| p.value + p.spread)
        .fold(f64::NEG_INFINITY, f64::max);

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_str = cli
        .output
        .to_str()
        .ok_or_else(|| anyhow!("Output path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 16.0, FontStyle::Normal);

    let mut chart = ChartBuilder::on(&root)
        .caption("Shell gravity estimate vs sample count", caption_font)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(
            (x_min * 0.5..x_max * 2.0).log_scale(),
            (y_min * 0.5..y_max * 2.0).log_scale(),
        )?;

    chart
        .configure_mesh()
        .x_desc("samples on shell")
        .y_desc(format!("{} (m/s²)", cli.metric))
        .label_style(label_font)
        .draw()?;

    chart.draw_series(LineSeries::new(
        points.iter().map(|p| (p.numpoints, p.value)),
        &BLUE,
    ))?;
    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new((p.numpoints, p.value), 4, BLUE.filled())),
    )?;
    for p in points.iter().filter(|p| p.spread > 0.0) {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(p.numpoints, lower_bar(p)), (p.numpoints, p.value + p.spread)],
            BLACK,
        )))?;
    }

    root.present()?;
    println!("Saved convergence plot to {}", cli.output.display());
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

// log axes cannot show a bar reaching zero
fn lower_bar(p: &TierPoint) -> f64 {
    (p.value - p.spread).max(p.value * 0.1)
}

fn read_points(path: &str, metric: &str) -> anyhow::Result<Vec<TierPoint>> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let n_idx = column("numpoints").ok_or_else(|| anyhow!("CSV missing 'numpoints' column"))?;
    let metric_idx =
        column(metric).ok_or_else(|| anyhow!("CSV missing metric column '{}'", metric))?;
    // spread only makes sense around the mean
    let spread_idx = if metric == "mean_magnitude_m_s2" {
        column("std_dev_magnitude_m_s2")
    } else {
        None
    };

    let mut points = Vec::new();
    for record in reader.records() {
        let record = record?;
        let parse = |idx: usize| -> anyhow::Result<f64> {
            let raw = record
                .get(idx)
                .ok_or_else(|| anyhow!("short CSV row: {:?}", record))?;
            Ok(raw.trim().parse::<f64>()?)
        };
        let numpoints = parse(n_idx)?;
        let value = parse(metric_idx)?;
        let spread = match spread_idx {
            Some(idx) => parse(idx)?,
            None => 0.0,
        };
        if numpoints > 0.0 && value > 0.0 && value.is_finite() {
            points.push(TierPoint {
                numpoints,
                value,
                spread: spread.max(0.0),
            });
        }
    }
    points.sort_by(|a, b| a.numpoints.total_cmp(&b.numpoints));
    Ok(points)
}
