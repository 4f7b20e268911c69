//! Runs the overview grid layout over a list of window sizes and prints the cells as JSON.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use overview::layout::{GridLayoutEngine, LayoutWindow};
use overview::overview::Options;
use overview::utils::{Rect, Size};
use overview_config::Config;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "overview")]
#[command(about = "Lay out windows in an overview grid")]
struct Cli {
    /// Path to a KDL config file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Work area as WxH or WxH+X+Y.
    #[arg(short, long, default_value = "1366x720", value_parser = parse_work_area)]
    work_area: Rect,
    /// Window sizes as WxH, most recently used first.
    #[arg(required = true, value_parser = parse_size)]
    windows: Vec<Size>,
}

#[derive(Serialize)]
struct Output {
    work_area: Rect,
    usable_bounds: Rect,
    /// One entry per window, `null` for windows that got no cell.
    cells: Vec<Option<Rect>>,
}

fn parse_size(s: &str) -> anyhow::Result<Size> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| anyhow!("expected WxH, got {s:?}"))?;
    let w = w.parse().with_context(|| format!("invalid width in {s:?}"))?;
    let h = h.parse().with_context(|| format!("invalid height in {s:?}"))?;
    Ok(Size::new(w, h))
}

fn parse_work_area(s: &str) -> anyhow::Result<Rect> {
    let mut parts = s.split('+');
    let size = parse_size(parts.next().unwrap_or_default())?;
    let loc = match (parts.next(), parts.next(), parts.next()) {
        (None, _, _) => (0, 0),
        (Some(x), Some(y), None) => (
            x.parse().with_context(|| format!("invalid x in {s:?}"))?,
            y.parse().with_context(|| format!("invalid y in {s:?}"))?,
        ),
        _ => bail!("expected WxH or WxH+X+Y, got {s:?}"),
    };
    if size.is_empty() {
        bail!("work area {s:?} is empty");
    }
    Ok(Rect::new(loc.0, loc.1, size.w, size.h))
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    // Render through miette to keep the labelled source snippet.
    Config::load(path).map_err(|err: miette::Report| anyhow!("{err:?}"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("overview=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    let options = Options::from_config(&config);
    debug!("grid parameters: {:?}", options.grid);

    let engine = GridLayoutEngine::new(options.grid);
    let windows: Vec<_> = cli
        .windows
        .iter()
        .map(|&size| LayoutWindow::new(size, engine.params()))
        .collect();
    let cells = engine.layout(cli.work_area, &windows);

    let placed = cells.iter().flatten().count();
    info!("placed {placed} of {} windows", windows.len());

    let output = Output {
        work_area: cli.work_area,
        usable_bounds: engine.usable_bounds(cli.work_area),
        cells,
    };
    let json = serde_json::to_string_pretty(&output).context("error serializing the layout")?;
    println!("{json}");
    Ok(())
}
