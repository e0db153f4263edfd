//! Packs one territory from a TOML run file and prints the circles as JSON lines.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use geo::{LineString, Polygon};
use hexpack::{GridConfig, GridGenerator, MemoryOracle, Territory};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hexpack", version, about = "Multi-resolution hexagonal circle packing")]
struct Cli {
    /// TOML file with a [grid] table and [[territory]] polygons
    run_file: PathBuf,
    /// Territory to pack, overriding grid.territory_id
    #[arg(long)]
    territory: Option<String>,
    /// Radius of level 0, in meters
    #[arg(long)]
    max_radius: Option<f64>,
    /// Radius floor, in meters
    #[arg(long)]
    min_radius: Option<f64>,
    /// Write circles here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Deserialize)]
struct RunFile {
    grid: GridConfig,
    #[serde(default, rename = "territory")]
    territories: Vec<TerritoryEntry>,
}

#[derive(Deserialize)]
struct TerritoryEntry {
    id: String,
    exterior: Vec<[f64; 2]>,
    #[serde(default)]
    holes: Vec<Vec<[f64; 2]>>,
}

impl TerritoryEntry {
    fn to_territory(&self) -> hexpack::Result<Territory> {
        let ring = |points: &[[f64; 2]]| {
            LineString::from(points.iter().map(|&[x, y]| (x, y)).collect::<Vec<_>>())
        };
        let holes = self.holes.iter().map(|hole| ring(hole)).collect();
        Territory::from_polygon(Polygon::new(ring(&self.exterior), holes))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.run_file)
        .with_context(|| format!("reading run file {}", cli.run_file.display()))?;
    let run: RunFile = toml::from_str(&text)
        .with_context(|| format!("parsing run file {}", cli.run_file.display()))?;

    let mut config = run.grid;
    if let Some(territory) = cli.territory {
        config.territory_id = territory;
    }
    if let Some(max_radius) = cli.max_radius {
        config.max_radius = max_radius;
    }
    if let Some(min_radius) = cli.min_radius {
        config.min_radius = min_radius;
    }
    config.territory_id = config.territory_id.to_uppercase();

    let mut oracle = MemoryOracle::new();
    for entry in &run.territories {
        let territory = entry
            .to_territory()
            .with_context(|| format!("territory `{}`", entry.id))?;
        oracle.insert_territory(entry.id.to_uppercase(), territory);
    }
    if oracle.territory(&config.territory_id).is_none() {
        bail!(
            "territory `{}` is not defined in {}",
            config.territory_id,
            cli.run_file.display()
        );
    }

    let territory_id = config.territory_id.clone();
    let summary = GridGenerator::new(&mut oracle, config)
        .run()
        .with_context(|| format!("packing `{territory_id}`"))?;

    let sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = BufWriter::new(sink);
    for circle in oracle.circles(&territory_id) {
        serde_json::to_writer(&mut sink, circle)?;
        writeln!(sink)?;
    }
    sink.flush().context("writing circles")?;

    info!(
        territory = %territory_id,
        total_circles = summary.total_circles,
        levels = summary.levels,
        capped = summary.capped,
        "done"
    );
    Ok(())
}
