use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info, LevelFilter};

use territory_outline::marker::MemoryAreaMarker;
use territory_outline::style::apply_owner_style;
use territory_outline::{
    JsonTerritoryFile, MapperConfig, MemoryMarkerSet, OwnerTerritory, Result, TerritoryMapper,
    TerritorySource,
};

#[derive(Parser, Debug)]
#[command(name = "territory_outline")]
#[command(about = "Outline claimed chunk territories as map area markers")]
struct Args {
    /// Territories JSON file (array of owners with their chunks)
    #[arg(short, long)]
    input: PathBuf,

    /// Write markers JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// World units per chunk edge (overrides the config file)
    #[arg(long)]
    cell_size: Option<f64>,

    /// Mapper config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trace owners on all cores
    #[arg(long)]
    parallel: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => MapperConfig::from_json_file(path)?,
        None => MapperConfig::default(),
    };
    if let Some(cell_size) = args.cell_size {
        config.cell_size = cell_size;
    }
    let mapper = TerritoryMapper::new(config)?;

    let owners = JsonTerritoryFile::new(&args.input).territories()?;
    info!("Loaded {} owners from {}", owners.len(), args.input.display());

    let defaults = mapper.config().style;
    let mut style = |owner: &OwnerTerritory, marker: &mut MemoryAreaMarker| {
        apply_owner_style(&defaults, owner, marker)
    };

    let mut markers = MemoryMarkerSet::new();
    let reports = mapper.outline_all(&owners, &mut markers, &mut style, args.parallel)?;

    let json = serde_json::to_string_pretty(&markers)?;
    match &args.output {
        Some(path) => fs::write(path, json)?,
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    let chunks: usize = reports.iter().map(|r| r.chunks).sum();
    eprintln!(
        "Outlined {} owners: {} chunks, {} markers",
        reports.len(),
        chunks,
        markers.len()
    );
    Ok(())
}
