//! Headless runner: load a snapshot (or start from a seeded scene), run N
//! frames and optionally save the result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use sandy_engine::domain::materials::{MAT_SAND, MAT_STONE, MAT_WATER};
use sandy_engine::{Coordinator, FrameOutput, MaterialRegistry, SimulationConfig, World};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Snapshot to load before stepping
    #[arg(long)]
    load: Option<PathBuf>,

    /// Where to write the final snapshot
    #[arg(long)]
    save: Option<PathBuf>,

    /// Frames to simulate
    #[arg(long, default_value = "600")]
    frames: u64,

    /// World width in cells (overrides --config)
    #[arg(long)]
    width: Option<u32>,

    /// World height in cells
    #[arg(long)]
    height: Option<u32>,

    /// Worker threads; 0 runs the single-threaded world
    #[arg(long)]
    threads: Option<usize>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// JSON simulation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON material bundle replacing the built-in table
    #[arg(long)]
    materials: Option<PathBuf>,

    /// Start from a small sand/water/stone scene instead of an empty world
    #[arg(long)]
    demo: bool,

    /// Log a progress line every N frames (0 = never)
    #[arg(long, default_value = "60")]
    report_every: u64,

    /// Print the last frame's perf stats as JSON
    #[arg(long)]
    perf: bool,
}

/// Either driver behind one interface for the run loop.
enum Driver {
    Threaded(Coordinator),
    Inline(World),
}

impl Driver {
    fn step(&mut self) -> anyhow::Result<FrameOutput> {
        match self {
            Driver::Threaded(c) => Ok(c.advance_frame()?),
            Driver::Inline(w) => Ok(w.step()),
        }
    }

    fn load(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let info = match self {
            Driver::Threaded(c) => c.load_snapshot(data)?,
            Driver::Inline(w) => w.load_snapshot(data)?,
        };
        log::info!("snapshot: v{} {}x{}, {} particles", info.version, info.width, info.height, info.particles);
        Ok(())
    }

    fn save(&self) -> Vec<u8> {
        match self {
            Driver::Threaded(c) => c.save_snapshot(),
            Driver::Inline(w) => w.save_snapshot(),
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, id: u8) -> usize {
        match self {
            Driver::Threaded(c) => c.fill_rect(x, y, width, height, id),
            Driver::Inline(w) => w.fill_rect(x, y, width, height, id),
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        match self {
            Driver::Threaded(c) => (c.width(), c.height()),
            Driver::Inline(w) => (w.width(), w.height()),
        }
    }
}

fn build_config(args: &Args) -> anyhow::Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SimulationConfig::from_json(&json)?
        }
        None => SimulationConfig::default(),
    };
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    if let Some(t) = args.threads {
        config.workers = t;
    }
    if let Some(s) = args.seed {
        config.seed = s;
    }
    if args.perf {
        config.enable_perf_metrics = true;
    }
    config.validate()?;
    Ok(config)
}

fn seed_demo(driver: &mut Driver) {
    let (w, h) = driver.dimensions();
    let (w, h) = (w as i32, h as i32);
    driver.fill_rect(0, h - 4, w as u32, 4, MAT_STONE);
    driver.fill_rect(w / 8, h / 8, (w / 4) as u32, (h / 6) as u32, MAT_SAND);
    driver.fill_rect(w / 2, h / 8, (w / 4) as u32, (h / 6) as u32, MAT_WATER);
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.load.is_some() && args.demo {
        bail!("--load and --demo are mutually exclusive");
    }

    let config = build_config(&args)?;
    let registry = match &args.materials {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading material bundle {}", path.display()))?;
            MaterialRegistry::from_bundle_json(&json)?
        }
        None => MaterialRegistry::with_builtins(),
    };
    let registry = Arc::new(registry);

    // explicit 0 threads selects the inline world; 0 in a config file means "auto"
    let mut driver = if args.threads == Some(0) {
        Driver::Inline(World::new(config, registry)?)
    } else {
        Driver::Threaded(Coordinator::new(config, registry)?)
    };

    if let Some(path) = &args.load {
        let data = std::fs::read(path).with_context(|| format!("reading snapshot {}", path.display()))?;
        driver.load(&data)?;
    } else if args.demo {
        seed_demo(&mut driver);
    }

    let started = std::time::Instant::now();
    let mut last = FrameOutput::default();
    for _ in 0..args.frames {
        last = driver.step()?;
        if args.report_every > 0 && last.frame % args.report_every == 0 {
            log::info!(
                "frame {}: {} cells, {} updated, {} active chunks, {} off-grid",
                last.frame,
                last.particle_count,
                last.cells_updated,
                last.active_chunks,
                last.offgrid_count()
            );
        }
    }
    let elapsed = started.elapsed();
    log::info!(
        "{} frames in {:.2?} ({:.1} fps), {} cells alive",
        args.frames,
        elapsed,
        args.frames as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        last.particle_count
    );

    if args.perf {
        if let Some(perf) = &last.perf {
            println!("{}", serde_json::to_string_pretty(perf)?);
        }
    }

    if let Some(path) = &args.save {
        let bytes = driver.save();
        std::fs::write(path, &bytes).with_context(|| format!("writing snapshot {}", path.display()))?;
        log::info!("saved {} bytes to {}", bytes.len(), path.display());
    }
    Ok(())
}
