mod config;
mod report;
mod scene;

use std::error::Error;
use std::path::PathBuf;

use config::DemoConfig;
use report::render_summary;
use scene::build_ring_structure;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    // An optional JSON file overrides the default ring.
    let config = match std::env::args_os().nth(1) {
        Some(path) => DemoConfig::load(&PathBuf::from(path))?,
        None => DemoConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!(?config, "starting");

    // Build the anchors and rods, then make sure every rod is registered with
    // both of its anchors before reporting on it.
    let (structure, scene) = build_ring_structure(&config)?;
    structure.check_consistency()?;

    let report = render_summary(&structure, &scene)?;
    println!("{report}");

    Ok(())
}
