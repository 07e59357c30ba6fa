use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use flowkit::app::{LaunchOptions, Navigation};
use flowkit::compose::CompositionFactory;
use flowkit::config::Config;
use flowkit::deps::ImageService;
use flowkit::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "flowkit", version, about = "Drive the flowkit demo app headlessly")]
struct Cli {
    /// Config file (default: the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Deep link to launch with
    #[arg(long)]
    url: Option<String>,

    /// Trigger to visit after launch (repeatable)
    #[arg(long = "visit")]
    visits: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading config")?;
    if let Some(path) = init_tracing(&config.logging) {
        eprintln!("Logging to {}", path.display());
    }

    let root = CompositionFactory::new(config)
        .build()
        .context("composing application")?;
    let images = root.dependencies().resolve::<dyn ImageService>()?;

    let options = LaunchOptions {
        url: cli.url,
        ..LaunchOptions::default()
    };
    report("launch", &root.launch(options)?);

    for visit in cli.visits {
        let navigation = root.navigate(visit.as_str())?;
        report(&visit, &navigation);
        images.settle();
        let pumped = root.pump();
        tracing::info!(applied = pumped.applied, discarded = pumped.discarded, "Pumped");
    }

    root.enter_background();
    root.terminate();
    let totals = root.postbox().totals();
    tracing::info!(
        applied = totals.applied,
        discarded = totals.discarded,
        "Completions delivered"
    );
    Ok(())
}

fn report(what: &str, navigation: &Navigation) {
    match navigation {
        Navigation::Direct { route } => println!("{what}: {route}"),
        Navigation::Fallback { requested, route } => {
            println!("{what}: '{requested}' did not resolve, fell back to {route}")
        }
        Navigation::Ignored => println!("{what}: ignored"),
    }
}
