use anyhow::Context;
use clap::{Parser, Subcommand};
use donut::chart::{DonutChart, view};
use donut::config::{self, ChartConfig};
use donut::events::AppEvent;
use donut::sys::runtime;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "donut")]
#[command(about = "Ring charts with rounded slice corners", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Render the chart to a PNG file
    Render {
        #[arg(short, long, default_value = "donut.png")]
        output: PathBuf,

        #[arg(long)]
        width: Option<i32>,

        #[arg(long)]
        height: Option<i32>,
    },
    /// Print every slice outline (or why it was skipped) as JSON
    Contours,
    /// Write the default config file if none exists
    Init,
    /// Re-render the PNG whenever the config file changes
    Watch {
        #[arg(short, long, default_value = "donut.png")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            output,
            width,
            height,
        } => {
            let mut cfg = config::load_config(cli.config.as_deref())?;
            cfg.width = width.unwrap_or(cfg.width);
            cfg.height = height.unwrap_or(cfg.height);
            render(&mut DonutChart::from_config(&cfg), &output)
        }
        Commands::Contours => {
            let cfg = config::load_config(cli.config.as_deref())?;
            let outcomes = DonutChart::from_config(&cfg).outcomes();
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
            Ok(())
        }
        Commands::Init => {
            let path = config::write_default_config(cli.config.as_deref())?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Watch { output } => {
            let config_path = match cli.config {
                Some(path) => path,
                None => config::get_config_path()?,
            };
            watch(&config_path, &output)
        }
    }
}

fn render(chart: &mut DonutChart, output: &Path) -> anyhow::Result<()> {
    let frame = chart.frame();
    view::render_png(&frame, output)
        .with_context(|| format!("Failed to render {}", output.display()))?;
    log::info!(
        "Rendered {} slices to {}",
        frame.segments.len(),
        output.display()
    );
    Ok(())
}

fn reload(config_path: &Path) -> Option<ChartConfig> {
    config::load_config(Some(config_path))
        .inspect_err(|e| log::error!("Failed to reload config: {}", e))
        .ok()
}

fn watch(config_path: &Path, output: &Path) -> anyhow::Result<()> {
    let cfg = config::load_config(Some(config_path))?;
    let mut chart = DonutChart::from_config(&cfg);
    render(&mut chart, output)?;

    let (tx, rx) = async_channel::bounded(32);
    runtime::start_background_services(config_path.to_path_buf(), tx)?;

    while let Ok(event) = rx.recv_blocking() {
        match event {
            AppEvent::ConfigReload => {
                let Some(cfg) = reload(config_path) else {
                    continue;
                };
                chart.apply_config(&cfg);
                if let Err(e) = render(&mut chart, output) {
                    log::error!("{:#}", e);
                }
            }
            AppEvent::WatcherStopped => break,
        }
    }
    Ok(())
}
