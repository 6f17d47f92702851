use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Parser};

use paint_plugins::{Color, Event, Host, HostConfig, PixelBuffer, PluginLoader, ToolKind, tools};

#[derive(Parser, Debug)]
#[command(name = "plugin_host")]
#[command(version, about = "Load paint tool plugins and drive them with scripted events")]
struct Cli {
    /// Plugin library to load (repeatable)
    #[arg(long = "plugin", short = 'p', value_name = "LIB")]
    plugins: Vec<PathBuf>,

    /// Also load every library in the configured plugin directories
    #[arg(long, action = ArgAction::SetTrue)]
    scan: bool,

    /// Register the built-in pencil tool and invert filter
    #[arg(long, short = 'b', action = ArgAction::SetTrue)]
    builtin: bool,

    /// Host configuration (JSON)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Image to edit; a blank 256x256 image when omitted
    #[arg(long, short = 'i', value_name = "PNG")]
    image: Option<PathBuf>,

    /// JSON list of events to replay
    #[arg(long, short = 'e', value_name = "FILE")]
    events: Option<PathBuf>,

    /// Name of the tool that receives image mouse events
    #[arg(long, short = 'a', value_name = "NAME")]
    activate: Option<String>,

    /// Where to write the edited image
    #[arg(long, short = 'o', value_name = "PNG")]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };

    let loader = PluginLoader::from_config(&config);
    let mut host = Host::with_global_context(config);

    if cli.builtin {
        host.load_module(tools::register_builtin);
    }

    for path in &cli.plugins {
        // SAFETY: the user asked for this library to be loaded.
        unsafe { loader.load_from_path(&mut host, path) }
            .with_context(|| format!("loading {}", path.display()))?;
    }

    if cli.scan {
        for dir in host.config().plugin_dirs.clone() {
            // SAFETY: the configured plugin directories are trusted.
            for result in unsafe { loader.load_all_from_dir(&mut host, &dir) } {
                if let Err(err) = result {
                    log::error!("skipping module in {}: {err}", dir.display());
                }
            }
        }
    }

    host.build_widgets()?;
    log_panel(&host);

    let active = match &cli.activate {
        Some(name) => Some(
            host.find_tool(name)
                .with_context(|| format!("no tool named {name}"))?,
        ),
        None => host
            .tools()
            .into_iter()
            .find(|info| info.kind == ToolKind::Tool)
            .map(|info| info.id),
    };
    if let Some(tool) = active {
        host.activate(tool)?;
    }

    let mut image = match &cli.image {
        Some(path) => {
            let decoded = image::open(path).with_context(|| format!("opening {}", path.display()))?;
            PixelBuffer::from_rgba_image(&decoded.to_rgba8())
        }
        None => PixelBuffer::new(256, 256, Color::WHITE),
    };

    if let Some(path) = &cli.events {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let events: Vec<Event> = serde_json::from_str(&json)?;
        let mut delivered = 0;
        for event in events {
            // Widget events get the same checks a GUI click or drag would.
            if let Err(err) = host.post(event) {
                log::warn!("{:?} not delivered: {err}", event.kind());
                continue;
            }
            delivered += host.dispatch_pending(Some(&mut image));
        }
        log::info!("replayed {delivered} events");
    }

    if let Some(path) = &cli.out {
        image
            .to_rgba_image()
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    host.shutdown();
    Ok(())
}

fn log_panel(host: &Host) {
    for info in host.tools() {
        log::info!(
            "{:?} {} '{}' ({}) [{}]",
            info.kind,
            info.id,
            info.name,
            info.texture,
            info.state.name()
        );
        host.with_registry(|registry| {
            for (id, widget) in registry.widgets_of(info.id) {
                log::info!("    {id} {} at {:?}", widget.kind.name(), widget.geometry);
            }
        });
    }
}
