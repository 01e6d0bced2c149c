use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use genstudio::art::Studio;
use genstudio::config::RenderConfig;
use genstudio::scheduler::{Animator, TickOutcome, VirtualHost, Viewport};
use genstudio::styles::ArtStyle;
use genstudio::surface::Surface;

#[derive(Parser)]
struct Opts {
    /// Log more; repeat for trace output.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one still picture to a PNG.
    Render {
        #[clap(flatten)]
        config: RenderConfig,
        #[clap(short, long, default_value = "artwork.png")]
        output: PathBuf,
    },
    /// Run the animation loop headlessly and write every drawn frame.
    Animate {
        #[clap(flatten)]
        config: RenderConfig,
        /// Number of frames to write.
        #[clap(long, default_value_t = 30)]
        frames: u64,
        /// Virtual milliseconds between frame callbacks.
        #[clap(long, default_value_t = 1000.0 / 60.0)]
        step_ms: f64,
        /// Device pixel ratio of the virtual display.
        #[clap(long, default_value_t = 1.0)]
        dpr: f64,
        #[clap(short, long, default_value = "frames")]
        output_dir: PathBuf,
    },
    /// List the available styles.
    Styles,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn render(config: &RenderConfig, output: &Path) -> anyhow::Result<()> {
    let settings = config.settings().context("loading settings")?;
    let style = ArtStyle::from_name_or_default(&config.style);
    let mut studio = Studio::new();
    studio.set_seed(settings.seed.as_deref());
    let surface = studio
        .render(style, &settings, config.width, config.height)
        .context("rendering")?;
    surface
        .save_png(output)
        .with_context(|| format!("writing {}", output.display()))?;
    eprintln!("wrote png: {}", output.display());
    Ok(())
}

fn animate(
    config: &RenderConfig,
    frames: u64,
    step_ms: f64,
    dpr: f64,
    output_dir: &Path,
) -> anyhow::Result<()> {
    if !(step_ms > 0.0) {
        bail!("--step-ms must be positive, got {}", step_ms);
    }
    let settings = config.settings().context("loading settings")?;
    let style = ArtStyle::from_name_or_default(&config.style);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let mut studio = Studio::new();
    studio.set_seed(settings.seed.as_deref());
    let mut visible = Surface::new(config.width, config.height).context("creating canvas")?;
    visible.clear(settings.background());

    let mut host = VirtualHost::new();
    let mut animator = Animator::new();
    animator.set_viewport(Viewport::fitted(
        f64::from(config.width),
        f64::from(config.height),
        dpr,
    ));
    animator.start(&mut host, style, &settings);

    let mut written = 0;
    while written < frames {
        host.advance(step_ms);
        let Some(id) = host.take_pending() else {
            break;
        };
        match animator.tick(&mut host, id, &mut studio, &mut visible) {
            TickOutcome::Drawn => {
                let path = output_dir.join(format!("frame-{:05}.png", animator.frame_count()));
                visible
                    .save_png(&path)
                    .with_context(|| format!("writing {}", path.display()))?;
                written += 1;
            }
            TickOutcome::Dropped => {}
            other => bail!("animation ended after {} frames: {:?}", written, other),
        }
    }
    animator.stop(&mut host);
    eprintln!("wrote {} frames to {}", written, output_dir.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(opts.verbose);
    match &opts.command {
        Command::Render { config, output } => render(config, output),
        Command::Animate {
            config,
            frames,
            step_ms,
            dpr,
            output_dir,
        } => animate(config, *frames, *step_ms, *dpr, output_dir),
        Command::Styles => {
            for style in ArtStyle::ALL {
                println!("{:<24} {}", style.name(), style.display_name());
            }
            Ok(())
        }
    }
}
