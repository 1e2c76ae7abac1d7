//! Demo bootstrap: runs the banner against the in-memory document.
//!
//! Simulates a browser session on the event loop: a frame timer advances the
//! animation clock, and scripted resize events move the viewport width
//! around, re-syncing the banner height and flipping its orientation
//! whenever the configured breakpoint is crossed.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context as _};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopSignal};
use clap::Parser;
use split_banner::scene::document::Document;
use split_banner::{Banner, Clock, Options, Timings, Viewport};
use split_banner_config::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(name = "split-banner")]
#[command(about = "Simulate the split banner animation cycle")]
struct Cli {
    /// Path to a KDL configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Starting viewport width in CSS pixels.
    #[arg(long, default_value_t = 1280.)]
    width: f64,

    /// Number of images on the left side of the simulated page.
    #[arg(long, default_value_t = 3)]
    left: usize,

    /// Number of images on the right side of the simulated page.
    #[arg(long, default_value_t = 3)]
    right: usize,

    /// Scripted viewport resizes as ms:width pairs, e.g. 4000:800.
    #[arg(long = "resize", value_parser = parse_resize)]
    resizes: Vec<ResizeEvent>,

    /// How long to run the simulation, in milliseconds.
    #[arg(long, default_value_t = 12000)]
    run_for_ms: u64,

    /// Print the final document markup before exiting.
    #[arg(long)]
    print_markup: bool,
}

#[derive(Debug, Clone, Copy)]
struct ResizeEvent {
    at: Duration,
    width: f64,
}

fn parse_resize(value: &str) -> Result<ResizeEvent, String> {
    let (at, width) = value
        .split_once(':')
        .ok_or_else(|| format!("expected ms:width, got {value:?}"))?;
    let at = at
        .parse::<u64>()
        .map_err(|err| format!("bad time {at:?}: {err}"))?;
    let width = width
        .parse::<f64>()
        .map_err(|err| format!("bad width {width:?}: {err}"))?;
    Ok(ResizeEvent {
        at: Duration::from_millis(at),
        width,
    })
}

struct State {
    clock: Clock,
    start: Instant,
    document: Document,
    viewport: Viewport,
    banner: Banner,
    stop: LoopSignal,
}

impl State {
    fn tick(&mut self) {
        self.clock.advance_to(self.start.elapsed());
        if let Err(err) = self.banner.advance(&mut self.document, &mut self.viewport) {
            warn!("banner failed: {err:?}");
            self.stop.stop();
        }
    }

    fn on_resize(&mut self, width: f64) {
        info!("viewport resized to {width}");
        self.document.set_layout_width(width);

        match self.viewport.set_width(width) {
            Some(orientation) => {
                self.banner.destroy();
                let result = self.banner.initialize(
                    &mut self.document,
                    &mut self.viewport,
                    Options::new(orientation),
                );
                if let Err(err) = result {
                    warn!("banner failed to reinitialize: {err:?}");
                    self.stop.stop();
                }
            }
            None => self.banner.sync_height(&mut self.document, &self.viewport),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("split_banner=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err:?}");
                bail!("error loading config from {path:?}");
            }
        },
        None => Config::default(),
    };

    let clock = Clock::new();
    clock.set_rate(1. / config.animations.slowdown.max(0.001));

    let (mut document, container) =
        Document::host_page(clock.clone(), cli.width, cli.left, cli.right, true);
    let mut viewport = Viewport::new(cli.width, f64::from(config.breakpoint.max_width));
    let mut banner = Banner::new(container, clock.clone(), Timings::from_config(&config.animations));

    let mut event_loop: EventLoop<State> = EventLoop::try_new().context("error creating event loop")?;
    let handle = event_loop.handle();

    handle
        .insert_source(Timer::immediate(), |_, _, state: &mut State| {
            state.tick();
            TimeoutAction::ToDuration(FRAME_INTERVAL)
        })
        .unwrap();

    for resize in &cli.resizes {
        let width = resize.width;
        handle
            .insert_source(Timer::from_duration(resize.at), move |_, _, state: &mut State| {
                state.on_resize(width);
                TimeoutAction::Drop
            })
            .unwrap();
    }

    handle
        .insert_source(
            Timer::from_duration(Duration::from_millis(cli.run_for_ms)),
            |_, _, state: &mut State| {
                state.stop.stop();
                TimeoutAction::Drop
            },
        )
        .unwrap();

    let mut options = Options::new(viewport.orientation());
    options.animations_off = config.animations.off;
    banner
        .initialize(&mut document, &mut viewport, options)
        .context("error initializing the banner")?;

    info!(
        "running for {}ms at width {} ({:?})",
        cli.run_for_ms,
        cli.width,
        viewport.orientation(),
    );

    let mut state = State {
        clock,
        start: Instant::now(),
        document,
        viewport,
        banner,
        stop: event_loop.get_signal(),
    };

    event_loop
        .run(None, &mut state, |_| {})
        .context("error running the event loop")?;

    info!("simulation finished");
    if cli.print_markup {
        println!("{}", state.document.to_markup());
    }

    Ok(())
}
