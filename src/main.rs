mod animator;
mod config;
mod error;
mod photos;
mod status;
mod surface;
mod term;
mod transport;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute, terminal,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use animator::HeartRain;
use animator::host::RenderTarget;
use config::{Config, Settings};
use error::{AppError, Result};
use photos::PhotoLibrary;
use status::{StatusLine, StatusView};
use surface::{ColorMode, RenderMode, TermSurface};
use term::{FrameClock, TermViewport};
use transport::{Action, Gallery, Slideshow, Transport};

type Rain = HeartRain<TermSurface, TermViewport, FrameClock, StdRng>;

#[derive(Parser)]
#[command(name = "heartreel", about = "Terminal photo slideshow with falling hearts")]
struct Cli {
    /// Photo files, in display order (relative to --photos-dir when given)
    #[arg(long, num_args = 1..)]
    photos: Vec<String>,

    /// Photo directory (scanned when no --photos are given)
    #[arg(long)]
    photos_dir: Option<PathBuf>,

    /// Track length in seconds
    #[arg(short, long)]
    duration: Option<f64>,

    /// Seconds between photo changes while playing
    #[arg(short, long)]
    interval: Option<f64>,

    /// Render mode
    #[arg(short, long, value_enum)]
    render: Option<RenderMode>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Target FPS (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// Fixed seed for the heart field
    #[arg(long)]
    seed: Option<u64>,

    /// Hide the status bar
    #[arg(long)]
    clean: bool,

    /// Start playing immediately
    #[arg(long)]
    autoplay: bool,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Print the config file path and exit
    #[arg(long)]
    show_config: bool,

    /// Print a commented config template and exit
    #[arg(long)]
    init_config: bool,
}

impl Cli {
    /// Command-line values as a settings layer.
    fn overrides(&self) -> Config {
        Config {
            photos: (!self.photos.is_empty()).then(|| self.photos.clone()),
            photos_dir: self.photos_dir.clone(),
            duration: self.duration,
            interval: self.interval,
            render: self.render,
            color: self.color,
            fps: self.fps,
            clean: self.clean.then_some(true),
            autoplay: self.autoplay.then_some(true),
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref())?;

    if cli.init_config {
        print!("{}", config::default_config_string());
        return Ok(());
    }
    if cli.show_config {
        let path = config::config_path().ok_or(AppError::NoConfigDir)?;
        println!("{}", path.display());
        return Ok(());
    }

    let settings = Settings::resolve(cli.overrides(), config::load_config());
    let photos = match (&settings.photos_dir, settings.photos.is_empty()) {
        (Some(dir), true) => photos::scan_dir(dir)?,
        _ => settings.photos.clone(),
    };
    let mut library = PhotoLibrary::new(settings.photos_dir.as_deref(), &photos);
    let mut show = Slideshow::new(
        Transport::new(settings.duration),
        Gallery::new(photos, settings.interval),
    );
    if settings.autoplay {
        show.play();
    }

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        event::EnableMouseCapture
    )?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let result = run_loop(&mut writer, &settings, &mut show, &mut library);

    // Cleanup
    execute!(
        writer,
        event::DisableMouseCapture,
        cursor::Show,
        terminal::LeaveAlternateScreen
    )?;
    terminal::disable_raw_mode()?;

    result
}

/// Send `tracing` output to a file. The alternate screen owns stderr, so
/// without `--log` nothing is installed.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).map_err(|source| AppError::LogFile {
        path: path.to_path_buf(),
        source,
    })?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn status_rows(hidden: bool) -> u16 {
    if hidden { 0 } else { 1 }
}

fn run_loop(
    stdout: &mut BufWriter<io::Stdout>,
    settings: &Settings,
    show: &mut Slideshow,
    library: &mut PhotoLibrary,
) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut hide_status = settings.clean;

    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(seed, cols, rows, render = ?settings.render, "starting");

    let mut rain: Rain = HeartRain::new(
        TermSurface::new(settings.render, settings.color),
        TermViewport::new(cols, rows, status_rows(hide_status), settings.render),
        FrameClock::new(settings.fps),
        StdRng::seed_from_u64(seed),
    );

    let mut last_tick = Instant::now();
    let mut fps = 0.0_f64;
    let mut held_position: Option<f64> = None;
    let mut status_line = StatusLine {
        text: String::new(),
        bar: None,
    };
    let mut full_clear = true;

    loop {
        let timeout = rain
            .scheduler()
            .time_until_due()
            .unwrap_or_else(|| rain.scheduler().interval());

        // Handle input, waiting at most until the next frame is due
        let mut resized = None;
        let mut relayout = false;
        if event::poll(timeout)? {
            loop {
                match event::read()? {
                    Event::Resize(w, h) => resized = Some((w, h)),
                    Event::Key(KeyEvent {
                        code,
                        modifiers,
                        kind: KeyEventKind::Press,
                        ..
                    }) => match code {
                        KeyCode::Char('q') | KeyCode::Esc => {
                            rain.destroy();
                            return Ok(());
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            rain.destroy();
                            return Ok(());
                        }
                        KeyCode::Char(' ') => show.apply(Action::TogglePlay),
                        KeyCode::Left | KeyCode::Char('p') => show.apply(Action::Previous),
                        KeyCode::Right | KeyCode::Char('n') => show.apply(Action::Next),
                        // Toggle status bar
                        KeyCode::Char('h') => {
                            hide_status = !hide_status;
                            relayout = true;
                        }
                        _ => {}
                    },
                    Event::Mouse(MouseEvent {
                        kind, column, row, ..
                    }) => {
                        let on_status = !hide_status && row + 1 == rain.viewport().terminal_size().1;
                        let target = on_status
                            .then(|| status_line.seek_target(column as usize))
                            .flatten();
                        match kind {
                            MouseEventKind::Down(MouseButton::Left) if target.is_some() => {
                                held_position = Some(show.transport.position());
                            }
                            MouseEventKind::Up(MouseButton::Left) => {
                                if held_position.take().is_some()
                                    && let Some(fraction) = target
                                {
                                    show.apply(Action::Seek(fraction));
                                }
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        if let Some((w, h)) = resized {
            rain.viewport_mut().set_terminal_size(w, h);
            relayout = true;
        }
        if relayout {
            rain.viewport_mut().set_reserved_rows(status_rows(hide_status));
            rain.resize();
            full_clear = true;
        }

        // Timing
        let now = Instant::now();
        show.tick(now.duration_since(last_tick).as_secs_f64());
        last_tick = now;

        if rain.pump() == 0 {
            continue;
        }
        let ms = rain.last_elapsed_ms();
        if ms > 0.0 {
            fps = if fps == 0.0 { 1000.0 / ms } else { fps * 0.9 + 100.0 / ms };
        }

        if full_clear {
            stdout.write_all(b"\x1b[2J")?;
            full_clear = false;
        }
        stdout.write_all(b"\x1b[H")?;
        let (width, height) = rain.surface().backing_size();
        let backdrop = library.backdrop(show.gallery.crossfade(), width, height);
        stdout.write_all(rain.surface().present(backdrop).as_bytes())?;

        if !hide_status {
            let (cols, rows) = rain.viewport().terminal_size();
            let view = StatusView {
                show,
                held_position,
                fps,
            };
            status_line = status::layout(&view, cols as usize);
            stdout.write_all(status_line.draw(rows).as_bytes())?;
        }

        // Single flush per frame
        stdout.flush()?;
    }
}
