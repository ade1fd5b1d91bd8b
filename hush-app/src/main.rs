//! hush - colored noise in the terminal
//!
//! White, pink, brown and purple noise with a phosphor-green interface.

mod config;

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame, Terminal,
};
use ringbuf::{
    traits::{Consumer, Split},
    HeapCons, HeapRb,
};
use tracing_subscriber::EnvFilter;

use config::Config;
use hush_assets::{AssetCache, DirOrigin, Manifest};
use hush_audio::{AudioCommand, AudioEngine, CpalBackend, PlaybackController};
use hush_input::{Command, InputHandler};
use hush_tui::{
    App, HelpWidget, NoiseSelectorWidget, StatusBarWidget, Theme, TransportWidget,
    VolumeMeterWidget,
};

/// Frame rate for UI updates
const FPS: u64 = 30;

/// Meter tap capacity in samples (a few frames of audio at 48 kHz)
const METER_CAPACITY: usize = 16384;

fn main() -> anyhow::Result<()> {
    init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "hush starting");

    let mut config = Config::load();
    let (help, banner) = load_assets(&config);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let (cmd_tx, cmd_rx, evt_tx, evt_rx) = AudioEngine::create_channels();
    let (meter_tx, meter_rx) = HeapRb::<f32>::new(METER_CAPACITY).split();

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_audio = shutdown.clone();

    // The stream is created, driven and dropped on this thread
    let buffer_frames = config.buffer_frames;
    let volume = config.volume;
    let audio_handle = thread::Builder::new()
        .name("hush-audio".into())
        .spawn(move || {
            let backend = CpalBackend::new(buffer_frames).with_tap(meter_tx);
            PlaybackController::with_volume(backend, volume).run(cmd_rx, evt_tx, shutdown_audio);
        })?;

    let engine = AudioEngine::new(cmd_tx, evt_rx);

    let mut app = App::new();
    app.state.set_assets(help, banner);
    app.state.session.volume = config.volume;
    if config.noise.is_none() {
        app.state.set_message("Pick a noise: 1-4 or w/p/b/u | ? for help");
    } else {
        app.state.set_message(format!(
            "Last session: {} Noise | ? for help",
            config.noise.label()
        ));
    }

    let result = run_app(&mut terminal, &mut app, &engine, meter_rx);

    // Cleanup
    engine.shutdown();
    shutdown.store(true, Ordering::SeqCst);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if audio_handle.join().is_err() {
        tracing::error!("Audio thread panicked");
    }

    // Remember the last color and volume for next time
    if !app.state.session.color.is_none() {
        config.noise = app.state.session.color;
    }
    config.volume = app.state.session.volume;
    if let Err(e) = config.save() {
        tracing::warn!("Failed to save config: {}", e);
    }

    tracing::info!("hush stopped");
    result
}

/// Log to a file so the terminal UI stays intact
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hush");

    let file = fs::create_dir_all(&log_dir).and_then(|_| {
        File::options()
            .create(true)
            .append(true)
            .open(log_dir.join("hush.log"))
    });

    let Ok(file) = file else {
        // No log file: keep running without logging
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

/// Install the asset manifest, purge stale caches and read help and banner text
///
/// Every failure here is non-fatal: missing assets fall back to built-in text.
fn load_assets(config: &Config) -> (Option<String>, Option<String>) {
    let cache = match AssetCache::open(&AssetCache::default_path()) {
        Ok(cache) => cache,
        Err(e) => {
            tracing::warn!("Asset cache unavailable: {}", e);
            return (None, None);
        }
    };

    let origin_root = config.asset_origin.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hush")
            .join("assets")
    });
    let origin = DirOrigin::new(origin_root);
    let manifest = Manifest::default();

    // Offline or partial origin: keep whatever is already cached
    if let Err(e) = cache.install(&manifest, &origin) {
        tracing::warn!(origin = %origin.root().display(), "Asset install skipped: {}", e);
    }

    match cache.activate(&[manifest.cache_name.as_str()]) {
        Ok(purged) if !purged.is_empty() => {
            tracing::info!(purged = purged.len(), "Old asset caches removed");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Asset cache activation failed: {}", e),
    }

    let read = |path: &str| match cache.fetch(path, &origin) {
        Ok(body) => Some(String::from_utf8_lossy(&body).into_owned()),
        Err(e) => {
            tracing::debug!(path, "Asset unavailable: {}", e);
            None
        }
    };

    (read("/help.txt"), read("/banner.txt"))
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    engine: &AudioEngine,
    mut meter: HeapCons<f32>,
) -> anyhow::Result<()> {
    let mut input_handler = InputHandler::new();

    let frame_duration = Duration::from_millis(1000 / FPS);
    let mut last_frame = Instant::now();

    loop {
        if app.should_quit || engine.is_shutdown() {
            break;
        }

        // Process audio events
        while let Ok(event) = engine.event_rx.try_recv() {
            app.state.handle_audio_event(event);
        }

        app.state.meter.update(meter.pop_iter());
        app.state.frame_count = app.state.frame_count.wrapping_add(1);

        terminal.draw(|frame| render_ui(frame, app))?;

        // Handle input
        let timeout = frame_duration.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(cmd) = input_handler.handle_key(key) {
                        handle_command(app, engine, cmd);
                    }

                    app.state.set_mode(input_handler.mode());
                    app.state.command_buffer = input_handler.command_buffer().to_string();
                }
            }
        }

        // Maintain frame rate
        let elapsed = last_frame.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
        last_frame = Instant::now();
    }

    Ok(())
}

fn handle_command(app: &mut App, engine: &AudioEngine, cmd: Command) {
    tracing::debug!(?cmd, "Input command");
    match cmd {
        Command::SelectNoise(color) => {
            engine.send(AudioCommand::SelectNoise(color));
            app.state.clear_message();
        }

        // Transport
        Command::TogglePlayback => {
            if app.state.transport_enabled() {
                engine.send(AudioCommand::TogglePlayback);
            } else {
                app.state.set_warning("Select a noise color first");
            }
        }
        Command::Play => {
            if app.state.transport_enabled() {
                engine.send(AudioCommand::Play);
            } else {
                app.state.set_warning("Select a noise color first");
            }
        }
        Command::Pause => engine.send(AudioCommand::Pause),

        // Volume
        Command::SetVolume(volume) => {
            engine.send(AudioCommand::SetVolume(volume));
            app.state
                .set_success(format!("Volume {}%", (volume * 100.0).round() as u32));
        }
        Command::AdjustVolume(delta) => engine.send(AudioCommand::AdjustVolume(delta)),

        // UI
        Command::ToggleHelp => app.state.toggle_help(),
        Command::HelpScrollUp => app.state.help_scroll_up(),
        Command::HelpScrollDown => app.state.help_scroll_down(),
        Command::EnterCommandMode | Command::EnterNormalMode => {}
        Command::Cancel => app.state.clear_message(),

        Command::Quit => app.quit(),
        Command::ExecuteCommand(input) => {
            app.state.set_error(format!("Unknown command: {}", input));
        }
    }
}

fn render_ui(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let state = &app.state;
    let theme = &state.theme;

    // Clear with background
    frame.render_widget(Block::default().style(theme.normal()), area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Title
        Constraint::Length(3), // Noise selector
        Constraint::Length(5), // Transport
        Constraint::Length(4), // Meters
        Constraint::Min(0),
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], &state.banner_text, theme);

    frame.render_widget(NoiseSelectorWidget::new(state.session.color, theme), chunks[1]);
    frame.render_widget(TransportWidget::new(&state.session, theme), chunks[2]);
    frame.render_widget(
        VolumeMeterWidget::new(state.session.volume, theme)
            .level(state.meter.level, state.meter.peak_hold),
        chunks[3],
    );
    frame.render_widget(
        StatusBarWidget::new(state.mode, &state.command_buffer, theme)
            .message(state.message.as_deref(), state.message_type),
        chunks[5],
    );

    if state.show_help {
        let help_area = centered_rect(56, area.height.saturating_sub(2), area);
        frame.render_widget(Clear, help_area);
        frame.render_widget(
            HelpWidget::new(&state.help_text, theme).scroll(state.help_scroll),
            help_area,
        );
    }
}

fn render_title(frame: &mut Frame, area: Rect, banner: &str, theme: &Theme) {
    let title_text = format!(" {} ", banner.lines().next().unwrap_or("hush"));
    let title_len = title_text.chars().count();
    let width = area.width as usize;
    let padding = width.saturating_sub(title_len) / 2;
    let padded = format!(
        "{:═<pad$}{}{:═<rest$}",
        "",
        title_text,
        "",
        pad = padding,
        rest = width.saturating_sub(padding + title_len)
    );

    let line = Line::from(Span::styled(padded, theme.title()));
    frame.render_widget(Paragraph::new(line), area);
}

/// Create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
