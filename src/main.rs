//! Application entry point: type-lines.
//!
//! # Startup sequence
//!
//! 1. Initialise logging and parse the command line.
//! 2. `--init-config`: write the default settings file and exit.
//! 3. Load [`AppConfig`] (defaults on first run).
//! 4. `--detect-keyboard`: wait for ENTER through a global listener.
//! 5. Build the [`HotkeyRouter`] and start the key-capture backend; exit 1
//!    if none can be started.
//! 6. Build the [`Session`] (sample list or empty) and import FILE.
//! 7. Run the egui window, or the headless [`SessionRunner`] on a
//!    current-thread tokio runtime until Ctrl-C.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use tokio::sync::mpsc;
use type_lines::{
    app::TypeLinesApp,
    clipboard::{ClipboardWatcher, SystemClipboard},
    config::{AppConfig, AppPaths, BackendChoice},
    hotkey::{
        detect_keyboard, key_name, start_key_source, HotkeyAction, HotkeyBinding, HotkeyRouter,
        KeyEvent, KeySource,
    },
    inject::TextInjector,
    lines::{sample_lines, LineList},
    session::{Session, SessionRunner},
};

/// Seconds `--detect-keyboard` waits for ENTER.
const DETECT_TIMEOUT_SECS: u64 = 10;

/// Key events buffered between the capture thread and the main loop.
const KEY_CHANNEL_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Type a list of text lines into the focused window, one hotkey at a time.
#[derive(Parser, Debug)]
#[command(name = "type-lines", version, about)]
struct Cli {
    /// List or template file to import at startup
    file: Option<PathBuf>,

    /// Global keyboard capture backend (overrides the settings file)
    #[arg(short, long, value_enum)]
    backend: Option<BackendChoice>,

    /// Wait for an ENTER key press to confirm the keyboard is seen
    #[arg(short, long)]
    detect_keyboard: bool,

    /// Run without a window; hotkeys and the clipboard hook stay active
    #[arg(long)]
    headless: bool,

    /// Alternate settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the default settings file and exit
    #[arg(long)]
    init_config: bool,
}

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Type Lines")
        .with_inner_size(config.ui.window_size)
        .with_min_inner_size([360.0, 240.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings_file = cli
        .config
        .clone()
        .unwrap_or_else(|| AppPaths::new().settings_file);

    if cli.init_config {
        AppConfig::default().save_to(&settings_file)?;
        println!("wrote {}", settings_file.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = AppConfig::load_from(&settings_file).unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e:#}); using defaults");
        AppConfig::default()
    });
    log::info!("type-lines {} starting up", env!("CARGO_PKG_VERSION"));

    if cli.detect_keyboard {
        if let Err(e) = detect_keyboard(DETECT_TIMEOUT_SECS) {
            log::error!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    }

    // Hotkeys
    let binding = HotkeyBinding::from_config(&config.hotkey);
    let router = HotkeyRouter::new(binding, config.hotkey.start_enabled);
    let (key_tx, key_rx) = mpsc::channel::<KeyEvent>(KEY_CHANNEL_CAPACITY);

    let choice = cli.backend.unwrap_or(config.hotkey.backend);
    let listener = match start_key_source(choice, router.filter(), key_tx) {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    log_bindings(&binding);

    // Session
    let options = config.list.options();
    let list = if config.list.load_sample_list {
        LineList::with_lines(sample_lines(), options)
    } else {
        LineList::new(options)
    };
    let watcher = ClipboardWatcher::new(Duration::from_millis(config.clipboard.poll_interval_ms));
    let mut session = Session::new(list, router, watcher);
    session.set_backend(listener.name());

    let mut clipboard = SystemClipboard::new();
    if config.clipboard.hook_at_startup {
        session.set_clipboard_hook(true, &mut clipboard);
    }
    let injector = TextInjector::from_config(&config.inject);

    if cli.headless {
        if let Some(path) = &cli.file {
            session.import_with_defaults(path);
        }
        run_headless(session, injector, clipboard, key_rx)?;
        drop(listener);
        return Ok(ExitCode::SUCCESS);
    }

    let pending = cli.file.as_deref().and_then(|path| session.begin_import(path));
    let app = TypeLinesApp::new(session, key_rx, injector, clipboard, listener, pending);
    eframe::run_native(
        "type-lines",
        native_options(&config),
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok(ExitCode::SUCCESS)
}

fn run_headless(
    session: Session,
    injector: TextInjector,
    clipboard: SystemClipboard,
    key_rx: mpsc::Receiver<KeyEvent>,
) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // There is no Start button without a window.
    if !session.router().is_enabled() {
        session.router().set_enabled(true);
    }
    let runner = SessionRunner::new(session, Box::new(injector), Box::new(clipboard));

    rt.block_on(async {
        tokio::select! {
            _ = runner.run(key_rx) => {}
            signal = tokio::signal::ctrl_c() => match signal {
                Ok(()) => log::info!("interrupted, shutting down"),
                Err(e) => log::warn!("cannot listen for Ctrl-C: {e}"),
            },
        }
    });
    Ok(())
}

fn log_bindings(binding: &HotkeyBinding) {
    for action in HotkeyAction::ALL {
        log::info!("  {:<4} {}", key_name(binding.key_for(action)), action.label());
    }
}
