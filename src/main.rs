//! Main application for the Unified Media Downloader demo

// Environment-driven configuration
mod config;
// Simulated download with progress and completion timers
mod downloader;
// Download tab
mod entry_screen;
// History tab
mod history_screen;
// Canned video information per platform
mod metadata;
// Download history records
mod model;
// URL platform detection and quality presets
mod platform;
// Cosmetic progress counter
mod progress;
// Hosted record store client
mod store;
// Thumbnail fetching module
mod thumbnail;

use config::read_config_from_env;
use entry_screen::EntryScreen;
use history_screen::HistoryScreen;
use store::{HistoryStore, RestHistoryStore};

// eframe/egui for GUI application framework
use eframe::{egui, App, Frame};
use egui::Visuals;
use std::{sync::Arc, time::Duration};
use tokio::runtime::{Handle, Runtime};
use tracing::{event, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

/// Program entry point: loads config, starts the runtime and launches the GUI
fn main() -> Result<(), eframe::Error> {
    let config = match read_config_from_env() {
        Ok(config) => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(EnvFilter::try_from_env("LOGGING_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")))
                .init();

            event!(Level::DEBUG, "Config loaded from env");

            config
        }
        Err(err) => {
            eprintln!("Error reading config from env: {err}");

            std::process::exit(1);
        }
    };

    // Runtime for timers and store calls; lives as long as the window
    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            event!(Level::ERROR, %err, "Error creating async runtime");

            std::process::exit(1);
        }
    };

    let store: Arc<dyn HistoryStore> = Arc::new(RestHistoryStore::new(&config.store));
    let handle = runtime.handle().clone();

    event!(Level::INFO, url = %config.store.url, "Starting app");

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Unified Media Downloader",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Visuals::light());
            Box::new(MediaDownloaderApp::new(handle, store))
        }),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Download,
    History,
}

/// Tab shell; each screen holds its own state and fetches from the store independently
struct MediaDownloaderApp {
    tab: Tab,
    entry: EntryScreen,
    history: HistoryScreen,
}

impl MediaDownloaderApp {
    fn new(runtime: Handle, store: Arc<dyn HistoryStore>) -> Self {
        Self {
            tab: Tab::Download,
            entry: EntryScreen::new(runtime.clone(), Arc::clone(&store)),
            history: HistoryScreen::new(runtime, store),
        }
    }
}

/// GUI update loop: called each frame to apply async results and redraw
impl App for MediaDownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.entry.poll();
        self.history.poll();

        egui::TopBottomPanel::bottom("tabs").show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Download, "⬇ Download");
                ui.selectable_value(&mut self.tab, Tab::History, "🕘 History");
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.tab {
            Tab::Download => self.entry.ui(ui),
            Tab::History => {
                self.history.mount();
                self.history.ui(ui);
            }
        });

        // Request periodic repaint for progress updates
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
