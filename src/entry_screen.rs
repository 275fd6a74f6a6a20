//! Download tab: URL input, detected platform, mock video info, quality picker and the simulated download.

use crate::{
    downloader::{DownloadRequest, DownloadSimulator, SimulationState},
    metadata::{metadata_for, VideoMetadata},
    platform::{detect_platform, Platform, Quality},
    store::HistoryStore,
    thumbnail::ThumbnailCache,
};

use eframe::egui::{self, Color32, RichText, TextEdit};
use std::sync::Arc;
use tokio::runtime::Handle;

const URL_PLACEHOLDER: &str = "https://youtube.com/watch?v=...";
const ACCENT: Color32 = Color32::from_rgb(0x25, 0x63, 0xeb);
const SUCCESS: Color32 = Color32::from_rgb(0x16, 0xa3, 0x4a);

pub struct EntryScreen {
    url_input: String,
    platform: Option<Platform>,
    metadata: Option<VideoMetadata>,
    selected_quality: Quality,
    simulator: DownloadSimulator,
    thumbnails: ThumbnailCache,
}

impl EntryScreen {
    pub fn new(runtime: Handle, store: Arc<dyn HistoryStore>) -> Self {
        Self {
            simulator: DownloadSimulator::new(runtime.clone(), store),
            thumbnails: ThumbnailCache::new(runtime),
            url_input: String::new(),
            platform: None,
            metadata: None,
            selected_quality: Quality::default(),
        }
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    pub fn metadata(&self) -> Option<&VideoMetadata> {
        self.metadata.as_ref()
    }

    pub fn selected_quality(&self) -> Quality {
        self.selected_quality
    }

    pub fn simulator(&self) -> &DownloadSimulator {
        &self.simulator
    }

    #[cfg(test)]
    pub fn set_url(&mut self, text: impl Into<String>) {
        self.url_input = text.into();
        self.on_url_changed();
    }

    /// Re-detects the platform; any edit also drops the current download attempt.
    fn on_url_changed(&mut self) {
        self.platform = detect_platform(&self.url_input);
        self.metadata = metadata_for(self.platform);
        self.simulator.reset();
    }

    pub fn select_quality(&mut self, quality: Quality) {
        self.selected_quality = quality;
    }

    /// Starts a simulated download of the detected video. No-op without metadata or while running.
    pub fn start_download(&mut self) -> bool {
        let Some(metadata) = self.metadata.clone() else {
            return false;
        };

        self.simulator.start(DownloadRequest {
            url: self.url_input.clone(),
            metadata,
            quality: self.selected_quality,
        })
    }

    pub fn poll(&mut self) {
        self.simulator.poll();
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.thumbnails.load_finished(ui.ctx());

        egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new("🎬 Unified Media Downloader").color(ACCENT).strong());
                ui.label(RichText::new("Educational Demo - URL Pattern Detection").weak());
            });
            ui.add_space(16.0);

            ui.label(RichText::new("Paste Video URL").strong());
            let response = ui.add(
                TextEdit::singleline(&mut self.url_input)
                    .hint_text(URL_PLACEHOLDER)
                    .desired_width(f32::INFINITY),
            );
            if response.changed() {
                self.on_url_changed();
            }

            if let Some(platform) = self.platform() {
                ui.label(
                    RichText::new(format!("{} {} Detected", platform.icon(), platform.label()))
                        .color(platform.color())
                        .strong(),
                );
            }

            if let Some(metadata) = self.metadata().cloned() {
                ui.add_space(16.0);
                ui.group(|ui| self.video_panel(ui, &metadata));
            }
        });
    }

    fn video_panel(&mut self, ui: &mut egui::Ui, metadata: &VideoMetadata) {
        ui.heading("Video Information");

        if let Some(tex) = self.thumbnails.texture(ui.ctx(), &metadata.thumbnail) {
            ui.add(egui::Image::new(tex).max_width(ui.available_width()).rounding(8.0));
        }

        egui::Grid::new("video_info").num_columns(2).show(ui, |ui| {
            ui.label("Title:");
            ui.label(&metadata.title);
            ui.end_row();
            ui.label("Duration:");
            ui.label(&metadata.duration);
            ui.end_row();
            ui.label("Platform:");
            ui.label(metadata.platform.label());
            ui.end_row();
        });

        ui.add_space(8.0);
        ui.label(RichText::new("Select Quality").strong());
        ui.horizontal(|ui| {
            for quality in Quality::ALL {
                if ui.selectable_label(self.selected_quality() == quality, quality.as_str()).clicked() {
                    self.select_quality(quality);
                }
            }
        });

        ui.add_space(8.0);
        match self.simulator().state() {
            SimulationState::Running => {
                let progress = self.simulator.progress();
                ui.add(egui::ProgressBar::new(f32::from(progress) / 100.0).text(format!("{progress}%")));
            }
            SimulationState::Completed => {
                ui.label(RichText::new("Demo download completed successfully!").color(SUCCESS));
                if let Some(file_name) = self.simulator.stored_file_name() {
                    ui.label(RichText::new(format!("Saved to history as {file_name}")).weak().small());
                }
            }
            SimulationState::Idle => {}
        }

        let label = if self.simulator.is_running() {
            "Downloading..."
        } else {
            "Start Demo Download"
        };
        if ui.add_enabled(!self.simulator.is_running(), egui::Button::new(label)).clicked() {
            self.start_download();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{downloader::COMPLETION_DELAY, store::memory::MemoryStore};
    use std::time::Duration;
    use tokio::time;

    fn screen(store: &Arc<MemoryStore>) -> EntryScreen {
        EntryScreen::new(Handle::current(), Arc::clone(store) as Arc<dyn HistoryStore>)
    }

    #[tokio::test]
    async fn test_live_detection() {
        let store = Arc::new(MemoryStore::default());
        let mut screen = screen(&store);

        screen.set_url("https://instagram.com/reel/1");
        assert_eq!(screen.platform(), Some(Platform::Instagram));
        assert_eq!(screen.metadata().unwrap().duration, "0:45");

        screen.set_url("https://vimeo.com/1");
        assert_eq!(screen.platform(), None);
        assert!(screen.metadata().is_none());
    }

    #[tokio::test]
    async fn test_download_requires_detected_platform() {
        let store = Arc::new(MemoryStore::default());
        let mut screen = screen(&store);

        screen.set_url("not a video");

        assert!(!screen.start_download());
        assert_eq!(screen.simulator().state(), SimulationState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_youtube_download_end_to_end() {
        let store = Arc::new(MemoryStore::default());
        let mut screen = screen(&store);

        screen.set_url("https://youtu.be/abc123");
        assert_eq!(screen.platform(), Some(Platform::YouTube));
        let metadata = screen.metadata().unwrap();
        assert_eq!(metadata.title, "Educational Tutorial - Building Mobile Apps");
        assert_eq!(metadata.duration, "12:34");

        assert_eq!(screen.selected_quality(), Quality::P720);
        screen.select_quality(Quality::P1080);
        assert!(screen.start_download());

        time::sleep(COMPLETION_DELAY + Duration::from_millis(100)).await;
        screen.poll();
        assert_eq!(screen.simulator().state(), SimulationState::Completed);

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quality, Quality::P1080);
        assert_eq!(rows[0].platform, Platform::YouTube);
        assert_eq!(rows[0].file_name, "Educational_Tutorial___Building_Mobile_Apps_1080p.mp4");
        assert_eq!(rows[0].video_url, "https://youtu.be/abc123");
        assert_eq!(screen.simulator().stored_file_name(), Some(rows[0].file_name.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_url_resets_completion() {
        let store = Arc::new(MemoryStore::default());
        let mut screen = screen(&store);

        screen.set_url("https://fb.watch/abc");
        screen.start_download();
        time::sleep(COMPLETION_DELAY + Duration::from_millis(100)).await;
        screen.poll();
        assert_eq!(screen.simulator().state(), SimulationState::Completed);

        screen.set_url("https://youtube.com/watch?v=2");
        assert_eq!(screen.simulator().state(), SimulationState::Idle);
        assert_eq!(screen.simulator().stored_file_name(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_url_edit_cancels_running_download() {
        let store = Arc::new(MemoryStore::default());
        let mut screen = screen(&store);

        screen.set_url("https://youtube.com/watch?v=1");
        screen.start_download();
        time::sleep(Duration::from_millis(600)).await;

        screen.set_url("https://instagram.com/p/2");
        time::sleep(COMPLETION_DELAY).await;
        screen.poll();

        assert_eq!(screen.simulator().state(), SimulationState::Idle);
        assert!(store.rows().is_empty());
    }
}
