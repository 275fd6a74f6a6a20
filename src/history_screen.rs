//! History tab: stored download records, refresh and delete.

use crate::{
    model::{format_download_date, DownloadHistoryRecord},
    store::{HistoryStore, StoreError},
    thumbnail::ThumbnailCache,
};

use chrono::Local;
use eframe::egui::{self, Color32, RichText};
use std::sync::Arc;
use tokio::{
    runtime::Handle,
    sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
};
use tracing::{event, Level};

const DELETE_COLOR: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
const ROW_THUMBNAIL_SIZE: egui::Vec2 = egui::vec2(96.0, 54.0);

/// Result of a store call, applied on the next poll
#[derive(Debug)]
enum HistoryOutcome {
    Listed(Result<Vec<DownloadHistoryRecord>, StoreError>),
    Deleted { id: String, result: Result<(), StoreError> },
}

pub struct HistoryScreen {
    runtime: Handle,
    store: Arc<dyn HistoryStore>,
    /// Local copy of the store's rows, newest first
    records: Vec<DownloadHistoryRecord>,
    is_loading: bool,
    is_refreshing: bool,
    mounted: bool,
    thumbnails: ThumbnailCache,
    outcomes_tx: UnboundedSender<HistoryOutcome>,
    outcomes_rx: UnboundedReceiver<HistoryOutcome>,
}

impl HistoryScreen {
    pub fn new(runtime: Handle, store: Arc<dyn HistoryStore>) -> Self {
        let (outcomes_tx, outcomes_rx) = unbounded_channel();

        Self {
            thumbnails: ThumbnailCache::new(runtime.clone()),
            runtime,
            store,
            records: Vec::new(),
            is_loading: true,
            is_refreshing: false,
            mounted: false,
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub fn records(&self) -> &[DownloadHistoryRecord] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.is_refreshing
    }

    pub fn shows_empty_state(&self) -> bool {
        self.records.is_empty() && !self.is_loading
    }

    /// Loads the list the first time the screen is shown
    pub fn mount(&mut self) {
        if !self.mounted {
            self.mounted = true;
            self.fetch();
        }
    }

    /// Re-fetches the full list; overlapping refreshes are allowed and the last response wins
    pub fn refresh(&mut self) {
        self.is_refreshing = true;
        self.fetch();
    }

    fn fetch(&self) {
        let store = Arc::clone(&self.store);
        let outcomes_tx = self.outcomes_tx.clone();

        self.runtime.spawn(async move {
            let result = store.list_all().await;
            let _ = outcomes_tx.send(HistoryOutcome::Listed(result));
        });
    }

    pub fn delete(&mut self, id: &str) {
        let store = Arc::clone(&self.store);
        let outcomes_tx = self.outcomes_tx.clone();
        let id = id.to_owned();

        self.runtime.spawn(async move {
            let result = store.delete_by_id(&id).await;
            let _ = outcomes_tx.send(HistoryOutcome::Deleted { id, result });
        });
    }

    pub fn poll(&mut self) {
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.apply(outcome);
        }
    }

    fn apply(&mut self, outcome: HistoryOutcome) {
        match outcome {
            HistoryOutcome::Listed(Ok(records)) => {
                self.records = records;
                self.is_loading = false;
                self.is_refreshing = false;
            }
            HistoryOutcome::Listed(Err(err)) => {
                event!(Level::ERROR, %err, "Error fetching history");
                self.is_loading = false;
                self.is_refreshing = false;
            }
            HistoryOutcome::Deleted { id, result: Ok(()) } => {
                self.records.retain(|record| record.id != id);
            }
            HistoryOutcome::Deleted { result: Err(err), .. } => {
                event!(Level::ERROR, %err, "Error deleting item");
            }
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        self.thumbnails.load_finished(ui.ctx());

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.heading("Download History");
                let count = self.records.len();
                ui.label(RichText::new(format!("{count} {}", if count == 1 { "item" } else { "items" })).weak());
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(!self.is_refreshing(), egui::Button::new("⟳ Refresh")).clicked() {
                    self.refresh();
                }
                if self.is_loading() || self.is_refreshing() {
                    ui.spinner();
                }
            });
        });
        ui.separator();

        if self.shows_empty_state() {
            ui.vertical_centered(|ui| {
                ui.add_space(48.0);
                ui.label(RichText::new("🕘").size(48.0).weak());
                ui.heading("No Download History");
                ui.label(RichText::new("Your downloaded videos will appear here").weak());
            });
            return;
        }

        let mut to_delete = None;
        egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
            for record in &self.records {
                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        if let Some(url) = record.thumbnail_url.as_deref() {
                            if let Some(tex) = self.thumbnails.texture(ui.ctx(), url) {
                                ui.add(egui::Image::new(tex).fit_to_exact_size(ROW_THUMBNAIL_SIZE).rounding(4.0));
                            }
                        }
                        ui.vertical(|ui| history_row(ui, record));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button(RichText::new("🗑").color(DELETE_COLOR)).clicked() {
                                to_delete = Some(record.id.clone());
                            }
                        });
                    });
                });
            }
        });

        if let Some(id) = to_delete {
            self.delete(&id);
        }
    }

    #[cfg(test)]
    async fn settle(&mut self) {
        if let Some(outcome) = self.outcomes_rx.recv().await {
            self.apply(outcome);
        }
    }
}

fn history_row(ui: &mut egui::Ui, record: &DownloadHistoryRecord) {
    ui.label(RichText::new(&record.video_title).strong());

    ui.horizontal(|ui| {
        let platform = record.platform;
        ui.label(RichText::new(format!("{} {}", platform.icon(), platform)).color(platform.color()));
        ui.label("•");
        ui.label(record.quality.as_str());
        if let Some(duration) = &record.duration {
            ui.label("•");
            ui.label(duration);
        }
    });

    let date = record.download_date.with_timezone(&Local);
    ui.label(RichText::new(format!("🕘 {}", format_download_date(&date))).weak());
    ui.label(RichText::new(&record.file_name).monospace().small());
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        metadata::metadata_for,
        model::NewDownloadRecord,
        platform::{Platform, Quality},
        store::memory::MemoryStore,
    };

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::default());
        for (platform, quality) in [
            (Platform::YouTube, Quality::P720),
            (Platform::Instagram, Quality::P360),
            (Platform::Facebook, Quality::P1080),
        ] {
            let metadata = metadata_for(Some(platform)).unwrap();
            let record = NewDownloadRecord::new(format!("https://{platform}.example/v"), &metadata, quality);
            store.insert(record).await.unwrap();
        }
        store
    }

    fn screen(store: &Arc<MemoryStore>) -> HistoryScreen {
        HistoryScreen::new(Handle::current(), Arc::clone(store) as Arc<dyn HistoryStore>)
    }

    fn platforms(screen: &HistoryScreen) -> Vec<Platform> {
        screen.records().iter().map(|record| record.platform).collect()
    }

    #[tokio::test]
    async fn test_mount_loads_newest_first() {
        let store = seeded_store().await;
        let mut screen = screen(&store);
        assert!(screen.is_loading());
        assert!(!screen.shows_empty_state());

        screen.mount();
        screen.settle().await;

        assert!(!screen.is_loading());
        assert_eq!(platforms(&screen), [Platform::Facebook, Platform::Instagram, Platform::YouTube]);
    }

    #[tokio::test]
    async fn test_mount_fetches_once() {
        let store = seeded_store().await;
        let mut screen = screen(&store);

        screen.mount();
        screen.mount();
        screen.settle().await;
        tokio::task::yield_now().await;

        assert!(screen.outcomes_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_state_after_loading() {
        let store = Arc::new(MemoryStore::default());
        let mut screen = screen(&store);

        screen.mount();
        screen.settle().await;

        assert!(screen.shows_empty_state());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_list() {
        let store = seeded_store().await;
        let mut screen = screen(&store);
        screen.mount();
        screen.settle().await;

        store.fail_next();
        screen.refresh();
        assert!(screen.is_refreshing());
        screen.settle().await;

        assert!(!screen.is_refreshing());
        assert!(!screen.is_loading());
        assert_eq!(screen.records().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_rows() {
        let store = Arc::new(MemoryStore::default());
        let mut screen = screen(&store);
        screen.mount();
        screen.settle().await;
        assert!(screen.records().is_empty());

        let metadata = metadata_for(Some(Platform::YouTube)).unwrap();
        store
            .insert(NewDownloadRecord::new("https://youtu.be/abc123", &metadata, Quality::P480))
            .await
            .unwrap();

        screen.refresh();
        screen.settle().await;

        assert_eq!(screen.records().len(), 1);
        assert_eq!(screen.records()[0].quality, Quality::P480);
    }

    #[tokio::test]
    async fn test_delete_removes_local_and_stored_row() {
        let store = seeded_store().await;
        let mut screen = screen(&store);
        screen.mount();
        screen.settle().await;

        let id = screen.records()[1].id.clone();
        screen.delete(&id);
        screen.settle().await;

        assert_eq!(platforms(&screen), [Platform::Facebook, Platform::YouTube]);
        assert!(store.rows().iter().all(|row| row.id != id));
        assert_eq!(store.list_all().await.unwrap(), screen.records());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_local_list() {
        let store = seeded_store().await;
        let mut screen = screen(&store);
        screen.mount();
        screen.settle().await;

        screen.delete("does-not-exist");
        screen.settle().await;
        assert_eq!(screen.records().len(), 3);

        let id = screen.records()[0].id.clone();
        store.fail_next();
        screen.delete(&id);
        screen.settle().await;
        assert_eq!(screen.records().len(), 3);
        assert_eq!(store.rows().len(), 3);
    }

    #[tokio::test]
    async fn test_results_after_teardown_are_discarded() {
        let store = seeded_store().await;
        let mut screen = screen(&store);
        screen.mount();
        screen.delete(&store.rows()[0].id);
        drop(screen);

        // The delete still reaches the store, its result has nowhere to go
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_rows_request_their_thumbnails() {
        let store = Arc::new(MemoryStore::default());
        let metadata = metadata_for(Some(Platform::Instagram)).unwrap();
        let mut with_thumbnail = NewDownloadRecord::new("https://instagram.com/reel/1", &metadata, Quality::P360);
        // Unparseable, so the fetch fails without touching the network
        with_thumbnail.thumbnail_url = Some("not a url".to_owned());
        let mut without_thumbnail = with_thumbnail.clone();
        without_thumbnail.thumbnail_url = None;
        store.insert(with_thumbnail).await.unwrap();
        store.insert(without_thumbnail).await.unwrap();

        let mut screen = screen(&store);
        screen.mount();
        screen.settle().await;

        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| screen.ui(ui));
        });

        assert_eq!(screen.records().len(), 2);
        assert!(screen.thumbnails.texture(&ctx, "not a url").is_none());
        assert_eq!(screen.thumbnails.requested_count(), 1);
    }
}
