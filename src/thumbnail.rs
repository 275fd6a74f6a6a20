use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{event, Level};

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] image::ImageError),
}

/// Downloads and decodes the thumbnail behind `url`. Blocking, run it off the UI thread.
pub fn fetch_thumbnail(url: &str) -> Result<ColorImage, ThumbnailError> {
    let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    decode_thumbnail(&bytes)
}

/// Converts encoded image bytes into an egui image without premultiplying alpha
pub fn decode_thumbnail(bytes: &[u8]) -> Result<ColorImage, ThumbnailError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, &img))
}

/// Textures keyed by thumbnail URL, fetched once each on the blocking pool
pub struct ThumbnailCache {
    runtime: Handle,
    textures: HashMap<String, TextureHandle>,
    requested: HashSet<String>,
    /// Incoming fetch results (thumbnail URL, image)
    results: Arc<Mutex<Vec<(String, ColorImage)>>>,
}

impl ThumbnailCache {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            textures: HashMap::new(),
            requested: HashSet::new(),
            results: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Uploads images fetched since the last frame
    pub fn load_finished(&mut self, ctx: &egui::Context) {
        let Ok(mut pending) = self.results.lock() else {
            return;
        };
        for (url, img) in pending.drain(..) {
            let tex = ctx.load_texture(&url, img, TextureOptions::default());
            self.textures.insert(url, tex);
        }
    }

    /// Texture for `url` once loaded; the first call starts the fetch
    pub fn texture(&mut self, ctx: &egui::Context, url: &str) -> Option<&TextureHandle> {
        if url.trim().is_empty() {
            return None;
        }

        self.request(ctx, url);
        self.textures.get(url)
    }

    #[cfg(test)]
    pub fn requested_count(&self) -> usize {
        self.requested.len()
    }

    fn request(&mut self, ctx: &egui::Context, url: &str) {
        if !self.requested.insert(url.to_owned()) {
            return;
        }

        let url = url.to_owned();
        let results = Arc::clone(&self.results);
        let ctx = ctx.clone();
        self.runtime.spawn_blocking(move || match fetch_thumbnail(&url) {
            Ok(img) => {
                if let Ok(mut pending) = results.lock() {
                    pending.push((url, img));
                }
                ctx.request_repaint();
            }
            Err(err) => {
                event!(Level::WARN, %err, %url, "Error fetching thumbnail");
            }
        });
    }
}
