use crate::platform::Platform;

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canned video information shown once a platform is detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub thumbnail: String,
    /// Display string such as `12:34`
    pub duration: String,
    pub platform: Platform,
}

static MOCK_METADATA: Lazy<HashMap<Platform, VideoMetadata>> = Lazy::new(|| {
    [
        (
            Platform::YouTube,
            "Educational Tutorial - Building Mobile Apps",
            "https://images.pexels.com/photos/4050320/pexels-photo-4050320.jpeg?auto=compress&cs=tinysrgb&w=400",
            "12:34",
        ),
        (
            Platform::Instagram,
            "Instagram Reel - Mobile Development Tips",
            "https://images.pexels.com/photos/3183150/pexels-photo-3183150.jpeg?auto=compress&cs=tinysrgb&w=400",
            "0:45",
        ),
        (
            Platform::Facebook,
            "Facebook Video - Tech Tutorial",
            "https://images.pexels.com/photos/1181671/pexels-photo-1181671.jpeg?auto=compress&cs=tinysrgb&w=400",
            "8:22",
        ),
    ]
    .into_iter()
    .map(|(platform, title, thumbnail, duration)| {
        let metadata = VideoMetadata {
            title: title.to_owned(),
            thumbnail: thumbnail.to_owned(),
            duration: duration.to_owned(),
            platform,
        };
        (platform, metadata)
    })
    .collect()
});

/// Returns an owned copy of the canned metadata for `platform`, `None` when no platform was detected.
pub fn metadata_for(platform: Option<Platform>) -> Option<VideoMetadata> {
    platform.and_then(|platform| MOCK_METADATA.get(&platform).cloned())
}
