//! URL classification by source platform, plus the quality presets offered for a download.

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service a pasted URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    Instagram,
    Facebook,
}

impl Platform {
    /// Tag stored in the `platform` column of a history record
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
        }
    }

    /// Capitalized tag shown in the UI ("Youtube Detected")
    pub const fn label(self) -> &'static str {
        match self {
            Self::YouTube => "Youtube",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
        }
    }

    /// Brand color of the platform
    pub const fn color(self) -> Color32 {
        match self {
            Self::YouTube => Color32::from_rgb(0xFF, 0x00, 0x00),
            Self::Instagram => Color32::from_rgb(0xE4, 0x40, 0x5F),
            Self::Facebook => Color32::from_rgb(0x18, 0x77, 0xF2),
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::YouTube => "▶️",
            Self::Instagram => "📷",
            Self::Facebook => "👥",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host fragments that identify one platform
#[derive(Debug, Clone, Copy)]
pub struct DetectionRule {
    pub platform: Platform,
    pub host_fragments: &'static [&'static str],
}

/// Evaluated top to bottom; the first rule with a matching fragment wins.
pub const DETECTION_RULES: &[DetectionRule] = &[
    DetectionRule {
        platform: Platform::YouTube,
        host_fragments: &["youtube.com", "youtu.be"],
    },
    DetectionRule {
        platform: Platform::Instagram,
        host_fragments: &["instagram.com", "instagr.am"],
    },
    DetectionRule {
        platform: Platform::Facebook,
        host_fragments: &["facebook.com", "fb.watch", "fb.com"],
    },
];

/// Classifies `url` by case-insensitive substring containment against [`DETECTION_RULES`].
///
/// No scheme or well-formedness check is made, unmatched input yields `None`.
pub fn detect_platform(url: &str) -> Option<Platform> {
    detect_with(DETECTION_RULES, url)
}

fn detect_with(rules: &[DetectionRule], url: &str) -> Option<Platform> {
    let normalized = url.trim().to_lowercase();

    rules
        .iter()
        .find(|rule| rule.host_fragments.iter().any(|fragment| normalized.contains(fragment)))
        .map(|rule| rule.platform)
}

/// Quality preset picked before a simulated download
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[default]
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl Quality {
    /// All presets in display order
    pub const ALL: [Quality; 4] = [Self::P360, Self::P480, Self::P720, Self::P1080];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P360 => "360p",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
