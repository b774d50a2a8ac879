//! Named size presets and the quality label shown next to the quality knob.
//!
//! | Name | Bounds |
//! |---|---|
//! | `original` | none (the 1920px default ceiling still applies) |
//! | `4k` | 3840×2160 |
//! | `full-hd` | 1920×1080 |
//! | `hd` | 1280×720 |
//! | `medium` | 800×600 |
//! | `small` | 480×360 |

use crate::imaging::Quality;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePreset {
    pub name: &'static str,
    pub label: &'static str,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

pub const PRESETS: [SizePreset; 6] = [
    SizePreset {
        name: "original",
        label: "Original",
        max_width: None,
        max_height: None,
    },
    SizePreset {
        name: "4k",
        label: "4K",
        max_width: Some(3840),
        max_height: Some(2160),
    },
    SizePreset {
        name: "full-hd",
        label: "Full HD",
        max_width: Some(1920),
        max_height: Some(1080),
    },
    SizePreset {
        name: "hd",
        label: "HD",
        max_width: Some(1280),
        max_height: Some(720),
    },
    SizePreset {
        name: "medium",
        label: "Medium",
        max_width: Some(800),
        max_height: Some(600),
    },
    SizePreset {
        name: "small",
        label: "Small",
        max_width: Some(480),
        max_height: Some(360),
    },
];

/// Look up a preset by name (case-insensitive).
pub fn find_preset(name: &str) -> Option<&'static SizePreset> {
    let name = name.trim();
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// The preset whose bounds are exactly these, if any.
pub fn matching_preset(max_width: Option<u32>, max_height: Option<u32>) -> Option<&'static SizePreset> {
    PRESETS
        .iter()
        .find(|p| p.max_width == max_width && p.max_height == max_height)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityLabel {
    VeryHigh,
    High,
    Medium,
    Low,
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VeryHigh => "very high",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

pub fn quality_label(quality: Quality) -> QualityLabel {
    match quality.value() {
        90.. => QualityLabel::VeryHigh,
        75.. => QualityLabel::High,
        50.. => QualityLabel::Medium,
        _ => QualityLabel::Low,
    }
}
