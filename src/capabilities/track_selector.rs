//! The `TrackSelector` capability (§6): track-selection policy lives outside
//! the coordinator; the coordinator only consumes its result shape.

use serde::{Deserialize, Serialize};

use crate::capabilities::renderer::TrackType;
use crate::timeline::{MediaPeriodId, Timeline};

/// A single selectable track within a group (e.g. one audio language, one
/// video rendition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub format: String,
    pub track_type: TrackType,
    pub bitrate: Option<u32>,
}

// `TrackType` intentionally does not derive Serialize/Deserialize in
// `renderer.rs` (it is a pure capability enum); provide the impls here where
// the snapshot types that need them live, keeping the capability trait file
// free of serde-only noise.
impl Serialize for TrackType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let name = match self {
            TrackType::Audio => "audio",
            TrackType::Video => "video",
            TrackType::Text => "text",
            TrackType::Metadata => "metadata",
        };
        serializer.serialize_str(name)
    }
}

impl<'de> Deserialize<'de> for TrackType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "audio" => Ok(TrackType::Audio),
            "video" => Ok(TrackType::Video),
            "text" => Ok(TrackType::Text),
            "metadata" => Ok(TrackType::Metadata),
            other => Err(serde::de::Error::custom(format!("unknown track type: {other}"))),
        }
    }
}

/// A group of mutually exclusive tracks (e.g. alternative renditions of the
/// same content).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrackGroup {
    pub tracks: Vec<TrackInfo>,
}

/// All track groups exposed by the currently playing period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrackGroupArray {
    pub groups: Vec<TrackGroup>,
}

impl TrackGroupArray {
    pub const EMPTY: TrackGroupArray = TrackGroupArray { groups: Vec::new() };
}

/// A single selected track within a group, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSelection {
    pub group_index: usize,
    pub track_index: usize,
}

/// The result of running track selection for a period: one selection per
/// renderer that has a matching track, plus the full group array it was
/// selected from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrackSelectorResult {
    pub selections: Vec<Option<TrackSelection>>,
}

impl TrackSelectorResult {
    pub const NONE: TrackSelectorResult = TrackSelectorResult { selections: Vec::new() };
}

/// Track-selection policy, external to the coordinator (§6).
pub trait TrackSelector: Send + Sync {
    fn select_tracks(
        &self,
        renderer_capabilities: &[TrackType],
        track_groups: &TrackGroupArray,
        period_id: &MediaPeriodId,
        timeline: &Timeline,
    ) -> TrackSelectorResult;

    fn on_selection_activated(&self, info: &TrackSelectorResult);
}
