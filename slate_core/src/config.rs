//! Editor configuration: per-kind default model ids and persistence knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::NodeKind;

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct EditorConfig {
    pub text_model: String,
    pub image_model: String,
    pub video_model: String,
    pub audio_model: String,
    pub analyzer_model: String,
    /// Quiet period after the last change before an autosave fires.
    #[serde(with = "duration_millis")]
    pub autosave_debounce: Duration,
    /// Storage key the project document is saved under.
    pub storage_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            text_model: "gemini-3-pro-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            video_model: "veo-3.1-fast-generate-preview".to_string(),
            audio_model: "gemini-2.5-flash-preview-tts".to_string(),
            analyzer_model: "gemini-3-pro-preview".to_string(),
            autosave_debounce: Duration::from_secs(2),
            storage_key: "slate-project".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn default_model_for(&self, kind: NodeKind) -> &str {
        match kind {
            NodeKind::TextPrompt => &self.text_model,
            NodeKind::ImageGenerator | NodeKind::ImageEditor => &self.image_model,
            NodeKind::VideoGenerator => &self.video_model,
            NodeKind::AudioGenerator => &self.audio_model,
            NodeKind::VideoAnalyzer => &self.analyzer_model,
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
