//! Per-kind node payloads.
//!
//! The payload is a tagged union keyed by the node kind. Each variant spells
//! out the fields the editor itself reads and writes; everything else a
//! provider attaches travels through the flattened `extra` map so unknown
//! metadata survives a load/save round trip.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The kind of a node, one per payload variant.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    TextPrompt,
    ImageGenerator,
    VideoGenerator,
    AudioGenerator,
    VideoAnalyzer,
    ImageEditor,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::TextPrompt,
        NodeKind::ImageGenerator,
        NodeKind::VideoGenerator,
        NodeKind::AudioGenerator,
        NodeKind::VideoAnalyzer,
        NodeKind::ImageEditor,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::TextPrompt => "Text Prompt",
            NodeKind::ImageGenerator => "Image Generator",
            NodeKind::VideoGenerator => "Video Generator",
            NodeKind::AudioGenerator => "Audio Generator",
            NodeKind::VideoAnalyzer => "Video Analyzer",
            NodeKind::ImageEditor => "Image Editor",
        }
    }
}

/// Strategy selector for video generation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoGenerationMode {
    #[default]
    Default,
    Continue,
    FirstLastFrame,
    Cut,
    CharacterRef,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TextPromptData {
    pub prompt: Option<String>,
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ImageGeneratorData {
    pub prompt: Option<String>,
    pub model: Option<String>,
    /// Primary output image reference.
    pub image: Option<String>,
    /// All candidates from the last generation, including `image`.
    pub images: Vec<String>,
    pub aspect_ratio: Option<String>,
    pub resolution: Option<String>,
    pub image_count: Option<u32>,
    /// User-cropped still; takes precedence over `image` when feeding
    /// downstream nodes.
    pub cropped_frame: Option<String>,
    pub sorted_input_ids: Vec<Uuid>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct VideoGeneratorData {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub video_uri: Option<String>,
    pub video_uris: Vec<String>,
    /// Opaque provider metadata for the generated video.
    pub video_metadata: Option<Value>,
    pub generation_mode: VideoGenerationMode,
    pub aspect_ratio: Option<String>,
    pub resolution: Option<String>,
    pub video_count: Option<u32>,
    pub cropped_frame: Option<String>,
    /// Fallback still when the provider could only produce a preview image.
    pub image: Option<String>,
    pub sorted_input_ids: Vec<Uuid>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AudioGeneratorData {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub audio_uri: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct VideoAnalyzerData {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub video_uri: Option<String>,
    pub analysis: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ImageEditorData {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Kind-specific node data. Serialized internally tagged so the document
/// format carries a plain `"type"` discriminator next to the payload fields.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodePayload {
    TextPrompt(TextPromptData),
    ImageGenerator(ImageGeneratorData),
    VideoGenerator(VideoGeneratorData),
    AudioGenerator(AudioGeneratorData),
    VideoAnalyzer(VideoAnalyzerData),
    ImageEditor(ImageEditorData),
}

impl NodePayload {
    /// An empty payload of the given kind.
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::TextPrompt => NodePayload::TextPrompt(TextPromptData::default()),
            NodeKind::ImageGenerator => NodePayload::ImageGenerator(ImageGeneratorData::default()),
            NodeKind::VideoGenerator => NodePayload::VideoGenerator(VideoGeneratorData::default()),
            NodeKind::AudioGenerator => NodePayload::AudioGenerator(AudioGeneratorData::default()),
            NodeKind::VideoAnalyzer => NodePayload::VideoAnalyzer(VideoAnalyzerData::default()),
            NodeKind::ImageEditor => NodePayload::ImageEditor(ImageEditorData::default()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::TextPrompt(_) => NodeKind::TextPrompt,
            NodePayload::ImageGenerator(_) => NodeKind::ImageGenerator,
            NodePayload::VideoGenerator(_) => NodeKind::VideoGenerator,
            NodePayload::AudioGenerator(_) => NodeKind::AudioGenerator,
            NodePayload::VideoAnalyzer(_) => NodeKind::VideoAnalyzer,
            NodePayload::ImageEditor(_) => NodeKind::ImageEditor,
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            NodePayload::TextPrompt(d) => d.prompt.as_deref(),
            NodePayload::ImageGenerator(d) => d.prompt.as_deref(),
            NodePayload::VideoGenerator(d) => d.prompt.as_deref(),
            NodePayload::AudioGenerator(d) => d.prompt.as_deref(),
            NodePayload::VideoAnalyzer(d) => d.prompt.as_deref(),
            NodePayload::ImageEditor(d) => d.prompt.as_deref(),
        }
    }

    pub fn set_prompt(&mut self, prompt: Option<String>) {
        match self {
            NodePayload::TextPrompt(d) => d.prompt = prompt,
            NodePayload::ImageGenerator(d) => d.prompt = prompt,
            NodePayload::VideoGenerator(d) => d.prompt = prompt,
            NodePayload::AudioGenerator(d) => d.prompt = prompt,
            NodePayload::VideoAnalyzer(d) => d.prompt = prompt,
            NodePayload::ImageEditor(d) => d.prompt = prompt,
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            NodePayload::TextPrompt(d) => d.model.as_deref(),
            NodePayload::ImageGenerator(d) => d.model.as_deref(),
            NodePayload::VideoGenerator(d) => d.model.as_deref(),
            NodePayload::AudioGenerator(d) => d.model.as_deref(),
            NodePayload::VideoAnalyzer(d) => d.model.as_deref(),
            NodePayload::ImageEditor(d) => d.model.as_deref(),
        }
    }

    pub fn set_model(&mut self, model: Option<String>) {
        match self {
            NodePayload::TextPrompt(d) => d.model = model,
            NodePayload::ImageGenerator(d) => d.model = model,
            NodePayload::VideoGenerator(d) => d.model = model,
            NodePayload::AudioGenerator(d) => d.model = model,
            NodePayload::VideoAnalyzer(d) => d.model = model,
            NodePayload::ImageEditor(d) => d.model = model,
        }
    }

    /// The image reference this node feeds downstream, preferring a
    /// user-cropped frame over the raw output.
    pub fn image_ref(&self) -> Option<&str> {
        match self {
            NodePayload::ImageGenerator(d) => {
                d.cropped_frame.as_deref().or(d.image.as_deref())
            }
            NodePayload::VideoGenerator(d) => {
                d.cropped_frame.as_deref().or(d.image.as_deref())
            }
            NodePayload::ImageEditor(d) => d.image.as_deref(),
            _ => None,
        }
    }

    pub fn video_ref(&self) -> Option<&str> {
        match self {
            NodePayload::VideoGenerator(d) => d.video_uri.as_deref(),
            NodePayload::VideoAnalyzer(d) => d.video_uri.as_deref(),
            _ => None,
        }
    }

    pub fn audio_ref(&self) -> Option<&str> {
        match self {
            NodePayload::AudioGenerator(d) => d.audio_uri.as_deref(),
            _ => None,
        }
    }

    /// The text this node contributes to downstream prompts, if any.
    pub fn text_contribution(&self) -> Option<&str> {
        match self {
            NodePayload::TextPrompt(d) => d.prompt.as_deref(),
            NodePayload::VideoAnalyzer(d) => d.analysis.as_deref(),
            _ => None,
        }
    }

    pub fn aspect_ratio(&self) -> Option<&str> {
        match self {
            NodePayload::ImageGenerator(d) => d.aspect_ratio.as_deref(),
            NodePayload::VideoGenerator(d) => d.aspect_ratio.as_deref(),
            _ => None,
        }
    }

    pub fn generation_mode(&self) -> Option<VideoGenerationMode> {
        match self {
            NodePayload::VideoGenerator(d) => Some(d.generation_mode),
            _ => None,
        }
    }

    pub fn sorted_input_ids(&self) -> &[Uuid] {
        match self {
            NodePayload::ImageGenerator(d) => &d.sorted_input_ids,
            NodePayload::VideoGenerator(d) => &d.sorted_input_ids,
            _ => &[],
        }
    }
}
