//! Model defaults and the model-family payload registry.
//!
//! Different model families within one content type expect different input
//! parameter sets. The family is derived once from the model id by exact or
//! prefix match against [`FAMILY_REGISTRY`]; the payload is then built by the
//! family's builder. Unregistered models get the generic payload.

use serde_json::{json, Value};

use crate::request::{ContentType, GenerationRequest};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_IMAGE_MODEL: &str = "black-forest-labs/flux-schnell";
pub const DEFAULT_VIDEO_MODEL: &str = "anotherjesse/zeroscope-v2-xl";
pub const DEFAULT_AUDIO_MODEL: &str = "meta/musicgen";

/// Clip length requested from audio models when the request carries none.
pub const DEFAULT_AUDIO_DURATION_SECS: u32 = 10;

/// The model used for `content_type` when the request names none.
pub fn default_model(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Image => DEFAULT_IMAGE_MODEL,
        ContentType::Video => DEFAULT_VIDEO_MODEL,
        ContentType::Audio => DEFAULT_AUDIO_MODEL,
    }
}

// ---------------------------------------------------------------------------
// Families
// ---------------------------------------------------------------------------

/// A group of models sharing one input schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// `{prompt}`, plus `duration` for audio.
    Generic,
    /// Text-to-speech/audio taking only `{prompt}`.
    Bark,
    /// `{prompt, duration, temperature, top_k, top_p, classifier_free_guidance}`.
    MusicGen,
    /// Spectrogram diffusion taking `{prompt_a, denoising, alpha}`.
    Riffusion,
}

struct FamilyEntry {
    content_type: ContentType,
    prefix: &'static str,
    family: ModelFamily,
}

const FAMILY_REGISTRY: &[FamilyEntry] = &[
    FamilyEntry {
        content_type: ContentType::Audio,
        prefix: "suno-ai/bark",
        family: ModelFamily::Bark,
    },
    FamilyEntry {
        content_type: ContentType::Audio,
        prefix: "meta/musicgen",
        family: ModelFamily::MusicGen,
    },
    FamilyEntry {
        content_type: ContentType::Audio,
        prefix: "riffusion/riffusion",
        family: ModelFamily::Riffusion,
    },
];

// MusicGen sampling parameters.
const MUSICGEN_TEMPERATURE: f64 = 1.0;
const MUSICGEN_TOP_K: u32 = 250;
const MUSICGEN_TOP_P: f64 = 0.0;
const MUSICGEN_CFG: u32 = 3;

// Riffusion interpolation parameters.
const RIFFUSION_DENOISING: f64 = 0.75;
const RIFFUSION_ALPHA: f64 = 0.5;

/// Look up the family of `model` for `content_type`.
///
/// Any `:version` suffix is ignored. A model matches an entry when its id
/// equals the entry prefix or starts with it.
pub fn model_family(content_type: ContentType, model: &str) -> ModelFamily {
    let base = model.split(':').next().unwrap_or(model).trim();
    FAMILY_REGISTRY
        .iter()
        .find(|entry| entry.content_type == content_type && base.starts_with(entry.prefix))
        .map(|entry| entry.family)
        .unwrap_or(ModelFamily::Generic)
}

/// Build the provider input payload for one unit.
pub fn build_input(
    content_type: ContentType,
    family: ModelFamily,
    prompt: &str,
    duration_seconds: Option<u32>,
) -> Value {
    let duration = duration_seconds.unwrap_or(DEFAULT_AUDIO_DURATION_SECS);
    match family {
        ModelFamily::Bark => json!({ "prompt": prompt }),
        ModelFamily::MusicGen => json!({
            "prompt": prompt,
            "duration": duration,
            "temperature": MUSICGEN_TEMPERATURE,
            "top_k": MUSICGEN_TOP_K,
            "top_p": MUSICGEN_TOP_P,
            "classifier_free_guidance": MUSICGEN_CFG,
        }),
        ModelFamily::Riffusion => json!({
            "prompt_a": prompt,
            "denoising": RIFFUSION_DENOISING,
            "alpha": RIFFUSION_ALPHA,
        }),
        ModelFamily::Generic => match content_type {
            ContentType::Audio => json!({ "prompt": prompt, "duration": duration }),
            ContentType::Image | ContentType::Video => json!({ "prompt": prompt }),
        },
    }
}

/// Everything the worker needs to call the provider for one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInvocation {
    pub model: String,
    pub family: ModelFamily,
    pub input: Value,
}

/// Resolve the effective model and its payload for `request`.
pub fn plan_invocation(request: &GenerationRequest) -> ModelInvocation {
    let model = request
        .model_override()
        .unwrap_or_else(|| default_model(request.content_type))
        .to_string();
    let family = model_family(request.content_type, &model);
    let input = build_input(
        request.content_type,
        family,
        &request.prompt,
        request.duration_seconds,
    );
    ModelInvocation {
        model,
        family,
        input,
    }
}
