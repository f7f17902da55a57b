use serde::{Deserialize, Serialize};

/// A single Helix emote, passed through to callers unchanged.
///
/// Only these fields are kept; anything else Helix sends is dropped on
/// deserialization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TwitchEmote {
    pub id: String,
    pub name: String,
    pub images: EmoteImages,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmoteImages {
    pub url_1x: String,
    pub url_2x: String,
    pub url_4x: String,
}

/// Global emotes first, then channel emotes, no deduplication.
pub type EmoteCollection = Vec<TwitchEmote>;

/// Envelope returned by both Helix emote endpoints.
#[derive(Debug, Deserialize)]
pub struct EmotesResponse {
    pub data: Vec<TwitchEmote>,
    #[allow(dead_code)]
    pub template: String,
}
