use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Which of the two Helix emote calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmoteScope {
    Global,
    Channel,
}

impl fmt::Display for EmoteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmoteScope::Global => f.write_str("global"),
            EmoteScope::Channel => f.write_str("channel"),
        }
    }
}

/// Failures raised while serving a single relay request.
///
/// None of these are recovered locally. The server turns every variant into
/// a `500` with the `Display` text as the body.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Error fetching access token: {}", status_text(.status))]
    UpstreamAuth { status: StatusCode },

    #[error("{}: {}", fetch_label(.scope), status_text(.status))]
    UpstreamFetch { scope: EmoteScope, status: StatusCode },

    #[error("Request to upstream failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not parse upstream response: {0}")]
    Parse(String),

    #[error("Could not encode emotes: {0}")]
    Encode(#[from] serde_json::Error),
}

fn fetch_label(scope: &EmoteScope) -> &'static str {
    match scope {
        EmoteScope::Global => "Error fetching emotes",
        EmoteScope::Channel => "Error fetching channel emotes",
    }
}

/// The reason phrase for a status, or its numeric code when it has none.
pub fn status_text(status: &StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}
