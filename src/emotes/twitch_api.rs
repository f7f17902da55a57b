use crate::{
    auth::AccessToken,
    error::{EmoteScope, RelayError},
    models::emote::{EmoteCollection, EmotesResponse, TwitchEmote},
};
use reqwest::header::AUTHORIZATION;

#[derive(Clone)]
pub struct TwitchApiClient {
    client: reqwest::Client,
    api_base_url: String,
    client_id: String,
}

impl TwitchApiClient {
    pub fn new(client: reqwest::Client, api_base_url: String, client_id: String) -> Self {
        Self {
            client,
            api_base_url,
            client_id,
        }
    }

    pub async fn get_global_emotes(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<TwitchEmote>, RelayError> {
        let url = format!("{}/chat/emotes/global", self.api_base_url);
        self.get_emotes(&url, EmoteScope::Global, token).await
    }

    /// The broadcaster id is forwarded verbatim, even when empty.
    pub async fn get_channel_emotes(
        &self,
        broadcaster_id: &str,
        token: &AccessToken,
    ) -> Result<Vec<TwitchEmote>, RelayError> {
        let url = format!(
            "{}/chat/emotes/?broadcaster_id={}",
            self.api_base_url, broadcaster_id
        );
        self.get_emotes(&url, EmoteScope::Channel, token).await
    }

    /// Global emotes followed by the channel's. A failed global call means
    /// the channel call is never made.
    pub async fn get_all_emotes(
        &self,
        broadcaster_id: &str,
        token: &AccessToken,
    ) -> Result<EmoteCollection, RelayError> {
        let mut emotes = self.get_global_emotes(token).await?;
        let channel_emotes = self.get_channel_emotes(broadcaster_id, token).await?;
        tracing::debug!(
            global = emotes.len(),
            channel = channel_emotes.len(),
            "Fetched emotes"
        );

        emotes.extend(channel_emotes);
        Ok(emotes)
    }

    async fn get_emotes(
        &self,
        url: &str,
        scope: EmoteScope,
        token: &AccessToken,
    ) -> Result<Vec<TwitchEmote>, RelayError> {
        tracing::debug!("Fetching {} emotes from {}", scope, url);

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", token.as_str()))
            .header("Client-ID", &self.client_id)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} emotes request returned {}", scope, status);
            return Err(RelayError::UpstreamFetch { scope, status });
        }

        let body = response.text().await?;
        let parsed: EmotesResponse = serde_json::from_str(&body)
            .map_err(|e| RelayError::Parse(format!("{} emotes response: {}", scope, e)))?;

        Ok(parsed.data)
    }
}
