//! Inbound HTTP: accepts connections and relays every request to Helix.

use crate::{
    app::config::RelaySettings,
    auth::AuthClient,
    emotes::twitch_api::TwitchApiClient,
    error::RelayError,
    utils::request_path,
};
use eyre::Context;
use http_body_util::Full;
use hyper::{
    Request, Response, StatusCode,
    body::Bytes,
    header::{CONTENT_TYPE, HeaderValue},
    server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use std::{convert::Infallible, future::Future, sync::Arc};
use tokio::net::TcpListener;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Per-request pipeline: token, then global and channel emotes.
#[derive(Clone)]
pub struct Relay {
    auth_client: AuthClient,
    api_client: TwitchApiClient,
}

impl Relay {
    pub fn new(settings: &RelaySettings) -> Result<Self, eyre::Report> {
        let reqwest_client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(reqwest_client, settings))
    }

    pub fn with_client(reqwest_client: reqwest::Client, settings: &RelaySettings) -> Self {
        Self {
            auth_client: AuthClient::new(
                reqwest_client.clone(),
                settings.token_url.clone(),
                settings.credentials.clone(),
            ),
            api_client: TwitchApiClient::new(
                reqwest_client,
                settings.api_base_url.clone(),
                settings.credentials.client_id.clone(),
            ),
        }
    }

    async fn relay_emotes(&self, channel_id: &str) -> Result<Bytes, RelayError> {
        let token = self.auth_client.fetch_access_token().await?;
        let emotes = self.api_client.get_all_emotes(channel_id, &token).await?;
        Ok(Bytes::from(serde_json::to_vec(&emotes)?))
    }

    /// Any method, any path. Every failure becomes a plain-text `500`.
    pub async fn handle<B>(&self, request: Request<B>) -> Response<Full<Bytes>> {
        let channel_id = request_path::channel_id(request.uri().path());
        tracing::info!(method = %request.method(), channel_id, "Relaying emotes");

        match self.relay_emotes(channel_id).await {
            Ok(body) => {
                let mut response = Response::new(Full::new(body));
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                response
            }
            Err(e) => {
                tracing::error!("Request for channel {:?} failed: {}", channel_id, e);
                let mut response = Response::new(Full::new(Bytes::from(format!("Error: {}", e))));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                response
            }
        }
    }
}

/// Accepts connections until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    relay: Arc<Relay>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), eyre::Report> {
    tracing::info!(
        "Listening on http://{}",
        listener.local_addr().context("Listener has no address")?
    );
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                };

                let relay = relay.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |request| {
                        let relay = relay.clone();
                        async move { Ok::<_, Infallible>(relay.handle(request).await) }
                    });

                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        tracing::debug!("Connection from {} closed with error: {}", peer, e);
                    }
                });
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, no longer accepting connections.");
                break;
            }
        }
    }

    Ok(())
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn run(settings: RelaySettings) -> Result<(), eyre::Report> {
    let relay = Arc::new(Relay::new(&settings)?);
    let listener = TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("Could not bind {}", settings.listen_addr))?;

    serve(listener, relay, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}
