//! Steam Web API client seam.
//!
//! The trait keeps the processor independent from the HTTP transport; the
//! [`HttpSteamApi`] implementation talks to the real endpoints over reqwest.

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::config::SteamConfig;

/// Failure of a single Steam Web API call.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network-level failure, including a hit of the request timeout.
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-2xx status. The body is carried
    /// verbatim so callers can log it.
    #[error("{endpoint} responded {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },
    /// The response decoded into something other than the documented shape.
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// One game entry from the owned-games endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnedGameEntry {
    /// Steam app id.
    pub appid: u64,
    /// Total recorded playtime in minutes.
    #[serde(default)]
    pub playtime_forever: u64,
}

/// Payload of the owned-games endpoint (`response` envelope stripped).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnedGames {
    /// Games owned by the account, in the order Steam returned them.
    #[serde(default)]
    pub games: Vec<OwnedGameEntry>,
}

/// One raw achievement record from the player-achievements endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAchievement {
    /// Provider-assigned achievement key.
    pub apiname: String,
    /// `1` when unlocked, `0` otherwise.
    pub achieved: u8,
    /// Unlock instant as unix seconds; `0` when not unlocked.
    #[serde(default)]
    pub unlocktime: u64,
}

impl RawAchievement {
    /// Whether the record reports the achievement as unlocked.
    pub fn is_achieved(&self) -> bool {
        self.achieved == 1
    }
}

/// Payload of the player-achievements endpoint (`playerstats` envelope
/// stripped). `game_name` is the only place the Steam API exposes a game's
/// display name on this code path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerStats {
    /// Display name of the game.
    #[serde(rename = "gameName", default)]
    pub game_name: String,
    /// Achievement state for the requested account. Absent for games that
    /// define no achievements.
    #[serde(default)]
    pub achievements: Vec<RawAchievement>,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesEnvelope {
    response: OwnedGames,
}

#[derive(Debug, Deserialize)]
struct PlayerStatsEnvelope {
    playerstats: PlayerStats,
}

/// Abstraction over the two Steam Web API calls the sync path needs.
pub trait SteamWebApi: Send + Sync {
    /// List the games owned by `account_id`.
    fn owned_games(
        &self,
        account_id: &str,
        token: &str,
    ) -> BoxFuture<'static, Result<OwnedGames, RemoteError>>;

    /// Fetch the achievement state of `account_id` for one app.
    fn player_achievements(
        &self,
        account_id: &str,
        token: &str,
        app_id: u64,
    ) -> BoxFuture<'static, Result<PlayerStats, RemoteError>>;
}

/// [`SteamWebApi`] implementation over the real HTTP endpoints.
pub struct HttpSteamApi {
    client: Client,
    config: SteamConfig,
}

impl HttpSteamApi {
    /// Build a client enforcing the configured per-request timeout.
    pub fn new(config: SteamConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        client: Client,
        timeout: std::time::Duration,
        endpoint: &'static str,
        url: String,
        query: Vec<(&'static str, String)>,
    ) -> Result<T, RemoteError> {
        let response = client
            .get(url)
            .query(&query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|source| RemoteError::Transport { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                endpoint,
                status,
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| RemoteError::Decode { endpoint, source })
    }
}

impl SteamWebApi for HttpSteamApi {
    fn owned_games(
        &self,
        account_id: &str,
        token: &str,
    ) -> BoxFuture<'static, Result<OwnedGames, RemoteError>> {
        let client = self.client.clone();
        let timeout = self.config.request_timeout;
        let url = self.config.owned_games_url.clone();
        let query = vec![
            ("key", token.to_owned()),
            ("steamid", account_id.to_owned()),
            ("format", "json".to_owned()),
        ];
        Box::pin(async move {
            let envelope: OwnedGamesEnvelope =
                Self::get_json(client, timeout, "owned-games", url, query).await?;
            Ok(envelope.response)
        })
    }

    fn player_achievements(
        &self,
        account_id: &str,
        token: &str,
        app_id: u64,
    ) -> BoxFuture<'static, Result<PlayerStats, RemoteError>> {
        let client = self.client.clone();
        let timeout = self.config.request_timeout;
        let url = self.config.player_achievements_url.clone();
        let query = vec![
            ("appid", app_id.to_string()),
            ("key", token.to_owned()),
            ("steamid", account_id.to_owned()),
            ("format", "json".to_owned()),
        ];
        Box::pin(async move {
            let envelope: PlayerStatsEnvelope =
                Self::get_json(client, timeout, "player-achievements", url, query).await?;
            Ok(envelope.playerstats)
        })
    }
}
