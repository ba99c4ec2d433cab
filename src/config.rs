//! Application-level configuration loading, including platform API endpoints.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "TROPHY_HUB_BACK_CONFIG_PATH";

/// Default Steam Web API endpoint listing a player's owned games.
const DEFAULT_OWNED_GAMES_URL: &str =
    "https://api.steampowered.com/IPlayerService/GetOwnedGames/v0001/";
/// Default Steam Web API endpoint listing a player's per-game achievements.
const DEFAULT_PLAYER_ACHIEVEMENTS_URL: &str =
    "https://api.steampowered.com/ISteamUserStats/GetPlayerAchievements/v0001/";
/// Ceiling applied to every remote platform call.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Steam Web API settings.
    pub steam: SteamConfig,
}

/// Endpoints and limits used when talking to the Steam Web API.
#[derive(Debug, Clone)]
pub struct SteamConfig {
    /// Owned-games endpoint base URL.
    pub owned_games_url: String,
    /// Player-achievements endpoint base URL.
    pub player_achievements_url: String,
    /// Per-request timeout. A timeout counts as a remote failure.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in
    /// defaults when the file is absent or unreadable.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration file");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            steam: SteamConfig::default(),
        }
    }
}

impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            owned_games_url: DEFAULT_OWNED_GAMES_URL.to_owned(),
            player_achievements_url: DEFAULT_PLAYER_ACHIEVEMENTS_URL.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    steam: RawSteamConfig,
}

/// JSON representation of the Steam section; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct RawSteamConfig {
    owned_games_url: Option<String>,
    player_achievements_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = SteamConfig::default();
        Self {
            steam: SteamConfig {
                owned_games_url: value
                    .steam
                    .owned_games_url
                    .unwrap_or(defaults.owned_games_url),
                player_achievements_url: value
                    .steam
                    .player_achievements_url
                    .unwrap_or(defaults.player_achievements_url),
                request_timeout: value
                    .steam
                    .request_timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.request_timeout),
            },
        }
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
