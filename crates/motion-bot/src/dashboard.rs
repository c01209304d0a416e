//! REST API behind the web dashboard.
//!
//! Every route reads or writes the same documents the bot uses, so changes
//! made here apply to the next command or event without a restart.

use crate::error::BotResult;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use motion_commands::GuildSummary;
use motion_common::{ChannelId, GuildId, MessageId, MotionError};
use motion_config::{ConfigLoader, ConfigValidator, Theme};
use motion_i18n::I18nError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

/// Variables that change the keep-alive pinger when edited.
const KEEP_ALIVE_KEYS: [&str; 2] = ["GSM_BASE_URL", "GSM_KEEP_ALIVE"];

/// Body of every mutating endpoint.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessResponse {
    /// Whether the change was applied.
    pub success: bool,
}

/// Bot status summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Seconds since start.
    pub uptime: f64,
    /// Commands run since start.
    pub commands_ran: u64,
    /// Bot user name.
    pub bot_name: String,
    /// Bot user tag.
    pub bot_tag: String,
    /// `Online` once the gateway is ready, `Initializing` before.
    pub status: &'static str,
    /// Number of connected guilds.
    pub guilds: usize,
}

/// One sticky record of a guild.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyView {
    /// Channel the sticky lives in.
    pub channel_id: ChannelId,
    /// Name used by `/sticky delete`.
    pub name: String,
    /// Message body.
    pub content: String,
    /// Currently posted message, if any.
    pub last_message_id: Option<MessageId>,
}

/// Query of the command listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandsQuery {
    /// Guild whose overrides apply; global settings when absent.
    pub guild_id: Option<String>,
}

/// A command with its effective state.
#[derive(Debug, Serialize)]
pub struct CommandView {
    /// Command name.
    pub name: String,
    /// Slash command description.
    pub description: String,
    /// Dashboard grouping.
    pub category: String,
    /// Whether the command runs in the queried scope.
    pub enabled: bool,
}

/// Request to switch a command on or off.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    /// Command name.
    pub name: String,
    /// New state.
    pub enabled: bool,
    /// Guild scope; global when absent.
    #[serde(default)]
    pub guild_id: Option<GuildId>,
}

/// Active and selectable languages.
#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    /// Active language code.
    pub current: &'static str,
    /// Codes that can be selected.
    pub available: Vec<&'static str>,
}

/// Request to change the language.
#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    /// Language code such as `en` or `pt`.
    pub language: String,
}

/// Keep-alive settings as shown on the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GsmConfigResponse {
    /// URL pinged by the keep-alive task.
    pub url: Option<String>,
    /// Whether pinging is enabled.
    pub keep_alive: bool,
}

/// Create the dashboard router with all endpoints.
pub fn create_dashboard_router(state: AppState) -> Router {
    let static_dir = state.config.get().dashboard.static_dir.clone();

    let router = Router::new()
        .route("/api/stats", get(get_stats))
        .route("/api/theme", get(get_theme).post(set_theme))
        .route("/api/guilds", get(get_guilds))
        .route("/api/guilds/:guild_id/stickies", get(get_stickies))
        .route("/api/commands", get(get_commands))
        .route("/api/commands/toggle", post(toggle_command))
        .route("/api/language", get(get_language).post(set_language))
        .route("/api/config/gsm", get(get_gsm_config))
        .route("/api/config/env", post(update_env));

    let router = if static_dir.is_dir() {
        router.fallback_service(ServeDir::new(static_dir))
    } else {
        router
    };

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve the dashboard until `shutdown` is cancelled.
///
/// # Errors
///
/// Fails if the listen address cannot be bound or the server errors.
pub async fn start_dashboard_server(
    state: AppState,
    shutdown: CancellationToken,
) -> BotResult<()> {
    let settings = state.config.get().dashboard.clone();
    let bind_address = format!("{}:{}", settings.host(), settings.port);
    info!("Starting dashboard on http://{}", bind_address);

    let app = create_dashboard_router(state);
    let listener = tokio::net::TcpListener::bind(bind_address.as_str()).await?;

    info!("Dashboard listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Dashboard stopped");
    Ok(())
}

fn respond(status: StatusCode) -> (StatusCode, Json<SuccessResponse>) {
    (
        status,
        Json(SuccessResponse {
            success: status.is_success(),
        }),
    )
}

fn status_for(error: &MotionError) -> StatusCode {
    match error {
        MotionError::Validation { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Get bot status and counters
async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let presence = state.presence.snapshot();

    Json(StatsResponse {
        uptime: state.stats.uptime().as_secs_f64(),
        commands_ran: state.stats.commands_ran(),
        bot_name: presence.name.unwrap_or_else(|| "MotionBot".to_string()),
        bot_tag: presence.tag.unwrap_or_else(|| "MotionBot#0000".to_string()),
        status: if presence.ready { "Online" } else { "Initializing" },
        guilds: presence.guilds.len(),
    })
}

/// Get the active theme
async fn get_theme(State(state): State<AppState>) -> Json<Theme> {
    Json(state.theme.current().as_ref().clone())
}

/// Replace the theme
async fn set_theme(
    State(state): State<AppState>,
    Json(theme): Json<Theme>,
) -> (StatusCode, Json<SuccessResponse>) {
    match state.theme.set(theme).await {
        Ok(()) => respond(StatusCode::OK),
        Err(e) => {
            warn!(error = %e, "Theme update rejected");
            respond(status_for(&e))
        }
    }
}

/// List connected guilds
async fn get_guilds(State(state): State<AppState>) -> Json<Vec<GuildSummary>> {
    Json(state.presence.guilds())
}

/// List the stickies of a guild
async fn get_stickies(
    Path(guild_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<StickyView>>, StatusCode> {
    let guild: GuildId = guild_id.parse().map_err(|_| StatusCode::BAD_REQUEST)?;

    let stickies = state
        .store
        .list(guild)
        .await
        .into_iter()
        .map(|(channel_id, record)| StickyView {
            channel_id,
            name: record.name,
            content: record.content,
            last_message_id: record.last_message_id,
        })
        .collect();

    Ok(Json(stickies))
}

/// List commands with their state in the given scope
async fn get_commands(
    Query(query): Query<CommandsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CommandView>>, StatusCode> {
    let guild = match query.guild_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<GuildId>().map_err(|_| StatusCode::BAD_REQUEST)?),
    };

    let toggles = state.toggles.snapshot().await;
    let commands = state
        .commands
        .iter()
        .map(|info| CommandView {
            name: info.name.clone(),
            description: info.description.clone(),
            category: info.category.clone(),
            enabled: toggles.is_enabled(&info.name, guild),
        })
        .collect();

    Ok(Json(commands))
}

/// Enable or disable a command
async fn toggle_command(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> (StatusCode, Json<SuccessResponse>) {
    if !state.commands.iter().any(|info| info.name == request.name) {
        return respond(StatusCode::NOT_FOUND);
    }

    match state
        .toggles
        .set_status(&request.name, request.enabled, request.guild_id)
        .await
    {
        Ok(()) => respond(StatusCode::OK),
        Err(e) => {
            error!(command = %request.name, error = %e, "Failed to save command toggle");
            respond(status_for(&e))
        }
    }
}

/// Get the active language
async fn get_language(State(state): State<AppState>) -> Json<LanguageResponse> {
    Json(LanguageResponse {
        current: state.i18n.current().code(),
        available: state
            .i18n
            .available_languages()
            .into_iter()
            .map(|locale| locale.code())
            .collect(),
    })
}

/// Change the language
async fn set_language(
    State(state): State<AppState>,
    Json(request): Json<LanguageRequest>,
) -> (StatusCode, Json<SuccessResponse>) {
    match state.i18n.set_language(&request.language).await {
        Ok(_) => respond(StatusCode::OK),
        Err(I18nError::Settings(e)) => {
            error!(error = %e, "Failed to save language");
            respond(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(e) => {
            warn!(error = %e, "Language change rejected");
            respond(StatusCode::BAD_REQUEST)
        }
    }
}

/// Get the keep-alive settings
async fn get_gsm_config(State(state): State<AppState>) -> Json<GsmConfigResponse> {
    let config = state.config.get();
    Json(GsmConfigResponse {
        url: config.keep_alive.base_url.clone(),
        keep_alive: config.keep_alive.enabled,
    })
}

/// Write variables to `.env` and apply them to the running configuration.
///
/// The update is rejected unless the resulting configuration validates.
async fn update_env(
    State(state): State<AppState>,
    Json(body): Json<BTreeMap<String, serde_json::Value>>,
) -> (StatusCode, Json<SuccessResponse>) {
    let values: BTreeMap<String, String> = body
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(text) => text,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, text)
        })
        .collect();

    let lookup = |key: &str| values.get(key).cloned();

    // Settings that would stop the next start are never written.
    let mut candidate = state.config.get().as_ref().clone();
    let checked = ConfigLoader::apply_env_overrides(&mut candidate, lookup)
        .and_then(|()| ConfigValidator::validate(&candidate));
    if let Err(e) = checked {
        warn!(error = %e, "Rejected .env update");
        return respond(StatusCode::BAD_REQUEST);
    }

    if let Err(e) = state.env_file.update(&values).await {
        warn!(error = %e, "Failed to update .env");
        return respond(status_for(&e));
    }

    let applied = state.config.modify(|config| {
        if let Err(e) = ConfigLoader::apply_env_overrides(config, lookup) {
            warn!(error = %e, "Could not apply .env update to running config");
        }
    });

    if KEEP_ALIVE_KEYS.iter().any(|key| values.contains_key(*key)) {
        state.keep_alive.reconfigure(&applied.keep_alive).await;
    }

    respond(StatusCode::OK)
}
