use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::fs::FileServer;
use rocket::http::Status;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, post, routes, Build, Rocket, State};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use common::{Config, Platform};

use crate::orchestrator::{CyclePhase, CycleState, Orchestrator};

pub mod websocket;

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub config: Arc<Config>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    current_cycle: u64,
    phase: CyclePhase,
    platforms: usize,
    model: String,
}

/// Request body for starting a cycle.
#[derive(Deserialize)]
struct CycleRequest {
    keywords: String,
    #[serde(default)]
    platforms: Vec<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Redirect root to the form
#[get("/")]
async fn index_redirect() -> Redirect {
    Redirect::to("/static/index.html")
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    let current = state.orchestrator.current();

    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
        current_cycle: current.cycle,
        phase: current.phase,
        platforms: state.orchestrator.catalog().len(),
        model: state.config.llm.model().to_string(),
    })
}

#[get("/api/v1/platforms")]
async fn list_platforms(state: &State<AppState>) -> Json<Vec<Platform>> {
    Json(state.orchestrator.catalog().all().to_vec())
}

/// Start a cycle. Answers with the placeholder state right away; the news
/// fetch and generation continue in the background and are pushed over
/// `/ws/cycles`.
#[post("/api/v1/cycles", data = "<req>")]
async fn start_cycle(
    state: &State<AppState>,
    req: Json<CycleRequest>,
) -> Result<(Status, Json<CycleState>), (Status, Json<ErrorBody>)> {
    let prepared = state
        .orchestrator
        .begin_cycle(&req.keywords, &req.platforms)
        .map_err(|e| {
            warn!(error = %e, "rejected cycle request");
            (Status::BadRequest, Json(ErrorBody { error: e.to_string() }))
        })?;

    let placeholders = prepared.state().clone();
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        let cycle = prepared.id();
        if let Err(e) = orchestrator.drive_cycle(prepared).await {
            error!(cycle, error = %e, "cycle failed");
        }
    });

    Ok((Status::Accepted, Json(placeholders)))
}

#[get("/api/v1/cycles/current")]
async fn current_cycle(state: &State<AppState>) -> Json<CycleState> {
    Json(state.orchestrator.current())
}

/// Assemble the Rocket instance: managed state, API routes, the WebSocket
/// and, when the directory exists, the static form.
///
/// Bind address and port come from the `[server]` section when set, otherwise
/// from Rocket's own defaults.
pub fn build_rocket(config: Arc<Config>, orchestrator: Arc<Orchestrator>) -> Rocket<Build> {
    let mut fig = rocket::Config::figment();
    if let Some(bind) = config.server.bind.as_deref() {
        fig = fig.merge(("address", bind.to_string()));
    }
    if let Some(port) = config.server.port {
        fig = fig.merge(("port", port));
    }

    let static_dir = config.server.static_dir().to_string();
    let state = AppState {
        started_at: Utc::now(),
        config,
        orchestrator,
    };

    let rocket = rocket::custom(fig)
        .manage(state)
        .mount(
            "/",
            routes![
                index_redirect,
                health,
                status,
                list_platforms,
                start_cycle,
                current_cycle,
            ],
        )
        .mount("/ws", routes![websocket::cycle_updates]);

    if Path::new(&static_dir).is_dir() {
        rocket.mount("/static", FileServer::from(&static_dir))
    } else {
        warn!(static_dir = %static_dir, "static directory not found; the form will not be served");
        rocket
    }
}

/// Build and launch the Rocket server.
///
/// This function blocks until the Rocket server shuts down and returns an
/// error if Rocket fails to start.
pub async fn launch_rocket(config: Arc<Config>, orchestrator: Arc<Orchestrator>) -> Result<()> {
    let rocket = build_rocket(config, orchestrator);

    // Launch Rocket - this will run until shutdown (SIGINT/SIGTERM etc.)
    info!("Starting Rocket HTTP server");
    rocket
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    info!("Rocket HTTP server has shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;

    use common::{LlmConfig, NewsArticle, ServerConfig};

    use crate::error::NewsFetchError;
    use crate::llm::content::ContentGenerator;
    use crate::llm::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
    use crate::news::NewsProvider;
    use crate::platforms::PlatformCatalog;

    struct NoNews;

    #[async_trait]
    impl NewsProvider for NoNews {
        async fn fetch_news(&self, _keyword: &str) -> Result<Vec<NewsArticle>, NewsFetchError> {
            Ok(Vec::new())
        }
    }

    struct Echo;

    #[async_trait]
    impl LlmProvider for Echo {
        async fn generate(&self, request: LlmRequest) -> anyhow::Result<LlmResponse> {
            Ok(LlmResponse {
                content: request.prompt,
                usage: UsageMetadata::default(),
                model: "echo".into(),
            })
        }
    }

    async fn client(config: Config) -> Client {
        let orchestrator = Orchestrator::new(
            Arc::new(NoNews),
            Arc::new(ContentGenerator::new(Arc::new(Echo))),
            PlatformCatalog::default(),
        );
        Client::tracked(build_rocket(Arc::new(config), Arc::new(orchestrator)))
            .await
            .expect("valid rocket instance")
    }

    #[rocket::async_test]
    async fn status_reports_configured_model() {
        let config = Config {
            llm: LlmConfig {
                model: Some("gpt-4o-mini".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let client = client(config).await;

        let response = client.get("/api/v1/status").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["platforms"], 5);
        assert_eq!(body["phase"], "idle");
    }

    #[rocket::async_test]
    async fn blank_keywords_are_a_bad_request() {
        let client = client(Config::default()).await;

        let response = client
            .post("/api/v1/cycles")
            .header(ContentType::JSON)
            .body(r#"{"keywords":"   ","platforms":["tiktok"]}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert!(body["error"].as_str().unwrap_or_default().contains("keywords"));

        let current = client.get("/api/v1/cycles/current").dispatch().await;
        let state: serde_json::Value = current.into_json().await.expect("json body");
        assert_eq!(state["cycle"], 0);
    }

    #[rocket::async_test]
    async fn form_is_served_with_copy_action() {
        let config = Config {
            server: ServerConfig {
                static_dir: Some(concat!(env!("CARGO_MANIFEST_DIR"), "/static").into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let client = client(config).await;

        let response = client.get("/static/index.html").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let page = response.into_string().await.expect("html body");
        assert!(page.contains("navigator.clipboard.writeText(c.content)"));
        assert!(page.contains("/ws/cycles"));
    }

    #[rocket::async_test]
    async fn accepted_cycle_returns_placeholders() {
        let client = client(Config::default()).await;

        let response = client
            .post("/api/v1/cycles")
            .header(ContentType::JSON)
            .body(r#"{"keywords":"ev","platforms":["youtube","tiktok"]}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Accepted);
        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["cycle"], 1);
        assert_eq!(body["phase"], "fetching_news");
        assert_eq!(body["contents"][0]["platform"], "youtube");
        assert_eq!(body["contents"][0]["status"], "generating");
        assert_eq!(body["contents"][1]["platform"], "tiktok");
    }
}
