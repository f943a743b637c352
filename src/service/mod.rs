//! HTTP adapter for the join-control hook.
//!
//! The wire format is what the ARK Join Control mod expects: a GET with
//! a `steam_id` query parameter answered by a JSON body whose `allowed`
//! field is the string "1" or "0". Anything the service cannot vouch
//! for comes back "0".

use crate::cache::ProfileCache;
use crate::cache::SqliteStore;
use crate::config::Config;
use crate::gate::CachedRoster;
use crate::gate::Gate;
use crate::gate::Verdict;
use crate::steam::IdentityKey;
use crate::steam::SteamWeb;
use actix_web::middleware::Logger;
use actix_web::web;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use anyhow::Context;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

/// Everything a request needs: the identity cache and the gate.
pub struct State {
    pub cache: ProfileCache,
    pub gate: Gate,
}

#[derive(Deserialize)]
struct JoinQuery {
    steam_id: Option<String>,
}

#[derive(Serialize)]
struct JoinReply {
    steam_id: String,
    allowed: &'static str,
}

#[derive(Serialize)]
struct ErrorReply {
    r#type: &'static str,
    code: u16,
    message: String,
}

impl ErrorReply {
    fn json(code: u16, message: impl Into<String>) -> HttpResponse {
        let body = Self {
            r#type: "error",
            code,
            message: message.into(),
        };
        match code {
            400 => HttpResponse::BadRequest().json(body),
            404 => HttpResponse::NotFound().json(body),
            _ => HttpResponse::InternalServerError().json(body),
        }
    }
}

/// The join-control decision route.
async fn join(state: web::Data<State>, query: web::Query<JoinQuery>) -> impl Responder {
    let raw = match query.steam_id.as_deref() {
        None => return ErrorReply::json(400, "missing steam_id parameter"),
        Some(raw) => raw,
    };
    match IdentityKey::try_from(raw) {
        Err(e) => ErrorReply::json(400, e.to_string()),
        Ok(key) => {
            let verdict = match state.cache.resolve(&key).await {
                Ok(id) => state.gate.decide(id).await,
                Err(e) => {
                    log::warn!("cannot resolve {}: {}", key, e);
                    Verdict::Indeterminate
                }
            };
            log::info!("{} -> {}", raw, verdict);
            HttpResponse::Ok().json(JoinReply {
                steam_id: raw.to_string(),
                allowed: verdict.allowed(),
            })
        }
    }
}

async fn health(state: web::Data<State>) -> impl Responder {
    match state
        .cache
        .ping()
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("cache unavailable"),
    }
}

/// Every other route.
async fn fallback() -> impl Responder {
    ErrorReply::json(404, "no such route")
}

/// Assemble the pipeline from config and serve until interrupted.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let (allow, deny) = config.lists()?;
    let store = SqliteStore::open(&config.cache_file)
        .with_context(|| format!("open cache {}", config.cache_file.display()))?;
    let steam = SteamWeb::new();
    let roster = CachedRoster::new(
        Box::new(steam.clone()),
        config.group(),
        Duration::from_secs(config.roster_ttl_secs),
    );
    log::info!(
        "gating group {}: {} allowed, {} denied",
        config.group(),
        allow.len(),
        deny.len()
    );
    let state = web::Data::new(State {
        cache: ProfileCache::new(Box::new(store), Box::new(steam)),
        gate: Gate::new(allow, deny, roster),
    });
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .app_data(state.clone())
            .route("/", web::get().to(join))
            .route("/health", web::get().to(health))
            .default_service(web::route().to(fallback))
    })
    .bind(&config.bind)
    .with_context(|| format!("bind {}", config.bind))?
    .run()
    .await?;
    Ok(())
}
