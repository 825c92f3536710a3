use std::{convert::Infallible, sync::Arc};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;

use crate::api::{ApiReadableCatch, ApiReadableProgress, ApiReadableTrainer};
use crate::mongo::{
    delete_catch, get_progress, get_trainer_pokemons, refresh_progress, upsert_catch, upsert_trainer, Store,
};
use crate::region::RegionalIdMap;
use crate::trainer::{TrainerProgress, UploadableCatch, UploadableTrainer};
use super::State;

#[derive(Debug, Deserialize)]
pub struct RegionalIdsQuery {
    pub name: Option<String>,
}

#[derive(Serialize)]
struct HealthReply {
    status: &'static str,
    timestamp: String,
    database: &'static str,
    auth: &'static str,
    cached_species: usize,
    message: &'static str,
}

#[derive(Serialize)]
struct RegionalIdsReply<'a> {
    national_id: u32,
    name: &'a str,
    regional_ids: RegionalIdMap,
}

#[derive(Serialize)]
struct ErrorReply<'a> {
    error: &'a str,
}

fn error_reply(status: StatusCode, message: &str) -> Response {
    warp::reply::with_status(warp::reply::json(&ErrorReply { error: message }), status).into_response()
}

fn configured(yes: bool) -> &'static str {
    if yes {
        "configured"
    } else {
        "not configured"
    }
}

/// The store, or a 503 reply when persistence is disabled
fn with_store(state: &State) -> std::result::Result<&Store, Response> {
    state
        .store
        .as_ref()
        .ok_or_else(|| error_reply(StatusCode::SERVICE_UNAVAILABLE, "database not configured"))
}

pub async fn health_handler(state: Arc<State>) -> std::result::Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&HealthReply {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
        database: configured(state.store.is_some()),
        auth: configured(state.auth_configured()),
        cached_species: state.cache.len().await,
        message: "Wingadex API is running!",
    }))
}

/// The species name is trimmed before lookup, so `"Pikachu "` and `"Pikachu"` share one
/// cache entry and one Poképédia page.
pub async fn regional_ids_handler(
    state: Arc<State>,
    national_id: u32,
    query: RegionalIdsQuery,
) -> std::result::Result<Response, Infallible> {
    let name = match query.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(error_reply(StatusCode::BAD_REQUEST, "missing species name")),
    };

    if national_id == 0 {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "invalid national id"));
    }

    let regional_ids = state.resolver.get_regional_ids(national_id, name).await;

    Ok(warp::reply::json(&RegionalIdsReply {
        national_id,
        name,
        regional_ids,
    })
    .into_response())
}

pub async fn upsert_trainer_handler(
    state: Arc<State>,
    trainer: UploadableTrainer,
) -> std::result::Result<Response, Infallible> {
    let store = match with_store(&state) {
        Ok(store) => store,
        Err(reply) => return Ok(reply),
    };

    if !trainer.is_valid() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "invalid email"));
    }

    Ok(match upsert_trainer(store, &trainer).await {
        Ok(trainer) => warp::reply::json(&ApiReadableTrainer::from(trainer)).into_response(),
        Err(e) => {
            tracing::error!("error upserting trainer: {:#}", e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "could not save trainer")
        }
    })
}

pub async fn trainer_pokemons_handler(
    state: Arc<State>,
    trainer_id: i64,
) -> std::result::Result<Response, Infallible> {
    let store = match with_store(&state) {
        Ok(store) => store,
        Err(reply) => return Ok(reply),
    };

    Ok(match get_trainer_pokemons(store.pokemons(), trainer_id).await {
        Ok(pokemons) => {
            let pokemons: Vec<ApiReadableCatch> = pokemons.into_iter().map(Into::into).collect();
            warp::reply::json(&pokemons).into_response()
        }
        Err(e) => {
            tracing::error!("error reading collection of trainer {}: {:#}", trainer_id, e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "could not read collection")
        }
    })
}

pub async fn catch_handler(
    state: Arc<State>,
    trainer_id: i64,
    catch: UploadableCatch,
) -> std::result::Result<Response, Infallible> {
    let store = match with_store(&state) {
        Ok(store) => store,
        Err(reply) => return Ok(reply),
    };

    if !catch.is_valid() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "invalid pokemon id"));
    }

    let result = async {
        upsert_catch(store.pokemons(), trainer_id, &catch).await?;
        let last_caught = catch.is_caught.then_some(catch.pokemon_id);
        refresh_progress(store, trainer_id, last_caught).await
    }
    .await;

    Ok(match result {
        Ok(progress) => warp::reply::json(&ApiReadableProgress::from(progress)).into_response(),
        Err(e) => {
            tracing::error!("error recording catch for trainer {}: {:#}", trainer_id, e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "could not record catch")
        }
    })
}

pub async fn release_handler(
    state: Arc<State>,
    trainer_id: i64,
    pokemon_id: u32,
) -> std::result::Result<Response, Infallible> {
    let store = match with_store(&state) {
        Ok(store) => store,
        Err(reply) => return Ok(reply),
    };

    let result = async {
        let deleted = delete_catch(store.pokemons(), trainer_id, pokemon_id).await?;
        if deleted == 0 {
            return Ok(None);
        }
        refresh_progress(store, trainer_id, None).await.map(Some)
    }
    .await;

    Ok(match result {
        Ok(Some(progress)) => warp::reply::json(&ApiReadableProgress::from(progress)).into_response(),
        Ok(None) => error_reply(StatusCode::NOT_FOUND, "pokemon not in collection"),
        Err(e) => {
            tracing::error!("error releasing #{} for trainer {}: {:#}", pokemon_id, trainer_id, e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "could not update collection")
        }
    })
}

pub async fn progress_handler(
    state: Arc<State>,
    trainer_id: i64,
) -> std::result::Result<Response, Infallible> {
    let store = match with_store(&state) {
        Ok(store) => store,
        Err(reply) => return Ok(reply),
    };

    Ok(match get_progress(store.progress(), trainer_id).await {
        Ok(progress) => {
            let progress = progress.unwrap_or_else(|| TrainerProgress::empty(trainer_id));
            warp::reply::json(&ApiReadableProgress::from(progress)).into_response()
        }
        Err(e) => {
            tracing::error!("error reading progress of trainer {}: {:#}", trainer_id, e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, "could not read progress")
        }
    })
}
