use crate::trainer::{CaughtPokemon, Trainer, TrainerProgress, UploadableCatch, UploadableTrainer};
use crate::web::handlers::{self, RegionalIdsQuery};
use crate::web::State;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use warp::filters::BoxedFilter;
use warp::{Filter, Reply};

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub fn api(state: Arc<State>) -> BoxedFilter<(impl Reply,)> {
    warp::path("api")
        .and(
            health(Arc::clone(&state))
                .or(regional_ids(Arc::clone(&state)))
                .or(upsert_trainer(Arc::clone(&state)))
                .or(trainer_pokemons(Arc::clone(&state)))
                .or(catch(Arc::clone(&state)))
                .or(release(Arc::clone(&state)))
                .or(progress(Arc::clone(&state))),
        )
        .boxed()
}

fn health(state: Arc<State>) -> BoxedFilter<(impl Reply,)> {
    warp::get()
        .and(warp::path("health"))
        .and(warp::path::end())
        .and_then(move || handlers::health_handler(Arc::clone(&state)))
        .boxed()
}

fn regional_ids(state: Arc<State>) -> BoxedFilter<(impl Reply,)> {
    warp::get()
        .and(warp::path("pokemon"))
        .and(warp::path::param::<u32>())
        .and(warp::path("regional-ids"))
        .and(warp::path::end())
        .and(warp::query::<RegionalIdsQuery>())
        .and_then(move |national_id: u32, query: RegionalIdsQuery| {
            handlers::regional_ids_handler(Arc::clone(&state), national_id, query)
        })
        .boxed()
}

fn upsert_trainer(state: Arc<State>) -> BoxedFilter<(impl Reply,)> {
    warp::post()
        .and(warp::path("trainers"))
        .and(warp::path::end())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and_then(move |trainer: UploadableTrainer| handlers::upsert_trainer_handler(Arc::clone(&state), trainer))
        .boxed()
}

fn trainer_pokemons(state: Arc<State>) -> BoxedFilter<(impl Reply,)> {
    warp::get()
        .and(warp::path("trainers"))
        .and(warp::path::param::<i64>())
        .and(warp::path("pokemon"))
        .and(warp::path::end())
        .and_then(move |trainer_id: i64| handlers::trainer_pokemons_handler(Arc::clone(&state), trainer_id))
        .boxed()
}

fn catch(state: Arc<State>) -> BoxedFilter<(impl Reply,)> {
    warp::post()
        .and(warp::path("trainers"))
        .and(warp::path::param::<i64>())
        .and(warp::path("pokemon"))
        .and(warp::path::end())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and_then(move |trainer_id: i64, catch: UploadableCatch| {
            handlers::catch_handler(Arc::clone(&state), trainer_id, catch)
        })
        .boxed()
}

fn release(state: Arc<State>) -> BoxedFilter<(impl Reply,)> {
    warp::delete()
        .and(warp::path("trainers"))
        .and(warp::path::param::<i64>())
        .and(warp::path("pokemon"))
        .and(warp::path::param::<u32>())
        .and(warp::path::end())
        .and_then(move |trainer_id: i64, pokemon_id: u32| {
            handlers::release_handler(Arc::clone(&state), trainer_id, pokemon_id)
        })
        .boxed()
}

fn progress(state: Arc<State>) -> BoxedFilter<(impl Reply,)> {
    warp::get()
        .and(warp::path("trainers"))
        .and(warp::path::param::<i64>())
        .and(warp::path("progress"))
        .and(warp::path::end())
        .and_then(move |trainer_id: i64| handlers::progress_handler(Arc::clone(&state), trainer_id))
        .boxed()
}

/// A version of `Trainer` with plain RFC 3339 timestamps instead of BSON dates.
#[derive(Serialize)]
pub struct ApiReadableTrainer {
    trainer_id: i64,
    email: String,
    name: Option<String>,
    provider: Option<String>,
    avatar: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Trainer> for ApiReadableTrainer {
    fn from(value: Trainer) -> Self {
        Self {
            trainer_id: value.trainer_id,
            email: value.email,
            name: value.name,
            provider: value.provider,
            avatar: value.avatar,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ApiReadableCatch {
    pokemon_id: u32,
    is_shiny: bool,
    is_caught: bool,
    form_name: Option<String>,
    notes: Option<String>,
    caught_at: DateTime<Utc>,
}

impl From<CaughtPokemon> for ApiReadableCatch {
    fn from(value: CaughtPokemon) -> Self {
        Self {
            pokemon_id: value.pokemon_id,
            is_shiny: value.is_shiny,
            is_caught: value.is_caught,
            form_name: value.form_name,
            notes: value.notes,
            caught_at: value.caught_at,
        }
    }
}

#[derive(Serialize)]
pub struct ApiReadableProgress {
    trainer_id: i64,
    total_caught: u32,
    total_shiny: u32,
    completion_percentage: u32,
    last_caught_pokemon_id: Option<u32>,
    last_updated: DateTime<Utc>,
}

impl From<TrainerProgress> for ApiReadableProgress {
    fn from(value: TrainerProgress) -> Self {
        Self {
            trainer_id: value.trainer_id,
            total_caught: value.total_caught,
            total_shiny: value.total_shiny,
            completion_percentage: value.completion_percentage,
            last_caught_pokemon_id: value.last_caught_pokemon_id,
            last_updated: value.last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_timestamps_are_rfc3339() {
        let readable: ApiReadableProgress = TrainerProgress::empty(3).into();
        let json = serde_json::to_value(&readable).unwrap();

        assert_eq!(json["trainer_id"], 3);
        assert_eq!(json["completion_percentage"], 0);
        assert!(json["last_caught_pokemon_id"].is_null());
        assert!(json["last_updated"].as_str().unwrap().contains('T'));
    }
}
