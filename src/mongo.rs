use anyhow::Context;
use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReplaceOptions, ReturnDocument, UpdateOptions};
use mongodb::results::UpdateResult;
use mongodb::{Client as MongoClient, Collection, Database, IndexModel};

use crate::trainer::{CaughtPokemon, Trainer, TrainerProgress, UploadableCatch, UploadableTrainer};

/// Handle on the Wingadex database
#[derive(Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    pub async fn connect(url: &str, database: &str) -> anyhow::Result<Self> {
        let mongo = MongoClient::with_uri_str(url)
            .await
            .context("could not create mongodb client")?;

        Ok(Self {
            db: mongo.database(database),
        })
    }

    pub async fn ensure_indexes(&self) -> anyhow::Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.trainers()
            .create_index(IndexModel::builder().keys(doc! { "trainer_id": 1 }).options(unique()).build(), None)
            .await
            .context("could not create trainer id index")?;

        self.trainers()
            .create_index(IndexModel::builder().keys(doc! { "email": 1 }).options(unique()).build(), None)
            .await
            .context("could not create trainer email index")?;

        // one record per species form
        self.pokemons()
            .create_index(
                IndexModel::builder()
                    .keys(doc! {
                        "trainer_id": 1,
                        "pokemon_id": 1,
                        "form_name": 1,
                    })
                    .options(unique())
                    .build(),
                None,
            )
            .await
            .context("could not create user_pokemons index")?;

        self.progress()
            .create_index(IndexModel::builder().keys(doc! { "trainer_id": 1 }).options(unique()).build(), None)
            .await
            .context("could not create user_progress index")?;

        Ok(())
    }

    pub fn trainers(&self) -> Collection<Trainer> {
        self.db.collection("trainers")
    }

    pub fn pokemons(&self) -> Collection<CaughtPokemon> {
        self.db.collection("user_pokemons")
    }

    pub fn progress(&self) -> Collection<TrainerProgress> {
        self.db.collection("user_progress")
    }

    pub fn counters(&self) -> Collection<Document> {
        self.db.collection("counters")
    }
}

/// Next value of a named sequence, starting at 1
async fn next_sequence(counters: Collection<Document>, name: &str) -> anyhow::Result<i64> {
    let opts = FindOneAndUpdateOptions::builder()
        .upsert(true)
        .return_document(ReturnDocument::After)
        .build();

    let counter = counters
        .find_one_and_update(doc! { "_id": name }, doc! { "$inc": { "seq": 1_i64 } }, opts)
        .await
        .context("could not increment sequence")?
        .context("sequence upsert returned nothing")?;

    counter.get_i64("seq").context("sequence value is not an int64")
}

/// Create the trainer or refresh their profile. Trainers are matched by email.
pub async fn upsert_trainer(store: &Store, trainer: &UploadableTrainer) -> anyhow::Result<Trainer> {
    let now = Utc::now();
    let email = trainer.email.trim().to_lowercase();

    if let Some(mut existing) = store.trainers().find_one(doc! { "email": &email }, None).await? {
        store
            .trainers()
            .update_one(
                doc! { "trainer_id": existing.trainer_id },
                doc! {
                    "$set": {
                        "name": trainer.name.clone(),
                        "provider": trainer.provider.clone(),
                        "provider_id": trainer.provider_id.clone(),
                        "avatar": trainer.avatar.clone(),
                        "updated_at": now,
                    },
                },
                None,
            )
            .await
            .context("could not update trainer")?;

        existing.name = trainer.name.clone();
        existing.provider = trainer.provider.clone();
        existing.provider_id = trainer.provider_id.clone();
        existing.avatar = trainer.avatar.clone();
        existing.updated_at = now;
        return Ok(existing);
    }

    let created = Trainer {
        trainer_id: next_sequence(store.counters(), "trainer_id").await?,
        email,
        name: trainer.name.clone(),
        provider: trainer.provider.clone(),
        provider_id: trainer.provider_id.clone(),
        avatar: trainer.avatar.clone(),
        created_at: now,
        updated_at: now,
    };

    store
        .trainers()
        .insert_one(&created, None)
        .await
        .context("could not insert trainer")?;

    Ok(created)
}

/// Record a catch (or update an existing one for the same species form)
pub async fn upsert_catch(
    collection: Collection<CaughtPokemon>,
    trainer_id: i64,
    catch: &UploadableCatch,
) -> anyhow::Result<UpdateResult> {
    if !catch.is_valid() {
        anyhow::bail!("invalid pokemon id {}", catch.pokemon_id);
    }

    let opts = UpdateOptions::builder().upsert(true).build();
    collection
        .update_one(
            doc! {
                "trainer_id": trainer_id,
                "pokemon_id": catch.pokemon_id as i64,
                "form_name": catch.form_name.clone(),
            },
            doc! {
                "$set": {
                    "is_shiny": catch.is_shiny,
                    "is_caught": catch.is_caught,
                    "notes": catch.notes.clone(),
                    "caught_at": Utc::now(),
                },
            },
            opts,
        )
        .await
        .context("could not upsert catch")
}

/// Remove every form of a species from a trainer's collection
pub async fn delete_catch(
    collection: Collection<CaughtPokemon>,
    trainer_id: i64,
    pokemon_id: u32,
) -> anyhow::Result<u64> {
    let result = collection
        .delete_many(
            doc! {
                "trainer_id": trainer_id,
                "pokemon_id": pokemon_id as i64,
            },
            None,
        )
        .await
        .context("could not delete catch")?;

    Ok(result.deleted_count)
}

pub async fn get_trainer_pokemons(
    collection: Collection<CaughtPokemon>,
    trainer_id: i64,
) -> anyhow::Result<Vec<CaughtPokemon>> {
    let cursor = collection.find(doc! { "trainer_id": trainer_id }, None).await?;

    let pokemons = cursor
        .filter_map(async |res| match res {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!("Error reading caught pokemon: {:?}", e);
                None
            }
        })
        .collect::<Vec<_>>()
        .await;

    Ok(pokemons)
}

pub async fn get_progress(
    collection: Collection<TrainerProgress>,
    trainer_id: i64,
) -> anyhow::Result<Option<TrainerProgress>> {
    collection
        .find_one(doc! { "trainer_id": trainer_id }, None)
        .await
        .context("could not read progress")
}

/// Recompute and store a trainer's progress from their collection
pub async fn refresh_progress(
    store: &Store,
    trainer_id: i64,
    last_caught: Option<u32>,
) -> anyhow::Result<TrainerProgress> {
    let pokemons = get_trainer_pokemons(store.pokemons(), trainer_id).await?;

    // keep the previous "last caught" when this change was not a catch
    let last_caught = match last_caught {
        Some(id) => Some(id),
        None => get_progress(store.progress(), trainer_id)
            .await?
            .and_then(|p| p.last_caught_pokemon_id)
            .filter(|id| pokemons.iter().any(|p| p.pokemon_id == *id && p.is_caught)),
    };

    let progress = TrainerProgress::compute(trainer_id, &pokemons, last_caught);

    let opts = ReplaceOptions::builder().upsert(true).build();
    store
        .progress()
        .replace_one(doc! { "trainer_id": trainer_id }, &progress, opts)
        .await
        .context("could not store progress")?;

    Ok(progress)
}
