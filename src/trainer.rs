use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Species in the National Pokédex, used for completion percentage
pub const NATIONAL_DEX_SIZE: u32 = 1025;

/// Trainer profile
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Trainer {
    pub trainer_id: i64,
    pub email: String,
    pub name: Option<String>,
    /// "google", "discord", ...
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub avatar: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Profile data posted by the client
#[derive(Debug, Deserialize)]
pub struct UploadableTrainer {
    pub email: String,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub avatar: Option<String>,
}

impl UploadableTrainer {
    pub fn is_valid(&self) -> bool {
        let email = self.email.trim();
        !email.is_empty() && email.contains('@')
    }
}

/// A species (optionally a specific form) in a trainer's collection.
/// Unique per (trainer_id, pokemon_id, form_name).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CaughtPokemon {
    pub trainer_id: i64,
    /// National Pokédex ID
    pub pokemon_id: u32,
    #[serde(default)]
    pub is_shiny: bool,
    #[serde(default = "default_true")]
    pub is_caught: bool,
    /// "Galar", "Hisui", "Mega X", ...
    pub form_name: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub caught_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Catch posted by the client
#[derive(Debug, Deserialize)]
pub struct UploadableCatch {
    pub pokemon_id: u32,
    #[serde(default)]
    pub is_shiny: bool,
    #[serde(default = "default_true")]
    pub is_caught: bool,
    pub form_name: Option<String>,
    pub notes: Option<String>,
}

impl UploadableCatch {
    pub fn is_valid(&self) -> bool {
        (1..=NATIONAL_DEX_SIZE).contains(&self.pokemon_id)
    }
}

/// Collection summary, recomputed after every change
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrainerProgress {
    pub trainer_id: i64,
    pub total_caught: u32,
    pub total_shiny: u32,
    /// 0..=100
    pub completion_percentage: u32,
    pub last_caught_pokemon_id: Option<u32>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub last_updated: DateTime<Utc>,
}

impl TrainerProgress {
    pub fn empty(trainer_id: i64) -> Self {
        Self {
            trainer_id,
            total_caught: 0,
            total_shiny: 0,
            completion_percentage: 0,
            last_caught_pokemon_id: None,
            last_updated: Utc::now(),
        }
    }

    /// Summarise a trainer's collection.
    ///
    /// Every caught record counts toward `total_caught`, but several forms of one
    /// species only count once toward completion. Shinies must also be caught.
    pub fn compute(trainer_id: i64, pokemons: &[CaughtPokemon], last_caught: Option<u32>) -> Self {
        let caught = pokemons.iter().filter(|p| p.is_caught);
        let total_caught = caught.clone().count() as u32;
        let total_shiny = caught.clone().filter(|p| p.is_shiny).count() as u32;
        let species: HashSet<u32> = caught.map(|p| p.pokemon_id).collect();
        let completion_percentage = (species.len() as u32 * 100 / NATIONAL_DEX_SIZE).min(100);

        Self {
            trainer_id,
            total_caught,
            total_shiny,
            completion_percentage,
            last_caught_pokemon_id: last_caught,
            last_updated: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catch(pokemon_id: u32, form: Option<&str>, is_shiny: bool, is_caught: bool) -> CaughtPokemon {
        CaughtPokemon {
            trainer_id: 1,
            pokemon_id,
            is_shiny,
            is_caught,
            form_name: form.map(str::to_string),
            notes: None,
            caught_at: Utc::now(),
        }
    }

    #[test]
    fn empty_collection() {
        let progress = TrainerProgress::compute(1, &[], None);
        assert_eq!(progress.total_caught, 0);
        assert_eq!(progress.total_shiny, 0);
        assert_eq!(progress.completion_percentage, 0);
    }

    #[test]
    fn shiny_requires_caught_and_forms_count_once() {
        let pokemons = [
            catch(25, None, true, true),
            catch(52, None, false, true),
            catch(52, Some("Galar"), true, true),
            catch(133, None, true, false),
        ];
        let progress = TrainerProgress::compute(1, &pokemons, Some(52));

        assert_eq!(progress.total_caught, 3);
        assert_eq!(progress.total_shiny, 2);
        assert_eq!(progress.completion_percentage, 0);
        assert_eq!(progress.last_caught_pokemon_id, Some(52));
    }

    #[test]
    fn completion_floors() {
        // 512 species -> 49.95%
        let pokemons: Vec<_> = (1..=512).map(|id| catch(id, None, false, true)).collect();
        assert_eq!(TrainerProgress::compute(1, &pokemons, None).completion_percentage, 49);

        let pokemons: Vec<_> = (1..=NATIONAL_DEX_SIZE).map(|id| catch(id, None, false, true)).collect();
        assert_eq!(TrainerProgress::compute(1, &pokemons, None).completion_percentage, 100);
    }

    #[test]
    fn catch_validation() {
        let parse = |json: &str| serde_json::from_str::<UploadableCatch>(json).unwrap();

        let upload = parse(r#"{"pokemon_id": 25}"#);
        assert!(upload.is_valid());
        assert!(upload.is_caught);
        assert!(!upload.is_shiny);

        assert!(!parse(r#"{"pokemon_id": 0}"#).is_valid());
        assert!(!parse(r#"{"pokemon_id": 2000}"#).is_valid());
    }

    #[test]
    fn trainer_validation() {
        let parse = |json: &str| serde_json::from_str::<UploadableTrainer>(json).unwrap();
        assert!(parse(r#"{"email": "red@kanto.jp"}"#).is_valid());
        assert!(!parse(r#"{"email": "  "}"#).is_valid());
    }
}
