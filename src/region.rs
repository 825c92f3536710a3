use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Regional Pokédex variants tracked per species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    Kanto,
    Johto,
    Hoenn,
    Sinnoh,
    Unys,
    Kalos,
    Alola,
    /// Ultra Sun / Ultra Moon Alola dex, numbered apart from the base Alola dex
    AlolaUltra,
    LetsGo,
    Galar,
    Hisui,
    Paldea,
    IllumisZa,
}

impl Region {
    #[cfg(test)]
    pub const ALL: [Region; 13] = [
        Region::Kanto,
        Region::Johto,
        Region::Hoenn,
        Region::Sinnoh,
        Region::Unys,
        Region::Kalos,
        Region::Alola,
        Region::AlolaUltra,
        Region::LetsGo,
        Region::Galar,
        Region::Hisui,
        Region::Paldea,
        Region::IllumisZa,
    ];

    /// Key used in JSON payloads and the fallback dataset.
    pub fn key(self) -> &'static str {
        match self {
            Region::Kanto => "kanto",
            Region::Johto => "johto",
            Region::Hoenn => "hoenn",
            Region::Sinnoh => "sinnoh",
            Region::Unys => "unys",
            Region::Kalos => "kalos",
            Region::Alola => "alola",
            Region::AlolaUltra => "alola-ultra",
            Region::LetsGo => "lets-go",
            Region::Galar => "galar",
            Region::Hisui => "hisui",
            Region::Paldea => "paldea",
            Region::IllumisZa => "illumis-za",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Region -> regional Pokédex number. A missing key means "unknown", never zero.
pub type RegionalIdMap = BTreeMap<Region, u16>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_keys_match_key() {
        for region in Region::ALL {
            let json = serde_json::to_string(&region).unwrap();
            assert_eq!(json, format!("\"{}\"", region.key()));
        }
    }

    #[test]
    fn map_deserializes_from_dataset_shape() {
        let map: RegionalIdMap =
            serde_json::from_str(r#"{"kanto": 25, "alola-ultra": 32, "lets-go": 25}"#).unwrap();
        assert_eq!(map.get(&Region::Kanto), Some(&25));
        assert_eq!(map.get(&Region::AlolaUltra), Some(&32));
        assert_eq!(map.get(&Region::LetsGo), Some(&25));
        assert_eq!(map.len(), 3);
    }
}
