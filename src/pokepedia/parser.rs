//! Poképédia wikitext -> regional Pokédex numbers
//!
//! Two passes run over the same text. Prose mentions ("Kanto n°025") come first,
//! then infobox fields (`| numéro kanto = 025`). An infobox match always replaces
//! a prose match for the same region, wherever the two sit in the page.

use regex::Regex;

use crate::region::{Region, RegionalIdMap};

/// Rule pass. Lower passes run first; later passes overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Pass {
    /// Free text: region name, then the first 1-3 digit number on the same line
    Prose = 1,
    /// Infobox field `| numéro <region> = <number>`
    Table = 2,
}

/// One row of the rule table.
#[derive(Debug)]
pub struct Rule {
    pub region: Region,
    pub pass: Pass,
    pattern: Regex,
    /// Candidates whose matched text hits this pattern are skipped
    exclude: Option<Regex>,
}

impl Rule {
    fn new(region: Region, pass: Pass, pattern: &str, exclude: Option<&str>) -> Self {
        Self {
            region,
            pass,
            pattern: Regex::new(pattern).expect("invalid regional-id pattern"),
            exclude: exclude.map(|e| Regex::new(e).expect("invalid regional-id exclusion")),
        }
    }

    /// First qualifying number for this rule, if any.
    pub fn find(&self, wikitext: &str) -> Option<u16> {
        self.pattern
            .captures_iter(wikitext)
            .filter(|caps| match (&self.exclude, caps.get(0)) {
                (Some(exclude), Some(whole)) => !exclude.is_match(whole.as_str()),
                _ => true,
            })
            .find_map(|caps| {
                caps.get(1)
                    .and_then(|digits| digits.as_str().parse::<u16>().ok())
                    .filter(|&n| n > 0)
            })
    }
}

lazy_static::lazy_static! {
    /// Ordered rule table, prose rules first.
    ///
    /// Alola and Ultra-Alola share a name, so the base prose rule rejects any
    /// match mentioning "ultra" and the ultra rules only match when it is there.
    pub static ref RULES: Vec<Rule> = {
        let prose = |region, name: &str| {
            Rule::new(region, Pass::Prose, &format!(r"(?i){}[^0-9\n]*([0-9]{{1,3}})", name), None)
        };
        let table = |region, field: &str| {
            Rule::new(
                region,
                Pass::Table,
                &format!(r"(?i)\|\s*num[ée]ro\s*{}\s*=\s*0*([0-9]{{1,3}})", field),
                None,
            )
        };

        vec![
            prose(Region::Kanto, "kanto"),
            prose(Region::Johto, "johto"),
            prose(Region::Hoenn, "hoenn"),
            prose(Region::Sinnoh, "sinnoh"),
            prose(Region::Unys, "unys"),
            prose(Region::Kalos, "kalos"),
            Rule::new(
                Region::Alola,
                Pass::Prose,
                r"(?i)(?:ultra[-\s]?)?alola[^0-9\n]*([0-9]{1,3})",
                Some(r"(?i)ultra"),
            ),
            Rule::new(
                Region::AlolaUltra,
                Pass::Prose,
                r"(?i)(?:ultra[-\s]?alola|alola[^0-9\n]*ultra)[^0-9\n]*([0-9]{1,3})",
                None,
            ),
            prose(Region::LetsGo, r"let'?s?\s*go"),
            prose(Region::Galar, "galar"),
            prose(Region::Hisui, "hisui"),
            prose(Region::Paldea, "paldea"),
            prose(Region::IllumisZa, "(?:illumis|z-a)"),

            table(Region::Kanto, "kanto"),
            table(Region::Johto, "johto"),
            table(Region::Hoenn, "hoenn"),
            table(Region::Sinnoh, "sinnoh"),
            table(Region::Unys, "unys"),
            table(Region::Kalos, r"kalos(?:\s*centre)?"),
            table(Region::Alola, "alola"),
            table(Region::AlolaUltra, r"ultra[-\s]?alola"),
            table(Region::LetsGo, r"let'?s?[-\s]?go"),
            table(Region::Galar, "galar"),
            table(Region::Hisui, "hisui"),
            table(Region::Paldea, "paldea"),
            table(Region::IllumisZa, r"illumis(?:[-\s]?za)?"),
        ]
    };
}

/// Extract regional numbers from a page's wikitext.
///
/// `species` only shows up in diagnostics.
pub fn parse_regional_ids(wikitext: &str, species: &str) -> RegionalIdMap {
    let mut ids = RegionalIdMap::new();

    for pass in [Pass::Prose, Pass::Table] {
        for rule in RULES.iter().filter(|r| r.pass == pass) {
            if let Some(number) = rule.find(wikitext) {
                ids.insert(rule.region, number);
            }
        }
    }

    tracing::debug!(species, found = ids.len(), "parsed regional ids");
    ids
}
