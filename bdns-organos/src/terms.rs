//! Co-official language variants of local-government vocabulary
//!
//! BDNS feeds name the same town hall "AYUNTAMIENTO DE GIRONA",
//! "AJUNTAMENT DE GIRONA", "CONCELLO DE VIGO" or "BILBOKO UDALA" depending
//! on year and source. [`term_variants`] recognizes the entity term in an
//! already normalized name and renders the same entity and place in every
//! other language, so the resolver can retry with those spellings.
//!
//! Only the entity term is translated; the place name is kept verbatim
//! apart from the Basque genitive ending.

use std::collections::BTreeSet;

/// Language a term belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Spanish,
    Catalan,
    Basque,
    Galician,
}

/// Local-government entity kinds with multilingual names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalEntity {
    TownHall,
    ProvincialCouncil,
    Commonwealth,
    IslandCouncil,
}

#[derive(Debug, Clone, Copy)]
enum Form {
    /// `"{term}{place}"`, term includes its trailing space or apostrophe
    Prefix(&'static str),
    /// `"{place}{term}"`, term includes its leading space
    Suffix(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct Term {
    entity: LocalEntity,
    language: Language,
    form: Form,
    /// Used when rendering; abbreviations are only recognized
    render: bool,
}

const fn term(entity: LocalEntity, language: Language, form: Form, render: bool) -> Term {
    Term {
        entity,
        language,
        form,
        render,
    }
}

use Form::{Prefix, Suffix};
use Language::{Basque, Catalan, Galician, Spanish};
use LocalEntity::{Commonwealth, IslandCouncil, ProvincialCouncil, TownHall};

const TERMS: &[Term] = &[
    term(TownHall, Spanish, Prefix("AYUNTAMIENTO DE "), true),
    term(TownHall, Spanish, Prefix("AYTO. DE "), false),
    term(TownHall, Spanish, Prefix("AYTO DE "), false),
    term(TownHall, Spanish, Prefix("AYTO. "), false),
    term(TownHall, Catalan, Prefix("AJUNTAMENT DE "), true),
    term(TownHall, Catalan, Prefix("AJUNTAMENT D'"), true),
    term(TownHall, Galician, Prefix("CONCELLO DE "), true),
    term(TownHall, Basque, Suffix(" UDALA"), true),
    term(TownHall, Basque, Suffix(" UDALETXEA"), false),
    term(ProvincialCouncil, Spanish, Prefix("DIPUTACION PROVINCIAL DE "), false),
    term(ProvincialCouncil, Spanish, Prefix("DIPUTACION DE "), true),
    term(ProvincialCouncil, Catalan, Prefix("DIPUTACIO DE "), true),
    term(ProvincialCouncil, Catalan, Prefix("DIPUTACIO D'"), true),
    term(ProvincialCouncil, Galician, Prefix("DEPUTACION DE "), true),
    term(ProvincialCouncil, Basque, Suffix(" FORU ALDUNDIA"), true),
    term(Commonwealth, Spanish, Prefix("MANCOMUNIDAD DE "), true),
    term(Commonwealth, Catalan, Prefix("MANCOMUNITAT DE "), true),
    term(Commonwealth, Catalan, Prefix("MANCOMUNITAT D'"), true),
    term(Commonwealth, Galician, Prefix("MANCOMUNIDADE DE "), true),
    term(Commonwealth, Basque, Suffix(" MANKOMUNITATEA"), true),
    term(IslandCouncil, Spanish, Prefix("CONSEJO INSULAR DE "), true),
    term(IslandCouncil, Catalan, Prefix("CONSELL INSULAR DE "), true),
    term(IslandCouncil, Catalan, Prefix("CONSELL INSULAR D'"), true),
];

/// A recognized entity term plus the place it governs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityName {
    pub entity: LocalEntity,
    pub language: Language,
    pub place: String,
}

/// Recognize the entity term in a normalized name (longest term wins)
pub fn recognize(normalized: &str) -> Option<EntityName> {
    let mut best: Option<(usize, EntityName)> = None;

    for t in TERMS {
        let (len, place) = match t.form {
            Prefix(p) => match normalized.strip_prefix(p) {
                Some(place) => (p.len(), place.to_string()),
                None => continue,
            },
            Suffix(s) => match normalized.strip_suffix(s) {
                Some(place) => (s.len(), strip_genitive(place).to_string()),
                None => continue,
            },
        };

        if place.is_empty() || best.as_ref().is_some_and(|(l, _)| *l >= len) {
            continue;
        }

        best = Some((
            len,
            EntityName {
                entity: t.entity,
                language: t.language,
                place,
            },
        ));
    }

    best.map(|(_, name)| name)
}

/// Every rendering of `entity` for `place` across all languages
pub fn render(entity: LocalEntity, place: &str) -> Vec<String> {
    let mut out = Vec::new();

    for t in TERMS.iter().filter(|t| t.entity == entity && t.render) {
        match t.form {
            Prefix(p) if p.ends_with('\'') => {
                if starts_with_vowel(place) {
                    out.push(format!("{}{}", p, place));
                }
            }
            Prefix(p) => {
                if !(t.language == Catalan && starts_with_vowel(place)) {
                    out.push(format!("{}{}", p, place));
                }
            }
            Suffix(s) => {
                out.push(format!("{}{}", place, s));
                out.push(format!("{}{}{}", place, genitive_ending(place), s));
            }
        }
    }

    out
}

/// Equivalent spellings of a normalized local-body name, excluding itself
pub fn term_variants(normalized: &str) -> Vec<String> {
    let Some(name) = recognize(normalized) else {
        return Vec::new();
    };

    let variants: BTreeSet<String> = render(name.entity, &name.place)
        .into_iter()
        .filter(|v| v != normalized)
        .collect();

    variants.into_iter().collect()
}

fn starts_with_vowel(place: &str) -> bool {
    place.starts_with(['A', 'E', 'I', 'O', 'U', 'H'])
}

/// Basque genitive: "-GO" after N or L, "-KO" otherwise
fn genitive_ending(place: &str) -> &'static str {
    if place.ends_with(['N', 'L']) {
        "GO"
    } else {
        "KO"
    }
}

fn strip_genitive(place: &str) -> &str {
    for ending in ["-KO", "-GO", "KO", "GO"] {
        if let Some(stem) = place.strip_suffix(ending) {
            if stem.len() >= 3 {
                return stem;
            }
        }
    }
    place
}
