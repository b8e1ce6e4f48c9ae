//! Faceted listing: filters as requested, and the facet plan both
//! repository implementations execute.
//!
//! Facets are AND-ed together. Inside the tag facet and the genre facet the
//! requested names are alternatives (a game needs at least one of them).
//! An absent facet is not applied at all.

use std::collections::BTreeSet;

use serde::Deserialize;
use time::Date;

use super::game::{normalize_names, year_bounds};
use crate::domain::status::GameStatus;

pub const DEFAULT_LIST_LIMIT: u64 = 10;

/// Caller-facing listing filters. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameFilters {
    /// Exact release year; `None` or `Some(0)` disables the facet.
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
}

impl GameFilters {
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_tags<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_names(names);
        self
    }

    pub fn with_genres<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.genres = normalize_names(names);
        self
    }
}

/// One AND-ed condition of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Facet {
    Status(GameStatus),
    /// Release date inside `[start, end]`.
    ReleaseYear { year: i32, start: Date, end: Date },
    /// Year outside the representable calendar; matches nothing.
    Unsatisfiable,
    AnyTag(BTreeSet<String>),
    AnyGenre(BTreeSet<String>),
}

/// What a listing needs to know about one game to evaluate facets.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub status: GameStatus,
    pub release_date: Date,
    pub tags: BTreeSet<&'a str>,
    pub genres: BTreeSet<&'a str>,
}

/// Facet composition and limit of one "top games" query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPlan {
    facets: Vec<Facet>,
    limit: u64,
}

impl ListingPlan {
    /// Only published games are listed. `limit == 0` means the default.
    pub fn from_filters(filters: &GameFilters, limit: u64) -> Self {
        let mut facets = vec![Facet::Status(GameStatus::Publish)];

        match filters.year {
            Some(year) if year != 0 => match year_bounds(year) {
                Some((start, end)) => facets.push(Facet::ReleaseYear { year, start, end }),
                None => facets.push(Facet::Unsatisfiable),
            },
            _ => {}
        }

        let tags = normalize_names(&filters.tags);
        if !tags.is_empty() {
            facets.push(Facet::AnyTag(tags));
        }
        let genres = normalize_names(&filters.genres);
        if !genres.is_empty() {
            facets.push(Facet::AnyGenre(genres));
        }

        Self {
            facets,
            limit: if limit == 0 { DEFAULT_LIST_LIMIT } else { limit },
        }
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn is_unsatisfiable(&self) -> bool {
        self.facets.contains(&Facet::Unsatisfiable)
    }

    pub fn matches(&self, candidate: &Candidate<'_>) -> bool {
        self.facets.iter().all(|facet| match facet {
            Facet::Status(status) => candidate.status == *status,
            Facet::ReleaseYear { start, end, .. } => {
                candidate.release_date >= *start && candidate.release_date <= *end
            }
            Facet::Unsatisfiable => false,
            Facet::AnyTag(names) => names.iter().any(|n| candidate.tags.contains(n.as_str())),
            Facet::AnyGenre(names) => names.iter().any(|n| candidate.genres.contains(n.as_str())),
        })
    }
}
