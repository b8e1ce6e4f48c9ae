//! Create-input validation and object-store key derivation.

use std::collections::BTreeSet;

use bytes::Bytes;
use time::{Date, Month};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::errors::domain::{CatalogError, ValidationKind};

/// Release date as supplied by callers; every component is required and
/// zero means "missing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReleaseDateParts {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl ReleaseDateParts {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    pub fn to_date(self) -> Result<Date, CatalogError> {
        if self.year == 0 || self.month == 0 || self.day == 0 {
            return Err(CatalogError::invalid(
                ValidationKind::InvalidReleaseDate,
                "release date requires year, month and day",
            ));
        }
        let month = Month::try_from(self.month).map_err(|_| {
            CatalogError::invalid(
                ValidationKind::InvalidReleaseDate,
                format!("month {} is out of range", self.month),
            )
        })?;
        Date::from_calendar_date(self.year, month, self.day).map_err(|e| {
            CatalogError::invalid(
                ValidationKind::InvalidReleaseDate,
                format!("invalid release date: {e}"),
            )
        })
    }
}

/// Input of the create operation.
#[derive(Debug, Clone, Default)]
pub struct NewGame {
    pub title: String,
    pub description: String,
    pub release_date: ReleaseDateParts,
    pub cover: Option<Bytes>,
    pub tag_names: Vec<String>,
    pub genre_names: Vec<String>,
}

impl NewGame {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        release_date: ReleaseDateParts,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            release_date,
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_genres<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genre_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cover(mut self, cover: impl Into<Bytes>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    /// Check required fields and normalize name sets.
    pub fn validate(self) -> Result<ValidGame, CatalogError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(CatalogError::invalid(
                ValidationKind::MissingTitle,
                "title is required",
            ));
        }
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(CatalogError::invalid(
                ValidationKind::MissingDescription,
                "description is required",
            ));
        }
        let release_date = self.release_date.to_date()?;

        Ok(ValidGame {
            title,
            description,
            release_date,
            // An empty upload is the same as no upload.
            cover: self.cover.filter(|b| !b.is_empty()),
            tag_names: normalize_names(self.tag_names),
            genre_names: normalize_names(self.genre_names),
        })
    }
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidGame {
    pub title: String,
    pub description: String,
    pub release_date: Date,
    pub cover: Option<Bytes>,
    pub tag_names: BTreeSet<String>,
    pub genre_names: BTreeSet<String>,
}

impl ValidGame {
    pub fn release_year(&self) -> i32 {
        self.release_date.year()
    }

    pub fn image_key(&self) -> String {
        image_key(&self.title, self.release_year())
    }
}

/// Trim, drop blanks, dedupe.
pub fn normalize_names<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

/// URL-safe slug: ASCII-folded, lowercase, runs of anything else collapsed to `-`.
pub fn slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.nfkd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Object-store key of a game's cover image.
pub fn image_key(title: &str, release_year: i32) -> String {
    format!("{}_{}", slug(title), release_year)
}

/// Inclusive `[Jan 1, Dec 31]` range of `year`.
///
/// Used instead of a backend-specific "extract year" so the same predicate
/// runs on every supported database. Both ends lie inside the year, so every
/// year a release date can carry has bounds. `None` when the year is outside
/// the representable calendar.
pub fn year_bounds(year: i32) -> Option<(Date, Date)> {
    let start = Date::from_calendar_date(year, Month::January, 1).ok()?;
    let end = Date::from_calendar_date(year, Month::December, 31).ok()?;
    Some((start, end))
}
