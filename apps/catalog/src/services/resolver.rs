//! Tag/genre name resolution. Fails closed: every requested name must exist.

use std::collections::BTreeSet;

use tracing::debug;

use crate::errors::domain::{CatalogError, NotFoundKind};
use crate::repos::catalog::{CatalogRepo, NamedRef};
use crate::request::RequestCtx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Tag,
    Genre,
}

impl RefKind {
    fn label(self) -> &'static str {
        match self {
            RefKind::Tag => "tags",
            RefKind::Genre => "genres",
        }
    }

    fn not_found_kind(self) -> NotFoundKind {
        match self {
            RefKind::Tag => NotFoundKind::Tag,
            RefKind::Genre => NotFoundKind::Genre,
        }
    }
}

/// Map `names` to existing references. Empty input does not hit the store.
pub async fn resolve_by_names(
    repo: &dyn CatalogRepo,
    ctx: &RequestCtx,
    kind: RefKind,
    names: &BTreeSet<String>,
) -> Result<Vec<NamedRef>, CatalogError> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let found = match kind {
        RefKind::Tag => {
            ctx.guard("find_tags_by_names", repo.find_tags_by_names(ctx, names))
                .await??
        }
        RefKind::Genre => {
            ctx.guard("find_genres_by_names", repo.find_genres_by_names(ctx, names))
                .await??
        }
    };

    if found.len() < names.len() {
        let known: BTreeSet<&str> = found.iter().map(|r| r.name.as_str()).collect();
        let missing: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|n| !known.contains(n))
            .collect();
        debug!(request_id = %ctx.request_id(), kind = kind.label(), ?missing, "unresolved names");
        return Err(CatalogError::not_found(
            kind.not_found_kind(),
            format!("{} not found: {}", kind.label(), missing.join(", ")),
        ));
    }

    Ok(found)
}
