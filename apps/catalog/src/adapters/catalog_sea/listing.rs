//! Translation of a `ListingPlan` into a sea-query condition.
//!
//! Composition lives in `domain::filters`; this module only maps each facet
//! to a predicate and leaves value binding to sea-query.

use std::collections::BTreeSet;

use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};

use crate::domain::filters::{Facet, ListingPlan};
use crate::entities::{game_genres, game_tags, games, genres, tags};

/// `SELECT game_tag.game_id FROM game_tag JOIN tag ... WHERE tag.name IN (...)`
fn games_with_any_tag(names: &BTreeSet<String>) -> SelectStatement {
    Query::select()
        .column((game_tags::Entity, game_tags::Column::GameId))
        .from(game_tags::Entity)
        .inner_join(
            tags::Entity,
            Expr::col((tags::Entity, tags::Column::Id))
                .equals((game_tags::Entity, game_tags::Column::TagId)),
        )
        .and_where(Expr::col((tags::Entity, tags::Column::Name)).is_in(names.iter().cloned()))
        .to_owned()
}

fn games_with_any_genre(names: &BTreeSet<String>) -> SelectStatement {
    Query::select()
        .column((game_genres::Entity, game_genres::Column::GameId))
        .from(game_genres::Entity)
        .inner_join(
            genres::Entity,
            Expr::col((genres::Entity, genres::Column::Id))
                .equals((game_genres::Entity, game_genres::Column::GenreId)),
        )
        .and_where(
            Expr::col((genres::Entity, genres::Column::Name)).is_in(names.iter().cloned()),
        )
        .to_owned()
}

pub(crate) fn facet_condition(facet: &Facet) -> Condition {
    match facet {
        Facet::Status(status) => Condition::all().add(games::Column::Status.eq(*status)),
        Facet::ReleaseYear { start, end, .. } => Condition::all()
            .add(games::Column::ReleaseDate.gte(*start))
            .add(games::Column::ReleaseDate.lte(*end)),
        Facet::Unsatisfiable => Condition::all().add(Expr::val(1).eq(0)),
        Facet::AnyTag(names) => {
            Condition::all().add(games::Column::Id.in_subquery(games_with_any_tag(names)))
        }
        Facet::AnyGenre(names) => {
            Condition::all().add(games::Column::Id.in_subquery(games_with_any_genre(names)))
        }
    }
}

/// All facets AND-ed.
pub(crate) fn plan_condition(plan: &ListingPlan) -> Condition {
    plan.facets()
        .iter()
        .fold(Condition::all(), |cond, facet| cond.add(facet_condition(facet)))
}

pub(crate) fn listing_select(plan: &ListingPlan) -> Select<games::Entity> {
    games::Entity::find()
        .filter(plan_condition(plan))
        .order_by_asc(games::Column::Title)
        .order_by_asc(games::Column::ReleaseDate)
        .order_by_asc(games::Column::Id)
        .limit(plan.limit())
}
