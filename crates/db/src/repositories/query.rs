//! Filter and pagination building shared by list queries.

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Select,
};
use tally_core::listing::{DateRange, ListFilter, SearchTerm};
use tally_shared::{PageRequest, PagedList};
use uuid::Uuid;

/// `LOWER(col) LIKE %term%` over every column, OR-ed together.
pub fn search_condition<C: ColumnTrait>(columns: &[C], term: &SearchTerm) -> Condition {
    let pattern = term.like_pattern();
    columns.iter().fold(Condition::any(), |condition, column| {
        condition.add(
            Expr::expr(Func::lower(Expr::col(*column)))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
    })
}

/// Inclusive `from <= col <= to` condition.
pub fn date_condition<C: ColumnTrait>(column: C, range: &DateRange) -> Condition {
    Condition::all()
        .add(column.gte(range.from))
        .add(column.lte(range.to))
}

/// Applies the search term and, when `date_column` is given, the date range.
pub fn apply_listing<E: EntityTrait>(
    mut select: Select<E>,
    filter: &ListFilter,
    search_columns: &[E::Column],
    date_column: Option<E::Column>,
) -> Select<E> {
    if let Some(term) = &filter.search
        && !search_columns.is_empty()
    {
        select = select.filter(search_condition(search_columns, term));
    }
    if let (Some(range), Some(column)) = (&filter.range, date_column) {
        select = select.filter(date_condition(column, range));
    }
    select
}

/// Counts matches and fetches one page.
///
/// The offset comes from [`PageRequest::offset`], which cannot overflow.
pub async fn paginate<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    page: &PageRequest,
) -> Result<PagedList<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let total = select.clone().count(db).await?;
    let items = select
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?;
    Ok(PagedList::new(items, page, total))
}

/// Counts rows of `E` whose `column` points at `id`.
pub async fn count_references<E>(
    db: &DatabaseConnection,
    column: E::Column,
    id: Uuid,
) -> Result<u64, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
{
    E::find().filter(column.eq(id)).count(db).await
}
