use plateful_api::{CommentSort, Order, PostFilters, PostSort, Uuid};

pub enum Bind {
    Uuid(Uuid),
    UuidArray(Vec<Uuid>),
    String(String),
}

#[derive(Default)]
pub struct Sql {
    pub where_clause: String,
    pub binds: Vec<Bind>,
}

impl Sql {
    /// Adds a Bind, returning the index that should be used to refer to it
    /// assuming the first bind is at index first_bind_idx
    fn add_bind(&mut self, first_bind_idx: usize, b: Bind) -> usize {
        let res = first_bind_idx + self.binds.len();
        self.binds.push(b);
        res
    }

    pub fn bind_all<'q>(
        self,
        query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        let mut query = query;
        for b in self.binds {
            query = match b {
                Bind::Uuid(u) => query.bind(u),
                Bind::UuidArray(us) => query.bind(us),
                Bind::String(s) => query.bind(s),
            };
        }
        query
    }
}

/// Translates the public post-list filters to a WHERE clause over the
/// `posts` table. Only published posts are ever listed; category and
/// ingredient filters are containment tests so every requested tag must be
/// present on the post.
pub fn post_filters_to_sql(filters: &PostFilters, first_bind_idx: usize) -> Sql {
    let mut res = Sql::default();
    res.where_clause.push_str("published = true");
    if !filters.categories.is_empty() {
        let idx = res.add_bind(
            first_bind_idx,
            Bind::UuidArray(filters.categories.iter().map(|c| c.0).collect()),
        );
        res.where_clause
            .push_str(&format!(" AND categories @> ${idx}"));
    }
    if !filters.ingredients.is_empty() {
        let idx = res.add_bind(
            first_bind_idx,
            Bind::UuidArray(filters.ingredients.iter().map(|i| i.0).collect()),
        );
        res.where_clause
            .push_str(&format!(" AND ingredients @> ${idx}"));
    }
    if let Some(author) = &filters.author {
        let idx = res.add_bind(first_bind_idx, Bind::Uuid(author.0));
        res.where_clause.push_str(&format!(" AND author = ${idx}"));
    }
    if let Some(search) = &filters.search {
        let idx = res.add_bind(first_bind_idx, Bind::String(search.clone()));
        res.where_clause
            .push_str(&format!(" AND title ILIKE '%' || ${idx} || '%'"));
    }
    res
}

/// ORDER BY for post lists. The trailing `created_at ASC, id ASC` keeps
/// pages stable when the primary key ties.
pub fn post_order_clause(sort: PostSort, order: Order) -> &'static str {
    match (sort, order) {
        (PostSort::Date, Order::Asc) => "created_at ASC, id ASC",
        (PostSort::Date, Order::Desc) => "created_at DESC, id ASC",
        (PostSort::Alphabetical, Order::Asc) => "lower(title) ASC, created_at ASC, id ASC",
        (PostSort::Alphabetical, Order::Desc) => "lower(title) DESC, created_at ASC, id ASC",
        (PostSort::Popularity, Order::Asc) => "likes ASC, created_at ASC, id ASC",
        (PostSort::Popularity, Order::Desc) => "likes DESC, created_at ASC, id ASC",
    }
}

// See comment on post_order_clause
pub fn comment_order_clause(sort: CommentSort, order: Order) -> &'static str {
    match (sort, order) {
        (CommentSort::Date, Order::Asc) => "created_at ASC, id ASC",
        (CommentSort::Date, Order::Desc) => "created_at DESC, id ASC",
        (CommentSort::Popularity, Order::Asc) => "likes ASC, created_at ASC, id ASC",
        (CommentSort::Popularity, Order::Desc) => "likes DESC, created_at ASC, id ASC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateful_api::{AccountId, CategoryId};

    #[test]
    fn filters_compose_with_stable_bind_indices() {
        let sql = post_filters_to_sql(&PostFilters::default(), 1);
        assert_eq!(sql.where_clause, "published = true");
        assert_eq!(sql.binds.len(), 0);

        let sql = post_filters_to_sql(
            &PostFilters {
                categories: vec![CategoryId::stub()],
                ingredients: Vec::new(),
                author: Some(AccountId::stub()),
                search: Some(String::from("soup")),
            },
            3,
        );
        assert_eq!(
            sql.where_clause,
            "published = true AND categories @> $3 AND author = $4 AND title ILIKE '%' || $5 || '%'"
        );
        assert_eq!(sql.binds.len(), 3);
    }
}
