use anyhow::Context;
use axum::{extract::Path, Json};
use plateful_api::{
    perm, Account, AccountId, Category, CategoryId, Comment, CommentId, CommentSort, EditComment,
    Ingredient, IngredientId, Message, MessageId, NewAccount, NewCategory, NewComment,
    NewIngredient, NewMessage, NewPost, Order, Page, Post, PostFilters, PostId, PostSort,
    Requester,
};

use crate::{db, extractors::*, Error};

// Accounts

pub async fn admin_create_account(
    AdminAuth: AdminAuth,
    mut conn: PgConn,
    Json(data): Json<NewAccount>,
) -> Result<Json<Account>, Error> {
    data.validate()?;
    let account = Account {
        id: data.id,
        name: data.name,
    };
    db::create_account(&mut *conn, &account).await?;
    Ok(Json(account))
}

pub async fn account_list(mut conn: PgConn) -> Result<Json<Vec<Account>>, Error> {
    Ok(Json(
        db::fetch_accounts(&mut *conn)
            .await
            .context("fetching account list")?,
    ))
}

pub async fn account_detail(
    Path(account): Path<AccountId>,
    mut conn: PgConn,
) -> Result<Json<Account>, Error> {
    db::fetch_account(&mut *conn, account)
        .await
        .with_context(|| format!("fetching account {:?}", account))?
        .map(Json)
        .ok_or(Error::Api(plateful_api::Error::AccountNotFound(account)))
}

pub async fn account_posts(
    Path(account): Path<AccountId>,
    mut conn: PgConn,
) -> Result<Json<Vec<Post>>, Error> {
    Ok(Json(
        db::fetch_account_posts(&mut *conn, account)
            .await
            .with_context(|| format!("fetching posts of account {:?}", account))?,
    ))
}

// Posts

/// Query-string knobs shared by the listing routes. Unknown sort keys fall
/// back to date, unknown orders to descending; zero pages and limits take
/// the defaults.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    // post filters; comma-separated uuid lists like the original query API
    pub category: Option<String>,
    pub ingredient: Option<String>,
    pub author: Option<AccountId>,
    pub search: Option<String>,
}

fn parse_id_list<T>(list: &Option<String>, wrap: fn(plateful_api::Uuid) -> T) -> Result<Vec<T>, Error> {
    let list = match list {
        None => return Ok(Vec::new()),
        Some(list) => list,
    };
    list.split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            plateful_api::Uuid::try_from(s).map(wrap).map_err(|_| {
                Error::Api(plateful_api::Error::Validation(vec![
                    plateful_api::InvalidField {
                        field: String::from("filter"),
                        message: String::from("Filters must be comma-separated ids."),
                    },
                ]))
            })
        })
        .collect()
}

impl ListQuery {
    fn post_filters(&self) -> Result<PostFilters, Error> {
        Ok(PostFilters {
            categories: parse_id_list(&self.category, CategoryId)?,
            ingredients: parse_id_list(&self.ingredient, IngredientId)?,
            author: self.author,
            search: self.search.clone(),
        })
    }

    fn post_sorting(&self) -> (PostSort, Order, Page) {
        (
            PostSort::from_query(self.sort_by.as_deref()),
            Order::from_query(self.order.as_deref()),
            Page::posts(self.page, self.limit),
        )
    }

    fn comment_sorting(&self) -> (CommentSort, Order, Page) {
        (
            CommentSort::from_query(self.sort_by.as_deref()),
            Order::from_query(self.order.as_deref()),
            Page::comments(self.page, self.limit),
        )
    }
}

pub async fn post_create(
    Auth(author): Auth,
    mut conn: PgConn,
    Json(data): Json<NewPost>,
) -> Result<Json<Post>, Error> {
    data.validate()?;
    let post = Post::now(author, data);
    db::insert_post(&mut *conn, &post)
        .await
        .context("inserting post")?;
    Ok(Json(post))
}

pub async fn post_list(
    axum::extract::Query(q): axum::extract::Query<ListQuery>,
    mut conn: PgConn,
) -> Result<Json<(Vec<Post>, u64)>, Error> {
    let filters = q.post_filters()?;
    let (sort, order, page) = q.post_sorting();
    Ok(Json(
        db::search_posts(&mut *conn, &filters, sort, order, page)
            .await
            .context("searching posts")?,
    ))
}

pub async fn post_detail(
    Path(post): Path<PostId>,
    mut conn: PgConn,
) -> Result<Json<Post>, Error> {
    db::fetch_post(&mut *conn, post)
        .await
        .with_context(|| format!("fetching post {:?}", post))?
        .map(Json)
        .ok_or(Error::post_not_found(post))
}

pub async fn post_update(
    Auth(requester): Auth,
    Path(post): Path<PostId>,
    mut conn: PgConn,
    Json(data): Json<NewPost>,
) -> Result<Json<Post>, Error> {
    data.validate()?;
    let author = db::fetch_post_author(&mut *conn, post).await?;
    if requester != author {
        return Err(Error::permission_denied());
    }
    if !db::update_post(&mut *conn, post, &data)
        .await
        .with_context(|| format!("updating post {:?}", post))?
    {
        return Err(Error::post_not_found(post));
    }
    db::fetch_post(&mut *conn, post)
        .await
        .with_context(|| format!("fetching post {:?} back", post))?
        .map(Json)
        .ok_or(Error::post_not_found(post))
}

pub async fn post_delete(
    Auth(requester): Auth,
    Path(post): Path<PostId>,
    mut conn: PgConn,
) -> Result<(), Error> {
    let author = db::fetch_post_author(&mut *conn, post).await?;
    if requester != author {
        return Err(Error::permission_denied());
    }
    if !db::delete_post(&mut *conn, post)
        .await
        .with_context(|| format!("deleting post {:?}", post))?
    {
        return Err(Error::post_not_found(post));
    }
    Ok(())
}

// Comments

pub async fn comment_create(
    MaybeAuth(requester): MaybeAuth,
    Path(post): Path<PostId>,
    mut conn: PgConn,
    Json(data): Json<NewComment>,
) -> Result<Json<Comment>, Error> {
    data.validate()?;
    let comment = Comment::now(post, None, data, &requester);
    db::insert_comment(&mut *conn, &comment)
        .await
        .context("inserting comment")?;
    Ok(Json(comment))
}

pub async fn comment_reply(
    MaybeAuth(requester): MaybeAuth,
    Path((post, parent)): Path<(PostId, CommentId)>,
    mut conn: PgConn,
    Json(data): Json<NewComment>,
) -> Result<Json<Comment>, Error> {
    data.validate()?;
    let parent_comment = db::fetch_comment(&mut *conn, parent)
        .await
        .with_context(|| format!("fetching comment {:?}", parent))?
        .ok_or(Error::comment_not_found(parent))?;
    if parent_comment.post_id != post {
        // replying across posts is indistinguishable from replying to a
        // comment that does not exist under this post
        return Err(Error::comment_not_found(parent));
    }
    let comment = Comment::now(post, Some(parent), data, &requester);
    db::create_reply(&mut *conn, parent, &comment).await?;
    Ok(Json(comment))
}

pub async fn comment_list(
    Path(post): Path<PostId>,
    axum::extract::Query(q): axum::extract::Query<ListQuery>,
    mut conn: PgConn,
) -> Result<Json<Vec<Comment>>, Error> {
    let (sort, order, page) = q.comment_sorting();
    Ok(Json(
        db::list_comments(&mut *conn, post, sort, order, page)
            .await
            .with_context(|| format!("listing comments of post {:?}", post))?,
    ))
}

pub async fn comment_detail(
    Path((post, comment)): Path<(PostId, CommentId)>,
    mut conn: PgConn,
) -> Result<Json<Comment>, Error> {
    let c = db::fetch_comment(&mut *conn, comment)
        .await
        .with_context(|| format!("fetching comment {:?}", comment))?
        .ok_or(Error::comment_not_found(comment))?;
    if c.post_id != post {
        return Err(Error::comment_not_found(comment));
    }
    Ok(Json(c))
}

pub async fn comment_update(
    Auth(requester): Auth,
    Path((post, comment)): Path<(PostId, CommentId)>,
    mut conn: PgConn,
    Json(data): Json<EditComment>,
) -> Result<Json<Comment>, Error> {
    data.validate()?;
    let current = db::fetch_comment(&mut *conn, comment)
        .await
        .with_context(|| format!("fetching comment {:?}", comment))?
        .ok_or(Error::comment_not_found(comment))?;
    if current.post_id != post {
        return Err(Error::comment_not_found(comment));
    }
    if !perm::can_update(&Requester::Account(requester), &current) {
        return Err(Error::permission_denied());
    }
    if !db::update_comment(&mut *conn, comment, &data)
        .await
        .with_context(|| format!("updating comment {:?}", comment))?
    {
        // raced with a deletion; the comment is no longer editable
        return Err(Error::comment_not_found(comment));
    }
    Ok(Json(Comment {
        display_name: data.display_name,
        content: data.content,
        ..current
    }))
}

/// Tombstone view for a comment that kept its record, nothing for one that
/// was physically removed
pub async fn comment_delete(
    Auth(requester): Auth,
    Path((post, comment)): Path<(PostId, CommentId)>,
    mut conn: PgConn,
) -> Result<Json<Option<Comment>>, Error> {
    let mut current = db::fetch_comment(&mut *conn, comment)
        .await
        .with_context(|| format!("fetching comment {:?}", comment))?
        .ok_or(Error::comment_not_found(comment))?;
    if current.post_id != post {
        return Err(Error::comment_not_found(comment));
    }
    let post_author = db::fetch_post_author(&mut *conn, post).await?;
    if !perm::can_delete(&Requester::Account(requester), &current, post_author) {
        return Err(Error::permission_denied());
    }
    match db::delete_comment(&mut *conn, comment).await? {
        db::DeleteOutcome::Removed => Ok(Json(None)),
        db::DeleteOutcome::Tombstoned => {
            current.tombstone();
            Ok(Json(Some(current)))
        }
    }
}

// Categories

pub async fn category_list(mut conn: PgConn) -> Result<Json<Vec<Category>>, Error> {
    Ok(Json(
        db::fetch_categories(&mut *conn)
            .await
            .context("fetching category list")?,
    ))
}

pub async fn category_detail(
    Path(name): Path<String>,
    mut conn: PgConn,
) -> Result<Json<Category>, Error> {
    db::fetch_category_by_name(&mut *conn, &name)
        .await
        .with_context(|| format!("fetching category {:?}", name))?
        .map(Json)
        .ok_or(Error::Api(plateful_api::Error::CategoryNotFound(name)))
}

pub async fn category_posts(
    Path(category): Path<CategoryId>,
    axum::extract::Query(q): axum::extract::Query<ListQuery>,
    mut conn: PgConn,
) -> Result<Json<(Vec<Post>, u64)>, Error> {
    let filters = PostFilters {
        categories: vec![category],
        ..PostFilters::default()
    };
    let (sort, order, page) = q.post_sorting();
    Ok(Json(
        db::search_posts(&mut *conn, &filters, sort, order, page)
            .await
            .with_context(|| format!("searching posts of category {:?}", category))?,
    ))
}

pub async fn category_create(
    Auth(_requester): Auth,
    mut conn: PgConn,
    Json(data): Json<NewCategory>,
) -> Result<Json<Category>, Error> {
    data.validate()?;
    let category = Category::new(data);
    db::create_category(&mut *conn, &category).await?;
    Ok(Json(category))
}

pub async fn category_delete(
    Auth(_requester): Auth,
    Path(category): Path<CategoryId>,
    mut conn: PgConn,
) -> Result<(), Error> {
    if !db::delete_category(&mut *conn, category)
        .await
        .with_context(|| format!("deleting category {:?}", category))?
    {
        return Err(Error::Api(plateful_api::Error::CategoryNotFound(
            category.0.to_string(),
        )));
    }
    Ok(())
}

// Ingredients

pub async fn ingredient_list(mut conn: PgConn) -> Result<Json<Vec<Ingredient>>, Error> {
    Ok(Json(
        db::fetch_ingredients(&mut *conn)
            .await
            .context("fetching ingredient list")?,
    ))
}

pub async fn ingredient_detail(
    Path(name): Path<String>,
    mut conn: PgConn,
) -> Result<Json<Ingredient>, Error> {
    db::fetch_ingredient_by_name(&mut *conn, &name)
        .await
        .with_context(|| format!("fetching ingredient {:?}", name))?
        .map(Json)
        .ok_or(Error::Api(plateful_api::Error::IngredientNotFound(name)))
}

pub async fn ingredient_posts(
    Path(ingredient): Path<IngredientId>,
    axum::extract::Query(q): axum::extract::Query<ListQuery>,
    mut conn: PgConn,
) -> Result<Json<(Vec<Post>, u64)>, Error> {
    let filters = PostFilters {
        ingredients: vec![ingredient],
        ..PostFilters::default()
    };
    let (sort, order, page) = q.post_sorting();
    Ok(Json(
        db::search_posts(&mut *conn, &filters, sort, order, page)
            .await
            .with_context(|| format!("searching posts of ingredient {:?}", ingredient))?,
    ))
}

pub async fn ingredient_create(
    Auth(_requester): Auth,
    mut conn: PgConn,
    Json(data): Json<NewIngredient>,
) -> Result<Json<Ingredient>, Error> {
    data.validate()?;
    let ingredient = Ingredient::new(data);
    db::create_ingredient(&mut *conn, &ingredient).await?;
    Ok(Json(ingredient))
}

pub async fn ingredient_delete(
    Auth(_requester): Auth,
    Path(ingredient): Path<IngredientId>,
    mut conn: PgConn,
) -> Result<(), Error> {
    if !db::delete_ingredient(&mut *conn, ingredient)
        .await
        .with_context(|| format!("deleting ingredient {:?}", ingredient))?
    {
        return Err(Error::Api(plateful_api::Error::IngredientNotFound(
            ingredient.0.to_string(),
        )));
    }
    Ok(())
}

// Messages

pub async fn message_create(
    mut conn: PgConn,
    Json(data): Json<NewMessage>,
) -> Result<Json<Message>, Error> {
    data.validate()?;
    let message = Message::now(data);
    db::insert_message(&mut *conn, &message)
        .await
        .context("inserting message")?;
    Ok(Json(message))
}

pub async fn message_list(
    AdminAuth: AdminAuth,
    mut conn: PgConn,
) -> Result<Json<Vec<Message>>, Error> {
    Ok(Json(
        db::fetch_messages(&mut *conn)
            .await
            .context("fetching message list")?,
    ))
}

pub async fn message_detail(
    AdminAuth: AdminAuth,
    Path(message): Path<MessageId>,
    mut conn: PgConn,
) -> Result<Json<Message>, Error> {
    db::fetch_message(&mut *conn, message)
        .await
        .with_context(|| format!("fetching message {:?}", message))?
        .map(Json)
        .ok_or(Error::message_not_found(message))
}

pub async fn message_delete(
    AdminAuth: AdminAuth,
    Path(message): Path<MessageId>,
    mut conn: PgConn,
) -> Result<(), Error> {
    if !db::delete_message(&mut *conn, message)
        .await
        .with_context(|| format!("deleting message {:?}", message))?
    {
        return Err(Error::message_not_found(message));
    }
    Ok(())
}
