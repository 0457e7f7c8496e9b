use anyhow::Context;
use futures::TryStreamExt;
use plateful_api::{
    Account, AccountId, AuthToken, Category, CategoryId, Comment, CommentId, CommentSort,
    EditComment, Ingredient, IngredientId, Message, MessageId, NewPost, Order, Page, Post,
    PostFilters, PostId, PostSort, Time, TOMBSTONE,
};
use sqlx::{Acquire, Row};
use uuid::Uuid;

use crate::{query, Error};

pub async fn recover_session(
    conn: &mut sqlx::PgConnection,
    token: AuthToken,
) -> Result<AccountId, Error> {
    let row = sqlx::query("SELECT account_id FROM sessions WHERE token = $1")
        .bind(token.0)
        .fetch_optional(conn)
        .await
        .context("querying sessions table")?;
    match row {
        None => Err(Error::permission_denied()),
        Some(row) => Ok(AccountId(
            row.try_get("account_id")
                .context("retrieving the account_id field")?,
        )),
    }
}

// Accounts

pub async fn create_account(
    conn: &mut sqlx::PgConnection,
    account: &Account,
) -> Result<(), Error> {
    let name_taken = sqlx::query("SELECT id FROM accounts WHERE name = $1")
        .bind(&account.name)
        .fetch_optional(&mut *conn)
        .await
        .context("checking for account name reuse")?;
    if name_taken.is_some() {
        return Err(Error::name_already_used(account.name.clone()));
    }
    let inserted = sqlx::query("INSERT INTO accounts VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
        .bind(account.id.0)
        .bind(&account.name)
        .execute(conn)
        .await
        .with_context(|| format!("inserting account {:?}", account.id))?;
    if inserted.rows_affected() == 0 {
        return Err(Error::uuid_already_used(account.id.0));
    }
    Ok(())
}

pub async fn fetch_accounts(conn: &mut sqlx::PgConnection) -> anyhow::Result<Vec<Account>> {
    Ok(
        sqlx::query_as::<_, (Uuid, String)>("SELECT id, name FROM accounts ORDER BY name")
            .fetch(conn)
            .map_ok(|(id, name)| Account {
                id: AccountId(id),
                name,
            })
            .try_collect::<Vec<Account>>()
            .await
            .context("querying accounts table")?,
    )
}

pub async fn fetch_account(
    conn: &mut sqlx::PgConnection,
    id: AccountId,
) -> anyhow::Result<Option<Account>> {
    let row = sqlx::query_as::<_, (String,)>("SELECT name FROM accounts WHERE id = $1")
        .bind(id.0)
        .fetch_optional(conn)
        .await
        .context("querying accounts table")?;
    Ok(row.map(|(name,)| Account { id, name }))
}

// Posts

const POST_FIELDS: &str = "id, author, title, description, text, prep_time, cook_time, serves, \
                           categories, ingredients, likes, published, created_at";

fn post_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<Post> {
    Ok(Post {
        id: PostId(row.try_get("id").context("retrieving the id field")?),
        author: AccountId(
            row.try_get("author")
                .context("retrieving the author field")?,
        ),
        title: row.try_get("title").context("retrieving the title field")?,
        description: row
            .try_get("description")
            .context("retrieving the description field")?,
        text: row.try_get("text").context("retrieving the text field")?,
        prep_time: row
            .try_get("prep_time")
            .context("retrieving the prep_time field")?,
        cook_time: row
            .try_get("cook_time")
            .context("retrieving the cook_time field")?,
        serves: row
            .try_get("serves")
            .context("retrieving the serves field")?,
        categories: row
            .try_get::<Vec<Uuid>, _>("categories")
            .context("retrieving the categories field")?
            .into_iter()
            .map(CategoryId)
            .collect(),
        ingredients: row
            .try_get::<Vec<Uuid>, _>("ingredients")
            .context("retrieving the ingredients field")?
            .into_iter()
            .map(IngredientId)
            .collect(),
        likes: row.try_get("likes").context("retrieving the likes field")?,
        published: row
            .try_get("published")
            .context("retrieving the published field")?,
        created_at: row
            .try_get::<Time, _>("created_at")
            .context("retrieving the created_at field")?,
    })
}

pub async fn insert_post(conn: &mut sqlx::PgConnection, post: &Post) -> anyhow::Result<()> {
    let res = sqlx::query(
        "INSERT INTO posts VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(post.id.0)
    .bind(post.author.0)
    .bind(&post.title)
    .bind(&post.description)
    .bind(&post.text)
    .bind(&post.prep_time)
    .bind(&post.cook_time)
    .bind(&post.serves)
    .bind(post.categories.iter().map(|c| c.0).collect::<Vec<Uuid>>())
    .bind(post.ingredients.iter().map(|i| i.0).collect::<Vec<Uuid>>())
    .bind(post.likes)
    .bind(post.published)
    .bind(post.created_at)
    .execute(conn)
    .await
    .with_context(|| format!("inserting post {:?}", post.id))?;
    anyhow::ensure!(
        res.rows_affected() == 1,
        "insertion of post {:?} affected {} rows",
        post.id,
        res.rows_affected()
    );
    Ok(())
}

pub async fn fetch_post(
    conn: &mut sqlx::PgConnection,
    id: PostId,
) -> anyhow::Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {POST_FIELDS} FROM posts WHERE id = $1"))
        .bind(id.0)
        .fetch_optional(conn)
        .await
        .context("querying posts table")?;
    row.map(|r| post_from_row(&r)).transpose()
}

/// The post-authority lookup: which account moderates comments under this
/// post. Missing post is a domain answer here, not a storage failure.
pub async fn fetch_post_author(
    conn: &mut sqlx::PgConnection,
    id: PostId,
) -> Result<AccountId, Error> {
    let row = sqlx::query("SELECT author FROM posts WHERE id = $1")
        .bind(id.0)
        .fetch_optional(conn)
        .await
        .context("querying posts table")?;
    match row {
        None => Err(Error::post_not_found(id)),
        Some(row) => Ok(AccountId(
            row.try_get("author")
                .context("retrieving the author field")?,
        )),
    }
}

pub async fn update_post(
    conn: &mut sqlx::PgConnection,
    id: PostId,
    data: &NewPost,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        "
            UPDATE posts
            SET title = $2, description = $3, text = $4, prep_time = $5,
                cook_time = $6, serves = $7, categories = $8, ingredients = $9,
                published = $10
            WHERE id = $1
        ",
    )
    .bind(id.0)
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.text)
    .bind(&data.prep_time)
    .bind(&data.cook_time)
    .bind(&data.serves)
    .bind(data.categories.iter().map(|c| c.0).collect::<Vec<Uuid>>())
    .bind(data.ingredients.iter().map(|i| i.0).collect::<Vec<Uuid>>())
    .bind(data.published)
    .execute(conn)
    .await
    .with_context(|| format!("updating post {:?}", id))?;
    Ok(res.rows_affected() == 1)
}

/// Comments go with the post (ON DELETE CASCADE on comments.post_id)
pub async fn delete_post(conn: &mut sqlx::PgConnection, id: PostId) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id.0)
        .execute(conn)
        .await
        .with_context(|| format!("deleting post {:?}", id))?;
    Ok(res.rows_affected() == 1)
}

pub async fn search_posts(
    conn: &mut sqlx::PgConnection,
    filters: &PostFilters,
    sort: PostSort,
    order: Order,
    page: Page,
) -> anyhow::Result<(Vec<Post>, u64)> {
    let sql = query::post_filters_to_sql(filters, 1);
    let select = format!(
        "SELECT {POST_FIELDS} FROM posts WHERE {} ORDER BY {} LIMIT {} OFFSET {}",
        sql.where_clause,
        query::post_order_clause(sort, order),
        page.limit(),
        page.offset(),
    );
    let rows = sql
        .bind_all(sqlx::query(&select))
        .fetch_all(&mut *conn)
        .await
        .context("querying posts table")?;
    let posts = rows
        .iter()
        .map(post_from_row)
        .collect::<anyhow::Result<Vec<Post>>>()?;

    let sql = query::post_filters_to_sql(filters, 1);
    let count = format!("SELECT COUNT(*) FROM posts WHERE {}", sql.where_clause);
    let count: i64 = sql
        .bind_all(sqlx::query(&count))
        .fetch_one(conn)
        .await
        .context("counting matching posts")?
        .try_get(0)
        .context("retrieving the count")?;
    Ok((posts, count as u64))
}

/// All posts of one author, unpublished included: this is the author's own
/// shelf, not the public list.
pub async fn fetch_account_posts(
    conn: &mut sqlx::PgConnection,
    author: AccountId,
) -> anyhow::Result<Vec<Post>> {
    let rows = sqlx::query(&format!(
        "SELECT {POST_FIELDS} FROM posts WHERE author = $1 ORDER BY created_at DESC, id ASC"
    ))
    .bind(author.0)
    .fetch_all(conn)
    .await
    .context("querying posts table")?;
    rows.iter().map(post_from_row).collect()
}

// Categories and ingredients

pub async fn fetch_categories(conn: &mut sqlx::PgConnection) -> anyhow::Result<Vec<Category>> {
    Ok(sqlx::query_as::<_, (Uuid, String, Option<String>)>(
        "SELECT id, name, description FROM categories ORDER BY lower(name) ASC",
    )
    .fetch(conn)
    .map_ok(|(id, name, description)| Category {
        id: CategoryId(id),
        name,
        description,
    })
    .try_collect::<Vec<Category>>()
    .await
    .context("querying categories table")?)
}

pub async fn fetch_category_by_name(
    conn: &mut sqlx::PgConnection,
    name: &str,
) -> anyhow::Result<Option<Category>> {
    let row = sqlx::query_as::<_, (Uuid, String, Option<String>)>(
        "SELECT id, name, description FROM categories WHERE lower(name) = lower($1)",
    )
    .bind(name)
    .fetch_optional(conn)
    .await
    .context("querying categories table")?;
    Ok(row.map(|(id, name, description)| Category {
        id: CategoryId(id),
        name,
        description,
    }))
}

pub async fn create_category(
    conn: &mut sqlx::PgConnection,
    category: &Category,
) -> Result<(), Error> {
    let name_taken = fetch_category_by_name(&mut *conn, &category.name)
        .await
        .context("checking for category name reuse")?;
    if name_taken.is_some() {
        return Err(Error::name_already_used(category.name.clone()));
    }
    let inserted = sqlx::query("INSERT INTO categories VALUES ($1, $2, $3) ON CONFLICT DO NOTHING")
        .bind(category.id.0)
        .bind(&category.name)
        .bind(&category.description)
        .execute(conn)
        .await
        .with_context(|| format!("inserting category {:?}", category.id))?;
    if inserted.rows_affected() == 0 {
        return Err(Error::name_already_used(category.name.clone()));
    }
    Ok(())
}

pub async fn delete_category(
    conn: &mut sqlx::PgConnection,
    id: CategoryId,
) -> anyhow::Result<bool> {
    let mut tx = conn.begin().await.context("beginning transaction")?;
    sqlx::query("UPDATE posts SET categories = array_remove(categories, $1) WHERE categories @> ARRAY[$1]")
        .bind(id.0)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("untagging posts from category {:?}", id))?;
    let res = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id.0)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("deleting category {:?}", id))?;
    tx.commit().await.context("committing transaction")?;
    Ok(res.rows_affected() == 1)
}

pub async fn fetch_ingredients(conn: &mut sqlx::PgConnection) -> anyhow::Result<Vec<Ingredient>> {
    Ok(sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, name FROM ingredients ORDER BY lower(name) ASC",
    )
    .fetch(conn)
    .map_ok(|(id, name)| Ingredient {
        id: IngredientId(id),
        name,
    })
    .try_collect::<Vec<Ingredient>>()
    .await
    .context("querying ingredients table")?)
}

pub async fn fetch_ingredient_by_name(
    conn: &mut sqlx::PgConnection,
    name: &str,
) -> anyhow::Result<Option<Ingredient>> {
    let row = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, name FROM ingredients WHERE lower(name) = lower($1)",
    )
    .bind(name)
    .fetch_optional(conn)
    .await
    .context("querying ingredients table")?;
    Ok(row.map(|(id, name)| Ingredient {
        id: IngredientId(id),
        name,
    }))
}

pub async fn create_ingredient(
    conn: &mut sqlx::PgConnection,
    ingredient: &Ingredient,
) -> Result<(), Error> {
    let name_taken = fetch_ingredient_by_name(&mut *conn, &ingredient.name)
        .await
        .context("checking for ingredient name reuse")?;
    if name_taken.is_some() {
        return Err(Error::name_already_used(ingredient.name.clone()));
    }
    let inserted = sqlx::query("INSERT INTO ingredients VALUES ($1, $2) ON CONFLICT DO NOTHING")
        .bind(ingredient.id.0)
        .bind(&ingredient.name)
        .execute(conn)
        .await
        .with_context(|| format!("inserting ingredient {:?}", ingredient.id))?;
    if inserted.rows_affected() == 0 {
        return Err(Error::name_already_used(ingredient.name.clone()));
    }
    Ok(())
}

pub async fn delete_ingredient(
    conn: &mut sqlx::PgConnection,
    id: IngredientId,
) -> anyhow::Result<bool> {
    let mut tx = conn.begin().await.context("beginning transaction")?;
    sqlx::query("UPDATE posts SET ingredients = array_remove(ingredients, $1) WHERE ingredients @> ARRAY[$1]")
        .bind(id.0)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("untagging posts from ingredient {:?}", id))?;
    let res = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id.0)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("deleting ingredient {:?}", id))?;
    tx.commit().await.context("committing transaction")?;
    Ok(res.rows_affected() == 1)
}

// Comments

const COMMENT_FIELDS: &str =
    "id, post_id, parent_id, children, display_name, content, account_id, likes, deleted, \
     created_at";

fn comment_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<Comment> {
    Ok(Comment {
        id: CommentId(row.try_get("id").context("retrieving the id field")?),
        post_id: PostId(
            row.try_get("post_id")
                .context("retrieving the post_id field")?,
        ),
        parent_id: row
            .try_get::<Option<Uuid>, _>("parent_id")
            .context("retrieving the parent_id field")?
            .map(CommentId),
        children: row
            .try_get::<Vec<Uuid>, _>("children")
            .context("retrieving the children field")?
            .into_iter()
            .map(CommentId)
            .collect(),
        display_name: row
            .try_get("display_name")
            .context("retrieving the display_name field")?,
        content: row
            .try_get("content")
            .context("retrieving the content field")?,
        account_id: row
            .try_get::<Option<Uuid>, _>("account_id")
            .context("retrieving the account_id field")?
            .map(AccountId),
        likes: row.try_get("likes").context("retrieving the likes field")?,
        deleted: row
            .try_get("deleted")
            .context("retrieving the deleted field")?,
        created_at: row
            .try_get::<Time, _>("created_at")
            .context("retrieving the created_at field")?,
    })
}

pub async fn insert_comment(
    conn: &mut sqlx::PgConnection,
    comment: &Comment,
) -> anyhow::Result<()> {
    let res = sqlx::query(
        "INSERT INTO comments VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(comment.id.0)
    .bind(comment.post_id.0)
    .bind(comment.parent_id.map(|p| p.0))
    .bind(comment.children.iter().map(|c| c.0).collect::<Vec<Uuid>>())
    .bind(&comment.display_name)
    .bind(&comment.content)
    .bind(comment.account_id.map(|a| a.0))
    .bind(comment.likes)
    .bind(comment.deleted)
    .bind(comment.created_at)
    .execute(conn)
    .await
    .with_context(|| format!("inserting comment {:?}", comment.id))?;
    anyhow::ensure!(
        res.rows_affected() == 1,
        "insertion of comment {:?} affected {} rows",
        comment.id,
        res.rows_affected()
    );
    Ok(())
}

pub async fn fetch_comment(
    conn: &mut sqlx::PgConnection,
    id: CommentId,
) -> anyhow::Result<Option<Comment>> {
    let row = sqlx::query(&format!(
        "SELECT {COMMENT_FIELDS} FROM comments WHERE id = $1"
    ))
    .bind(id.0)
    .fetch_optional(conn)
    .await
    .context("querying comments table")?;
    row.map(|r| comment_from_row(&r)).transpose()
}

/// Flat page of one post's comments, tombstones included. Recomputed from
/// current state on every call; no cursor survives between requests.
pub async fn list_comments(
    conn: &mut sqlx::PgConnection,
    post: PostId,
    sort: CommentSort,
    order: Order,
    page: Page,
) -> anyhow::Result<Vec<Comment>> {
    let rows = sqlx::query(&format!(
        "SELECT {COMMENT_FIELDS} FROM comments WHERE post_id = $1 ORDER BY {} LIMIT {} OFFSET {}",
        query::comment_order_clause(sort, order),
        page.limit(),
        page.offset(),
    ))
    .bind(post.0)
    .fetch_all(conn)
    .await
    .context("querying comments table")?;
    rows.iter().map(comment_from_row).collect()
}

/// Inserting the reply and appending its id to the parent's `children` are
/// one unit of work. The append is a single conditional statement, so
/// concurrent appends to the same parent serialize in the store instead of
/// racing through an application-level read-modify-write. If the parent
/// vanished since the caller checked, the transaction rolls back and the
/// unit retries once before reporting the conflict.
pub async fn create_reply(
    conn: &mut sqlx::PgConnection,
    parent: CommentId,
    comment: &Comment,
) -> Result<(), Error> {
    for _ in 0..2 {
        if try_create_reply(&mut *conn, parent, comment).await? {
            return Ok(());
        }
    }
    Err(Error::child_append_race(parent))
}

async fn try_create_reply(
    conn: &mut sqlx::PgConnection,
    parent: CommentId,
    comment: &Comment,
) -> Result<bool, Error> {
    let mut tx = conn.begin().await.context("beginning reply transaction")?;
    insert_comment(&mut *tx, comment).await?;
    let appended = sqlx::query(
        "UPDATE comments SET children = array_append(children, $2) WHERE id = $1 AND post_id = $3",
    )
    .bind(parent.0)
    .bind(comment.id.0)
    .bind(comment.post_id.0)
    .execute(&mut *tx)
    .await
    .with_context(|| format!("appending child to comment {:?}", parent))?;
    if appended.rows_affected() == 1 {
        tx.commit().await.context("committing reply transaction")?;
        Ok(true)
    } else {
        tx.rollback()
            .await
            .context("rolling back reply transaction")?;
        Ok(false)
    }
}

pub async fn update_comment(
    conn: &mut sqlx::PgConnection,
    id: CommentId,
    data: &EditComment,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        "UPDATE comments SET display_name = $2, content = $3 WHERE id = $1 AND deleted = false",
    )
    .bind(id.0)
    .bind(&data.display_name)
    .bind(&data.content)
    .execute(conn)
    .await
    .with_context(|| format!("updating comment {:?}", id))?;
    Ok(res.rows_affected() == 1)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeleteOutcome {
    Tombstoned,
    Removed,
}

/// Tombstone-or-remove is decided here, at delete time, by conditional
/// single statements: comments with replies keep their record under the
/// tombstone marker so the children stay reachable, leaves are removed for
/// good and unlinked from their parent's `children`. A reply racing the
/// removal makes the DELETE match nothing and the next round lands in the
/// tombstone branch instead.
pub async fn delete_comment(
    conn: &mut sqlx::PgConnection,
    id: CommentId,
) -> Result<DeleteOutcome, Error> {
    for _ in 0..3 {
        let tombstoned = sqlx::query(
            "
                UPDATE comments
                SET display_name = $2, content = $2, account_id = NULL, deleted = true
                WHERE id = $1 AND children <> '{}'
            ",
        )
        .bind(id.0)
        .bind(TOMBSTONE)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("tombstoning comment {:?}", id))?;
        if tombstoned.rows_affected() == 1 {
            return Ok(DeleteOutcome::Tombstoned);
        }

        if try_remove_comment(&mut *conn, id).await? {
            return Ok(DeleteOutcome::Removed);
        }

        if fetch_comment(&mut *conn, id).await?.is_none() {
            return Err(Error::comment_not_found(id));
        }
    }
    Err(Error::child_append_race(id))
}

/// Physical removal of a childless comment, dropping its id from the
/// parent's `children` in the same transaction so the tree never lists a
/// record that no longer exists
async fn try_remove_comment(conn: &mut sqlx::PgConnection, id: CommentId) -> Result<bool, Error> {
    let mut tx = conn.begin().await.context("beginning removal transaction")?;
    let removed =
        sqlx::query("DELETE FROM comments WHERE id = $1 AND children = '{}' RETURNING parent_id")
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await
            .with_context(|| format!("removing comment {:?}", id))?;
    match removed {
        None => {
            tx.rollback()
                .await
                .context("rolling back removal transaction")?;
            Ok(false)
        }
        Some(row) => {
            let parent = row
                .try_get::<Option<Uuid>, _>("parent_id")
                .context("retrieving the parent_id field")?;
            if let Some(parent) = parent {
                sqlx::query("UPDATE comments SET children = array_remove(children, $2) WHERE id = $1")
                    .bind(parent)
                    .bind(id.0)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("unlinking comment {:?} from its parent", id))?;
            }
            tx.commit().await.context("committing removal transaction")?;
            Ok(true)
        }
    }
}

// Messages

pub async fn insert_message(
    conn: &mut sqlx::PgConnection,
    message: &Message,
) -> anyhow::Result<()> {
    let res = sqlx::query("INSERT INTO messages VALUES ($1, $2, $3, $4, $5)")
        .bind(message.id.0)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.message)
        .bind(message.created_at)
        .execute(conn)
        .await
        .with_context(|| format!("inserting message {:?}", message.id))?;
    anyhow::ensure!(
        res.rows_affected() == 1,
        "insertion of message {:?} affected {} rows",
        message.id,
        res.rows_affected()
    );
    Ok(())
}

fn message_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<Message> {
    Ok(Message {
        id: MessageId(row.try_get("id").context("retrieving the id field")?),
        name: row.try_get("name").context("retrieving the name field")?,
        email: row.try_get("email").context("retrieving the email field")?,
        message: row
            .try_get("message")
            .context("retrieving the message field")?,
        created_at: row
            .try_get::<Time, _>("created_at")
            .context("retrieving the created_at field")?,
    })
}

pub async fn fetch_messages(conn: &mut sqlx::PgConnection) -> anyhow::Result<Vec<Message>> {
    let rows = sqlx::query(
        "SELECT id, name, email, message, created_at FROM messages ORDER BY created_at DESC, id ASC",
    )
    .fetch_all(conn)
    .await
    .context("querying messages table")?;
    rows.iter().map(message_from_row).collect()
}

pub async fn fetch_message(
    conn: &mut sqlx::PgConnection,
    id: MessageId,
) -> anyhow::Result<Option<Message>> {
    let row = sqlx::query("SELECT id, name, email, message, created_at FROM messages WHERE id = $1")
        .bind(id.0)
        .fetch_optional(conn)
        .await
        .context("querying messages table")?;
    row.map(|r| message_from_row(&r)).transpose()
}

pub async fn delete_message(conn: &mut sqlx::PgConnection, id: MessageId) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(id.0)
        .execute(conn)
        .await
        .with_context(|| format!("deleting message {:?}", id))?;
    Ok(res.rows_affected() == 1)
}
