use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use plateful_api::AuthToken;
use structopt::StructOpt;
use tower_http::trace::TraceLayer;

mod db;
mod error;
mod extractors;
mod handlers;
mod query;

pub use error::Error;
use extractors::*;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(Debug, StructOpt)]
#[structopt(name = "plateful-server", about = "The plateful content API server")]
struct Opt {
    /// Address to listen on
    #[structopt(long, default_value = "127.0.0.1:3000")]
    bind: std::net::SocketAddr,

    /// Bearer token granting access to the admin endpoints; when unset the
    /// admin routes refuse everything
    #[structopt(long)]
    admin_token: Option<uuid::Uuid>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::from_args();
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = create_sqlx_pool(&db_url).await?;
    MIGRATOR
        .run(&mut *db.acquire().await?)
        .await
        .context("running migrations")?;

    let state = AppState {
        db,
        admin_token: opt.admin_token.map(AuthToken),
    };
    let app = app(state);

    tracing::info!("listening on {}", opt.bind);
    axum::Server::bind(&opt.bind)
        .serve(app.into_make_service())
        .await
        .context("serving axum webserver")
}

pub async fn create_sqlx_pool(url: &str) -> anyhow::Result<PgPool> {
    Ok(PgPool::new(
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(50)
            .connect(url)
            .await
            .with_context(|| format!("opening database {url:?}"))?,
    ))
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/accounts", post(handlers::admin_create_account))
        .route("/api/accounts", get(handlers::account_list))
        .route("/api/accounts/:account", get(handlers::account_detail))
        .route("/api/accounts/:account/posts", get(handlers::account_posts))
        .route(
            "/api/posts",
            get(handlers::post_list).post(handlers::post_create),
        )
        .route(
            "/api/posts/:post",
            get(handlers::post_detail)
                .put(handlers::post_update)
                .delete(handlers::post_delete),
        )
        .route(
            "/api/posts/:post/comments",
            get(handlers::comment_list).post(handlers::comment_create),
        )
        .route(
            "/api/posts/:post/comments/:comment",
            get(handlers::comment_detail)
                .put(handlers::comment_update)
                .delete(handlers::comment_delete),
        )
        .route(
            "/api/posts/:post/comments/:comment/replies",
            post(handlers::comment_reply),
        )
        .route(
            "/api/categories",
            get(handlers::category_list).post(handlers::category_create),
        )
        .route(
            "/api/categories/:category",
            get(handlers::category_detail).delete(handlers::category_delete),
        )
        .route("/api/categories/:category/posts", get(handlers::category_posts))
        .route(
            "/api/ingredients",
            get(handlers::ingredient_list).post(handlers::ingredient_create),
        )
        .route(
            "/api/ingredients/:ingredient",
            get(handlers::ingredient_detail).delete(handlers::ingredient_delete),
        )
        .route(
            "/api/ingredients/:ingredient/posts",
            get(handlers::ingredient_posts),
        )
        .route(
            "/api/messages",
            get(handlers::message_list).post(handlers::message_create),
        )
        .route(
            "/api/messages/:message",
            get(handlers::message_detail).delete(handlers::message_delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
