use std::ops::{Deref, DerefMut};

use anyhow::Context;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{self, request},
};
use plateful_api::{AccountId, AuthToken, Requester, Uuid};

use crate::{db, Error};

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub db: PgPool,
    pub admin_token: Option<AuthToken>,
}

#[derive(Clone)]
pub struct PgPool(sqlx::PgPool);

impl PgPool {
    pub fn new(pool: sqlx::PgPool) -> PgPool {
        PgPool(pool)
    }

    pub async fn acquire(&self) -> Result<PgConn, Error> {
        Ok(PgConn(
            self.0.acquire().await.context("acquiring db connection")?,
        ))
    }

    pub fn num_idle(&self) -> usize {
        self.0.num_idle()
    }
}

pub struct PgConn(sqlx::pool::PoolConnection<sqlx::Postgres>);

#[async_trait]
impl FromRequestParts<AppState> for PgConn {
    type Rejection = Error;

    async fn from_request_parts(
        _req: &mut request::Parts,
        state: &AppState,
    ) -> Result<PgConn, Error> {
        state.db.acquire().await
    }
}

impl Deref for PgConn {
    type Target = sqlx::PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PgConn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// The raw bearer token, before any session lookup
pub struct PreAuth(pub AuthToken);

fn bearer_token(req: &request::Parts) -> Result<Option<AuthToken>, Error> {
    let auth = match req.headers.get(http::header::AUTHORIZATION) {
        None => return Ok(None),
        Some(auth) => auth,
    };
    let auth = auth.to_str().map_err(|_| Error::permission_denied())?;
    let mut auth = auth.split(' ');
    if !auth
        .next()
        .ok_or(Error::permission_denied())?
        .eq_ignore_ascii_case("bearer")
    {
        return Err(Error::permission_denied());
    }
    let token = auth.next().ok_or(Error::permission_denied())?;
    if !auth.next().is_none() {
        return Err(Error::permission_denied());
    }
    let token = Uuid::try_from(token).map_err(|_| Error::permission_denied())?;
    Ok(Some(AuthToken(token)))
}

#[async_trait]
impl<S: Sync> FromRequestParts<S> for PreAuth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, _state: &S) -> Result<PreAuth, Error> {
        match bearer_token(req)? {
            None => Err(Error::permission_denied()),
            Some(token) => Ok(PreAuth(token)),
        }
    }
}

/// An authenticated account. Routes that refuse anonymous callers use this.
pub struct Auth(pub AccountId);

#[async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = Error;

    async fn from_request_parts(req: &mut request::Parts, state: &AppState) -> Result<Auth, Error> {
        let token = PreAuth::from_request_parts(req, state).await?.0;
        let mut conn = PgConn::from_request_parts(req, state).await?;
        Ok(Auth(db::recover_session(&mut *conn, token).await?))
    }
}

/// Identity for routes that accept anonymous callers: a missing
/// Authorization header means `Requester::Anonymous`, but a header that is
/// present and does not resolve is still an error.
pub struct MaybeAuth(pub Requester);

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuth {
    type Rejection = Error;

    async fn from_request_parts(
        req: &mut request::Parts,
        state: &AppState,
    ) -> Result<MaybeAuth, Error> {
        match bearer_token(req)? {
            None => Ok(MaybeAuth(Requester::Anonymous)),
            Some(token) => {
                let mut conn = PgConn::from_request_parts(req, state).await?;
                let account = db::recover_session(&mut *conn, token).await?;
                Ok(MaybeAuth(Requester::Account(account)))
            }
        }
    }
}

pub struct AdminAuth;

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = Error;

    async fn from_request_parts(
        req: &mut request::Parts,
        state: &AppState,
    ) -> Result<AdminAuth, Error> {
        let token = PreAuth::from_request_parts(req, state).await?.0;
        if Some(token) == state.admin_token {
            Ok(AdminAuth)
        } else {
            Err(Error::permission_denied())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts_with_auth(header: Option<&str>) -> request::Parts {
        let mut req = http::Request::builder();
        if let Some(h) = header {
            req = req.header(http::header::AUTHORIZATION, h);
        }
        req.body(()).expect("building request").into_parts().0
    }

    #[test]
    fn bearer_parsing() {
        assert_eq!(bearer_token(&parts_with_auth(None)).unwrap(), None);
        let token = Uuid::new_v4();
        for header in [format!("Bearer {token}"), format!("bearer {token}")] {
            assert_eq!(
                bearer_token(&parts_with_auth(Some(&header))).unwrap(),
                Some(AuthToken(token))
            );
        }
        for bad in [
            String::from("Bearer"),
            String::from("Bearer not-a-uuid"),
            format!("Basic {token}"),
            format!("Bearer {token} extra"),
        ] {
            assert!(bearer_token(&parts_with_auth(Some(&bad))).is_err());
        }
    }
}
