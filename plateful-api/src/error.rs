use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

use crate::{AccountId, CommentId, MessageId, PostId};

/// One rejected field of a request body, with the user-facing message.
/// Messages are reported in field order, so a body missing several fields
/// gets a deterministic error list.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct InvalidField {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Invalid fields: {0:?}")]
    Validation(Vec<InvalidField>),

    #[error("Post {0:?} not found")]
    PostNotFound(PostId),

    #[error("Comment {0:?} not found")]
    CommentNotFound(CommentId),

    #[error("Account {0:?} not found")]
    AccountNotFound(AccountId),

    #[error("Category {0:?} not found")]
    CategoryNotFound(String),

    #[error("Ingredient {0:?} not found")]
    IngredientNotFound(String),

    #[error("Message {0:?} not found")]
    MessageNotFound(MessageId),

    #[error("Name already used {0}")]
    NameAlreadyUsed(String),

    #[error("Uuid already used {0}")]
    UuidAlreadyUsed(Uuid),

    #[error("Lost an append race on comment {0:?}")]
    ChildAppendRace(CommentId),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Invalid character in name {0:?}")]
    InvalidName(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::PostNotFound(_) => StatusCode::NOT_FOUND,
            Error::CommentNotFound(_) => StatusCode::NOT_FOUND,
            Error::AccountNotFound(_) => StatusCode::NOT_FOUND,
            Error::CategoryNotFound(_) => StatusCode::NOT_FOUND,
            Error::IngredientNotFound(_) => StatusCode::NOT_FOUND,
            Error::MessageNotFound(_) => StatusCode::NOT_FOUND,
            Error::NameAlreadyUsed(_) => StatusCode::CONFLICT,
            Error::UuidAlreadyUsed(_) => StatusCode::CONFLICT,
            Error::ChildAppendRace(_) => StatusCode::CONFLICT,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::InvalidName(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::Validation(errors) => json!({
                "message": "invalid request",
                "type": "validation",
                "errors": errors,
            }),
            Error::PostNotFound(p) => json!({
                "message": "post not found",
                "type": "post-not-found",
                "id": p.0,
            }),
            Error::CommentNotFound(c) => json!({
                "message": "comment not found",
                "type": "comment-not-found",
                "id": c.0,
            }),
            Error::AccountNotFound(a) => json!({
                "message": "account not found",
                "type": "account-not-found",
                "id": a.0,
            }),
            Error::CategoryNotFound(n) => json!({
                "message": "category not found",
                "type": "category-not-found",
                "name": n,
            }),
            Error::IngredientNotFound(n) => json!({
                "message": "ingredient not found",
                "type": "ingredient-not-found",
                "name": n,
            }),
            Error::MessageNotFound(m) => json!({
                "message": "message not found",
                "type": "message-not-found",
                "id": m.0,
            }),
            Error::NameAlreadyUsed(n) => json!({
                "message": "name already used",
                "type": "conflict-name",
                "name": n,
            }),
            Error::UuidAlreadyUsed(u) => json!({
                "message": "uuid conflict",
                "type": "conflict-uuid",
                "uuid": u,
            }),
            Error::ChildAppendRace(c) => json!({
                "message": "comment changed while appending a reply, please retry",
                "type": "conflict-child-append",
                "id": c.0,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::InvalidName(n) => json!({
                "message": "there was an invalid character in a name",
                "type": "invalid-name",
                "name": n,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let get_str = |key: &str| -> anyhow::Result<&str> {
            data.get(key)
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow!("error field {key:?} is missing or not a string"))
        };
        let get_uuid = |key: &str| -> anyhow::Result<Uuid> {
            let s = data
                .get(key)
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow!("error field {key:?} is missing or not a string"))?;
            Uuid::from_str(s).with_context(|| format!("error field {key:?} is not a uuid"))
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "permission-denied" => Error::PermissionDenied,
                "validation" => Error::Validation(
                    serde_json::from_value(
                        data.get("errors")
                            .ok_or_else(|| anyhow!("validation error without an error list"))?
                            .clone(),
                    )
                    .context("parsing validation error list")?,
                ),
                "post-not-found" => Error::PostNotFound(PostId(get_uuid("id")?)),
                "comment-not-found" => Error::CommentNotFound(CommentId(get_uuid("id")?)),
                "account-not-found" => Error::AccountNotFound(AccountId(get_uuid("id")?)),
                "category-not-found" => Error::CategoryNotFound(String::from(get_str("name")?)),
                "ingredient-not-found" => Error::IngredientNotFound(String::from(get_str("name")?)),
                "message-not-found" => Error::MessageNotFound(MessageId(get_uuid("id")?)),
                "conflict-name" => Error::NameAlreadyUsed(String::from(get_str("name")?)),
                "conflict-uuid" => Error::UuidAlreadyUsed(get_uuid("uuid")?),
                "conflict-child-append" => Error::ChildAppendRace(CommentId(get_uuid("id")?)),
                "null-byte" => Error::NullByteInString(String::from(get_str("string")?)),
                "invalid-name" => Error::InvalidName(String::from(get_str("name")?)),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_round_trip_through_json() {
        let errors = vec![
            Error::Unknown(String::from("oh no")),
            Error::PermissionDenied,
            Error::Validation(vec![InvalidField {
                field: String::from("content"),
                message: String::from("Content must be specified."),
            }]),
            Error::PostNotFound(PostId::stub()),
            Error::CommentNotFound(CommentId::stub()),
            Error::AccountNotFound(AccountId::stub()),
            Error::CategoryNotFound(String::from("dessert")),
            Error::IngredientNotFound(String::from("flour")),
            Error::MessageNotFound(MessageId::stub()),
            Error::NameAlreadyUsed(String::from("alice")),
            Error::UuidAlreadyUsed(crate::STUB_UUID),
            Error::ChildAppendRace(CommentId::stub()),
            Error::NullByteInString(String::from("a\0b")),
            Error::InvalidName(String::from("a\tb")),
        ];
        for e in errors {
            let parsed = Error::parse(&e.contents()).expect("parsing serialized error");
            assert_eq!(e, parsed);
        }
    }
}
