pub mod account;
pub mod auth;
pub mod category;
pub mod comment;
pub mod error;
pub mod ingredient;
pub mod message;
pub mod perm;
pub mod post;
pub mod query;
pub mod thread;

pub use account::{Account, AccountId, NewAccount};
pub use auth::{AuthToken, Requester};
pub use category::{Category, CategoryId, NewCategory};
pub use comment::{Comment, CommentId, EditComment, NewComment, TOMBSTONE};
pub use error::{Error, InvalidField};
pub use ingredient::{Ingredient, IngredientId, NewIngredient};
pub use message::{Message, MessageId, NewMessage};
pub use post::{NewPost, Post, PostId};
pub use query::{CommentSort, Order, Page, PostFilters, PostSort};

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<chrono::Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

/// Postgres TEXT cannot hold a null byte, so reject it at the boundary
/// rather than letting the store error out.
pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(s.to_string()));
    }
    Ok(())
}

pub fn validate_name(s: &str) -> Result<(), Error> {
    validate_string(s)?;
    if s.chars().any(|c| c.is_control()) {
        return Err(Error::InvalidName(s.to_string()));
    }
    Ok(())
}

/// Records a validation message for `field` if `value` is empty once trimmed.
/// Callers push into `errors` in field order, so the reported messages keep
/// that order too.
pub(crate) fn require_trimmed(
    field: &'static str,
    value: &str,
    message: &'static str,
    errors: &mut Vec<InvalidField>,
) {
    if value.trim().is_empty() {
        errors.push(InvalidField {
            field: String::from(field),
            message: String::from(message),
        });
    }
}
