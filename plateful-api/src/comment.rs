use chrono::Utc;
use uuid::Uuid;

use crate::{AccountId, Error, PostId, Requester, Time, STUB_UUID};

/// Marker written over `display_name` and `content` when a comment is
/// soft-deleted because replies still hang below it.
pub const TOMBSTONE: &str = "[removed]";

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,

    /// Absent for top-level comments, immutable once set
    pub parent_id: Option<CommentId>,

    /// Direct replies, in append order. The store owns this field; it is
    /// only ever appended to, and rewritten wholesale by nothing.
    pub children: Vec<CommentId>,

    pub display_name: String,
    pub content: String,

    /// Absent means the comment was authored anonymously
    pub account_id: Option<AccountId>,

    pub likes: i64,
    pub deleted: bool,
    pub created_at: Time,
}

impl Comment {
    /// Builds the record for a fresh comment. `parent_id` is `None` for a
    /// top-level comment and `Some` for a reply; linking the parent's
    /// `children` is the store's job, not ours.
    pub fn now(
        post_id: PostId,
        parent_id: Option<CommentId>,
        data: NewComment,
        requester: &Requester,
    ) -> Comment {
        Comment {
            id: CommentId(Uuid::new_v4()),
            post_id,
            parent_id,
            children: Vec::new(),
            display_name: data.display_name,
            content: data.content,
            account_id: requester.account_id(),
            likes: 0,
            deleted: false,
            created_at: Utc::now(),
        }
    }

    /// What deletion leaves behind when the record must survive for its
    /// children: content and author are gone, linkage stays.
    pub fn tombstone(&mut self) {
        self.display_name = String::from(TOMBSTONE);
        self.content = String::from(TOMBSTONE);
        self.account_id = None;
        self.deleted = true;
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    pub display_name: String,
    pub content: String,
}

impl NewComment {
    /// Validation is done here rather than trusting the transport layer:
    /// the same payloads arrive from the HTTP boundary and from tests, and
    /// both must see the same rejections. Field messages are collected in
    /// declaration order (display_name, then content) so clients get a
    /// stable error list.
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.display_name)?;
        crate::validate_string(&self.content)?;
        let mut errors = Vec::new();
        crate::require_trimmed(
            "display_name",
            &self.display_name,
            "Display name must be specified.",
            &mut errors,
        );
        crate::require_trimmed(
            "content",
            &self.content,
            "Content must be specified.",
            &mut errors,
        );
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        Ok(())
    }
}

/// Rewrite of a live comment's text, gated by `perm::can_update`
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct EditComment {
    pub display_name: String,
    pub content: String,
}

impl EditComment {
    // See comments on other `validate` functions throughout plateful-api
    pub fn validate(&self) -> Result<(), Error> {
        NewComment {
            display_name: self.display_name.clone(),
            content: self.content.clone(),
        }
        .validate()
    }
}
