//! Who may do what to a comment.
//!
//! Anonymously authored comments have no author identity to defer to, so
//! moderation falls to the post author alone. Account-authored comments
//! extend deletion to their own author; edition stays with the author only
//! (a moderator may remove another's words, not rewrite them).

use crate::{AccountId, Comment, Requester};

pub fn can_delete(requester: &Requester, comment: &Comment, post_author: AccountId) -> bool {
    let requester = match requester {
        Requester::Anonymous => return false,
        Requester::Account(id) => *id,
    };
    match comment.account_id {
        None => requester == post_author,
        Some(comment_author) => requester == post_author || requester == comment_author,
    }
}

pub fn can_update(requester: &Requester, comment: &Comment) -> bool {
    match (requester, comment.account_id) {
        (Requester::Account(requester), Some(comment_author)) => *requester == comment_author,
        _ => false,
    }
}
