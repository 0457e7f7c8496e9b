use uuid::Uuid;

use crate::{AccountId, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthToken(pub Uuid);

impl AuthToken {
    pub fn stub() -> AuthToken {
        AuthToken(STUB_UUID)
    }
}

/// Who is making the request, as established by the transport layer.
/// Comment routes accept both variants; everything that mutates posts,
/// categories or ingredients requires an account.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Requester {
    Anonymous,
    Account(AccountId),
}

impl Requester {
    pub fn account_id(&self) -> Option<AccountId> {
        match self {
            Requester::Anonymous => None,
            Requester::Account(id) => Some(*id),
        }
    }
}
