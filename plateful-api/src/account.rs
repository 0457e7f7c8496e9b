use uuid::Uuid;

use crate::{Error, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn stub() -> AccountId {
        AccountId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewAccount {
    pub id: AccountId,
    pub name: String,
}

impl NewAccount {
    // See comments on other `validate` functions throughout plateful-api
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_name(&self.name)?;
        if self.name.trim().is_empty() {
            return Err(Error::InvalidName(self.name.clone()));
        }
        Ok(())
    }
}
