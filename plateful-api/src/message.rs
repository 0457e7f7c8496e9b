use chrono::Utc;
use uuid::Uuid;

use crate::{Error, Time, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn stub() -> MessageId {
        MessageId(STUB_UUID)
    }
}

/// Contact-form message. Anyone may send one; only the admin reads them.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Message {
    pub id: MessageId,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: Time,
}

impl Message {
    pub fn now(data: NewMessage) -> Message {
        Message {
            id: MessageId(Uuid::new_v4()),
            name: data.name,
            email: data.email,
            message: data.message,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewMessage {
    // See comments on other `validate` functions throughout plateful-api
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.name)?;
        crate::validate_string(&self.email)?;
        crate::validate_string(&self.message)?;
        let mut errors = Vec::new();
        crate::require_trimmed("name", &self.name, "Name must be specified.", &mut errors);
        crate::require_trimmed("email", &self.email, "Email must be specified.", &mut errors);
        crate::require_trimmed(
            "message",
            &self.message,
            "Message must be specified.",
            &mut errors,
        );
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_three_fields_are_required_in_order() {
        let err = NewMessage {
            name: String::new(),
            email: String::from(" "),
            message: String::new(),
        }
        .validate()
        .unwrap_err();
        match err {
            Error::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, ["name", "email", "message"]);
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }
}
