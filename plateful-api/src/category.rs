use uuid::Uuid;

use crate::{Error, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct CategoryId(pub Uuid);

impl CategoryId {
    pub fn stub() -> CategoryId {
        CategoryId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    pub fn new(data: NewCategory) -> Category {
        Category {
            id: CategoryId(Uuid::new_v4()),
            name: data.name,
            description: data.description,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

impl NewCategory {
    // See comments on other `validate` functions throughout plateful-api
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_name(&self.name)?;
        if let Some(d) = &self.description {
            crate::validate_string(d)?;
        }
        let mut errors = Vec::new();
        crate::require_trimmed("name", &self.name, "Name must be specified.", &mut errors);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        Ok(())
    }
}
