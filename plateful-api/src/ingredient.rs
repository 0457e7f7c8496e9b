use uuid::Uuid;

use crate::{Error, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct IngredientId(pub Uuid);

impl IngredientId {
    pub fn stub() -> IngredientId {
        IngredientId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
}

impl Ingredient {
    pub fn new(data: NewIngredient) -> Ingredient {
        Ingredient {
            id: IngredientId(Uuid::new_v4()),
            name: data.name,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewIngredient {
    pub name: String,
}

impl NewIngredient {
    // See comments on other `validate` functions throughout plateful-api
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_name(&self.name)?;
        let mut errors = Vec::new();
        crate::require_trimmed("name", &self.name, "Name must be specified.", &mut errors);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        Ok(())
    }
}
