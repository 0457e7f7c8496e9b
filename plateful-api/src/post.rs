use chrono::Utc;
use uuid::Uuid;

use crate::{AccountId, CategoryId, Error, IngredientId, Time, STUB_UUID};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct PostId(pub Uuid);

impl PostId {
    pub fn stub() -> PostId {
        PostId(STUB_UUID)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Post {
    pub id: PostId,
    pub author: AccountId,

    pub title: String,
    pub description: Option<String>,
    pub text: String,

    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub serves: Option<String>,

    pub categories: Vec<CategoryId>,
    pub ingredients: Vec<IngredientId>,

    pub likes: i64,

    /// Unpublished posts are invisible to the public list but stay
    /// reachable by id and under their author's post list
    pub published: bool,

    pub created_at: Time,
}

impl Post {
    pub fn now(author: AccountId, data: NewPost) -> Post {
        Post {
            id: PostId(Uuid::new_v4()),
            author,
            title: data.title,
            description: data.description,
            text: data.text,
            prep_time: data.prep_time,
            cook_time: data.cook_time,
            serves: data.serves,
            categories: data.categories,
            ingredients: data.ingredients,
            likes: 0,
            published: data.published,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewPost {
    pub title: String,
    pub description: Option<String>,
    pub text: String,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub serves: Option<String>,
    pub categories: Vec<CategoryId>,
    pub ingredients: Vec<IngredientId>,
    pub published: bool,
}

impl NewPost {
    // See comments on other `validate` functions throughout plateful-api
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.title)?;
        crate::validate_string(&self.text)?;
        for opt in [
            &self.description,
            &self.prep_time,
            &self.cook_time,
            &self.serves,
        ] {
            if let Some(s) = opt {
                crate::validate_string(s)?;
            }
        }
        let mut errors = Vec::new();
        crate::require_trimmed("title", &self.title, "Title must be specified.", &mut errors);
        crate::require_trimmed("text", &self.text, "Text must be specified.", &mut errors);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewPost {
        NewPost {
            title: String::from("Shakshuka"),
            description: None,
            text: String::from("Crack the eggs into the sauce."),
            prep_time: Some(String::from("10 min")),
            cook_time: Some(String::from("20 min")),
            serves: Some(String::from("2")),
            categories: Vec::new(),
            ingredients: Vec::new(),
            published: true,
        }
    }

    #[test]
    fn title_and_text_are_required_in_that_order() {
        let mut p = valid();
        p.title = String::from(" ");
        p.text = String::new();
        match p.validate().unwrap_err() {
            Error::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "title");
                assert_eq!(errors[1].field, "text");
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert!(valid().validate().is_ok());
    }
}
