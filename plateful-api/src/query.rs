use crate::{AccountId, CategoryId, IngredientId};

/// Sort key for comment lists. Anything unrecognized falls back to date,
/// matching what lenient query-string parsing has always done here.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum CommentSort {
    Date,
    Popularity,
}

impl CommentSort {
    pub fn from_query(s: Option<&str>) -> CommentSort {
        match s {
            Some("popularity") => CommentSort::Popularity,
            _ => CommentSort::Date,
        }
    }
}

/// Sort key for post lists
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum PostSort {
    Date,
    Alphabetical,
    Popularity,
}

impl PostSort {
    pub fn from_query(s: Option<&str>) -> PostSort {
        match s {
            Some("alphabetical") => PostSort::Alphabetical,
            Some("popularity") => PostSort::Popularity,
            _ => PostSort::Date,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn from_query(s: Option<&str>) -> Order {
        match s {
            Some("asc") => Order::Asc,
            _ => Order::Desc,
        }
    }
}

/// Offset pagination. `page` starts at 1; zero or absent values take the
/// defaults. Each request recomputes from current state, there is no
/// cursor carried between calls.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Page {
    pub page: u32,
    pub size: u32,
}

impl Page {
    pub const DEFAULT_COMMENT_SIZE: u32 = 20;
    pub const DEFAULT_POST_SIZE: u32 = 10;

    pub fn comments(page: Option<u32>, size: Option<u32>) -> Page {
        Page::clamped(page, size, Page::DEFAULT_COMMENT_SIZE)
    }

    pub fn posts(page: Option<u32>, size: Option<u32>) -> Page {
        Page::clamped(page, size, Page::DEFAULT_POST_SIZE)
    }

    fn clamped(page: Option<u32>, size: Option<u32>, default_size: u32) -> Page {
        Page {
            page: match page {
                Some(p) if p >= 1 => p,
                _ => 1,
            },
            size: match size {
                Some(s) if s > 0 => s,
                _ => default_size,
            },
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

/// Filters for the public post list. Category and ingredient filters
/// require all listed tags to be present on the post.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PostFilters {
    pub categories: Vec<CategoryId>,
    pub ingredients: Vec<IngredientId>,
    pub author: Option<AccountId>,
    /// Case-insensitive title substring
    pub search: Option<String>,
}
