use serde::{Deserialize, Serialize};

/// A blog post row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A comment on a blog post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub content: String,
    pub author: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Post category. Stored in the database as its display text
/// (e.g. `"Business & Finance"`); anything outside this set is rejected
/// during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Technology,
    #[serde(rename = "Business & Finance")]
    BusinessFinance,
    #[serde(rename = "Health & Wellness")]
    HealthWellness,
    Entertainment,
    Lifestyle,
    Education,
    Sports,
    #[serde(rename = "Politics & Current Affairs")]
    PoliticsCurrentAffairs,
    Science,
    #[serde(rename = "Food & Cooking")]
    FoodCooking,
    Other,
}

impl Category {
    pub const ALL: [Self; 11] = [
        Self::Technology,
        Self::BusinessFinance,
        Self::HealthWellness,
        Self::Entertainment,
        Self::Lifestyle,
        Self::Education,
        Self::Sports,
        Self::PoliticsCurrentAffairs,
        Self::Science,
        Self::FoodCooking,
        Self::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::BusinessFinance => "Business & Finance",
            Self::HealthWellness => "Health & Wellness",
            Self::Entertainment => "Entertainment",
            Self::Lifestyle => "Lifestyle",
            Self::Education => "Education",
            Self::Sports => "Sports",
            Self::PoliticsCurrentAffairs => "Politics & Current Affairs",
            Self::Science => "Science",
            Self::FoodCooking => "Food & Cooking",
            Self::Other => "Other",
        }
    }

    /// Parse a stored value. Exact match only, no case folding.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

/// Which vote counter an increment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteField {
    Likes,
    Dislikes,
}

/// Current counter values for a post, read back after the atomic increment.
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
pub struct VoteCounts {
    pub likes: i64,
    pub dislikes: i64,
}

/// Validated data for inserting or fully updating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: Category,
}

/// Validated data for inserting or fully updating a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub author: String,
}

/// Post with its comments nested for detail responses.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithComments {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_category_parse_is_exact() {
        assert_eq!(Category::parse("Technology"), Some(Category::Technology));
        assert_eq!(Category::parse("technology"), None);
        assert_eq!(Category::parse("Tech"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[test]
    fn test_category_default_is_other() {
        assert_eq!(Category::default(), Category::Other);
    }
}
