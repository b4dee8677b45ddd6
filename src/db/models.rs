use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub media_url: Option<String>,
    pub author_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub post_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub created_at: String,
}

/// A post joined with its author's name and engagement counts.
#[derive(Debug, Clone)]
pub struct PostRow {
    pub post: SkillPost,
    pub author_name: String,
    pub comment_count: i64,
    pub like_count: i64,
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub comment: Comment,
    pub author_name: String,
}
