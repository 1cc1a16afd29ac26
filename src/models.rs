use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Identifiers are assigned by Postgres sequences.
pub type Id = i64;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Subpage {
    pub page_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub visiter_count: i64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewSubpage {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    pub cat_id: Id,
    pub subject: String,
    pub created: DateTime<Utc>,
    pub page_id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewCategory {
    pub subject: String,
    pub page_id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Subcategory {
    pub sub_cat_id: Id,
    pub subject: String,
    pub created: DateTime<Utc>,
    pub main_cat_id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewSubcategory {
    pub subject: String,
    pub main_cat_id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Thread {
    pub thread_id: Id,
    pub subject: String,
    pub sub_cat_id: Id,
}

/// A thread is only ever created together with the content of its
/// first post.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewThread {
    pub subject: String,
    pub sub_cat_id: Id,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateThread {
    pub thread_id: Id,
    pub subject: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Post {
    pub post_id: Id,
    pub content: String,
    pub thread_id: Id,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewPost {
    pub content: String,
    pub thread_id: Id,
}

/// A post is addressed by the (post_id, thread_id) pair; a valid
/// post_id combined with a foreign thread_id must not match.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePost {
    pub post_id: Id,
    pub thread_id: Id,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub user_account_id: Id,
    pub name: String,
    pub email: String,
    pub password: String, // SHA-256 hex digest, never the cleartext
}

/// Repo input for user creation; `password` is already the digest
/// (the confirmation field is consumed by validation, never stored).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// What the API hands out for a user; the digest stays internal.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserPublic {
    pub user_account_id: Id,
    pub name: String,
    pub email: String,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        Self {
            user_account_id: u.user_account_id,
            name: u.name,
            email: u.email,
        }
    }
}

// ---------------- Aggregate views -----------------------------------

/// Subpage with its categories and, per category, that category's
/// subcategories (the nesting the page renderer consumes directly).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageView {
    pub subpage: Subpage,
    pub category: Vec<Category>,
    pub sub_category: Vec<Vec<Subcategory>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubcategoryView {
    pub sub_category: Subcategory,
    pub category: Category,
    pub threads: Vec<Thread>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ThreadView {
    #[serde(flatten)]
    pub thread: Thread,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ThreadWithPost {
    pub thread: Thread,
    pub post: Post,
}
