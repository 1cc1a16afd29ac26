use async_trait::async_trait;

use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")]
    NotFound,
    #[error("insert returned no row")]
    InsertFailed,
    #[error("{0}")]
    Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Window applied to dependent list fetches when the client supplies a
/// page number (1-based; anything below 1 clamps to the first page).
pub const PAGE_SIZE: i64 = 20;

fn page_offset(page_num: i64) -> i64 {
    (page_num - 1).max(0) * PAGE_SIZE
}

#[async_trait]
pub trait SubpageRepo: Send + Sync {
    async fn create_subpage(&self, new: NewSubpage) -> RepoResult<Subpage>;
    /// Title match is case-insensitive; NotFound when no subpage.
    async fn get_page_view(&self, title: &str) -> RepoResult<PageView>;
    async fn delete_subpage(&self, page_id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait CategoryRepo: Send + Sync {
    async fn create_category(&self, new: NewCategory) -> RepoResult<Category>;
    async fn list_categories(&self, page_id: Id) -> RepoResult<Vec<Category>>;
    async fn delete_category(&self, cat_id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait SubcategoryRepo: Send + Sync {
    async fn create_subcategory(&self, new: NewSubcategory) -> RepoResult<Subcategory>;
    async fn get_subcategory_view(
        &self,
        sub_cat_id: Id,
        page_num: Option<i64>,
    ) -> RepoResult<SubcategoryView>;
    async fn delete_subcategory(&self, sub_cat_id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait ThreadRepo: Send + Sync {
    /// Inserts the thread and its first post as one unit of work;
    /// either both rows exist afterwards or neither does.
    async fn create_thread(&self, new: NewThread) -> RepoResult<ThreadWithPost>;
    async fn get_thread_view(
        &self,
        thread_id: Id,
        page_num: Option<i64>,
    ) -> RepoResult<ThreadView>;
    async fn update_thread(&self, upd: UpdateThread) -> RepoResult<()>;
    async fn delete_thread(&self, thread_id: Id) -> RepoResult<()>;
    async fn list_recent_threads(&self, limit: i64) -> RepoResult<Vec<Thread>>;
}

#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn create_post(&self, new: NewPost) -> RepoResult<Post>;
    async fn get_post(&self, post_id: Id) -> RepoResult<Post>;
    async fn update_post(&self, upd: UpdatePost) -> RepoResult<()>;
    async fn delete_post(&self, post_id: Id, thread_id: Id) -> RepoResult<()>;
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, new: NewUser) -> RepoResult<User>;
    async fn get_user(&self, user_account_id: Id) -> RepoResult<User>;
    async fn delete_user(&self, user_account_id: Id) -> RepoResult<()>;
}

pub trait Repo:
    SubpageRepo + CategoryRepo + SubcategoryRepo + ThreadRepo + PostRepo + UserRepo
{
}

impl<T> Repo for T where
    T: SubpageRepo + CategoryRepo + SubcategoryRepo + ThreadRepo + PostRepo + UserRepo
{
}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use chrono::Utc;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, RwLock};

    const SNAPSHOT_PATH: &str = "data/state.json";

    #[derive(Default, Serialize, Deserialize)]
    struct State {
        subpages: HashMap<Id, Subpage>,
        categories: HashMap<Id, Category>,
        subcategories: HashMap<Id, Subcategory>,
        threads: HashMap<Id, Thread>,
        posts: HashMap<Id, Post>,
        users: HashMap<Id, User>,
        next_id: Id,
    }

    impl State {
        // Emulates the store-level ON DELETE CASCADE chain.
        fn remove_category_tree(&mut self, cat_id: Id) {
            self.categories.remove(&cat_id);
            let subs: Vec<Id> = self
                .subcategories
                .values()
                .filter(|s| s.main_cat_id == cat_id)
                .map(|s| s.sub_cat_id)
                .collect();
            for id in subs {
                self.remove_subcategory_tree(id);
            }
        }

        fn remove_subcategory_tree(&mut self, sub_cat_id: Id) {
            self.subcategories.remove(&sub_cat_id);
            let threads: Vec<Id> = self
                .threads
                .values()
                .filter(|t| t.sub_cat_id == sub_cat_id)
                .map(|t| t.thread_id)
                .collect();
            for id in threads {
                self.remove_thread_tree(id);
            }
        }

        fn remove_thread_tree(&mut self, thread_id: Id) {
            self.threads.remove(&thread_id);
            self.posts.retain(|_, p| p.thread_id != thread_id);
        }
    }

    #[derive(Clone)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
        snapshot_path: Arc<PathBuf>,
    }

    impl InMemRepo {
        fn data_dir() -> PathBuf {
            std::env::var("FORUM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data"))
        }

        fn snapshot_path() -> PathBuf {
            if std::env::var("FORUM_DATA_DIR").is_ok() {
                let mut p = Self::data_dir();
                p.push("state.json");
                p
            } else {
                PathBuf::from(SNAPSHOT_PATH)
            }
        }

        fn load_state_from(path: &Path) -> State {
            match std::fs::read(path) {
                Ok(bytes) => match serde_json::from_slice::<State>(&bytes) {
                    Ok(s) => {
                        eprintln!("[inmem] Loaded snapshot '{}'", path.display());
                        s
                    }
                    Err(e) => {
                        eprintln!(
                            "[inmem] Failed to parse snapshot '{}': {e}. Starting empty.",
                            path.display()
                        );
                        State::default()
                    }
                },
                Err(e) => {
                    eprintln!(
                        "[inmem] No snapshot at '{}': {e}. Starting empty.",
                        path.display()
                    );
                    State::default()
                }
            }
        }

        fn persist(&self) {
            let path = self.snapshot_path.clone();
            if let Ok(s) = serde_json::to_vec_pretty(&*self.state.read().unwrap()) {
                if let Some(dir) = path.parent() {
                    let _ = std::fs::create_dir_all(dir);
                }
                if let Err(e) = std::fs::write(&*path, s) {
                    eprintln!("[inmem] Failed to write snapshot '{}': {e}", path.display());
                }
            }
        }

        pub fn new() -> Self {
            let snapshot_path = Self::snapshot_path();
            let state = Self::load_state_from(&snapshot_path);
            Self {
                state: Arc::new(RwLock::new(state)),
                snapshot_path: Arc::new(snapshot_path),
            }
        }

        fn next_id(state: &mut State) -> Id {
            state.next_id += 1;
            state.next_id
        }

        // Missing parents surface the way a Postgres FK violation
        // does: as an internal store error, not as NotFound.
        fn fk_violation(table: &str) -> RepoError {
            RepoError::Internal(format!(
                "insert on table \"{table}\" violates foreign key constraint"
            ))
        }
    }

    impl Default for InMemRepo {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl SubpageRepo for InMemRepo {
        async fn create_subpage(&self, new: NewSubpage) -> RepoResult<Subpage> {
            let mut s = self.state.write().unwrap();
            let id = Self::next_id(&mut s);
            let subpage = Subpage {
                page_id: id,
                title: new.title,
                description: None,
                visiter_count: 0,
                created: Utc::now(),
            };
            s.subpages.insert(id, subpage.clone());
            drop(s);
            self.persist();
            Ok(subpage)
        }

        async fn get_page_view(&self, title: &str) -> RepoResult<PageView> {
            let s = self.state.read().unwrap();
            let subpage = s
                .subpages
                .values()
                .find(|p| p.title.eq_ignore_ascii_case(title))
                .cloned()
                .ok_or(RepoError::NotFound)?;
            let mut category: Vec<Category> = s
                .categories
                .values()
                .filter(|c| c.page_id == subpage.page_id)
                .cloned()
                .collect();
            category.sort_by_key(|c| c.cat_id);
            let sub_category = category
                .iter()
                .map(|c| {
                    let mut subs: Vec<Subcategory> = s
                        .subcategories
                        .values()
                        .filter(|sc| sc.main_cat_id == c.cat_id)
                        .cloned()
                        .collect();
                    subs.sort_by_key(|sc| sc.sub_cat_id);
                    subs
                })
                .collect();
            Ok(PageView {
                subpage,
                category,
                sub_category,
            })
        }

        async fn delete_subpage(&self, page_id: Id) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            if s.subpages.remove(&page_id).is_none() {
                return Err(RepoError::NotFound);
            }
            let cats: Vec<Id> = s
                .categories
                .values()
                .filter(|c| c.page_id == page_id)
                .map(|c| c.cat_id)
                .collect();
            for id in cats {
                s.remove_category_tree(id);
            }
            drop(s);
            self.persist();
            Ok(())
        }
    }

    #[async_trait]
    impl CategoryRepo for InMemRepo {
        async fn create_category(&self, new: NewCategory) -> RepoResult<Category> {
            let mut s = self.state.write().unwrap();
            if !s.subpages.contains_key(&new.page_id) {
                return Err(Self::fk_violation("category"));
            }
            let id = Self::next_id(&mut s);
            let category = Category {
                cat_id: id,
                subject: new.subject,
                created: Utc::now(),
                page_id: new.page_id,
            };
            s.categories.insert(id, category.clone());
            drop(s);
            self.persist();
            Ok(category)
        }

        async fn list_categories(&self, page_id: Id) -> RepoResult<Vec<Category>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<Category> = s
                .categories
                .values()
                .filter(|c| c.page_id == page_id)
                .cloned()
                .collect();
            v.sort_by_key(|c| c.cat_id);
            Ok(v)
        }

        async fn delete_category(&self, cat_id: Id) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            if !s.categories.contains_key(&cat_id) {
                return Err(RepoError::NotFound);
            }
            s.remove_category_tree(cat_id);
            drop(s);
            self.persist();
            Ok(())
        }
    }

    #[async_trait]
    impl SubcategoryRepo for InMemRepo {
        async fn create_subcategory(&self, new: NewSubcategory) -> RepoResult<Subcategory> {
            let mut s = self.state.write().unwrap();
            if !s.categories.contains_key(&new.main_cat_id) {
                return Err(Self::fk_violation("subcategory"));
            }
            let id = Self::next_id(&mut s);
            let subcategory = Subcategory {
                sub_cat_id: id,
                subject: new.subject,
                created: Utc::now(),
                main_cat_id: new.main_cat_id,
            };
            s.subcategories.insert(id, subcategory.clone());
            drop(s);
            self.persist();
            Ok(subcategory)
        }

        async fn get_subcategory_view(
            &self,
            sub_cat_id: Id,
            page_num: Option<i64>,
        ) -> RepoResult<SubcategoryView> {
            let s = self.state.read().unwrap();
            let sub_category = s
                .subcategories
                .get(&sub_cat_id)
                .cloned()
                .ok_or(RepoError::NotFound)?;
            let category = s
                .categories
                .get(&sub_category.main_cat_id)
                .cloned()
                .ok_or_else(|| {
                    RepoError::Internal(format!(
                        "subcategory {sub_cat_id} references missing category"
                    ))
                })?;
            let mut threads: Vec<Thread> = s
                .threads
                .values()
                .filter(|t| t.sub_cat_id == sub_cat_id)
                .cloned()
                .collect();
            threads.sort_by_key(|t| t.thread_id);
            let threads = match page_num {
                Some(n) => threads
                    .into_iter()
                    .skip(page_offset(n) as usize)
                    .take(PAGE_SIZE as usize)
                    .collect(),
                None => threads,
            };
            Ok(SubcategoryView {
                sub_category,
                category,
                threads,
            })
        }

        async fn delete_subcategory(&self, sub_cat_id: Id) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            if !s.subcategories.contains_key(&sub_cat_id) {
                return Err(RepoError::NotFound);
            }
            s.remove_subcategory_tree(sub_cat_id);
            drop(s);
            self.persist();
            Ok(())
        }
    }

    #[async_trait]
    impl ThreadRepo for InMemRepo {
        async fn create_thread(&self, new: NewThread) -> RepoResult<ThreadWithPost> {
            let mut s = self.state.write().unwrap();
            if !s.subcategories.contains_key(&new.sub_cat_id) {
                return Err(Self::fk_violation("thread"));
            }
            // Both rows land under one write lock, so no partially
            // created thread is ever observable.
            let thread_id = Self::next_id(&mut s);
            let thread = Thread {
                thread_id,
                subject: new.subject,
                sub_cat_id: new.sub_cat_id,
            };
            s.threads.insert(thread_id, thread.clone());
            let post_id = Self::next_id(&mut s);
            let post = Post {
                post_id,
                content: new.content,
                thread_id,
            };
            s.posts.insert(post_id, post.clone());
            drop(s);
            self.persist();
            Ok(ThreadWithPost { thread, post })
        }

        async fn get_thread_view(
            &self,
            thread_id: Id,
            page_num: Option<i64>,
        ) -> RepoResult<ThreadView> {
            let s = self.state.read().unwrap();
            let thread = s
                .threads
                .get(&thread_id)
                .cloned()
                .ok_or(RepoError::NotFound)?;
            let mut posts: Vec<Post> = s
                .posts
                .values()
                .filter(|p| p.thread_id == thread_id)
                .cloned()
                .collect();
            posts.sort_by_key(|p| p.post_id);
            let posts = match page_num {
                Some(n) => posts
                    .into_iter()
                    .skip(page_offset(n) as usize)
                    .take(PAGE_SIZE as usize)
                    .collect(),
                None => posts,
            };
            Ok(ThreadView { thread, posts })
        }

        async fn update_thread(&self, upd: UpdateThread) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            match s.threads.get_mut(&upd.thread_id) {
                Some(t) => t.subject = upd.subject,
                None => return Err(RepoError::NotFound),
            }
            drop(s);
            self.persist();
            Ok(())
        }

        async fn delete_thread(&self, thread_id: Id) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            if !s.threads.contains_key(&thread_id) {
                return Err(RepoError::NotFound);
            }
            s.remove_thread_tree(thread_id);
            drop(s);
            self.persist();
            Ok(())
        }

        async fn list_recent_threads(&self, limit: i64) -> RepoResult<Vec<Thread>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<Thread> = s.threads.values().cloned().collect();
            v.sort_by(|a, b| b.thread_id.cmp(&a.thread_id));
            v.truncate(limit.max(0) as usize);
            Ok(v)
        }
    }

    #[async_trait]
    impl PostRepo for InMemRepo {
        async fn create_post(&self, new: NewPost) -> RepoResult<Post> {
            let mut s = self.state.write().unwrap();
            if !s.threads.contains_key(&new.thread_id) {
                return Err(Self::fk_violation("post"));
            }
            let id = Self::next_id(&mut s);
            let post = Post {
                post_id: id,
                content: new.content,
                thread_id: new.thread_id,
            };
            s.posts.insert(id, post.clone());
            drop(s);
            self.persist();
            Ok(post)
        }

        async fn get_post(&self, post_id: Id) -> RepoResult<Post> {
            let s = self.state.read().unwrap();
            s.posts.get(&post_id).cloned().ok_or(RepoError::NotFound)
        }

        async fn update_post(&self, upd: UpdatePost) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            match s.posts.get_mut(&upd.post_id) {
                Some(p) if p.thread_id == upd.thread_id => p.content = upd.content,
                _ => return Err(RepoError::NotFound),
            }
            drop(s);
            self.persist();
            Ok(())
        }

        async fn delete_post(&self, post_id: Id, thread_id: Id) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            match s.posts.get(&post_id) {
                Some(p) if p.thread_id == thread_id => {
                    s.posts.remove(&post_id);
                }
                _ => return Err(RepoError::NotFound),
            }
            drop(s);
            self.persist();
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepo for InMemRepo {
        async fn create_user(&self, new: NewUser) -> RepoResult<User> {
            let mut s = self.state.write().unwrap();
            let id = Self::next_id(&mut s);
            let user = User {
                user_account_id: id,
                name: new.name,
                email: new.email,
                password: new.password,
            };
            s.users.insert(id, user.clone());
            drop(s);
            self.persist();
            Ok(user)
        }

        async fn get_user(&self, user_account_id: Id) -> RepoResult<User> {
            let s = self.state.read().unwrap();
            s.users
                .get(&user_account_id)
                .cloned()
                .ok_or(RepoError::NotFound)
        }

        async fn delete_user(&self, user_account_id: Id) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            if s.users.remove(&user_account_id).is_none() {
                return Err(RepoError::NotFound);
            }
            drop(s);
            self.persist();
            Ok(())
        }
    }
}

// Postgres implementation (feature = "postgres-store")
#[cfg(feature = "postgres-store")]
pub mod pg {
    use super::*;
    use sqlx::{Pool, Postgres};

    #[derive(Clone)]
    pub struct PgRepo {
        pool: Pool<Postgres>,
    }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self {
            Self { pool }
        }
    }

    fn internal(e: sqlx::Error) -> RepoError {
        RepoError::Internal(e.to_string())
    }

    fn insert_err(e: sqlx::Error) -> RepoError {
        match e {
            sqlx::Error::RowNotFound => RepoError::InsertFailed,
            other => RepoError::Internal(other.to_string()),
        }
    }

    #[async_trait]
    impl SubpageRepo for PgRepo {
        async fn create_subpage(&self, new: NewSubpage) -> RepoResult<Subpage> {
            sqlx::query_as::<_, Subpage>(
                "INSERT INTO subpage (title) VALUES ($1) \
                 RETURNING page_id, title, description, visiter_count, created",
            )
            .bind(&new.title)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_err)
        }

        async fn get_page_view(&self, title: &str) -> RepoResult<PageView> {
            let subpage = sqlx::query_as::<_, Subpage>(
                "SELECT page_id, title, description, visiter_count, created \
                 FROM subpage WHERE LOWER(title) = LOWER($1)",
            )
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .ok_or(RepoError::NotFound)?;

            let category = sqlx::query_as::<_, Category>(
                "SELECT cat_id, subject, created, page_id FROM category \
                 WHERE page_id = $1 ORDER BY cat_id",
            )
            .bind(subpage.page_id)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)?;

            // One dependent fetch per category; the page renderer wants
            // the subcategories grouped in category order.
            let mut sub_category = Vec::with_capacity(category.len());
            for cat in &category {
                let subs = sqlx::query_as::<_, Subcategory>(
                    "SELECT sub_cat_id, subject, created, main_cat_id FROM subcategory \
                     WHERE main_cat_id = $1 ORDER BY sub_cat_id",
                )
                .bind(cat.cat_id)
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?;
                sub_category.push(subs);
            }

            Ok(PageView {
                subpage,
                category,
                sub_category,
            })
        }

        async fn delete_subpage(&self, page_id: Id) -> RepoResult<()> {
            let res = sqlx::query("DELETE FROM subpage WHERE page_id = $1")
                .bind(page_id)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CategoryRepo for PgRepo {
        async fn create_category(&self, new: NewCategory) -> RepoResult<Category> {
            sqlx::query_as::<_, Category>(
                "INSERT INTO category (subject, page_id) VALUES ($1, $2) \
                 RETURNING cat_id, subject, created, page_id",
            )
            .bind(&new.subject)
            .bind(new.page_id)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_err)
        }

        async fn list_categories(&self, page_id: Id) -> RepoResult<Vec<Category>> {
            sqlx::query_as::<_, Category>(
                "SELECT cat_id, subject, created, page_id FROM category \
                 WHERE page_id = $1 ORDER BY cat_id",
            )
            .bind(page_id)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)
        }

        async fn delete_category(&self, cat_id: Id) -> RepoResult<()> {
            let res = sqlx::query("DELETE FROM category WHERE cat_id = $1")
                .bind(cat_id)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SubcategoryRepo for PgRepo {
        async fn create_subcategory(&self, new: NewSubcategory) -> RepoResult<Subcategory> {
            sqlx::query_as::<_, Subcategory>(
                "INSERT INTO subcategory (subject, main_cat_id) VALUES ($1, $2) \
                 RETURNING sub_cat_id, subject, created, main_cat_id",
            )
            .bind(&new.subject)
            .bind(new.main_cat_id)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_err)
        }

        async fn get_subcategory_view(
            &self,
            sub_cat_id: Id,
            page_num: Option<i64>,
        ) -> RepoResult<SubcategoryView> {
            let sub_category = sqlx::query_as::<_, Subcategory>(
                "SELECT sub_cat_id, subject, created, main_cat_id FROM subcategory \
                 WHERE sub_cat_id = $1",
            )
            .bind(sub_cat_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .ok_or(RepoError::NotFound)?;

            let category = sqlx::query_as::<_, Category>(
                "SELECT cat_id, subject, created, page_id FROM category WHERE cat_id = $1",
            )
            .bind(sub_category.main_cat_id)
            .fetch_one(&self.pool)
            .await
            .map_err(internal)?;

            let threads = match page_num {
                Some(n) => sqlx::query_as::<_, Thread>(
                    "SELECT thread_id, subject, sub_cat_id FROM thread \
                     WHERE sub_cat_id = $1 ORDER BY thread_id LIMIT $2 OFFSET $3",
                )
                .bind(sub_cat_id)
                .bind(PAGE_SIZE)
                .bind(page_offset(n))
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?,
                None => sqlx::query_as::<_, Thread>(
                    "SELECT thread_id, subject, sub_cat_id FROM thread \
                     WHERE sub_cat_id = $1 ORDER BY thread_id",
                )
                .bind(sub_cat_id)
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?,
            };

            Ok(SubcategoryView {
                sub_category,
                category,
                threads,
            })
        }

        async fn delete_subcategory(&self, sub_cat_id: Id) -> RepoResult<()> {
            let res = sqlx::query("DELETE FROM subcategory WHERE sub_cat_id = $1")
                .bind(sub_cat_id)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ThreadRepo for PgRepo {
        async fn create_thread(&self, new: NewThread) -> RepoResult<ThreadWithPost> {
            let mut tx = self.pool.begin().await.map_err(internal)?;
            let thread = sqlx::query_as::<_, Thread>(
                "INSERT INTO thread (subject, sub_cat_id) VALUES ($1, $2) \
                 RETURNING thread_id, subject, sub_cat_id",
            )
            .bind(&new.subject)
            .bind(new.sub_cat_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(insert_err)?;
            let post = sqlx::query_as::<_, Post>(
                "INSERT INTO post (content, thread_id) VALUES ($1, $2) \
                 RETURNING post_id, content, thread_id",
            )
            .bind(&new.content)
            .bind(thread.thread_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(insert_err)?;
            // A failed post insert drops the transaction and takes the
            // thread row with it.
            tx.commit().await.map_err(internal)?;
            Ok(ThreadWithPost { thread, post })
        }

        async fn get_thread_view(
            &self,
            thread_id: Id,
            page_num: Option<i64>,
        ) -> RepoResult<ThreadView> {
            let thread = sqlx::query_as::<_, Thread>(
                "SELECT thread_id, subject, sub_cat_id FROM thread WHERE thread_id = $1",
            )
            .bind(thread_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .ok_or(RepoError::NotFound)?;

            let posts = match page_num {
                Some(n) => sqlx::query_as::<_, Post>(
                    "SELECT post_id, content, thread_id FROM post \
                     WHERE thread_id = $1 ORDER BY post_id LIMIT $2 OFFSET $3",
                )
                .bind(thread_id)
                .bind(PAGE_SIZE)
                .bind(page_offset(n))
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?,
                None => sqlx::query_as::<_, Post>(
                    "SELECT post_id, content, thread_id FROM post \
                     WHERE thread_id = $1 ORDER BY post_id",
                )
                .bind(thread_id)
                .fetch_all(&self.pool)
                .await
                .map_err(internal)?,
            };

            Ok(ThreadView { thread, posts })
        }

        async fn update_thread(&self, upd: UpdateThread) -> RepoResult<()> {
            // Single conditional statement; the affected-row count is
            // the existence check.
            let res = sqlx::query("UPDATE thread SET subject = $1 WHERE thread_id = $2")
                .bind(&upd.subject)
                .bind(upd.thread_id)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }

        async fn delete_thread(&self, thread_id: Id) -> RepoResult<()> {
            let res = sqlx::query("DELETE FROM thread WHERE thread_id = $1")
                .bind(thread_id)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }

        async fn list_recent_threads(&self, limit: i64) -> RepoResult<Vec<Thread>> {
            sqlx::query_as::<_, Thread>(
                "SELECT thread_id, subject, sub_cat_id FROM thread \
                 ORDER BY thread_id DESC LIMIT $1",
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(internal)
        }
    }

    #[async_trait]
    impl PostRepo for PgRepo {
        async fn create_post(&self, new: NewPost) -> RepoResult<Post> {
            sqlx::query_as::<_, Post>(
                "INSERT INTO post (content, thread_id) VALUES ($1, $2) \
                 RETURNING post_id, content, thread_id",
            )
            .bind(&new.content)
            .bind(new.thread_id)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_err)
        }

        async fn get_post(&self, post_id: Id) -> RepoResult<Post> {
            sqlx::query_as::<_, Post>(
                "SELECT post_id, content, thread_id FROM post WHERE post_id = $1",
            )
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .ok_or(RepoError::NotFound)
        }

        async fn update_post(&self, upd: UpdatePost) -> RepoResult<()> {
            let res = sqlx::query(
                "UPDATE post SET content = $1 WHERE post_id = $2 AND thread_id = $3",
            )
            .bind(&upd.content)
            .bind(upd.post_id)
            .bind(upd.thread_id)
            .execute(&self.pool)
            .await
            .map_err(internal)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }

        async fn delete_post(&self, post_id: Id, thread_id: Id) -> RepoResult<()> {
            let res = sqlx::query("DELETE FROM post WHERE post_id = $1 AND thread_id = $2")
                .bind(post_id)
                .bind(thread_id)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepo for PgRepo {
        async fn create_user(&self, new: NewUser) -> RepoResult<User> {
            sqlx::query_as::<_, User>(
                "INSERT INTO user_account (name, email, password) VALUES ($1, $2, $3) \
                 RETURNING user_account_id, name, email, password",
            )
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.password)
            .fetch_one(&self.pool)
            .await
            .map_err(insert_err)
        }

        async fn get_user(&self, user_account_id: Id) -> RepoResult<User> {
            sqlx::query_as::<_, User>(
                "SELECT user_account_id, name, email, password FROM user_account \
                 WHERE user_account_id = $1",
            )
            .bind(user_account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .ok_or(RepoError::NotFound)
        }

        async fn delete_user(&self, user_account_id: Id) -> RepoResult<()> {
            let res = sqlx::query("DELETE FROM user_account WHERE user_account_id = $1")
                .bind(user_account_id)
                .execute(&self.pool)
                .await
                .map_err(internal)?;
            if res.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }
    }
}
