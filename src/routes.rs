use std::sync::Arc;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::*;
use crate::repo::{Repo, RepoError};
use crate::response;
use crate::validate::FieldCheck;

/// Window for the front-page "newest threads" strip.
const RECENT_THREADS_LIMIT: i64 = 10;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(web::resource("/AllNewThreads").route(web::get().to(list_new_threads)))
            .service(
                web::resource("/pages/Page")
                    .route(web::post().to(create_subpage))
                    .route(web::delete().to(delete_subpage)),
            )
            .service(web::resource("/pages/Page/{title}").route(web::get().to(get_page)))
            .service(
                web::resource("/pages/Category")
                    .route(web::get().to(list_categories))
                    .route(web::post().to(create_category))
                    .route(web::delete().to(delete_category)),
            )
            .service(
                web::resource("/pages/subCategory")
                    .route(web::post().to(create_subcategory))
                    .route(web::delete().to(delete_subcategory)),
            )
            .service(
                web::resource("/pages/subCategory/{sub_cat_id}")
                    .route(web::get().to(get_subcategory)),
            )
            .service(
                web::resource("/pages/subCategory/{sub_cat_id}/{page_num}")
                    .route(web::get().to(get_subcategory_page)),
            )
            .service(
                web::resource("/pages/thread")
                    .route(web::post().to(create_thread))
                    .route(web::put().to(update_thread))
                    .route(web::delete().to(delete_thread)),
            )
            .service(web::resource("/pages/thread/{thread_id}").route(web::get().to(get_thread)))
            .service(
                web::resource("/pages/thread/{thread_id}/{page_num}")
                    .route(web::get().to(get_thread_page)),
            )
            .service(
                web::resource("/pages/post")
                    .route(web::post().to(create_post))
                    .route(web::put().to(update_post))
                    .route(web::delete().to(delete_post)),
            )
            .service(web::resource("/pages/post/{post_id}").route(web::get().to(get_post)))
            .service(web::resource("/user").route(web::post().to(create_user)))
            .service(
                web::resource("/user/{user_account_id}")
                    .route(web::get().to(get_user))
                    .route(web::delete().to(delete_user)),
            ),
    );
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
}

// Raw form payloads. Fields stay optional strings so the validator can
// report every missing/malformed field in one pass.

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubpageForm {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubpageRef {
    pub page_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryForm {
    pub subject: Option<String>,
    pub page_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRef {
    pub cat_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubcategoryForm {
    pub subject: Option<String>,
    pub main_cat_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubcategoryRef {
    pub sub_cat_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ThreadForm {
    pub subject: Option<String>,
    pub content: Option<String>,
    pub sub_cat_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ThreadUpdateForm {
    pub thread_id: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ThreadRef {
    pub thread_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PostForm {
    pub content: Option<String>,
    pub thread_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PostUpdateForm {
    pub post_id: Option<String>,
    pub thread_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PostRef {
    pub post_id: Option<String>,
    pub thread_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirmation: Option<String>,
}

// ---------------- Subpage ------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/pages/Page",
    request_body(content = SubpageForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Subpage created", body = Subpage),
        (status = 400, description = "Validation failure or failed insert")
    )
)]
pub async fn create_subpage(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<SubpageForm>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let title = check.text("title", form.title.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    let subpage = data
        .repo
        .create_subpage(NewSubpage { title })
        .await
        .map_err(|e| match e {
            RepoError::InsertFailed => ApiError::InsertFailed("Unable to insert the subpage"),
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(subpage))
}

#[utoipa::path(
    get,
    path = "/api/v1/pages/Page/{title}",
    params(("title" = String, Path, description = "Subpage title, matched case-insensitively")),
    responses(
        (status = 200, description = "Subpage with categories and their subcategories", body = PageView),
        (status = 404, description = "Subpage not found")
    )
)]
pub async fn get_page(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let title = path.into_inner();
    let view = data.repo.get_page_view(&title).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::not_found(format!("No subpage with title: {title}")),
        other => ApiError::internal(req.path(), other),
    })?;
    Ok(response::ok(view))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pages/Page",
    request_body(content = SubpageRef, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Subpage deleted"),
        (status = 404, description = "Subpage not found")
    )
)]
pub async fn delete_subpage(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<SubpageRef>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let page_id = check.int("page_id", form.page_id.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    data.repo
        .delete_subpage(page_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => {
                ApiError::not_found(format!("No subpage with page_id: {page_id}"))
            }
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(serde_json::json!({ "page_id": page_id })))
}

// ---------------- Category -----------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/pages/Category",
    params(("page_id" = String, Query, description = "Subpage id")),
    responses(
        (status = 200, description = "Categories of the subpage", body = [Category]),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn list_categories(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<SubpageRef>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let page_id = check.int("page_id", query.page_id.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    let categories = data
        .repo
        .list_categories(page_id)
        .await
        .map_err(|e| ApiError::internal(req.path(), e))?;
    Ok(response::ok(categories))
}

#[utoipa::path(
    post,
    path = "/api/v1/pages/Category",
    request_body(content = CategoryForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Category created", body = Category),
        (status = 400, description = "Validation failure or failed insert")
    )
)]
pub async fn create_category(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<CategoryForm>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let subject = check.text("subject", form.subject.as_deref());
    let page_id = check.int("page_id", form.page_id.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    let category = data
        .repo
        .create_category(NewCategory { subject, page_id })
        .await
        .map_err(|e| match e {
            RepoError::InsertFailed => ApiError::InsertFailed("Unable to insert the category"),
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(category))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pages/Category",
    request_body(content = CategoryRef, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<CategoryRef>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let cat_id = check.int("cat_id", form.cat_id.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    data.repo.delete_category(cat_id).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::not_found(format!("No category with cat_id: {cat_id}")),
        other => ApiError::internal(req.path(), other),
    })?;
    Ok(response::ok(serde_json::json!({ "cat_id": cat_id })))
}

// ---------------- Subcategory --------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/pages/subCategory",
    request_body(content = SubcategoryForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Subcategory created", body = Subcategory),
        (status = 400, description = "Validation failure or failed insert")
    )
)]
pub async fn create_subcategory(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<SubcategoryForm>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let subject = check.text("subject", form.subject.as_deref());
    let main_cat_id = check.int("main_cat_id", form.main_cat_id.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    let subcategory = data
        .repo
        .create_subcategory(NewSubcategory {
            subject,
            main_cat_id,
        })
        .await
        .map_err(|e| match e {
            RepoError::InsertFailed => ApiError::InsertFailed("Unable to insert the subcategory"),
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(subcategory))
}

async fn subcategory_view(
    req: HttpRequest,
    data: web::Data<AppState>,
    raw_id: String,
    raw_page: Option<String>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let sub_cat_id = check.int("sub_cat_id", Some(&raw_id));
    let page_num = raw_page.map(|p| check.int("page_num", Some(&p)));
    check.finish().map_err(ApiError::Validation)?;

    let view = data
        .repo
        .get_subcategory_view(sub_cat_id, page_num)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => {
                ApiError::not_found(format!("No subcategory with sub_cat_id: {sub_cat_id}"))
            }
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(view))
}

#[utoipa::path(
    get,
    path = "/api/v1/pages/subCategory/{sub_cat_id}",
    params(("sub_cat_id" = String, Path, description = "Subcategory id")),
    responses(
        (status = 200, description = "Subcategory with its parent category and threads", body = SubcategoryView),
        (status = 404, description = "Subcategory not found")
    )
)]
pub async fn get_subcategory(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    subcategory_view(req, data, path.into_inner(), None).await
}

#[utoipa::path(
    get,
    path = "/api/v1/pages/subCategory/{sub_cat_id}/{page_num}",
    params(
        ("sub_cat_id" = String, Path, description = "Subcategory id"),
        ("page_num" = String, Path, description = "1-based page of threads")
    ),
    responses(
        (status = 200, description = "Subcategory with a page of its threads", body = SubcategoryView),
        (status = 404, description = "Subcategory not found")
    )
)]
pub async fn get_subcategory_page(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (raw_id, raw_page) = path.into_inner();
    subcategory_view(req, data, raw_id, Some(raw_page)).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/pages/subCategory",
    request_body(content = SubcategoryRef, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Subcategory deleted"),
        (status = 404, description = "Subcategory not found")
    )
)]
pub async fn delete_subcategory(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<SubcategoryRef>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let sub_cat_id = check.int("sub_cat_id", form.sub_cat_id.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    data.repo
        .delete_subcategory(sub_cat_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => {
                ApiError::not_found(format!("No subcategory with sub_cat_id: {sub_cat_id}"))
            }
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(serde_json::json!({ "sub_cat_id": sub_cat_id })))
}

// ---------------- Thread -------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/pages/thread",
    request_body(content = ThreadForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Thread and its first post created", body = ThreadWithPost),
        (status = 400, description = "Validation failure or failed insert")
    )
)]
pub async fn create_thread(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<ThreadForm>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let subject = check.text("subject", form.subject.as_deref());
    let content = check.text("content", form.content.as_deref());
    let sub_cat_id = check.int("sub_cat_id", form.sub_cat_id.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    let created = data
        .repo
        .create_thread(NewThread {
            subject,
            sub_cat_id,
            content,
        })
        .await
        .map_err(|e| match e {
            RepoError::InsertFailed => ApiError::InsertFailed("Unable to create a thread"),
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(created))
}

async fn thread_view(
    req: HttpRequest,
    data: web::Data<AppState>,
    raw_id: String,
    raw_page: Option<String>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let thread_id = check.int("thread_id", Some(&raw_id));
    let page_num = raw_page.map(|p| check.int("page_num", Some(&p)));
    check.finish().map_err(ApiError::Validation)?;

    let view = data
        .repo
        .get_thread_view(thread_id, page_num)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => {
                ApiError::not_found(format!("No thread with thread_id: {thread_id}"))
            }
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(view))
}

#[utoipa::path(
    get,
    path = "/api/v1/pages/thread/{thread_id}",
    params(("thread_id" = String, Path, description = "Thread id")),
    responses(
        (status = 200, description = "Thread with its posts", body = ThreadView),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn get_thread(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    thread_view(req, data, path.into_inner(), None).await
}

#[utoipa::path(
    get,
    path = "/api/v1/pages/thread/{thread_id}/{page_num}",
    params(
        ("thread_id" = String, Path, description = "Thread id"),
        ("page_num" = String, Path, description = "1-based page of posts")
    ),
    responses(
        (status = 200, description = "Thread with a page of its posts", body = ThreadView),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn get_thread_page(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (raw_id, raw_page) = path.into_inner();
    thread_view(req, data, raw_id, Some(raw_page)).await
}

#[utoipa::path(
    put,
    path = "/api/v1/pages/thread",
    request_body(content = ThreadUpdateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Thread subject updated"),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn update_thread(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<ThreadUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let thread_id = check.int("thread_id", form.thread_id.as_deref());
    let subject = check.text("subject", form.subject.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    data.repo
        .update_thread(UpdateThread { thread_id, subject })
        .await
        .map_err(|e| match e {
            RepoError::NotFound => {
                ApiError::not_found(format!("No thread with thread_id: {thread_id}"))
            }
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(serde_json::json!({ "thread_id": thread_id })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pages/thread",
    request_body(content = ThreadRef, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Thread deleted"),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn delete_thread(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<ThreadRef>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let thread_id = check.int("thread_id", form.thread_id.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    data.repo.delete_thread(thread_id).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::not_found(format!("No thread with thread_id: {thread_id}")),
        other => ApiError::internal(req.path(), other),
    })?;
    Ok(response::ok(serde_json::json!({ "thread_id": thread_id })))
}

#[utoipa::path(
    get,
    path = "/api/v1/AllNewThreads",
    responses(
        (status = 200, description = "Newest threads across the forum", body = [Thread])
    )
)]
pub async fn list_new_threads(
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let threads = data
        .repo
        .list_recent_threads(RECENT_THREADS_LIMIT)
        .await
        .map_err(|e| ApiError::internal(req.path(), e))?;
    Ok(response::ok(threads))
}

// ---------------- Post ---------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/pages/post",
    request_body(content = PostForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Post created", body = Post),
        (status = 400, description = "Validation failure or failed insert")
    )
)]
pub async fn create_post(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let content = check.text("content", form.content.as_deref());
    let thread_id = check.int("thread_id", form.thread_id.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    let post = data
        .repo
        .create_post(NewPost { content, thread_id })
        .await
        .map_err(|e| match e {
            RepoError::InsertFailed => ApiError::InsertFailed("Unable to create the post"),
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(post))
}

#[utoipa::path(
    get,
    path = "/api/v1/pages/post/{post_id}",
    params(("post_id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let raw_id = path.into_inner();
    let mut check = FieldCheck::new();
    let post_id = check.int("post_id", Some(&raw_id));
    check.finish().map_err(ApiError::Validation)?;

    let post = data.repo.get_post(post_id).await.map_err(|e| match e {
        RepoError::NotFound => ApiError::not_found(format!("No post with post_id: {post_id}")),
        other => ApiError::internal(req.path(), other),
    })?;
    Ok(response::ok(post))
}

#[utoipa::path(
    put,
    path = "/api/v1/pages/post",
    request_body(content = PostUpdateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Post content updated"),
        (status = 404, description = "No post with that post_id/thread_id pair")
    )
)]
pub async fn update_post(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<PostUpdateForm>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let post_id = check.int("post_id", form.post_id.as_deref());
    let thread_id = check.int("thread_id", form.thread_id.as_deref());
    let content = check.text("content", form.content.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    data.repo
        .update_post(UpdatePost {
            post_id,
            thread_id,
            content,
        })
        .await
        .map_err(|e| match e {
            RepoError::NotFound => ApiError::not_found(format!(
                "No post with post_id {post_id} and thread_id: {thread_id}"
            )),
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(
        serde_json::json!({ "post_id": post_id, "thread_id": thread_id }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/pages/post",
    request_body(content = PostRef, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 404, description = "No post with that post_id/thread_id pair")
    )
)]
pub async fn delete_post(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<PostRef>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let post_id = check.int("post_id", form.post_id.as_deref());
    let thread_id = check.int("thread_id", form.thread_id.as_deref());
    check.finish().map_err(ApiError::Validation)?;

    data.repo
        .delete_post(post_id, thread_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => ApiError::not_found(format!(
                "No post with post_id {post_id} and thread_id: {thread_id}"
            )),
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(
        serde_json::json!({ "post_id": post_id, "thread_id": thread_id }),
    ))
}

// ---------------- User ---------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/user",
    request_body(content = UserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User created", body = UserPublic),
        (status = 400, description = "Validation failure or failed insert")
    )
)]
pub async fn create_user(
    req: HttpRequest,
    data: web::Data<AppState>,
    form: web::Form<UserForm>,
) -> Result<HttpResponse, ApiError> {
    let mut check = FieldCheck::new();
    let name = check.text("name", form.name.as_deref());
    let email = check.email("email", form.email.as_deref());
    let password = check.raw("password", form.password.as_deref());
    let confirmation = check.raw("confirmation", form.confirmation.as_deref());
    if !password.is_empty() && password != confirmation {
        check.reject("confirmation", "Password confirmation does not match");
    }
    check.finish().map_err(ApiError::Validation)?;

    // Only the digest reaches the store.
    let digest = format!("{:x}", Sha256::digest(password.as_bytes()));
    let user = data
        .repo
        .create_user(NewUser {
            name,
            email,
            password: digest,
        })
        .await
        .map_err(|e| match e {
            RepoError::InsertFailed => ApiError::InsertFailed("Unable to create the user"),
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(UserPublic::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/{user_account_id}",
    params(("user_account_id" = String, Path, description = "User account id")),
    responses(
        (status = 200, description = "User", body = UserPublic),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let raw_id = path.into_inner();
    let mut check = FieldCheck::new();
    let user_account_id = check.int("user_account_id", Some(&raw_id));
    check.finish().map_err(ApiError::Validation)?;

    let user = data
        .repo
        .get_user(user_account_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => {
                ApiError::not_found(format!("No user with user_account_id: {user_account_id}"))
            }
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(UserPublic::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/user/{user_account_id}",
    params(("user_account_id" = String, Path, description = "User account id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let raw_id = path.into_inner();
    let mut check = FieldCheck::new();
    let user_account_id = check.int("user_account_id", Some(&raw_id));
    check.finish().map_err(ApiError::Validation)?;

    data.repo
        .delete_user(user_account_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => {
                ApiError::not_found(format!("No user with user_account_id: {user_account_id}"))
            }
            other => ApiError::internal(req.path(), other),
        })?;
    Ok(response::ok(
        serde_json::json!({ "user_account_id": user_account_id }),
    ))
}
