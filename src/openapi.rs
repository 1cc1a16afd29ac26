use crate::models::{
    Category, NewCategory, NewPost, NewSubcategory, NewSubpage, NewThread, NewUser, PageView,
    Post, Subcategory, SubcategoryView, Subpage, Thread, ThreadView, ThreadWithPost, UpdatePost,
    UpdateThread, UserPublic,
};
use crate::validate::FieldError;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::create_subpage,
        crate::routes::get_page,
        crate::routes::delete_subpage,
        crate::routes::list_categories,
        crate::routes::create_category,
        crate::routes::delete_category,
        crate::routes::create_subcategory,
        crate::routes::get_subcategory,
        crate::routes::get_subcategory_page,
        crate::routes::delete_subcategory,
        crate::routes::create_thread,
        crate::routes::get_thread,
        crate::routes::get_thread_page,
        crate::routes::update_thread,
        crate::routes::delete_thread,
        crate::routes::list_new_threads,
        crate::routes::create_post,
        crate::routes::get_post,
        crate::routes::update_post,
        crate::routes::delete_post,
        crate::routes::create_user,
        crate::routes::get_user,
        crate::routes::delete_user,
    ),
    components(schemas(
        Subpage, NewSubpage, Category, NewCategory, Subcategory, NewSubcategory,
        Thread, NewThread, UpdateThread, Post, NewPost, UpdatePost,
        NewUser, UserPublic, PageView, SubcategoryView, ThreadView, ThreadWithPost,
        FieldError,
        crate::routes::SubpageForm, crate::routes::SubpageRef,
        crate::routes::CategoryForm, crate::routes::CategoryRef,
        crate::routes::SubcategoryForm, crate::routes::SubcategoryRef,
        crate::routes::ThreadForm, crate::routes::ThreadUpdateForm, crate::routes::ThreadRef,
        crate::routes::PostForm, crate::routes::PostUpdateForm, crate::routes::PostRef,
        crate::routes::UserForm,
    )),
    tags(
        (name = "pages", description = "Subpage operations"),
        (name = "categories", description = "Category and subcategory operations"),
        (name = "threads", description = "Thread and post operations"),
        (name = "users", description = "User operations"),
    )
)]
pub struct ApiDoc;
