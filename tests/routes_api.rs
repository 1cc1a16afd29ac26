#![cfg(feature = "inmem-store")]

use actix_web::{test, App};
use rfb::repo::inmem::InMemRepo;
use rfb::routes::{config, AppState};
use serial_test::serial;
use std::sync::Arc;

// Unique temp data dir per test so snapshots never leak across runs
fn setup_env() {
    std::env::set_var("FORUM_DATA_DIR", tempfile::tempdir().unwrap().path());
}

macro_rules! forum_app {
    () => {
        test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(AppState {
                    repo: Arc::new(InMemRepo::new()),
                }))
                .configure(config),
        )
        .await
    };
}

async fn body_json(resp: actix_web::dev::ServiceResponse) -> serde_json::Value {
    serde_json::from_slice(&test::read_body(resp).await).unwrap()
}

#[actix_web::test]
#[serial]
async fn subpage_create_and_fetch_flow() {
    setup_env();
    let app = forum_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Page")
        .set_form(&[("title", "Toyota")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    assert_eq!(body["status_code"], 200);
    assert_eq!(body["payload"]["title"], "Toyota");
    let page_id = body["payload"]["page_id"].as_i64().unwrap();
    assert!(page_id > 0);

    // case-insensitive title lookup
    let req = test::TestRequest::get()
        .uri("/api/v1/pages/Page/toyota")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    assert_eq!(body["payload"]["subpage"]["page_id"], page_id);
    assert!(body["payload"]["category"].as_array().unwrap().is_empty());

    // unknown title -> 404 with the error envelope
    let req = test::TestRequest::get()
        .uri("/api/v1/pages/Page/Honda")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body = body_json(resp).await;
    assert_eq!(body["status_code"], 404);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Honda"));

    // delete, then the page is gone
    let req = test::TestRequest::delete()
        .uri("/api/v1/pages/Page")
        .set_form(&[("page_id", page_id.to_string())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let req = test::TestRequest::get()
        .uri("/api/v1/pages/Page/Toyota")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
#[serial]
async fn write_endpoints_reject_disallowed_characters() {
    setup_env();
    let app = forum_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Page")
        .set_form(&[("title", "Toyota <script>")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["message"], "validation failed");
    let violations = body["error"]["additional_information"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["field"], "title");
    assert_eq!(violations[0]["message"], "Invalid title parameter");

    // missing fields are itemized too, all at once
    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Category")
        .set_form(&[("ignored", "x")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = body_json(resp).await;
    let violations = body["error"]["additional_information"].as_array().unwrap();
    assert_eq!(violations.len(), 2);

    // non-integer id
    let req = test::TestRequest::delete()
        .uri("/api/v1/pages/Category")
        .set_form(&[("cat_id", "abc")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = body_json(resp).await;
    let violations = body["error"]["additional_information"].as_array().unwrap();
    assert_eq!(violations[0]["message"], "Invalid cat_id parameter");
}

#[actix_web::test]
#[serial]
async fn category_flow() {
    setup_env();
    let app = forum_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Page")
        .set_form(&[("title", "Toyota")])
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    let page_id = body["payload"]["page_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Category")
        .set_form(&[
            ("subject", "Sports Cars".to_string()),
            ("page_id", page_id.to_string()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    let cat_id = body["payload"]["cat_id"].as_i64().unwrap();
    assert_eq!(body["payload"]["subject"], "Sports Cars");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/pages/Category?page_id={page_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    assert_eq!(body["payload"].as_array().unwrap().len(), 1);

    // deleting a missing category is 404, an existing one 200
    let req = test::TestRequest::delete()
        .uri("/api/v1/pages/Category")
        .set_form(&[("cat_id", "9999")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::delete()
        .uri("/api/v1/pages/Category")
        .set_form(&[("cat_id", cat_id.to_string())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/pages/Category?page_id={page_id}"))
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    assert!(body["payload"].as_array().unwrap().is_empty());
}

#[actix_web::test]
#[serial]
async fn thread_and_post_flow() {
    setup_env();
    let app = forum_app!();

    // page -> category -> subcategory
    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Page")
        .set_form(&[("title", "Toyota")])
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    let page_id = body["payload"]["page_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Category")
        .set_form(&[
            ("subject", "Sports Cars".to_string()),
            ("page_id", page_id.to_string()),
        ])
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    let cat_id = body["payload"]["cat_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/subCategory")
        .set_form(&[
            ("subject", "Supra".to_string()),
            ("main_cat_id", cat_id.to_string()),
        ])
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    let sub_cat_id = body["payload"]["sub_cat_id"].as_i64().unwrap();

    // creating a thread creates exactly one post with it
    let req = test::TestRequest::post()
        .uri("/api/v1/pages/thread")
        .set_form(&[
            ("subject", "First thread".to_string()),
            ("content", "hello world".to_string()),
            ("sub_cat_id", sub_cat_id.to_string()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    let thread_id = body["payload"]["thread"]["thread_id"].as_i64().unwrap();
    let post_id = body["payload"]["post"]["post_id"].as_i64().unwrap();
    assert_eq!(body["payload"]["post"]["thread_id"], thread_id);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/pages/thread/{thread_id}"))
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["payload"]["thread_id"], thread_id);
    assert_eq!(body["payload"]["posts"].as_array().unwrap().len(), 1);

    // update thread subject
    let req = test::TestRequest::put()
        .uri("/api/v1/pages/thread")
        .set_form(&[
            ("thread_id", thread_id.to_string()),
            ("subject", "Renamed".to_string()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // mismatched thread_id must be 404, not a silent no-op
    let req = test::TestRequest::put()
        .uri("/api/v1/pages/post")
        .set_form(&[
            ("post_id", post_id.to_string()),
            ("thread_id", (thread_id + 1).to_string()),
            ("content", "hijacked".to_string()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::put()
        .uri("/api/v1/pages/post")
        .set_form(&[
            ("post_id", post_id.to_string()),
            ("thread_id", thread_id.to_string()),
            ("content", "edited".to_string()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/pages/post/{post_id}"))
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["payload"]["content"], "edited");

    // delete needs the matching pair as well
    let req = test::TestRequest::delete()
        .uri("/api/v1/pages/post")
        .set_form(&[
            ("post_id", post_id.to_string()),
            ("thread_id", thread_id.to_string()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let req = test::TestRequest::delete()
        .uri("/api/v1/pages/post")
        .set_form(&[
            ("post_id", post_id.to_string()),
            ("thread_id", thread_id.to_string()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
#[serial]
async fn subcategory_view_and_path_validation() {
    setup_env();
    let app = forum_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Page")
        .set_form(&[("title", "Toyota")])
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    let page_id = body["payload"]["page_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Category")
        .set_form(&[
            ("subject", "Sports Cars".to_string()),
            ("page_id", page_id.to_string()),
        ])
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    let cat_id = body["payload"]["cat_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/subCategory")
        .set_form(&[
            ("subject", "Supra".to_string()),
            ("main_cat_id", cat_id.to_string()),
        ])
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    let sub_cat_id = body["payload"]["sub_cat_id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/pages/subCategory/{sub_cat_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    assert_eq!(body["payload"]["sub_category"]["sub_cat_id"], sub_cat_id);
    assert_eq!(body["payload"]["category"]["cat_id"], cat_id);

    // paged variant of the same route
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/pages/subCategory/{sub_cat_id}/1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri("/api/v1/pages/subCategory/9999")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // malformed path id gets the structured 400, not a router error
    let req = test::TestRequest::get()
        .uri("/api/v1/pages/subCategory/abc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = body_json(resp).await;
    assert_eq!(
        body["error"]["additional_information"][0]["message"],
        "Invalid sub_cat_id parameter"
    );
}

#[actix_web::test]
#[serial]
async fn user_flow() {
    setup_env();
    let app = forum_app!();

    // mismatched confirmation -> 400
    let req = test::TestRequest::post()
        .uri("/api/v1/user")
        .set_form(&[
            ("name", "Alice"),
            ("email", "alice@example.com"),
            ("password", "hunter2!"),
            ("confirmation", "hunter3!"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = body_json(resp).await;
    assert_eq!(
        body["error"]["additional_information"][0]["field"],
        "confirmation"
    );

    // bad email -> 400
    let req = test::TestRequest::post()
        .uri("/api/v1/user")
        .set_form(&[
            ("name", "Alice"),
            ("email", "not-an-email"),
            ("password", "hunter2!"),
            ("confirmation", "hunter2!"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/v1/user")
        .set_form(&[
            ("name", "Alice"),
            ("email", "alice@example.com"),
            ("password", "hunter2!"),
            ("confirmation", "hunter2!"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    let user_id = body["payload"]["user_account_id"].as_i64().unwrap();
    assert_eq!(body["payload"]["name"], "Alice");
    // the digest never leaves the store layer
    assert!(body["payload"].get("password").is_none());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/user/{user_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/user/{user_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/user/{user_id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
#[serial]
async fn all_new_threads_lists_newest_first() {
    setup_env();
    let app = forum_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Page")
        .set_form(&[("title", "Toyota")])
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    let page_id = body["payload"]["page_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/Category")
        .set_form(&[
            ("subject", "Sports Cars".to_string()),
            ("page_id", page_id.to_string()),
        ])
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    let cat_id = body["payload"]["cat_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/pages/subCategory")
        .set_form(&[
            ("subject", "Supra".to_string()),
            ("main_cat_id", cat_id.to_string()),
        ])
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    let sub_cat_id = body["payload"]["sub_cat_id"].as_i64().unwrap();

    let mut last_id = 0;
    for i in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/v1/pages/thread")
            .set_form(&[
                ("subject", format!("Thread {i}")),
                ("content", "body".to_string()),
                ("sub_cat_id", sub_cat_id.to_string()),
            ])
            .to_request();
        let body = body_json(test::call_service(&app, req).await).await;
        last_id = body["payload"]["thread"]["thread_id"].as_i64().unwrap();
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/AllNewThreads")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    let threads = body["payload"].as_array().unwrap();
    assert_eq!(threads.len(), 3);
    assert_eq!(threads[0]["thread_id"].as_i64().unwrap(), last_id);
}
