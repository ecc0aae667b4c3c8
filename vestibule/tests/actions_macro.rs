//! Integration tests for the `#[actions]` attribute.

#![cfg(feature = "macros")]

mod common;

use common::{EmptyController, PostsController, get};
use serde_json::json;
use vestibule::{Actions, Callback, Context, Controller, InvokeError, Payload};

fn controller() -> PostsController {
    let context = Context::for_request(get("/posts"));
    let request = context.request().cloned().unwrap();
    PostsController::new(&context, request).unwrap()
}

#[test]
fn test_method_table() {
    let controller = controller();
    for name in ["indexAction", "indexJson", "showAction", "createAction", "noisyAction", "legacy"] {
        assert!(controller.has_action(name), "{name} should be an action");
    }
    for name in ["index_action", "oldIndex", "views", "title", "new", "request"] {
        assert!(!controller.has_action(name), "{name} should not be an action");
    }
    assert!(!EmptyController.has_action("indexAction"));
    assert_eq!(Controller::request(&controller).uri().path(), "/posts");
}

#[tokio::test]
async fn test_invoke_by_name() {
    let mut controller = controller();

    let result = controller.invoke("indexAction", Vec::new()).await.unwrap();
    assert_eq!(result, Payload::Value(json!([{ "id": 1, "title": "Hello" }])));

    let result = controller
        .invoke("indexJson", vec![Payload::Value(json!([]))])
        .await
        .unwrap();
    assert_eq!(result, Payload::Value(json!({ "posts": [], "views": 1 })));

    let result = controller.invoke("legacy", Vec::new()).await.unwrap();
    assert_eq!(result.render(), "legacy /posts");
}

#[tokio::test]
async fn test_results_convert_to_payloads() {
    let mut controller = controller();

    let redirect = controller.invoke("createAction", Vec::new()).await.unwrap();
    assert_eq!(redirect.as_response().unwrap().header("location"), Some("/posts/1"));

    let err = controller
        .invoke("showAction", vec![Payload::Value(json!(5))])
        .await
        .unwrap_err();
    assert!(!err.is_invalid_callback());
    assert_eq!(vestibule::error_code(&err), 404);
}

#[tokio::test]
async fn test_unknown_methods() {
    let mut controller = controller();
    let err = controller.invoke("deleteAction", Vec::new()).await.unwrap_err();
    assert!(matches!(
        &err,
        InvokeError::MissingMethod { method, target } if method == "deleteAction" && target.ends_with("PostsController")
    ));

    let mut empty = EmptyController;
    assert!(empty.invoke("indexAction", Vec::new()).await.is_err());
    assert_eq!(empty.helper(), 0);
}

#[tokio::test]
async fn test_callbacks_share_the_instance() {
    let callback = Callback::object(controller(), "indexAction");
    let copy = callback.clone();
    callback.invoke().await.unwrap();
    copy.invoke().await.unwrap();

    let mut hook = callback.clone();
    hook.set_method("indexJson");
    let result = hook.execute(vec![Payload::null()]).await.unwrap();
    assert_eq!(result, Payload::Value(json!({ "posts": null, "views": 2 })));
    assert_eq!(controller().title(), "Posts");
}
