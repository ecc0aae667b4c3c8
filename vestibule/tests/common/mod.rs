#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::Arc;
use vestibule::{
    AppError, Arguments, BoxError, Context, Controller, DispatchError, OutputBuffer, Payload,
    Request, Response,
};

// ============================================================================
// Requests
// ============================================================================

pub fn get(path: &str) -> Request {
    http::Request::builder()
        .uri(path)
        .body(String::new())
        .expect("valid request")
}

// ============================================================================
// Test Controllers
// ============================================================================

pub struct PostsController {
    request: Arc<Request>,
    output: OutputBuffer,
    views: u32,
}

#[vestibule::actions]
impl PostsController {
    async fn index_action(&mut self) -> Value {
        self.views += 1;
        json!([{ "id": 1, "title": "Hello" }])
    }

    async fn index_json(&mut self, arguments: Arguments) -> Payload {
        let posts = arguments
            .first()
            .and_then(Payload::as_value)
            .cloned()
            .unwrap_or_default();
        Payload::Value(json!({ "posts": posts, "views": self.views }))
    }

    async fn show_action(&mut self, arguments: Arguments) -> Result<Value, AppError> {
        match arguments.first().and_then(Payload::as_value).and_then(Value::as_u64) {
            Some(1) => Ok(json!({ "id": 1, "title": "Hello" })),
            _ => Err(AppError::new("Post not found", 404)),
        }
    }

    async fn create_action(&mut self) -> Result<Response, DispatchError> {
        self.redirect("/posts/1", 303)
    }

    async fn noisy_action(&mut self) -> &'static str {
        self.output.write("debug: noisy");
        "quiet"
    }

    async fn noisy_crash_action(&mut self) -> Result<&'static str, AppError> {
        self.output.write("debug: before crash");
        Err(AppError::new("Service Unavailable", 503))
    }

    async fn crash_action(&mut self) -> Result<(), BoxError> {
        Err("database unavailable".into())
    }

    #[action(name = "legacy")]
    async fn old_index(&mut self) -> String {
        format!("legacy {}", self.request.uri().path())
    }

    #[action(skip)]
    pub async fn views(&self) -> u32 {
        self.views
    }

    pub fn title(&self) -> &'static str {
        "Posts"
    }
}

impl Controller for PostsController {
    fn new(context: &Context, request: Arc<Request>) -> Result<Self, BoxError> {
        Ok(Self {
            request,
            output: context.output().clone(),
            views: 0,
        })
    }

    fn request(&self) -> &Request {
        &self.request
    }
}

pub struct EmptyController;

#[vestibule::actions]
impl EmptyController {
    pub fn helper(&self) -> usize {
        0
    }
}
