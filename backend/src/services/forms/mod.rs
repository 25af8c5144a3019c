//! # Form Service Module
//!
//! REST endpoints for forms and their submissions, all under `/api/forms`.
//! Form records are kept as flat JSON files by [`FormStore`](crate::storage::FormStore);
//! submissions go through the [`SubmissionRouter`](crate::submission::SubmissionRouter).
//!
//! ## Sub-modules:
//! - `list`: ids and titles of all stored forms.
//! - `get`: one stored form record.
//! - `save`: create or replace a form record.
//! - `delete`: move a form record to the trash.
//! - `submit`: accept a filled-in form.
//! - `responses`: the schema of a form and its stored submissions.

mod delete;
mod get;
mod list;
mod responses;
mod save;
mod submit;

use actix_web::http::header::CONTENT_TYPE;
use actix_web::web::{delete, get, post, put, scope};
use actix_web::{HttpRequest, HttpResponse, Scope};
use log::error;

/// The base path for all form-related API endpoints.
const API_PATH: &str = "/api/forms";

/// Configures and returns the Actix `Scope` for all form-related routes.
///
/// # Registered Routes:
///
/// *   **`GET ""`**: `[{id, title}]` of every stored form.
/// *   **`GET /{form_id}`**: the stored `{schema, uiSchema, destination}` record.
/// *   **`PUT /{form_id}`**: replaces the record; `application/json` only, `204` on success.
/// *   **`DELETE /{form_id}`**: moves the record to the trash, `204` on success.
/// *   **`POST /{form_id}`**: submits a filled-in form, `204` once stored or forwarded.
/// *   **`GET /{form_id}/resp`**: `{schema, items}` with the latest submissions.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("/{form_id}", get().to(get::process))
        .route("/{form_id}", put().to(save::process))
        .route("/{form_id}", delete().to(delete::process))
        .route("/{form_id}", post().to(submit::process))
        .route("/{form_id}/resp", get().to(responses::process))
}

fn content_type(req: &HttpRequest) -> Option<&str> {
    req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

fn form_not_found(form_id: &str) -> HttpResponse {
    error!("Form {} not found", form_id);
    HttpResponse::NotFound()
        .content_type("text/plain; charset=utf-8")
        .body(format!("找不到表单 {}", form_id))
}

fn invalid_form_id(form_id: &str) -> HttpResponse {
    error!("Rejected malformed form id {:?}", form_id);
    HttpResponse::BadRequest()
        .content_type("text/plain; charset=utf-8")
        .body(format!("invalid form id {:?}", form_id))
}
