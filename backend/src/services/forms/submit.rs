//! # Form Submission Service
//!
//! Provides the `POST /api/forms/{form_id}` endpoint that receives a filled-in
//! form from the renderer.
//!
//! ## Workflow
//!
//! 1.  **HTTP Request**: `process` receives the raw body and the declared
//!     `Content-Type`. The form id is checked against the id pattern first.
//!
//! 2.  **Routing**: everything else is delegated to
//!     [`SubmissionRouter::submit`], which checks the content type, loads the
//!     form record and dispatches on its destination:
//!     - `default`: the body is written verbatim under `responses/<form_id>/`.
//!     - `web`: the body is re-encoded and POSTed to the configured URL.
//!     - `db`: `{schema, destination, data}` is POSTed to the aggregation service.
//!
//! 3.  **HTTP Response**: `204 No Content` once stored or forwarded. A failure
//!     is logged and rendered by [`SubmitError`] as `text/plain`
//!     `<ErrorName>: <message>` with its status (`400`, `404`, `500` or `502`).
//!
//! A submission is attempted exactly once; retrying is left to the submitter.

use crate::services::forms::{content_type, invalid_form_id};
use crate::storage::is_valid_form_id;
use crate::submission::{SubmissionRouter, SubmitError};
use actix_web::{web, HttpRequest, HttpResponse};
use log::error;

/// Actix web handler for the `POST /api/forms/{form_id}` endpoint.
///
/// # Arguments
/// * `req` - The request, read for its `Content-Type` header.
/// * `form_id` - The id of the form being filled in, from the URL path.
/// * `body` - The submission exactly as posted.
/// * `router` - The shared [`SubmissionRouter`].
///
/// # Returns
/// - `204 No Content` when the submission was stored or accepted by its destination.
/// - `400 Bad Request` for a malformed form id, a wrong content type or a bad body.
/// - `404 Not Found` when no such form exists.
/// - `500`/`502` for destination, storage and remote failures.
pub async fn process(
    req: HttpRequest,
    form_id: web::Path<String>,
    body: web::Bytes,
    router: web::Data<SubmissionRouter>,
) -> Result<HttpResponse, SubmitError> {
    let form_id = form_id.into_inner();
    if !is_valid_form_id(&form_id) {
        return Ok(invalid_form_id(&form_id));
    }

    match router.submit(&form_id, content_type(&req), body).await {
        Ok(_) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => {
            error!("Submission for form {} failed: {}", form_id, e);
            Err(e)
        }
    }
}
