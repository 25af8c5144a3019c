//! # Form Responses Service
//!
//! Provides the `GET /api/forms/{form_id}/resp` endpoint: the schema of a form
//! together with the submissions stored for it by the `default` destination.
//!
//! ## Workflow
//!
//! 1.  **Form Lookup**: the form record is read to get its `schema`. A missing
//!     record answers `404 Not Found`.
//!
//! 2.  **Responses**: [`FormStore::list_responses`] returns the latest
//!     submissions in file name order, each annotated with
//!     `meta.time` (unix seconds taken from the file name). Unreadable files
//!     are skipped, and a form without any submission has no items.
//!
//! 3.  **HTTP Response**: `200 OK` with a [`FormResponses`] JSON body.
//!
//! Submissions forwarded to `web` or `db` destinations are not kept here.

use crate::services::forms::{form_not_found, invalid_form_id};
use crate::storage::{blocking, is_valid_form_id, FormStore};
use actix_web::{web, HttpResponse, Responder};
use common::model::form::FormResponses;
use log::error;
use std::io;

/// Actix web handler for the `GET /api/forms/{form_id}/resp` endpoint.
///
/// # Arguments
/// * `form_id` - The id of the form, from the URL path.
/// * `store` - The shared [`FormStore`].
///
/// # Returns
/// - `200 OK` with `{schema, items}` on success.
/// - `400 Bad Request` for a malformed form id.
/// - `404 Not Found` when the form does not exist.
/// - `500 Internal Server Error` if the files cannot be read.
pub async fn process(form_id: web::Path<String>, store: web::Data<FormStore>) -> impl Responder {
    let form_id = form_id.into_inner();
    if !is_valid_form_id(&form_id) {
        return invalid_form_id(&form_id);
    }

    match get_responses(store.get_ref().clone(), form_id.clone()).await {
        Ok(responses) => HttpResponse::Ok().json(responses),
        Err(e) if e.kind() == io::ErrorKind::NotFound => form_not_found(&form_id),
        Err(e) => {
            error!("Reading responses of form {} failed: {}", form_id, e);
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

/// Reads the form schema and its stored submissions off the async executor.
async fn get_responses(store: FormStore, form_id: String) -> io::Result<FormResponses> {
    blocking(move || {
        let form = store.read_form(&form_id)?;
        let items = store.list_responses(&form_id)?;
        Ok(FormResponses {
            schema: form.schema,
            items,
        })
    })
    .await
}
