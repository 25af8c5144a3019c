//! # Form Save Service
//!
//! Provides the `PUT /api/forms/{form_id}` endpoint used by the form builder
//! to persist a `{schema, uiSchema, destination}` record. The record is only
//! checked to be JSON; it is stored byte for byte, and the last write wins.

use crate::services::forms::{content_type, invalid_form_id};
use crate::storage::{blocking, is_valid_form_id, FormStore};
use crate::submission::check_content_type;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};

/// Actix web handler for the `PUT /api/forms/{form_id}` endpoint.
///
/// # Returns
/// - `204 No Content` once the record is written.
/// - `400 Bad Request` for a malformed id, a content type other than
///   `application/json`, or a body that is not JSON.
/// - `500 Internal Server Error` if the file cannot be written.
pub async fn process(
    req: HttpRequest,
    form_id: web::Path<String>,
    body: web::Bytes,
    store: web::Data<FormStore>,
) -> impl Responder {
    let form_id = form_id.into_inner();
    if !is_valid_form_id(&form_id) {
        return invalid_form_id(&form_id);
    }
    if let Err(e) = check_content_type(content_type(&req)) {
        error!("Saving form {} rejected: {}", form_id, e);
        return HttpResponse::BadRequest().content_type("text/plain").body(e.to_string());
    }
    if let Err(e) = serde_json::from_slice::<serde_json::Value>(&body) {
        error!("Saving form {} rejected, bad JSON: {}", form_id, e);
        return HttpResponse::BadRequest()
            .content_type("text/plain")
            .body(format!("bad JSON: {}", e));
    }

    let writer = store.get_ref().clone();
    let id = form_id.clone();
    match blocking(move || writer.write_form(&id, &body)).await {
        Ok(()) => {
            info!("Saved form {}", form_id);
            HttpResponse::NoContent().finish()
        }
        Err(e) => {
            error!("Saving form {} failed: {}", form_id, e);
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}
