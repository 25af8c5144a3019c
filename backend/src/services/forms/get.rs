use crate::services::forms::{form_not_found, invalid_form_id};
use crate::storage::{blocking, is_valid_form_id, FormStore};
use actix_web::{web, HttpResponse, Responder};
use log::error;
use std::io;

/// Handler for `GET /api/forms/{form_id}`: the stored record, unchanged.
pub async fn process(form_id: web::Path<String>, store: web::Data<FormStore>) -> impl Responder {
    let form_id = form_id.into_inner();
    if !is_valid_form_id(&form_id) {
        return invalid_form_id(&form_id);
    }

    let reader = store.get_ref().clone();
    let id = form_id.clone();
    match blocking(move || reader.read_form_bytes(&id)).await {
        Ok(bytes) => HttpResponse::Ok().content_type("application/json").body(bytes),
        Err(e) if e.kind() == io::ErrorKind::NotFound => form_not_found(&form_id),
        Err(e) => {
            error!("Reading form {} failed: {}", form_id, e);
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}
