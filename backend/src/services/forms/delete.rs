use crate::services::forms::{form_not_found, invalid_form_id};
use crate::storage::{blocking, is_valid_form_id, FormStore};
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use std::io;

/// Handler for `DELETE /api/forms/{form_id}`.
///
/// The record is moved to the trash rather than removed: the stored
/// responses still need its schema, and a moved file can be restored.
pub async fn process(form_id: web::Path<String>, store: web::Data<FormStore>) -> impl Responder {
    let form_id = form_id.into_inner();
    if !is_valid_form_id(&form_id) {
        return invalid_form_id(&form_id);
    }

    let trash = store.get_ref().clone();
    let id = form_id.clone();
    match blocking(move || trash.trash_form(&id)).await {
        Ok(()) => {
            info!("Moved form {} to the trash", form_id);
            HttpResponse::NoContent().finish()
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => form_not_found(&form_id),
        Err(e) => {
            error!("Deleting form {} failed: {}", form_id, e);
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}
