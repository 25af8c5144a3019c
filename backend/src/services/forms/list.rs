use crate::storage::{blocking, FormStore};
use actix_web::{web, HttpResponse, Responder};
use common::model::form::FormSummary;
use log::error;
use std::io;

/// Handler for `GET /api/forms`.
pub async fn process(store: web::Data<FormStore>) -> impl Responder {
    match list_forms(store.get_ref().clone()).await {
        Ok(forms) => HttpResponse::Ok().json(forms),
        Err(e) => {
            error!("Listing forms failed: {}", e);
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

async fn list_forms(store: FormStore) -> io::Result<Vec<FormSummary>> {
    blocking(move || store.list_forms()).await
}
