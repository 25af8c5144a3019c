mod config;
mod services;
mod storage;
mod submission;

use crate::storage::FormStore;
use crate::submission::SubmissionRouter;
use actix_web::{web, App, HttpResponse, HttpServer};
use env_logger::Env;
use log::info;
use std::io;

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Grand Forms backend")
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = config::load_config().map_err(io::Error::other)?;
    env_logger::init_from_env(Env::default().default_filter_or(config.log_level.as_str()));

    let aggregator_url = config.aggregator_url().map_err(io::Error::other)?;
    let store = FormStore::new(config.data_dir.clone());
    let router = SubmissionRouter::new(store.clone(), aggregator_url);
    let max_body_size = config.max_body_size;

    info!(
        "Server running at http://{}:{} (data in {})",
        config.bind_host,
        config.bind_port,
        config.data_dir.display()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::PayloadConfig::new(max_body_size))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(router.clone()))
            .service(services::forms::configure_routes())
            .route("/", web::get().to(index))
    })
    .bind((config.bind_host.as_str(), config.bind_port))?
    .run()
    .await
}
