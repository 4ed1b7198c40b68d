// src/main.rs
use actix_files::Files;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use anyhow::Context;
use log::info;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod errors;
mod flow;
mod handlers;
mod models;
mod services;

use crate::config::Config;
use crate::flow::{Session, SharedSession};
use crate::handlers::{
    amend_result, edit_draft, generate_from_image, generate_from_text, get_state, reuse, set_mode,
    start, submit_name, unlock, upload_image,
};
use crate::services::{GeminiClient, ImageProcessor, PromptGateway, SchemaGateway};

#[derive(Clone)]
pub struct AppState {
    session: SharedSession,
    gateway: Arc<dyn PromptGateway>,
    image_processor: Arc<ImageProcessor>,
    launch_delay: Duration,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting veo-prompter service...");

    let config = Config::from_env().context("invalid configuration")?;

    // Initialize services
    let backend = Arc::new(GeminiClient::new(
        config.api_key.clone(),
        config.model.clone(),
        config.api_base.clone(),
    ));
    let gateway: Arc<dyn PromptGateway> =
        Arc::new(SchemaGateway::new(backend, config.languages.clone()));
    let image_processor = Arc::new(ImageProcessor::new(config.max_image_dimension));

    let app_state = AppState {
        session: Session::new(config.unlock_secret.clone()).shared(),
        gateway,
        image_processor,
        launch_delay: config.launch_delay,
    };

    info!(
        "Using model {} ({} -> {})",
        config.model, config.languages.narrative, config.languages.translation
    );
    info!("Starting HTTP server on {}", config.bind_addr);

    let static_dir = config.static_dir.clone();

    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(configure)
            .route("/health", web::get().to(health_check));
        if let Some(dir) = &static_dir {
            app = app.service(Files::new("/", dir.clone()).index_file("index.html"));
        }
        app
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("failed to bind {}", config.bind_addr))?
    .run()
    .await
    .context("HTTP server failed")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/state", web::get().to(get_state))
            .route("/start", web::post().to(start))
            .route("/name", web::post().to(submit_name))
            .route("/mode", web::post().to(set_mode))
            .route("/image", web::post().to(upload_image))
            .route("/image/generate", web::post().to(generate_from_image))
            .route("/draft", web::patch().to(edit_draft))
            .route("/draft/generate", web::post().to(generate_from_text))
            .route("/result", web::patch().to(amend_result))
            .route("/unlock", web::post().to(unlock))
            .route("/reuse", web::post().to(reuse)),
    );
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "veo-prompter",
        "version": "0.1.0"
    }))
}
