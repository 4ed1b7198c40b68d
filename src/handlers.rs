// src/handlers.rs
use crate::errors::{AppError, MISSING_IMAGE_MESSAGE};
use crate::flow::session::run_cycle;
use crate::flow::{LoadedImage, Mode};
use crate::models::PromptField;
use crate::AppState;
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use bytes::Bytes;
use futures_util::TryStreamExt;
use log::info;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: Mode,
}

#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    pub field: PromptField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub passphrase: String,
}

pub async fn get_state(data: web::Data<AppState>) -> HttpResponse {
    let session = data.session.lock().await;
    HttpResponse::Ok().json(session.snapshot())
}

pub async fn start(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let mut session = data.session.lock().await;
    session.get_started()?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

/// Accepts the name, holds the launch for the configured delay, then
/// enters the generator. The launch completes even if the client goes away.
pub async fn submit_name(
    body: web::Json<NameRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let name = data.session.lock().await.submit_name(&body.name)?;
    info!("Launching generator for {}", name);

    let session = data.session.clone();
    let delay = data.launch_delay;
    let snapshot = detached(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let mut session = session.lock().await;
        session.finish_launch()?;
        Ok::<_, AppError>(session.snapshot())
    })
    .await?;

    Ok(HttpResponse::Ok().json(snapshot))
}

pub async fn set_mode(
    body: web::Json<ModeRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mut session = data.session.lock().await;
    session.set_mode(body.mode)?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

pub async fn upload_image(
    mut payload: Multipart,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(mut field) = payload.try_next().await? {
        let filename = field
            .content_disposition()
            .get_filename()
            .map(|name| name.to_string());

        // Collect image data
        let mut image_data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            image_data.extend_from_slice(&chunk);
        }

        match filename {
            Some(filename) if upload.is_none() => upload = Some((filename, image_data)),
            _ => {}
        }
    }

    let (filename, image_data) = upload.ok_or(AppError::InputMissing(MISSING_IMAGE_MESSAGE))?;

    let info = data.image_processor.validate_image(&image_data)?;
    let (processed, mime_type) = data.image_processor.resize_if_needed(&image_data, &info)?;
    let image = LoadedImage::new(filename, mime_type, Bytes::from(processed));

    let mut session = data.session.lock().await;
    session.load_image(image)?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

pub async fn generate_from_image(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let (image, mime_type) = data.session.lock().await.begin_image_generation()?;

    let session = data.session.clone();
    let gateway = data.gateway.clone();
    let snapshot = detached(async move {
        let result = gateway.generate_from_image(image, mime_type).await;

        let mut guard = session.lock().await;
        let ticket = guard.finish_image_generation(result)?;
        let snapshot = guard.snapshot();
        drop(guard);

        actix_web::rt::spawn(run_cycle(session, gateway, ticket));
        Ok::<_, AppError>(snapshot)
    })
    .await?;

    Ok(HttpResponse::Ok().json(snapshot))
}

pub async fn edit_draft(
    body: web::Json<FieldEdit>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let FieldEdit { field, value } = body.into_inner();
    let mut session = data.session.lock().await;
    session.edit_draft(field, value)?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

pub async fn generate_from_text(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let draft = data.session.lock().await.begin_text_generation()?;

    let session = data.session.clone();
    let gateway = data.gateway.clone();
    let snapshot = detached(async move {
        let result = gateway.generate_from_text(&draft).await;

        let mut guard = session.lock().await;
        let ticket = guard.finish_text_generation(result)?;
        let snapshot = guard.snapshot();
        drop(guard);

        actix_web::rt::spawn(run_cycle(session, gateway, ticket));
        Ok::<_, AppError>(snapshot)
    })
    .await?;

    Ok(HttpResponse::Ok().json(snapshot))
}

pub async fn amend_result(
    body: web::Json<FieldEdit>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let FieldEdit { field, value } = body.into_inner();
    let mut session = data.session.lock().await;
    session.amend_result(field, value)?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

pub async fn unlock(
    body: web::Json<UnlockRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let mut session = data.session.lock().await;
    session.submit_unlock(&body.passphrase)?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

pub async fn reuse(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let mut session = data.session.lock().await;
    session.request_reuse()?;
    Ok(HttpResponse::Ok().json(session.snapshot()))
}

/// Spawns `work` right away and waits for it. Session state set before the
/// call is always settled by `work`, even when the request future is dropped.
fn detached<T, F>(work: F) -> impl Future<Output = Result<T, AppError>>
where
    F: Future<Output = Result<T, AppError>> + 'static,
    T: 'static,
{
    let handle = actix_web::rt::spawn(work);
    async move {
        handle
            .await
            .map_err(|e| AppError::Internal(format!("background task failed: {}", e)))?
    }
}
