pub mod page;

use crate::errors::{LithoError, Result};
use crate::pipeline::HeightmapJob;
use crate::settings::Settings;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const UPLOAD_FIELD: &str = "image";
pub const HEIGHTMAP_FILENAME: &str = "lithocolor_heightmap.png";
pub const HISTOGRAM_FILENAME: &str = "lithocolor_histogram.png";

#[derive(Clone)]
pub struct AppState {
    settings: Arc<Settings>,
}

type Upload = std::result::Result<Multipart, MultipartRejection>;

pub fn router(settings: Settings) -> Router {
    let body_limit = settings.max_upload_bytes;
    let state = AppState {
        settings: Arc::new(settings),
    };

    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/download/heightmap", post(download_heightmap))
        .route("/download/histogram", post(download_histogram))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until ctrl-c.
pub async fn serve(settings: Settings) -> Result<()> {
    let addr = settings.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(settings))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn index() -> Html<String> {
    Html(page::render(None))
}

async fn generate(State(state): State<AppState>, upload: Upload) -> Result<Html<String>> {
    let bytes = read_upload(upload, &state.settings).await?;
    let settings = state.settings.clone();
    let images = run_blocking(move || {
        HeightmapJob::from_upload(&bytes, &settings)?.page_images(&settings.chart)
    })
    .await?;
    Ok(Html(page::render(Some(&images))))
}

async fn download_heightmap(State(state): State<AppState>, upload: Upload) -> Result<Response> {
    let bytes = read_upload(upload, &state.settings).await?;
    let settings = state.settings.clone();
    let png = run_blocking(move || HeightmapJob::from_upload(&bytes, &settings)?.heightmap_png()).await?;
    Ok(png_attachment(png, HEIGHTMAP_FILENAME))
}

async fn download_histogram(State(state): State<AppState>, upload: Upload) -> Result<Response> {
    let bytes = read_upload(upload, &state.settings).await?;
    let settings = state.settings.clone();
    let png = run_blocking(move || {
        HeightmapJob::from_upload(&bytes, &settings)?.histogram_png(&settings.chart)
    })
    .await?;
    Ok(png_attachment(png, HISTOGRAM_FILENAME))
}

/// Pulls the bytes of the `image` field out of the form.
///
/// A body that is not multipart at all is treated like a form without the field.
async fn read_upload(upload: Upload, settings: &Settings) -> Result<Bytes> {
    let mut multipart = match upload {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(%rejection, "request body is not multipart");
            return Err(LithoError::MissingUpload);
        }
    };

    let limit = settings.max_upload_bytes;
    let to_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            LithoError::UploadTooLarge { limit }
        } else {
            LithoError::MalformedUpload {
                message: e.body_text(),
            }
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(to_error)? {
        // Parts without a filename are plain form values, not files
        if field.name() == Some(UPLOAD_FIELD) && field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_owned);
            let bytes = field.bytes().await.map_err(to_error)?;
            tracing::debug!(file_name = ?file_name, size = bytes.len(), "received upload");
            return Ok(bytes);
        }
    }
    Err(LithoError::MissingUpload)
}

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| LithoError::TaskFailed {
            message: e.to_string(),
        })?
}

fn png_attachment(png: Vec<u8>, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        png,
    )
        .into_response()
}
