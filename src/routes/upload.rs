use crate::config::Config;
use crate::flash;
use crate::routes::errors::ErrorResponse;
use crate::types::UploadedFile;
use crate::upload::{UploadError, UploadErrorType};
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use log::{debug, info};
use std::sync::Arc;

const SUCCESS_MESSAGE: &str = "Image uploaded successfully!";

/// Accept one multipart upload and forward it to the hosting provider
///
/// On success the caller is sent back to the referring page with the hosted
/// url attached as flash data
#[axum::debug_handler]
pub async fn handle_upload(
    State(state): State<Arc<Config>>,
    jar: CookieJar,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let file = match read_image_field(multipart).await {
        Ok(file) => file,
        Err(response) => return response,
    };

    let Some(file) = file else {
        debug!("Upload request without an image field");
        let err = UploadError::new(UploadErrorType::MissingFile, None);
        return validation_response(&err);
    };

    match state.uploader.upload(file).await {
        Ok(url) => {
            info!("Upload hosted at {}", url);
            let jar = flash::set(jar, SUCCESS_MESSAGE, url.as_str());
            (jar, Redirect::to(back_target(&headers))).into_response()
        }
        Err(err) if err.err_type.is_validation() => validation_response(&err),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::provider(&err)),
        )
            .into_response(),
    }
}

/// Walk the multipart body looking for the `image` field
async fn read_image_field(mut multipart: Multipart) -> Result<Option<UploadedFile>, Response> {
    let mut file = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                debug!("Unreadable multipart body: {}", err);
                return Err(bad_body_response(format!(
                    "Unable to read multipart body: {}",
                    err
                )));
            }
        };

        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(err) => {
                debug!("Unreadable image field: {}", err);
                return Err(bad_body_response(format!(
                    "Unable to read the image field: {}",
                    err
                )));
            }
        };

        file = Some(UploadedFile::new(
            filename.as_deref(),
            content_type.as_deref(),
            data.to_vec(),
        ));
    }

    Ok(file)
}

/// Redirect target after a successful upload, the referring page when known
fn back_target(headers: &HeaderMap) -> &str {
    headers
        .get(header::REFERER)
        .and_then(|referer| referer.to_str().ok())
        .unwrap_or("/upload")
}

fn validation_response(err: &UploadError) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse::validation(err)),
    )
        .into_response()
}

fn bad_body_response(detail: String) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse::bad_body(detail)),
    )
        .into_response()
}
