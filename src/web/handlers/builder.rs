//! Builder pages: the creation form, its preview and the result page.

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::domain::draft::{LinkDraft, Panel};
use crate::domain::entities::LockedLink;
use crate::error::AppError;
use crate::infrastructure::image_host::ImageUpload;
use crate::state::AppState;
use crate::utils::multipart::{image_from_field, multipart_error};
use crate::web::views::{BuilderTemplate, CreatedTemplate, PreviewTemplate};

/// Multipart part carrying an uploaded thumbnail.
const THUMBNAIL_FILE_FIELD: &str = "thumbnail_file";

/// A builder submission replayed into a draft.
struct SubmittedForm {
    draft: LinkDraft,
    thumbnail: Option<ImageUpload>,
    /// First problem found while reading the form. Later fields are still
    /// applied so the re-rendered form keeps the creator's input.
    error: Option<AppError>,
}

async fn read_form(mut multipart: Multipart, accept_file: bool) -> SubmittedForm {
    let mut form = SubmittedForm {
        draft: LinkDraft::new(),
        thumbnail: None,
        error: None,
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                form.error.get_or_insert(multipart_error(e));
                break;
            }
        };

        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == THUMBNAIL_FILE_FIELD {
            if !accept_file {
                continue;
            }
            match image_from_field(field).await {
                // Browsers send an empty part when no file was chosen.
                Ok(image) if image.bytes.is_empty() => {}
                Ok(image) => form.thumbnail = Some(image),
                Err(e) => {
                    form.error.get_or_insert(e);
                    break;
                }
            }
            continue;
        }

        let value = match field.text().await {
            Ok(value) => value,
            Err(e) => {
                form.error.get_or_insert(multipart_error(e));
                break;
            }
        };

        if let Err(e) = form.draft.apply_field(&name, &value) {
            form.error.get_or_insert(e);
        }
    }

    form
}

fn builder_error(draft: &LinkDraft, uploads_enabled: bool, e: AppError) -> Response {
    let status = e.status_code();
    if status.is_server_error() {
        error!(code = e.code(), details = %e.details(), "{}", e);
    } else {
        debug!(code = e.code(), details = %e.details(), "Builder form rejected");
    }

    (status, BuilderTemplate::new(draft, uploads_enabled, Some(e.to_string()))).into_response()
}

/// Renders an empty builder form.
///
/// # Endpoint
///
/// `GET /`
pub async fn builder_page_handler(State(state): State<AppState>) -> BuilderTemplate {
    BuilderTemplate::new(&LinkDraft::new(), state.thumbnail_service.is_enabled(), None)
}

/// Creates a locked link from the builder form.
///
/// # Endpoint
///
/// `POST /` (`multipart/form-data`)
///
/// Fields are applied to a [`LinkDraft`] in document order. A non-empty
/// `thumbnail_file` part is uploaded to the image host and becomes the
/// thumbnail.
///
/// # Response
///
/// The created page with the share URL, or the builder again with the
/// error message and the status of the error (400 for invalid input).
pub async fn create_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    let uploads_enabled = state.thumbnail_service.is_enabled();
    let SubmittedForm {
        mut draft,
        thumbnail,
        error,
    } = read_form(multipart, uploads_enabled).await;

    match create_from_form(&state, &mut draft, thumbnail, error).await {
        Ok(link) => CreatedTemplate {
            url: state.link_service.public_url(&link.key),
            protected: link.has_password(),
            key: link.key,
        }
        .into_response(),
        Err(e) => builder_error(&draft, uploads_enabled, e),
    }
}

async fn create_from_form(
    state: &AppState,
    draft: &mut LinkDraft,
    thumbnail: Option<ImageUpload>,
    error: Option<AppError>,
) -> Result<LockedLink, AppError> {
    if let Some(e) = error {
        return Err(e);
    }

    if let Some(image) = thumbnail {
        let url = state.thumbnail_service.upload(image).await?;
        if !draft.is_active(Panel::Advanced) {
            draft.toggle_platform(Panel::Advanced);
        }
        draft.apply_field("advanced.thumb", &url)?;
    }

    let request = draft.clone().into_request()?;
    state.link_service.create(request).await
}

/// Renders what visitors would see, without saving anything.
///
/// # Endpoint
///
/// `POST /preview` (`multipart/form-data`, same fields as `POST /`)
///
/// Thumbnail files are not uploaded for previews.
pub async fn preview_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = read_form(multipart, false).await;

    match form.error {
        Some(e) => builder_error(&form.draft, state.thumbnail_service.is_enabled(), e),
        None => PreviewTemplate {
            preview: form.draft.preview(),
        }
        .into_response(),
    }
}
