//! Visitor pages: the locked link, its password form and the target
//! interstitial.

use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::application::services::{ActionStart, Gate, GateView};
use crate::domain::entities::TargetSlot;
use crate::domain::unlock::VisitorTicket;
use crate::error::AppError;
use crate::state::AppState;
use crate::web::PageError;
use crate::web::ticket::{cookie_header, read_cookie};
use crate::web::views::{
    ExpiredTemplate, GetLinkTemplate, LinkHeader, PasswordTemplate, ViewerTemplate,
};

#[derive(Debug, Deserialize)]
pub struct UnlockForm {
    #[serde(default)]
    pub password: String,
}

fn ticket_for(state: &AppState, key: &str, headers: &HeaderMap) -> VisitorTicket {
    state
        .gate_service
        .read_ticket(key, read_cookie(headers).as_deref())
}

fn viewer_path(key: &str) -> String {
    format!("/{key}")
}

/// Redirects and stores the updated ticket in the visitor's cookie.
fn redirect_with_ticket(
    state: &AppState,
    key: &str,
    ticket: &VisitorTicket,
    location: &str,
) -> Result<Response, AppError> {
    let signed = state.gate_service.write_ticket(ticket)?;
    let secure = state.link_service.public_url(key).starts_with("https://");

    let mut response = Redirect::to(location).into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, cookie_header(key, &signed, secure)?);
    Ok(response)
}

fn render_gate(state: &AppState, view: GateView, password_error: Option<String>) -> Response {
    let header = LinkHeader::from(&view.link);

    match view.gate {
        Gate::Expired => (
            StatusCode::GONE,
            ExpiredTemplate {
                header,
                expires_on: view
                    .link
                    .advanced
                    .expires_on
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            },
        )
            .into_response(),
        Gate::PasswordRequired => {
            let status = if password_error.is_some() {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::OK
            };
            (
                status,
                PasswordTemplate {
                    header,
                    error: password_error,
                },
            )
                .into_response()
        }
        Gate::Open(progress) => {
            let idle_refresh = state.gate_service.action_delay().num_seconds().max(2);
            ViewerTemplate::new(&view.link, &progress, idle_refresh).into_response()
        }
    }
}

/// Shows a locked link to a visitor.
///
/// # Endpoint
///
/// `GET /{key}`
///
/// # Response Codes
///
/// - **200 OK**: Button list, or the password form
/// - **404 Not Found**: Unknown key
/// - **410 Gone**: The link has expired
pub async fn viewer_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let ticket = ticket_for(&state, &key, &headers);
    let view = state.gate_service.open(&key, &ticket, Utc::now()).await?;
    Ok(render_gate(&state, view, None))
}

/// Checks the link password.
///
/// # Endpoint
///
/// `POST /{key}/unlock` (urlencoded `password`)
///
/// On success the ticket is marked as verified and the visitor is sent
/// back to the link (303). A wrong password re-renders the form with
/// "Incorrect password" (401).
pub async fn unlock_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<UnlockForm>,
) -> Result<Response, PageError> {
    let mut ticket = ticket_for(&state, &key, &headers);
    let now = Utc::now();

    match state
        .gate_service
        .verify_password(&key, &mut ticket, &form.password, now)
        .await
    {
        Ok(_) => Ok(redirect_with_ticket(&state, &key, &ticket, &viewer_path(&key))?),
        Err(AppError::Unauthorized { message, .. }) => {
            let view = state.gate_service.open(&key, &ticket, now).await?;
            Ok(render_gate(&state, view, Some(message)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Starts a social action and sends the visitor to it.
///
/// # Endpoint
///
/// `POST /{key}/actions/{index}`
///
/// Redirects (303) to the action URL with the updated ticket. Buttons that
/// are not clickable yet, or a missing password, redirect back to the link.
pub async fn start_action_handler(
    Path((key, index)): Path<(String, usize)>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let mut ticket = ticket_for(&state, &key, &headers);

    match state
        .gate_service
        .start_action(&key, &mut ticket, index, Utc::now())
        .await
    {
        Ok(ActionStart::Started(url)) => Ok(redirect_with_ticket(&state, &key, &ticket, &url)?),
        Ok(ActionStart::Rejected(_)) | Err(AppError::Forbidden { .. }) => {
            Ok(Redirect::to(&viewer_path(&key)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Reveals a target link once every action is completed.
///
/// # Endpoint
///
/// `POST /{key}/targets/{slot}` (`slot` is `tlink1`..`tlink4`)
///
/// # Response Codes
///
/// - **200 OK**: "Your Target Link" page
/// - **403 Forbidden**: Password missing or actions not completed
/// - **404 Not Found**: Unknown key or unused slot
/// - **410 Gone**: The link has expired
pub async fn reveal_target_handler(
    Path((key, slot)): Path<(String, String)>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let slot: TargetSlot = slot.parse().map_err(|_| {
        AppError::not_found("Target link not found", json!({ "key": key, "slot": slot }))
    })?;
    let ticket = ticket_for(&state, &key, &headers);

    let (link, url) = state
        .gate_service
        .reveal_target(&key, &ticket, slot, Utc::now())
        .await?;

    Ok(GetLinkTemplate {
        label: link.target_label().to_string(),
        header: LinkHeader::from(&link),
        url,
    }
    .into_response())
}
