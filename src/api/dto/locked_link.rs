//! DTOs for the locked-link endpoints.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::{NoneAsEmptyString, serde_as};
use validator::Validate;

use crate::domain::entities::link_request::{
    MAX_BUTTON_NAME_CHARS, MAX_NOTE_CHARS, MAX_SUBTITLE_CHARS, MAX_TITLE_CHARS,
};
use crate::domain::entities::{
    ActionInput, AdvanceInput, ButtonStyle, LinkRequest, LockedLink, SocialAction, TargetSlot,
};
use crate::error::AppError;

// `validator` length bounds are u64.
const TITLE_MAX: u64 = MAX_TITLE_CHARS as u64;
const SUBTITLE_MAX: u64 = MAX_SUBTITLE_CHARS as u64;
const BUTTON_NAME_MAX: u64 = MAX_BUTTON_NAME_CHARS as u64;
const NOTE_MAX: u64 = MAX_NOTE_CHARS as u64;

/// Request body for `POST /api/links`.
///
/// Empty strings are accepted anywhere an optional value is expected and
/// mean "not set".
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(max = TITLE_MAX))]
    pub title: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(max = SUBTITLE_MAX))]
    pub subtitle: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(max = BUTTON_NAME_MAX))]
    pub button_name: Option<String>,

    /// Count is capped by `LinkRequest::into_new_link`.
    #[serde(default)]
    #[validate(nested)]
    pub actions: Vec<ActionItem>,

    /// `tlink1`..`tlink4` to URL; `tlink1` is required.
    pub target_links: BTreeMap<String, String>,

    #[serde(default)]
    #[validate(nested)]
    pub advanced: AdvancedItem,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ActionItem {
    /// Platform display name or slug (`YouTube`, `youtube`).
    #[validate(length(min = 1))]
    pub platform: String,

    /// Action key such as `subs`, optionally numbered (`subs2`).
    #[validate(length(min = 1, max = 16))]
    pub action: String,

    /// URL, username or phone number, depending on the action.
    #[validate(length(min = 1, max = 2048))]
    pub target: String,
}

#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AdvancedItem {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub password: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(max = NOTE_MAX))]
    pub note: Option<String>,

    /// `YYYY-MM-DD`; the link stops working on this day.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub button_style: Option<ButtonStyle>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub theme_color: Option<String>,
}

impl TryFrom<CreateLinkRequest> for LinkRequest {
    type Error = AppError;

    fn try_from(body: CreateLinkRequest) -> Result<Self, Self::Error> {
        let actions = body
            .actions
            .into_iter()
            .map(|item| {
                Ok(ActionInput {
                    platform: item.platform.parse()?,
                    action: item.action,
                    value: item.target,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let mut targets = BTreeMap::new();
        for (name, url) in body.target_links {
            if url.trim().is_empty() {
                continue;
            }
            let slot: TargetSlot = name.parse().map_err(|_| {
                AppError::bad_request(
                    "Unknown target link",
                    json!({ "target_links": name, "expected": "tlink1..tlink4" }),
                )
            })?;
            targets.insert(slot, url);
        }

        let advanced = body.advanced;
        Ok(LinkRequest {
            title: body.title,
            subtitle: body.subtitle,
            button_name: body.button_name,
            actions,
            targets,
            advanced: AdvanceInput {
                password: advanced.password,
                note: advanced.note,
                expires_on: advanced.expires_on,
                thumbnail: advanced.thumbnail,
                button_style: advanced.button_style,
                theme_color: advanced.theme_color,
            },
        })
    }
}

/// Response for `POST /api/links`.
#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    pub key: String,
    /// Page visitors open.
    pub url: String,
}

/// Response for `GET /api/links/{key}`. The password hash is never exposed.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub key: String,
    pub url: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub button_name: Option<String>,
    pub actions: Vec<SocialAction>,
    pub target_links: BTreeMap<TargetSlot, String>,
    pub advanced: AdvancedResponse,
    pub expired: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AdvancedResponse {
    pub has_password: bool,
    pub note: Option<String>,
    pub expires_on: Option<NaiveDate>,
    pub thumbnail: Option<String>,
    pub button_style: ButtonStyle,
    pub theme_color: Option<String>,
}

impl LinkResponse {
    pub fn new(link: LockedLink, url: String, today: NaiveDate) -> Self {
        let expired = link.is_expired_on(today);
        let has_password = link.has_password();
        let advanced = link.advanced;

        Self {
            key: link.key,
            url,
            title: link.title,
            subtitle: link.subtitle,
            button_name: link.button_name,
            actions: link.actions,
            target_links: link.targets,
            advanced: AdvancedResponse {
                has_password,
                note: advanced.note,
                expires_on: advanced.expires_on,
                thumbnail: advanced.thumbnail,
                button_style: advanced.button_style,
                theme_color: advanced.theme_color.map(String::from),
            },
            expired,
            created_at: link.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::platform::Platform;

    #[test]
    fn test_empty_strings_are_absent() {
        let body: CreateLinkRequest = serde_json::from_value(json!({
            "title": "",
            "subtitle": "Sub",
            "target_links": { "tlink1": "https://example.com/", "tlink2": "" },
            "advanced": { "password": "", "expires_on": "", "button_style": "" }
        }))
        .unwrap();

        assert!(body.title.is_none());
        assert_eq!(body.subtitle.as_deref(), Some("Sub"));
        assert!(body.advanced.password.is_none());
        assert!(body.advanced.expires_on.is_none());
        assert!(body.advanced.button_style.is_none());

        let request = LinkRequest::try_from(body).unwrap();
        assert_eq!(request.targets.len(), 1);
    }

    #[test]
    fn test_conversion_parses_platforms_and_dates() {
        let body: CreateLinkRequest = serde_json::from_value(json!({
            "actions": [
                { "platform": "YouTube", "action": "subs", "target": "https://youtube.com/@c" },
                { "platform": "tiktok", "action": "flw", "target": "@someone" }
            ],
            "target_links": { "tlink1": "https://example.com/" },
            "advanced": { "expires_on": "2030-12-31", "button_style": "square" }
        }))
        .unwrap();
        assert!(body.validate().is_ok());

        let request = LinkRequest::try_from(body).unwrap();
        assert_eq!(request.actions[0].platform, Platform::YouTube);
        assert_eq!(request.actions[1].platform, Platform::TikTok);
        assert_eq!(
            request.advanced.expires_on,
            NaiveDate::from_ymd_opt(2030, 12, 31)
        );
        assert_eq!(request.advanced.button_style, Some(ButtonStyle::Square));
    }

    #[test]
    fn test_unknown_platform_and_slot_rejected() {
        let body: CreateLinkRequest = serde_json::from_value(json!({
            "actions": [{ "platform": "MySpace", "action": "flw", "target": "x" }],
            "target_links": { "tlink1": "https://example.com/" }
        }))
        .unwrap();
        assert!(LinkRequest::try_from(body).is_err());

        let body: CreateLinkRequest = serde_json::from_value(json!({
            "target_links": { "tlink9": "https://example.com/" }
        }))
        .unwrap();
        assert!(LinkRequest::try_from(body).is_err());
    }

    #[test]
    fn test_validation_limits() {
        let body: CreateLinkRequest = serde_json::from_value(json!({
            "title": "x".repeat(MAX_TITLE_CHARS + 1),
            "target_links": { "tlink1": "https://example.com/" }
        }))
        .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_validation_reaches_nested_items() {
        let body: CreateLinkRequest = serde_json::from_value(json!({
            "actions": [{ "platform": "YouTube", "action": "subs", "target": "" }],
            "target_links": { "tlink1": "https://example.com/" }
        }))
        .unwrap();
        let errors = body.validate().unwrap_err();
        assert!(errors.errors().contains_key("actions"));

        let body: CreateLinkRequest = serde_json::from_value(json!({
            "target_links": { "tlink1": "https://example.com/" },
            "advanced": { "note": "n".repeat(MAX_NOTE_CHARS + 1) }
        }))
        .unwrap();
        let errors = body.validate().unwrap_err();
        assert!(errors.errors().contains_key("advanced"));

        let body: CreateLinkRequest = serde_json::from_value(json!({
            "button_name": "b".repeat(MAX_BUTTON_NAME_CHARS),
            "target_links": { "tlink1": "https://example.com/" }
        }))
        .unwrap();
        assert!(body.validate().is_ok());
    }
}
