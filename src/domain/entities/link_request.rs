//! Unvalidated request to create a locked link.
//!
//! Both the JSON API and the builder form produce a [`LinkRequest`];
//! [`LinkRequest::into_new_link`] is the single place where creator input
//! is checked and turned into a storable [`NewLockedLink`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::json;

use super::locked_link::{
    AdvanceOption, ButtonStyle, NewLockedLink, SocialAction, THUMBNAIL_PLACEHOLDER, TargetSlot,
    ThemeColor,
};
use crate::domain::platform::Platform;
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

pub const MAX_TITLE_CHARS: usize = 120;
pub const MAX_SUBTITLE_CHARS: usize = 240;
pub const MAX_BUTTON_NAME_CHARS: usize = 40;
pub const MAX_NOTE_CHARS: usize = 500;
pub const MAX_PASSWORD_CHARS: usize = 128;
pub const MAX_ACTIONS: usize = 20;

/// Creator input for one social action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInput {
    pub platform: Platform,
    pub action: String,
    /// URL, username or phone number depending on the action.
    pub value: String,
}

/// Creator input for the Advance Option panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceInput {
    pub password: Option<String>,
    pub note: Option<String>,
    pub expires_on: Option<NaiveDate>,
    pub thumbnail: Option<String>,
    pub button_style: Option<ButtonStyle>,
    pub theme_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub button_name: Option<String>,
    pub actions: Vec<ActionInput>,
    pub targets: BTreeMap<TargetSlot, String>,
    pub advanced: AdvanceInput,
}

impl LinkRequest {
    /// Validates the request and builds the record to store under `key`.
    ///
    /// Actions are grouped by platform in catalogue order, keeping the
    /// creator's order inside each platform. `hash_password` receives
    /// `(key, password)` and returns the stored hash.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when:
    /// - `tlink1` is missing, or any target is not an http(s) URL
    /// - an action value does not match its platform's input rules
    /// - the same action key appears twice on one platform
    /// - a text field is longer than its limit
    /// - the expiration date is today or earlier
    /// - the thumbnail or theme colour is malformed
    pub fn into_new_link<F>(
        self,
        key: String,
        today: NaiveDate,
        hash_password: F,
    ) -> Result<NewLockedLink, AppError>
    where
        F: FnOnce(&str, &str) -> String,
    {
        let title = clean_text("title", self.title, MAX_TITLE_CHARS)?;
        let subtitle = clean_text("subtitle", self.subtitle, MAX_SUBTITLE_CHARS)?;
        let button_name = clean_text("button_name", self.button_name, MAX_BUTTON_NAME_CHARS)?;

        if self.actions.len() > MAX_ACTIONS {
            return Err(AppError::bad_request(
                format!("A locked link can require at most {MAX_ACTIONS} actions"),
                json!({ "actions": self.actions.len() }),
            ));
        }

        let mut actions: Vec<SocialAction> = Vec::with_capacity(self.actions.len());
        for input in self.actions {
            let duplicate = actions
                .iter()
                .any(|a| a.platform == input.platform && a.action == input.action);
            if duplicate {
                return Err(AppError::bad_request(
                    "Duplicate action",
                    json!({ "platform": input.platform.name(), "action": input.action }),
                ));
            }

            let target = input.platform.resolve_target(&input.action, &input.value)?;
            actions.push(SocialAction {
                platform: input.platform,
                action: input.action,
                target,
            });
        }
        // Stable sort keeps the creator's order within a platform.
        actions.sort_by_key(|a| a.platform);

        if !self.targets.contains_key(&TargetSlot::PRIMARY) {
            return Err(AppError::bad_request(
                "Target link is required",
                json!({ "field": "tlink1" }),
            ));
        }

        let mut targets = BTreeMap::new();
        for (slot, url) in self.targets {
            let normalized = normalize_url(&url).map_err(|e| {
                AppError::bad_request(
                    "Invalid target link",
                    json!({ "field": slot.field_name(), "reason": e.to_string() }),
                )
            })?;
            targets.insert(slot, normalized);
        }

        let advanced = self.advanced;

        let password = advanced.password.filter(|p| !p.is_empty());
        if let Some(ref password) = password
            && password.chars().count() > MAX_PASSWORD_CHARS
        {
            return Err(AppError::bad_request(
                format!("Password must be at most {MAX_PASSWORD_CHARS} characters"),
                json!({ "field": "password" }),
            ));
        }

        if let Some(exp) = advanced.expires_on
            && exp <= today
        {
            return Err(AppError::bad_request(
                "Expiration date must be in the future",
                json!({ "expires_on": exp.to_string(), "today": today.to_string() }),
            ));
        }

        let thumbnail = match clean_text("thumbnail", advanced.thumbnail, usize::MAX)? {
            Some(thumb) if thumb == THUMBNAIL_PLACEHOLDER => Some(thumb),
            Some(thumb) => Some(normalize_url(&thumb).map_err(|e| {
                AppError::bad_request(
                    "Invalid thumbnail URL",
                    json!({ "reason": e.to_string() }),
                )
            })?),
            None => None,
        };

        let theme_color = clean_text("theme_color", advanced.theme_color, usize::MAX)?
            .map(ThemeColor::try_from)
            .transpose()?;

        let password_hash = password.map(|p| hash_password(&key, &p));

        Ok(NewLockedLink {
            key,
            title,
            subtitle,
            button_name,
            actions,
            targets,
            advanced: AdvanceOption {
                password_hash,
                note: clean_text("note", advanced.note, MAX_NOTE_CHARS)?,
                expires_on: advanced.expires_on,
                thumbnail,
                button_style: advanced.button_style.unwrap_or_default(),
                theme_color,
            },
        })
    }
}

/// Trims a text field, maps blank to `None` and enforces a length limit.
fn clean_text(
    field: &str,
    value: Option<String>,
    max_chars: usize,
) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::bad_request(
            format!("{field} must be at most {max_chars} characters"),
            json!({ "field": field }),
        ));
    }
    Ok(Some(trimmed.to_string()))
}
