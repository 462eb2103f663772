//! Locked-link entity and its value types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;

use crate::domain::platform::Platform;
use crate::error::AppError;

/// Thumbnail value that stands for "show a generic placeholder image".
pub const THUMBNAIL_PLACEHOLDER: &str = "thumbnail_placeholder";

/// Image shown for [`THUMBNAIL_PLACEHOLDER`].
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300x200";

/// Number of target slots (`tlink1`..`tlink4`).
pub const MAX_TARGET_SLOTS: u8 = 4;

/// Position of a target link, `tlink1` being the primary destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetSlot(u8);

impl TargetSlot {
    pub const PRIMARY: TargetSlot = TargetSlot(1);

    pub fn new(number: u8) -> Option<Self> {
        (1..=MAX_TARGET_SLOTS)
            .contains(&number)
            .then_some(TargetSlot(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Field name used in forms and JSON, e.g. `tlink2`.
    pub fn field_name(self) -> String {
        format!("tlink{}", self.0)
    }

    pub fn all() -> impl Iterator<Item = TargetSlot> {
        (1..=MAX_TARGET_SLOTS).map(TargetSlot)
    }
}

impl fmt::Display for TargetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tlink{}", self.0)
    }
}

impl FromStr for TargetSlot {
    type Err = AppError;

    /// Accepts `tlink3` or a bare slot number `3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("tlink")
            .unwrap_or(s)
            .parse::<u8>()
            .ok()
            .and_then(TargetSlot::new)
            .ok_or_else(|| AppError::bad_request("Unknown target link slot", json!({ "slot": s })))
    }
}

impl Serialize for TargetSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TargetSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Visual style of the visitor's buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    #[default]
    Pill,
    Rounded,
    Square,
}

impl ButtonStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonStyle::Pill => "pill",
            ButtonStyle::Rounded => "rounded",
            ButtonStyle::Square => "square",
        }
    }
}

impl FromStr for ButtonStyle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pill" => Ok(ButtonStyle::Pill),
            "rounded" => Ok(ButtonStyle::Rounded),
            "square" => Ok(ButtonStyle::Square),
            other => Err(AppError::bad_request(
                "Button style must be pill, rounded or square",
                json!({ "button_style": other }),
            )),
        }
    }
}

/// Theme colour as a lowercase `#rrggbb` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThemeColor(String);

impl ThemeColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ThemeColor {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        let valid = trimmed.len() == 7
            && trimmed.starts_with('#')
            && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());
        if valid {
            Ok(ThemeColor(trimmed.to_ascii_lowercase()))
        } else {
            Err(AppError::bad_request(
                "Theme color must look like #7c3aed",
                json!({ "theme_color": value }),
            ))
        }
    }
}

impl From<ThemeColor> for String {
    fn from(color: ThemeColor) -> Self {
        color.0
    }
}

/// One social action a visitor must complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialAction {
    pub platform: Platform,
    /// Action key, optionally numbered (`subs`, `subs2`).
    pub action: String,
    /// Resolved URL the visitor is sent to.
    pub target: String,
}

impl SocialAction {
    pub fn label(&self) -> String {
        self.platform.button_label(&self.action)
    }
}

/// Optional settings attached to a locked link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceOption {
    /// Keyed hash of `key:password`, never the password itself.
    pub password_hash: Option<String>,
    pub note: Option<String>,
    /// Last day before the link expires; the link is expired on this date.
    pub expires_on: Option<NaiveDate>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub button_style: ButtonStyle,
    pub theme_color: Option<ThemeColor>,
}

/// A stored locked link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedLink {
    pub id: i64,
    pub key: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub button_name: Option<String>,
    pub actions: Vec<SocialAction>,
    pub targets: BTreeMap<TargetSlot, String>,
    pub advanced: AdvanceOption,
    pub created_at: DateTime<Utc>,
}

impl LockedLink {
    /// Title shown to visitors.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Link Page")
    }

    pub fn has_password(&self) -> bool {
        self.advanced.password_hash.is_some()
    }

    /// Returns true if `today` is on or after the expiration date.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.advanced.expires_on.is_some_and(|exp| today >= exp)
    }

    /// The `tlink1` destination.
    pub fn primary_target(&self) -> Option<&str> {
        self.target(TargetSlot::PRIMARY)
    }

    pub fn target(&self, slot: TargetSlot) -> Option<&str> {
        self.targets.get(&slot).map(String::as_str)
    }

    /// Image URL for the thumbnail, resolving the placeholder sentinel.
    pub fn thumbnail_src(&self) -> Option<&str> {
        self.advanced.thumbnail.as_deref().map(|thumb| {
            if thumb == THUMBNAIL_PLACEHOLDER {
                PLACEHOLDER_IMAGE_URL
            } else {
                thumb
            }
        })
    }

    /// Label shared by every target button: the custom button name or
    /// "Get Link".
    pub fn target_label(&self) -> &str {
        target_label(self.button_name.as_deref())
    }
}

pub(crate) fn target_label(button_name: Option<&str>) -> &str {
    button_name.unwrap_or("Get Link")
}

/// Validated input for creating a locked link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLockedLink {
    pub key: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub button_name: Option<String>,
    pub actions: Vec<SocialAction>,
    pub targets: BTreeMap<TargetSlot, String>,
    pub advanced: AdvanceOption,
}
