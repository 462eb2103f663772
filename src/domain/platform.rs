//! Catalogue of supported social platforms and the actions a creator can
//! require on each of them.
//!
//! The catalogue is static: every action has a short key stored in the
//! locked-link record (`subs`, `flw`, ...), a button label shown to visitors
//! and an input kind that decides how the creator's input is turned into the
//! URL the visitor is sent to.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;

use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@?[A-Za-z0-9._]{1,64}$").expect("valid username regex"));

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{4,24}$").expect("valid phone regex"));

/// A social platform a locked link can require actions on.
///
/// Variants are declared in display order; [`Platform::ALL`] and the derived
/// `Ord` both follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    YouTube,
    WhatsApp,
    Telegram,
    TikTok,
    Website,
    Instagram,
    Facebook,
}

/// How a creator's input for an action is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Absolute http(s) URL.
    Url,
    /// Account handle or profile URL.
    Username,
    /// Phone number for a direct chat link.
    PhoneNumber,
}

/// Static description of one action on a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    /// Key stored in the record, e.g. `subs`.
    pub key: &'static str,
    /// Option name shown in the builder, e.g. `Subscribe`.
    pub option: &'static str,
    /// Label on the visitor's button, e.g. `Subscribe Channel`.
    pub label: &'static str,
    pub placeholder: &'static str,
    pub input: InputKind,
}

const fn action(
    key: &'static str,
    option: &'static str,
    label: &'static str,
    placeholder: &'static str,
    input: InputKind,
) -> ActionSpec {
    ActionSpec {
        key,
        option,
        label,
        placeholder,
        input,
    }
}

const YOUTUBE_ACTIONS: &[ActionSpec] = &[
    action("subs", "Subscribe", "Subscribe Channel", "Enter YouTube Channel URL", InputKind::Url),
    action("like", "Like", "Like Video", "Enter YouTube Video URL", InputKind::Url),
    action("comm", "Comment", "Comment Video", "Enter YouTube Video URL", InputKind::Url),
];

const WHATSAPP_ACTIONS: &[ActionSpec] = &[
    action("msg", "Message", "Send Message", "Enter Phone Number", InputKind::PhoneNumber),
    action("grp", "Group Invite", "Join Group", "Enter Group Invite Link", InputKind::Url),
];

const TELEGRAM_ACTIONS: &[ActionSpec] = &[
    action("chan", "Join Channel", "Join Channel", "Enter Telegram Channel Link", InputKind::Url),
    action("msg", "Message", "Send Message", "Enter Telegram Username", InputKind::Username),
];

const TIKTOK_ACTIONS: &[ActionSpec] = &[
    action("flw", "Follow", "Follow Account", "Enter TikTok Username", InputKind::Username),
    action("like", "Like Video", "Like Video", "Enter TikTok Video URL", InputKind::Url),
];

const WEBSITE_ACTIONS: &[ActionSpec] = &[action(
    "visit",
    "Visit",
    "Visit Website",
    "Enter Website URL",
    InputKind::Url,
)];

const INSTAGRAM_ACTIONS: &[ActionSpec] = &[
    action("flw", "Follow", "Follow Account", "Enter Instagram Username", InputKind::Username),
    action("like", "Like Post", "Like Post", "Enter Instagram Post URL", InputKind::Url),
];

const FACEBOOK_ACTIONS: &[ActionSpec] = &[
    action("like", "Like Page", "Like Page", "Enter Facebook Page URL", InputKind::Url),
    action("grp", "Join Group", "Join Group", "Enter Facebook Group URL", InputKind::Url),
];

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::YouTube,
        Platform::WhatsApp,
        Platform::Telegram,
        Platform::TikTok,
        Platform::Website,
        Platform::Instagram,
        Platform::Facebook,
    ];

    /// Display name, also the name used in the JSON API.
    pub fn name(self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::WhatsApp => "WhatsApp",
            Platform::Telegram => "Telegram",
            Platform::TikTok => "TikTok",
            Platform::Website => "Website",
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
        }
    }

    /// Lowercase name used in form field names and CSS classes.
    pub fn slug(self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::WhatsApp => "whatsapp",
            Platform::Telegram => "telegram",
            Platform::TikTok => "tiktok",
            Platform::Website => "website",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
        }
    }

    pub fn actions(self) -> &'static [ActionSpec] {
        match self {
            Platform::YouTube => YOUTUBE_ACTIONS,
            Platform::WhatsApp => WHATSAPP_ACTIONS,
            Platform::Telegram => TELEGRAM_ACTIONS,
            Platform::TikTok => TIKTOK_ACTIONS,
            Platform::Website => WEBSITE_ACTIONS,
            Platform::Instagram => INSTAGRAM_ACTIONS,
            Platform::Facebook => FACEBOOK_ACTIONS,
        }
    }

    /// Looks up an action by key. Trailing digits are ignored so that
    /// repeated actions (`subs2`, `subs3`) share the base action.
    pub fn action_spec(self, action: &str) -> Option<&'static ActionSpec> {
        let base = base_action(action);
        self.actions().iter().find(|spec| spec.key == base)
    }

    /// Looks up an action by its builder option name (`Group Invite`).
    pub fn action_by_option(self, option: &str) -> Option<&'static ActionSpec> {
        self.actions().iter().find(|spec| spec.option == option)
    }

    /// Button label for an action, falling back to `"{Platform} - {action}"`.
    pub fn button_label(self, action: &str) -> String {
        match self.action_spec(action) {
            Some(spec) => spec.label.to_string(),
            None => format!("{} - {}", self.name(), action),
        }
    }

    /// Turns the creator's input for `action` into the URL visitors are sent to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when the action is unknown, the input
    /// is empty, or it does not match the action's input kind.
    pub fn resolve_target(self, action: &str, input: &str) -> Result<String, AppError> {
        let spec = self.action_spec(action).ok_or_else(|| {
            AppError::bad_request(
                format!("Unknown {} action", self.name()),
                json!({ "platform": self.name(), "action": action }),
            )
        })?;

        if !is_valid_action_key(action) {
            return Err(AppError::bad_request(
                "Action key must be a known action optionally followed by digits",
                json!({ "platform": self.name(), "action": action }),
            ));
        }

        let input = input.trim();
        if input.is_empty() {
            return Err(AppError::bad_request(
                format!("{} requires a value", spec.label),
                json!({ "platform": self.name(), "action": action }),
            ));
        }

        let invalid = |reason: &str| {
            AppError::bad_request(
                format!("Invalid value for {}", spec.label),
                json!({ "platform": self.name(), "action": action, "reason": reason }),
            )
        };

        match spec.input {
            InputKind::Url => normalize_url(input).map_err(|e| invalid(&e.to_string())),
            InputKind::Username => {
                if looks_like_url(input) {
                    return normalize_url(input).map_err(|e| invalid(&e.to_string()));
                }
                if !USERNAME_REGEX.is_match(input) {
                    return Err(invalid("expected a username or profile URL"));
                }
                let handle = input.trim_start_matches('@');
                Ok(self.profile_url(handle))
            }
            InputKind::PhoneNumber => {
                if looks_like_url(input) {
                    return normalize_url(input).map_err(|e| invalid(&e.to_string()));
                }
                if !PHONE_REGEX.is_match(input) {
                    return Err(invalid("expected a phone number"));
                }
                let digits: String = input.chars().filter(char::is_ascii_digit).collect();
                if digits.len() < 6 || digits.len() > 20 {
                    return Err(invalid("phone number must have 6 to 20 digits"));
                }
                Ok(format!("https://wa.me/{digits}"))
            }
        }
    }

    fn profile_url(self, handle: &str) -> String {
        match self {
            Platform::Telegram => format!("https://t.me/{handle}"),
            Platform::TikTok => format!("https://www.tiktok.com/@{handle}"),
            Platform::Instagram => format!("https://www.instagram.com/{handle}/"),
            Platform::YouTube => format!("https://www.youtube.com/@{handle}"),
            Platform::Facebook => format!("https://www.facebook.com/{handle}"),
            Platform::WhatsApp | Platform::Website => format!("https://{handle}"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = AppError;

    /// Accepts the display name (`YouTube`) or the slug (`youtube`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.name() == s || p.slug() == s.to_ascii_lowercase())
            .ok_or_else(|| AppError::bad_request("Unknown platform", json!({ "platform": s })))
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Strips trailing digits from an action key (`subs2` -> `subs`).
pub fn base_action(action: &str) -> &str {
    action.trim_end_matches(|c: char| c.is_ascii_digit())
}

fn is_valid_action_key(action: &str) -> bool {
    let base = base_action(action);
    !base.is_empty() && base.chars().all(|c| c.is_ascii_lowercase()) && action.len() <= 16
}

fn looks_like_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}
