//! Builder form state.
//!
//! [`LinkDraft`] mirrors what a creator has filled in on the builder page:
//! the top-level fields, the panels they switched on (in the order they
//! switched them on) and, per panel, the options they picked and the value
//! typed into each one. The builder posts its fields in document order and
//! [`LinkDraft::from_fields`] replays them; [`LinkDraft::into_request`] then
//! turns the draft into a [`LinkRequest`].
//!
//! Form field names:
//!
//! | name                         | meaning                                   |
//! |------------------------------|-------------------------------------------|
//! | `title`, `subtitle`          | top-level text                            |
//! | `buttonName` / `button_name` | custom target button name                 |
//! | `tlink1`                     | primary target link                       |
//! | `panel`                      | switch a panel on (`youtube`, `target`, `advanced`, ...) |
//! | `youtube.subs`, `tiktok.flw` | value of a platform option                |
//! | `target.tlink2`              | extra target link                         |
//! | `advanced.pass`              | advance option (`pass`, `note`, `exp`, `thumb`, `style`, `color`) |

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;

use crate::domain::entities::locked_link::target_label;
use crate::domain::entities::{
    ActionInput, AdvanceInput, ButtonStyle, LinkRequest, PLACEHOLDER_IMAGE_URL,
    THUMBNAIL_PLACEHOLDER, TargetSlot,
};
use crate::domain::platform::Platform;
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

/// A builder panel that can be switched on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Social(Platform),
    TargetLinks,
    Advanced,
}

/// Options of the "Advance Option" panel: `(key, option name)`.
pub const ADVANCED_OPTIONS: &[(&str, &str)] = &[
    ("pass", "Password"),
    ("note", "Note"),
    ("exp", "Expired"),
    ("thumb", "Thumbnails"),
    ("style", "Button Style"),
    ("color", "Theme Color"),
];

impl Panel {
    /// Panels in the order the builder lists them.
    pub fn all() -> impl Iterator<Item = Panel> {
        Platform::ALL
            .into_iter()
            .map(Panel::Social)
            .chain([Panel::TargetLinks, Panel::Advanced])
    }

    pub fn name(self) -> &'static str {
        match self {
            Panel::Social(platform) => platform.name(),
            Panel::TargetLinks => "Target Link",
            Panel::Advanced => "Advance Option",
        }
    }

    /// Prefix of the panel's form fields.
    pub fn slug(self) -> &'static str {
        match self {
            Panel::Social(platform) => platform.slug(),
            Panel::TargetLinks => "target",
            Panel::Advanced => "advanced",
        }
    }

    /// Checks that `key` names an option of this panel.
    fn check_option(self, key: &str) -> Result<(), AppError> {
        let known = match self {
            Panel::Social(platform) => platform.action_spec(key).is_some(),
            Panel::TargetLinks => key
                .parse::<TargetSlot>()
                .is_ok_and(|slot| slot != TargetSlot::PRIMARY && key.starts_with("tlink")),
            Panel::Advanced => ADVANCED_OPTIONS.iter().any(|(k, _)| *k == key),
        };

        if known {
            Ok(())
        } else {
            Err(AppError::bad_request(
                format!("Unknown option for {}", self.name()),
                json!({ "panel": self.slug(), "option": key }),
            ))
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Panel {
    type Err = AppError;

    /// Accepts the panel slug (`youtube`, `target`) or its display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Panel::all()
            .find(|p| p.slug() == s || p.name() == s)
            .ok_or_else(|| AppError::bad_request("Unknown panel", json!({ "panel": s })))
    }
}

/// Top-level builder fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Subtitle,
    ButtonName,
    PrimaryTarget,
}

impl DraftField {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(DraftField::Title),
            "subtitle" => Some(DraftField::Subtitle),
            "buttonName" | "button_name" => Some(DraftField::ButtonName),
            "tlink1" => Some(DraftField::PrimaryTarget),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PanelState {
    panel: Panel,
    /// Option keys in the order they were added.
    options: Vec<String>,
    values: HashMap<String, String>,
}

impl PanelState {
    fn new(panel: Panel) -> Self {
        Self {
            panel,
            options: Vec::new(),
            values: HashMap::new(),
        }
    }

    /// Non-empty values in option order.
    fn filled(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().filter_map(|key| {
            self.values
                .get(key)
                .map(String::as_str)
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key.as_str(), v))
        })
    }
}

/// State of the builder form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDraft {
    pub title: String,
    pub subtitle: String,
    pub button_name: String,
    pub primary_target: String,
    /// Active panels in activation order.
    panels: Vec<PanelState>,
}

impl LinkDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a draft by applying form fields in order.
    ///
    /// # Errors
    ///
    /// Fails on the first field [`LinkDraft::apply_field`] rejects.
    pub fn from_fields<I, K, V>(fields: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut draft = Self::new();
        for (name, value) in fields {
            draft.apply_field(name.as_ref(), value.as_ref())?;
        }
        Ok(draft)
    }

    /// Switches a panel on or off and returns whether it is now active.
    ///
    /// Switching a panel off forgets its options and values.
    pub fn toggle_platform(&mut self, panel: Panel) -> bool {
        if let Some(pos) = self.panels.iter().position(|p| p.panel == panel) {
            self.panels.remove(pos);
            false
        } else {
            self.panels.push(PanelState::new(panel));
            true
        }
    }

    pub fn is_active(&self, panel: Panel) -> bool {
        self.panels.iter().any(|p| p.panel == panel)
    }

    /// Active panels in activation order.
    pub fn active_panels(&self) -> impl Iterator<Item = Panel> + '_ {
        self.panels.iter().map(|p| p.panel)
    }

    /// Selected option keys of an active panel.
    pub fn options(&self, panel: Panel) -> &[String] {
        self.panel_state(panel)
            .map(|p| p.options.as_slice())
            .unwrap_or(&[])
    }

    pub fn input(&self, panel: Panel, key: &str) -> Option<&str> {
        self.panel_state(panel)
            .and_then(|p| p.values.get(key))
            .map(String::as_str)
    }

    /// Adds an option to an active panel. Adding an option twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when the panel is not active or the
    /// option does not belong to it.
    pub fn add_option(&mut self, panel: Panel, key: &str) -> Result<(), AppError> {
        panel.check_option(key)?;
        let state = self.panel_state_mut(panel)?;
        if !state.options.iter().any(|o| o == key) {
            state.options.push(key.to_string());
        }
        Ok(())
    }

    /// Removes an option and the value entered for it.
    pub fn remove_option(&mut self, panel: Panel, key: &str) {
        if let Some(state) = self.panels.iter_mut().find(|p| p.panel == panel) {
            state.options.retain(|o| o != key);
            state.values.remove(key);
        }
    }

    /// Sets the value of a selected option.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when the option is not selected.
    pub fn set_input(&mut self, panel: Panel, key: &str, value: &str) -> Result<(), AppError> {
        let state = self.panel_state_mut(panel)?;
        if !state.options.iter().any(|o| o == key) {
            return Err(AppError::bad_request(
                "Option is not selected",
                json!({ "panel": panel.slug(), "option": key }),
            ));
        }
        state.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn set_field(&mut self, field: DraftField, value: &str) {
        let slot = match field {
            DraftField::Title => &mut self.title,
            DraftField::Subtitle => &mut self.subtitle,
            DraftField::ButtonName => &mut self.button_name,
            DraftField::PrimaryTarget => &mut self.primary_target,
        };
        *slot = value.to_string();
    }

    /// Applies one submitted form field.
    ///
    /// A `panel` field switches the named panel on. A `panel.option` field
    /// with a non-blank value switches its panel on, selects the option and
    /// stores the value. Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for unknown field names, panels or
    /// options.
    pub fn apply_field(&mut self, name: &str, value: &str) -> Result<(), AppError> {
        if let Some(field) = DraftField::from_name(name) {
            self.set_field(field, value);
            return Ok(());
        }

        if name == "panel" {
            let panel: Panel = value.parse()?;
            if !self.is_active(panel) {
                self.toggle_platform(panel);
            }
            return Ok(());
        }

        let Some((prefix, key)) = name.split_once('.') else {
            return Err(unknown_field(name));
        };
        let panel: Panel = prefix.parse().map_err(|_| unknown_field(name))?;
        panel.check_option(key)?;

        if value.trim().is_empty() {
            return Ok(());
        }
        if !self.is_active(panel) {
            self.toggle_platform(panel);
        }
        self.add_option(panel, key)?;
        self.set_input(panel, key, value)
    }

    /// Converts the draft into a create request.
    ///
    /// Blank values are dropped. Social actions come out grouped in
    /// platform order; within a platform, in the order options were added.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed expiration date or
    /// button style.
    pub fn into_request(self) -> Result<LinkRequest, AppError> {
        let mut request = LinkRequest {
            title: non_blank(&self.title),
            subtitle: non_blank(&self.subtitle),
            button_name: non_blank(&self.button_name),
            ..Default::default()
        };

        if let Some(url) = non_blank(&self.primary_target) {
            request.targets.insert(TargetSlot::PRIMARY, url);
        }

        for platform in Platform::ALL {
            let Some(state) = self.panel_state(Panel::Social(platform)) else {
                continue;
            };
            for (key, value) in state.filled() {
                request.actions.push(ActionInput {
                    platform,
                    action: key.to_string(),
                    value: value.trim().to_string(),
                });
            }
        }

        if let Some(state) = self.panel_state(Panel::TargetLinks) {
            for (key, value) in state.filled() {
                let slot: TargetSlot = key.parse()?;
                request.targets.insert(slot, value.trim().to_string());
            }
        }

        if let Some(state) = self.panel_state(Panel::Advanced) {
            request.advanced = advanced_input(state)?;
        }

        Ok(request)
    }

    /// What the viewer would show for this draft, without validating it.
    pub fn preview(&self) -> DraftPreview {
        let social = Platform::ALL
            .into_iter()
            .filter_map(|platform| {
                self.panel_state(Panel::Social(platform))
                    .map(|state| (platform, state))
            })
            .flat_map(|(platform, state)| {
                state.filled().map(move |(key, value)| PreviewButton {
                    label: platform.button_label(key),
                    url: platform.resolve_target(key, value).ok(),
                })
            })
            .collect();

        let mut target_urls: Vec<(TargetSlot, String)> = Vec::new();
        if let Some(url) = non_blank(&self.primary_target) {
            target_urls.push((TargetSlot::PRIMARY, url));
        }
        if let Some(state) = self.panel_state(Panel::TargetLinks) {
            for (key, value) in state.filled() {
                if let Ok(slot) = key.parse::<TargetSlot>() {
                    target_urls.push((slot, value.trim().to_string()));
                }
            }
        }
        target_urls.sort_by_key(|(slot, _)| *slot);

        let button_name = non_blank(&self.button_name);
        let targets = target_urls
            .into_iter()
            .map(|(_, url)| PreviewButton {
                label: target_label(button_name.as_deref()).to_string(),
                url: normalize_url(&url).ok(),
            })
            .collect();

        let thumbnail = self
            .input(Panel::Advanced, "thumb")
            .and_then(non_blank)
            .map(|thumb| {
                if thumb == THUMBNAIL_PLACEHOLDER {
                    PLACEHOLDER_IMAGE_URL.to_string()
                } else {
                    thumb
                }
            });

        DraftPreview {
            title: non_blank(&self.title).unwrap_or_else(|| "Untitled".to_string()),
            subtitle: non_blank(&self.subtitle).unwrap_or_else(|| "No subtitle".to_string()),
            thumbnail,
            social,
            targets,
        }
    }

    fn panel_state(&self, panel: Panel) -> Option<&PanelState> {
        self.panels.iter().find(|p| p.panel == panel)
    }

    fn panel_state_mut(&mut self, panel: Panel) -> Result<&mut PanelState, AppError> {
        self.panels
            .iter_mut()
            .find(|p| p.panel == panel)
            .ok_or_else(|| {
                AppError::bad_request(
                    format!("{} panel is not active", panel.name()),
                    json!({ "panel": panel.slug() }),
                )
            })
    }
}

/// Button shown in a draft preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewButton {
    pub label: String,
    /// Resolved destination; `None` when the input would be rejected on save.
    pub url: Option<String>,
}

/// Preview of a draft as the viewer would render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftPreview {
    pub title: String,
    pub subtitle: String,
    pub thumbnail: Option<String>,
    pub social: Vec<PreviewButton>,
    pub targets: Vec<PreviewButton>,
}

fn advanced_input(state: &PanelState) -> Result<AdvanceInput, AppError> {
    let mut advanced = AdvanceInput::default();
    for (key, value) in state.filled() {
        match key {
            // Passwords are kept verbatim, surrounding spaces included.
            "pass" => advanced.password = Some(value.to_string()),
            "note" => advanced.note = Some(value.trim().to_string()),
            "exp" => {
                let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                    AppError::bad_request(
                        "Expiration date must be YYYY-MM-DD",
                        json!({ "field": "advanced.exp", "value": value }),
                    )
                })?;
                advanced.expires_on = Some(date);
            }
            "thumb" => advanced.thumbnail = Some(value.trim().to_string()),
            "style" => advanced.button_style = Some(value.trim().parse::<ButtonStyle>()?),
            "color" => advanced.theme_color = Some(value.trim().to_string()),
            _ => {}
        }
    }
    Ok(advanced)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn unknown_field(name: &str) -> AppError {
    AppError::bad_request("Unknown form field", json!({ "field": name }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const YT: Panel = Panel::Social(Platform::YouTube);
    const IG: Panel = Panel::Social(Platform::Instagram);

    #[test]
    fn test_panel_parse() {
        assert_eq!("youtube".parse::<Panel>().unwrap(), YT);
        assert_eq!("Target Link".parse::<Panel>().unwrap(), Panel::TargetLinks);
        assert_eq!("advanced".parse::<Panel>().unwrap(), Panel::Advanced);
        assert!("myspace".parse::<Panel>().is_err());
    }

    #[test]
    fn test_toggle_platform_keeps_activation_order() {
        let mut draft = LinkDraft::new();
        assert!(draft.toggle_platform(IG));
        assert!(draft.toggle_platform(YT));

        let panels: Vec<Panel> = draft.active_panels().collect();
        assert_eq!(panels, vec![IG, YT]);

        assert!(!draft.toggle_platform(IG));
        assert!(!draft.is_active(IG));
    }

    #[test]
    fn test_toggle_off_forgets_values() {
        let mut draft = LinkDraft::new();
        draft.toggle_platform(YT);
        draft.add_option(YT, "subs").unwrap();
        draft.set_input(YT, "subs", "https://youtube.com/@a").unwrap();

        draft.toggle_platform(YT);
        draft.toggle_platform(YT);
        assert!(draft.options(YT).is_empty());
        assert!(draft.input(YT, "subs").is_none());
    }

    #[test]
    fn test_add_option_is_idempotent() {
        let mut draft = LinkDraft::new();
        draft.toggle_platform(YT);
        draft.add_option(YT, "like").unwrap();
        draft.add_option(YT, "subs").unwrap();
        draft.add_option(YT, "like").unwrap();

        assert_eq!(draft.options(YT), ["like", "subs"]);
    }

    #[test]
    fn test_add_option_requires_active_panel_and_known_option() {
        let mut draft = LinkDraft::new();
        assert!(draft.add_option(YT, "subs").is_err());

        draft.toggle_platform(YT);
        assert!(draft.add_option(YT, "flw").is_err());
    }

    #[test]
    fn test_remove_option_drops_value() {
        let mut draft = LinkDraft::new();
        draft.toggle_platform(YT);
        draft.add_option(YT, "subs").unwrap();
        draft.set_input(YT, "subs", "https://youtube.com/@a").unwrap();

        draft.remove_option(YT, "subs");
        assert!(draft.options(YT).is_empty());
        assert!(draft.input(YT, "subs").is_none());
        assert!(draft.set_input(YT, "subs", "x").is_err());
    }

    #[test]
    fn test_target_panel_options() {
        let mut draft = LinkDraft::new();
        draft.toggle_platform(Panel::TargetLinks);
        assert!(draft.add_option(Panel::TargetLinks, "tlink2").is_ok());
        assert!(draft.add_option(Panel::TargetLinks, "tlink1").is_err());
        assert!(draft.add_option(Panel::TargetLinks, "tlink5").is_err());
        assert!(draft.add_option(Panel::TargetLinks, "3").is_err());
    }

    #[test]
    fn test_apply_field_top_level() {
        let draft = LinkDraft::from_fields([
            ("title", "My file"),
            ("subtitle", "Read me"),
            ("buttonName", "Download"),
            ("tlink1", "https://example.com/f"),
        ])
        .unwrap();

        assert_eq!(draft.title, "My file");
        assert_eq!(draft.subtitle, "Read me");
        assert_eq!(draft.button_name, "Download");
        assert_eq!(draft.primary_target, "https://example.com/f");
    }

    #[test]
    fn test_apply_field_rejects_unknown_names() {
        assert!(LinkDraft::from_fields([("colour", "x")]).is_err());
        assert!(LinkDraft::from_fields([("myspace.flw", "x")]).is_err());
        assert!(LinkDraft::from_fields([("youtube.flw", "x")]).is_err());
        assert!(LinkDraft::from_fields([("panel", "myspace")]).is_err());
    }

    #[test]
    fn test_apply_field_ignores_blank_values() {
        let draft = LinkDraft::from_fields([
            ("youtube.subs", "  "),
            ("panel", "instagram"),
            ("instagram.flw", "   "),
        ])
        .unwrap();

        assert!(!draft.is_active(YT));
        assert!(draft.is_active(IG));
        assert!(draft.options(IG).is_empty());
    }

    #[test]
    fn test_value_switches_its_panel_on() {
        let draft = LinkDraft::from_fields([
            ("advanced.pass", "hunter2"),
            ("advanced.exp", "2099-01-01"),
            ("panel", "advanced"),
        ])
        .unwrap();

        assert!(draft.is_active(Panel::Advanced));
        assert_eq!(draft.options(Panel::Advanced), ["pass", "exp"]);

        let request = draft.into_request().unwrap();
        assert_eq!(request.advanced.password.as_deref(), Some("hunter2"));
        assert_eq!(
            request.advanced.expires_on,
            NaiveDate::from_ymd_opt(2099, 1, 1)
        );
    }

    #[test]
    fn test_into_request_full_form() {
        let draft = LinkDraft::from_fields([
            ("title", " Pack "),
            ("tlink1", "https://example.com/1"),
            ("panel", "instagram"),
            ("instagram.flw", "someone"),
            ("panel", "youtube"),
            ("youtube.like", "https://youtube.com/watch?v=1"),
            ("youtube.subs", "https://youtube.com/@c"),
            ("panel", "target"),
            ("target.tlink3", "https://example.com/3"),
            ("panel", "advanced"),
            ("advanced.pass", " secret "),
            ("advanced.exp", "2030-01-31"),
            ("advanced.style", "square"),
            ("advanced.color", "#112233"),
        ])
        .unwrap();

        let request = draft.into_request().unwrap();
        assert_eq!(request.title.as_deref(), Some("Pack"));
        assert!(request.subtitle.is_none());

        let actions: Vec<(Platform, &str)> = request
            .actions
            .iter()
            .map(|a| (a.platform, a.action.as_str()))
            .collect();
        assert_eq!(
            actions,
            vec![
                (Platform::YouTube, "like"),
                (Platform::YouTube, "subs"),
                (Platform::Instagram, "flw"),
            ]
        );

        assert_eq!(request.targets.len(), 2);
        assert_eq!(
            request.targets.get(&TargetSlot::new(3).unwrap()).unwrap(),
            "https://example.com/3"
        );

        assert_eq!(request.advanced.password.as_deref(), Some(" secret "));
        assert_eq!(
            request.advanced.expires_on,
            NaiveDate::from_ymd_opt(2030, 1, 31)
        );
        assert_eq!(request.advanced.button_style, Some(ButtonStyle::Square));
        assert_eq!(request.advanced.theme_color.as_deref(), Some("#112233"));
    }

    #[test]
    fn test_into_request_rejects_bad_date() {
        let draft = LinkDraft::from_fields([
            ("panel", "advanced"),
            ("advanced.exp", "31/01/2030"),
        ])
        .unwrap();
        assert!(draft.into_request().is_err());
    }

    #[test]
    fn test_preview_fallbacks() {
        let preview = LinkDraft::new().preview();
        assert_eq!(preview.title, "Untitled");
        assert_eq!(preview.subtitle, "No subtitle");
        assert!(preview.thumbnail.is_none());
        assert!(preview.social.is_empty());
        assert!(preview.targets.is_empty());
    }

    #[test]
    fn test_preview_buttons() {
        let draft = LinkDraft::from_fields([
            ("buttonName", "Download"),
            ("tlink1", "https://example.com/1"),
            ("panel", "tiktok"),
            ("tiktok.flw", "@dancer"),
            ("panel", "youtube"),
            ("youtube.subs", "https://youtube.com/@c"),
            ("panel", "target"),
            ("target.tlink2", "https://example.com/2"),
            ("panel", "advanced"),
            ("advanced.thumb", THUMBNAIL_PLACEHOLDER),
        ])
        .unwrap();

        let preview = draft.preview();
        let social: Vec<&str> = preview.social.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(social, vec!["Subscribe Channel", "Follow Account"]);

        let targets: Vec<&str> = preview.targets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(targets, vec!["Download", "Download"]);

        assert_eq!(preview.thumbnail.as_deref(), Some(PLACEHOLDER_IMAGE_URL));
    }

    #[test]
    fn test_preview_resolves_hrefs() {
        let draft = LinkDraft::from_fields([
            ("tlink1", "javascript:alert(1)"),
            ("panel", "tiktok"),
            ("tiktok.flw", "@dancer"),
            ("panel", "website"),
            ("website.visit", "javascript:alert(1)"),
        ])
        .unwrap();

        let preview = draft.preview();
        assert_eq!(
            preview.social[0].url.as_deref(),
            Some("https://www.tiktok.com/@dancer")
        );
        assert_eq!(preview.social[1].label, "Visit Website");
        assert!(preview.social[1].url.is_none());
        assert!(preview.targets[0].url.is_none());
    }
}
