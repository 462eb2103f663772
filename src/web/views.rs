//! Askama templates and the view models they render.
//!
//! Templates only read plain fields; every decision (labels, button
//! states, which panel is open) is made here.

use askama::Template;
use askama_web::WebTemplate;

use crate::domain::draft::{ADVANCED_OPTIONS, DraftPreview, LinkDraft, Panel};
use crate::domain::entities::{LockedLink, TargetSlot};
use crate::domain::platform::{InputKind, Platform};
use crate::domain::unlock::{ButtonState, UnlockProgress};

/// One input inside a builder panel.
pub struct OptionView {
    /// Form field name, e.g. `youtube.subs`.
    pub field: String,
    pub name: &'static str,
    pub placeholder: String,
    /// `url`, `text`, `tel`, `password`, `date`, `textarea` or `select`.
    pub input_type: &'static str,
    pub value: String,
}

pub struct PanelView {
    pub slug: &'static str,
    pub name: &'static str,
    pub active: bool,
    pub options: Vec<OptionView>,
}

impl PanelView {
    fn new(panel: Panel, draft: &LinkDraft) -> Self {
        let value = |key: &str| draft.input(panel, key).unwrap_or_default().to_string();

        let options = match panel {
            Panel::Social(platform) => platform
                .actions()
                .iter()
                .map(|spec| OptionView {
                    field: format!("{}.{}", panel.slug(), spec.key),
                    name: spec.option,
                    placeholder: spec.placeholder.to_string(),
                    input_type: match spec.input {
                        InputKind::Url => "url",
                        InputKind::Username => "text",
                        InputKind::PhoneNumber => "tel",
                    },
                    value: value(spec.key),
                })
                .collect(),
            Panel::TargetLinks => TargetSlot::all()
                .filter(|slot| *slot != TargetSlot::PRIMARY)
                .map(|slot| {
                    let key = slot.field_name();
                    OptionView {
                        field: format!("{}.{}", panel.slug(), key),
                        name: match slot.number() {
                            2 => "Target Link 2",
                            3 => "Target Link 3",
                            _ => "Target Link 4",
                        },
                        placeholder: "https://".to_string(),
                        input_type: "url",
                        value: value(&key),
                    }
                })
                .collect(),
            Panel::Advanced => ADVANCED_OPTIONS
                .iter()
                .map(|&(key, name)| OptionView {
                    field: format!("{}.{}", panel.slug(), key),
                    name,
                    placeholder: match key {
                        "pass" => "Visitors must enter this password",
                        "note" => "Shown above the buttons",
                        "thumb" => "https:// image URL",
                        "color" => "#7c3aed",
                        _ => "",
                    }
                    .to_string(),
                    input_type: match key {
                        "pass" => "password",
                        "note" => "textarea",
                        "exp" => "date",
                        "style" => "select",
                        _ => "text",
                    },
                    // Passwords are never echoed back into the page.
                    value: if key == "pass" { String::new() } else { value(key) },
                })
                .collect(),
        };

        Self {
            slug: panel.slug(),
            name: panel.name(),
            active: draft.is_active(panel),
            options,
        }
    }
}

/// `GET /` and re-rendered `POST /` after an error.
#[derive(Template, WebTemplate)]
#[template(path = "builder.html")]
pub struct BuilderTemplate {
    pub title: String,
    pub subtitle: String,
    pub button_name: String,
    pub tlink1: String,
    pub social_panels: Vec<PanelView>,
    pub target_panel: PanelView,
    pub advanced_panel: PanelView,
    pub uploads_enabled: bool,
    pub error: Option<String>,
}

impl BuilderTemplate {
    pub fn new(draft: &LinkDraft, uploads_enabled: bool, error: Option<String>) -> Self {
        Self {
            title: draft.title.clone(),
            subtitle: draft.subtitle.clone(),
            button_name: draft.button_name.clone(),
            tlink1: draft.primary_target.clone(),
            social_panels: Platform::ALL
                .into_iter()
                .map(|platform| PanelView::new(Panel::Social(platform), draft))
                .collect(),
            target_panel: PanelView::new(Panel::TargetLinks, draft),
            advanced_panel: PanelView::new(Panel::Advanced, draft),
            uploads_enabled,
            error,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "preview.html")]
pub struct PreviewTemplate {
    pub preview: DraftPreview,
}

#[derive(Template, WebTemplate)]
#[template(path = "created.html")]
pub struct CreatedTemplate {
    pub key: String,
    pub url: String,
    pub protected: bool,
}

/// Parts of a link shown above the buttons on every visitor page.
pub struct LinkHeader {
    pub key: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub note: Option<String>,
    pub thumbnail: Option<String>,
    pub theme_color: Option<String>,
    pub style_class: &'static str,
}

impl From<&LockedLink> for LinkHeader {
    fn from(link: &LockedLink) -> Self {
        Self {
            key: link.key.clone(),
            title: link.display_title().to_string(),
            subtitle: link.subtitle.clone(),
            note: link.advanced.note.clone(),
            thumbnail: link.thumbnail_src().map(str::to_string),
            theme_color: link
                .advanced
                .theme_color
                .as_ref()
                .map(|c| c.as_str().to_string()),
            style_class: link.advanced.button_style.as_str(),
        }
    }
}

pub struct SocialButtonView {
    pub index: usize,
    pub label: String,
    pub state: &'static str,
    pub clickable: bool,
}

pub struct TargetButtonView {
    pub slot: String,
    pub label: String,
    pub enabled: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "viewer.html")]
pub struct ViewerTemplate {
    pub header: LinkHeader,
    pub social: Vec<SocialButtonView>,
    pub targets: Vec<TargetButtonView>,
    pub completed: usize,
    pub total: usize,
    /// Seconds until the page reloads itself, while actions are pending.
    pub refresh_seconds: Option<i64>,
}

impl ViewerTemplate {
    /// `idle_refresh` is how often a page with unfinished actions reloads
    /// to pick up buttons started from another tab.
    pub fn new(link: &LockedLink, progress: &UnlockProgress, idle_refresh: i64) -> Self {
        let social = link
            .actions
            .iter()
            .enumerate()
            .map(|(index, action)| {
                let state = progress.state(index).unwrap_or(ButtonState::Idle);
                SocialButtonView {
                    index,
                    label: action.label(),
                    state: state.as_str(),
                    clickable: progress.can_start(index),
                }
            })
            .collect();

        let unlocked = progress.all_completed();
        let targets = link
            .targets
            .keys()
            .map(|slot| TargetButtonView {
                slot: slot.field_name(),
                label: link.target_label().to_string(),
                enabled: unlocked,
            })
            .collect();

        let refresh_seconds = if unlocked {
            None
        } else {
            Some(
                progress
                    .seconds_until_change()
                    .unwrap_or(idle_refresh)
                    .max(1),
            )
        };

        Self {
            header: LinkHeader::from(link),
            social,
            targets,
            completed: progress.active_index(),
            total: link.actions.len(),
            refresh_seconds,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "password.html")]
pub struct PasswordTemplate {
    pub header: LinkHeader,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "expired.html")]
pub struct ExpiredTemplate {
    pub header: LinkHeader,
    pub expires_on: String,
}

/// "Your Target Link" interstitial.
#[derive(Template, WebTemplate)]
#[template(path = "getlink.html")]
pub struct GetLinkTemplate {
    pub header: LinkHeader,
    pub label: String,
    pub url: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub reason: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::{DateTime, Duration, Utc};

    use crate::domain::entities::{AdvanceOption, SocialAction};
    use crate::domain::unlock::VisitorTicket;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-10T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn link() -> LockedLink {
        let mut targets = BTreeMap::new();
        targets.insert(TargetSlot::PRIMARY, "https://example.com/1".to_string());
        targets.insert(TargetSlot::new(2).unwrap(), "https://example.com/2".to_string());
        LockedLink {
            id: 1,
            key: "abcdefghijkl".to_string(),
            title: None,
            subtitle: None,
            button_name: None,
            actions: vec![
                SocialAction {
                    platform: Platform::YouTube,
                    action: "subs".to_string(),
                    target: "https://youtube.com/@c".to_string(),
                },
                SocialAction {
                    platform: Platform::TikTok,
                    action: "flw".to_string(),
                    target: "https://www.tiktok.com/@c".to_string(),
                },
            ],
            targets,
            advanced: AdvanceOption::default(),
            created_at: now(),
        }
    }

    #[test]
    fn test_viewer_fresh_visitor() {
        let link = link();
        let progress = VisitorTicket::new(&link.key).progress(2, now(), Duration::seconds(4));
        let view = ViewerTemplate::new(&link, &progress, 5);

        assert_eq!(view.header.title, "Link Page");
        assert!(view.social[0].clickable);
        assert!(!view.social[1].clickable);
        assert_eq!(view.social[0].label, "Subscribe Channel");
        assert!(view.targets.iter().all(|t| !t.enabled));
        assert!(view.targets.iter().all(|t| t.label == "Get Link"));
        assert_eq!(view.refresh_seconds, Some(5));
    }

    #[test]
    fn test_viewer_loading_then_unlocked() {
        let link = link();
        let mut ticket = VisitorTicket::new(&link.key);
        ticket.start(0, 2, now(), Duration::seconds(4)).unwrap();

        let progress = ticket.progress(2, now() + Duration::seconds(1), Duration::seconds(4));
        let view = ViewerTemplate::new(&link, &progress, 5);
        assert_eq!(view.social[0].state, "loading");
        assert_eq!(view.refresh_seconds, Some(3));

        let later = now() + Duration::seconds(5);
        ticket.start(1, 2, later, Duration::seconds(4)).unwrap();
        let progress = ticket.progress(2, later + Duration::seconds(4), Duration::seconds(4));
        let view = ViewerTemplate::new(&link, &progress, 5);
        assert!(view.targets.iter().all(|t| t.enabled));
        assert!(view.refresh_seconds.is_none());
        assert_eq!(view.completed, 2);
    }

    #[test]
    fn test_builder_reflects_draft() {
        let draft = LinkDraft::from_fields([
            ("title", "Pack"),
            ("panel", "youtube"),
            ("youtube.subs", "https://youtube.com/@c"),
        ])
        .unwrap();
        let view = BuilderTemplate::new(&draft, false, None);

        assert_eq!(view.title, "Pack");
        let youtube = &view.social_panels[0];
        assert!(youtube.active);
        assert_eq!(youtube.options[0].field, "youtube.subs");
        assert_eq!(youtube.options[0].value, "https://youtube.com/@c");
        assert!(!view.advanced_panel.active);
        assert_eq!(view.target_panel.options.len(), 3);
    }

    #[test]
    fn test_builder_does_not_echo_password() {
        let draft = LinkDraft::from_fields([
            ("panel", "advanced"),
            ("advanced.pass", "hunter2"),
            ("advanced.note", "Thanks"),
        ])
        .unwrap();
        let view = BuilderTemplate::new(&draft, false, None);

        let value_of = |field: &str| {
            view.advanced_panel
                .options
                .iter()
                .find(|o| o.field == field)
                .map(|o| o.value.clone())
                .unwrap()
        };
        assert_eq!(value_of("advanced.pass"), "");
        assert_eq!(value_of("advanced.note"), "Thanks");
        assert!(!view.render().unwrap().contains("hunter2"));
    }

    #[test]
    fn test_builder_renders() {
        let html = BuilderTemplate::new(&LinkDraft::new(), true, Some("Oops".to_string()))
            .render()
            .unwrap();
        assert!(html.contains("name=\"tlink1\""));
        assert!(html.contains("name=\"instagram.flw\""));
        assert!(html.contains("thumbnail_file"));
        assert!(html.contains("Oops"));
    }
}
