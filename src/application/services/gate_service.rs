//! Visitor-facing gate: expiry, password and sequential unlock.
//!
//! Every visitor request resolves the link, then checks in this order:
//! expired, password not yet verified, social actions not completed. The
//! visitor's progress travels in a signed [`VisitorTicket`]; this service
//! signs and opens tickets but never stores them.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info};

use crate::application::services::LinkService;
use crate::domain::entities::{LockedLink, TargetSlot};
use crate::domain::unlock::{UnlockError, UnlockProgress, VisitorTicket};
use crate::error::AppError;
use crate::utils::signing::{open_payload, sign_payload, verify_password};

/// What a visitor sees when opening a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Today is on or after the expiration date.
    Expired,
    /// A password is set and this visitor has not entered it yet.
    PasswordRequired,
    /// Buttons are shown with these states.
    Open(UnlockProgress),
}

#[derive(Debug, Clone)]
pub struct GateView {
    pub link: LockedLink,
    pub gate: Gate,
}

/// Result of clicking a social action button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStart {
    /// The button was started; send the visitor to this URL.
    Started(String),
    /// The button is not clickable right now.
    Rejected(UnlockError),
}

pub struct GateService {
    links: Arc<LinkService>,
    signing_secret: String,
    action_delay: Duration,
}

impl GateService {
    pub fn new(links: Arc<LinkService>, signing_secret: String, action_delay: Duration) -> Self {
        Self {
            links,
            signing_secret,
            action_delay,
        }
    }

    pub fn action_delay(&self) -> Duration {
        self.action_delay
    }

    /// Opens a ticket from its cookie value.
    ///
    /// A missing ticket, a bad signature, undecodable content or a ticket
    /// issued for another link all yield a fresh ticket for `key`.
    pub fn read_ticket(&self, key: &str, cookie_value: Option<&str>) -> VisitorTicket {
        cookie_value
            .and_then(|value| open_payload(&self.signing_secret, value))
            .and_then(|payload| serde_json::from_slice::<VisitorTicket>(&payload).ok())
            .filter(|ticket| ticket.key == key)
            .unwrap_or_else(|| VisitorTicket::new(key))
    }

    /// Signs a ticket for the cookie.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the ticket cannot be serialized.
    pub fn write_ticket(&self, ticket: &VisitorTicket) -> Result<String, AppError> {
        let payload = serde_json::to_vec(ticket).map_err(|e| {
            AppError::internal(
                "Failed to encode visitor ticket",
                json!({ "reason": e.to_string() }),
            )
        })?;
        Ok(sign_payload(&self.signing_secret, &payload))
    }

    /// Resolves what a visitor sees for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown keys.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn open(
        &self,
        key: &str,
        ticket: &VisitorTicket,
        now: DateTime<Utc>,
    ) -> Result<GateView, AppError> {
        let link = self.links.get(key).await?;

        let gate = if link.is_expired_on(now.date_naive()) {
            Gate::Expired
        } else if link.has_password() && !ticket.password_verified {
            Gate::PasswordRequired
        } else {
            Gate::Open(ticket.progress(link.actions.len(), now, self.action_delay))
        };

        metrics::counter!("locked_link_views_total").increment(1);
        Ok(GateView { link, gate })
    }

    /// Checks a password and marks the ticket as verified on success.
    ///
    /// Links without a password accept any input.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown keys.
    /// Returns [`AppError::Gone`] if the link has expired.
    /// Returns [`AppError::Unauthorized`] if the password is wrong.
    pub async fn verify_password(
        &self,
        key: &str,
        ticket: &mut VisitorTicket,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LockedLink, AppError> {
        let link = self.usable_link(key, now).await?;

        if let Some(stored) = link.advanced.password_hash.as_deref()
            && !verify_password(&self.signing_secret, &link.key, password, stored)
        {
            debug!(key, "Incorrect password");
            return Err(AppError::unauthorized(
                "Incorrect password",
                json!({ "key": key }),
            ));
        }

        ticket.password_verified = true;
        Ok(link)
    }

    /// Starts social action `index` for this visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown keys.
    /// Returns [`AppError::Gone`] if the link has expired.
    /// Returns [`AppError::Forbidden`] if the password has not been entered.
    pub async fn start_action(
        &self,
        key: &str,
        ticket: &mut VisitorTicket,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<ActionStart, AppError> {
        let link = self.usable_link(key, now).await?;
        self.require_password(&link, ticket)?;

        match ticket.start(index, link.actions.len(), now, self.action_delay) {
            Ok(()) => {
                debug!(key, index, "Action started");
                Ok(ActionStart::Started(link.actions[index].target.clone()))
            }
            Err(e) => {
                debug!(key, index, reason = %e, "Action rejected");
                Ok(ActionStart::Rejected(e))
            }
        }
    }

    /// Returns the link and the destination behind target `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown keys or unused slots.
    /// Returns [`AppError::Gone`] if the link has expired.
    /// Returns [`AppError::Forbidden`] if the password has not been entered
    /// or a social action is not completed.
    pub async fn reveal_target(
        &self,
        key: &str,
        ticket: &VisitorTicket,
        slot: TargetSlot,
        now: DateTime<Utc>,
    ) -> Result<(LockedLink, String), AppError> {
        let link = self.usable_link(key, now).await?;
        self.require_password(&link, ticket)?;

        let progress = ticket.progress(link.actions.len(), now, self.action_delay);
        if !progress.all_completed() {
            return Err(AppError::forbidden(
                "Complete all actions first",
                json!({ "key": key, "completed": progress.active_index(), "required": link.actions.len() }),
            ));
        }

        let url = link
            .target(slot)
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::not_found(
                    "Target link not found",
                    json!({ "key": key, "slot": slot.field_name() }),
                )
            })?;

        metrics::counter!("locked_link_unlocks_total").increment(1);
        info!(key, slot = %slot, "Target revealed");
        Ok((link, url))
    }

    async fn usable_link(&self, key: &str, now: DateTime<Utc>) -> Result<LockedLink, AppError> {
        let link = self.links.get(key).await?;
        if link.is_expired_on(now.date_naive()) {
            return Err(AppError::gone(
                "This link has expired",
                json!({ "key": key, "expires_on": link.advanced.expires_on }),
            ));
        }
        Ok(link)
    }

    fn require_password(&self, link: &LockedLink, ticket: &VisitorTicket) -> Result<(), AppError> {
        if link.has_password() && !ticket.password_verified {
            return Err(AppError::forbidden(
                "Password required",
                json!({ "key": link.key }),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use crate::domain::entities::{AdvanceOption, SocialAction};
    use crate::domain::platform::Platform;
    use crate::domain::repositories::MockLockedLinkRepository;
    use crate::domain::unlock::ButtonState;
    use crate::infrastructure::cache::NullCache;
    use crate::utils::signing::password_hash;

    const SECRET: &str = "test-signing-secret";
    const KEY: &str = "abcdefghijkl";

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-10T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn link(password: Option<&str>, expires_on: Option<NaiveDate>, actions: usize) -> LockedLink {
        let mut targets = BTreeMap::new();
        targets.insert(TargetSlot::PRIMARY, "https://example.com/one".to_string());
        targets.insert(TargetSlot::new(2).unwrap(), "https://example.com/two".to_string());

        LockedLink {
            id: 1,
            key: KEY.to_string(),
            title: Some("Pack".to_string()),
            subtitle: None,
            button_name: None,
            actions: (0..actions)
                .map(|i| SocialAction {
                    platform: Platform::Website,
                    action: format!("visit{}", i + 1),
                    target: format!("https://site{i}.example.com/"),
                })
                .collect(),
            targets,
            advanced: AdvanceOption {
                password_hash: password.map(|p| password_hash(SECRET, KEY, p)),
                expires_on,
                ..Default::default()
            },
            created_at: now(),
        }
    }

    fn gate_for(link: LockedLink) -> GateService {
        let mut repo = MockLockedLinkRepository::new();
        repo.expect_find_by_key()
            .returning(move |_| Ok(Some(link.clone())));

        let links = Arc::new(LinkService::new(
            Arc::new(repo),
            Arc::new(NullCache::new()),
            SECRET.to_string(),
            "http://localhost:3000".to_string(),
        ));
        GateService::new(links, SECRET.to_string(), Duration::seconds(4))
    }

    #[tokio::test]
    async fn test_open_unknown_key() {
        let mut repo = MockLockedLinkRepository::new();
        repo.expect_find_by_key().returning(|_| Ok(None));
        let links = Arc::new(LinkService::new(
            Arc::new(repo),
            Arc::new(NullCache::new()),
            SECRET.to_string(),
            "http://localhost:3000".to_string(),
        ));
        let gate = GateService::new(links, SECRET.to_string(), Duration::seconds(4));

        let err = gate
            .open(KEY, &VisitorTicket::new(KEY), now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_open_expired_on_expiration_day() {
        let gate = gate_for(link(Some("pw"), Some(now().date_naive()), 1));

        let view = gate.open(KEY, &VisitorTicket::new(KEY), now()).await.unwrap();
        assert_eq!(view.gate, Gate::Expired);
    }

    #[tokio::test]
    async fn test_open_not_expired_day_before() {
        let tomorrow = now().date_naive().succ_opt().unwrap();
        let gate = gate_for(link(None, Some(tomorrow), 1));

        let view = gate.open(KEY, &VisitorTicket::new(KEY), now()).await.unwrap();
        assert!(matches!(view.gate, Gate::Open(_)));
    }

    #[tokio::test]
    async fn test_password_gate() {
        let gate = gate_for(link(Some("hunter2"), None, 2));
        let mut ticket = VisitorTicket::new(KEY);

        let view = gate.open(KEY, &ticket, now()).await.unwrap();
        assert_eq!(view.gate, Gate::PasswordRequired);

        let err = gate
            .verify_password(KEY, &mut ticket, "wrong", now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
        assert!(!ticket.password_verified);

        gate.verify_password(KEY, &mut ticket, "hunter2", now())
            .await
            .unwrap();
        assert!(ticket.password_verified);

        let view = gate.open(KEY, &ticket, now()).await.unwrap();
        let Gate::Open(progress) = view.gate else {
            panic!("expected open gate");
        };
        assert_eq!(progress.states(), [ButtonState::Idle; 2]);
    }

    #[tokio::test]
    async fn test_start_action_requires_password() {
        let gate = gate_for(link(Some("hunter2"), None, 1));
        let mut ticket = VisitorTicket::new(KEY);

        let err = gate
            .start_action(KEY, &mut ticket, 0, now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_start_action_sequence() {
        let gate = gate_for(link(None, None, 2));
        let mut ticket = VisitorTicket::new(KEY);

        let skipped = gate.start_action(KEY, &mut ticket, 1, now()).await.unwrap();
        assert!(matches!(
            skipped,
            ActionStart::Rejected(UnlockError::Locked { .. })
        ));

        let started = gate.start_action(KEY, &mut ticket, 0, now()).await.unwrap();
        assert_eq!(
            started,
            ActionStart::Started("https://site0.example.com/".to_string())
        );

        let later = now() + Duration::seconds(4);
        let second = gate.start_action(KEY, &mut ticket, 1, later).await.unwrap();
        assert!(matches!(second, ActionStart::Started(_)));
    }

    #[tokio::test]
    async fn test_reveal_target_requires_completion() {
        let gate = gate_for(link(None, None, 1));
        let mut ticket = VisitorTicket::new(KEY);

        let err = gate
            .reveal_target(KEY, &ticket, TargetSlot::PRIMARY, now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden { .. }));

        gate.start_action(KEY, &mut ticket, 0, now()).await.unwrap();
        let still_loading = now() + Duration::seconds(2);
        assert!(
            gate.reveal_target(KEY, &ticket, TargetSlot::PRIMARY, still_loading)
                .await
                .is_err()
        );

        let done = now() + Duration::seconds(4);
        let (_, url) = gate
            .reveal_target(KEY, &ticket, TargetSlot::new(2).unwrap(), done)
            .await
            .unwrap();
        assert_eq!(url, "https://example.com/two");

        let err = gate
            .reveal_target(KEY, &ticket, TargetSlot::new(4).unwrap(), done)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_reveal_without_actions_is_immediate() {
        let gate = gate_for(link(None, None, 0));
        let (_, url) = gate
            .reveal_target(KEY, &VisitorTicket::new(KEY), TargetSlot::PRIMARY, now())
            .await
            .unwrap();
        assert_eq!(url, "https://example.com/one");
    }

    #[tokio::test]
    async fn test_expired_link_rejects_actions() {
        let gate = gate_for(link(None, Some(now().date_naive()), 1));
        let mut ticket = VisitorTicket::new(KEY);

        let err = gate
            .start_action(KEY, &mut ticket, 0, now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Gone { .. }));
    }

    #[test]
    fn test_ticket_round_trip_and_rejection() {
        let gate = gate_for(link(None, None, 0));
        let mut ticket = VisitorTicket::new(KEY);
        ticket.password_verified = true;

        let cookie = gate.write_ticket(&ticket).unwrap();
        assert_eq!(gate.read_ticket(KEY, Some(&cookie)), ticket);

        let other_key = gate.read_ticket("zzzzzzzzzzzz", Some(&cookie));
        assert!(!other_key.password_verified);
        assert_eq!(other_key.key, "zzzzzzzzzzzz");

        let tampered = format!("{cookie}00");
        assert!(!gate.read_ticket(KEY, Some(&tampered)).password_verified);
        assert!(!gate.read_ticket(KEY, None).password_verified);
    }
}
