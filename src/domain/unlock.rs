//! Sequential unlock of a locked link's buttons.
//!
//! A visitor works through the social action buttons one at a time. Each
//! started button spends a fixed delay in the loading state before it
//! counts as completed, and only the button right after the completed
//! prefix can be started. Target buttons open once every social button is
//! completed.
//!
//! Progress is kept in a [`VisitorTicket`], which the web layer signs and
//! stores in a cookie, so the state machine itself is pure: every question
//! is answered from the ticket and the current time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// State of one social action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    Loading,
    Completed,
}

impl ButtonState {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonState::Idle => "idle",
            ButtonState::Loading => "loading",
            ButtonState::Completed => "completed",
        }
    }
}

/// Why a button could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnlockError {
    #[error("action {index} is locked until action {active} is completed")]
    Locked { index: usize, active: usize },

    #[error("action {0} was already started")]
    AlreadyStarted(usize),

    #[error("action {index} does not exist (link has {count} actions)")]
    OutOfRange { index: usize, count: usize },
}

/// One visitor's progress on one locked link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorTicket {
    /// Key of the link this ticket belongs to.
    #[serde(rename = "k")]
    pub key: String,

    #[serde(rename = "p", default)]
    pub password_verified: bool,

    /// When each social action button was started, by index.
    #[serde(rename = "s", default)]
    pub started: Vec<Option<DateTime<Utc>>>,
}

impl VisitorTicket {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            password_verified: false,
            started: Vec::new(),
        }
    }

    /// Evaluates the ticket for a link with `action_count` social actions.
    pub fn progress(&self, action_count: usize, now: DateTime<Utc>, delay: Duration) -> UnlockProgress {
        let mut states = Vec::with_capacity(action_count);
        let mut remaining = Vec::with_capacity(action_count);

        for index in 0..action_count {
            match self.started.get(index).copied().flatten() {
                None => {
                    states.push(ButtonState::Idle);
                    remaining.push(None);
                }
                Some(started) => {
                    let left = started + delay - now;
                    if left > Duration::zero() {
                        states.push(ButtonState::Loading);
                        remaining.push(Some(left));
                    } else {
                        states.push(ButtonState::Completed);
                        remaining.push(None);
                    }
                }
            }
        }

        UnlockProgress { states, remaining }
    }

    /// Starts social action `index` at `now`.
    ///
    /// # Errors
    ///
    /// - [`UnlockError::OutOfRange`] for an index past the last action
    /// - [`UnlockError::AlreadyStarted`] if the button is loading or completed
    /// - [`UnlockError::Locked`] if an earlier button is not completed yet
    pub fn start(
        &mut self,
        index: usize,
        action_count: usize,
        now: DateTime<Utc>,
        delay: Duration,
    ) -> Result<(), UnlockError> {
        if index >= action_count {
            return Err(UnlockError::OutOfRange {
                index,
                count: action_count,
            });
        }

        let progress = self.progress(action_count, now, delay);
        if progress.state(index) != Some(ButtonState::Idle) {
            return Err(UnlockError::AlreadyStarted(index));
        }
        let active = progress.active_index();
        if index > active {
            return Err(UnlockError::Locked { index, active });
        }

        if self.started.len() < action_count {
            self.started.resize(action_count, None);
        }
        self.started[index] = Some(now);
        Ok(())
    }
}

/// Button states of a ticket at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockProgress {
    states: Vec<ButtonState>,
    remaining: Vec<Option<Duration>>,
}

impl UnlockProgress {
    pub fn state(&self, index: usize) -> Option<ButtonState> {
        self.states.get(index).copied()
    }

    pub fn states(&self) -> &[ButtonState] {
        &self.states
    }

    /// Number of leading completed buttons, i.e. the index of the next
    /// button in sequence.
    pub fn active_index(&self) -> usize {
        self.states
            .iter()
            .take_while(|s| **s == ButtonState::Completed)
            .count()
    }

    /// A button can be started when it is idle and nothing before it is
    /// still pending.
    pub fn can_start(&self, index: usize) -> bool {
        self.state(index) == Some(ButtonState::Idle) && index <= self.active_index()
    }

    /// True when every social button is completed (or there are none).
    pub fn all_completed(&self) -> bool {
        self.states.iter().all(|s| *s == ButtonState::Completed)
    }

    /// Whole seconds until the next loading button completes, rounded up.
    pub fn seconds_until_change(&self) -> Option<i64> {
        self.remaining
            .iter()
            .flatten()
            .min()
            .map(|left| (left.num_milliseconds() + 999) / 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn delay() -> Duration {
        Duration::seconds(4)
    }

    #[test]
    fn test_fresh_ticket_only_first_button_open() {
        let ticket = VisitorTicket::new("abc");
        let progress = ticket.progress(3, t0(), delay());

        assert_eq!(progress.states(), [ButtonState::Idle; 3]);
        assert_eq!(progress.active_index(), 0);
        assert!(progress.can_start(0));
        assert!(!progress.can_start(1));
        assert!(!progress.can_start(2));
        assert!(!progress.all_completed());
        assert_eq!(progress.seconds_until_change(), None);
    }

    #[test]
    fn test_no_actions_means_unlocked() {
        let progress = VisitorTicket::new("abc").progress(0, t0(), delay());
        assert!(progress.all_completed());
        assert_eq!(progress.active_index(), 0);
    }

    #[test]
    fn test_started_button_loads_then_completes() {
        let mut ticket = VisitorTicket::new("abc");
        ticket.start(0, 2, t0(), delay()).unwrap();

        let loading = ticket.progress(2, t0() + Duration::seconds(1), delay());
        assert_eq!(loading.state(0), Some(ButtonState::Loading));
        assert_eq!(loading.active_index(), 0);
        assert!(!loading.can_start(1));
        assert_eq!(loading.seconds_until_change(), Some(3));

        let done = ticket.progress(2, t0() + delay(), delay());
        assert_eq!(done.state(0), Some(ButtonState::Completed));
        assert_eq!(done.active_index(), 1);
        assert!(done.can_start(1));
    }

    #[test]
    fn test_seconds_until_change_rounds_up() {
        let mut ticket = VisitorTicket::new("abc");
        ticket.start(0, 1, t0(), delay()).unwrap();

        let progress = ticket.progress(1, t0() + Duration::milliseconds(3500), delay());
        assert_eq!(progress.seconds_until_change(), Some(1));
    }

    #[test]
    fn test_cannot_skip_ahead() {
        let mut ticket = VisitorTicket::new("abc");
        let err = ticket.start(1, 3, t0(), delay()).unwrap_err();
        assert_eq!(err, UnlockError::Locked { index: 1, active: 0 });
    }

    #[test]
    fn test_cannot_start_next_while_previous_loading() {
        let mut ticket = VisitorTicket::new("abc");
        ticket.start(0, 2, t0(), delay()).unwrap();

        let err = ticket
            .start(1, 2, t0() + Duration::seconds(2), delay())
            .unwrap_err();
        assert_eq!(err, UnlockError::Locked { index: 1, active: 0 });
    }

    #[test]
    fn test_cannot_restart() {
        let mut ticket = VisitorTicket::new("abc");
        ticket.start(0, 2, t0(), delay()).unwrap();

        assert_eq!(
            ticket.start(0, 2, t0(), delay()).unwrap_err(),
            UnlockError::AlreadyStarted(0)
        );
        assert_eq!(
            ticket
                .start(0, 2, t0() + Duration::seconds(10), delay())
                .unwrap_err(),
            UnlockError::AlreadyStarted(0)
        );
    }

    #[test]
    fn test_out_of_range() {
        let mut ticket = VisitorTicket::new("abc");
        assert_eq!(
            ticket.start(2, 2, t0(), delay()).unwrap_err(),
            UnlockError::OutOfRange { index: 2, count: 2 }
        );
    }

    #[test]
    fn test_full_sequence_unlocks_targets() {
        let mut ticket = VisitorTicket::new("abc");
        let mut now = t0();
        for index in 0..3 {
            ticket.start(index, 3, now, delay()).unwrap();
            now += delay();
        }

        let progress = ticket.progress(3, now, delay());
        assert!(progress.all_completed());
        assert_eq!(progress.active_index(), 3);
        assert!(!progress.can_start(0));
    }

    #[test]
    fn test_ticket_serializes_compactly() {
        let mut ticket = VisitorTicket::new("abc");
        ticket.password_verified = true;
        ticket.start(0, 1, t0(), delay()).unwrap();

        let json = serde_json::to_string(&ticket).unwrap();
        assert!(json.starts_with(r#"{"k":"abc","p":true,"s":["#));

        let back: VisitorTicket = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ticket);
    }
}
