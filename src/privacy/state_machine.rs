// Request status transitions. A request leaves pending exactly once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{PrivacyRequest, RequestStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestEvent {
    /// Subject presented a valid token in time
    Confirm,
    /// Token window elapsed
    Invalidate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition with event {event:?}: request is {status}, not pending")]
    NotPending {
        event: RequestEvent,
        status: RequestStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub previous: RequestStatus,
    pub next: RequestStatus,
}

/// Target status for `event` applied to `current`.
pub fn next_status(current: RequestStatus, event: RequestEvent) -> Result<RequestStatus, TransitionError> {
    match (current, event) {
        (RequestStatus::Pending, RequestEvent::Confirm) => Ok(RequestStatus::Confirmed),
        (RequestStatus::Pending, RequestEvent::Invalidate) => Ok(RequestStatus::Invalidated),
        (status, event) => Err(TransitionError::NotPending { event, status }),
    }
}

impl PrivacyRequest {
    /// Apply `event`, mutating the status only when the transition is legal.
    pub fn apply(&mut self, event: RequestEvent) -> Result<StatusTransition, TransitionError> {
        let previous = self.status;
        let next = next_status(previous, event)?;
        self.status = next;

        tracing::debug!(
            request_id = ?self.id,
            from = %previous,
            to = %next,
            "Request status transition"
        );

        Ok(StatusTransition { previous, next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::types::RequestType;
    use chrono::Utc;

    fn request(status: RequestStatus) -> PrivacyRequest {
        PrivacyRequest {
            id: Some(9),
            email: "a@example.com".to_string(),
            request_type: RequestType::Remove,
            status,
            requested_at: Utc::now(),
            confirm_token: Some("hash".to_string()),
            confirm_token_created_at: Some(Utc::now()),
        }
    }

    #[test]
    fn test_pending_transitions() {
        let mut confirmed = request(RequestStatus::Pending);
        let transition = confirmed.apply(RequestEvent::Confirm).unwrap();
        assert_eq!(transition.previous, RequestStatus::Pending);
        assert_eq!(confirmed.status, RequestStatus::Confirmed);

        let mut invalidated = request(RequestStatus::Pending);
        invalidated.apply(RequestEvent::Invalidate).unwrap();
        assert_eq!(invalidated.status, RequestStatus::Invalidated);
    }

    #[test]
    fn test_terminal_states_reject_every_event() {
        for status in [
            RequestStatus::Confirmed,
            RequestStatus::Invalidated,
            RequestStatus::Completed,
        ] {
            for event in [RequestEvent::Confirm, RequestEvent::Invalidate] {
                let mut req = request(status);
                let err = req.apply(event).unwrap_err();
                assert_eq!(err, TransitionError::NotPending { event, status });
                assert_eq!(req.status, status, "status must not change on rejection");
            }
        }
    }
}
