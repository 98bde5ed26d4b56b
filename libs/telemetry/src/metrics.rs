use metrics::counter;

const MESSAGES_SENT: &str = "relay_messages_sent_total";
const SESSION_EVENTS: &str = "relay_session_events_total";

/// Outcome label for `relay_messages_sent_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Success,
    Unregistered,
    Failed,
}

impl SendOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendOutcome::Success => "success",
            SendOutcome::Unregistered => "unregistered",
            SendOutcome::Failed => "failed",
        }
    }
}

pub fn record_send(outcome: SendOutcome) {
    counter!(MESSAGES_SENT, "outcome" => outcome.as_str()).increment(1);
}

pub fn record_session_event(kind: &'static str) {
    counter!(SESSION_EVENTS, "kind" => kind).increment(1);
}
