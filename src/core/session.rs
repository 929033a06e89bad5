//! Per-view request bookkeeping.
//!
//! Every request takes a ticket from a monotonic counter. Only the newest
//! ticket may publish: a response that arrives after a newer selection was
//! made is dropped instead of overwriting the newer data.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    key: String,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Selection the request was issued for (state code or candidate id).
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    Loading { key: String },
    Ready { key: String },
    Failed { key: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug)]
pub struct ViewSession<T> {
    next_seq: u64,
    latest: Option<u64>,
    status: ViewStatus,
    data: Option<T>,
}

impl<T> Default for ViewSession<T> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            latest: None,
            status: ViewStatus::Idle,
            data: None,
        }
    }
}

impl<T> ViewSession<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, key: &str) -> Ticket {
        self.next_seq += 1;
        self.latest = Some(self.next_seq);
        self.status = ViewStatus::Loading {
            key: key.to_string(),
        };
        tracing::debug!("Request #{} issued for '{}'", self.next_seq, key);
        Ticket {
            seq: self.next_seq,
            key: key.to_string(),
        }
    }

    /// Publish the outcome of a request.
    ///
    /// Success replaces the data wholesale. Failure records the error and keeps
    /// the previous data. Outdated tickets change nothing.
    pub fn complete<E: fmt::Display>(&mut self, ticket: Ticket, outcome: Result<T, E>) -> Completion {
        if self.latest != Some(ticket.seq) {
            tracing::info!(
                "Dropping stale response #{} for '{}' (latest is #{})",
                ticket.seq,
                ticket.key,
                self.latest.unwrap_or_default()
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.status = ViewStatus::Ready { key: ticket.key };
                Completion::Applied
            }
            Err(e) => {
                self.status = ViewStatus::Failed {
                    key: ticket.key,
                    message: e.to_string(),
                };
                Completion::Failed
            }
        }
    }

    /// [`complete`](Self::complete), handing a failure back to the caller when it
    /// was published. A stale failure is `Ok(Completion::Stale)`.
    pub fn settle<E: fmt::Display>(&mut self, ticket: Ticket, outcome: Result<T, E>) -> Result<Completion, E> {
        match outcome {
            Ok(data) => Ok(self.complete::<E>(ticket, Ok(data))),
            Err(e) => match self.complete(ticket, Err::<T, _>(&e)) {
                Completion::Stale => Ok(Completion::Stale),
                _ => Err(e),
            },
        }
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, ViewStatus::Loading { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_replaces_data() {
        let mut session: ViewSession<Vec<&str>> = ViewSession::new();
        let t = session.begin("CA");
        assert!(session.is_loading());
        assert_eq!(session.complete::<String>(t, Ok(vec!["Pelosi"])), Completion::Applied);
        let t = session.begin("NY");
        session.complete::<String>(t, Ok(vec!["Schumer", "Gillibrand"]));
        assert_eq!(session.data().unwrap(), &vec!["Schumer", "Gillibrand"]);
        assert_eq!(session.status(), &ViewStatus::Ready { key: "NY".into() });
    }

    #[test]
    fn test_failure_keeps_previous_data() {
        let mut session: ViewSession<u32> = ViewSession::new();
        let t = session.begin("CA");
        session.complete::<String>(t, Ok(1));
        let t = session.begin("TX");
        assert_eq!(session.complete(t, Err("malformed")), Completion::Failed);
        assert_eq!(session.data(), Some(&1));
        assert!(matches!(session.status(), ViewStatus::Failed { key, .. } if key == "TX"));
    }

    #[test]
    fn test_late_response_is_discarded() {
        let mut session: ViewSession<&str> = ViewSession::new();
        let old = session.begin("CA");
        let new = session.begin("NY");
        assert_eq!(session.complete::<String>(new, Ok("new york")), Completion::Applied);
        assert_eq!(session.complete::<String>(old, Ok("california")), Completion::Stale);
        assert_eq!(session.data(), Some(&"new york"));
        assert_eq!(session.status(), &ViewStatus::Ready { key: "NY".into() });
    }

    #[test]
    fn test_settle_returns_only_current_failures() {
        let mut session: ViewSession<&str> = ViewSession::new();
        let old = session.begin("CA");
        let new = session.begin("NY");
        assert_eq!(session.settle(old, Err("timeout")), Ok(Completion::Stale));
        assert_eq!(session.status(), &ViewStatus::Loading { key: "NY".into() });
        assert_eq!(session.settle(new, Err("timeout")), Err("timeout"));
        assert!(matches!(session.status(), ViewStatus::Failed { key, .. } if key == "NY"));
    }

    #[test]
    fn test_tickets_are_monotonic() {
        let mut session: ViewSession<()> = ViewSession::new();
        let a = session.begin("CA");
        let b = session.begin("CA");
        assert!(b.seq() > a.seq());
        assert_eq!(b.key(), "CA");
    }
}
