//! Per-controller fetch state.
//!
//! Every screen owns one or more [`Request`]s. Starting a fetch hands out a
//! [`Ticket`] stamped with a fresh generation; the response is only applied
//! if its ticket is still the latest one issued, so a slow response can never
//! overwrite the result of a newer request or land on a screen that has
//! since been left.

use tracing::debug;

use crate::media::ApiError;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Remote<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Remote<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Remote::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Request<T> {
    state: Remote<T>,
    generation: u64,
}

impl<T> Default for Request<T> {
    fn default() -> Self {
        Self {
            state: Remote::Idle,
            generation: 0,
        }
    }
}

impl<T> Request<T> {
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.state = Remote::Loading;
        Ticket(self.generation)
    }

    /// Applies `result` if `ticket` is the latest issued. Returns whether it was applied.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<T, ApiError>) -> bool {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                latest = self.generation,
                "discarding stale response"
            );
            return false;
        }
        self.state = match result {
            Ok(value) => Remote::Ready(value),
            Err(error) => Remote::Failed(error.to_string()),
        };
        true
    }

    /// Back to `Idle`; responses for any outstanding ticket will be dropped.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = Remote::Idle;
    }

    pub fn state(&self) -> &Remote<T> {
        &self.state
    }

    pub fn ready(&self) -> Option<&T> {
        self.state.ready()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, Remote::Failed(_))
    }
}
