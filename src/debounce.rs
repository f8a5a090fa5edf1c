use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

#[derive(Debug)]
struct Pending<T> {
    ticket: u64,
    deadline: Instant,
    value: T,
}

/// Holds back a value until `delay` has passed without a newer one.
///
/// Time is passed in by the caller; the UI schedules a sleep for
/// [`Debouncer::delay`] carrying the ticket and calls [`Debouncer::fire`]
/// when it wakes.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    next_ticket: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_ticket: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value.
    pub fn push(&mut self, value: T, now: Instant) -> DebounceTicket {
        self.next_ticket += 1;
        self.pending = Some(Pending {
            ticket: self.next_ticket,
            deadline: now + self.delay,
            value,
        });
        DebounceTicket(self.next_ticket)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Releases the pending value if `ticket` is the latest and its deadline has passed.
    pub fn fire(&mut self, ticket: DebounceTicket, now: Instant) -> Option<T> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| p.ticket == ticket.0 && now >= p.deadline);
        if !ready {
            return None;
        }
        self.pending.take().map(|p| p.value)
    }
}
