use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::{ExplorerError, ExplorerResult};

/// Tracks the latest submission for one page so late responses cannot overwrite newer ones.
///
/// Every submission takes a [`Ticket`]. When its response arrives, the result is only accepted if
/// no newer ticket was issued in the meantime.
///
/// ```
/// use batchscope::client::RequestSlot;
///
/// let slot = RequestSlot::new();
/// let first = slot.issue();
/// let second = slot.issue();
/// assert!(!slot.is_current(first));
/// assert!(slot.is_current(second));
/// ```
#[derive(Debug, Default)]
pub struct RequestSlot {
    latest: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { generation }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.generation
    }

    /// Pass `result` through if `ticket` is still the latest, otherwise report it as superseded.
    pub fn settle<T>(&self, ticket: Ticket, result: ExplorerResult<T>) -> ExplorerResult<T> {
        if self.is_current(ticket) {
            result
        } else {
            log::debug!("discarding response for superseded request #{}", ticket.generation);
            Err(ExplorerError::Superseded)
        }
    }

    /// Issue a ticket, await `request`, and settle its result.
    pub async fn run<T, F>(&self, request: F) -> ExplorerResult<T>
    where
        F: Future<Output = ExplorerResult<T>>,
    {
        let ticket = self.issue();
        let result = request.await;
        self.settle(ticket, result)
    }
}
