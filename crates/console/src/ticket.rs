//! Request tagging for stale-response detection.
//!
//! Every request a controller dispatches carries a [`Ticket`] naming the
//! selection it was issued for. Opening or closing a selection bumps a
//! generation counter, so a response for a superseded selection (even one
//! that was re-selected in the meantime) no longer matches and is dropped.

use heritage_core::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub target: DbId,
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    current: Option<DbId>,
    generation: u64,
}

impl Selection {
    pub fn current(&self) -> Option<DbId> {
        self.current
    }

    /// Start a new selection and return the ticket for its first request.
    pub fn open(&mut self, target: DbId) -> Ticket {
        self.generation += 1;
        self.current = Some(target);
        Ticket {
            target,
            generation: self.generation,
        }
    }

    /// Ticket for another request against the unchanged selection.
    pub fn ticket(&self) -> Option<Ticket> {
        self.current.map(|target| Ticket {
            target,
            generation: self.generation,
        })
    }

    pub fn close(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.current == Some(ticket.target) && self.generation == ticket.generation
    }
}
