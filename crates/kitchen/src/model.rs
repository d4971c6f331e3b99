//! Kitchen tickets and their lifecycle.

use chrono::{DateTime, Utc};
use common::OrderId;
use bus::event::LineSnapshot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{KitchenError, Result};

/// Unique identifier for a kitchen ticket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticket lifecycle state. Transitions only move forward; DONE is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    New,
    InProgress,
    Done,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TicketStatus::New => "NEW",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Done => "DONE",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(TicketStatus::New),
            "IN_PROGRESS" => Ok(TicketStatus::InProgress),
            "DONE" => Ok(TicketStatus::Done),
            other => Err(format!("unknown ticket status: {other}")),
        }
    }
}

/// One unit of kitchen work, carrying a snapshot of the order's lines so
/// the kitchen never has to call back into order storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenTicket {
    pub ticket_id: TicketId,
    pub order_id: OrderId,
    pub status: TicketStatus,
    pub items: Vec<LineSnapshot>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl KitchenTicket {
    /// Creates a fresh NEW ticket for an order.
    pub fn new(order_id: OrderId, items: Vec<LineSnapshot>) -> Self {
        Self {
            ticket_id: TicketId::new(),
            order_id,
            status: TicketStatus::New,
            items,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Moves the ticket to IN_PROGRESS, stamping `started_at` once.
    ///
    /// Starting an already started ticket is a no-op; starting a DONE
    /// ticket is a conflict.
    pub fn start(&mut self) -> Result<()> {
        match self.status {
            TicketStatus::New => {
                self.status = TicketStatus::InProgress;
                self.started_at = Some(Utc::now());
                Ok(())
            }
            TicketStatus::InProgress => Ok(()),
            TicketStatus::Done => Err(KitchenError::AlreadyCompleted(self.order_id)),
        }
    }

    /// Moves the ticket to DONE, stamping `completed_at`.
    ///
    /// Completing a NEW ticket implies the start: `started_at` is stamped
    /// too. Completing a DONE ticket is a conflict.
    pub fn complete(&mut self) -> Result<()> {
        match self.status {
            TicketStatus::Done => Err(KitchenError::AlreadyCompleted(self.order_id)),
            TicketStatus::New | TicketStatus::InProgress => {
                let now = Utc::now();
                if self.started_at.is_none() {
                    self.started_at = Some(now);
                }
                self.status = TicketStatus::Done;
                self.completed_at = Some(now);
                Ok(())
            }
        }
    }
}
