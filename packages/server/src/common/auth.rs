//! Actor identity and role checks.
//!
//! Identity and role resolution happen upstream at the gateway; every
//! core call receives an explicit, already-verified `ActorContext` as a
//! parameter. No ambient "current user" lookup exists inside the core.

use serde::{Deserialize, Serialize};

use super::entity_ids::ActorId;
use super::error::Error;

/// Verified role of the acting party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Visitor,
    Organizer,
    Staff,
}

impl Role {
    /// Parse a role header value. Unknown values are rejected upstream of
    /// any mutation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visitor" => Some(Role::Visitor),
            "organizer" => Some(Role::Organizer),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

/// Actions gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create a reservation that is confirmed from the start.
    DirectConfirm,
    /// Reserve venue time slots.
    BookVenue,
    /// Cancel reservations owned by other actors.
    CancelAny,
    /// Browse the full reservation ledger.
    BrowseLedger,
}

/// The acting party of one request: verified identity plus role.
#[derive(Debug, Clone, Copy)]
pub struct ActorContext {
    pub actor_id: ActorId,
    pub role: Role,
}

impl ActorContext {
    pub fn new(actor_id: ActorId, role: Role) -> Self {
        Self { actor_id, role }
    }

    /// Whether this actor may perform the given action.
    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::BookVenue => matches!(self.role, Role::Organizer | Role::Staff),
            Capability::DirectConfirm | Capability::CancelAny | Capability::BrowseLedger => {
                self.role == Role::Staff
            }
        }
    }

    /// Check a capability, failing with `Error::Forbidden` otherwise.
    pub fn require(&self, capability: Capability) -> Result<(), Error> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "role {:?} may not perform {:?}",
                self.role, capability
            )))
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_holds_every_capability() {
        let staff = ActorContext::new(ActorId::new(), Role::Staff);
        assert!(staff.can(Capability::DirectConfirm));
        assert!(staff.can(Capability::BookVenue));
        assert!(staff.can(Capability::CancelAny));
        assert!(staff.can(Capability::BrowseLedger));
    }

    #[test]
    fn organizer_books_venues_but_cannot_direct_confirm() {
        let organizer = ActorContext::new(ActorId::new(), Role::Organizer);
        assert!(organizer.can(Capability::BookVenue));
        assert!(!organizer.can(Capability::DirectConfirm));
        assert!(organizer.require(Capability::DirectConfirm).is_err());
    }

    #[test]
    fn visitor_is_unprivileged() {
        let visitor = ActorContext::new(ActorId::new(), Role::Visitor);
        assert!(!visitor.can(Capability::BookVenue));
        assert!(matches!(
            visitor.require(Capability::BookVenue),
            Err(Error::Forbidden(_))
        ));
    }
}
