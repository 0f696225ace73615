//! Ownership policy shared by every resource operation.
//!
//! A caller may act on a page only if their resolved identity equals the
//! page's owner id, and on a charm only if it equals the owner of the charm's
//! persisted parent page. Absent resources and foreign resources fail the
//! same way ([`ResourceError::NotFound`]) so non-owners learn nothing about
//! existence. Public reads skip the owner check but still require the
//! visibility flag ([`ResourceError::Forbidden`] otherwise).

pub mod errors;

pub use errors::{ResourceError, ResourceResult};

use crate::auth::Identity;
use crate::pages::Page;

/// Whether `caller` owns a resource owned by `owner_id`
pub fn authorize(caller: &Identity, owner_id: &str) -> bool {
    caller.user_id == owner_id
}

/// Require ownership of a resource whose owner lookup may have come back empty
pub fn require_owner(caller: &Identity, owner_id: Option<&str>) -> ResourceResult<()> {
    match owner_id {
        Some(owner_id) if authorize(caller, owner_id) => Ok(()),
        Some(_) => {
            tracing::warn!(
                event_type = "ownership_denied",
                user_id = %caller.user_id,
                "Caller does not own resource"
            );
            Err(ResourceError::NotFound)
        }
        None => Err(ResourceError::NotFound),
    }
}

/// Map the row count of an owner-filtered mutation onto the policy outcome
pub fn require_affected(rows: u64) -> ResourceResult<()> {
    if rows == 0 {
        Err(ResourceError::NotFound)
    } else {
        Ok(())
    }
}

/// Require the page to be flagged public
pub fn require_public(page: &Page) -> ResourceResult<()> {
    if page.is_public {
        Ok(())
    } else {
        Err(ResourceError::Forbidden)
    }
}
