//! Read/write decisions for owned resources.
//!
//! Blog posts and diary entries both have a single owner and a visibility.
//! The owner and the site owner may always read and write; everyone else may
//! only read, and only when the resource is public.

use crate::error::{PfError, PfResult};
use crate::identity::Identity;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Visibility {
    Public,
    Private,
    Draft,
}

/// A resource with exactly one owner.
pub trait Owned {
    fn owner(&self) -> &Identity;
    fn visibility(&self) -> Visibility;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Access {
    pub can_read: bool,
    pub can_write: bool,
}

/// Resolve what `requester` may do with `resource`.
///
/// `site_owner` is whoever gets the universal override for this kind of resource.
/// Absent identities never grant anything.
pub fn can_access(
    resource: &impl Owned,
    requester: Option<&Identity>,
    site_owner: Option<&Identity>,
) -> Access {
    let privileged = match requester {
        Some(requester) => {
            requester.matches(resource.owner())
                || site_owner.map_or(false, |site_owner| requester.matches(site_owner))
        }
        None => false,
    };

    match resource.visibility() {
        Visibility::Public => Access {
            can_read: true,
            can_write: privileged,
        },
        Visibility::Private | Visibility::Draft => Access {
            can_read: privileged,
            can_write: privileged,
        },
    }
}

impl Access {
    pub fn read_or_deny(self, requester: Option<&Identity>) -> PfResult<()> {
        if self.can_read {
            Ok(())
        } else {
            Err(deny(requester))
        }
    }

    pub fn write_or_deny(self, requester: Option<&Identity>) -> PfResult<()> {
        if self.can_write {
            Ok(())
        } else {
            Err(deny(requester))
        }
    }
}

fn deny(requester: Option<&Identity>) -> PfError {
    match requester {
        None => PfError::Unauthorized,
        Some(_) => PfError::Forbidden,
    }
}

/// Guard for operations reserved to the configured site owner.
pub fn site_owner_or_deny(requester: &Identity, site_owner: &Identity) -> PfResult<()> {
    if requester.matches(site_owner) {
        Ok(())
    } else {
        Err(PfError::Forbidden)
    }
}
