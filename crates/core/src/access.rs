//! Access control for list operations.
//!
//! All "who may do what" rules are defined here and nowhere else. The gate is
//! pure: callers load the list themselves and pass it in.
//!
//! Rules are evaluated in a fixed order and the first failure wins:
//!
//! 1. authentication - the caller must carry an identity
//! 2. profile - the caller must hold one of [`Profile::LIST_USERS`]
//! 3. relationship - owner or member, depending on the [`Operation`]
//!
//! Rules 1 and 2 do not need the list, so [`admit`] runs them on their own
//! before anything is loaded. [`check`] runs all three.

use crate::list::ShoppingList;
use crate::types::{Identity, Profile};

/// Who is making a request, as reported by the transport layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    identity: Option<Identity>,
    profiles: Vec<Profile>,
}

impl Caller {
    #[must_use]
    pub fn new(identity: Option<Identity>, profiles: impl IntoIterator<Item = Profile>) -> Self {
        let mut profiles: Vec<Profile> = profiles.into_iter().collect();
        profiles.sort_unstable();
        profiles.dedup();
        Self { identity, profiles }
    }

    /// A caller with no identity and no profiles.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }
}

/// An operation on an existing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    Read,
    Rename,
    Archive,
    Unarchive,
    Delete,
    AddMember(&'a Identity),
    RemoveMember(&'a Identity),
    Leave,
    MutateItems,
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error("user not authenticated")]
    Unauthenticated,
    #[error("user not authorized")]
    Unauthorized,
    #[error("only the owner can perform this operation")]
    NotOwner,
    #[error("user is not a member of this list")]
    NotMember,
    #[error("owner cannot leave the list")]
    OwnerCannotLeave,
    #[error("member already exists")]
    AlreadyMember,
    #[error("cannot remove owner")]
    CannotRemoveOwner,
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Convert into a `Result` for use with `?`.
    ///
    /// # Errors
    ///
    /// Returns the [`Denial`] when access is denied.
    pub const fn into_result(self) -> Result<(), Denial> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason),
        }
    }
}

/// Authenticate and check profiles. Returns the caller's identity.
///
/// # Errors
///
/// Returns [`Denial::Unauthenticated`] when there is no identity and
/// [`Denial::Unauthorized`] when no required profile is held.
pub fn admit(caller: &Caller) -> Result<&Identity, Denial> {
    let identity = caller.identity().ok_or(Denial::Unauthenticated)?;
    let authorized = caller
        .profiles()
        .iter()
        .any(|p| Profile::LIST_USERS.contains(p));
    if !authorized {
        return Err(Denial::Unauthorized);
    }
    Ok(identity)
}

/// Decide whether `caller` may perform `operation` on `list`.
#[must_use]
pub fn check(caller: &Caller, list: &ShoppingList, operation: Operation<'_>) -> Decision {
    let identity = match admit(caller) {
        Ok(identity) => identity,
        Err(reason) => return Decision::Deny(reason),
    };
    match relationship(identity, list, operation) {
        Ok(()) => Decision::Allow,
        Err(reason) => Decision::Deny(reason),
    }
}

fn relationship(
    identity: &Identity,
    list: &ShoppingList,
    operation: Operation<'_>,
) -> Result<(), Denial> {
    let owner = list.is_owner(identity);
    match operation {
        Operation::Read | Operation::MutateItems => {
            if owner || list.is_member(identity) {
                Ok(())
            } else {
                Err(Denial::NotMember)
            }
        }
        Operation::Rename | Operation::Archive | Operation::Unarchive | Operation::Delete => {
            require_owner(owner)
        }
        Operation::AddMember(target) => {
            require_owner(owner)?;
            if list.is_member(target) {
                return Err(Denial::AlreadyMember);
            }
            Ok(())
        }
        Operation::RemoveMember(target) => {
            require_owner(owner)?;
            if list.is_owner(target) {
                return Err(Denial::CannotRemoveOwner);
            }
            Ok(())
        }
        Operation::Leave => {
            if owner {
                Err(Denial::OwnerCannotLeave)
            } else if list.is_member(identity) {
                Ok(())
            } else {
                Err(Denial::NotMember)
            }
        }
    }
}

const fn require_owner(owner: bool) -> Result<(), Denial> {
    if owner { Ok(()) } else { Err(Denial::NotOwner) }
}
