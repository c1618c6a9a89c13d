//! Directory collaborator contract
//!
//! The principal layer decorates entries owned by a directory store. Stores
//! implement these traits; everything else in the crate is written against
//! them.

use crate::account::UserAccount;
use crate::context::PrincipalContext;
use crate::error::DirectoryResult;
use crate::value::ExtensionValue;

/// An addressable entry in a directory store.
///
/// Implementations own identity, persistence and save semantics. Extension
/// reads must reflect the entry's current state on every call.
pub trait DirectoryObject {
    /// Distinguished name, if the entry has one yet.
    fn distinguished_name(&self) -> Option<&str>;

    /// Read all raw values stored under `attribute`.
    ///
    /// An attribute with no values yields an empty vector, not an error.
    fn extension_get(&self, attribute: &str) -> DirectoryResult<Vec<ExtensionValue>>;

    /// Replace the values stored under `attribute`.
    ///
    /// An empty vector clears the attribute.
    fn extension_set(&mut self, attribute: &str, values: Vec<ExtensionValue>)
        -> DirectoryResult<()>;
}

/// Factory for new principal entries.
pub trait PrincipalStore {
    /// Entry type handed out by this store.
    type Entry: DirectoryObject;

    /// Construct a new, unsaved user entry within `context`.
    ///
    /// When `account` is given the entry is seeded with the account name,
    /// password and enabled state.
    fn new_entry(
        &self,
        context: &PrincipalContext,
        account: Option<&UserAccount>,
    ) -> DirectoryResult<Self::Entry>;
}

impl<T: DirectoryObject + ?Sized> DirectoryObject for Box<T> {
    fn distinguished_name(&self) -> Option<&str> {
        (**self).distinguished_name()
    }

    fn extension_get(&self, attribute: &str) -> DirectoryResult<Vec<ExtensionValue>> {
        (**self).extension_get(attribute)
    }

    fn extension_set(
        &mut self,
        attribute: &str,
        values: Vec<ExtensionValue>,
    ) -> DirectoryResult<()> {
        (**self).extension_set(attribute, values)
    }
}

/// Check an attribute description (RFC 4512): a name starting with a letter
/// or a numeric OID, optionally followed by `;option` tags.
///
/// Shared by entry access and filter rendering so both accept the same names.
pub(crate) fn check_attribute_description(attribute: &str) -> Result<(), &'static str> {
    let mut parts = attribute.split(';');
    let base = parts.next().unwrap_or_default();

    if base.is_empty() {
        return Err("attribute name cannot be empty");
    }

    let is_descr = base.starts_with(|c: char| c.is_ascii_alphabetic())
        && base.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    let is_oid = base
        .split('.')
        .all(|arc| !arc.is_empty() && arc.chars().all(|c| c.is_ascii_digit()));

    if !is_descr && !is_oid {
        return Err("must be a name starting with a letter or a numeric OID");
    }

    for option in parts {
        if option.is_empty() || !option.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("invalid attribute option");
        }
    }

    Ok(())
}
