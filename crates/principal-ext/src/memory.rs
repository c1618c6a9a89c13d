//! In-memory directory store
//!
//! A self-contained [`PrincipalStore`] / [`DirectoryObject`] implementation
//! that behaves like a directory entry would: attribute names are
//! case-insensitive and syntax-checked, operational attributes are read-only,
//! duplicate values are rejected, and writes are staged until the caller
//! accepts them.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::account::{build_user_dn, encode_unicode_pwd, UserAccount};
use crate::context::PrincipalContext;
use crate::directory::{check_attribute_description, DirectoryObject, PrincipalStore};
use crate::error::{DirectoryError, DirectoryResult};
use crate::value::ExtensionValue;

/// Attributes maintained by the directory itself.
const DEFAULT_READ_ONLY_ATTRIBUTES: &[&str] = &[
    "objectGUID",
    "objectSid",
    "distinguishedName",
    "whenCreated",
    "whenChanged",
];

/// Object classes of a new user entry.
const USER_OBJECT_CLASSES: &[&str] = &["top", "person", "organizationalPerson", "user"];

/// Store that hands out [`MemoryEntry`] values.
#[derive(Debug, Clone)]
pub struct MemoryDirectory {
    read_only_attributes: BTreeSet<String>,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self {
            read_only_attributes: default_read_only(),
        }
    }
}

fn default_read_only() -> BTreeSet<String> {
    DEFAULT_READ_ONLY_ATTRIBUTES
        .iter()
        .map(|name| name.to_ascii_lowercase())
        .collect()
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an additional attribute as read-only on entries from this store.
    pub fn with_read_only_attribute(mut self, attribute: &str) -> Self {
        self.read_only_attributes
            .insert(attribute.to_ascii_lowercase());
        self
    }
}

impl PrincipalStore for MemoryDirectory {
    type Entry = MemoryEntry;

    #[instrument(skip(self))]
    fn new_entry(
        &self,
        context: &PrincipalContext,
        account: Option<&UserAccount>,
    ) -> DirectoryResult<MemoryEntry> {
        context.validate()?;

        let mut entry = MemoryEntry {
            read_only: self.read_only_attributes.clone(),
            ..MemoryEntry::default()
        };
        entry.stage(
            "objectClass",
            USER_OBJECT_CLASSES
                .iter()
                .map(|class| ExtensionValue::from(*class))
                .collect(),
        );

        let Some(account) = account else {
            debug!("Created unnamed user entry");
            return Ok(entry);
        };

        account.validate()?;

        if let Some(container) = context.container_dn() {
            entry.dn = Some(build_user_dn(&account.sam_account_name, &container)?);
        }

        entry.stage(
            "sAMAccountName",
            vec![account.sam_account_name.as_str().into()],
        );
        entry.stage(
            "userAccountControl",
            vec![account.user_account_control().into()],
        );
        entry.stage(
            "unicodePwd",
            vec![encode_unicode_pwd(&account.password)?.into()],
        );
        entry.seed("objectGUID", vec![Uuid::new_v4().into()]);

        debug!(
            dn = ?entry.dn,
            sam_account_name = %account.sam_account_name,
            enabled = account.enabled,
            "Created user entry"
        );

        Ok(entry)
    }
}

/// A directory entry held in memory.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    dn: Option<String>,
    /// Keyed by lower-cased attribute name.
    attributes: BTreeMap<String, Vec<ExtensionValue>>,
    read_only: BTreeSet<String>,
    pending: BTreeSet<String>,
}

impl Default for MemoryEntry {
    fn default() -> Self {
        Self {
            dn: None,
            attributes: BTreeMap::new(),
            read_only: default_read_only(),
            pending: BTreeSet::new(),
        }
    }
}

impl MemoryEntry {
    /// Create an empty entry with a DN.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: Some(dn.into()),
            ..Self::default()
        }
    }

    /// Load existing values without staging a change.
    pub fn with_values<I, V>(mut self, attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ExtensionValue>,
    {
        self.seed(attribute, values.into_iter().map(Into::into).collect());
        self
    }

    /// Refuse writes to `attribute`.
    pub fn with_read_only(mut self, attribute: &str) -> Self {
        self.read_only.insert(attribute.to_ascii_lowercase());
        self
    }

    /// Whether any write is waiting to be saved.
    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Lower-cased names of attributes written since the last save.
    pub fn pending_changes(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    /// Mark all staged writes as saved.
    pub fn accept_changes(&mut self) {
        self.pending.clear();
    }

    /// Lower-cased names of attributes that currently hold values.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    fn seed(&mut self, attribute: &str, values: Vec<ExtensionValue>) {
        let key = attribute.to_ascii_lowercase();
        if values.is_empty() {
            self.attributes.remove(&key);
        } else {
            self.attributes.insert(key, values);
        }
    }

    fn stage(&mut self, attribute: &str, values: Vec<ExtensionValue>) {
        self.seed(attribute, values);
        self.pending.insert(attribute.to_ascii_lowercase());
    }
}

impl DirectoryObject for MemoryEntry {
    fn distinguished_name(&self) -> Option<&str> {
        self.dn.as_deref()
    }

    fn extension_get(&self, attribute: &str) -> DirectoryResult<Vec<ExtensionValue>> {
        validate_attribute_name(attribute)?;
        Ok(self
            .attributes
            .get(&attribute.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    fn extension_set(
        &mut self,
        attribute: &str,
        values: Vec<ExtensionValue>,
    ) -> DirectoryResult<()> {
        validate_attribute_name(attribute)?;

        let key = attribute.to_ascii_lowercase();
        if self.read_only.contains(&key) {
            warn!(attribute = %attribute, "Rejected write to read-only attribute");
            return Err(DirectoryError::constraint_violation(
                attribute,
                "attribute is maintained by the directory and cannot be modified",
            ));
        }

        for (i, value) in values.iter().enumerate() {
            if values[..i].contains(value) {
                return Err(DirectoryError::constraint_violation(
                    attribute,
                    format!("duplicate value '{value}'"),
                ));
            }
        }

        self.stage(attribute, values);
        Ok(())
    }
}

fn validate_attribute_name(attribute: &str) -> DirectoryResult<()> {
    check_attribute_description(attribute).map_err(|message| {
        DirectoryError::InvalidAttributeSyntax {
            attribute: attribute.to_string(),
            message: message.to_string(),
        }
    })
}
