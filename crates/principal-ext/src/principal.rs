//! Extension user principal
//!
//! [`UserExtPrincipal`] wraps a directory entry and adds:
//!
//! - uniform get/set of extension attributes, single- or multi-valued;
//! - an advanced search filter builder with presence predicates
//!   ([`ExtAdvancedFilters`]), created on first access and kept for the
//!   lifetime of the principal.
//!
//! Every call goes straight to the wrapped entry. Nothing is cached, and
//! errors from the entry are returned unchanged.

use tracing::{debug, instrument, trace};

use crate::account::UserAccount;
use crate::context::PrincipalContext;
use crate::directory::{DirectoryObject, PrincipalStore};
use crate::error::DirectoryResult;
use crate::filter::{AdvancedFilters, FilterPredicate, MatchType};
use crate::value::{ExtensionValue, ValueType};

/// A user principal with extension attribute access.
#[derive(Debug)]
pub struct UserExtPrincipal<E: DirectoryObject> {
    entry: E,
    /// Created on first call to `advanced_search_filter`.
    ext_advanced_filters: Option<ExtAdvancedFilters>,
}

impl<E: DirectoryObject> UserExtPrincipal<E> {
    /// RDN attribute used when naming user entries.
    pub const RDN_PREFIX: &'static str = "CN";

    /// Structural object class of user entries.
    pub const OBJECT_CLASS: &'static str = "user";

    /// Wrap an existing directory entry.
    pub fn new(entry: E) -> Self {
        Self {
            entry,
            ext_advanced_filters: None,
        }
    }

    /// Create a new, unsaved principal in `context`.
    pub fn with_context<S>(store: &S, context: &PrincipalContext) -> DirectoryResult<Self>
    where
        S: PrincipalStore<Entry = E>,
    {
        Ok(Self::new(store.new_entry(context, None)?))
    }

    /// Create a new, unsaved principal seeded with an account name, password
    /// and enabled state.
    pub fn with_account<S>(
        store: &S,
        context: &PrincipalContext,
        account: UserAccount,
    ) -> DirectoryResult<Self>
    where
        S: PrincipalStore<Entry = E>,
    {
        Ok(Self::new(store.new_entry(context, Some(&account))?))
    }

    /// The wrapped entry.
    pub fn entry(&self) -> &E {
        &self.entry
    }

    pub fn entry_mut(&mut self) -> &mut E {
        &mut self.entry
    }

    /// Unwrap the entry, dropping the filter builder.
    pub fn into_entry(self) -> E {
        self.entry
    }

    pub fn distinguished_name(&self) -> Option<&str> {
        self.entry.distinguished_name()
    }

    /// Whether `attribute` currently holds more than one value.
    ///
    /// An attribute with no values is not multi-valued.
    pub fn is_attribute_multi(&self, attribute: &str) -> DirectoryResult<bool> {
        Ok(self.entry.extension_get(attribute)?.len() > 1)
    }

    /// Read a single-valued attribute.
    ///
    /// Returns `Some` only when the attribute holds exactly one value. Both an
    /// absent attribute and a multi-valued one return `None`; use
    /// [`is_attribute_multi`](Self::is_attribute_multi) or
    /// [`attribute_get_multi`](Self::attribute_get_multi) to tell them apart.
    pub fn attribute_get(&self, attribute: &str) -> DirectoryResult<Option<ExtensionValue>> {
        let mut values = self.entry.extension_get(attribute)?;
        trace!(attribute = %attribute, count = values.len(), "Read extension attribute");
        if values.len() == 1 {
            Ok(values.pop())
        } else {
            Ok(None)
        }
    }

    /// Read every value of `attribute`, in store order. May be empty.
    pub fn attribute_get_multi(&self, attribute: &str) -> DirectoryResult<Vec<ExtensionValue>> {
        let values = self.entry.extension_get(attribute)?;
        trace!(attribute = %attribute, count = values.len(), "Read extension attribute values");
        Ok(values)
    }

    /// Write a single value to `attribute`.
    ///
    /// The change is staged on the entry; saving it is up to the store.
    #[instrument(skip(self, value), fields(dn = ?self.entry.distinguished_name()))]
    pub fn attribute_set(
        &mut self,
        attribute: &str,
        value: impl Into<ExtensionValue>,
    ) -> DirectoryResult<()> {
        self.entry.extension_set(attribute, vec![value.into()])?;
        debug!(attribute = %attribute, "Set extension attribute");
        Ok(())
    }

    /// Write several values to `attribute`, replacing any existing ones.
    #[instrument(skip(self, values), fields(dn = ?self.entry.distinguished_name()))]
    pub fn attribute_set_multi<I, V>(&mut self, attribute: &str, values: I) -> DirectoryResult<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<ExtensionValue>,
    {
        let values: Vec<ExtensionValue> = values.into_iter().map(Into::into).collect();
        let count = values.len();
        self.entry.extension_set(attribute, values)?;
        debug!(attribute = %attribute, count, "Set multi-valued extension attribute");
        Ok(())
    }

    /// Remove all values of `attribute`.
    #[instrument(skip(self), fields(dn = ?self.entry.distinguished_name()))]
    pub fn attribute_clear(&mut self, attribute: &str) -> DirectoryResult<()> {
        self.entry.extension_set(attribute, Vec::new())?;
        debug!(attribute = %attribute, "Cleared extension attribute");
        Ok(())
    }

    /// The principal's advanced search filter, created on first access.
    ///
    /// Every call returns the same builder; predicates accumulate across calls
    /// and are never reset.
    pub fn advanced_search_filter(&mut self) -> &mut ExtAdvancedFilters {
        self.ext_advanced_filters
            .get_or_insert_with(ExtAdvancedFilters::new)
    }

    /// The filter builder if it has been created, without creating it.
    pub fn search_filter(&self) -> Option<&ExtAdvancedFilters> {
        self.ext_advanced_filters.as_ref()
    }

    /// LDAP filter selecting user entries that match the accumulated
    /// predicates, e.g. `(&(objectClass=user)(employeeID=*))`.
    pub fn query_filter(&self) -> DirectoryResult<String> {
        let class_clause = format!("(objectClass={})", Self::OBJECT_CLASS);
        let predicates = match &self.ext_advanced_filters {
            Some(filters) => filters.to_ldap_filter()?,
            None => None,
        };

        Ok(match predicates {
            Some(clause) if clause.starts_with("(&") => {
                // flatten into a single conjunction
                format!("(&{}{}", class_clause, &clause[2..])
            }
            Some(clause) => format!("(&{class_clause}{clause})"),
            None => class_clause,
        })
    }
}

/// Advanced filters with presence predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtAdvancedFilters {
    filters: AdvancedFilters,
}

impl ExtAdvancedFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match entries where `attribute` has any value: `(attribute=*)`.
    pub fn is_present(&mut self, attribute: &str) {
        self.is_present_typed(attribute, ValueType::String);
    }

    /// [`is_present`](Self::is_present) with an explicit value type.
    pub fn is_present_typed(&mut self, attribute: &str, value_type: ValueType) {
        self.filters
            .advanced_filter_set(attribute, "*", value_type, MatchType::Equals);
    }

    /// Match entries where `attribute` has no value: `(!(attribute=*))`.
    pub fn is_not_present(&mut self, attribute: &str) {
        self.is_not_present_typed(attribute, ValueType::String);
    }

    /// [`is_not_present`](Self::is_not_present) with an explicit value type.
    pub fn is_not_present_typed(&mut self, attribute: &str, value_type: ValueType) {
        self.filters
            .advanced_filter_set(attribute, "*", value_type, MatchType::NotEquals);
    }

    /// Append an arbitrary predicate to the underlying collection.
    pub fn advanced_filter_set(
        &mut self,
        attribute: &str,
        value: impl Into<ExtensionValue>,
        value_type: ValueType,
        match_type: MatchType,
    ) {
        self.filters
            .advanced_filter_set(attribute, value, value_type, match_type);
    }

    pub fn predicates(&self) -> &[FilterPredicate] {
        self.filters.predicates()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Render the accumulated predicates; see [`AdvancedFilters::to_ldap_filter`].
    pub fn to_ldap_filter(&self) -> DirectoryResult<Option<String>> {
        self.filters.to_ldap_filter()
    }
}

impl AsRef<AdvancedFilters> for ExtAdvancedFilters {
    fn as_ref(&self) -> &AdvancedFilters {
        &self.filters
    }
}

impl From<ExtAdvancedFilters> for AdvancedFilters {
    fn from(ext: ExtAdvancedFilters) -> Self {
        ext.filters
    }
}
