//! Advanced search filters
//!
//! Predicates accumulated on a principal and rendered to an LDAP filter
//! string (RFC 4515). Predicates in one collection are combined with AND.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directory::check_attribute_description;
use crate::error::{DirectoryError, DirectoryResult};
use crate::value::{to_generalized_time, ExtensionValue, ValueType};

/// Comparison applied by a filter predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
}

/// One clause of an advanced search filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    /// Attribute the predicate tests.
    pub attribute: String,
    /// Comparison value; `"*"` with equality tests presence.
    pub value: ExtensionValue,
    /// Declared type of the comparison value.
    pub value_type: ValueType,
    /// Comparison operator.
    pub match_type: MatchType,
}

impl FilterPredicate {
    pub fn new(
        attribute: impl Into<String>,
        value: impl Into<ExtensionValue>,
        value_type: ValueType,
        match_type: MatchType,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
            value_type,
            match_type,
        }
    }

    /// Whether this predicate is a presence test (`(a=*)` or its negation).
    pub fn is_presence(&self) -> bool {
        self.value.is_wildcard()
            && matches!(self.match_type, MatchType::Equals | MatchType::NotEquals)
    }

    /// Render this predicate as an LDAP filter string.
    pub fn to_ldap(&self) -> DirectoryResult<String> {
        validate_attribute_description(&self.attribute)?;
        let attr = &self.attribute;

        if self.is_presence() {
            return Ok(match self.match_type {
                MatchType::NotEquals => format!("(!({attr}=*))"),
                _ => format!("({attr}=*)"),
            });
        }

        let value = encode_filter_value(&self.value);
        Ok(match self.match_type {
            MatchType::Equals => format!("({attr}={value})"),
            MatchType::NotEquals => format!("(!({attr}={value}))"),
            MatchType::GreaterThanOrEquals => format!("({attr}>={value})"),
            MatchType::LessThanOrEquals => format!("({attr}<={value})"),
            // LDAP has no strict comparisons
            MatchType::GreaterThan => format!("(&({attr}>={value})(!({attr}={value})))"),
            MatchType::LessThan => format!("(&({attr}<={value})(!({attr}={value})))"),
        })
    }
}

/// Ordered collection of advanced filter predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedFilters {
    predicates: Vec<FilterPredicate>,
}

impl AdvancedFilters {
    /// Create an empty filter collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate.
    ///
    /// No validation or deduplication happens here; an identical predicate
    /// appended twice appears twice.
    pub fn advanced_filter_set(
        &mut self,
        attribute: impl Into<String>,
        value: impl Into<ExtensionValue>,
        value_type: ValueType,
        match_type: MatchType,
    ) {
        let predicate = FilterPredicate::new(attribute, value, value_type, match_type);
        debug!(
            attribute = %predicate.attribute,
            value = %predicate.value,
            value_type = %predicate.value_type,
            match_type = ?predicate.match_type,
            "Appended advanced filter predicate"
        );
        self.predicates.push(predicate);
    }

    /// All predicates in append order.
    pub fn predicates(&self) -> &[FilterPredicate] {
        &self.predicates
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterPredicate> {
        self.predicates.iter()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Render all predicates as one LDAP filter.
    ///
    /// Returns `None` for an empty collection, the bare predicate for one, and
    /// an AND of all predicates otherwise.
    pub fn to_ldap_filter(&self) -> DirectoryResult<Option<String>> {
        let clauses = self
            .predicates
            .iter()
            .map(FilterPredicate::to_ldap)
            .collect::<DirectoryResult<Vec<_>>>()?;

        Ok(match clauses.len() {
            0 => None,
            1 => clauses.into_iter().next(),
            _ => Some(format!("(&{})", clauses.join(""))),
        })
    }
}

impl<'a> IntoIterator for &'a AdvancedFilters {
    type Item = &'a FilterPredicate;
    type IntoIter = std::slice::Iter<'a, FilterPredicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates.iter()
    }
}

/// Escape special characters in LDAP filter values (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}

/// Hex-escape every byte (`\de\ad`).
fn escape_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("\\{b:02x}")).collect()
}

fn encode_filter_value(value: &ExtensionValue) -> String {
    match value {
        ExtensionValue::String(s) => escape_filter_value(s),
        ExtensionValue::Integer(i) => i.to_string(),
        ExtensionValue::Boolean(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
        ExtensionValue::Binary(bytes) => escape_bytes(bytes),
        ExtensionValue::DateTime(dt) => to_generalized_time(dt),
        // objectGUID is stored in mixed-endian layout
        ExtensionValue::Guid(guid) => escape_bytes(&guid.to_bytes_le()),
    }
}

/// Reject attribute names that would break out of a filter clause.
fn validate_attribute_description(attribute: &str) -> DirectoryResult<()> {
    check_attribute_description(attribute).map_err(|message| DirectoryError::InvalidFilter {
        message: format!("attribute '{attribute}': {message}"),
    })
}
