//! Integration tests for UserExtPrincipal.
//!
//! Exercises attribute access and presence filters against the in-memory
//! store, plus stores that fail or count calls.

mod common;

use std::cell::Cell;

use common::{init_test_logging, principal_with, test_context};
use principal_ext::prelude::*;

// =============================================================================
// Test Helpers
// =============================================================================

/// Store whose server is never reachable.
struct OfflineEntry;

impl DirectoryObject for OfflineEntry {
    fn distinguished_name(&self) -> Option<&str> {
        Some("CN=offline,DC=example,DC=com")
    }

    fn extension_get(&self, _attribute: &str) -> DirectoryResult<Vec<ExtensionValue>> {
        Err(DirectoryError::server_down("dc01.example.com:389 unreachable"))
    }

    fn extension_set(
        &mut self,
        _attribute: &str,
        _values: Vec<ExtensionValue>,
    ) -> DirectoryResult<()> {
        Err(DirectoryError::InvalidCredentials)
    }
}

/// Wraps an entry and counts reads.
struct CountingEntry {
    inner: MemoryEntry,
    reads: Cell<usize>,
}

impl DirectoryObject for CountingEntry {
    fn distinguished_name(&self) -> Option<&str> {
        self.inner.distinguished_name()
    }

    fn extension_get(&self, attribute: &str) -> DirectoryResult<Vec<ExtensionValue>> {
        self.reads.set(self.reads.get() + 1);
        self.inner.extension_get(attribute)
    }

    fn extension_set(
        &mut self,
        attribute: &str,
        values: Vec<ExtensionValue>,
    ) -> DirectoryResult<()> {
        self.inner.extension_set(attribute, values)
    }
}

// =============================================================================
// Attribute Access
// =============================================================================

#[test]
fn test_absent_attribute() {
    let p = principal_with("mail", vec!["jdoe@example.com".into()]);

    assert!(!p.is_attribute_multi("employeeID").unwrap());
    assert_eq!(p.attribute_get("employeeID").unwrap(), None);
    assert!(p.attribute_get_multi("employeeID").unwrap().is_empty());
}

#[test]
fn test_single_valued_attribute() {
    let p = principal_with("employeeID", vec!["E1234".into()]);

    assert!(!p.is_attribute_multi("employeeID").unwrap());
    assert_eq!(
        p.attribute_get("employeeID").unwrap(),
        Some(ExtensionValue::from("E1234"))
    );
    assert_eq!(
        p.attribute_get_multi("employeeID").unwrap(),
        vec![ExtensionValue::from("E1234")]
    );
}

#[test]
fn test_multi_valued_attribute() {
    let values: Vec<ExtensionValue> = vec![
        "jdoe@corp.example.com".into(),
        "john.doe@example.com".into(),
        "jd@example.com".into(),
    ];
    let p = principal_with("otherMailbox", values.clone());

    assert!(p.is_attribute_multi("otherMailbox").unwrap());
    // Multi-valued reads as absent through the single-value accessor
    assert_eq!(p.attribute_get("otherMailbox").unwrap(), None);
    assert_eq!(p.attribute_get_multi("otherMailbox").unwrap(), values);
}

#[test]
fn test_two_values_is_multi() {
    let p = principal_with("otherTelephone", vec!["555-0100".into(), "555-0101".into()]);

    assert!(p.is_attribute_multi("otherTelephone").unwrap());
    assert_eq!(p.attribute_get("otherTelephone").unwrap(), None);
}

#[test]
fn test_set_then_get() {
    init_test_logging();
    let store = MemoryDirectory::new();
    let mut p = UserExtPrincipal::with_account(
        &store,
        &test_context(),
        UserAccount::new("jdoe", "P@ssw0rd", true),
    )
    .unwrap();

    p.attribute_set("employeeID", "E1234").unwrap();
    assert_eq!(
        p.attribute_get("employeeID").unwrap(),
        Some(ExtensionValue::from("E1234"))
    );

    p.attribute_set("employeeNumber", 42i64).unwrap();
    assert_eq!(
        p.attribute_get("employeeNumber").unwrap(),
        Some(ExtensionValue::Integer(42))
    );

    p.attribute_set("thumbnailPhoto", vec![0xffu8, 0xd8, 0xff]).unwrap();
    assert_eq!(
        p.attribute_get("thumbnailPhoto")
            .unwrap()
            .as_ref()
            .and_then(ExtensionValue::as_bytes),
        Some(&[0xff, 0xd8, 0xff][..])
    );
}

#[test]
fn test_set_replaces_multi_valued() {
    let mut p = principal_with("otherMailbox", vec!["a@x".into(), "b@x".into()]);

    p.attribute_set("otherMailbox", "c@x").unwrap();
    assert!(!p.is_attribute_multi("otherMailbox").unwrap());
    assert_eq!(
        p.attribute_get("otherMailbox").unwrap(),
        Some(ExtensionValue::from("c@x"))
    );
}

#[test]
fn test_set_multi_and_clear() {
    let mut p = principal_with("mail", vec![]);

    p.attribute_set_multi("otherMailbox", ["a@x", "b@x"]).unwrap();
    assert!(p.is_attribute_multi("otherMailbox").unwrap());
    assert_eq!(p.attribute_get_multi("otherMailbox").unwrap().len(), 2);

    p.attribute_clear("otherMailbox").unwrap();
    assert!(p.attribute_get_multi("otherMailbox").unwrap().is_empty());
    assert_eq!(p.attribute_get("otherMailbox").unwrap(), None);
}

#[test]
fn test_set_stages_without_saving() {
    let mut p = principal_with("mail", vec!["jdoe@example.com".into()]);
    assert!(!p.entry().is_dirty());

    p.attribute_set("employeeID", "E1234").unwrap();
    assert!(p.entry().is_dirty());
    assert_eq!(
        p.entry().pending_changes().collect::<Vec<_>>(),
        vec!["employeeid"]
    );

    p.entry_mut().accept_changes();
    assert!(!p.entry().is_dirty());
    assert_eq!(
        p.attribute_get("employeeID").unwrap(),
        Some(ExtensionValue::from("E1234"))
    );
}

#[test]
fn test_reads_are_not_cached() {
    let entry = CountingEntry {
        inner: MemoryEntry::new("CN=jdoe,DC=example,DC=com").with_values("employeeID", ["E1"]),
        reads: Cell::new(0),
    };
    let mut p = UserExtPrincipal::new(entry);

    assert_eq!(
        p.attribute_get("employeeID").unwrap(),
        Some(ExtensionValue::from("E1"))
    );
    p.entry_mut()
        .inner
        .extension_set("employeeID", vec!["E2".into()])
        .unwrap();
    assert_eq!(
        p.attribute_get("employeeID").unwrap(),
        Some(ExtensionValue::from("E2"))
    );
    assert!(!p.is_attribute_multi("employeeID").unwrap());
    p.attribute_get_multi("employeeID").unwrap();

    assert_eq!(p.entry().reads.get(), 4);
}

#[test]
fn test_store_errors_propagate_unchanged() {
    let mut p = UserExtPrincipal::new(OfflineEntry);

    let err = p.attribute_get("employeeID").unwrap_err();
    assert!(matches!(err, DirectoryError::ServerDown { .. }));
    assert!(err.is_transient());

    assert!(matches!(
        p.is_attribute_multi("employeeID").unwrap_err(),
        DirectoryError::ServerDown { .. }
    ));
    assert!(matches!(
        p.attribute_get_multi("employeeID").unwrap_err(),
        DirectoryError::ServerDown { .. }
    ));
    assert!(matches!(
        p.attribute_set("employeeID", "E1").unwrap_err(),
        DirectoryError::InvalidCredentials
    ));
}

#[test]
fn test_store_rejects_write() {
    let mut p = principal_with("mail", vec![]);

    let err = p.attribute_set("objectGUID", "not-a-guid").unwrap_err();
    assert_eq!(err.error_code(), "CONSTRAINT_VIOLATION");

    let err = p.attribute_set("bad name", "x").unwrap_err();
    assert_eq!(err.error_code(), "INVALID_ATTRIBUTE_SYNTAX");
}

#[test]
fn test_boxed_entry() {
    let entry: Box<dyn DirectoryObject> =
        Box::new(MemoryEntry::new("CN=jdoe,DC=example,DC=com").with_values("employeeID", ["E1"]));
    let mut p = UserExtPrincipal::new(entry);

    assert_eq!(p.distinguished_name(), Some("CN=jdoe,DC=example,DC=com"));
    p.attribute_set("department", "Finance").unwrap();
    assert_eq!(
        p.attribute_get("department").unwrap(),
        Some(ExtensionValue::from("Finance"))
    );
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_with_context_creates_unnamed_principal() {
    let store = MemoryDirectory::new();
    let p = UserExtPrincipal::with_context(&store, &test_context()).unwrap();

    assert_eq!(p.distinguished_name(), None);
    assert!(p.is_attribute_multi("objectClass").unwrap());
    assert_eq!(p.attribute_get("sAMAccountName").unwrap(), None);
}

#[test]
fn test_with_account_seeds_entry() {
    let store = MemoryDirectory::new();
    let context = test_context().with_container("OU=Staff,DC=example,DC=com");
    let p = UserExtPrincipal::with_account(
        &store,
        &context,
        UserAccount::new("jdoe", "P@ssw0rd", false),
    )
    .unwrap();

    assert_eq!(
        p.distinguished_name(),
        Some("CN=jdoe,OU=Staff,DC=example,DC=com")
    );
    assert_eq!(
        p.attribute_get("sAMAccountName").unwrap(),
        Some(ExtensionValue::from("jdoe"))
    );
    let uac = p
        .attribute_get("userAccountControl")
        .unwrap()
        .and_then(|v| v.as_integer())
        .unwrap();
    assert_eq!(
        uac,
        i64::from(AccountControl::NORMAL_ACCOUNT | AccountControl::ACCOUNTDISABLE)
    );
}

#[test]
fn test_with_account_under_escaped_container() {
    let store = MemoryDirectory::new();
    let context = test_context().with_container("OU=Sales\\, EMEA,DC=example,DC=com");
    let p = UserExtPrincipal::with_account(
        &store,
        &context,
        UserAccount::new("jdoe", "P@ssw0rd", true),
    )
    .unwrap();

    assert_eq!(
        p.distinguished_name(),
        Some("CN=jdoe,OU=Sales\\, EMEA,DC=example,DC=com")
    );
}

#[test]
fn test_with_account_rejects_invalid_account() {
    let store = MemoryDirectory::new();
    let err = UserExtPrincipal::with_account(
        &store,
        &test_context(),
        UserAccount::new("this-name-is-far-too-long", "P@ssw0rd", true),
    )
    .unwrap_err();

    assert_eq!(err.error_code(), "INVALID_ACCOUNT");
}

// =============================================================================
// Presence Filters
// =============================================================================

#[test]
fn test_is_present_appends_one_predicate() {
    let mut p = principal_with("mail", vec![]);
    p.advanced_search_filter().is_present("employeeID");

    assert_eq!(
        p.advanced_search_filter().predicates(),
        &[FilterPredicate::new(
            "employeeID",
            "*",
            ValueType::String,
            MatchType::Equals
        )]
    );
}

#[test]
fn test_is_not_present_appends_one_predicate() {
    let mut p = principal_with("mail", vec![]);
    p.advanced_search_filter().is_not_present("employeeID");

    assert_eq!(
        p.advanced_search_filter().predicates(),
        &[FilterPredicate::new(
            "employeeID",
            "*",
            ValueType::String,
            MatchType::NotEquals
        )]
    );
}

#[test]
fn test_typed_presence_predicates() {
    let mut p = principal_with("mail", vec![]);
    let filters = p.advanced_search_filter();
    filters.is_present_typed("lastLogonTimestamp", ValueType::DateTime);
    filters.is_not_present_typed("thumbnailPhoto", ValueType::Binary);

    let predicates = filters.predicates();
    assert_eq!(predicates[0].value_type, ValueType::DateTime);
    assert_eq!(predicates[0].match_type, MatchType::Equals);
    assert_eq!(predicates[1].value_type, ValueType::Binary);
    assert_eq!(predicates[1].match_type, MatchType::NotEquals);
    assert!(predicates.iter().all(FilterPredicate::is_presence));
}

#[test]
fn test_filter_builder_is_same_instance() {
    let mut p = principal_with("mail", vec![]);

    let first: *const ExtAdvancedFilters = p.advanced_search_filter();
    let second: *const ExtAdvancedFilters = p.advanced_search_filter();
    assert!(std::ptr::eq(first, second));
}

#[test]
fn test_filter_builder_accumulates_across_accesses() {
    let mut p = principal_with("mail", vec![]);

    p.advanced_search_filter().is_present("employeeID");
    p.advanced_search_filter().is_not_present("mail");
    assert_eq!(p.advanced_search_filter().len(), 2);
    assert_eq!(p.search_filter().map(ExtAdvancedFilters::len), Some(2));
}

#[test]
fn test_no_deduplication() {
    let mut p = principal_with("mail", vec![]);

    p.advanced_search_filter().is_present("employeeID");
    p.advanced_search_filter().is_present("employeeID");

    let predicates = p.advanced_search_filter().predicates();
    assert_eq!(predicates.len(), 2);
    assert_eq!(predicates[0], predicates[1]);
}

#[test]
fn test_presence_does_not_touch_store() {
    let mut p = UserExtPrincipal::new(OfflineEntry);
    p.advanced_search_filter().is_present("employeeID");
    p.advanced_search_filter().is_not_present("employeeNumber");

    assert_eq!(
        p.query_filter().unwrap(),
        "(&(objectClass=user)(employeeID=*)(!(employeeNumber=*)))"
    );
}

#[test]
fn test_query_filter_reports_invalid_attribute() {
    let mut p = principal_with("mail", vec![]);
    p.advanced_search_filter().is_present("employee ID");

    let err = p.query_filter().unwrap_err();
    assert_eq!(err.error_code(), "INVALID_FILTER");
}
