//! # Principal Extensions
//!
//! Extension attribute access and presence filters for directory user
//! principals.
//!
//! A [`UserExtPrincipal`] wraps an entry handed out by a directory store and
//! adds two things:
//!
//! - get/set of arbitrary extension attributes, single- or multi-valued;
//! - `is_present` / `is_not_present` predicates on the principal's advanced
//!   search filter, equivalent to `(attr=*)` and `(!(attr=*))`.
//!
//! Stores plug in through the [`DirectoryObject`] and [`PrincipalStore`]
//! traits. [`MemoryDirectory`] is a complete in-process store.
//!
//! ## Example
//!
//! ```
//! use principal_ext::prelude::*;
//!
//! let store = MemoryDirectory::new();
//! let context = PrincipalContext::domain("example.com");
//! let account = UserAccount::new("jdoe", "P@ssw0rd", true);
//!
//! let mut user = UserExtPrincipal::with_account(&store, &context, account)?;
//! user.attribute_set("employeeID", "E1234")?;
//! assert_eq!(
//!     user.attribute_get("employeeID")?,
//!     Some(ExtensionValue::from("E1234"))
//! );
//!
//! user.advanced_search_filter().is_not_present("employeeNumber");
//! assert_eq!(
//!     user.query_filter()?,
//!     "(&(objectClass=user)(!(employeeNumber=*)))"
//! );
//! # Ok::<(), DirectoryError>(())
//! ```
//!
//! ## Crate Organization
//!
//! - [`principal`] - `UserExtPrincipal` and `ExtAdvancedFilters`
//! - [`filter`] - Filter predicates and LDAP filter rendering
//! - [`value`] - Extension attribute values
//! - [`directory`] - Store traits
//! - [`context`] - Principal context configuration
//! - [`account`] - Account name, password and `userAccountControl` helpers
//! - [`memory`] - In-memory store
//! - [`error`] - Store error type

pub mod account;
pub mod context;
pub mod directory;
pub mod error;
pub mod filter;
pub mod memory;
pub mod principal;
pub mod value;

pub use context::{ContextType, PrincipalContext};
pub use directory::{DirectoryObject, PrincipalStore};
pub use error::{DirectoryError, DirectoryResult};
pub use filter::{AdvancedFilters, FilterPredicate, MatchType};
pub use memory::{MemoryDirectory, MemoryEntry};
pub use principal::{ExtAdvancedFilters, UserExtPrincipal};
pub use value::{ExtensionValue, ValueType};

/// Prelude module for convenient imports.
///
/// ```
/// use principal_ext::prelude::*;
/// ```
pub mod prelude {
    pub use crate::account::{AccountControl, UserAccount};
    pub use crate::context::{ContextType, PrincipalContext};
    pub use crate::directory::{DirectoryObject, PrincipalStore};
    pub use crate::error::{DirectoryError, DirectoryResult};
    pub use crate::filter::{AdvancedFilters, FilterPredicate, MatchType};
    pub use crate::memory::{MemoryDirectory, MemoryEntry};
    pub use crate::principal::{ExtAdvancedFilters, UserExtPrincipal};
    pub use crate::value::{ExtensionValue, ValueType};
}
