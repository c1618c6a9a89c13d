//! Principal context configuration
//!
//! Identifies the directory store principals are created in and searched
//! against. Connection and bind settings belong to the store implementation.

use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, DirectoryResult};

/// Kind of store a principal context points at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    /// Active Directory domain.
    #[default]
    Domain,
    /// AD LDS / ADAM application partition.
    ApplicationDirectory,
    /// Local machine account store.
    Machine,
}

/// Configuration for the store principals live in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalContext {
    /// Store kind.
    #[serde(default)]
    pub context_type: ContextType,

    /// Domain DNS name, server, or machine name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Container DN new principals are created under
    /// (e.g., "OU=Staff,DC=example,DC=com").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    /// RDN of the default user container when only a domain name is set.
    #[serde(default = "default_users_rdn")]
    pub users_rdn: String,
}

fn default_users_rdn() -> String {
    "CN=Users".to_string()
}

impl Default for PrincipalContext {
    fn default() -> Self {
        Self::new(ContextType::Domain)
    }
}

impl PrincipalContext {
    /// Create a context of the given type with no name or container.
    pub fn new(context_type: ContextType) -> Self {
        Self {
            context_type,
            name: None,
            container: None,
            users_rdn: default_users_rdn(),
        }
    }

    /// Create a domain context for a DNS domain name.
    pub fn domain(name: impl Into<String>) -> Self {
        Self::new(ContextType::Domain).with_name(name)
    }

    /// Set the domain, server or machine name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the container DN.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Parse and validate a context from JSON.
    pub fn from_json(json: &str) -> DirectoryResult<Self> {
        let context: Self = serde_json::from_str(json)?;
        context.validate()?;
        Ok(context)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DirectoryError::invalid_context("name cannot be empty"));
            }
        }

        if let Some(container) = &self.container {
            if !looks_like_dn(container) {
                return Err(DirectoryError::invalid_context(format!(
                    "container '{container}' is not a distinguished name"
                )));
            }
        }

        match self.context_type {
            ContextType::ApplicationDirectory => {
                if self.name.is_none() || self.container.is_none() {
                    return Err(DirectoryError::invalid_context(
                        "application directory contexts require both name and container",
                    ));
                }
            }
            ContextType::Machine => {
                if self.container.is_some() {
                    return Err(DirectoryError::invalid_context(
                        "machine contexts do not support a container",
                    ));
                }
            }
            ContextType::Domain => {}
        }

        if !looks_like_dn(&self.users_rdn) {
            return Err(DirectoryError::invalid_context(format!(
                "users_rdn '{}' is not a relative distinguished name",
                self.users_rdn
            )));
        }

        Ok(())
    }

    /// DN of the domain naming context, derived from a DNS domain name.
    ///
    /// `example.com` becomes `DC=example,DC=com`.
    #[must_use]
    pub fn domain_dn(&self) -> Option<String> {
        if self.context_type != ContextType::Domain {
            return None;
        }
        let name = self.name.as_deref()?;
        let labels: Vec<String> = name
            .split('.')
            .filter(|label| !label.is_empty())
            .map(|label| format!("DC={label}"))
            .collect();
        if labels.is_empty() {
            None
        } else {
            Some(labels.join(","))
        }
    }

    /// Container new principals are created under.
    ///
    /// The explicit container wins; a domain context without one falls back
    /// to the default users container. Machine contexts have none.
    #[must_use]
    pub fn container_dn(&self) -> Option<String> {
        if let Some(container) = &self.container {
            return Some(container.clone());
        }
        self.domain_dn()
            .map(|domain| format!("{},{}", self.users_rdn, domain))
    }
}

/// Cheap structural check for `attr=value[,attr=value…]`.
fn looks_like_dn(value: &str) -> bool {
    !value.trim().is_empty()
        && split_rdns(value)
            .iter()
            .all(|rdn| match rdn.split_once('=') {
                Some((attr, _)) => !attr.trim().is_empty(),
                None => false,
            })
}

/// Split a DN on its unescaped commas. A `\` escapes the character after it
/// (RFC 4514), so `OU=Sales\, EMEA` stays one RDN.
fn split_rdns(value: &str) -> Vec<&str> {
    let mut rdns = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            rdns.push(&value[start..i]);
            start = i + 1;
        }
    }
    rdns.push(&value[start..]);
    rdns
}
