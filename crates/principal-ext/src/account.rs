//! Account helpers for new user principals.
//!
//! A new principal may be created with an initial account name, password and
//! enabled flag. Stores that back onto Active Directory need these expressed
//! as `sAMAccountName`, `unicodePwd` and `userAccountControl`:
//!
//! - `unicodePwd` is the password surrounded with double quotes, encoded as
//!   UTF-16LE.
//! - `userAccountControl` starts at `NORMAL_ACCOUNT` (0x200), with
//!   `ACCOUNTDISABLE` (0x2) set for disabled accounts.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{DirectoryError, DirectoryResult};

/// Maximum length of a pre-Windows 2000 logon name.
pub const MAX_SAM_ACCOUNT_NAME_LEN: usize = 20;

/// Characters AD rejects in `sAMAccountName`.
const INVALID_SAM_CHARS: &[char] = &[
    '"', '/', '\\', '[', ']', ':', ';', '|', '=', ',', '+', '*', '?', '<', '>',
];

/// Initial account triple for a new user principal.
#[derive(Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// Logon name (`sAMAccountName`).
    pub sam_account_name: String,

    /// Initial password.
    #[serde(skip_serializing)]
    pub password: String,

    /// Whether the account starts enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("sam_account_name", &self.sam_account_name)
            .field("password", &"***REDACTED***")
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl UserAccount {
    pub fn new(
        sam_account_name: impl Into<String>,
        password: impl Into<String>,
        enabled: bool,
    ) -> Self {
        Self {
            sam_account_name: sam_account_name.into(),
            password: password.into(),
            enabled,
        }
    }

    /// Validate the account name and password.
    pub fn validate(&self) -> DirectoryResult<()> {
        let name = &self.sam_account_name;
        if name.trim().is_empty() {
            return Err(DirectoryError::invalid_account(
                "sAMAccountName cannot be empty",
            ));
        }
        if name.chars().count() > MAX_SAM_ACCOUNT_NAME_LEN {
            return Err(DirectoryError::invalid_account(format!(
                "sAMAccountName '{name}' exceeds {MAX_SAM_ACCOUNT_NAME_LEN} characters"
            )));
        }
        if let Some(c) = name.chars().find(|c| INVALID_SAM_CHARS.contains(c)) {
            return Err(DirectoryError::invalid_account(format!(
                "sAMAccountName '{name}' contains invalid character '{c}'"
            )));
        }
        if self.password.is_empty() {
            return Err(DirectoryError::invalid_account("password cannot be empty"));
        }
        Ok(())
    }

    /// `userAccountControl` value for this account.
    #[must_use]
    pub fn user_account_control(&self) -> u32 {
        new_account_uac(self.enabled)
    }
}

/// `userAccountControl` flag bits.
pub struct AccountControl;

impl AccountControl {
    pub const ACCOUNTDISABLE: u32 = 0x0002;
    pub const NORMAL_ACCOUNT: u32 = 0x0200;

    /// Whether the disabled bit is set.
    #[must_use]
    pub fn is_disabled(uac: u32) -> bool {
        uac & Self::ACCOUNTDISABLE != 0
    }
}

/// Compute the `userAccountControl` value for a new account.
#[must_use]
pub fn new_account_uac(enabled: bool) -> u32 {
    let mut uac = AccountControl::NORMAL_ACCOUNT;
    if !enabled {
        uac |= AccountControl::ACCOUNTDISABLE;
    }
    uac
}

/// Encode a plaintext password for the `unicodePwd` attribute.
///
/// # Errors
/// Returns an error if the password is empty.
#[instrument(skip(password))]
pub fn encode_unicode_pwd(password: &str) -> DirectoryResult<Vec<u8>> {
    if password.is_empty() {
        return Err(DirectoryError::invalid_account("password cannot be empty"));
    }

    let quoted = format!("\"{password}\"");
    Ok(quoted.encode_utf16().flat_map(u16::to_le_bytes).collect())
}

/// Build `CN=<cn>,<container>` with the CN escaped.
#[instrument]
pub fn build_user_dn(cn: &str, container: &str) -> DirectoryResult<String> {
    if cn.is_empty() {
        return Err(DirectoryError::invalid_account(
            "common name cannot be empty for DN construction",
        ));
    }
    if container.is_empty() {
        return Err(DirectoryError::invalid_context(
            "container cannot be empty for DN construction",
        ));
    }

    let dn = format!("CN={},{container}", escape_dn_value(cn));
    debug!(dn = %dn, "Built user DN");

    Ok(dn)
}

/// Escape special characters in a DN attribute value per RFC 4514.
pub fn escape_dn_value(value: &str) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut result = String::with_capacity(value.len() * 2);

    for (i, ch) in value.chars().enumerate() {
        match ch {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                result.push('\\');
                result.push(ch);
            }
            '\0' => result.push_str("\\00"),
            ' ' if i == 0 || i == last => result.push_str("\\20"),
            '#' if i == 0 => result.push_str("\\23"),
            _ => result.push(ch),
        }
    }

    result
}
