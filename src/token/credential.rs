use serde::Serialize;

use crate::config::token::TokenConfig;
use crate::token::strategy::Strategy;

/// Token classes of the Graph API. Only the class matters to the manager; the
/// expiry is never derived locally, a liveness probe decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialClass {
    SystemUser,
    App,
    Page,
    User,
}

/// Where a credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialOrigin {
    /// read from configuration at startup
    Configured,
    /// produced by an acquisition strategy
    Minted(Strategy),
}

/// Opaque bearer string plus metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    value: String,
    pub class: CredentialClass,
    pub origin: CredentialOrigin,
}

const PREVIEW_LEN: usize = 12;

impl Credential {
    pub fn new(value: impl Into<String>, class: CredentialClass, origin: CredentialOrigin) -> Self {
        Self {
            value: value.into(),
            class,
            origin,
        }
    }

    pub fn configured_page(value: impl Into<String>) -> Self {
        Self::new(value, CredentialClass::Page, CredentialOrigin::Configured)
    }

    pub fn minted_page(value: impl Into<String>, strategy: Strategy) -> Self {
        Self::new(value, CredentialClass::Page, CredentialOrigin::Minted(strategy))
    }

    /// The bearer string, for use as `access_token`.
    pub fn secret(&self) -> &str {
        &self.value
    }

    /// Leading characters only, safe for logs.
    pub fn preview(&self) -> String {
        let head: String = self.value.chars().take(PREVIEW_LEN).collect();
        if self.value.chars().count() > PREVIEW_LEN {
            format!("{}...", head)
        } else {
            head
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("value", &self.preview())
            .field("class", &self.class)
            .field("origin", &self.origin)
            .finish()
    }
}

/// Static identity inputs, read once from configuration.
#[derive(Clone, Default)]
pub struct Identity {
    pub app_id: Option<String>,
    pub app_secret: Option<String>,
    pub page_id: Option<String>,
    pub system_user_token: Option<Credential>,
    pub page_token: Option<Credential>,
}

impl Identity {
    pub fn from_config(cfg: &TokenConfig) -> Self {
        Self {
            app_id: cfg.app_id.clone(),
            app_secret: cfg.app_secret.clone(),
            page_id: cfg.page_id.clone(),
            system_user_token: cfg.system_user_token.as_ref().map(|t| {
                Credential::new(t.clone(), CredentialClass::SystemUser, CredentialOrigin::Configured)
            }),
            page_token: cfg.page_token.as_ref().map(Credential::configured_page),
        }
    }

    /// App id and secret, only when both are configured.
    pub fn app_credentials(&self) -> Option<(&str, &str)> {
        match (&self.app_id, &self.app_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("app_id", &self.app_id)
            .field("app_secret", &self.app_secret.as_ref().map(|_| "<redacted>"))
            .field("page_id", &self.page_id)
            .field("system_user_token", &self.system_user_token)
            .field("page_token", &self.page_token)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_the_full_secret() {
        let secret = "EAAB-very-long-page-token-value";
        let credential = Credential::configured_page(secret);

        let printed = format!("{:?}", credential);

        assert!(!printed.contains(secret));
        assert!(printed.contains("EAAB-very-lo..."));
        assert_eq!(credential.secret(), secret);
    }

    #[test]
    fn app_credentials_require_both_halves() {
        let mut identity = Identity {
            app_id: Some("123".into()),
            ..Default::default()
        };
        assert!(identity.app_credentials().is_none());

        identity.app_secret = Some("s3cr3t".into());
        assert_eq!(identity.app_credentials(), Some(("123", "s3cr3t")));
    }
}
