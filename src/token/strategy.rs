use serde::Serialize;
use tracing::info;

use crate::graph::GraphClient;
use crate::token::credential::{Credential, Identity};
use crate::token::error::TokenError;
use crate::token::probe::probe;

/// Page token acquisition strategies, tried in [`Strategy::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Page token minted with the never-expiring system user credential.
    SystemUserMint,
    /// Page token minted with an app token from the client-credentials grant.
    AppCredentialMint,
    /// Known page token extended through the long-lived token exchange.
    ExtendExisting,
}

/// Inputs a strategy may draw on.
pub struct AcquireContext<'a> {
    pub graph: &'a GraphClient,
    pub identity: &'a Identity,
    /// page credential known before this refresh (cached, else configured)
    pub known_page_token: Option<&'a Credential>,
}

impl Strategy {
    pub const ORDER: [Strategy; 3] = [
        Strategy::SystemUserMint,
        Strategy::AppCredentialMint,
        Strategy::ExtendExisting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::SystemUserMint => "system_user_mint",
            Strategy::AppCredentialMint => "app_credential_mint",
            Strategy::ExtendExisting => "extend_existing",
        }
    }

    pub async fn acquire(&self, ctx: &AcquireContext<'_>) -> Result<Credential, TokenError> {
        match self {
            Strategy::SystemUserMint => system_user_mint(ctx).await,
            Strategy::AppCredentialMint => app_credential_mint(ctx).await,
            Strategy::ExtendExisting => extend_existing(ctx).await,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

async fn system_user_mint(ctx: &AcquireContext<'_>) -> Result<Credential, TokenError> {
    let system_user = ctx
        .identity
        .system_user_token
        .as_ref()
        .ok_or(TokenError::ConfigMissing("system_user_token"))?;
    let page_id = ctx
        .identity
        .page_id
        .as_deref()
        .ok_or(TokenError::ConfigMissing("page_id"))?;

    let check = probe(ctx.graph, system_user.secret(), "system_user").await;
    if !check.live {
        return Err(check
            .error
            .map(TokenError::RemoteAuth)
            .unwrap_or_else(|| TokenError::RemoteUnavailable("system user probe failed".to_string())));
    }

    info!("system user token is valid, generating page token...");
    let token = ctx.graph.page_access_token(page_id, system_user.secret()).await?;
    Ok(Credential::minted_page(token, Strategy::SystemUserMint))
}

async fn app_credential_mint(ctx: &AcquireContext<'_>) -> Result<Credential, TokenError> {
    let (app_id, app_secret) = ctx
        .identity
        .app_credentials()
        .ok_or(TokenError::ConfigMissing("app_id/app_secret"))?;
    let page_id = ctx
        .identity
        .page_id
        .as_deref()
        .ok_or(TokenError::ConfigMissing("page_id"))?;

    let app_token = ctx.graph.app_access_token(app_id, app_secret).await?;
    let token = ctx.graph.page_access_token(page_id, &app_token).await?;
    Ok(Credential::minted_page(token, Strategy::AppCredentialMint))
}

async fn extend_existing(ctx: &AcquireContext<'_>) -> Result<Credential, TokenError> {
    let known = ctx
        .known_page_token
        .ok_or(TokenError::ConfigMissing("page_token"))?;
    let (app_id, app_secret) = ctx
        .identity
        .app_credentials()
        .ok_or(TokenError::ConfigMissing("app_id/app_secret"))?;

    let token = ctx
        .graph
        .exchange_token(app_id, app_secret, known.secret())
        .await?;
    Ok(Credential::minted_page(token, Strategy::ExtendExisting))
}
