pub use axum::Router;
pub use httpmock::prelude::*;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use httpmock::Mock;
use reqwest::Client;

use crate::config::token::GraphConfig;
use crate::config::webhook::{CrmConfig, WebhookConfig};
use crate::graph::GraphClient;
use crate::observability::metrics::get_metrics;
use crate::resilience::retry::RetrySettings;
use crate::server::server::{build_router, AppState};
use crate::token::credential::CredentialOrigin;
use crate::token::{Credential, CredentialClass, EnvFileStore, Identity, TokenManager};
use crate::webhook::{CrmForwarder, LeadProcessor, WebhookState};

pub const GRAPH_VERSION: &str = "v17.0";
pub const PAGE_ID: &str = "page-1";
pub const APP_ID: &str = "app-1";
pub const APP_SECRET: &str = "app-secret";
pub const SYSTEM_USER_TOKEN: &str = "SYSTEM-USER-TOKEN";
pub const VERIFY_TOKEN: &str = "verify-me";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn graph_client(server: &MockServer) -> GraphClient {
    let cfg = GraphConfig {
        base_url: server.base_url(),
        version: GRAPH_VERSION.to_string(),
    };
    GraphClient::new(build_reqwest_client(), &cfg)
}

pub fn graph_path(path: &str) -> String {
    format!("/{}/{}", GRAPH_VERSION, path)
}

/// Identity with every input configured.
pub fn full_identity(page_token: Option<&str>) -> Identity {
    Identity {
        app_id: Some(APP_ID.to_string()),
        app_secret: Some(APP_SECRET.to_string()),
        page_id: Some(PAGE_ID.to_string()),
        system_user_token: Some(Credential::new(
            SYSTEM_USER_TOKEN,
            CredentialClass::SystemUser,
            CredentialOrigin::Configured,
        )),
        page_token: page_token.map(Credential::configured_page),
    }
}

pub fn token_manager(server: &MockServer, identity: Identity, env_file: &Path) -> TokenManager {
    TokenManager::new(
        graph_client(server),
        identity,
        EnvFileStore::new(env_file, "PAGE_ACCESS_TOKEN"),
        3600,
    )
}

/// `GET /me` answering for `token`: identity when `live`, OAuth error otherwise.
pub async fn mock_me<'a>(server: &'a MockServer, token: &str, live: bool) -> Mock<'a> {
    let token = token.to_string();
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(graph_path("me"))
                .query_param("access_token", token);
            if live {
                then.status(200)
                    .json_body(json!({ "id": PAGE_ID, "name": "Test Page" }));
            } else {
                then.status(400).json_body(oauth_error());
            };
        })
        .await
}

/// `GET /{page_id}?fields=access_token` authorized by `authorizer`.
pub async fn mock_page_token<'a>(server: &'a MockServer, authorizer: &str, minted: Option<&str>) -> Mock<'a> {
    let authorizer = authorizer.to_string();
    let minted = minted.map(str::to_string);
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(graph_path(PAGE_ID))
                .query_param("fields", "access_token")
                .query_param("access_token", authorizer);
            match minted {
                Some(token) => {
                    then.status(200)
                        .json_body(json!({ "access_token": token, "id": PAGE_ID }));
                }
                None => {
                    then.status(400).json_body(oauth_error());
                }
            }
        })
        .await
}

/// Client-credentials grant.
pub async fn mock_app_token<'a>(server: &'a MockServer, app_token: Option<&str>) -> Mock<'a> {
    let app_token = app_token.map(str::to_string);
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(graph_path("oauth/access_token"))
                .query_param("grant_type", "client_credentials");
            match app_token {
                Some(token) => {
                    then.status(200)
                        .json_body(json!({ "access_token": token, "token_type": "bearer" }));
                }
                None => {
                    then.status(400).json_body(oauth_error());
                }
            }
        })
        .await
}

/// Long-lived exchange grant.
pub async fn mock_exchange<'a>(server: &'a MockServer, extended: Option<&str>) -> Mock<'a> {
    let extended = extended.map(str::to_string);
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(graph_path("oauth/access_token"))
                .query_param("grant_type", "fb_exchange_token");
            match extended {
                Some(token) => {
                    then.status(200)
                        .json_body(json!({ "access_token": token, "token_type": "bearer" }));
                }
                None => {
                    then.status(400).json_body(oauth_error());
                }
            }
        })
        .await
}

pub fn oauth_error() -> serde_json::Value {
    json!({
        "error": {
            "message": "Error validating access token: Session has expired",
            "type": "OAuthException",
            "code": 190,
            "error_subcode": 463,
            "fbtrace_id": "AbCdEf"
        }
    })
}

/// Full relay app wired against mocked Graph API and CRM endpoints.
pub async fn relay_app(tokens: Arc<TokenManager>, graph: &MockServer, crm_url: String) -> Router {
    let crm = CrmConfig {
        url: crm_url,
        ..Default::default()
    };
    let processor = LeadProcessor::new(
        tokens,
        graph_client(graph),
        CrmForwarder::new(build_reqwest_client(), crm),
        RetrySettings {
            attempts: 2,
            base_delay_ms: 1,
            max_delay_ms: 2,
        },
    );
    let webhook = WebhookConfig {
        path: "/webhook".to_string(),
        verify_token: VERIFY_TOKEN.to_string(),
    };
    let state = AppState::new(get_metrics().await, WebhookState::new(&webhook, processor));
    build_router(&Default::default(), state)
}
