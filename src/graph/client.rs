use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::token::GraphConfig;
use crate::graph::error::{GraphError, GraphErrorBody, GraphErrorEnvelope};

/// Identity returned by the `/me` endpoint for whatever the credential acts as.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GraphIdentity {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of `/me/accounts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageAccount {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DataList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
}

/// Thin Graph API client. Credentials always travel as query parameters.
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    version: String,
}

impl GraphClient {
    pub fn new(client: Client, cfg: &GraphConfig) -> Self {
        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            version: cfg.version.clone(),
        }
    }

    fn versioned(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.version, path.trim_start_matches('/'))
    }

    fn unversioned(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GraphError> {
        debug!("graph GET {}", url);
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| GraphError::Malformed(format!("{}: {}", url, e)))
    }

    async fn get_access_token(&self, url: &str, query: &[(&str, &str)]) -> Result<String, GraphError> {
        let response: AccessTokenResponse = self.get_json(url, query).await?;
        response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GraphError::Malformed("response has no access_token".to_string()))
    }

    /// `GET /me`: the identity the credential acts as.
    pub async fn me(&self, token: &str) -> Result<GraphIdentity, GraphError> {
        self.get_json(&self.versioned("me"), &[("access_token", token)]).await
    }

    /// `GET /{page_id}?fields=access_token` authorized by `authorizer`.
    pub async fn page_access_token(&self, page_id: &str, authorizer: &str) -> Result<String, GraphError> {
        self.get_access_token(
            &self.versioned(page_id),
            &[("fields", "access_token"), ("access_token", authorizer)],
        )
        .await
    }

    /// Client-credentials grant: app id + secret for an app token.
    pub async fn app_access_token(&self, app_id: &str, app_secret: &str) -> Result<String, GraphError> {
        self.get_access_token(
            &self.versioned("oauth/access_token"),
            &[
                ("client_id", app_id),
                ("client_secret", app_secret),
                ("grant_type", "client_credentials"),
            ],
        )
        .await
    }

    /// Long-lived token exchange (`fb_exchange_token` grant).
    pub async fn exchange_token(
        &self,
        app_id: &str,
        app_secret: &str,
        token: &str,
    ) -> Result<String, GraphError> {
        self.get_access_token(
            &self.versioned("oauth/access_token"),
            &[
                ("grant_type", "fb_exchange_token"),
                ("client_id", app_id),
                ("client_secret", app_secret),
                ("fb_exchange_token", token),
            ],
        )
        .await
    }

    /// `GET /{lead_id}`: full lead record including `field_data`.
    pub async fn lead<T: DeserializeOwned>(&self, lead_id: &str, token: &str) -> Result<T, GraphError> {
        self.get_json(&self.versioned(lead_id), &[("access_token", token)]).await
    }

    /// `GET /me/subscribed_apps`, relayed as-is by the debug route.
    pub async fn subscribed_apps(&self, token: &str) -> Result<Value, GraphError> {
        self.me_edge("subscribed_apps", token, &[]).await
    }

    /// `GET /me/{edge}` as raw JSON (`permissions`, `leadgen_forms`, `leads`, ...).
    pub async fn me_edge(
        &self,
        edge: &str,
        token: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, GraphError> {
        let mut query = params.to_vec();
        query.push(("access_token", token));
        self.get_json(&self.versioned(&format!("me/{}", edge)), &query)
            .await
    }

    /// `GET /me/accounts`: pages the credential can manage, with their page tokens.
    pub async fn accounts(&self, token: &str) -> Result<Vec<PageAccount>, GraphError> {
        let list: DataList<PageAccount> = self
            .get_json(
                &self.versioned("me/accounts"),
                &[
                    ("fields", "id,name,category,access_token"),
                    ("access_token", token),
                ],
            )
            .await?;
        Ok(list.data)
    }

    /// `GET /debug_token`: introspection of `input_token` (type, app, expiry, scopes).
    pub async fn debug_token(&self, input_token: &str, access_token: &str) -> Result<Value, GraphError> {
        self.get_json(
            &self.unversioned("debug_token"),
            &[("input_token", input_token), ("access_token", access_token)],
        )
        .await
    }
}

fn classify_failure(status: StatusCode, body: &str) -> GraphError {
    match serde_json::from_str::<GraphErrorEnvelope>(body) {
        Ok(envelope) => GraphError::Rejected {
            status: status.as_u16(),
            body: envelope.error,
        },
        Err(_) if status.is_server_error() => {
            GraphError::Unavailable(format!("status {}", status.as_u16()))
        }
        Err(_) => GraphError::Rejected {
            status: status.as_u16(),
            body: GraphErrorBody {
                message: body.chars().take(200).collect(),
                ..Default::default()
            },
        },
    }
}
