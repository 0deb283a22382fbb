use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::graph::{GraphClient, GraphErrorBody, GraphIdentity};
use crate::helpers::time::unix_to_rfc3339;
use crate::token::credential::{Credential, Identity};
use crate::token::error::TokenError;
use crate::token::probe::probe;

/// `/me` edges checked for each role: (edge, extra query).
const PAGE_EDGES: &[(&str, &[(&str, &str)])] = &[
    ("permissions", &[]),
    ("subscribed_apps", &[]),
    ("leadgen_forms", &[]),
    ("leads", &[("limit", "5")]),
];
const SYSTEM_USER_EDGES: &[(&str, &[(&str, &str)])] = &[("permissions", &[]), ("accounts", &[])];

/// What the Graph API says about one configured credential.
#[derive(Debug, Clone, Serialize)]
pub struct TokenReport {
    pub role: &'static str,
    pub preview: String,
    pub live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<GraphIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// rfc3339, or `never` for non-expiring tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeCheck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GraphErrorBody>,
}

/// Result of reading one `/me/{edge}` list.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeCheck {
    pub edge: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A page reachable by the system user, as printed by the `pages` command.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageSummary {
    pub id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    /// leading characters of the page token the listing carried
    pub token: Option<String>,
}

/// Probe and introspect the configured page and system user tokens.
pub async fn inspect_identity(graph: &GraphClient, identity: &Identity) -> Vec<TokenReport> {
    let mut reports = Vec::new();
    if let Some(page) = &identity.page_token {
        reports.push(inspect(graph, page, "page").await);
    }
    if let Some(system_user) = &identity.system_user_token {
        reports.push(inspect(graph, system_user, "system_user").await);
    }
    reports
}

pub async fn inspect(graph: &GraphClient, credential: &Credential, role: &'static str) -> TokenReport {
    let outcome = probe(graph, credential.secret(), role).await;
    let mut report = TokenReport {
        role,
        preview: credential.preview(),
        live: outcome.live,
        identity: outcome.identity,
        token_type: None,
        expires_at: None,
        scopes: Vec::new(),
        edges: Vec::new(),
        error: outcome.error,
    };

    // the token introspects itself
    match graph.debug_token(credential.secret(), credential.secret()).await {
        Ok(value) => apply_debug_data(&mut report, &value["data"]),
        Err(e) => {
            warn!("debug_token for {} token failed: {}", role, e);
            if report.error.is_none() {
                report.error = e.body().cloned();
            }
        }
    }

    if report.live {
        let edges = if role == "system_user" { SYSTEM_USER_EDGES } else { PAGE_EDGES };
        for &(edge, params) in edges {
            report.edges.push(check_edge(graph, credential, edge, params).await);
        }
    }
    report
}

async fn check_edge(
    graph: &GraphClient,
    credential: &Credential,
    edge: &'static str,
    params: &[(&str, &str)],
) -> EdgeCheck {
    match graph.me_edge(edge, credential.secret(), params).await {
        Ok(value) => {
            let items: Vec<String> = value["data"]
                .as_array()
                .map(|data| data.iter().map(|item| summarize(edge, item)).collect())
                .unwrap_or_default();
            EdgeCheck {
                edge,
                ok: true,
                count: Some(items.len()),
                items,
                error: None,
            }
        }
        Err(e) => {
            warn!("me/{} check failed: {}", edge, e);
            EdgeCheck {
                edge,
                ok: false,
                count: None,
                items: Vec::new(),
                error: Some(match e.body() {
                    Some(body) => body.to_string(),
                    None => e.to_string(),
                }),
            }
        }
    }
}

fn summarize(edge: &str, item: &Value) -> String {
    let field = |key: &str| item[key].as_str().unwrap_or("?").to_owned();
    match edge {
        "permissions" => format!("{}: {}", field("permission"), field("status")),
        "leads" => format!("{} (created {})", field("id"), field("created_time")),
        _ => format!("{} ({})", field("name"), field("id")),
    }
}

fn apply_debug_data(report: &mut TokenReport, data: &Value) {
    report.token_type = data["type"].as_str().map(str::to_owned);
    report.expires_at = match data["expires_at"].as_i64() {
        Some(0) => Some("never".to_string()),
        Some(ts) => unix_to_rfc3339(ts),
        None => None,
    };
    report.scopes = data["scopes"]
        .as_array()
        .map(|scopes| {
            scopes
                .iter()
                .filter_map(|s| s.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default();
}

/// Pages the system user can manage, used to find the page id to configure.
pub async fn list_pages(graph: &GraphClient, identity: &Identity) -> Result<Vec<PageSummary>, TokenError> {
    let system_user = identity
        .system_user_token
        .as_ref()
        .ok_or(TokenError::ConfigMissing("system_user_token"))?;

    let pages: Vec<PageSummary> = graph
        .accounts(system_user.secret())
        .await?
        .into_iter()
        .map(|account| PageSummary {
            token: account
                .access_token
                .map(|t| Credential::configured_page(t).preview()),
            id: account.id,
            name: account.name,
            category: account.category,
        })
        .collect();

    info!("system user manages {} page(s)", pages.len());
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_expiry_reads_as_never() {
        let mut report = TokenReport {
            role: "page",
            preview: String::new(),
            live: true,
            identity: None,
            token_type: None,
            expires_at: None,
            scopes: Vec::new(),
            edges: Vec::new(),
            error: None,
        };

        apply_debug_data(
            &mut report,
            &json!({ "type": "PAGE", "expires_at": 0, "scopes": ["leads_retrieval", "pages_show_list"] }),
        );

        assert_eq!(report.token_type.as_deref(), Some("PAGE"));
        assert_eq!(report.expires_at.as_deref(), Some("never"));
        assert_eq!(report.scopes, vec!["leads_retrieval", "pages_show_list"]);

        apply_debug_data(&mut report, &json!({ "expires_at": 1_700_000_000 }));
        assert_eq!(report.expires_at.as_deref(), Some("2023-11-14T22:13:20+00:00"));
    }

    #[test]
    fn edge_items_are_summarized_per_edge() {
        assert_eq!(
            summarize("permissions", &json!({ "permission": "leads_retrieval", "status": "granted" })),
            "leads_retrieval: granted"
        );
        assert_eq!(
            summarize("leads", &json!({ "id": "444", "created_time": "2024-05-01T10:00:00+0000" })),
            "444 (created 2024-05-01T10:00:00+0000)"
        );
        assert_eq!(
            summarize("leadgen_forms", &json!({ "id": "555", "name": "MBA 2025" })),
            "MBA 2025 (555)"
        );
    }
}
