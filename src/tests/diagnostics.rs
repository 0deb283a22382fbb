#[cfg(test)]
mod tests {
    use crate::tests::common::*;
    use crate::token::{inspect_identity, list_pages, Credential, Identity, TokenError};

    async fn mock_edge<'a>(server: &'a MockServer, token: &str, edge: &str, body: serde_json::Value) -> httpmock::Mock<'a> {
        let token = token.to_string();
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(graph_path(&format!("me/{}", edge)))
                    .query_param("access_token", token);
                then.status(200).json_body(body);
            })
            .await
    }

    async fn mock_debug_token<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
        let token = token.to_string();
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(graph_path("debug_token"))
                    .query_param("input_token", token);
                then.status(200).json_body(json!({
                    "data": { "type": "PAGE", "expires_at": 0, "scopes": ["leads_retrieval"] }
                }));
            })
            .await
    }

    #[tokio::test]
    async fn page_report_lists_lead_edges() {
        let server = MockServer::start_async().await;
        mock_me(&server, "PAGE-LIVE", true).await;
        mock_debug_token(&server, "PAGE-LIVE").await;
        mock_edge(
            &server,
            "PAGE-LIVE",
            "permissions",
            json!({ "data": [{ "permission": "leads_retrieval", "status": "granted" }] }),
        )
        .await;
        mock_edge(&server, "PAGE-LIVE", "subscribed_apps", json!({ "data": [{ "id": "app-1", "name": "Relay" }] })).await;
        mock_edge(&server, "PAGE-LIVE", "leadgen_forms", json!({ "data": [] })).await;
        let leads = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(graph_path("me/leads"))
                    .query_param("limit", "5")
                    .query_param("access_token", "PAGE-LIVE");
                then.status(400).json_body(oauth_error());
            })
            .await;

        let identity = Identity {
            page_token: Some(Credential::configured_page("PAGE-LIVE")),
            ..Identity::default()
        };
        let reports = inspect_identity(&graph_client(&server), &identity).await;

        assert_eq!(reports.len(), 1);
        let page = &reports[0];
        assert!(page.live);
        assert_eq!(page.expires_at.as_deref(), Some("never"));

        let edges: Vec<_> = page.edges.iter().map(|e| (e.edge, e.ok, e.count)).collect();
        assert_eq!(
            edges,
            vec![
                ("permissions", true, Some(1)),
                ("subscribed_apps", true, Some(1)),
                ("leadgen_forms", true, Some(0)),
                ("leads", false, None),
            ]
        );
        assert_eq!(page.edges[0].items, vec!["leads_retrieval: granted"]);
        assert_eq!(page.edges[1].items, vec!["Relay (app-1)"]);
        assert!(page.edges[3].error.is_some());
        assert_eq!(leads.hits_async().await, 1);
    }

    #[tokio::test]
    async fn dead_token_skips_edge_checks() {
        let server = MockServer::start_async().await;
        mock_me(&server, "PAGE-DEAD", false).await;
        let permissions = mock_edge(&server, "PAGE-DEAD", "permissions", json!({ "data": [] })).await;

        let identity = Identity {
            page_token: Some(Credential::configured_page("PAGE-DEAD")),
            ..Identity::default()
        };
        let reports = inspect_identity(&graph_client(&server), &identity).await;

        assert!(!reports[0].live);
        assert!(reports[0].edges.is_empty());
        assert_eq!(permissions.hits_async().await, 0);
    }

    #[tokio::test]
    async fn pages_come_from_the_system_user_accounts() {
        let server = MockServer::start_async().await;
        let accounts = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(graph_path("me/accounts"))
                    .query_param("access_token", SYSTEM_USER_TOKEN)
                    .query_param_exists("fields");
                then.status(200).json_body(json!({
                    "data": [
                        { "id": "111", "name": "Admissions", "category": "Education", "access_token": "EAAB-PAGE-TOKEN-111" },
                        { "id": "222" }
                    ]
                }));
            })
            .await;

        let pages = list_pages(&graph_client(&server), &full_identity(None)).await.unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].id, "111");
        assert_eq!(pages[0].name.as_deref(), Some("Admissions"));
        assert_eq!(pages[0].category.as_deref(), Some("Education"));
        let token = pages[0].token.as_deref().unwrap();
        assert!(token.starts_with("EAAB"));
        assert_ne!(token, "EAAB-PAGE-TOKEN-111");
        assert_eq!(pages[1].name, None);
        assert_eq!(pages[1].token, None);
        assert_eq!(accounts.hits_async().await, 1);
    }

    #[tokio::test]
    async fn pages_need_a_system_user_token() {
        let server = MockServer::start_async().await;
        let identity = Identity {
            page_token: Some(Credential::configured_page("PAGE-LIVE")),
            ..Identity::default()
        };

        let err = list_pages(&graph_client(&server), &identity).await.unwrap_err();
        assert!(matches!(err, TokenError::ConfigMissing("system_user_token")));
    }
}
