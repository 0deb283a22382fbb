#[cfg(test)]
mod tests {
    use std::path::Path;

    use serial_test::serial;

    use crate::config::proc_loader::{file_to_config, parse_config};
    use crate::config::settings::LogFormat;

    const MINIMAL: &str = r#"
token:
  page_token: "EAAB-page"
webhook:
  verify_token: "verify-me"
"#;

    #[tokio::test]
    async fn minimal_config_gets_defaults() {
        let cfg = parse_config(MINIMAL.to_string()).await.expect("valid config");

        assert_eq!(cfg.settings.server.host, "0.0.0.0");
        assert_eq!(cfg.settings.server.port, "3007");
        assert_eq!(cfg.settings.http.timeout_ms, 10_000);
        assert!(!cfg.settings.metrics.is_enabled);
        let logging = cfg.settings.logging.expect("default logging");
        assert_eq!(logging.level, "info");
        assert!(matches!(logging.format, LogFormat::Compact));

        assert_eq!(cfg.graph.base_url, "https://graph.facebook.com");
        assert_eq!(cfg.graph.version, "v17.0");
        assert_eq!(cfg.token.env_file, ".env");
        assert_eq!(cfg.token.env_key, "PAGE_ACCESS_TOKEN");
        assert_eq!(cfg.token.refresh_interval_seconds, 21_600);
        assert_eq!(cfg.webhook.path, "/webhook");
        assert_eq!(cfg.crm.program_code, "OGLAMBA201");
    }

    #[tokio::test]
    async fn empty_credentials_are_treated_as_absent() {
        let cfg = parse_config(
            r#"
graph:
  base_url: "https://graph.facebook.com/"
token:
  app_id: ""
  app_secret: "  "
  page_id: "42"
  system_user_token: "EAAB-system"
webhook:
  verify_token: "verify-me"
"#
            .to_string(),
        )
        .await
        .expect("valid config");

        assert!(cfg.token.app_id.is_none());
        assert!(cfg.token.app_secret.is_none());
        assert!(cfg.token.page_token.is_none());
        assert_eq!(cfg.token.page_id.as_deref(), Some("42"));
        assert_eq!(cfg.graph.base_url, "https://graph.facebook.com");
    }

    #[tokio::test]
    #[should_panic(expected = "config is not valid")]
    async fn config_without_any_acquisition_path_is_rejected() {
        parse_config(
            r#"
token:
  app_id: "123"
  app_secret: "secret"
webhook:
  verify_token: "verify-me"
"#
            .to_string(),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn every_problem_is_reported_at_once() {
        let err = parse_config(
            r#"
settings:
  server:
    port: "not-a-port"
  http:
    timeout_ms: 0
  retry:
    attempts: 0
    base_delay_ms: 500
    max_delay_ms: 100
graph:
  base_url: "ftp://graph.facebook.com"
token:
  page_token: "EAAB-page"
  refresh_interval_seconds: 0
webhook:
  path: "webhook"
  verify_token: ""
crm:
  url: "glaonline"
"#
            .to_string(),
        )
        .await
        .unwrap_err()
        .to_string();

        for expected in [
            "settings.server.port",
            "settings.http.timeout_ms",
            "attempts",
            "graph.base_url",
            "token.refresh_interval_seconds",
            "webhook.path",
            "webhook.verify_token",
            "crm.url",
        ] {
            assert!(err.contains(expected), "missing '{}' in:\n{}", expected, err);
        }
    }

    #[tokio::test]
    #[serial]
    async fn repository_config_is_valid_with_env_credentials() {
        std::env::set_var("PAGE_ACCESS_TOKEN", "EAAB-from-env");
        std::env::set_var("VERIFY_TOKEN", "verify-me");

        let cfg = file_to_config(Path::new("leadgen-relay.yaml"))
            .await
            .expect("leadgen-relay.yaml must exist in repo root for tests");

        assert_eq!(cfg.token.page_token.as_deref(), Some("EAAB-from-env"));
        assert_eq!(cfg.webhook.verify_token, "verify-me");
        assert!(cfg.settings.metrics.is_enabled);

        std::env::remove_var("PAGE_ACCESS_TOKEN");
        std::env::remove_var("VERIFY_TOKEN");
    }

    #[tokio::test]
    #[serial]
    async fn repository_config_takes_page_and_crm_settings_from_env() {
        std::env::set_var("VERIFY_TOKEN", "verify-me");
        std::env::set_var("SYSTEM_USER_TOKEN", "EAAB-system-user");
        std::env::set_var("FACEBOOK_PAGE_ID", "1234567890");
        std::env::set_var("CRM_API_URL", "http://crm.internal:8080/register");
        std::env::set_var("UTM_CAMPAIGN", "Spring_Intake");

        let cfg = file_to_config(Path::new("leadgen-relay.yaml"))
            .await
            .expect("leadgen-relay.yaml must exist in repo root for tests");

        assert_eq!(cfg.token.page_id.as_deref(), Some("1234567890"));
        assert_eq!(cfg.crm.url, "http://crm.internal:8080/register");
        assert_eq!(cfg.crm.utm_campaign, "Spring_Intake");
        // unset variables fall back to the inline defaults
        assert_eq!(cfg.crm.program_code, "OGLAMBA201");
        assert_eq!(cfg.crm.default_dob, "12/7/2000");

        for var in ["VERIFY_TOKEN", "SYSTEM_USER_TOKEN", "FACEBOOK_PAGE_ID", "CRM_API_URL", "UTM_CAMPAIGN"] {
            std::env::remove_var(var);
        }
    }
}
