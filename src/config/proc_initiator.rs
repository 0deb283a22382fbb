use crate::config::service::ServiceConfig;

/// Normalize values coming from `${VAR}` expansion: an unset variable expands to
/// an empty string, which must behave exactly like an absent key.
pub fn initiate_default_values(mut config: ServiceConfig) -> ServiceConfig {
    let token = &mut config.token;
    for value in [
        &mut token.app_id,
        &mut token.app_secret,
        &mut token.page_id,
        &mut token.system_user_token,
        &mut token.page_token,
    ] {
        normalize_optional(value);
    }

    config.graph.base_url = config.graph.base_url.trim().trim_end_matches('/').to_owned();
    config.graph.version = config.graph.version.trim().trim_matches('/').to_owned();
    config.webhook.verify_token = config.webhook.verify_token.trim().to_owned();
    config.crm.url = config.crm.url.trim().to_owned();

    config
}

fn normalize_optional(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty());
}
