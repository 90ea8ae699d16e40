//! Host runtime capabilities consumed by the scheduler and diagnostics

use crate::config::HostConfig;
use crate::error::RoutepilotError;
use std::future::Future;

const SUCCESS_ICON: &str = "shield.lefthalf.fill";
const SUCCESS_COLOR: &str = "#0066CC";
const ERROR_ICON: &str = "exclamationmark.triangle.fill";
const ERROR_COLOR: &str = "#FF0000";

/// Terminal, displayable result handed back to the host's panel surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelResult {
    pub title: String,
    pub content: String,
    pub icon: String,
    pub icon_color: String,
}

impl PanelResult {
    pub fn success(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            icon: SUCCESS_ICON.to_string(),
            icon_color: SUCCESS_COLOR.to_string(),
        }
    }

    pub fn error(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            icon: ERROR_ICON.to_string(),
            icon_color: ERROR_COLOR.to_string(),
        }
    }
}

/// The proxy runtime surface this toolkit drives. One invocation performs at
/// most one policy write plus one notification, or one panel emission.
pub trait HostRuntime {
    /// Select `node` as the active choice in the named policy group
    fn set_policy_group_node(
        &self,
        group: &str,
        node: &str,
    ) -> impl Future<Output = std::result::Result<(), RoutepilotError>> + Send;

    /// Fire-and-forget user-visible notification
    fn post_notification(&self, title: &str, subtitle: &str, body: &str);

    /// Deliver the final displayable result for this invocation
    fn complete(&self, result: PanelResult);
}

/// Host backend speaking a Clash-style local management API
/// (`PUT /proxies/{group}` selects a node within a group).
pub struct ApiHost {
    client: reqwest::Client,
    api_url: String,
    secret: Option<String>,
}

impl ApiHost {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            secret: config.secret.clone(),
        }
    }

    fn group_endpoint(&self, group: &str) -> String {
        format!("{}/proxies/{}", self.api_url, group)
    }
}

impl HostRuntime for ApiHost {
    async fn set_policy_group_node(
        &self,
        group: &str,
        node: &str,
    ) -> std::result::Result<(), RoutepilotError> {
        let apply_error = |reason: String| RoutepilotError::Apply {
            group: group.to_string(),
            node: node.to_string(),
            reason,
        };

        let mut request = self
            .client
            .put(self.group_endpoint(group))
            .json(&serde_json::json!({ "name": node }));
        if let Some(secret) = &self.secret {
            request = request.bearer_auth(secret);
        }

        let response = request.send().await.map_err(|e| apply_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(apply_error(format!("status {status}")));
        }

        tracing::info!(group, node, "policy group selection applied");
        Ok(())
    }

    fn post_notification(&self, title: &str, subtitle: &str, body: &str) {
        tracing::info!(title, subtitle, body, "notification");
        println!("{title} | {subtitle} | {body}");
    }

    fn complete(&self, result: PanelResult) {
        tracing::debug!(icon = %result.icon, "panel result delivered");
        println!("== {} ==", result.title);
        println!("{}", result.content);
    }
}
