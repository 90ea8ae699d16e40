//! Network identity diagnostics aggregation

pub mod providers;
pub mod report;

pub use providers::{ProviderQuery, ProviderResult, ProviderRole};
pub use report::{NetworkIdentityReport, UNKNOWN};

use crate::config::DiagnosticsConfig;
use crate::error::{ErrorKind, Result, RoutepilotError};
use crate::fetch::{FetchOptions, HttpFetch};
use crate::host::HostRuntime;
use futures_util::future::join_all;
use providers::{extract, Extraction};
use std::time::Duration;
use tokio::time::timeout;

/// Label used when queries go through the default route rather than a
/// pinned policy
const DEFAULT_ROUTE_LABEL: &str = "default route";

/// Build the query list from the configured provider slots. Order matters
/// for risk precedence: a dedicated risk provider is dispatched last so its
/// contribution overrides risk carried by the ingress payload.
pub fn queries_from_config(
    config: &DiagnosticsConfig,
    routing_policy: Option<&str>,
) -> Vec<ProviderQuery> {
    let mut queries = Vec::new();
    if let Some(egress) = &config.egress {
        queries.push(ProviderQuery::from_config(
            ProviderRole::Egress,
            egress,
            routing_policy,
        ));
    }
    if let Some(ingress) = &config.ingress {
        queries.push(ProviderQuery::from_config(
            ProviderRole::Ingress,
            ingress,
            routing_policy,
        ));
    }
    if let Some(risk) = &config.risk {
        queries.push(ProviderQuery::from_config(
            ProviderRole::Risk,
            risk,
            routing_policy,
        ));
    }
    queries
}

/// Run one provider query to completion. All failure modes are contained
/// here: the result records an [`ErrorKind`] and siblings keep running.
async fn query_provider<F: HttpFetch>(
    fetch: &F,
    query: &ProviderQuery,
    per_provider: Duration,
) -> ProviderResult {
    let opts = FetchOptions {
        routing_policy: query.routing_policy.clone(),
        headers: query.headers.clone(),
    };

    let outcome = match timeout(per_provider, fetch.get(&query.url, &opts)).await {
        Err(_) => Err(ErrorKind::Timeout),
        Ok(Err(e)) => {
            tracing::debug!(url = %query.url, "provider fetch failed: {e}");
            Err(ErrorKind::Network)
        }
        Ok(Ok(body)) => {
            serde_json::from_str::<serde_json::Value>(&body).map_err(|_| ErrorKind::Decode)
        }
    };

    if let Err(kind) = &outcome {
        tracing::warn!(role = ?query.role, error = %kind, "provider query degraded to sentinels");
    }

    ProviderResult {
        role: query.role,
        outcome,
    }
}

/// Query every configured provider concurrently, each under its own
/// deadline, and merge whatever settled successfully into one report.
/// A failed provider degrades its own fields to sentinels; it never aborts
/// the others or the report itself.
pub async fn collect_identity<F: HttpFetch>(
    fetch: &F,
    queries: &[ProviderQuery],
    per_provider: Duration,
    active_policy: &str,
) -> NetworkIdentityReport {
    let results = join_all(
        queries
            .iter()
            .map(|query| query_provider(fetch, query, per_provider)),
    )
    .await;

    let mut report = NetworkIdentityReport::new(active_policy);

    for (query, result) in queries.iter().zip(results) {
        let value = match result.outcome {
            Ok(value) => value,
            Err(_) => continue,
        };

        match extract(query, value) {
            Ok(Extraction::Egress(identity)) => report.egress = identity,
            Ok(Extraction::Ingress { identity, risk }) => {
                report.ingress = identity;
                if let Some(risk) = risk {
                    report.risk = risk;
                }
            }
            Ok(Extraction::Risk(Some(risk))) => report.risk = risk,
            Ok(Extraction::Risk(None)) => {}
            Err(kind) => {
                tracing::warn!(role = ?query.role, error = %kind, "provider payload rejected");
            }
        }
    }

    report
}

/// One diagnostics invocation: validate the route pin, query the providers,
/// and hand the rendered report to the host panel. Only aggregation-level
/// failures (bad configuration) surface as errors; provider failures are
/// already folded into the report as sentinels.
pub async fn run_diagnostics<H: HostRuntime, F: HttpFetch>(
    host: &H,
    fetch: &F,
    config: &DiagnosticsConfig,
    policy_override: Option<&str>,
) -> Result<NetworkIdentityReport> {
    let routing_policy = policy_override.or(config.routing_policy.as_deref());

    if let Some(name) = routing_policy {
        if !config.routes.contains_key(name) {
            return Err(RoutepilotError::RouteNotFound {
                policy: name.to_string(),
            });
        }
    }

    let queries = queries_from_config(config, routing_policy);
    let label = routing_policy.unwrap_or(DEFAULT_ROUTE_LABEL);
    let report = collect_identity(fetch, &queries, config.provider_timeout(), label).await;

    host.complete(report.clone().into_panel());
    Ok(report)
}
