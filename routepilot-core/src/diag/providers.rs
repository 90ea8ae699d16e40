//! Provider query construction and payload extractors

use super::report::{EndpointIdentity, IngressIdentity, RiskAssessment};
use crate::config::{PayloadFormat, ProviderConfig};
use crate::error::ErrorKind;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::fmt;

/// Which slot of the report a provider feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderRole {
    Egress,
    Ingress,
    Risk,
}

/// One outbound lookup, fully described before dispatch
#[derive(Debug, Clone)]
pub struct ProviderQuery {
    pub role: ProviderRole,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Pin this query through a named policy for routed measurement
    pub routing_policy: Option<String>,
    pub format: PayloadFormat,
}

impl ProviderQuery {
    /// Build a query from provider settings. A token with a `token_param`
    /// goes into the query string; a bare token becomes a bearer header.
    pub fn from_config(
        role: ProviderRole,
        config: &ProviderConfig,
        routing_policy: Option<&str>,
    ) -> Self {
        let mut url = config.url.clone();
        let mut headers = Vec::new();

        if let Some(token) = &config.token {
            match &config.token_param {
                Some(param) => {
                    let sep = if url.contains('?') { '&' } else { '?' };
                    url = format!("{url}{sep}{param}={token}");
                }
                None => headers.push(("Authorization".to_string(), format!("Bearer {token}"))),
            }
        }

        Self {
            role,
            url,
            headers,
            routing_policy: routing_policy.map(str::to_string),
            format: config.format,
        }
    }
}

/// Exactly one result per dispatched query; a failed provider never blocks
/// its siblings.
#[derive(Debug)]
pub struct ProviderResult {
    pub role: ProviderRole,
    pub outcome: std::result::Result<Value, ErrorKind>,
}

/// ASN fields arrive as bare numbers from some providers and as "AS..."
/// strings from others
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Asn {
    Number(u64),
    Name(String),
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asn::Number(n) => write!(f, "{n}"),
            Asn::Name(s) => write!(f, "{s}"),
        }
    }
}

/// ipinfo-style flat egress payload
#[derive(Debug, Default, Deserialize)]
pub struct EgressPayload {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
}

impl EgressPayload {
    fn into_identity(self) -> EndpointIdentity {
        EndpointIdentity {
            ip: self.ip.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            org: self.org.unwrap_or_default(),
        }
    }
}

/// ipregistry-style nested ingress payload
#[derive(Debug, Default, Deserialize)]
pub struct IngressNestedPayload {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub location: NestedLocation,
    #[serde(default)]
    pub connection: NestedConnection,
    #[serde(default)]
    pub security: Option<SecurityBlock>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NestedLocation {
    #[serde(default)]
    pub country: NamedEntity,
    #[serde(default)]
    pub region: NamedEntity,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NamedEntity {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NestedConnection {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub asn: Option<Asn>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SecurityBlock {
    #[serde(default)]
    pub threat_score: Option<Number>,
    #[serde(default)]
    pub is_threat: Option<bool>,
}

impl SecurityBlock {
    fn into_assessment(self) -> RiskAssessment {
        RiskAssessment {
            score: self.threat_score.map(|n| n.to_string()).unwrap_or_default(),
            level: if self.is_threat == Some(true) {
                "high".to_string()
            } else {
                "low".to_string()
            },
        }
    }
}

impl IngressNestedPayload {
    fn into_identity(self) -> (IngressIdentity, Option<RiskAssessment>) {
        let identity = IngressIdentity {
            ip: self.ip.unwrap_or_default(),
            country: self.location.country.name.unwrap_or_default(),
            region: self.location.region.name.unwrap_or_default(),
            city: self.location.city.unwrap_or_default(),
            org: self.connection.organization.unwrap_or_default(),
            asn: self.connection.asn.map(|a| a.to_string()).unwrap_or_default(),
            ip_type: self.connection.kind.unwrap_or_default(),
        };
        (identity, self.security.map(SecurityBlock::into_assessment))
    }
}

/// Lightweight flat ingress payload
#[derive(Debug, Default, Deserialize)]
pub struct IngressFlatPayload {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub asn: Option<Asn>,
    #[serde(default)]
    pub isp: Option<String>,
}

impl IngressFlatPayload {
    fn into_identity(self) -> IngressIdentity {
        IngressIdentity {
            ip: self.ip.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            org: self.isp.unwrap_or_default(),
            asn: self.asn.map(|a| a.to_string()).unwrap_or_default(),
            ip_type: String::new(),
        }
    }
}

/// Dedicated risk provider payload; the security block may sit at the top
/// level or under `security`
#[derive(Debug, Default, Deserialize)]
pub struct RiskPayload {
    #[serde(default)]
    pub threat_score: Option<Number>,
    #[serde(default)]
    pub is_threat: Option<bool>,
    #[serde(default)]
    pub security: Option<SecurityBlock>,
}

impl RiskPayload {
    /// A payload with neither a score nor a threat flag carries no opinion
    /// and must not displace risk gathered elsewhere
    fn into_assessment(self) -> Option<RiskAssessment> {
        let block = self.security.unwrap_or(SecurityBlock {
            threat_score: self.threat_score,
            is_threat: self.is_threat,
        });
        if block.threat_score.is_none() && block.is_threat.is_none() {
            return None;
        }
        Some(block.into_assessment())
    }
}

/// Normalized contribution of one provider to the report
#[derive(Debug)]
pub enum Extraction {
    Egress(EndpointIdentity),
    Ingress {
        identity: IngressIdentity,
        /// Risk carried by the ingress payload's security block, used when
        /// no dedicated risk provider succeeds
        risk: Option<RiskAssessment>,
    },
    /// `None` when the provider answered but offered no score or flag
    Risk(Option<RiskAssessment>),
}

/// Map a provider's raw JSON through its role-specific extractor. A body
/// whose top level does not match the expected shape is a decode failure;
/// individual missing fields degrade to empty slots instead.
pub fn extract(query: &ProviderQuery, value: Value) -> std::result::Result<Extraction, ErrorKind> {
    match query.role {
        ProviderRole::Egress => {
            let payload: EgressPayload = serde_json::from_value(value).map_err(|_| ErrorKind::Decode)?;
            Ok(Extraction::Egress(payload.into_identity()))
        }
        ProviderRole::Ingress => match query.format {
            PayloadFormat::Nested => {
                let payload: IngressNestedPayload =
                    serde_json::from_value(value).map_err(|_| ErrorKind::Decode)?;
                let (identity, risk) = payload.into_identity();
                Ok(Extraction::Ingress { identity, risk })
            }
            PayloadFormat::Flat => {
                let payload: IngressFlatPayload =
                    serde_json::from_value(value).map_err(|_| ErrorKind::Decode)?;
                Ok(Extraction::Ingress {
                    identity: payload.into_identity(),
                    risk: None,
                })
            }
        },
        ProviderRole::Risk => {
            let payload: RiskPayload = serde_json::from_value(value).map_err(|_| ErrorKind::Decode)?;
            Ok(Extraction::Risk(payload.into_assessment()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(role: ProviderRole, format: PayloadFormat) -> ProviderQuery {
        ProviderQuery {
            role,
            url: "https://example.org/json".to_string(),
            headers: Vec::new(),
            routing_policy: None,
            format,
        }
    }

    #[test]
    fn test_token_param_joins_query_string() {
        let config = ProviderConfig {
            url: "https://ipinfo.io/json".to_string(),
            token: Some("abc123".to_string()),
            token_param: Some("token".to_string()),
            format: PayloadFormat::Flat,
        };
        let query = ProviderQuery::from_config(ProviderRole::Egress, &config, None);
        assert_eq!(query.url, "https://ipinfo.io/json?token=abc123");
        assert!(query.headers.is_empty());
    }

    #[test]
    fn test_bare_token_becomes_bearer_header() {
        let config = ProviderConfig {
            url: "https://ipinfo.io/json".to_string(),
            token: Some("abc123".to_string()),
            token_param: None,
            format: PayloadFormat::Flat,
        };
        let query = ProviderQuery::from_config(ProviderRole::Egress, &config, Some("Proxy"));
        assert_eq!(query.url, "https://ipinfo.io/json");
        assert_eq!(
            query.headers,
            vec![("Authorization".to_string(), "Bearer abc123".to_string())]
        );
        assert_eq!(query.routing_policy.as_deref(), Some("Proxy"));
    }

    #[test]
    fn test_egress_extraction() {
        let value = json!({
            "ip": "203.0.113.10",
            "country": "US",
            "region": "New York",
            "city": "NYC",
            "org": "AS13335 Cloudflare"
        });
        let extraction = extract(&query(ProviderRole::Egress, PayloadFormat::Flat), value).unwrap();
        match extraction {
            Extraction::Egress(identity) => {
                assert_eq!(identity.ip, "203.0.113.10");
                assert_eq!(identity.geography(), "US New York NYC");
                assert_eq!(identity.org, "AS13335 Cloudflare");
            }
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn test_egress_missing_fields_degrade_to_empty() {
        let value = json!({ "ip": "203.0.113.10" });
        let extraction = extract(&query(ProviderRole::Egress, PayloadFormat::Flat), value).unwrap();
        match extraction {
            Extraction::Egress(identity) => {
                assert_eq!(identity.ip, "203.0.113.10");
                assert_eq!(identity.geography(), "");
                assert_eq!(identity.org, "");
            }
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn test_nested_ingress_extraction_carries_risk() {
        let value = json!({
            "ip": "198.51.100.7",
            "location": {
                "country": { "name": "Japan" },
                "region": { "name": "Tokyo" },
                "city": "Shibuya"
            },
            "connection": {
                "organization": "Example Net",
                "asn": 64500,
                "type": "dataCenter"
            },
            "security": {
                "threat_score": 12,
                "is_threat": false
            }
        });
        let extraction =
            extract(&query(ProviderRole::Ingress, PayloadFormat::Nested), value).unwrap();
        match extraction {
            Extraction::Ingress { identity, risk } => {
                assert_eq!(identity.geography(), "Japan Tokyo Shibuya");
                assert_eq!(identity.asn, "64500");
                assert_eq!(identity.ip_type, "dataCenter");
                let risk = risk.unwrap();
                assert_eq!(risk.score, "12");
                assert_eq!(risk.level, "low");
            }
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn test_nested_ingress_without_security_yields_no_risk() {
        let value = json!({ "ip": "198.51.100.7" });
        let extraction =
            extract(&query(ProviderRole::Ingress, PayloadFormat::Nested), value).unwrap();
        match extraction {
            Extraction::Ingress { risk, .. } => assert!(risk.is_none()),
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn test_flat_ingress_extraction() {
        let value = json!({
            "ip": "198.51.100.7",
            "country": "DE",
            "region": "Berlin",
            "asn": "AS64500",
            "isp": "Example ISP"
        });
        let extraction = extract(&query(ProviderRole::Ingress, PayloadFormat::Flat), value).unwrap();
        match extraction {
            Extraction::Ingress { identity, risk } => {
                assert_eq!(identity.geography(), "DE Berlin");
                assert_eq!(identity.asn, "AS64500");
                assert_eq!(identity.org, "Example ISP");
                assert!(identity.ip_type.is_empty());
                assert!(risk.is_none());
            }
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn test_risk_threat_flag_maps_to_two_levels() {
        let high = extract(
            &query(ProviderRole::Risk, PayloadFormat::Flat),
            json!({ "threat_score": 87, "is_threat": true }),
        )
        .unwrap();
        match high {
            Extraction::Risk(Some(risk)) => {
                assert_eq!(risk.score, "87");
                assert_eq!(risk.level, "high");
            }
            other => panic!("unexpected extraction: {other:?}"),
        }

        let low = extract(
            &query(ProviderRole::Risk, PayloadFormat::Flat),
            json!({ "threat_score": 3 }),
        )
        .unwrap();
        match low {
            Extraction::Risk(Some(risk)) => assert_eq!(risk.level, "low"),
            other => panic!("unexpected extraction: {other:?}"),
        }
    }

    #[test]
    fn test_empty_risk_payload_carries_no_assessment() {
        let extraction = extract(&query(ProviderRole::Risk, PayloadFormat::Flat), json!({})).unwrap();
        assert!(matches!(extraction, Extraction::Risk(None)));

        let extraction = extract(
            &query(ProviderRole::Risk, PayloadFormat::Flat),
            json!({ "security": {} }),
        )
        .unwrap();
        assert!(matches!(extraction, Extraction::Risk(None)));
    }

    #[test]
    fn test_mismatched_top_level_is_decode_error() {
        let result = extract(
            &query(ProviderRole::Egress, PayloadFormat::Flat),
            json!("not an object"),
        );
        assert_eq!(result.unwrap_err(), ErrorKind::Decode);
    }
}
