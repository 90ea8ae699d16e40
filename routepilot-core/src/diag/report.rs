//! Normalized network identity report

use crate::host::PanelResult;

/// Placeholder substituted for any report field that could not be
/// determined, keeping the report shape complete and renderable.
pub const UNKNOWN: &str = "unknown";

/// Join the non-empty components with single spaces, trimming each one.
/// An empty component is omitted rather than leaving a double space.
pub fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        UNKNOWN
    } else {
        value
    }
}

/// Identity observed at the traffic exit point. Empty strings mark
/// undetermined fields until render time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointIdentity {
    pub ip: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub org: String,
}

impl EndpointIdentity {
    pub fn geography(&self) -> String {
        join_nonempty(&[&self.country, &self.region, &self.city])
    }
}

/// Identity observed via the second, independent provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngressIdentity {
    pub ip: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub org: String,
    pub asn: String,
    /// dataCenter / residential / etc.
    pub ip_type: String,
}

impl IngressIdentity {
    pub fn geography(&self) -> String {
        join_nonempty(&[&self.country, &self.region, &self.city])
    }

    fn asn_org(&self) -> String {
        join_nonempty(&[&self.asn, &self.org])
    }
}

/// Risk provider contribution: score verbatim, coarse two-level label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskAssessment {
    pub score: String,
    pub level: String,
}

/// Aggregate built once per invocation from the settled provider results
/// and handed to the host for display; never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkIdentityReport {
    pub active_policy: String,
    pub egress: EndpointIdentity,
    pub ingress: IngressIdentity,
    pub risk: RiskAssessment,
}

impl NetworkIdentityReport {
    pub fn new(active_policy: &str) -> Self {
        Self {
            active_policy: active_policy.to_string(),
            ..Default::default()
        }
    }

    /// Ordered, labeled report lines; undetermined fields render as the
    /// sentinel so the shape is always complete
    pub fn render_lines(&self) -> Vec<String> {
        vec![
            format!("Policy: {}", or_unknown(&self.active_policy)),
            format!("Egress IP: {}", or_unknown(&self.egress.ip)),
            format!("Egress location: {}", or_unknown(&self.egress.geography())),
            format!("Egress ASN/ISP: {}", or_unknown(&self.egress.org)),
            format!("Ingress IP: {}", or_unknown(&self.ingress.ip)),
            format!("Ingress location: {}", or_unknown(&self.ingress.geography())),
            format!("Ingress ASN/ISP: {}", or_unknown(&self.ingress.asn_org())),
            format!("IP type: {}", or_unknown(&self.ingress.ip_type)),
            format!(
                "Risk score: {} ({})",
                or_unknown(&self.risk.score),
                or_unknown(&self.risk.level)
            ),
        ]
    }

    pub fn into_panel(self) -> PanelResult {
        PanelResult::success("IP risk & geolocation", &self.render_lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_omits_empty_components() {
        assert_eq!(join_nonempty(&["US", "", "NYC"]), "US NYC");
        assert_eq!(join_nonempty(&["", "", ""]), "");
        assert_eq!(join_nonempty(&[" US ", "CA", ""]), "US CA");
    }

    #[test]
    fn test_empty_report_renders_sentinels() {
        let report = NetworkIdentityReport::new("default");
        let lines = report.render_lines();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[1], "Egress IP: unknown");
        assert_eq!(lines[2], "Egress location: unknown");
        assert_eq!(lines[8], "Risk score: unknown (unknown)");
    }

    #[test]
    fn test_geography_line_joins_components() {
        let mut report = NetworkIdentityReport::new("default");
        report.egress.country = "US".to_string();
        report.egress.city = "NYC".to_string();
        assert_eq!(report.render_lines()[2], "Egress location: US NYC");
    }

    #[test]
    fn test_panel_carries_all_lines() {
        let panel = NetworkIdentityReport::new("Proxy").into_panel();
        assert_eq!(panel.title, "IP risk & geolocation");
        assert_eq!(panel.content.lines().count(), 9);
        assert!(panel.content.starts_with("Policy: Proxy"));
    }
}
