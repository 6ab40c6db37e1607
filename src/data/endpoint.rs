//! Deployment resolution for the managed forecasting runtime.
//!
//! Each forecast horizon maps to exactly one named deployment. The mapping is
//! a static table: resolution is pure and deterministic, and the UI only ever
//! offers the two horizons, so no fallback path exists.

use crate::domain::Horizon;

const SHORT_TERM_DEPLOYMENT: &str = "canvas-shortterm";
const LONG_TERM_DEPLOYMENT: &str = "canvas-new-deployment-07-11-2024-2-00-AM";

/// A resolved invocation target: deployment name plus hosting region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTarget {
    pub deployment: &'static str,
    pub region: String,
}

impl EndpointTarget {
    /// Full invocation URL for this deployment.
    pub fn invocation_url(&self) -> String {
        format!(
            "https://runtime.sagemaker.{}.amazonaws.com/endpoints/{}/invocations",
            self.region, self.deployment
        )
    }
}

/// Resolve the deployment for a horizon.
pub fn resolve(horizon: Horizon, region: &str) -> EndpointTarget {
    let deployment = match horizon {
        Horizon::ShortTerm => SHORT_TERM_DEPLOYMENT,
        Horizon::LongTerm => LONG_TERM_DEPLOYMENT,
    };
    EndpointTarget {
        deployment,
        region: region.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_horizons_to_literal_deployments() {
        let short = resolve(Horizon::ShortTerm, "eu-north-1");
        assert_eq!(short.deployment, "canvas-shortterm");

        let long = resolve(Horizon::LongTerm, "eu-north-1");
        assert_eq!(long.deployment, "canvas-new-deployment-07-11-2024-2-00-AM");
    }

    #[test]
    fn resolution_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                resolve(Horizon::ShortTerm, "eu-north-1"),
                resolve(Horizon::ShortTerm, "eu-north-1")
            );
        }
    }

    #[test]
    fn invocation_url_includes_region_and_deployment() {
        let target = resolve(Horizon::ShortTerm, "eu-north-1");
        assert_eq!(
            target.invocation_url(),
            "https://runtime.sagemaker.eu-north-1.amazonaws.com/endpoints/canvas-shortterm/invocations"
        );
    }
}
