//! API endpoint check - every declared endpoint must be reachable
//!
//! An endpoint is accessible when it answers with a status below 500; client
//! errors (4xx) still prove the service is up. Transport failures (timeout,
//! refused connection, DNS) mark only that endpoint inaccessible. Probes run on
//! a bounded pool of scoped threads, each request under its own timeout, and
//! results are reported in declared order regardless of completion order.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{Check, CheckContext, CheckKind, VerificationResult};
use crate::config::Specification;

pub struct ApiEndpointCheck;

/// What one endpoint probe observed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EndpointOutcome {
    Responded {
        status_code: u16,
        /// Seconds from request start to full body read
        response_time: f64,
        accessible: bool,
        content_length: usize,
        headers: BTreeMap<String, String>,
    },
    Unreachable {
        error: String,
        error_type: &'static str,
        accessible: bool,
    },
}

impl EndpointOutcome {
    pub fn is_accessible(&self) -> bool {
        match self {
            Self::Responded { accessible, .. } | Self::Unreachable { accessible, .. } => {
                *accessible
            }
        }
    }
}

/// Status codes below 500 count as reachable
pub fn is_accessible_status(status_code: u16) -> bool {
    status_code < 500
}

/// Join a base URL and an endpoint path without doubling the slash.
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    if base_url.ends_with('/') && endpoint.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), endpoint)
    } else {
        format!("{base_url}{endpoint}")
    }
}

fn transport_error_type(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "Timeout"
    } else if e.is_connect() {
        "ConnectionError"
    } else if e.is_builder() {
        "InvalidUrl"
    } else if e.is_redirect() {
        "TooManyRedirects"
    } else if e.is_body() || e.is_decode() {
        "BodyError"
    } else {
        "RequestError"
    }
}

/// Build the probe client: per-request timeout, no auth headers.
pub fn create_probe_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(concat!("attest/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Issue one GET and classify the outcome.
pub fn probe_endpoint(client: &Client, url: &str) -> EndpointOutcome {
    let start = Instant::now();
    let response = client.get(url).send().and_then(|response| {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect::<BTreeMap<_, _>>();
        let body = response.bytes()?;
        Ok((status, headers, body.len()))
    });

    match response {
        Ok((status_code, headers, content_length)) => EndpointOutcome::Responded {
            status_code,
            response_time: start.elapsed().as_secs_f64(),
            accessible: is_accessible_status(status_code),
            content_length,
            headers,
        },
        Err(e) => EndpointOutcome::Unreachable {
            error: e.to_string(),
            error_type: transport_error_type(&e),
            accessible: false,
        },
    }
}

/// Probe every endpoint with at most `workers` requests in flight.
///
/// Output order matches `endpoints`.
pub fn probe_all(
    client: &Client,
    base_url: &str,
    endpoints: &[String],
    workers: usize,
) -> Vec<EndpointOutcome> {
    let slots: Vec<Mutex<Option<EndpointOutcome>>> =
        endpoints.iter().map(|_| Mutex::new(None)).collect();
    let next = AtomicUsize::new(0);
    let workers = workers.clamp(1, endpoints.len().max(1));

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(endpoint) = endpoints.get(index) else {
                    break;
                };
                let url = endpoint_url(base_url, endpoint);
                let outcome = probe_endpoint(client, &url);
                debug!(endpoint = %endpoint, accessible = outcome.is_accessible(), "endpoint probed");
                if let Ok(mut slot) = slots[index].lock() {
                    *slot = Some(outcome);
                }
            });
        }
    });

    slots
        .into_iter()
        .map(|slot| {
            slot.into_inner().ok().flatten().unwrap_or(EndpointOutcome::Unreachable {
                error: "probe did not complete".to_string(),
                error_type: "ProbeAborted",
                accessible: false,
            })
        })
        .collect()
}

/// Declared endpoints with repeats dropped, first occurrence kept.
pub fn distinct_endpoints(endpoints: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    endpoints
        .iter()
        .filter(|endpoint| seen.insert(endpoint.as_str()))
        .cloned()
        .collect()
}

impl Check for ApiEndpointCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::ApiEndpoints
    }

    fn execute(&self, spec: &Specification, ctx: &CheckContext<'_>) -> Result<VerificationResult> {
        let api = &spec.api;
        info!(
            check = %self.kind(),
            base_url = %api.base_url,
            endpoints = api.endpoints.len(),
            "checking API endpoints"
        );

        let endpoints = distinct_endpoints(&api.endpoints);
        if endpoints.len() < api.endpoints.len() {
            warn!(
                declared = api.endpoints.len(),
                distinct = endpoints.len(),
                "duplicate endpoints are checked once"
            );
        }

        let client = create_probe_client(ctx.request_timeout)?;
        let outcomes = probe_all(&client, &api.base_url, &endpoints, ctx.api_workers);

        let mut successful = Vec::new();
        let mut failed = Vec::new();
        let mut results = serde_json::Map::new();
        for (endpoint, outcome) in endpoints.iter().zip(&outcomes) {
            if outcome.is_accessible() {
                successful.push(endpoint.as_str());
            } else {
                failed.push(endpoint.as_str());
            }
            results.insert(
                endpoint.clone(),
                serde_json::to_value(outcome).context("Failed to serialize endpoint outcome")?,
            );
        }

        // Ordered view alongside the keyed map; JSON objects do not keep order
        let ordered: Vec<_> = endpoints
            .iter()
            .zip(&outcomes)
            .map(|(endpoint, outcome)| json!({ "endpoint": endpoint, "outcome": outcome }))
            .collect();

        let evidence = ctx.record(
            self.kind().evidence_kind(),
            self.kind().evidence_kind(),
            json!({
                "base_url": api.base_url,
                "tested_endpoints": endpoints,
                "timeout_seconds": ctx.request_timeout.as_secs_f64(),
                "results": results,
                "ordered_results": ordered,
                "successful_endpoints": successful,
                "failed_endpoints": failed,
                "total_endpoints_tested": endpoints.len(),
                "successful_count": successful.len(),
                "failed_count": failed.len(),
            }),
        )?;

        let component = self.kind().component();
        let evidence = Some(evidence);

        if !failed.is_empty() {
            return Ok(VerificationResult::failed(
                component,
                format!("{} endpoints failed: {}", failed.len(), failed.join(", ")),
                evidence,
            ));
        }

        let details = if successful.is_empty() {
            "No endpoints declared (nothing to check)".to_string()
        } else {
            format!("All {} endpoints accessible", successful.len())
        };
        Ok(VerificationResult::passed(component, details, evidence))
    }
}
