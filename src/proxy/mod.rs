//! Cross-origin relay routing
//!
//! Forager fetches third-party pages through a small pool of relay endpoints.
//! The router tracks per-endpoint health and a sliding request-rate window,
//! prefers endpoints that are healthy and under their window, and falls back
//! to plain round-robin when the whole pool is saturated so the crawl always
//! makes forward progress. Local and loopback targets bypass the pool and are
//! fetched directly.

use crate::config::ProxyConfig;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use url::Url;

/// A routed fetch target
///
/// `via` names the relay template used, or `None` for a direct fetch. The
/// coordinator passes `via` back to [`ProxyRouter::mark_unhealthy`] when a
/// network-class failure occurs on a proxied request.
#[derive(Debug, Clone)]
pub struct Routed {
    /// The URL to actually request
    pub url: String,

    /// The relay template that produced it, if any
    pub via: Option<String>,
}

/// A single relay endpoint with health and rate-window state
#[derive(Debug)]
pub struct ProxyEndpoint {
    /// URL template containing a `{url}` placeholder
    template: String,

    /// Whether the endpoint is currently usable
    healthy: bool,

    /// When the endpoint was last marked unhealthy
    unhealthy_since: Option<Instant>,

    /// When the endpoint last served a request
    last_used_at: Option<Instant>,

    /// Timestamps of recent requests, pruned to the window length
    window: VecDeque<Instant>,
}

impl ProxyEndpoint {
    fn new(template: String) -> Self {
        Self {
            template,
            healthy: true,
            unhealthy_since: None,
            last_used_at: None,
            window: VecDeque::new(),
        }
    }

    /// Drops window entries older than `window_len`
    fn prune_window(&mut self, window_len: Duration, now: Instant) {
        while let Some(front) = self.window.front() {
            if now.duration_since(*front) > window_len {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    fn under_limit(&self, window_max: usize) -> bool {
        self.window.len() < window_max
    }

    fn record_use(&mut self, now: Instant) {
        self.window.push_back(now);
        self.last_used_at = Some(now);
    }

    /// The endpoint's URL template
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether the endpoint is currently marked healthy
    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// When the endpoint last served a request
    pub fn last_used_at(&self) -> Option<Instant> {
        self.last_used_at
    }
}

/// Relay pool with rotation, health tracking, and rate windows
///
/// The router is owned by the crawl coordinator and constructed per session,
/// so health and window state never leak between jobs. Routing never fails:
/// with an empty pool, an unroutable host, or a fully saturated pool it still
/// returns a usable target.
pub struct ProxyRouter {
    endpoints: Vec<ProxyEndpoint>,
    window_len: Duration,
    window_max: usize,
    cooldown: Duration,
    rr_cursor: usize,
}

impl ProxyRouter {
    /// Creates a router from proxy configuration
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            endpoints: config
                .endpoints
                .iter()
                .map(|t| ProxyEndpoint::new(t.clone()))
                .collect(),
            window_len: Duration::from_secs(config.window_secs),
            window_max: config.window_max_requests as usize,
            cooldown: Duration::from_secs(config.cooldown_secs),
            rr_cursor: 0,
        }
    }

    /// Routes a fetch for `url` through the pool
    ///
    /// Selection order:
    /// 1. local/loopback hosts and empty pools fetch direct;
    /// 2. endpoints whose cool-down has elapsed self-heal;
    /// 3. the first endpoint that is healthy and under its window wins;
    /// 4. otherwise round-robin over the whole pool, ignoring load.
    pub fn route(&mut self, url: &Url) -> Routed {
        if self.endpoints.is_empty() || is_local_target(url) {
            return Routed {
                url: url.to_string(),
                via: None,
            };
        }

        let now = Instant::now();
        self.heal_cooled_down(now);

        for endpoint in &mut self.endpoints {
            endpoint.prune_window(self.window_len, now);
        }

        let window_max = self.window_max;
        if let Some(endpoint) = self
            .endpoints
            .iter_mut()
            .find(|e| e.healthy && e.under_limit(window_max))
        {
            endpoint.record_use(now);
            return Routed {
                url: apply_template(&endpoint.template, url),
                via: Some(endpoint.template.clone()),
            };
        }

        // Every endpoint is unhealthy or saturated; rotate over the full
        // pool anyway rather than stalling the crawl.
        let idx = self.rr_cursor % self.endpoints.len();
        self.rr_cursor = self.rr_cursor.wrapping_add(1);
        let endpoint = &mut self.endpoints[idx];
        endpoint.record_use(now);
        tracing::debug!(
            "All relays saturated or unhealthy, round-robin via {}",
            endpoint.template
        );
        Routed {
            url: apply_template(&endpoint.template, url),
            via: Some(endpoint.template.clone()),
        }
    }

    /// Marks the endpoint with the given template unhealthy
    ///
    /// The endpoint recovers automatically once the configured cool-down has
    /// elapsed. Unknown templates are ignored.
    pub fn mark_unhealthy(&mut self, template: &str) {
        if let Some(endpoint) = self
            .endpoints
            .iter_mut()
            .find(|e| e.template == template)
        {
            endpoint.healthy = false;
            endpoint.unhealthy_since = Some(Instant::now());
            tracing::warn!("Relay marked unhealthy: {}", template);
        }
    }

    /// Returns the number of endpoints currently marked healthy
    pub fn healthy_count(&self) -> usize {
        self.endpoints.iter().filter(|e| e.healthy).count()
    }

    /// Flips endpoints back to healthy once their cool-down has elapsed
    fn heal_cooled_down(&mut self, now: Instant) {
        for endpoint in &mut self.endpoints {
            if !endpoint.healthy {
                if let Some(since) = endpoint.unhealthy_since {
                    if now.duration_since(since) >= self.cooldown {
                        endpoint.healthy = true;
                        endpoint.unhealthy_since = None;
                        tracing::info!("Relay recovered: {}", endpoint.template);
                    }
                }
            }
        }
    }
}

/// Substitutes the percent-encoded target into a relay template
fn apply_template(template: &str, url: &Url) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(url.as_str().as_bytes()).collect();
    template.replace("{url}", &encoded)
}

/// Returns true for hosts that are fetched directly, bypassing the pool
///
/// Loopback, private-range, and link-local addresses never need a
/// cross-origin relay, and neither do mDNS-style local hostnames.
pub fn is_local_target(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return true;
    };

    if host == "localhost" || host.ends_with(".local") || host.ends_with(".internal") {
        return true;
    }

    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return match ip {
            IpAddr::V4(v4) => {
                v4.is_loopback() || v4.is_private() || v4.is_link_local() || v4.is_unspecified()
            }
            IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
        };
    }

    false
}
