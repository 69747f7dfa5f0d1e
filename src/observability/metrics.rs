//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define host metrics (requests, latency, connections)
//! - Expose Prometheus-compatible metrics endpoint
//! - Decorate the composed handler with request instrumentation
//!
//! # Metrics
//! - `host_requests_total` (counter): total requests by method, status, route
//! - `host_request_duration_seconds` (histogram): latency distribution
//! - `host_active_connections` (gauge): current connection count
//!
//! # Design Decisions
//! - Route label is the matched pattern, never the raw path
//! - Recording is a no-op until a recorder is installed

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::MatchedPattern;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, route: &str, started: Instant) {
    metrics::counter!(
        "host_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "host_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}

/// Update the open connection gauge.
pub fn record_active_connections(count: u64) {
    metrics::gauge!("host_active_connections").set(count as f64);
}

/// Middleware recording every request that passes through the composed handler.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();

    let response = next.run(request).await;

    let route = response
        .extensions()
        .get::<MatchedPattern>()
        .map(|m| m.0.as_str())
        .unwrap_or("none");
    record_request(&method, response.status().as_u16(), route, started);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;
    use crate::http::{build_app, ResponseWriter};
    use crate::lifecycle::startup::compose_surface;
    use crate::lifecycle::Lifecycle;
    use crate::routing::{Reply, RouteTable};
    use axum::body::Body;
    use axum::Router;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut config = HostConfig::default();
        config.observability.metrics_enabled = true;
        config.observability.access_log = false;

        let mut routes = RouteTable::new();
        routes
            .register("/activity/", |_r: Request<Body>| async { Reply::ok("entries") })
            .unwrap();
        let surface = compose_surface(&config, &Lifecycle::new(), routes, Instant::now()).unwrap();
        build_app(&config, surface, ResponseWriter::default())
    }

    fn counter_line<'a>(rendered: &'a str, labels: &[&str]) -> Option<&'a str> {
        rendered
            .lines()
            .filter(|line| line.starts_with("host_requests_total{"))
            .find(|line| labels.iter().all(|label| line.contains(label)))
    }

    #[tokio::test]
    async fn requests_labelled_by_matched_pattern() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let app = app();
        for path in ["/activity/1", "/activity/2", "/missing"] {
            app.clone()
                .oneshot(axum::http::Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
        }

        let rendered = handle.render();
        let matched = counter_line(&rendered, &[r#"route="/activity/""#, r#"status="200""#])
            .expect("matched route not recorded");
        assert!(matched.ends_with(" 2"), "{}", matched);

        let unmatched = counter_line(&rendered, &[r#"route="none""#, r#"status="404""#])
            .expect("unmatched route not recorded");
        assert!(unmatched.ends_with(" 1"), "{}", unmatched);

        assert!(!rendered.contains("/activity/1"));
        assert!(rendered.contains("host_request_duration_seconds"));
    }
}
