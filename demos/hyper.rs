use http_body_util::{combinators, BodyExt, Full};
use hyper::{
    body::{Bytes, Incoming},
    server::conn::http1,
    service::service_fn,
    Request, Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use prometheus_exposition::{
    exposition::{render, METRICS_PATH},
    label::LabelSet,
    metrics::counter::Counter,
    registry::Registry,
};
use std::{
    future::Future,
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    pin::Pin,
    sync::Arc,
};
use tokio::{
    net::TcpListener,
    pin,
    signal::unix::{signal, SignalKind},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let request_counter = Counter::new(
        "tokio_hyper_example_requests_total",
        "How many requests the application has received",
        [("app", "tokio_hyper_example")],
    )
    .unwrap();

    let registry = Registry::default();
    registry.register(request_counter.clone()).unwrap();

    // Spawn a server to serve the metrics endpoint.
    let metrics_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8001);
    start_metrics_server(metrics_addr, registry, request_counter).await
}

/// Start a HTTP server to report metrics.
pub async fn start_metrics_server(metrics_addr: SocketAddr, registry: Registry, requests: Counter) {
    eprintln!("Starting metrics server on {metrics_addr}");

    let state = Arc::new((registry, requests));

    let tcp_listener = TcpListener::bind(metrics_addr).await.unwrap();
    let server = http1::Builder::new();
    while let Ok((stream, _)) = tcp_listener.accept().await {
        let mut shutdown_stream = signal(SignalKind::terminate()).unwrap();
        let io = TokioIo::new(stream);
        let server_clone = server.clone();
        let state_clone = state.clone();
        tokio::task::spawn(async move {
            let conn = server_clone.serve_connection(io, service_fn(make_handler(state_clone)));
            pin!(conn);
            tokio::select! {
                _ = conn.as_mut() => {}
                _ = shutdown_stream.recv() => {
                    conn.as_mut().graceful_shutdown();
                }
            }
        });
    }
}

/// Boxed HTTP body for responses
type BoxBody = combinators::BoxBody<Bytes, hyper::Error>;

/// This function returns a HTTP handler (i.e. another function)
pub fn make_handler(
    state: Arc<(Registry, Counter)>,
) -> impl Fn(Request<Incoming>) -> Pin<Box<dyn Future<Output = io::Result<Response<BoxBody>>> + Send>>
{
    // This closure answers `GET /metrics` in the format the scraper asks for.
    move |req: Request<Incoming>| {
        let state = state.clone();

        Box::pin(async move {
            let (registry, requests) = &*state;
            let path = req.uri().path().to_owned();
            requests
                .inc(&LabelSet::from([("path", path.as_str())]))
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

            if path != METRICS_PATH {
                return Ok(Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(full(Bytes::new()))
                    .unwrap());
            }

            let headers = req
                .headers()
                .iter()
                .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)));
            render(registry, headers)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
                .map(|exposition| {
                    Response::builder()
                        .header(hyper::header::CONTENT_TYPE, exposition.content_type)
                        .body(full(Bytes::from(exposition.body)))
                        .unwrap()
                })
        })
    }
}

/// helper function to build a full boxed body
pub fn full(body: Bytes) -> BoxBody {
    Full::new(body).map_err(|never| match never {}).boxed()
}
