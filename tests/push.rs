use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use prometheus_exposition::encoding::protobuf::{ProtobufEncoder, CONTENT_TYPE};
use prometheus_exposition::encoding::Encoder;
use prometheus_exposition::label::LabelSet;
use prometheus_exposition::metrics::counter::Counter;
use prometheus_exposition::push::{PushConfig, Pusher};
use prometheus_exposition::registry::Registry;
use prometheus_exposition::Error;

#[derive(Debug)]
struct Captured {
    method: String,
    path: String,
    content_type: Option<String>,
    body: Vec<u8>,
}

/// Accepts a single HTTP request, answers it with `status` and returns what
/// was received.
fn serve_once(status: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap().to_owned();
        let path = parts.next().unwrap().to_owned();

        let mut content_type = None;
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            let (name, value) = line.split_once(':').unwrap();
            match name.to_ascii_lowercase().as_str() {
                "content-type" => content_type = Some(value.trim().to_owned()),
                "content-length" => content_length = value.trim().parse().unwrap(),
                _ => {}
            }
        }

        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();

        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        stream.flush().unwrap();

        Captured {
            method,
            path,
            content_type,
            body,
        }
    });

    (addr, handle)
}

fn registry() -> Registry {
    let registry = Registry::default();
    let counter = Counter::new("counter_test", "A counter.", [("type", "counter")]).unwrap();
    counter
        .set(&LabelSet::from([("c_sample", "1"), ("c_subsample", "b")]), 400.0)
        .unwrap();
    registry.register(counter).unwrap();
    registry
}

fn config(gateway: String) -> PushConfig {
    PushConfig::new(gateway, "my-job")
        .with_instance("inst-1")
        .with_timeout(Duration::from_secs(5))
}

#[test]
fn add_posts_protobuf() {
    let (gateway, server) = serve_once("202 Accepted");
    let registry = registry();

    Pusher::new(config(gateway)).unwrap().add(&registry).unwrap();

    let captured = server.join().unwrap();
    assert_eq!("POST", captured.method);
    assert_eq!("/metrics/jobs/my-job/instances/inst-1", captured.path);
    assert_eq!(Some(CONTENT_TYPE.to_owned()), captured.content_type);
    assert_eq!(
        ProtobufEncoder::default().marshall(&registry).unwrap(),
        captured.body
    );
}

#[test]
fn replace_puts() {
    let (gateway, server) = serve_once("200 OK");

    Pusher::new(PushConfig::new(gateway + "/", "my-job"))
        .unwrap()
        .replace(&registry())
        .unwrap();

    let captured = server.join().unwrap();
    assert_eq!("PUT", captured.method);
    assert_eq!("/metrics/jobs/my-job", captured.path);
}

#[test]
fn delete_sends_delete() {
    let (gateway, server) = serve_once("202 Accepted");

    Pusher::new(config(gateway))
        .unwrap()
        .delete(&registry())
        .unwrap();

    assert_eq!("DELETE", server.join().unwrap().method);
}

#[test]
fn error_status_is_reported() {
    let (gateway, server) = serve_once("500 Internal Server Error");

    let result = Pusher::new(config(gateway)).unwrap().add(&registry());

    assert!(matches!(result, Err(Error::Push { .. })));
    server.join().unwrap();
}

#[test]
fn unreachable_gateway_is_reported() {
    // Bind and drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let pusher = Pusher::new(config(format!("http://127.0.0.1:{port}"))).unwrap();
    assert!(matches!(pusher.add(&registry()), Err(Error::Push { .. })));
}
