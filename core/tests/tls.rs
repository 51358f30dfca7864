//! Trust policy against a live HTTPS room server with a self-signed
//! certificate issued for a host name other than the one dialed.

use std::net::SocketAddr;
use std::sync::mpsc;
use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use rcgen::{generate_simple_self_signed, CertifiedKey};
use signal_http::{AsyncRequest, Completion, HttpConfig, TrustPolicy};

const WAIT: Duration = Duration::from_secs(10);

fn start_tls_server() -> SocketAddr {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let CertifiedKey { cert, key_pair } =
        generate_simple_self_signed(vec!["rooms.invalid".to_string()]).unwrap();
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let tls = RustlsConfig::from_pem(cert.pem().into_bytes(), key_pair.serialize_pem().into_bytes())
                .await
                .unwrap();
            axum_server::from_tcp_rustls(std_listener, tls)
                .serve(mock_server::app().into_make_service())
                .await
        })
        .unwrap();
    });

    addr
}

fn get_with(trust: TrustPolicy, url: &str) -> Completion {
    let (tx, rx) = mpsc::channel::<Completion>();
    let config = HttpConfig {
        trust,
        ..HttpConfig::default()
    };
    let mut req = AsyncRequest::new("GET", url, None, tx).unwrap().with_config(config);
    req.send().unwrap();
    rx.recv_timeout(WAIT).expect("no completion delivered")
}

#[test]
fn trust_all_accepts_self_signed_certificate_for_another_host() {
    let addr = start_tls_server();
    let url = format!("https://{addr}/delay/0");

    let completion = get_with(TrustPolicy::TrustAll, &url);
    assert_eq!(completion, Completion::Complete("ok".to_string()));
}

#[test]
fn verify_rejects_self_signed_certificate() {
    let addr = start_tls_server();
    let url = format!("https://{addr}/delay/0");

    let message = get_with(TrustPolicy::Verify, &url).into_result().unwrap_err();
    assert!(message.starts_with(&format!("HTTP GET to {url} ")), "{message}");
    assert!(!message.ends_with(" timeout"), "{message}");
}

#[test]
fn trust_all_on_one_request_leaves_others_verifying() {
    let addr = start_tls_server();
    let url = format!("https://{addr}/delay/0");

    assert!(get_with(TrustPolicy::TrustAll, &url).is_complete());
    assert!(!get_with(TrustPolicy::Verify, &url).is_complete());
}
