//! Negotiation against real loopback proxies driven by threads.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use mqtunnel_client::error::Kind;
use mqtunnel_client::{ProxyConfig, TunnelConfig, connect_via_proxy, negotiate_tunnel};

/// Spawn a one-shot proxy; `serve` receives the accepted socket and the CONNECT request.
fn spawn_proxy<F>(serve: F) -> (SocketAddr, JoinHandle<String>)
where
    F: FnOnce(&mut TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback proxy");
    let addr = listener.local_addr().expect("proxy addr");
    let handle = thread::spawn(move || {
        let (mut socket, _) = listener.accept().expect("accept client");
        let request = read_request(&mut socket);
        serve(&mut socket);
        request
    });
    (addr, handle)
}

fn read_request(socket: &mut TcpStream) -> String {
    let mut request = Vec::new();
    let mut byte = [0u8; 1];
    while !request.ends_with(b"\r\n\r\n") {
        match socket.read(&mut byte) {
            Ok(0) | Err(_) => break,
            Ok(_) => request.push(byte[0]),
        }
    }
    String::from_utf8(request).expect("ASCII request")
}

fn proxy_at(addr: SocketAddr, auth_value: Option<&str>) -> ProxyConfig {
    ProxyConfig::with(&addr.ip().to_string(), addr.port(), auth_value).expect("valid proxy config")
}

#[test]
fn tunnel_carries_traffic_after_fragmented_reply() {
    let (addr, proxy_thread) = spawn_proxy(|socket| {
        let chunks: [&[u8]; 4] = [b"HTTP/1.1 2", b"00 Connection established\r\n", b"\r", b"\n"];
        for chunk in chunks {
            socket.write_all(chunk).expect("write reply chunk");
            socket.flush().expect("flush");
            thread::sleep(Duration::from_millis(20));
        }
        let mut ping = [0u8; 2];
        socket.read_exact(&mut ping).expect("read tunneled bytes");
        socket.write_all(&ping).expect("echo tunneled bytes");
    });

    let socket = TcpStream::connect(addr).expect("connect proxy");
    let proxy = proxy_at(addr, Some("Basic dXNlcjpwYXNz"));
    let mut tunnel =
        negotiate_tunnel(socket, "broker.local", 1883, &proxy, &TunnelConfig::default())
            .expect("tunnel established");

    tunnel.write_all(&[0xC0, 0x00]).expect("send PINGREQ");
    let mut echoed = [0u8; 2];
    tunnel.read_exact(&mut echoed).expect("read echo");
    assert_eq!(echoed, [0xC0, 0x00]);

    let request = proxy_thread.join().expect("proxy thread");
    assert_eq!(
        request,
        "CONNECT broker.local:1883 HTTP/1.1\r\nHost: broker.local:1883\r\n\
         Proxy-Authorization: Basic dXNlcjpwYXNz\r\n\r\n"
    );
}

#[test]
fn silent_proxy_times_out_within_budget() {
    let (addr, proxy_thread) = spawn_proxy(|socket| {
        let mut rest = Vec::new();
        let _ = socket.read_to_end(&mut rest);
    });

    let socket = TcpStream::connect(addr).expect("connect proxy");
    let config = TunnelConfig::default().with_response_timeout(Duration::from_millis(200));
    let started = Instant::now();
    let err = negotiate_tunnel(socket, "broker.local", 1883, &proxy_at(addr, None), &config)
        .expect_err("silent proxy");

    assert_eq!(err.kind(), &Kind::Timeout);
    assert!(started.elapsed() >= Duration::from_millis(150));
    assert!(started.elapsed() < Duration::from_secs(5));
    proxy_thread.join().expect("proxy thread");
}

#[test]
fn trickling_proxy_does_not_renew_the_budget() {
    let (addr, proxy_thread) = spawn_proxy(|socket| {
        let _ = socket.write_all(b"HTTP/1.1 200 OK\r\nX-Slow: ");
        for _ in 0..100 {
            if socket.write_all(b"z").is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(30));
        }
    });

    let socket = TcpStream::connect(addr).expect("connect proxy");
    let config = TunnelConfig::default().with_response_timeout(Duration::from_millis(300));
    let started = Instant::now();
    let err = negotiate_tunnel(socket, "broker.local", 1883, &proxy_at(addr, None), &config)
        .expect_err("headers never complete");

    assert_eq!(err.kind(), &Kind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(2));
    proxy_thread.join().expect("proxy thread");
}

#[test]
fn nonblocking_socket_waits_for_a_slow_proxy() {
    let (addr, proxy_thread) = spawn_proxy(|socket| {
        thread::sleep(Duration::from_millis(100));
        socket.write_all(b"HTTP/1.1 200 OK\r\n\r\n").expect("reply");
        let mut ping = [0u8; 1];
        let _ = socket.read(&mut ping);
    });

    let socket = TcpStream::connect(addr).expect("connect proxy");
    socket.set_nonblocking(true).expect("nonblocking");
    let started = Instant::now();
    let mut tunnel = negotiate_tunnel(
        socket,
        "broker.local",
        1883,
        &proxy_at(addr, None),
        &TunnelConfig::default(),
    )
    .expect("tunnel established");

    assert!(started.elapsed() >= Duration::from_millis(50));
    let mut byte = [0u8; 1];
    let err = tunnel.read(&mut byte).expect_err("caller's mode is kept");
    assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);

    tunnel.get_mut().set_nonblocking(false).expect("blocking");
    tunnel.write_all(&[0xC0]).expect("send PINGREQ");
    proxy_thread.join().expect("proxy thread");
}

#[test]
fn proxy_closing_mid_status_line() {
    let (addr, proxy_thread) = spawn_proxy(|socket| {
        socket.write_all(b"HTTP/1.1 20").expect("partial reply");
    });

    let socket = TcpStream::connect(addr).expect("connect proxy");
    let err = negotiate_tunnel(
        socket,
        "broker.local",
        1883,
        &proxy_at(addr, None),
        &TunnelConfig::default(),
    )
    .expect_err("closed early");

    assert_eq!(err.kind(), &Kind::ConnectionClosed);
    proxy_thread.join().expect("proxy thread");
}

#[test]
fn connect_via_proxy_resolves_connects_and_negotiates() {
    let (addr, proxy_thread) = spawn_proxy(|socket| {
        socket
            .write_all(b"HTTP/1.0 200 OK\r\nVia: test\r\n\r\n\x20\x02\x00\x00")
            .expect("reply with CONNACK");
    });

    let proxy = ProxyConfig::from_url(&format!("http://user:pass@{addr}")).expect("proxy url");
    let config = TunnelConfig::default().with_keepalive(Some(Duration::from_secs(60)));
    let mut tunnel =
        connect_via_proxy(&proxy, &config, "broker.local", 8883).expect("tunnel established");

    let mut connack = [0u8; 4];
    tunnel.read_exact(&mut connack).expect("read CONNACK");
    assert_eq!(connack, [0x20, 0x02, 0x00, 0x00]);
    assert!(tunnel.get_ref().nodelay().expect("nodelay"));

    let request = proxy_thread.join().expect("proxy thread");
    assert!(request.starts_with("CONNECT broker.local:8883 HTTP/1.1\r\n"));
    assert!(request.contains("Proxy-Authorization: Basic dXNlcjpwYXNz\r\n"));
}

#[test]
fn connect_via_proxy_rejects_unset_config() {
    let err = connect_via_proxy(&ProxyConfig::new(), &TunnelConfig::default(), "broker.local", 1883)
        .expect_err("unset proxy");
    assert!(err.is_invalid_argument());
}

#[test]
fn connect_via_unreachable_proxy_is_a_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        listener.local_addr().expect("local addr")
    };
    let config = TunnelConfig::default().with_connect_timeout(Duration::from_secs(2));
    let err = connect_via_proxy(&proxy_at(addr, None), &config, "broker.local", 1883)
        .expect_err("nothing listening");
    assert!(err.is_transport());
    assert!(err.is_retryable());
}
