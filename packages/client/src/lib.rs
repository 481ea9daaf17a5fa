//! # mqtunnel client
//!
//! HTTP `CONNECT` tunnel negotiation for MQTT client sockets.
//!
//! Given a TCP socket already connected to an HTTP forward proxy, sends
//! `CONNECT host:port` (optionally with `Proxy-Authorization`), collects the
//! proxy's header block under a bounded time budget, and hands back a
//! [`Tunnel`] ready for the MQTT handshake.
//!
//! ## Usage
//!
//! ```no_run
//! use std::net::TcpStream;
//!
//! use mqtunnel_client::{ProxyConfig, basic_auth_value, establish_connect_tunnel};
//!
//! let mut proxy = ProxyConfig::new();
//! proxy.configure("proxy.internal", 3128, Some(basic_auth_value("user", "secret").as_str()))?;
//!
//! let socket = TcpStream::connect(("proxy.internal", 3128))?;
//! let _tunnel = establish_connect_tunnel(socket, "broker.example.com", 1883, &proxy)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod connect;
pub mod error;
pub mod proxy;

pub mod prelude;

pub use crate::prelude::*;
