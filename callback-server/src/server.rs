//! HTTP server for receiving GENA NOTIFY requests.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, UdpSocket};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use warp::http::{Method, StatusCode};
use warp::Filter;

use super::router::{NotifyRouter, NotifySink};

/// Where and how the callback endpoint listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Ports tried in order; the first free one is bound
    pub port_range: RangeInclusive<u16>,
    /// Host placed in the callback URL; detected from the outbound
    /// interface when `None`
    pub advertise_host: Option<IpAddr>,
    /// Path placed in the callback URL
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port_range: 3400..=3500,
            advertise_host: None,
            path: "/callback".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("No available port found in range {start}-{end}")]
    NoAvailablePort { start: u16, end: u16 },

    #[error("Failed to detect local IP address")]
    LocalAddressUnavailable,

    #[error("Server failed to start: {0}")]
    Startup(String),
}

/// NOTIFY endpoint for renderer event callbacks
///
/// Every request method other than `NOTIFY` is answered with 404. The
/// endpoint accepts any path, since some renderers append their own
/// suffix to the callback URL.
pub struct CallbackServer {
    port: u16,
    base_url: String,
    path: String,
    router: Arc<NotifyRouter>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl CallbackServer {
    /// Bind the first free port of `config.port_range` and start serving
    ///
    /// Returns once the listener is bound. No sink is attached yet; events
    /// arriving before [`attach_sink`](Self::attach_sink) get a 404.
    pub async fn start(config: ServerConfig) -> Result<Self, ServerError> {
        let (start, end) = (*config.port_range.start(), *config.port_range.end());
        let port = Self::find_available_port(start, end)
            .ok_or(ServerError::NoAvailablePort { start, end })?;

        let host = match config.advertise_host {
            Some(host) => host,
            None => Self::detect_local_ip().ok_or(ServerError::LocalAddressUnavailable)?,
        };

        let router = Arc::new(NotifyRouter::new());
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let (ready_tx, ready_rx) = oneshot::channel();

        let server_handle = Self::start_server(port, router.clone(), shutdown_rx, ready_tx);

        let bound = ready_rx
            .await
            .map_err(|_| ServerError::Startup("server task exited before binding".to_string()))?
            .map_err(ServerError::Startup)?;

        let base_url = format!("http://{}", SocketAddr::new(host, bound.port()));
        let path = if config.path.starts_with('/') {
            config.path
        } else {
            format!("/{}", config.path)
        };

        tracing::info!(port = bound.port(), "callback server listening on {}{}", base_url, path);

        Ok(Self {
            port: bound.port(),
            base_url,
            path,
            router,
            shutdown_tx: Some(shutdown_tx),
            server_handle: Some(server_handle),
        })
    }

    /// `http://<host>:<port>`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The URL to send in a SUBSCRIBE `CALLBACK` header
    pub fn callback_url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn router(&self) -> &Arc<NotifyRouter> {
        &self.router
    }

    /// Attach the consumer of incoming events, replacing any previous one
    pub async fn attach_sink(&self, sink: Arc<dyn NotifySink>) {
        self.router.attach(sink).await;
    }

    /// Stop accepting requests and wait for in-flight ones to finish
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }

        if let Some(handle) = self.server_handle.take() {
            handle
                .await
                .map_err(|e| ServerError::Startup(format!("server task failed: {}", e)))?;
        }

        tracing::info!(port = self.port, "callback server stopped");
        Ok(())
    }

    fn find_available_port(start: u16, end: u16) -> Option<u16> {
        (start..=end).find(|&port| Self::is_port_available(port))
    }

    fn is_port_available(port: u16) -> bool {
        TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)).is_ok()
    }

    /// Address of the interface used for outbound traffic
    ///
    /// Connecting a UDP socket sends nothing; it only selects a route.
    fn detect_local_ip() -> Option<IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect("8.8.8.8:80").ok()?;
        Some(socket.local_addr().ok()?.ip())
    }

    fn start_server(
        port: u16,
        router: Arc<NotifyRouter>,
        mut shutdown_rx: mpsc::Receiver<()>,
        ready_tx: oneshot::Sender<Result<SocketAddr, String>>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let notify_route = warp::method()
                .and(warp::path::full())
                .and(warp::header::optional::<String>("sid"))
                .and(warp::header::optional::<String>("nt"))
                .and(warp::header::optional::<String>("nts"))
                .and(warp::body::bytes())
                .and_then(
                    move |method: Method,
                          path: warp::path::FullPath,
                          sid: Option<String>,
                          nt: Option<String>,
                          nts: Option<String>,
                          body: bytes::Bytes| {
                        let router = router.clone();
                        async move {
                            if method.as_str() != "NOTIFY" {
                                return Err(warp::reject::not_found());
                            }

                            let Some(sid) = validate_upnp_headers(sid, nt.as_deref(), nts.as_deref())
                            else {
                                return Err(warp::reject::custom(InvalidUpnpHeaders));
                            };

                            let body = String::from_utf8_lossy(&body);
                            tracing::debug!(
                                sid = %sid,
                                path = path.as_str(),
                                bytes = body.len(),
                                "NOTIFY received"
                            );

                            if router.route_event(&sid, &body).await {
                                Ok::<_, warp::Rejection>(warp::reply::with_status("", StatusCode::OK))
                            } else {
                                tracing::debug!(sid = %sid, "event not accepted");
                                Err(warp::reject::not_found())
                            }
                        }
                    },
                );

            let routes = notify_route.recover(handle_rejection);

            let bound = warp::serve(routes).try_bind_with_graceful_shutdown(
                SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port),
                async move {
                    shutdown_rx.recv().await;
                },
            );

            match bound {
                Ok((addr, server)) => {
                    let _ = ready_tx.send(Ok(addr));
                    server.await;
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            }
        })
    }
}

/// The trimmed `SID` when the headers form a valid event notification
///
/// `SID` is required. `NT` and `NTS` are optional, but when both are sent
/// they must be `upnp:event` and `upnp:propchange`.
fn validate_upnp_headers(sid: Option<String>, nt: Option<&str>, nts: Option<&str>) -> Option<String> {
    let sid = sid.map(|sid| sid.trim().to_string()).filter(|sid| !sid.is_empty())?;

    if let (Some(nt), Some(nts)) = (nt, nts) {
        if nt.trim() != "upnp:event" || nts.trim() != "upnp:propchange" {
            return None;
        }
    }

    Some(sid)
}

#[derive(Debug)]
struct InvalidUpnpHeaders;

impl warp::reject::Reject for InvalidUpnpHeaders {}

async fn handle_rejection(
    err: warp::Rejection,
) -> Result<impl warp::Reply, std::convert::Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Subscription not found")
    } else if err.find::<InvalidUpnpHeaders>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid UPnP headers")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(warp::reply::with_status(message, code))
}
