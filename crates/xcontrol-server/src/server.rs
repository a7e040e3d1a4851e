//! HTTP/1.1 server.

use crate::response::{self, HttpResponse};
use crate::router;
use anyhow::Result;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};
use xcontrol_application::AppServices;

/// Serves the dashboard API on one socket, one task per connection.
pub struct HttpServer {
    listener: TcpListener,
    services: Arc<AppServices>,
}

impl HttpServer {
    pub async fn bind(addr: &str, services: Arc<AppServices>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, services })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until the task is dropped.
    pub async fn run(self) -> Result<()> {
        info!("XControl listening on {}", self.local_addr()?);

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    debug!("New connection from {}", addr);
                    tokio::spawn(Self::handle_connection(stream, addr, self.services.clone()));
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    async fn handle_connection(stream: TcpStream, addr: SocketAddr, services: Arc<AppServices>) {
        let service = service_fn(move |request: Request<Incoming>| {
            let services = services.clone();
            async move { Ok::<_, Infallible>(Self::handle_request(&services, request).await) }
        });

        if let Err(e) = http1::Builder::new()
            .serve_connection(TokioIo::new(stream), service)
            .await
        {
            warn!("Connection from {} closed with error: {}", addr, e);
        }
    }

    async fn handle_request(services: &AppServices, request: Request<Incoming>) -> HttpResponse {
        let (parts, body) = request.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!("Failed to read request body: {}", e);
                return response::json_response(
                    hyper::StatusCode::BAD_REQUEST,
                    &serde_json::json!({ "success": false, "error": "invalid_request" }),
                );
            }
        };
        router::route(services, Request::from_parts(parts, body)).await
    }
}
