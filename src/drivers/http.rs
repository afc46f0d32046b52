// WardCam: Capture HTTP Server
//
// Wraps the ESP-IDF httpd.  The server exists only while the camera is
// powered; dropping `EspHttpServer` stops it.

use anyhow::Context;
use esp_idf_svc::http::server::{Configuration, EspHttpConnection, EspHttpServer, Request};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::Write;

use crate::camera::CameraGate;
use crate::capture::{serve_capture, CaptureResponder, CaptureStatus};
use crate::config::*;
use crate::drivers::camera::EspFrameSource;
use crate::platform::CaptureServer;

pub struct EspCaptureServer {
    gate: CameraGate,
    server: Option<EspHttpServer<'static>>,
}

impl EspCaptureServer {
    pub fn new(gate: CameraGate) -> Self {
        Self { gate, server: None }
    }
}

impl CaptureServer for EspCaptureServer {
    fn start(&mut self) -> anyhow::Result<()> {
        if self.server.is_some() {
            return Ok(());
        }

        let conf = Configuration {
            http_port: HTTP_PORT,
            max_uri_handlers: HTTP_MAX_URI_HANDLERS,
            stack_size: HTTP_STACK_SIZE,
            lru_purge_enable: true,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&conf).context("Failed to start HTTP server")?;

        let gate = self.gate.clone();
        server.fn_handler::<anyhow::Error, _>(CAPTURE_URI, Method::Get, move |req| {
            let status = serve_capture(&gate, &EspFrameSource, HttpResponder(req))?;
            if let CaptureStatus::Served { bytes } = status {
                log::debug!("Served {} byte frame", bytes);
            }
            Ok(())
        })?;

        self.server = Some(server);
        log::info!("HTTP server started on port {}", HTTP_PORT);
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        if let Some(server) = self.server.take() {
            drop(server);
            log::info!("HTTP server stopped");
        }
        Ok(())
    }

    fn is_listening(&self) -> bool {
        self.server.is_some()
    }
}

struct HttpResponder<'r, 'c>(Request<&'r mut EspHttpConnection<'c>>);

impl CaptureResponder for HttpResponder<'_, '_> {
    fn send_frame(self, headers: &[(&str, &str)], body: &[u8]) -> anyhow::Result<()> {
        let mut response = self.0.into_response(200, Some("OK"), headers)?;
        response.write_all(body)?;
        Ok(())
    }

    fn send_server_error(self) -> anyhow::Result<()> {
        self.0.into_status_response(500)?;
        Ok(())
    }
}
