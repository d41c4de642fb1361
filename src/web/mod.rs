//! Server-rendered web front end.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - The analysis page, rendered through the form controller on submit
//! - Chart images, proxied from the analysis service
//! - A JSON health probe
//!
//! Launched via `bharatlens serve` (default: `http://127.0.0.1:9747`).

pub mod form;

use std::io::{Cursor, Read};

use anyhow::{Context, Result, anyhow};
use serde_json::json;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::client::{Backend, HttpAnalysisClient};
use crate::config::schema::ClientConfig;
use crate::controller::ControllerOptions;
use crate::diagnostics::Level;
use crate::page::{Page, PageTemplate};

const VISUALS_PREFIX: &str = "/static/visuals/";
/// Largest form body accepted on `POST /`.
const MAX_FORM_BYTES: u64 = 64 * 1024;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web server on the given address.
///
/// Blocks the current thread. Requests are handled one at a time and each
/// builds its own page and controller, so nothing is shared between them.
/// Errors are answered per-request without stopping the server.
pub fn serve(addr: &str, config: &ClientConfig, open: bool) -> Result<()> {
    let template = PageTemplate::load(config.web.template_dir.as_deref())?;
    let page = Page::bind(template)?;
    let backend = HttpAnalysisClient::from_config(&config.backend);
    let app = WebApp::new(page, backend, ControllerOptions::from_config(config));

    let server = Server::http(addr)
        .map_err(|e| anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("bharatlens running at http://{addr}");
    println!("Analysis service: {}", app.backend().base_url());
    println!("Press Ctrl+C to stop.\n");

    if open {
        // Best-effort
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let reply = if method == Method::Post {
            match read_form_body(request.as_reader()) {
                Ok(body) => app.handle(&method, &url, Some(&body)),
                Err(reply) => reply,
            }
        } else {
            app.handle(&method, &url, None)
        };
        let status = reply.status;
        let sent = reply
            .into_response()
            .and_then(|resp| request.respond(resp).context("failed to send response"));
        if let Err(e) = sent {
            app.options
                .diagnostics
                .log(Level::Warn, &format!("failed to answer {method} {url}: {e:#}"));
        }

        // Brief access log
        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// A response before it is handed to `tiny_http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Reply {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8".to_string(),
            body: body.into_bytes(),
        }
    }

    fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8".to_string(),
            body: value.to_string().into_bytes(),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, &json!({ "error": message }))
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn into_response(self) -> Result<Response<Cursor<Vec<u8>>>> {
        let header = Header::from_bytes("Content-Type", self.content_type.as_bytes())
            .map_err(|()| anyhow!("invalid content type {:?}", self.content_type))?;
        Ok(Response::from_data(self.body)
            .with_header(header)
            .with_status_code(StatusCode(self.status)))
    }
}

/// Request handling, independent of the socket.
pub struct WebApp<B> {
    page: Page,
    backend: B,
    options: ControllerOptions,
}

impl<B: Backend> WebApp<B> {
    pub fn new(page: Page, backend: B, options: ControllerOptions) -> Self {
        Self {
            page,
            backend,
            options,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Answer one request. Handler errors become a 500 JSON reply.
    pub fn handle(&self, method: &Method, url: &str, body: Option<&str>) -> Reply {
        match self.dispatch(method, url, body) {
            Ok(reply) => reply,
            Err(e) => {
                self.options
                    .diagnostics
                    .log(Level::Error, &format!("{method} {url} failed: {e:#}"));
                Reply::error(500, &format!("{e:#}"))
            }
        }
    }

    fn dispatch(&self, method: &Method, url: &str, body: Option<&str>) -> Result<Reply> {
        // Strip query string for path matching
        let path = url.split('?').next().unwrap_or(url);

        match (method, path) {
            (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(self.empty_page()),
            (&Method::Post, "/") => Ok(self.submit(body.unwrap_or(""))),
            (&Method::Get, "/health") => Ok(self.health()),
            (&Method::Get, p) if p.starts_with(VISUALS_PREFIX) => {
                self.visual(&p[VISUALS_PREFIX.len()..])
            }
            _ => Ok(Reply::error(404, "not found")),
        }
    }

    fn empty_page(&self) -> Reply {
        let controller = self.page.controller(&self.backend);
        Reply::html(self.page.render(&controller))
    }

    fn submit(&self, body: &str) -> Reply {
        let topic = form::form_value(body, "topic").unwrap_or_default();
        let mut controller = self
            .page
            .controller(&self.backend)
            .with_options(self.options.clone());
        controller.on_input(&topic);
        controller.on_submit();
        Reply::html(self.page.render(&controller))
    }

    fn health(&self) -> Reply {
        Reply::json(
            200,
            &json!({
                "backend": self.backend.base_url(),
                "reachable": self.backend.is_reachable(),
            }),
        )
    }

    fn visual(&self, file: &str) -> Result<Reply> {
        let decoded = urlencoding::decode_binary(file.as_bytes());
        if !is_plain_file_name(file) || !is_plain_file_name(&String::from_utf8_lossy(&decoded)) {
            return Ok(Reply::error(400, "invalid asset path"));
        }

        let path = format!("{VISUALS_PREFIX}{file}");
        let asset = self
            .backend
            .fetch_asset(&path)
            .with_context(|| format!("failed to proxy {path}"))?;
        let content_type = if asset.content_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            asset.content_type
        };
        Ok(Reply {
            status: asset.status,
            content_type,
            body: asset.bytes,
        })
    }
}

/// Read a form body, capped at `MAX_FORM_BYTES`.
///
/// Failures come back as the reply to send instead.
fn read_form_body(reader: impl Read) -> std::result::Result<String, Reply> {
    let mut buf = String::new();
    match reader.take(MAX_FORM_BYTES + 1).read_to_string(&mut buf) {
        Ok(_) if buf.len() as u64 > MAX_FORM_BYTES => {
            Err(Reply::error(413, "request body too large"))
        }
        Ok(_) => Ok(buf),
        Err(e) => Err(Reply::error(400, &format!("failed to read request body: {e}"))),
    }
}

/// A single path segment with no traversal.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains(['/', '\\'])
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
