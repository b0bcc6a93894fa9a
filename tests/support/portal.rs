//! A mock developer portal: login page, login form handler, download endpoint.

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use portal_fetch::{Console, ConsoleOptions, Credentials, FetchRequest, SiteProfile};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_string_contains, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "dev@example.com";
pub const PASSWORD: &str = "s3cret";
pub const CSRF_TOKEN: &str = "9f8e7d6c5b";
pub const MODEL_FILENAME: &str = "model_1.60.2.bin";
pub const MODEL_SIZE: usize = 2048;

pub const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<form id="wppb-loginform" action="/" method="post">
  <input type="text" name="log" id="user_login">
  <input type="password" name="pwd" id="user_pass">
  <input type="hidden" id="CSRFToken-wppb" name="CSRFToken-wppb" value="9f8e7d6c5b">
  <input type="hidden" name="_wp_http_referer" value="/">
</form>
</body></html>"#;

/// Login page with the session cookie the portal hands out before login.
pub async fn mount_login_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "portal_session=pre-login; Path=/")
                .set_body_string(LOGIN_PAGE),
        )
        .mount(server)
        .await;
}

/// Login handler that accepts the form and redirects to the dashboard.
pub async fn mount_login_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains(format!("CSRFToken-wppb={CSRF_TOKEN}")))
        .and(body_string_contains("rememberme=forever"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "/dashboard/")
                .insert_header("Set-Cookie", "wordpress_logged_in=yes; Path=/"),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dashboard/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Welcome back</h1>"))
        .mount(server)
        .await;
}

/// Download endpoint serving `body` to logged-in sessions only.
pub async fn mount_download(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("url", "2262"))
        .and(header_regex("cookie", "wordpress_logged_in=yes"))
        .respond_with(response)
        .expect(1)
        .with_priority(1)
        .mount(server)
        .await;
}

/// The model file response: attachment header and `MODEL_SIZE` bytes.
pub fn model_response() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header(
            "Content-Disposition",
            format!("attachment; filename=\"{MODEL_FILENAME}\"").as_str(),
        )
        .set_body_bytes(model_bytes(MODEL_SIZE))
}

pub fn model_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub fn site_for(server: &MockServer) -> SiteProfile {
    SiteProfile::parse(&format!("{}/", server.uri())).unwrap()
}

pub fn download_url(server: &MockServer) -> String {
    format!("{}/?url=2262", server.uri())
}

pub fn request(download_url: String, save_dir: &Path, expected_version: Option<&str>) -> FetchRequest {
    FetchRequest {
        credentials: Credentials::new(USERNAME, PASSWORD),
        download_url,
        save_dir: save_dir.to_path_buf(),
        expected_version: expected_version.map(str::to_string),
    }
}

/// Serves one response that declares `declared` bytes but sends only `sent`
/// before closing the connection. Returns the URL to request.
pub async fn truncated_file_server(declared: usize, sent: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let head = format!(
            "HTTP/1.1 200 OK\r\n\
             Content-Length: {declared}\r\n\
             Content-Disposition: attachment; filename=\"{MODEL_FILENAME}\"\r\n\
             Connection: close\r\n\r\n"
        );
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(&model_bytes(sent)).await;
        let _ = socket.flush().await;
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}/file")
}

/// Writer capturing console output for assertions.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Uncolored console without a progress line, capturing stdout and stderr.
pub fn capture_console() -> (Console, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let console = Console::with_writers(
        Box::new(out.clone()),
        Box::new(err.clone()),
        ConsoleOptions {
            color: false,
            quiet: false,
            progress: false,
        },
    );
    (console, out, err)
}

/// Names of the entries in `dir`.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}
