//! Common test utilities for dumpmirror integration tests

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use assert_cmd::Command;
use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tempfile::TempDir;

/// Listing URL on a port nothing listens on
pub const UNREACHABLE_LISTING: &str = "http://127.0.0.1:9/{locale}wiki/latest/";

/// A scratch mirror root with a configuration file pointing into it
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Root of the managed directories
    pub path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    pub fn config_path(&self) -> PathBuf {
        self.path.join("config.yaml")
    }

    /// Path of a managed directory (`compressed`, `temp`, `unpacked`, `canonical`)
    pub fn dir(&self, name: &str) -> PathBuf {
        self.path.join("mirror").join(name)
    }

    /// Write a configuration with managed directories under the workspace,
    /// resource checks disabled and `extra` appended verbatim
    pub fn write_config(&self, extra: &str) {
        self.write_config_for(UNREACHABLE_LISTING, extra);
    }

    /// Like [`TestWorkspace::write_config`], reading the listing at `listing_url`
    pub fn write_config_for(&self, listing_url: &str, extra: &str) {
        let yaml = format!(
            "source:\n  \
               locale: en\n  \
               listing_url: \"{listing_url}\"\n  \
               files: [page.sql.gz]\n\
             paths:\n  \
               compressed: {}\n  \
               temp: {}\n  \
               unpacked: {}\n  \
               canonical: {}\n\
             download:\n  \
               timeout_secs: 5\n  \
               retry_attempts: 1\n  \
               retry_delay_secs: 0\n\
             {extra}",
            self.dir("compressed").display(),
            self.dir("temp").display(),
            self.dir("unpacked").display(),
            self.dir("canonical").display(),
        );
        let yaml = if yaml.contains("resources:") {
            yaml
        } else {
            format!("{yaml}\nresources:\n  min_available_memory_mb: 0\n  min_free_disk_gb: 0\n")
        };
        std::fs::write(self.config_path(), yaml).expect("Failed to write config");
    }

    /// Write a file under a managed directory
    #[allow(dead_code)]
    pub fn write_managed(&self, dir: &str, name: &str, content: &[u8]) {
        let dir = self.dir(dir);
        std::fs::create_dir_all(&dir).expect("Failed to create directory");
        std::fs::write(dir.join(name), content).expect("Failed to write file");
    }

    /// The binary, pointed at this workspace's configuration
    pub fn cmd(&self) -> Command {
        let mut cmd = dumpmirror_cmd();
        cmd.arg("--config").arg(self.config_path());
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(deprecated)]
pub fn dumpmirror_cmd() -> Command {
    let mut cmd = Command::cargo_bin("dumpmirror").expect("binary should be built");
    cmd.env_remove("DUMPMIRROR_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[allow(dead_code)]
struct ServedDumps {
    files: BTreeMap<String, Vec<u8>>,
    downloads: AtomicUsize,
}

/// A dump listing served over HTTP on a local port
///
/// Serves `/enwiki/latest/` as an index page and every file under it with
/// `HEAD` and `GET`. Stops when dropped.
#[allow(dead_code)]
pub struct DumpServer {
    addr: SocketAddr,
    state: Arc<ServedDumps>,
    _runtime: tokio::runtime::Runtime,
}

#[allow(dead_code)]
impl DumpServer {
    pub fn start(files: &[(&str, Vec<u8>)]) -> Self {
        let state = Arc::new(ServedDumps {
            files: files
                .iter()
                .map(|(name, body)| ((*name).to_string(), body.clone()))
                .collect(),
            downloads: AtomicUsize::new(0),
        });

        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind dump server");
        listener
            .set_nonblocking(true)
            .expect("Failed to configure dump server socket");
        let addr = listener.local_addr().expect("Dump server has no address");

        let app = Router::new()
            .route("/enwiki/latest/", get(serve_listing))
            .route("/enwiki/latest/:name", get(serve_file))
            .with_state(Arc::clone(&state));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("Failed to start runtime");
        runtime.spawn(async move {
            let listener =
                tokio::net::TcpListener::from_std(listener).expect("Failed to adopt listener");
            axum::serve(listener, app).await.expect("Dump server failed");
        });

        Self {
            addr,
            state,
            _runtime: runtime,
        }
    }

    /// Listing URL template for the configuration
    pub fn listing_url(&self) -> String {
        format!("http://{}/{{locale}}wiki/latest/", self.addr)
    }

    /// Number of file bodies served so far
    pub fn downloads(&self) -> usize {
        self.state.downloads.load(Ordering::SeqCst)
    }
}

#[allow(dead_code)]
async fn serve_listing(State(state): State<Arc<ServedDumps>>) -> Html<String> {
    let links: String = state
        .files
        .keys()
        .map(|name| format!("<a href=\"{name}\">{name}</a>\n"))
        .collect();
    Html(format!(
        "<html><body>\n<a href=\"../\">../</a>\n{links}</body></html>"
    ))
}

#[allow(dead_code)]
async fn serve_file(
    State(state): State<Arc<ServedDumps>>,
    method: Method,
    UrlPath(name): UrlPath<String>,
) -> Response {
    let Some(body) = state.files.get(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if method == Method::GET {
        state.downloads.fetch_add(1, Ordering::SeqCst);
    }
    (
        [(header::CONTENT_LENGTH, body.len().to_string())],
        body.clone(),
    )
        .into_response()
}

/// Gzip `data` into a single-member archive
#[allow(dead_code)]
pub fn gzip(data: &[u8]) -> Vec<u8> {
    use std::io::Write;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).expect("Failed to compress");
    encoder.finish().expect("Failed to compress")
}
