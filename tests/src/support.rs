use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const LOOPBACK: &str = "127.0.0.1";

/// A port with a listener behind it, kept open while the listener lives.
pub async fn open_port() -> anyhow::Result<(TcpListener, u16)> {
    let listener = TcpListener::bind((LOOPBACK, 0)).await?;
    let port = listener.local_addr()?.port();
    Ok((listener, port))
}

/// A port that was free a moment ago; connecting to it is refused.
pub async fn closed_port() -> anyhow::Result<u16> {
    let (listener, port) = open_port().await?;
    drop(listener);
    Ok(port)
}

pub const IDENTIFY_RESPONSE: &str = concat!(
    r#"<s:Envelope xml:lang="en-US" xmlns:s="http://www.w3.org/2003/05/soap-envelope">"#,
    "<s:Header/><s:Body>",
    r#"<wsmid:IdentifyResponse xmlns:wsmid="http://schemas.dmtf.org/wbem/wsman/identity/1/wsmanidentity.xsd">"#,
    "<wsmid:ProtocolVersion>http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd</wsmid:ProtocolVersion>",
    "<wsmid:ProductVendor>Microsoft Corporation</wsmid:ProductVendor>",
    "<wsmid:ProductVersion>OS: 0.0.0 SP: 0.0 Stack: 3.0</wsmid:ProductVersion>",
    "</wsmid:IdentifyResponse></s:Body></s:Envelope>"
);

/// A request as the endpoint received it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub headers: HeaderMap,
    pub body: String,
}

impl SeenRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: &'static str,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// A `/wsman` endpoint answering every POST with a fixed status and body.
pub struct MockWsman {
    pub port: u16,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    task: JoinHandle<()>,
}

impl MockWsman {
    pub async fn start(status: u16, body: &'static str) -> anyhow::Result<Self> {
        let (listener, port) = open_port().await?;
        let seen: Arc<Mutex<Vec<SeenRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let canned = Canned {
            status: StatusCode::from_u16(status)?,
            body,
            seen: seen.clone(),
        };
        let app = Router::new().route("/wsman", post(answer)).with_state(canned);

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("mock WS-Man endpoint stopped: {e}");
            }
        });

        Ok(Self { port, seen, task })
    }

    /// Requests that reached `/wsman` so far.
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

impl Drop for MockWsman {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn answer(State(canned): State<Canned>, headers: HeaderMap, body: String) -> impl IntoResponse {
    if let Ok(mut seen) = canned.seen.lock() {
        seen.push(SeenRequest { headers, body });
    }
    (
        canned.status,
        [(header::CONTENT_TYPE, "application/soap+xml;charset=UTF-8")],
        canned.body,
    )
}
