//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every `GbaApi`
//! operation over real HTTP through a ureq-backed `Transport`.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use gba_core::{
    ApiError, Config, GbaApi, GbaClient, HttpMethod, HttpRequest, HttpResponse, Properties,
    StartSessionOptions, StopSessionOptions, Transport, TransportFailure,
};
use mock_server::ServerState;

/// Executes requests with ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let body = req.body.as_deref();
        let result = match (req.method, body) {
            (HttpMethod::Get, _) => self.agent.get(&req.path).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&req.path).send_empty(),
            (HttpMethod::Put, Some(body)) => self
                .agent
                .put(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => self.agent.put(&req.path).send_empty(),
        };
        let mut response = result?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

fn spawn_server(state: ServerState) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, mock_server::app_with(state)).await
        })
        .unwrap();
    });

    addr
}

fn api(addr: SocketAddr, config: Config) -> GbaApi<UreqTransport> {
    let config = Config {
        base_url: format!("http://{addr}"),
        ..config
    };
    GbaApi::new(GbaClient::new(config), UreqTransport::new())
}

#[test]
fn device_queries() {
    let addr = spawn_server(ServerState::seeded());
    let api = api(addr, Config::default());

    let devices = api.list_devices().unwrap();
    assert_eq!(devices.len(), 2);

    for device in &devices {
        let fetched = api.get_device(&device.id).unwrap();
        assert_eq!(fetched.id, device.id);
    }

    let apps = api.get_device_apps("HT83G1C00069").unwrap();
    assert!(apps.iter().any(|a| a.identifier == "com.example.app" && a.debuggable));

    let err = api.get_device("missing").unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let err = api.get_device_apps("missing").unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[test]
fn session_lifecycle() {
    let addr = spawn_server(ServerState::seeded());
    let api = api(addr, Config::default());

    // Step 1: no sessions yet.
    assert!(api.list_sessions().unwrap().is_empty());

    // Step 2: start with every option set.
    let options = StartSessionOptions {
        auto_sync: true,
        screenshots: true,
        tags: Some(BTreeMap::from([("run".to_string(), "1".to_string())])),
    };
    let session = api
        .start_session("HT83G1C00069", "com.example.app", Some(&options))
        .unwrap();
    assert!(!session.id.is_empty());

    // Step 3: it shows up in the list.
    let sessions = api.list_sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, session.id);

    // Step 4: sync is fire-and-forget.
    api.sync().unwrap();

    // Step 5: stop, asking for the session JSON back.
    let stop = StopSessionOptions {
        include_session_json_in_response: true,
        output_dir: None,
    };
    let raw = api.stop_session(&session.id, Some(&stop)).unwrap();
    let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(record["autoSync"], true);
    assert_eq!(record["screenshots"], true);
    assert_eq!(record["tags"]["run"], "1");

    // Step 6: stopping again returns the server's body untouched.
    let raw = api.stop_session(&session.id, None).unwrap();
    assert_eq!(raw, r#"{"error":"session not found"}"#);
}

#[test]
fn stop_session_plain_text_body() {
    let addr = spawn_server(ServerState::seeded());
    let api = api(addr, Config::default());

    let session = api.start_session("R58M41XYZ", "com.example.app", None).unwrap();
    let options = StopSessionOptions {
        include_session_json_in_response: false,
        output_dir: Some("/tmp/gba".to_string()),
    };
    let raw = api.stop_session(&session.id, Some(&options)).unwrap();
    assert_eq!(raw, format!("session {} stopped, written to /tmp/gba", session.id));
}

#[test]
fn start_session_credentials() {
    let addr = spawn_server(ServerState::seeded().with_secret("tok"));

    let rejected = api(addr, Config::default().with_username("u").with_password("wrong"));
    let err = rejected
        .start_session("HT83G1C00069", "com.example.app", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 401, .. }));
    assert_eq!(err.to_string(), "bad credentials");

    let accepted = api(addr, Config::default().with_username("u").with_token("tok"));
    accepted
        .start_session("HT83G1C00069", "com.example.app", None)
        .unwrap();

    let err = accepted
        .start_session("missing", "com.example.app", None)
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "unknown device missing");
}

#[test]
fn properties_round_trip() {
    let addr = spawn_server(ServerState::seeded());
    let api = api(addr, Config::default());

    assert!(api.get_properties().unwrap().is_empty());

    let mut props = Properties::new();
    props.insert("x".to_string(), serde_json::json!(1));
    props.insert("labels".to_string(), serde_json::json!(["a", "b"]));
    api.set_properties(&props).unwrap();

    let fetched = api.get_properties().unwrap();
    assert_eq!(fetched["x"], serde_json::json!(1));
    assert_eq!(fetched, props);
}

#[test]
fn device_commands() {
    let addr = spawn_server(ServerState::seeded());
    let api = api(addr, Config::default());

    api.enable_wifi_prof("HT83G1C00069").unwrap();
    api.disable_wifi_prof("HT83G1C00069").unwrap();
    let err = api.enable_wifi_prof("missing").unwrap_err();
    assert_eq!(err.to_string(), "unknown device missing");

    let out = api
        .execute_shell_command_on_device("HT83G1C00069", "echo hello")
        .unwrap();
    assert_eq!(out, "hello\n");
    let err = api
        .execute_shell_command_on_device("HT83G1C00069", "")
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[test]
fn generate_json_and_version() {
    let addr = spawn_server(ServerState::seeded());
    let api = api(addr, Config::default());

    api.generate_session_json("/data/session", "/data/session.json")
        .unwrap();
    let err = api.generate_session_json("", "/data/out.json").unwrap_err();
    assert_eq!(err.to_string(), "sessionPath and targetPath are required");

    let info = api.get_server_version_info().unwrap();
    assert_eq!(info.major_version, mock_server::MAJOR_VERSION);
    assert_eq!(info.build_number, mock_server::BUILD_NUMBER);
    assert_eq!(info.commit_hash, mock_server::COMMIT_HASH);
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = api(addr, Config::default());
    let err = api.list_devices().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
