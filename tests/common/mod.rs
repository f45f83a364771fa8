use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Each test binary gets its own throwaway database file
        let db_path = std::env::temp_dir().join(format!("healthcare-test-{}.db", port));
        let _ = std::fs::remove_file(&db_path);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/healthcare-api-rust");
        cmd.env("HEALTHCARE_API_PORT", port.to_string())
            .env("DATABASE_URL", format!("sqlite:{}", db_path.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Register a fresh user and return (user_id, bearer token). Emails must be
/// unique per test since all tests in a binary share one server database.
#[allow(dead_code)]
pub async fn register(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    email: &str,
) -> Result<(i64, String)> {
    let res = client
        .post(format!("{}/api/auth/register", base_url))
        .json(&json!({ "name": name, "email": email, "password": "secret123" }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "registration of {} failed: {}",
        email,
        res.status()
    );
    let body: Value = res.json().await?;
    let id = body["user"]["id"].as_i64().context("user id missing")?;
    let token = body["token"].as_str().context("token missing")?.to_string();
    Ok((id, token))
}

/// Create a patient owned by the given token's user, returning its id
#[allow(dead_code)]
pub async fn create_patient(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
) -> Result<i64> {
    let res = client
        .post(format!("{}/api/patients", base_url))
        .bearer_auth(token)
        .json(&json!({ "name": name, "gender": "other" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "patient create failed: {}", res.status());
    let body: Value = res.json().await?;
    body["patient"]["id"].as_i64().context("patient id missing")
}

/// Create a doctor, returning its id. License numbers must be unique.
#[allow(dead_code)]
pub async fn create_doctor(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
    license: &str,
) -> Result<i64> {
    let res = client
        .post(format!("{}/api/doctors", base_url))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "specialization": "Cardiology",
            "license_number": license,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "doctor create failed: {}", res.status());
    let body: Value = res.json().await?;
    body["doctor"]["id"].as_i64().context("doctor id missing")
}
