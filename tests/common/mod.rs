#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tcg_catalog_api::config::AppConfig;
use tcg_catalog_api::database::models::ApiKey;
use tcg_catalog_api::database::Database;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}/v1", port);

        // DATABASE_URL is inherited from the environment (or .env, loaded by the server)
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tcg-catalog-api"));
        cmd.env("CATALOG_API_PORT", port.to_string())
            .env("CATALOG_BIND_HOST", "127.0.0.1")
            .env("CATALOG_API_PREFIX", "/v1")
            .env("DATABASE_RUN_MIGRATIONS", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;
        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("http://127.0.0.1:{}/health", self.port);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become healthy on port {} within {:?}", self.port, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// Direct database handle for fixtures the HTTP surface cannot create (API keys).
pub async fn database() -> Result<Database> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();
    Ok(Database::connect(&config).await?)
}

/// Issues a fresh key with the write scope.
pub async fn scraper_key() -> Result<String> {
    let db = database().await?;
    let key = ApiKey::create(db.pool(), "integration-tests", "scraper").await?;
    db.close().await;
    Ok(key.key)
}

/// Short random suffix so repeated runs never collide on slugs.
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}

pub struct Catalog {
    pub tcg_id: String,
    pub era_id: String,
    pub era_slug: String,
    pub set_id: String,
    pub set_slug: String,
}

async fn post(client: &reqwest::Client, url: String, key: &str, body: Value) -> Result<Value> {
    let res = client.post(url).header("x-api-key", key).json(&body).send().await?;
    let status = res.status();
    let payload = res.json::<Value>().await?;
    anyhow::ensure!(status == StatusCode::CREATED, "unexpected status {}: {}", status, payload);
    Ok(payload)
}

fn id_of(payload: &Value) -> Result<String> {
    payload["id"].as_str().map(str::to_string).context("response missing id")
}

/// Creates a tcg, era and empty set through the API.
pub async fn seed_catalog(server: &TestServer, key: &str) -> Result<Catalog> {
    let client = reqwest::Client::new();

    let tcg = post(&client, server.url("/tcg"), key, json!({ "name": "Pokemon", "slug": unique("pokemon") })).await?;
    let era_slug = unique("original-series");
    let era = post(&client, server.url("/eras"), key, json!({ "name": "Original Series", "slug": era_slug })).await?;

    let set_slug = unique("base-set");
    let set = post(
        &client,
        server.url("/sets"),
        key,
        json!({
            "name": "Base Set",
            "slug": set_slug,
            "eraId": id_of(&era)?,
            "tcgId": id_of(&tcg)?,
            "releaseDate": "1999-01-09",
            "totalCards": 102
        }),
    )
    .await?;

    Ok(Catalog {
        tcg_id: id_of(&tcg)?,
        era_id: id_of(&era)?,
        era_slug,
        set_id: id_of(&set)?,
        set_slug,
    })
}

/// `hp` is passed through as given, so callers can store it as a number or as text.
pub fn pokemon_card(set_id: &str, slug: &str, number: &str, hp: Value) -> Value {
    json!({
        "name": slug,
        "slug": slug,
        "setId": set_id,
        "details": {
            "card_type": "pokemon",
            "hp": hp,
            "set_position": { "number": number }
        }
    })
}
