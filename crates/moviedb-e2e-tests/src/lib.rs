use std::time::Duration;

use anyhow::{Result, anyhow};
use moviedb_server::config::{Parser, ServerConfig};
use rand::Rng as _;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::oneshot;
use tracing::{debug, info};
use url::Url;

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str, extra_args: &[&str]) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix(format!("{}_", test_name))?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let base_url = format!("http://127.0.0.1:{}", port);
    let mut args = vec![
        "moviedb-e2e-tests",
        "--data-dir",
        data_dir.as_str(),
        "--port",
        port.as_str(),
        "--base-url",
        base_url.as_str(),
    ];
    args.extend_from_slice(extra_args);
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

/// Moves server to another free port, used to start it again over the same data
pub fn relocate(args: &mut ServerConfig) -> Result<()> {
    let port = random_port()?;
    args.port = port;
    args.base_url = Url::parse(&format!("http://127.0.0.1:{}", port))?;
    Ok(())
}

/// Stops the server when dropped
pub struct ServerGuard {
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Starts server in background and waits until it answers health check.
pub async fn launch_env(args: ServerConfig) -> Result<(reqwest::Client, ServerGuard)> {
    let base_url = args.base_url.clone();
    let state = moviedb_server::run::build_state(&args).await?;
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        if let Err(e) = moviedb_server::run::run_graceful_with_state(args, state, shutdown).await
        {
            tracing::error!("Server failed: {e}");
        }
    });

    let client = reqwest::Client::new();
    let health_url = base_url.join("health")?;
    for _ in 0..50 {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Server is up at {base_url}");
                return Ok((
                    client,
                    ServerGuard {
                        shutdown: Some(tx),
                    },
                ));
            }
            Ok(response) => debug!("Server not ready: {}", response.status()),
            Err(e) => debug!("Server not ready: {e}"),
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Err(anyhow!("Server did not start"))
}

pub fn graphql_url(base_url: &Url) -> Url {
    base_url
        .join(moviedb_app::graphql::GRAPHQL_PATH)
        .expect("Invalid base URL")
}

/// Posts GraphQL document and returns whole JSON response (data and errors)
pub async fn graphql(
    client: &reqwest::Client,
    base_url: &Url,
    query: &str,
    variables: Value,
) -> Result<Value> {
    let payload = if variables.is_null() {
        json!({ "query": query })
    } else {
        json!({ "query": query, "variables": variables })
    };
    let response = client
        .post(graphql_url(base_url))
        .json(&payload)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(anyhow!("GraphQL request failed: {}", response.status()));
    }
    let body: Value = response.json().await?;
    Ok(body)
}

pub async fn create_genre(client: &reqwest::Client, base_url: &Url, name: &str) -> Result<i64> {
    let res = graphql(
        client,
        base_url,
        "mutation($name: String!) { createGenre(name: $name) { id name } }",
        json!({"name": name}),
    )
    .await?;
    res["data"]["createGenre"]["id"]
        .as_i64()
        .ok_or_else(|| anyhow!("Genre not created: {res}"))
}

pub async fn create_movie(
    client: &reqwest::Client,
    base_url: &Url,
    title: &str,
    release_year: i64,
    director: &str,
    genre_id: i64,
) -> Result<Value> {
    graphql(
        client,
        base_url,
        r#"mutation($title: String!, $releaseYear: Int!, $director: String!, $genreId: Int!) {
            createMovie(title: $title, releaseYear: $releaseYear, director: $director, genreId: $genreId) {
                id title releaseYear director genreId genre { id name }
            }
        }"#,
        json!({
            "title": title,
            "releaseYear": release_year,
            "director": director,
            "genreId": genre_id
        }),
    )
    .await
}
