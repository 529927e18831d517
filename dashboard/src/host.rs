use std::{future::Future, io::ErrorKind, net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use proofuino_common::{DashboardConfig, TargetInput};

use crate::{
    console::{spawn_stdin_reader, Console},
    device::{DeviceApi, HttpDevice},
    mock::{self, MockDevice},
    poller::spawn_poller,
    render::spawn_renderer,
    sender::CommandSender,
};

const ENV_CONFIG_PATH: &str = "PROOFUINO_CONFIG";

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config().await?;

    let mock_task = if config.dev_mode {
        let addr: SocketAddr = ([127, 0, 0, 1], 0).into();
        let (local, task) = mock::serve(MockDevice::mocked(), addr).await?;
        config.device_url = format!("http://{local}");
        info!("dev mode: talking to the mock device");
        Some(task)
    } else {
        None
    };

    config.validate()?;
    info!(
        "dashboard for {} (api {}, poll every {}ms)",
        config.device_url,
        config.api.as_str(),
        config.poll_interval_ms
    );

    let device = Arc::new(HttpDevice::new(&config).context("failed to build device client")?);
    let (snapshot_tx, snapshot_rx) = watch::channel(None);
    let (input_tx, input_rx) = watch::channel(TargetInput::default());

    let poller = spawn_poller(device.clone(), config.poll_interval(), snapshot_tx);
    let renderer = spawn_renderer(snapshot_rx.clone(), input_rx);
    let mut console = Console::new(CommandSender::new(device), snapshot_rx, input_tx);

    let lines = spawn_stdin_reader().context("failed to start console input")?;
    drive_console(&mut console, lines, interrupted()).await;

    poller.stop();
    renderer.abort();
    if let Some(task) = mock_task {
        task.abort();
    }
    info!("dashboard stopped");
    Ok(())
}

/// Runs the console until it closes or `shutdown` resolves, whichever is first.
async fn drive_console<D, F>(console: &mut Console<D>, lines: mpsc::Receiver<String>, shutdown: F)
where
    D: DeviceApi,
    F: Future<Output = ()>,
{
    tokio::select! {
        () = console.run(lines) => info!("console closed"),
        () = shutdown => info!("interrupt received"),
    }
}

async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}

async fn load_config() -> anyhow::Result<DashboardConfig> {
    let mut config = match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) => read_config_file(Path::new(&path)).await?,
        Err(_) => DashboardConfig::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.sanitize();
    Ok(config)
}

async fn read_config_file(path: &Path) -> anyhow::Result<DashboardConfig> {
    match tokio::fs::read(path).await {
        Ok(raw) => serde_json::from_slice(&raw)
            .with_context(|| format!("invalid dashboard config in {}", path.display())),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!("{} not found, using defaults", path.display());
            Ok(DashboardConfig::default())
        }
        Err(err) => {
            Err(err).with_context(|| format!("failed to read dashboard config {}", path.display()))
        }
    }
}
