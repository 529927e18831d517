mod console;
mod device;
mod host;
mod mock;
mod poller;
mod render;
mod sender;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
