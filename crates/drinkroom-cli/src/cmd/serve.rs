use anyhow::Context;
use drinkroom_server::AppState;
use std::path::Path;

pub fn run(root: &Path, port: Option<u16>, token_secret: Option<String>) -> anyhow::Result<()> {
    let state = AppState::open(root, token_secret).context("failed to open drink room")?;
    for w in state.config.validate() {
        tracing::warn!(level = ?w.level, "{}", w.message);
    }
    let port = port.unwrap_or(state.config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(drinkroom_server::serve(state, port))
}
