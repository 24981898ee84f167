use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the carteira home directory and the initial configuration file
/// with the backend coordinates. The coordinates are validated before
/// anything is written.
pub async fn init(home: &Path, backend_url: &str, api_key: &str) -> Result<Out<()>> {
    let config = Config::create(home, backend_url, api_key).await?;
    Ok(Out::new_message(format!(
        "Configuração criada em {}",
        config.config_path().display()
    )))
}
