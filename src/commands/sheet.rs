use crate::api::{backend, Mode};
use crate::commands::Out;
use crate::services;
use crate::{Config, Result};
use anyhow::bail;

/// Renames a sheet. An empty target name is reported and ignored without
/// touching the backend.
pub async fn rename(config: Config, mode: Mode, id: &str, name: &str) -> Result<Out<()>> {
    if name.trim().is_empty() {
        return Ok(Out::new_message("Nome vazio: nada a renomear"));
    }
    let backend = backend(&config, mode)?;
    services::rename(backend.as_ref(), id, name).await?;
    Ok(Out::new_message(format!(
        "Planilha {id} renomeada para '{name}'"
    )))
}

/// Duplicates a sheet, rows included, and reports the new sheet's id.
pub async fn duplicate(config: Config, mode: Mode, id: &str) -> Result<Out<String>> {
    let backend = backend(&config, mode)?;
    let new_id = services::duplicate(backend.as_ref(), id).await?;
    Ok(Out::new(
        format!("Planilha {id} duplicada como {new_id}"),
        new_id,
    ))
}

/// Deletes a sheet. The `yes` flag stands in for the user's confirmation,
/// which must happen before this call.
pub async fn delete(config: Config, mode: Mode, id: &str, yes: bool) -> Result<Out<()>> {
    if !yes {
        bail!("A exclusão é permanente: repita o comando com --yes para confirmar");
    }
    let backend = backend(&config, mode)?;
    services::delete(backend.as_ref(), id).await?;
    Ok(Out::new_message(format!("Planilha {id} excluída")))
}
