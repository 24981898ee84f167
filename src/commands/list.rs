use crate::api::{backend, Mode};
use crate::commands::Out;
use crate::model::{SearchParams, SheetListItem, SheetType};
use crate::services;
use crate::{Config, Result};
use format_num::NumberFormat;

/// Lists the sheets of one type, filtered and ordered by the search
/// parameters from the CLI.
pub async fn list(
    config: Config,
    mode: Mode,
    kind: SheetType,
    params: SearchParams,
) -> Result<Out<Vec<SheetListItem>>> {
    let backend = backend(&config, mode)?;
    let items = services::list_sheets(backend.as_ref(), kind, &params).await?;
    let message = render(kind, &items);
    Ok(Out::new(message, items))
}

fn render(kind: SheetType, items: &[SheetListItem]) -> String {
    if items.is_empty() {
        return format!("Nenhuma planilha encontrada em {}", kind.title());
    }
    let num = NumberFormat::new();
    let mut lines = vec![format!("{} — {} planilha(s):", kind.title(), items.len())];
    for item in items {
        lines.push(format!(
            "  {}  {}  R$ {}  ({} linhas, criada em {})",
            item.id,
            item.name,
            num.format(",.2f", item.metrics.total),
            item.metrics.count,
            item.created_at.format("%Y-%m-%d"),
        ));
    }
    lines.join("\n")
}
