//! Sheet listing, lookup and mutation services.
//!
//! Every function here goes through the [`Backend`] collaborator, logs the
//! underlying cause of any failure and surfaces a single user-presentable
//! error for the operation. No retries happen at this layer; the caller
//! decides whether to try again.

use crate::api::Backend;
use crate::model::{
    Metrics, Row, SearchParams, SearchPeriod, Sheet, SheetListItem, SheetType, SortDirection,
    SortKey,
};
use crate::Result;
use anyhow::bail;
use chrono::Datelike;
use std::cmp::Ordering;
use tracing::{debug, error};

/// Suffix appended to the name of a duplicated sheet.
pub const COPY_SUFFIX: &str = "(cópia)";

/// Lists the sheets of `kind` as display items, filtered and ordered by
/// `params`: optional case-insensitive name query, optional exact
/// creation-month filter, then the requested sort (most recently created
/// first when no sort key is given).
pub async fn list_sheets(
    backend: &dyn Backend,
    kind: SheetType,
    params: &SearchParams,
) -> Result<Vec<SheetListItem>> {
    let sheets = match backend.fetch_all_sheets().await {
        Ok(sheets) => sheets,
        Err(e) => {
            error!("fetching sheets failed: {e:#}");
            bail!("Não foi possível carregar as planilhas");
        }
    };
    Ok(build_list(sheets, kind, params))
}

/// The pure part of [`list_sheets`], separated so the pipeline can be
/// exercised without a backend.
fn build_list(sheets: Vec<Sheet>, kind: SheetType, params: &SearchParams) -> Vec<SheetListItem> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut items: Vec<SheetListItem> = sheets
        .into_iter()
        .filter(|sheet| sheet.kind == kind)
        .filter(|sheet| match &query {
            Some(q) => sheet.name.to_lowercase().contains(q),
            None => true,
        })
        .filter(|sheet| match params.period {
            SearchPeriod::All => true,
            SearchPeriod::Month { month, year } => {
                sheet.created_at.month() == month && sheet.created_at.year() == year
            }
        })
        .map(to_list_item)
        .collect();

    sort_items(&mut items, params);
    items
}

fn to_list_item(sheet: Sheet) -> SheetListItem {
    let total = sheet.total();
    SheetListItem {
        id: sheet.id,
        name: sheet.name,
        kind: sheet.kind,
        created_at: sheet.created_at,
        metrics: Metrics {
            total,
            count: sheet.rows.len(),
        },
    }
}

fn sort_items(items: &mut [SheetListItem], params: &SearchParams) {
    match params.sort_by {
        Some(key) => items.sort_by(|a, b| {
            let ordering = match key {
                SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                SortKey::Date => a.created_at.cmp(&b.created_at),
                SortKey::Total => a
                    .metrics
                    .total
                    .partial_cmp(&b.metrics.total)
                    .unwrap_or(Ordering::Equal),
            };
            match params.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }),
        // Most recently created first when no explicit key is given.
        None => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// Looks up a single sheet by id. `Ok(None)` when no sheet has that id.
pub async fn fetch_sheet(backend: &dyn Backend, id: &str) -> Result<Option<Sheet>> {
    match backend.fetch_sheet_by_id(id).await {
        Ok(sheet) => Ok(sheet),
        Err(e) => {
            error!("fetching sheet {id} failed: {e:#}");
            bail!("Não foi possível carregar a planilha");
        }
    }
}

/// Renames sheet `id` to `new_name`. A name that trims to nothing is a
/// validation skip: no backend call is made and the sheet stays unchanged.
pub async fn rename(backend: &dyn Backend, id: &str, new_name: &str) -> Result<()> {
    if new_name.trim().is_empty() {
        debug!("skipping rename of {id}: the new name is empty");
        return Ok(());
    }
    if let Err(e) = backend.rename_sheet(id, new_name).await {
        error!("renaming sheet {id} failed: {e:#}");
        bail!("Não foi possível renomear a planilha");
    }
    Ok(())
}

/// Duplicates sheet `id`: creates `"{name} (cópia)"` with the same type and
/// column schema, then copies every row into the new sheet. Returns the new
/// sheet's id.
pub async fn duplicate(backend: &dyn Backend, id: &str) -> Result<String> {
    let Some(sheet) = fetch_sheet(backend, id).await? else {
        bail!("Planilha não encontrada");
    };

    let new_name = format!("{} {COPY_SUFFIX}", sheet.name);
    let new_id = match backend
        .create_sheet(&new_name, sheet.kind, &sheet.columns)
        .await
    {
        Ok(new_id) => new_id,
        Err(e) => {
            error!("creating the duplicate of {id} failed: {e:#}");
            bail!("Não foi possível duplicar a planilha");
        }
    };

    if !sheet.rows.is_empty() {
        // Strip row ids so the backend mints fresh ones for the copies.
        let rows: Vec<Row> = sheet
            .rows
            .into_iter()
            .map(|mut row| {
                row.id = None;
                row
            })
            .collect();
        if let Err(e) = backend.insert_rows(&new_id, &rows).await {
            error!("copying rows into {new_id} failed: {e:#}");
            bail!("Não foi possível duplicar a planilha");
        }
    }

    Ok(new_id)
}

/// Deletes sheet `id`. Obtaining the user's confirmation is the caller's
/// responsibility.
pub async fn delete(backend: &dyn Backend, id: &str) -> Result<()> {
    if let Err(e) = backend.delete_sheet(id).await {
        error!("deleting sheet {id} failed: {e:#}");
        bail!("Não foi possível excluir a planilha");
    }
    Ok(())
}
