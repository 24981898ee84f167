//! Implements the `Backend` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so
//! that we can run the whole app, top-to-bottom, without the hosted service.

use crate::api::Backend;
use crate::model::{Column, Row, Sheet, SheetType};
use crate::Result;
use anyhow::{ensure, Context};
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// An implementation of the `Backend` trait that holds all sheets in memory
/// and, by default, is seeded with some existing data.
pub(crate) struct TestBackend {
    sheets: Mutex<Vec<Sheet>>,
}

impl TestBackend {
    /// Create a new `TestBackend` holding `sheets`.
    pub(crate) fn new(sheets: Vec<Sheet>) -> Self {
        Self {
            sheets: Mutex::new(sheets),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Sheet>> {
        self.sheets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TestBackend {
    /// Loads the seed data from this module.
    fn default() -> Self {
        Self::new(seed_sheets())
    }
}

#[async_trait::async_trait]
impl Backend for TestBackend {
    async fn fetch_all_sheets(&self) -> Result<Vec<Sheet>> {
        Ok(self.lock().clone())
    }

    async fn fetch_sheet_by_id(&self, id: &str) -> Result<Option<Sheet>> {
        Ok(self.lock().iter().find(|sheet| sheet.id == id).cloned())
    }

    async fn rename_sheet(&self, id: &str, name: &str) -> Result<()> {
        let mut sheets = self.lock();
        let sheet = sheets
            .iter_mut()
            .find(|sheet| sheet.id == id)
            .with_context(|| format!("Sheet '{id}' not found"))?;
        sheet.name = name.to_string();
        Ok(())
    }

    async fn delete_sheet(&self, id: &str) -> Result<()> {
        let mut sheets = self.lock();
        let before = sheets.len();
        sheets.retain(|sheet| sheet.id != id);
        ensure!(sheets.len() < before, "Sheet '{id}' not found");
        Ok(())
    }

    async fn create_sheet(
        &self,
        name: &str,
        kind: SheetType,
        columns: &[Column],
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.lock().push(Sheet {
            id: id.clone(),
            name: name.to_string(),
            kind,
            created_at: Utc::now(),
            columns: columns.to_vec(),
            rows: Vec::new(),
        });
        Ok(id)
    }

    async fn insert_rows(&self, sheet_id: &str, rows: &[Row]) -> Result<()> {
        let mut sheets = self.lock();
        let sheet = sheets
            .iter_mut()
            .find(|sheet| sheet.id == sheet_id)
            .with_context(|| format!("Sheet '{sheet_id}' not found"))?;
        for row in rows {
            let mut row = row.clone();
            row.id = Some(Uuid::new_v4().to_string());
            sheet.rows.push(row);
        }
        Ok(())
    }
}

/// Provides the seed data from this module.
fn seed_sheets() -> Vec<Sheet> {
    serde_json::from_str(SEED_DATA).expect("the seed data parses")
}

/// Seed sheet data, shaped exactly like the hosted service's responses.
const SEED_DATA: &str = r#"[
  {
    "id": "a3f1c2d4-0001-4b6e-9c11-2f8d5e7a9b01",
    "name": "Investimentos 2025",
    "type": "investments",
    "createdAt": "2025-01-12T09:15:00Z",
    "columns": [
      {"key": "asset", "label": "Ativo"},
      {"key": "quantity", "label": "Quantidade"},
      {"key": "avgPrice", "label": "Preço Médio"}
    ],
    "rows": [
      {"id": "r-0101", "quantity": 100.0, "avgPrice": 32.50, "date": "2025-02-03", "asset": "ITSA4"},
      {"id": "r-0102", "quantity": 40.0, "avgPrice": 88.10, "date": "2025-03-17", "asset": "PETR4"},
      {"id": "r-0103", "quantity": 12.0, "avgPrice": 120.00, "date": "2025-05-06", "asset": "IVVB11"}
    ]
  },
  {
    "id": "a3f1c2d4-0002-4b6e-9c11-2f8d5e7a9b02",
    "name": "Entradas 2025",
    "type": "income",
    "createdAt": "2025-01-05T08:00:00Z",
    "columns": [
      {"key": "description", "label": "Descrição"},
      {"key": "amount", "label": "Valor"},
      {"key": "date", "label": "Data"}
    ],
    "rows": [
      {"id": "r-0201", "amount": 7400.00, "date": "2025-04-05", "description": "Salário"},
      {"id": "r-0202", "amount": 7400.00, "date": "2025-05-05", "description": "Salário"},
      {"id": "r-0203", "amount": 1250.00, "date": "2025-05-21", "description": "Freelance"}
    ]
  },
  {
    "id": "a3f1c2d4-0003-4b6e-9c11-2f8d5e7a9b03",
    "name": "Despesas Mensais",
    "type": "expenses",
    "createdAt": "2025-02-20T14:30:00Z",
    "columns": [
      {"key": "description", "label": "Descrição"},
      {"key": "amount", "label": "Valor"},
      {"key": "dueDate", "label": "Vencimento"},
      {"key": "category", "label": "Categoria"}
    ],
    "rows": [
      {"id": "r-0301", "amount": 2100.00, "dueDate": "2025-05-10", "category": "Moradia", "description": "Aluguel"},
      {"id": "r-0302", "amount": 830.45, "dueDate": "2025-05-14", "category": "Alimentação", "description": "Supermercado"},
      {"id": "r-0303", "amount": 240.00, "dueDate": "2025-05-18", "category": "Transporte", "description": "Combustível"},
      {"id": "r-0304", "amount": 189.90, "dueDate": "2025-05-25", "description": "Assinaturas"}
    ]
  },
  {
    "id": "a3f1c2d4-0004-4b6e-9c11-2f8d5e7a9b04",
    "name": "Reserva de Emergência",
    "type": "investments",
    "createdAt": "2025-03-02T11:45:00Z",
    "columns": [
      {"key": "asset", "label": "Ativo"},
      {"key": "quantity", "label": "Quantidade"},
      {"key": "avgPrice", "label": "Preço Médio"}
    ],
    "rows": [
      {"id": "r-0401", "quantity": 15000.0, "avgPrice": 1.00, "date": "2025-01-20", "asset": "CDB Liquidez Diária"}
    ]
  }
]"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_data_parses() {
        let sheets = seed_sheets();
        assert_eq!(sheets.len(), 4);
        assert_eq!(sheets[0].kind, SheetType::Investments);
        assert_eq!(sheets[2].rows.len(), 4);
        // Unknown columns survive in other_fields.
        assert!(sheets[0].rows[0].other_fields.contains_key("asset"));
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let backend = TestBackend::default();
        let id = "a3f1c2d4-0002-4b6e-9c11-2f8d5e7a9b02";

        backend.rename_sheet(id, "Entradas 2025/2026").await.unwrap();
        let sheet = backend.fetch_sheet_by_id(id).await.unwrap().unwrap();
        assert_eq!(sheet.name, "Entradas 2025/2026");

        backend.delete_sheet(id).await.unwrap();
        assert!(backend.fetch_sheet_by_id(id).await.unwrap().is_none());
        assert!(backend.delete_sheet(id).await.is_err());
    }

    #[tokio::test]
    async fn test_create_and_insert_rows() {
        let backend = TestBackend::new(Vec::new());
        let columns = vec![Column {
            key: "amount".to_string(),
            label: "Valor".to_string(),
        }];
        let id = backend
            .create_sheet("Despesas Extras", SheetType::Expenses, &columns)
            .await
            .unwrap();

        let rows = vec![Row {
            amount: Some(55.0),
            due_date: Some("2025-06-01".to_string()),
            ..Row::default()
        }];
        backend.insert_rows(&id, &rows).await.unwrap();

        let sheet = backend.fetch_sheet_by_id(&id).await.unwrap().unwrap();
        assert_eq!(sheet.columns, columns);
        assert_eq!(sheet.rows.len(), 1);
        // The backend mints an id for every inserted row.
        assert!(sheet.rows[0].id.is_some());
        assert!(backend.insert_rows("missing", &rows).await.is_err());
    }
}
