use std::collections::BTreeMap;
use std::path::Path;

use crate::color::ColorMap;
use crate::data::loader::load_sheet;
use crate::data::model::{RawSheet, SalesDataset};
use crate::report::columns::{ColumnMapping, SemanticKey, resolve_columns};
use crate::report::comparison::ComparisonSession;
use crate::report::{Report, run_pass};

/// Rows shown before the header is chosen.
pub const PREVIEW_ROWS: usize = 10;

/// Parsed records shown once the header row is set.
pub const HEAD_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Raw grid of the loaded file (None until user loads a file).
    pub sheet: Option<RawSheet>,

    /// 0-based row of `sheet` holding the column names.
    pub header_row: usize,

    /// Records below the header row.
    pub dataset: Option<SalesDataset>,

    /// Columns found by alias.
    pub detected: ColumnMapping,

    /// Columns the user picked for keys that were not detected.
    pub user_choices: BTreeMap<SemanticKey, String>,

    /// Result of the last pass, or the message that stopped it.
    pub report: Option<Result<Report, String>>,

    /// Comparison choices, kept across passes.
    pub comparison: ComparisonSession,

    /// Pie colour per seller of the current report.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load a file and build the dataset from its first row.
    pub fn open_file(&mut self, path: &Path) {
        match load_sheet(path) {
            Ok(sheet) => {
                log::info!("Loaded {} rows from {}", sheet.len(), path.display());
                self.sheet = Some(sheet);
                self.user_choices.clear();
                self.set_header_row(0);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.clear();
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Forget the loaded file and everything derived from it.
    fn clear(&mut self) {
        self.sheet = None;
        self.header_row = 0;
        self.dataset = None;
        self.report = None;
        self.detected = ColumnMapping::default();
        self.user_choices.clear();
        self.color_map = ColorMap::default();
    }

    /// Re-read the dataset with another header row and re-detect columns.
    pub fn set_header_row(&mut self, row: usize) {
        let Some(sheet) = &self.sheet else {
            return;
        };
        self.header_row = row;
        match sheet.to_dataset(row) {
            Ok(dataset) => {
                log::info!(
                    "Header row {row}: {} records, columns {:?}",
                    dataset.len(),
                    dataset.column_names
                );
                self.detected = resolve_columns(&dataset.column_names);
                self.dataset = Some(dataset);
                self.status_message = None;
                self.recompute();
            }
            Err(e) => {
                log::error!("{e}");
                self.dataset = None;
                self.report = None;
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Record the user's column for an undetected key and recompute.
    pub fn choose_column(&mut self, key: SemanticKey, column: String) {
        self.user_choices.insert(key, column);
        self.recompute();
    }

    /// Forget the user's column for `key` and recompute.
    pub fn clear_choice(&mut self, key: SemanticKey) {
        if self.user_choices.remove(&key).is_some() {
            self.recompute();
        }
    }

    /// Detected columns plus the user's picks that still exist.
    pub fn effective_mapping(&self) -> ColumnMapping {
        let mut mapping = self.detected.clone();
        let Some(dataset) = &self.dataset else {
            return mapping;
        };
        for (key, column) in &self.user_choices {
            if mapping.contains(*key) {
                continue;
            }
            if let Err(e) = mapping.assign(*key, column, dataset) {
                log::debug!("Ignoring stale choice: {e}");
            }
        }
        mapping
    }

    /// One full pass over the current dataset.
    pub fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let mapping = self.effective_mapping();
        self.report = Some(match run_pass(dataset, &mapping) {
            Ok(report) => {
                self.comparison.revalidate(report.metrics.sellers());
                self.color_map = ColorMap::new(report.metrics.sellers());
                Ok(report)
            }
            Err(e) => {
                log::warn!("Pass aborted: {e}");
                Err(e.to_string())
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;
    use std::io::Write;

    fn csv_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(
            "Отчёт,,,\nПродавец,Цена продажи,Кол-во,Категория\nA,100,2,Обувь\nB,50,3,Обувь\n"
                .as_bytes(),
        )
        .unwrap();
        file
    }

    #[test]
    fn pass_waits_for_seller_column() {
        let file = csv_file();
        let mut state = AppState::default();
        state.open_file(file.path());
        assert_eq!(state.sheet.as_ref().map(RawSheet::len), Some(4));

        // Row 0 is a title; nothing is detected there.
        assert!(matches!(state.report, Some(Err(_))));

        state.set_header_row(1);
        assert!(matches!(state.report, Some(Err(_))));
        assert_eq!(
            state.effective_mapping().missing(),
            vec![SemanticKey::SellerId, SemanticKey::Cost, SemanticKey::ProductName]
        );

        state.choose_column(SemanticKey::SellerId, "Продавец".into());
        let report = state.report.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(report.metrics.by_seller.len(), 2);
        assert_eq!(state.comparison.selected().len(), 2);
        assert_eq!(
            report.metrics.by_seller[&CellValue::from("A")].total_revenue,
            Some(200)
        );
    }

    #[test]
    fn bad_header_row_is_reported() {
        let file = csv_file();
        let mut state = AppState::default();
        state.open_file(file.path());
        state.set_header_row(10);

        assert!(state.dataset.is_none());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn unreadable_file_clears_state() {
        let mut state = AppState::default();
        state.open_file(Path::new("/nonexistent/sales.csv"));

        assert!(state.sheet.is_none());
        assert!(state.report.is_none());
        assert!(state.status_message.is_some());
    }
}
