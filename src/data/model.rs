use std::collections::BTreeMap;
use std::fmt;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as read from a spreadsheet.
/// Seller identities and categories key `BTreeMap`s downstream, so
/// `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date or date-time, kept as text.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeMap keys --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl CellValue {
    /// Best-effort numeric coercion.
    ///
    /// Returns `None` for anything that does not read as a finite number:
    /// blanks, NaN, text such as `"N/A"`, dates. Callers skip `None` when
    /// summing, so an unparseable cell simply does not contribute.
    pub fn to_numeric(&self) -> Option<f64> {
        let v = match self {
            CellValue::Integer(i) => *i as f64,
            CellValue::Float(v) => *v,
            CellValue::Bool(b) => f64::from(u8::from(*b)),
            CellValue::String(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Date(_) | CellValue::Null => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Blank cells (null or whitespace-only text) never form a group key.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.trim().is_empty(),
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// RawSheet – the grid as read from disk, before header selection
// ---------------------------------------------------------------------------

/// Header cells starting with this prefix are placeholders for unnamed
/// columns and are dropped from the dataset.
pub const UNNAMED_PREFIX: &str = "Unnamed";

/// Every row of the first worksheet, headerless.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sheet has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row length.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// The first `n` rows, for showing the user where the header might be.
    pub fn preview(&self, n: usize) -> &[Vec<CellValue>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Build a [`SalesDataset`] using row `header_row` (0-based) as column
    /// names. Rows above the header are discarded.
    pub fn to_dataset(&self, header_row: usize) -> Result<SalesDataset, LoadError> {
        if header_row >= self.rows.len() {
            return Err(LoadError::HeaderRowOutOfRange {
                row: header_row,
                rows: self.rows.len(),
            });
        }

        let width = self.width();
        let header = &self.rows[header_row];
        let names = header_names(header, width);

        // (source index, column name) for every kept column
        let kept: Vec<(usize, String)> = names
            .into_iter()
            .enumerate()
            .filter(|(_, name)| !name.starts_with(UNNAMED_PREFIX))
            .collect();

        let records = self.rows[header_row + 1..]
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cells = kept
                    .iter()
                    .map(|(idx, name)| {
                        let value = row.get(*idx).cloned().unwrap_or(CellValue::Null);
                        (name.clone(), value)
                    })
                    .collect();
                SalesRecord {
                    source_row: header_row + 1 + i,
                    cells,
                }
            })
            .collect();

        Ok(SalesDataset {
            column_names: kept.into_iter().map(|(_, name)| name).collect(),
            records,
        })
    }
}

/// Turn header cells into unique column names. Blank cells become
/// `Unnamed: <index>`, repeated names get `.1`, `.2`, ... suffixes. A suffixed
/// name that is itself taken is suffixed again (`A`, `A.1`, `A.1.1`).
fn header_names(header: &[CellValue], width: usize) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    (0..width)
        .map(|idx| {
            let mut name = match header.get(idx) {
                Some(cell) if !cell.is_blank() => cell.to_string(),
                _ => format!("{UNNAMED_PREFIX}: {idx}"),
            };
            let mut count = counts.get(&name).copied().unwrap_or(0);
            while count > 0 {
                counts.insert(name.clone(), count + 1);
                name = format!("{name}.{count}");
                count = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), 1);
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SalesRecord – one row below the header
// ---------------------------------------------------------------------------

static NULL_CELL: CellValue = CellValue::Null;

/// One data row: column_name → value.
#[derive(Debug, Clone)]
pub struct SalesRecord {
    /// 0-based row index in the raw sheet, for diagnostics.
    pub source_row: usize,
    pub cells: BTreeMap<String, CellValue>,
}

impl SalesRecord {
    /// Cell for `column`, `Null` when the record has no such column.
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&NULL_CELL)
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the records after header selection
// ---------------------------------------------------------------------------

/// The dataset after header selection.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    /// Column names in sheet order.
    pub column_names: Vec<String>,
    pub records: Vec<SalesRecord>,
}

impl SalesDataset {
    /// Build a dataset from a header and rows; used by tests and the
    /// JSON records loader.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| SalesRecord {
                source_row: i + 1,
                cells: column_names.iter().cloned().zip(row).collect(),
            })
            .collect();
        Self {
            column_names,
            records,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` records (all of them when there are fewer).
    pub fn head(&self, n: usize) -> &[SalesRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Add a computed column, replacing any existing column of that name.
    pub fn set_column<F>(&mut self, column: &str, mut compute: F)
    where
        F: FnMut(&SalesRecord) -> CellValue,
    {
        for record in &mut self.records {
            let value = compute(record);
            record.cells.insert(column.to_string(), value);
        }
        if !self.has_column(column) {
            self.column_names.push(column.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(v: &str) -> CellValue {
        CellValue::from(v)
    }

    #[test]
    fn numeric_coercion_is_parse_or_absent() {
        assert_eq!(CellValue::Integer(3).to_numeric(), Some(3.0));
        assert_eq!(s(" 12.5 ").to_numeric(), Some(12.5));
        assert_eq!(CellValue::Bool(true).to_numeric(), Some(1.0));
        assert_eq!(s("N/A").to_numeric(), None);
        assert_eq!(s("").to_numeric(), None);
        assert_eq!(CellValue::Float(f64::NAN).to_numeric(), None);
        assert_eq!(CellValue::Null.to_numeric(), None);
    }

    #[test]
    fn header_row_selects_names_and_drops_unnamed() {
        let sheet = RawSheet::new(vec![
            vec![s("Отчёт за март")],
            vec![s("ИП"), CellValue::Null, s("Цена продажи"), s("Unnamed: 3")],
            vec![s("A"), s("x"), CellValue::Integer(100), s("y")],
            vec![s("B"), s("x"), CellValue::Integer(50)],
        ]);

        let ds = sheet.to_dataset(1).unwrap();
        assert_eq!(ds.column_names, vec!["ИП".to_string(), "Цена продажи".to_string()]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].get("Цена продажи"), &CellValue::Integer(100));
        assert_eq!(ds.records[1].get("ИП"), &s("B"));
        assert_eq!(ds.records[1].source_row, 3);
    }

    #[test]
    fn header_row_out_of_range_is_a_load_error() {
        let sheet = RawSheet::new(vec![vec![s("ИП")]]);
        let err = sheet.to_dataset(1).unwrap_err();
        assert!(matches!(err, LoadError::HeaderRowOutOfRange { row: 1, rows: 1 }));
    }

    #[test]
    fn duplicate_header_names_are_suffixed() {
        let sheet = RawSheet::new(vec![
            vec![s("Товар"), s("Товар"), s("Товар")],
            vec![s("a"), s("b"), s("c")],
        ]);
        let ds = sheet.to_dataset(0).unwrap();
        assert_eq!(ds.column_names, vec!["Товар", "Товар.1", "Товар.2"]);
        assert_eq!(ds.records[0].get("Товар.2"), &s("c"));
    }

    #[test]
    fn suffixed_names_never_collide_with_existing_headers() {
        let sheet = RawSheet::new(vec![
            vec![s("A"), s("A"), s("A.1")],
            vec![s("x"), s("y"), s("z")],
        ]);
        let ds = sheet.to_dataset(0).unwrap();

        assert_eq!(ds.column_names, vec!["A", "A.1", "A.1.1"]);
        assert_eq!(ds.records[0].cells.len(), 3);
        assert_eq!(ds.records[0].get("A.1"), &s("y"));
        assert_eq!(ds.records[0].get("A.1.1"), &s("z"));
    }

    #[test]
    fn head_shows_records_under_the_chosen_header() {
        let sheet = RawSheet::new(vec![
            vec![s("Отчёт о продажах"), CellValue::Null],
            vec![s("ИП"), CellValue::Null],
            vec![s("A"), CellValue::Integer(1)],
            vec![s("B"), CellValue::Integer(2)],
            vec![s("C"), CellValue::Integer(3)],
        ]);
        let ds = sheet.to_dataset(1).unwrap();
        let head = ds.head(2);

        assert_eq!(ds.column_names, vec!["ИП"]);
        assert_eq!(head.len(), 2);
        assert_eq!(head[0].source_row, 2);
        assert_eq!(head[1].get("ИП"), &s("B"));
        assert_eq!(ds.head(50).len(), 3);
    }

    #[test]
    fn preview_is_capped_at_sheet_length() {
        let sheet = RawSheet::new(vec![vec![s("a")], vec![s("b")]]);
        assert_eq!(sheet.preview(10).len(), 2);
        assert_eq!(sheet.preview(1).len(), 1);
    }

    #[test]
    fn set_column_replaces_existing() {
        let mut ds = SalesDataset::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Integer(1), CellValue::Integer(2)]],
        );
        ds.set_column("b", |_| CellValue::Float(9.0));
        ds.set_column("c", |r| r.get("a").clone());
        assert_eq!(ds.column_names, vec!["a", "b", "c"]);
        assert_eq!(ds.records[0].get("b"), &CellValue::Float(9.0));
        assert_eq!(ds.records[0].get("c"), &CellValue::Integer(1));
    }
}
