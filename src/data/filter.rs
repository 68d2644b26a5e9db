use std::collections::BTreeMap;

use super::model::{CellValue, SalesDataset, SalesRecord};

// ---------------------------------------------------------------------------
// Record selection by column value
// ---------------------------------------------------------------------------

/// Records grouped by their value in one column, keyed in sorted order.
pub type Groups<'a> = BTreeMap<CellValue, Vec<&'a SalesRecord>>;

/// Return the records whose `column` cell equals `value`.
pub fn matching_records<'a>(
    dataset: &'a SalesDataset,
    column: &str,
    value: &CellValue,
) -> Vec<&'a SalesRecord> {
    dataset
        .records
        .iter()
        .filter(|r| r.get(column) == value)
        .collect()
}

/// Partition records by their `column` cell.
///
/// Records with a blank cell in `column` belong to no group. Within a group
/// records keep their sheet order.
pub fn group_by<'a, I>(records: I, column: &str) -> Groups<'a>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut groups = Groups::new();
    for record in records {
        let key = record.get(column);
        if key.is_blank() {
            continue;
        }
        groups.entry(key.clone()).or_default().push(record);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> SalesDataset {
        SalesDataset::from_rows(
            vec!["ИП".into(), "Категория".into()],
            vec![
                vec!["B".into(), "Обувь".into()],
                vec!["A".into(), "Одежда".into()],
                vec![CellValue::Null, "Одежда".into()],
                vec!["A".into(), "Обувь".into()],
            ],
        )
    }

    #[test]
    fn groups_are_sorted_and_skip_blank_keys() {
        let ds = dataset();
        let groups = group_by(&ds.records, "ИП");

        let keys: Vec<String> = groups.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(groups[&CellValue::from("A")].len(), 2);
        assert_eq!(groups[&CellValue::from("A")][0].get("Категория"), &CellValue::from("Одежда"));
    }

    #[test]
    fn matching_records_compares_whole_cells() {
        let ds = dataset();
        assert_eq!(matching_records(&ds, "ИП", &"A".into()).len(), 2);
        assert!(matching_records(&ds, "ИП", &"C".into()).is_empty());
        assert!(matching_records(&ds, "Нет такой", &"A".into()).is_empty());
    }
}
