//! Manifest validation and catalog resolution

use crate::error::{DispatchError, Result};
use crate::store::DroneStore;
use dispatch_shared::{LoadItem, Medication};
use std::collections::{HashMap, HashSet};

/// A manifest line resolved against the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    pub medication: Medication,
    pub count: u64,
}

/// Codes appearing more than once, in order of first appearance
fn duplicate_codes(items: &[LoadItem]) -> Vec<String> {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *occurrences.entry(item.code.as_str()).or_default() += 1;
    }

    let mut reported = HashSet::new();
    items
        .iter()
        .map(|item| item.code.as_str())
        .filter(|code| occurrences[code] > 1 && reported.insert(*code))
        .map(str::to_string)
        .collect()
}

/// Validate a manifest without touching the catalog.
///
/// Duplicates are checked before counts, so a manifest with both problems
/// always reports the duplicates.
pub fn check_manifest(items: &[LoadItem]) -> Result<()> {
    let duplicates = duplicate_codes(items);
    if !duplicates.is_empty() {
        return Err(DispatchError::DuplicateMedicationCodes(duplicates));
    }

    let wrong_counts: Vec<(String, i64)> = items
        .iter()
        .filter(|item| item.count <= 0)
        .map(|item| (item.code.clone(), item.count))
        .collect();
    if !wrong_counts.is_empty() {
        return Err(DispatchError::InvalidMedicationCounts(wrong_counts));
    }

    Ok(())
}

/// Validate a manifest and resolve every code against the catalog in one
/// batch. The result keeps manifest order.
pub async fn resolve_manifest(store: &dyn DroneStore, items: &[LoadItem]) -> Result<Vec<ResolvedItem>> {
    check_manifest(items)?;

    let codes: Vec<String> = items.iter().map(|item| item.code.clone()).collect();
    let mut found: HashMap<String, Medication> = store
        .find_medications_by_codes(&codes)
        .await?
        .into_iter()
        .map(|medication| (medication.code.clone(), medication))
        .collect();

    let absent: Vec<String> = codes
        .iter()
        .filter(|code| !found.contains_key(*code))
        .cloned()
        .collect();
    if !absent.is_empty() {
        return Err(DispatchError::UnknownMedicationCodes(absent));
    }

    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let medication = found
            .remove(&item.code)
            .ok_or_else(|| DispatchError::UnknownMedicationCodes(vec![item.code.clone()]))?;
        resolved.push(ResolvedItem {
            medication,
            // check_manifest guarantees count > 0
            count: item.count.unsigned_abs(),
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    async fn catalog() -> MemoryStore {
        let store = MemoryStore::new();
        for (code, weight) in [("M1", 10), ("M2", 50), ("M3", 75)] {
            store
                .put_medication(Medication {
                    code: code.into(),
                    name: format!("Medication_{}", code),
                    weight_gr: Decimal::from(weight),
                    image: None,
                })
                .await;
        }
        store
    }

    #[test]
    fn test_duplicates_named_once_in_order() {
        let items = [
            LoadItem::new("M2", 1),
            LoadItem::new("M1", 1),
            LoadItem::new("M1", 1),
            LoadItem::new("M2", 1),
            LoadItem::new("M3", 1),
        ];
        let err = check_manifest(&items).unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateMedicationCodes(ref codes)
            if codes == &vec!["M2".to_string(), "M1".to_string()]));
    }

    #[test]
    fn test_duplicates_win_over_bad_counts() {
        let items = [LoadItem::new("M1", 2), LoadItem::new("M1", -3)];
        let err = check_manifest(&items).unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateMedicationCodes(ref codes)
            if codes == &vec!["M1".to_string()]));
    }

    #[test]
    fn test_all_bad_counts_reported() {
        let items = [
            LoadItem::new("M1", 0),
            LoadItem::new("M2", 4),
            LoadItem::new("M3", -5),
        ];
        let err = check_manifest(&items).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidMedicationCounts(ref counts)
            if counts == &vec![("M1".to_string(), 0), ("M3".to_string(), -5)]));
    }

    #[tokio::test]
    async fn test_unknown_codes_reported_in_request_order() {
        let store = catalog().await;
        let items = [
            LoadItem::new("ZZZ", 1),
            LoadItem::new("M1", 1),
            LoadItem::new(" ", 1),
            LoadItem::new("", 1),
        ];
        let err = resolve_manifest(&store, &items).await.unwrap_err();
        assert!(matches!(err, DispatchError::UnknownMedicationCodes(ref codes)
            if codes == &vec!["ZZZ".to_string(), " ".to_string(), String::new()]));
    }

    #[tokio::test]
    async fn test_bad_counts_checked_before_catalog() {
        let store = catalog().await;
        let items = [LoadItem::new("UNKNOWN", 0)];
        let err = resolve_manifest(&store, &items).await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidMedicationCounts(_)));
    }

    #[tokio::test]
    async fn test_resolves_in_manifest_order() {
        let store = catalog().await;
        let items = [LoadItem::new("M3", 2), LoadItem::new("M1", 7)];
        let resolved = resolve_manifest(&store, &items).await.unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].medication.code, "M3");
        assert_eq!(resolved[0].count, 2);
        assert_eq!(resolved[1].medication.weight_gr, Decimal::from(10));
        assert_eq!(resolved[1].count, 7);
    }
}
