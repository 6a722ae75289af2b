//! Sequence-number cross references inside one claim.

use std::{collections::HashMap, sync::Arc};

use claims_core::Sequenced;

/// Lookup from `sequence` to the shared record built for it.
#[derive(Debug, Clone)]
pub struct SequenceIndex<T> {
    by_sequence: HashMap<i64, Arc<T>>,
}

impl<T: Sequenced> SequenceIndex<T> {
    /// Index every record that carries a sequence. A repeated sequence keeps the last record.
    pub fn build(records: &[Arc<T>]) -> Self {
        let by_sequence = records
            .iter()
            .filter_map(|record| record.sequence().map(|seq| (seq, Arc::clone(record))))
            .collect();
        Self { by_sequence }
    }

    pub fn get(&self, sequence: i64) -> Option<&Arc<T>> {
        self.by_sequence.get(&sequence)
    }

    /// Map each requested sequence to its record, dropping dangling references.
    pub fn resolve(&self, sequences: &[i64]) -> Vec<Arc<T>> {
        sequences
            .iter()
            .filter_map(|seq| {
                let found = self.by_sequence.get(seq).cloned();
                if found.is_none() {
                    tracing::debug!(sequence = seq, "dropping dangling sequence reference");
                }
                found
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sequence.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use claims_core::DiagnosisRecord;

    use super::*;

    fn diagnosis(sequence: Option<i64>, code: &str) -> Arc<DiagnosisRecord> {
        Arc::new(DiagnosisRecord {
            sequence,
            code: code.to_string(),
            description: "Not provided".to_string(),
            kind: "Unknown".to_string(),
        })
    }

    #[test]
    fn dangling_sequences_are_dropped() {
        let records = vec![diagnosis(Some(1), "A"), diagnosis(Some(2), "B")];
        let index = SequenceIndex::build(&records);
        let resolved = index.resolve(&[2, 9]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].code, "B");
        assert!(Arc::ptr_eq(&resolved[0], &records[1]));
    }

    #[test]
    fn last_duplicate_wins() {
        let records = vec![diagnosis(Some(1), "first"), diagnosis(Some(1), "second")];
        let index = SequenceIndex::build(&records);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(1).map(|d| d.code.as_str()), Some("second"));
    }

    #[test]
    fn unsequenced_records_are_not_indexed() {
        let records = vec![diagnosis(None, "loose")];
        let index = SequenceIndex::build(&records);
        assert!(index.is_empty());
        assert!(index.resolve(&[0, 1]).is_empty());
    }
}
