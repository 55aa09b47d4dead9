//! Uploaded-record cache and compliance result store.
//!
//! Uploads are held between the upload call and later standardisation calls, keyed by an
//! opaque record id. The store is an injected trait object so that tests and production
//! can use different backends; [`InMemoryRecordStore`] is single-instance and non-durable.

use crate::extraction::{Transcription, Translation};
use crate::standardize::{ComplianceVerdict, RawVaccineEntry};
use crate::{VaultError, VaultResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;
use vault_types::{NonEmptyText, Sha256Hash};

/// One processed upload, before any standard has been applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UploadedRecord {
    pub record_id: Uuid,
    pub session_id: Option<NonEmptyText>,
    pub transcription: Transcription,
    pub translation: Translation,
    pub extracted_vaccines: Vec<RawVaccineEntry>,
    /// Content hash of the stored image, if storage succeeded.
    pub image_hash: Option<Sha256Hash>,
    pub uploaded_at: DateTime<Utc>,
}

/// A verdict produced for a stored upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub record_id: Uuid,
    pub session_id: Option<NonEmptyText>,
    pub verdict: ComplianceVerdict,
    pub processed_at: DateTime<Utc>,
}

/// Storage for uploads and their verdicts.
pub trait RecordStore: Send + Sync {
    /// Stores a new upload.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::DuplicateRecord`] if the record id is already present.
    fn insert_upload(&self, record: UploadedRecord) -> VaultResult<()>;

    /// Fetches an upload by id.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::RecordNotFound`] if no upload has that id.
    fn upload(&self, record_id: Uuid) -> VaultResult<UploadedRecord>;

    /// Every upload tagged with `session_id`, oldest first.
    fn uploads_for_session(&self, session_id: &str) -> VaultResult<Vec<UploadedRecord>>;

    /// Appends a verdict.
    fn save_result(&self, result: StoredResult) -> VaultResult<()>;

    /// Every verdict saved for `record_id`, oldest first.
    fn results_for_record(&self, record_id: Uuid) -> VaultResult<Vec<StoredResult>>;
}

#[derive(Default)]
struct Inner {
    uploads: HashMap<Uuid, (u64, UploadedRecord)>,
    next_seq: u64,
    results: Vec<StoredResult>,
}

/// Process-local [`RecordStore`]. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Inner>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn insert_upload(&self, record: UploadedRecord) -> VaultResult<()> {
        let mut inner = self.inner.write().map_err(|_| VaultError::StorePoisoned)?;
        if inner.uploads.contains_key(&record.record_id) {
            return Err(VaultError::DuplicateRecord(record.record_id));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.uploads.insert(record.record_id, (seq, record));
        Ok(())
    }

    fn upload(&self, record_id: Uuid) -> VaultResult<UploadedRecord> {
        let inner = self.inner.read().map_err(|_| VaultError::StorePoisoned)?;
        inner
            .uploads
            .get(&record_id)
            .map(|(_, record)| record.clone())
            .ok_or(VaultError::RecordNotFound(record_id))
    }

    fn uploads_for_session(&self, session_id: &str) -> VaultResult<Vec<UploadedRecord>> {
        let inner = self.inner.read().map_err(|_| VaultError::StorePoisoned)?;
        let mut matching: Vec<&(u64, UploadedRecord)> = inner
            .uploads
            .values()
            .filter(|(_, record)| {
                record
                    .session_id
                    .as_ref()
                    .is_some_and(|s| s.as_str() == session_id)
            })
            .collect();
        matching.sort_by_key(|(seq, _)| *seq);
        Ok(matching.into_iter().map(|(_, r)| r.clone()).collect())
    }

    fn save_result(&self, result: StoredResult) -> VaultResult<()> {
        let mut inner = self.inner.write().map_err(|_| VaultError::StorePoisoned)?;
        inner.results.push(result);
        Ok(())
    }

    fn results_for_record(&self, record_id: Uuid) -> VaultResult<Vec<StoredResult>> {
        let inner = self.inner.read().map_err(|_| VaultError::StorePoisoned)?;
        Ok(inner
            .results
            .iter()
            .filter(|r| r.record_id == record_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionResult;
    use crate::standardize::standardize;
    use std::sync::Arc;

    fn upload(session: Option<&str>, names: &[&str]) -> UploadedRecord {
        let (transcription, translation, _) = ExtractionResult::default().into_stages();
        UploadedRecord {
            record_id: Uuid::new_v4(),
            session_id: session.map(|s| NonEmptyText::new(s).unwrap()),
            transcription,
            translation,
            extracted_vaccines: names
                .iter()
                .map(|n| RawVaccineEntry::new(*n, "2023-01-01"))
                .collect(),
            image_hash: None,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn insert_and_fetch() {
        let store = InMemoryRecordStore::new();
        let record = upload(None, &["MMR"]);
        let id = record.record_id;

        store.insert_upload(record.clone()).unwrap();

        assert_eq!(store.upload(id).unwrap(), record);
    }

    #[test]
    fn missing_record_is_not_found() {
        let store = InMemoryRecordStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.upload(id), Err(VaultError::RecordNotFound(missing)) if missing == id));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryRecordStore::new();
        let record = upload(None, &[]);
        store.insert_upload(record.clone()).unwrap();
        assert!(matches!(
            store.insert_upload(record),
            Err(VaultError::DuplicateRecord(_))
        ));
    }

    #[test]
    fn session_uploads_come_back_in_insertion_order() {
        let store = InMemoryRecordStore::new();
        let first = upload(Some("s1"), &["MMR"]);
        let other = upload(Some("s2"), &["Td"]);
        let second = upload(Some("s1"), &["Hepatitis B"]);
        let untagged = upload(None, &["Polio"]);

        for r in [&first, &other, &second, &untagged] {
            store.insert_upload(r.clone()).unwrap();
        }

        let ids: Vec<Uuid> = store
            .uploads_for_session("s1")
            .unwrap()
            .into_iter()
            .map(|r| r.record_id)
            .collect();
        assert_eq!(ids, vec![first.record_id, second.record_id]);
        assert!(store.uploads_for_session("nope").unwrap().is_empty());
    }

    #[test]
    fn results_are_filtered_by_record() {
        let store = InMemoryRecordStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        for (id, standard) in [(a, "us_cdc"), (b, "uk_nhs"), (a, "uk_nhs")] {
            store
                .save_result(StoredResult {
                    record_id: id,
                    session_id: None,
                    verdict: standardize(standard, &[]),
                    processed_at: Utc::now(),
                })
                .unwrap();
        }

        let for_a = store.results_for_record(a).unwrap();
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[1].verdict.standard.id(), "uk_nhs");
    }

    #[test]
    fn store_is_shareable_across_threads() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.insert_upload(upload(Some("shared"), &["MMR"])))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(store.uploads_for_session("shared").unwrap().len(), 8);
    }
}
