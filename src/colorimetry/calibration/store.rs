//! Calibration configuration store
//!
//! Loads the per-dye calibration JSON once. Every entry is validated at load
//! time; entries that fail validation are kept aside with their error so the
//! remaining dyes can still be analyzed. Rejected entries keep their original
//! JSON and are written back untouched.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::colorimetry::calibration::record::{CalibrationRecord, ModelKind};
use crate::colorimetry::common::error::{ColorimetryError, Result};

/// On-disk representation of one dye entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordEntry {
    slope: f64,
    intercept: f64,
    channel: String,
    #[serde(default)]
    model: Option<String>,
}

impl RecordEntry {
    fn into_record(self, dye: &str) -> Result<CalibrationRecord> {
        let channel = self
            .channel
            .parse()
            .map_err(|e: ColorimetryError| ColorimetryError::calibration(dye, e.to_string()))?;
        let model = match self.model.as_deref() {
            Some(kind) => kind
                .parse()
                .map_err(|e: ColorimetryError| ColorimetryError::calibration(dye, e.to_string()))?,
            None => ModelKind::default(),
        };
        CalibrationRecord::new(dye, self.slope, self.intercept, channel, model)
    }
}

impl From<&CalibrationRecord> for RecordEntry {
    fn from(record: &CalibrationRecord) -> Self {
        Self {
            slope: record.slope,
            intercept: record.intercept,
            channel: record.channel.to_string(),
            model: Some(record.model.to_string()),
        }
    }
}

/// Immutable set of validated calibration records keyed by dye.
#[derive(Debug, Default)]
pub struct CalibrationStore {
    records: BTreeMap<String, Arc<CalibrationRecord>>,
    rejected: BTreeMap<String, ColorimetryError>,
    rejected_entries: BTreeMap<String, serde_json::Value>,
}

impl CalibrationStore {
    pub fn from_records(records: impl IntoIterator<Item = CalibrationRecord>) -> Self {
        let mut store = Self::default();
        for record in records {
            match record.validate() {
                Ok(()) => {
                    store.records.insert(record.dye.clone(), Arc::new(record));
                }
                Err(e) => {
                    if let Ok(entry) = serde_json::to_value(RecordEntry::from(&record)) {
                        store.rejected_entries.insert(record.dye.clone(), entry);
                    }
                    store.rejected.insert(record.dye.clone(), e);
                }
            }
        }
        store
    }

    /// Parses the calibration JSON. Malformed JSON fails the whole load;
    /// an invalid entry only rejects its own dye.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| ColorimetryError::ConfigError(format!("calibration JSON: {}", e)))?;

        let mut store = Self::default();
        for (dye, value) in raw {
            let parsed = serde_json::from_value::<RecordEntry>(value.clone())
                .map_err(|e| ColorimetryError::calibration(&dye, e.to_string()))
                .and_then(|entry| entry.into_record(&dye));

            match parsed {
                Ok(record) => {
                    debug!(dye = %dye, slope = record.slope, intercept = record.intercept, channel = %record.channel, model = %record.model, "Loaded calibration record");
                    store.records.insert(dye, Arc::new(record));
                }
                Err(e) => {
                    warn!(dye = %dye, error = %e, "Rejected calibration record");
                    store.rejected_entries.insert(dye.clone(), value);
                    store.rejected.insert(dye, e);
                }
            }
        }
        Ok(store)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ColorimetryError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Serializes the store back into the calibration JSON format. Rejected
    /// entries are emitted exactly as they were loaded.
    pub fn to_json_string(&self) -> Result<String> {
        let write_error = |e: serde_json::Error| ColorimetryError::OutputWriteError(e.to_string());

        let mut entries: BTreeMap<&str, serde_json::Value> = self
            .rejected_entries
            .iter()
            .map(|(dye, value)| (dye.as_str(), value.clone()))
            .collect();
        for (dye, record) in &self.records {
            let value = serde_json::to_value(RecordEntry::from(record.as_ref())).map_err(write_error)?;
            entries.insert(dye.as_str(), value);
        }
        serde_json::to_string_pretty(&entries).map_err(write_error)
    }

    /// Adds or replaces a record.
    pub fn insert(&mut self, record: CalibrationRecord) -> Result<()> {
        record.validate()?;
        self.rejected.remove(&record.dye);
        self.rejected_entries.remove(&record.dye);
        self.records.insert(record.dye.clone(), Arc::new(record));
        Ok(())
    }

    /// Validated record for `dye`, the validation error it was rejected with,
    /// or a `CalibrationModelError` when the dye is absent.
    pub fn record(&self, dye: &str) -> Result<Arc<CalibrationRecord>> {
        if let Some(record) = self.records.get(dye) {
            return Ok(Arc::clone(record));
        }
        match self.rejected.get(dye) {
            Some(e) => Err(ColorimetryError::calibration(dye, rejection_reason(e))),
            None => Err(ColorimetryError::calibration(dye, "no calibration record configured")),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &Arc<CalibrationRecord>> {
        self.records.values()
    }

    pub fn rejected(&self) -> &BTreeMap<String, ColorimetryError> {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn rejection_reason(error: &ColorimetryError) -> String {
    match error {
        ColorimetryError::CalibrationModelError { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
