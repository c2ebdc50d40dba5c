//! JSON record store on the local filesystem.

use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use tracing::debug;

use crate::task::{
    domain::{RecordLocation, StatusRecord},
    ports::{StatusStore, StatusStoreError, StatusStoreResult},
};

/// Default file name of the task record inside its record location.
pub const DEFAULT_RECORD_FILE_NAME: &str = "task_status.json";

const STATUS_KEY: &str = "status";
const REVIEW_REASON_KEY: &str = "reviewReason";
const UPDATED_AT_KEY: &str = "updated_at";

/// Status store writing into a JSON object file per record location.
///
/// Writes merge into the existing document so that keys owned by other
/// writers survive, and replace the file through a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsStatusStore {
    record_file_name: String,
}

impl FsStatusStore {
    /// Creates a store using `record_file_name` inside each location.
    #[must_use]
    pub fn new(record_file_name: impl Into<String>) -> Self {
        Self {
            record_file_name: record_file_name.into(),
        }
    }

    /// Reads the status stored at `location`.
    ///
    /// Returns `Ok(None)` when the location or record file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::MalformedRecord`] when the record has no
    /// valid status, or [`StatusStoreError::Io`] for other failures.
    pub fn read_status(&self, location: &RecordLocation) -> StatusStoreResult<Option<StatusRecord>> {
        let Some(dir) = open_location(location)? else {
            return Ok(None);
        };
        let Some(document) = self.read_document(&dir, location)? else {
            return Ok(None);
        };
        serde_json::from_value(Value::Object(document))
            .map(Some)
            .map_err(|err| StatusStoreError::MalformedRecord {
                location: location.clone(),
                reason: err.to_string(),
            })
    }

    fn read_document(
        &self,
        dir: &Dir,
        location: &RecordLocation,
    ) -> StatusStoreResult<Option<Map<String, Value>>> {
        let contents = match dir.read_to_string(&self.record_file_name) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StatusStoreError::io(err)),
        };
        if contents.trim().is_empty() {
            return Ok(Some(Map::new()));
        }
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(document)) => Ok(Some(document)),
            Ok(_) => Err(StatusStoreError::MalformedRecord {
                location: location.clone(),
                reason: "expected a JSON object".to_owned(),
            }),
            Err(err) => Err(StatusStoreError::MalformedRecord {
                location: location.clone(),
                reason: err.to_string(),
            }),
        }
    }
}

impl Default for FsStatusStore {
    fn default() -> Self {
        Self::new(DEFAULT_RECORD_FILE_NAME)
    }
}

fn open_location(location: &RecordLocation) -> StatusStoreResult<Option<Dir>> {
    match Dir::open_ambient_dir(location.as_path(), ambient_authority()) {
        Ok(dir) => Ok(Some(dir)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StatusStoreError::io(err)),
    }
}

/// Writes `contents` to `temp_name` and renames it over `target`.
///
/// The temporary file is removed when either step fails.
pub(crate) fn replace_record(
    dir: &Dir,
    temp_name: &str,
    target: &str,
    contents: &str,
) -> StatusStoreResult<()> {
    let result = dir
        .write(temp_name, contents)
        .and_then(|()| dir.rename(temp_name, dir, target));
    if let Err(err) = result {
        if let Err(cleanup) = dir.remove_file(temp_name) {
            debug!(temp_name, error = %cleanup, "temporary task record not removed");
        }
        return Err(StatusStoreError::io(err));
    }
    Ok(())
}

fn merge_status(document: &mut Map<String, Value>, record: StatusRecord, updated_at: DateTime<Utc>) {
    document.insert(
        STATUS_KEY.to_owned(),
        Value::String(record.status.as_str().to_owned()),
    );
    match record.review_reason {
        Some(reason) => {
            document.insert(
                REVIEW_REASON_KEY.to_owned(),
                Value::String(reason.as_str().to_owned()),
            );
        }
        None => {
            document.remove(REVIEW_REASON_KEY);
        }
    }
    document.insert(
        UPDATED_AT_KEY.to_owned(),
        Value::String(updated_at.to_rfc3339()),
    );
}

impl StatusStore for FsStatusStore {
    fn write_status(
        &self,
        location: &RecordLocation,
        record: StatusRecord,
        updated_at: DateTime<Utc>,
    ) -> StatusStoreResult<()> {
        let dir = open_location(location)?
            .ok_or_else(|| StatusStoreError::LocationMissing(location.clone()))?;
        let mut document = self.read_document(&dir, location)?.unwrap_or_default();
        merge_status(&mut document, record, updated_at);

        let mut contents =
            serde_json::to_string_pretty(&Value::Object(document)).map_err(StatusStoreError::io)?;
        contents.push('\n');

        let temp_name = format!(".{}.tmp", self.record_file_name);
        replace_record(&dir, &temp_name, &self.record_file_name, &contents)
    }

    fn location_exists(&self, location: &RecordLocation) -> StatusStoreResult<bool> {
        Ok(open_location(location)?.is_some())
    }
}
