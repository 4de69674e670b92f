// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client for the external production-record store.
//
// The store is a separate service with a single endpoint accepting a
// packaging record as JSON. Uploads are best-effort bookkeeping: a printed
// label is never failed because the record could not be saved.

use tracing::debug;

use rollmark_core::error::{Result, RollmarkError};
use rollmark_core::types::PackagingRecord;

pub struct RecordUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl RecordUploader {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// POST one record to the store.
    pub async fn upload(&self, record: &PackagingRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| RollmarkError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RollmarkError::Upload(format!(
                "record store returned {}",
                response.status()
            )));
        }

        debug!(endpoint = %self.endpoint, roll_no = %record.roll_no, "record uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_store_is_an_upload_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let uploader = RecordUploader::new(format!("http://127.0.0.1:{port}/records"));
        let err = uploader.upload(&PackagingRecord::default()).await.unwrap_err();
        assert!(matches!(err, RollmarkError::Upload(_)));
    }
}
