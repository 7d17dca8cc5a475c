//! In-memory `RumApi` for tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::client::{
    ApiError, DeleteDestinationInput, DestinationPage, DestinationRecord, PutDestinationInput,
    RumApi,
};

pub(crate) fn record(
    destination: &str,
    destination_arn: Option<&str>,
    iam_role_arn: Option<&str>,
) -> DestinationRecord {
    DestinationRecord {
        destination: destination.to_string(),
        destination_arn: destination_arn.map(String::from),
        iam_role_arn: iam_role_arn.map(String::from),
    }
}

/// Remote RUM service kept in memory
///
/// Destinations written by `put` are listed back on a single page unless
/// pages were scripted for that monitor with [`FakeRumApi::with_pages`].
#[derive(Default)]
pub(crate) struct FakeRumApi {
    live: Mutex<HashMap<String, Vec<DestinationRecord>>>,
    scripted: Mutex<HashMap<String, Vec<Vec<Option<DestinationRecord>>>>>,
    puts: Mutex<Vec<PutDestinationInput>>,
    deletes: Mutex<Vec<DeleteDestinationInput>>,
    list_calls: AtomicUsize,
    put_error: Mutex<Option<ApiError>>,
    delete_error: Mutex<Option<ApiError>>,
    list_error: Mutex<Option<ApiError>>,
    stall_puts: AtomicBool,
    stall_deletes: AtomicBool,
    hide_writes: AtomicBool,
    cancel_after_first_page: Mutex<Option<CancellationToken>>,
}

impl FakeRumApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_pages(self, name: &str, pages: Vec<Vec<Option<DestinationRecord>>>) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .insert(name.to_string(), pages);
        self
    }

    /// Accept puts without making them visible to `list`
    pub(crate) fn with_hidden_writes(self) -> Self {
        self.hide_writes.store(true, Ordering::SeqCst);
        self
    }

    /// Never complete a put
    pub(crate) fn with_stalled_puts(self) -> Self {
        self.stall_puts.store(true, Ordering::SeqCst);
        self
    }

    /// Never complete a delete
    pub(crate) fn with_stalled_deletes(self) -> Self {
        self.stall_deletes.store(true, Ordering::SeqCst);
        self
    }

    /// Cancel `token` once the first list page has been served
    pub(crate) fn cancelling_after_first_page(self, token: CancellationToken) -> Self {
        *self.cancel_after_first_page.lock().unwrap() = Some(token);
        self
    }

    pub(crate) fn fail_next_put(&self, err: ApiError) {
        *self.put_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_next_delete(&self, err: ApiError) {
        *self.delete_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn fail_next_list(&self, err: ApiError) {
        *self.list_error.lock().unwrap() = Some(err);
    }

    pub(crate) fn puts(&self) -> Vec<PutDestinationInput> {
        self.puts.lock().unwrap().clone()
    }

    pub(crate) fn deletes(&self) -> Vec<DeleteDestinationInput> {
        self.deletes.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn stored(&self, name: &str) -> Vec<DestinationRecord> {
        self.live
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RumApi for FakeRumApi {
    async fn put_destination(&self, input: PutDestinationInput) -> Result<(), ApiError> {
        if self.stall_puts.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.puts.lock().unwrap().push(input.clone());
        if let Some(err) = self.put_error.lock().unwrap().take() {
            return Err(err);
        }
        if self.hide_writes.load(Ordering::SeqCst) {
            return Ok(());
        }

        let written = DestinationRecord {
            destination: input.destination,
            destination_arn: input.destination_arn,
            iam_role_arn: input.iam_role_arn,
        };
        let mut live = self.live.lock().unwrap();
        let records = live.entry(input.app_monitor_name).or_default();
        match records
            .iter_mut()
            .find(|r| r.destination == written.destination)
        {
            Some(existing) => *existing = written,
            None => records.push(written),
        }
        Ok(())
    }

    async fn delete_destination(&self, input: DeleteDestinationInput) -> Result<(), ApiError> {
        if self.stall_deletes.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.deletes.lock().unwrap().push(input.clone());
        if let Some(err) = self.delete_error.lock().unwrap().take() {
            return Err(err);
        }

        let mut live = self.live.lock().unwrap();
        let records = live.entry(input.app_monitor_name.clone()).or_default();
        let before = records.len();
        records.retain(|r| r.destination != input.destination);
        if records.len() == before {
            return Err(ApiError::ResourceNotFound(format!(
                "no {} destination for {}",
                input.destination, input.app_monitor_name
            )));
        }
        Ok(())
    }

    async fn list_destinations(
        &self,
        app_monitor_name: &str,
        next_token: Option<&str>,
    ) -> Result<DestinationPage, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = self.cancel_after_first_page.lock().unwrap().take() {
            token.cancel();
        }
        if let Some(err) = self.list_error.lock().unwrap().take() {
            return Err(err);
        }

        let scripted = self.scripted.lock().unwrap();
        let Some(pages) = scripted.get(app_monitor_name) else {
            return Ok(DestinationPage {
                destinations: self.stored(app_monitor_name).into_iter().map(Some).collect(),
                next_token: None,
            });
        };

        let index: usize = next_token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let destinations = pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());
        Ok(DestinationPage {
            destinations,
            next_token,
        })
    }
}
