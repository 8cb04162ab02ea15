//! Minimal fakes shared by unit tests across `src/`. Not part of the public
//! API; the integration-test fakes under `tests/support/` are a separate,
//! richer set built only for the scenario tests in §8.
#![cfg(test)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::capabilities::{MediaSource, MediaSourceListener};
use crate::error::PlayerError;
use crate::timeline::MediaPeriodId;

/// A `MediaSource` that never reports a real timeline unless told to.
#[derive(Default)]
pub struct FakeMediaSource {
    prepared: AtomicBool,
}

impl MediaSource for FakeMediaSource {
    fn prepare(&self, _listener: Arc<dyn MediaSourceListener>) {
        self.prepared.store(true, Ordering::SeqCst);
    }

    fn maybe_throw_source_error(&self) -> Result<(), PlayerError> {
        Ok(())
    }

    fn create_period(&self, _id: &MediaPeriodId) {}

    fn release_period(&self, _id: &MediaPeriodId) {}

    fn release(&self) {}
}

pub fn fake_source() -> Arc<dyn MediaSource> {
    Arc::new(FakeMediaSource::default())
}
