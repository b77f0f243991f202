//! Test utilities for Seam development.
//!
//! Mesh fixtures for the standard contact and mortar scenarios (see
//! [`fixtures`]), an instrumented [`ElementPairLocator`] that counts how the
//! engine drives it, and a one-line tracing setup for tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use seam_core::{SearchError, SearchMesh};
use seam_search::ElementPairLocator;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// [`ElementPairLocator`] that records how often it was driven.
///
/// Optionally fails on the n-th update to exercise error propagation.
#[derive(Debug, Default)]
pub struct CountingElementPairLocator {
    pub reinits: usize,
    pub updates: usize,
    fail_on_update: Option<usize>,
}

impl CountingElementPairLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`-th call to `update` (1-based).
    pub fn failing_on_update(n: usize) -> Self {
        Self {
            fail_on_update: Some(n),
            ..Self::default()
        }
    }

    /// Wrap in the shared handle the engine registers.
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

impl ElementPairLocator for CountingElementPairLocator {
    fn reinit(&mut self, _mesh: &dyn SearchMesh) -> Result<(), SearchError> {
        self.reinits += 1;
        Ok(())
    }

    fn update(&mut self, _mesh: &dyn SearchMesh) -> Result<(), SearchError> {
        self.updates += 1;
        if self.fail_on_update == Some(self.updates) {
            return Err(SearchError::InvalidConfig {
                reason: format!("element-pair update {} rejected", self.updates),
            });
        }
        Ok(())
    }
}
