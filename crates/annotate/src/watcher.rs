//! Debounced re-annotation after document mutations.
//!
//! The watcher never reads a clock itself: callers pass `now` to
//! [`MutationWatcher::pump`], which keeps the single pending rescan
//! deterministic under test and lets an embedding event loop drive it.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::dom::{Document, MutationKind, MutationRecord, NodeRef};
use crate::driver::{AnnotationDriver, AnnotationReport};

/// Single-slot deferred task: scheduling again replaces the pending deadline.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the timer. Returns `true` if a pending run was replaced.
    pub fn schedule(&mut self, now: Instant) -> bool {
        self.deadline.replace(now + self.delay).is_some()
    }

    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the pending run if its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Re-runs an [`AnnotationDriver`] over a subtree after it changes.
#[derive(Debug)]
pub struct MutationWatcher {
    driver: AnnotationDriver,
    root: NodeRef,
    debouncer: Debouncer,
}

impl MutationWatcher {
    /// Start observing `doc`, annotate `root` once, and return the watcher
    /// together with that initial pass.
    pub fn attach(
        doc: &Document,
        root: NodeRef,
        driver: AnnotationDriver,
    ) -> (Self, AnnotationReport) {
        doc.observe();
        // the initial pass covers anything queued before attaching
        doc.take_records();

        let debouncer = Debouncer::new(driver.config().debounce());
        let mut watcher = Self {
            driver,
            root,
            debouncer,
        };
        let report = watcher.run(doc);
        (watcher, report)
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn driver(&self) -> &AnnotationDriver {
        &self.driver
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Feed a batch of records. Child-list and character-data changes inside
    /// the root (re)schedule the rescan; edited text nodes become eligible
    /// again. Returns whether the batch qualified.
    pub fn observe(&mut self, records: &[MutationRecord], now: Instant) -> bool {
        let mut qualifying = 0usize;
        for record in records {
            if record.kind == MutationKind::Attributes || !self.root.contains(&record.target) {
                continue;
            }
            if record.kind == MutationKind::CharacterData {
                self.driver.forget(&record.target);
            }
            qualifying += 1;
        }
        if qualifying == 0 {
            return false;
        }

        let rescheduled = self.debouncer.schedule(now);
        debug!(
            records = records.len(),
            qualifying,
            rescheduled,
            "rescan_scheduled"
        );
        true
    }

    /// Drain `doc`'s pending records, then run the driver if the debounce
    /// window has elapsed.
    pub fn pump(&mut self, doc: &Document, now: Instant) -> Option<AnnotationReport> {
        let records = doc.take_records();
        if !records.is_empty() {
            self.observe(&records, now);
        }
        if !self.debouncer.fire(now) {
            return None;
        }
        let report = self.run(doc);
        info!(
            replaced = report.replaced,
            candidates = report.candidates,
            "rescan_fired"
        );
        Some(report)
    }

    /// Stop observing and hand the driver back.
    pub fn detach(self, doc: &Document) -> AnnotationDriver {
        doc.disconnect();
        self.driver
    }

    fn run(&mut self, doc: &Document) -> AnnotationReport {
        let report = self.driver.annotate(doc, &self.root);
        // records describing our own splices
        let own = doc.take_records();
        debug!(discarded = own.len(), "driver_records_discarded");
        report
    }
}
