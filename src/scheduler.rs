use crate::Scheduling;

/// Why a reconciliation pass was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SyncReason {
    /// The logical scroll position moved.
    Scroll,
    /// Item or viewport sizes changed.
    Resize,
    /// The last pass left the state short of its fixpoint.
    Settle,
}

/// Reasons accumulated for the next pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PendingSync {
    pub(crate) scrolled: bool,
    /// Sizes or layout changed: the anchor must stay where it is on screen.
    pub(crate) relayout: bool,
}

impl PendingSync {
    fn add(&mut self, reason: SyncReason) {
        match reason {
            SyncReason::Scroll => self.scrolled = true,
            SyncReason::Resize | SyncReason::Settle => self.relayout = true,
        }
    }
}

/// Coalesces pass requests: any number of requests before the pass runs collapse into one.
///
/// In [`Scheduling::Frame`] the pass runs from the next frame tick, possibly deferred by the
/// fast-scroll delay. In [`Scheduling::Immediate`] the owner flushes right away.
#[derive(Clone, Debug)]
pub(crate) struct SyncScheduler {
    mode: Scheduling,
    delay_ms: u64,
    pending: Option<PendingSync>,
    not_before_ms: Option<u64>,
}

impl SyncScheduler {
    pub(crate) fn new(mode: Scheduling, delay_ms: u64) -> Self {
        Self {
            mode,
            delay_ms,
            pending: None,
            not_before_ms: None,
        }
    }

    pub(crate) fn is_immediate(&self) -> bool {
        self.mode == Scheduling::Immediate
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Requests a pass. `throttle` defers it by the fast-scroll delay, unless a deferral is
    /// already running.
    pub(crate) fn request(&mut self, reason: SyncReason, now_ms: u64, throttle: bool) {
        self.pending.get_or_insert_with(PendingSync::default).add(reason);
        if throttle && !self.is_immediate() && self.not_before_ms.is_none() {
            vtrace!(now_ms, delay_ms = self.delay_ms, "fast scroll: deferring pass");
            self.not_before_ms = Some(now_ms.saturating_add(self.delay_ms));
        }
    }

    /// Takes the pending pass if it is due at `now_ms`.
    pub(crate) fn take_due(&mut self, now_ms: u64) -> Option<PendingSync> {
        if let Some(not_before) = self.not_before_ms {
            if now_ms < not_before {
                return None;
            }
        }
        self.take()
    }

    /// Takes the pending pass regardless of any deferral.
    pub(crate) fn take(&mut self) -> Option<PendingSync> {
        let pending = self.pending.take()?;
        self.not_before_ms = None;
        Some(pending)
    }

    pub(crate) fn cancel(&mut self) {
        self.pending = None;
        self.not_before_ms = None;
    }
}
