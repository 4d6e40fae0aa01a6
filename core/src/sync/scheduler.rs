use crate::api::ParamPatch;
use crate::roi::RoiPolygon;
use crate::sync::ParamForm;
use log::debug;
use std::future::Future;
use std::time::Duration;

/// Identifies one debounce window. Only the newest ticket may flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyncTicket(u64);

#[derive(Debug, Clone)]
struct PendingSync {
    ticket: SyncTicket,
    extra: Option<ParamPatch>,
}

/// Coalesces bursts of local edits into one outbound parameter patch.
///
/// Each `request_sync` restarts the window and supersedes any pending request.
/// When the window of the newest ticket elapses, `flush` snapshots the live
/// form and ROI draft and returns the patch to commit.
#[derive(Debug, Clone)]
pub struct SyncScheduler {
    window: Duration,
    issued: u64,
    pending: Option<PendingSync>,
}

impl SyncScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            issued: 0,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Ticket of the request that would flush next, if any.
    pub fn pending_ticket(&self) -> Option<SyncTicket> {
        self.pending.as_ref().map(|pending| pending.ticket)
    }

    /// Records a pending push and restarts the window. `extra` replaces the
    /// override of any superseded request.
    pub fn request_sync(&mut self, extra: Option<ParamPatch>) -> SyncTicket {
        self.issued += 1;
        let ticket = SyncTicket(self.issued);
        if self.pending.is_some() {
            debug!("sync request {} supersedes pending window", self.issued);
        }
        self.pending = Some(PendingSync { ticket, extra });
        ticket
    }

    /// Timer for `ticket`'s window; resolves to the ticket once it elapses.
    pub fn timer(&self, ticket: SyncTicket) -> impl Future<Output = SyncTicket> + Send + 'static {
        let window = self.window;
        async move {
            tokio::time::sleep(window).await;
            ticket
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Builds the outbound patch if `ticket` is still the newest request.
    ///
    /// The patch holds every tracked form field as it reads now, the request's
    /// override on top, and the ROI: the draft's points when it has at least
    /// three, otherwise the override's `roi_points` or an empty list.
    pub fn flush(
        &mut self,
        ticket: SyncTicket,
        form: &ParamForm,
        draft: &RoiPolygon,
    ) -> Option<ParamPatch> {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => {}
            _ => return None,
        }
        let pending = self.pending.take()?;

        let mut patch = form.snapshot();
        let mut roi_overridden = false;
        if let Some(extra) = pending.extra {
            roi_overridden = extra.has_roi();
            patch.merge(extra);
        }
        if draft.is_closed() {
            patch.set_roi(draft.to_wire());
        } else if !roi_overridden {
            patch.set_roi(Vec::new());
        }
        Some(patch)
    }
}
