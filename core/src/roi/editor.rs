use crate::api::ParamPatch;
use crate::roi::{NormPoint, RoiPolygon};
use crate::sync::{SyncScheduler, SyncTicket};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Idle,
    Editing,
}

/// Operator intents consumed by the ROI editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoiIntent {
    /// Enter edit mode, or leave it and flush the polygon.
    ToggleEdit,
    AddPoint(NormPoint),
    /// Double-activation gesture on the overlay: leave edit mode and flush.
    DoubleActivate,
    /// Drop every point and flush an empty ROI.
    Clear,
}

/// Two-state editor owning the uncommitted ROI draft.
#[derive(Debug, Clone, Default)]
pub struct RoiEditor {
    mode: EditorMode,
    draft: RoiPolygon,
}

impl RoiEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == EditorMode::Editing
    }

    pub fn draft(&self) -> &RoiPolygon {
        &self.draft
    }

    /// Applies an intent. Returns the ticket of the sync request it issued, if
    /// any.
    pub fn handle(
        &mut self,
        intent: RoiIntent,
        scheduler: &mut SyncScheduler,
    ) -> Option<SyncTicket> {
        match (intent, self.mode) {
            (RoiIntent::ToggleEdit, EditorMode::Idle) => {
                self.mode = EditorMode::Editing;
                None
            }
            (RoiIntent::ToggleEdit, EditorMode::Editing)
            | (RoiIntent::DoubleActivate, EditorMode::Editing) => {
                self.mode = EditorMode::Idle;
                debug!("ROI edit finished with {} point(s)", self.draft.len());
                Some(scheduler.request_sync(Some(self.draft_patch())))
            }
            (RoiIntent::AddPoint(point), EditorMode::Editing) => {
                self.draft.push(point);
                Some(scheduler.request_sync(Some(self.draft_patch())))
            }
            (RoiIntent::AddPoint(_), EditorMode::Idle)
            | (RoiIntent::DoubleActivate, EditorMode::Idle) => None,
            (RoiIntent::Clear, _) => {
                self.draft.clear();
                Some(scheduler.request_sync(Some(ParamPatch::new().with_roi(Vec::new()))))
            }
        }
    }

    /// Pulls the backend's stored ROI into the draft after a load. The mode is
    /// left unchanged.
    ///
    /// This is deliberately not a plain overwrite: while editing, an open draft
    /// (fewer than three points) is kept when the backend holds the empty ROI,
    /// since that is exactly what the draft serializes to. Any other stored ROI
    /// replaces the draft.
    pub fn reconcile(&mut self, wire: &[[f64; 2]]) {
        if self.is_editing() && !self.draft.is_closed() && wire.is_empty() {
            return;
        }
        self.draft = RoiPolygon::from_wire(wire);
    }

    fn draft_patch(&self) -> ParamPatch {
        ParamPatch::new().with_roi(self.draft.to_wire())
    }
}
