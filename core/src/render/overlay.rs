use crate::api::OverlayPayload;
use crate::math::{Point2, Scale2, Size2};
use crate::render::{Pen, Rgba, Surface};
use crate::roi::{RoiPolygon, MIN_POLYGON_POINTS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub segment: Pen,
    pub backend_roi: Pen,
    pub backend_roi_fill: Rgba,
    pub draft_editing: Pen,
    pub draft_idle: Pen,
    pub draft_fill: Rgba,
    pub vertex: Rgba,
    pub vertex_radius: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            segment: Pen::new(Rgba::rgb8(76, 141, 246, 0.9), 3.0),
            backend_roi: Pen::new(Rgba::rgb8(58, 200, 182, 0.8), 2.0),
            backend_roi_fill: Rgba::rgb8(58, 200, 182, 0.12),
            draft_editing: Pen::new(Rgba::new(1.0, 1.0, 1.0, 0.9), 3.0),
            draft_idle: Pen::new(Rgba::rgb8(200, 200, 200, 0.7), 2.0),
            draft_fill: Rgba::new(1.0, 1.0, 1.0, 0.18),
            vertex: Rgba::new(1.0, 1.0, 1.0, 0.95),
            vertex_radius: 4.0,
        }
    }
}

/// Everything one overlay frame is composed from.
#[derive(Debug, Clone, Copy)]
pub struct OverlayScene<'a> {
    pub overlay: Option<&'a OverlayPayload>,
    pub draft: &'a RoiPolygon,
    pub editing: bool,
}

/// Composes backend detection geometry and the local ROI draft onto a surface.
///
/// Every call clears the surface and redraws both layers: backend geometry
/// first, the draft on top.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn render<S: Surface>(&self, surface: &mut S, scene: &OverlayScene<'_>) {
        surface.clear();
        let size = surface.size();
        if size.is_empty() {
            return;
        }
        if let Some(overlay) = scene.overlay {
            self.draw_backend(surface, overlay, size);
        }
        if !scene.draft.is_empty() {
            self.draw_draft(surface, scene.draft, scene.editing, size);
        }
    }

    fn draw_backend<S: Surface>(&self, surface: &mut S, overlay: &OverlayPayload, size: Size2) {
        let Some(scale) = Scale2::between(overlay.frame.w, overlay.frame.h, size) else {
            return;
        };
        for segment in &overlay.lines {
            surface.stroke_line(
                scale.apply(segment.x1, segment.y1),
                scale.apply(segment.x2, segment.y2),
                self.style.segment,
            );
        }
        if overlay.roi.len() >= MIN_POLYGON_POINTS {
            let points: Vec<Point2> = overlay
                .roi
                .iter()
                .map(|[x, y]| scale.apply(*x, *y))
                .collect();
            surface.draw_path(
                &points,
                true,
                Some(self.style.backend_roi_fill),
                self.style.backend_roi,
            );
        }
    }

    fn draw_draft<S: Surface>(
        &self,
        surface: &mut S,
        draft: &RoiPolygon,
        editing: bool,
        size: Size2,
    ) {
        let points: Vec<Point2> = draft
            .points()
            .iter()
            .map(|point| point.to_display(size))
            .collect();
        let pen = if editing {
            self.style.draft_editing
        } else {
            self.style.draft_idle
        };
        surface.draw_path(&points, draft.is_closed(), Some(self.style.draft_fill), pen);
        for point in points {
            surface.fill_circle(point, self.style.vertex_radius, self.style.vertex);
        }
    }
}
