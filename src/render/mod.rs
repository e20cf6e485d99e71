//! Dashboard Rendering
//!
//! Turns a [`Snapshot`] into rows on a UI surface using one strategy for
//! every collection: clear the region, then append one row per item in
//! order. Nothing is diffed or patched; whatever a region showed before a
//! render is gone after it.
//!
//! ## Architecture
//!
//! - **ListSurface**: a single region that can be cleared and appended to
//! - **UiSurface**: a set of regions addressable by stable id
//! - **render**: the generic clear-then-rebuild routine
//! - **DashboardRenderer**: binds the five regions and renders whole snapshots
//! - **Board**: the in-memory surface used by the terminal and by tests
//!
//! ## Example
//!
//! ```rust
//! use stagewatch::render::{Board, DashboardRenderer};
//! use stagewatch::snapshot::Snapshot;
//!
//! let mut renderer = DashboardRenderer::new(Board::standard()).unwrap();
//! let snapshot = Snapshot::from_json(r#"{"stages":[{"name":"ingest","status":"running"}]}"#).unwrap();
//! renderer.on_snapshot(&snapshot);
//!
//! assert_eq!(
//!     renderer.surface().rows("stages-list").unwrap(),
//!     ["Stage: ingest, Status: running"]
//! );
//! ```

mod board;
mod error;
mod region;

pub use board::{Board, Panel, TextList};
pub use error::RenderError;
pub use region::Region;

use crate::snapshot::Snapshot;

/// A display region holding an ordered list of text rows
pub trait ListSurface {
    /// Remove every row
    fn clear(&mut self);

    /// Add a row at the bottom
    fn append(&mut self, row: String);
}

/// A UI surface whose regions are looked up by stable id
pub trait UiSurface {
    type List: ListSurface;

    fn list_mut(&mut self, id: &str) -> Option<&mut Self::List>;

    /// Whether a region with this id exists
    fn has_list(&mut self, id: &str) -> bool {
        self.list_mut(id).is_some()
    }
}

/// Replace the contents of `container` with one row per item
///
/// After the call the container holds exactly `items.len()` rows, in order,
/// each equal to `format_item` of the corresponding item.
pub fn render<T, S, F>(container: &mut S, items: &[T], format_item: F)
where
    S: ListSurface + ?Sized,
    F: Fn(&T) -> String,
{
    container.clear();
    for item in items {
        container.append(format_item(item));
    }
}

/// Renders whole snapshots onto the five dashboard regions
pub struct DashboardRenderer<U: UiSurface> {
    surface: U,
}

impl<U: UiSurface> DashboardRenderer<U> {
    /// Bind a renderer to a surface
    ///
    /// Fails with [`RenderError::TargetMissing`] for the first region the
    /// surface does not provide.
    pub fn new(mut surface: U) -> Result<Self, RenderError> {
        for region in Region::ALL {
            if !surface.has_list(region.id()) {
                return Err(RenderError::TargetMissing {
                    id: region.id().to_string(),
                });
            }
        }

        Ok(Self { surface })
    }

    /// Replace every region with the contents of `snapshot`
    pub fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.render_region(Region::Stages, &snapshot.stages);
        self.render_region(Region::Workers, &snapshot.workers);
        self.render_region(Region::EventQueues, &snapshot.event_queues);
        self.render_region(Region::PerformanceMetrics, &snapshot.performance_metrics);
        self.render_region(Region::Notifications, &snapshot.notifications);
    }

    fn render_region<T: ToString>(&mut self, region: Region, items: &[T]) {
        match self.surface.list_mut(region.id()) {
            Some(list) => render(list, items, T::to_string),
            // Bound at construction; only reachable if the surface drops a region later
            None => tracing::error!(region = %region, "Render target disappeared"),
        }
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn into_surface(self) -> U {
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Metric, Notification, Queue, Stage, Worker};

    const EXAMPLE: &str = r#"{"stages":[{"name":"ingest","status":"running"}],"workers":[],"eventQueues":[{"name":"q1","length":5}],"performanceMetrics":[],"notifications":[{"message":"ok"}]}"#;

    fn renderer() -> DashboardRenderer<Board> {
        DashboardRenderer::new(Board::standard()).unwrap()
    }

    fn rows<'a>(renderer: &'a DashboardRenderer<Board>, region: Region) -> &'a [String] {
        renderer.surface().rows(region.id()).unwrap()
    }

    fn sample() -> Snapshot {
        Snapshot {
            stages: vec![Stage::new("ingest", "running"), Stage::new("transform", "pending")],
            workers: vec![Worker::new("w-1", "busy")],
            event_queues: vec![Queue::new("q1", 5), Queue::new("q2", 0)],
            performance_metrics: vec![Metric::new("latency_ms", 12.5)],
            notifications: vec![Notification::new("deploy finished")],
        }
    }

    #[test]
    fn test_render_replaces_existing_rows() {
        let mut list = TextList::new();
        list.append("stale".to_string());

        render(&mut list, &[1, 2, 3], |n| format!("row {}", n));
        assert_eq!(list.rows(), ["row 1", "row 2", "row 3"]);
    }

    #[test]
    fn test_render_empty_items_clears() {
        let mut list = TextList::new();
        list.append("stale".to_string());

        render(&mut list, &[] as &[u32], |n| n.to_string());
        assert!(list.is_empty());
    }

    #[test]
    fn test_example_snapshot() {
        let mut renderer = renderer();
        renderer.on_snapshot(&Snapshot::from_json(EXAMPLE).unwrap());

        assert_eq!(rows(&renderer, Region::Stages), ["Stage: ingest, Status: running"]);
        assert!(rows(&renderer, Region::Workers).is_empty());
        assert_eq!(rows(&renderer, Region::EventQueues), ["Queue: q1, Length: 5"]);
        assert!(rows(&renderer, Region::PerformanceMetrics).is_empty());
        assert_eq!(rows(&renderer, Region::Notifications), ["Notification: ok"]);
    }

    #[test]
    fn test_rows_match_items_in_order() {
        let snapshot = sample();
        let mut renderer = renderer();
        renderer.on_snapshot(&snapshot);

        assert_eq!(
            rows(&renderer, Region::Stages),
            ["Stage: ingest, Status: running", "Stage: transform, Status: pending"]
        );
        assert_eq!(rows(&renderer, Region::Workers), ["Worker: w-1, Status: busy"]);
        assert_eq!(
            rows(&renderer, Region::EventQueues),
            ["Queue: q1, Length: 5", "Queue: q2, Length: 0"]
        );
        assert_eq!(
            rows(&renderer, Region::PerformanceMetrics),
            ["Metric: latency_ms, Value: 12.5"]
        );
        assert_eq!(
            rows(&renderer, Region::Notifications),
            ["Notification: deploy finished"]
        );
    }

    #[test]
    fn test_repeated_snapshot_does_not_accumulate() {
        let snapshot = sample();

        let mut once = renderer();
        once.on_snapshot(&snapshot);

        let mut twice = renderer();
        twice.on_snapshot(&snapshot);
        twice.on_snapshot(&snapshot);

        assert_eq!(once.surface(), twice.surface());
    }

    #[test]
    fn test_empty_snapshot_empties_every_region() {
        let mut renderer = renderer();
        renderer.on_snapshot(&sample());
        renderer.on_snapshot(&Snapshot::default());

        assert_eq!(renderer.surface().row_count(), 0);
    }

    #[test]
    fn test_partial_payload_leaves_other_regions_empty() {
        let mut renderer = renderer();
        let snapshot =
            Snapshot::from_json(r#"{"workers":[{"name":"w-1","status":"idle"}]}"#).unwrap();
        renderer.on_snapshot(&snapshot);

        assert_eq!(rows(&renderer, Region::Workers), ["Worker: w-1, Status: idle"]);
        for region in [
            Region::Stages,
            Region::EventQueues,
            Region::PerformanceMetrics,
            Region::Notifications,
        ] {
            assert!(rows(&renderer, region).is_empty(), "{} not empty", region);
        }
    }

    #[test]
    fn test_later_snapshot_drops_entities_by_position_not_name() {
        let mut renderer = renderer();
        renderer.on_snapshot(&sample());

        let next = Snapshot {
            stages: vec![Stage::new("transform", "running")],
            ..Default::default()
        };
        renderer.on_snapshot(&next);

        assert_eq!(rows(&renderer, Region::Stages), ["Stage: transform, Status: running"]);
    }

    #[test]
    fn test_missing_region_fails_fast() {
        let board = Board::with_regions([
            "stages-list",
            "event-queues-list",
            "performance-metrics-list",
            "notification-center",
        ]);

        let err = DashboardRenderer::new(board).err().unwrap();
        assert_eq!(
            err,
            RenderError::TargetMissing {
                id: "workers-list".to_string()
            }
        );
    }

    #[test]
    fn test_extra_regions_are_untouched() {
        let mut ids: Vec<&str> = Region::ALL.iter().map(|r| r.id()).collect();
        ids.push("footer");
        let mut board = Board::with_regions(ids);
        board.list_mut("footer").unwrap().append("keep me".to_string());

        let mut renderer = DashboardRenderer::new(board).unwrap();
        renderer.on_snapshot(&sample());

        assert_eq!(renderer.surface().rows("footer").unwrap(), ["keep me"]);
    }
}
