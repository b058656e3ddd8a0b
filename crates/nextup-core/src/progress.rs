/// Hooks a front end can implement to show sync progress. Every method has a
/// no-op default.
pub trait SyncProgress: Send + Sync {
    fn section_started(&self, _title: &str, _items: usize) {}
    fn item_synced(&self, _title: &str) {}
    fn section_finished(&self, _title: &str) {}
}

pub struct NoopProgress;

impl SyncProgress for NoopProgress {}
