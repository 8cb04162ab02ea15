//! Playlist: the ordered sequence of [`MediaSourceHolder`]s, kept in sync
//! between the application-thread facade and the internal dispatcher by the
//! command/update protocol (§4.3).

mod holder;

pub use holder::MediaSourceHolder;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::capabilities::MediaSource;
use crate::error::PlayerError;
use crate::timeline::Timeline;

/// Generates holder uids. Shared (via `Arc`) between the facade's playlist
/// copy and the internal dispatcher's playlist copy so both assign the same
/// uid to a holder created from the same `set_media_items`/`add_media_items`
/// call, without needing to round-trip the uid over the command channel.
#[derive(Debug, Clone, Default)]
pub struct HolderUidGenerator(Arc<AtomicU64>);

impl HolderUidGenerator {
    pub fn new() -> Self {
        Self(Arc::new(AtomicU64::new(0)))
    }

    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Ordered sequence of [`MediaSourceHolder`]s (§3, §4.3).
#[derive(Default)]
pub struct Playlist {
    holders: Vec<MediaSourceHolder>,
}

impl Playlist {
    pub fn new() -> Self {
        Self { holders: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    pub fn holders(&self) -> &[MediaSourceHolder] {
        &self.holders
    }

    pub fn holder(&self, index: usize) -> Option<&MediaSourceHolder> {
        self.holders.get(index)
    }

    pub fn holder_mut(&mut self, index: usize) -> Option<&mut MediaSourceHolder> {
        self.holders.get_mut(index)
    }

    pub fn index_of_uid(&self, uid: u64) -> Option<usize> {
        self.holders.iter().position(|h| h.uid() == uid)
    }

    /// Replace the entire playlist, returning the previously held holders.
    pub fn replace_all(&mut self, sources: Vec<Arc<dyn MediaSource>>, uids: &HolderUidGenerator) -> Vec<MediaSourceHolder> {
        let old = std::mem::take(&mut self.holders);
        self.holders = sources.into_iter().map(|source| MediaSourceHolder::new(uids.next(), source)).collect();
        old
    }

    /// Insert `sources` at `index` (`0 <= index <= len`).
    pub fn insert_range_at(
        &mut self,
        index: usize,
        sources: Vec<Arc<dyn MediaSource>>,
        uids: &HolderUidGenerator,
    ) -> Result<(), PlayerError> {
        if index > self.holders.len() {
            return Err(PlayerError::InvalidIndex { index, len: self.holders.len() });
        }
        let new_holders: Vec<MediaSourceHolder> =
            sources.into_iter().map(|source| MediaSourceHolder::new(uids.next(), source)).collect();
        self.holders.splice(index..index, new_holders);
        Ok(())
    }

    /// Remove the half-open range `[from, to)`, returning the removed
    /// holders.
    pub fn remove_range(&mut self, from: usize, to: usize) -> Result<Vec<MediaSourceHolder>, PlayerError> {
        if to < from || to > self.holders.len() {
            return Err(PlayerError::InvalidRange { from, to, len: self.holders.len() });
        }
        Ok(self.holders.splice(from..to, std::iter::empty()).collect())
    }

    /// Relocate the half-open range `[from, to)` so its first element lands
    /// at `new_from`, clamped to `len - (to - from)` (§4.1). Preserves the
    /// relative order of moved and non-moved items.
    pub fn move_range(&mut self, from: usize, to: usize, new_from: usize) -> Result<(), PlayerError> {
        if to < from || to > self.holders.len() {
            return Err(PlayerError::InvalidRange { from, to, len: self.holders.len() });
        }
        let count = to - from;
        if count == 0 {
            return Ok(());
        }
        let max_new_from = self.holders.len() - count;
        let new_from = new_from.min(max_new_from);

        let moved: Vec<MediaSourceHolder> = self.holders.splice(from..to, std::iter::empty()).collect();
        self.holders.splice(new_from..new_from, moved);
        Ok(())
    }

    /// Compute the masked timeline from the holders' last-known real
    /// timelines, substituting placeholders for unprepared holders (§4.1).
    pub fn masked_timeline(&self) -> Timeline {
        Timeline::masked_from_holders(self.holders.iter().map(|h| (h.uid(), h.timeline())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fake_source;

    #[test]
    fn insert_range_at_rejects_out_of_bounds_index() {
        let mut playlist = Playlist::new();
        let uids = HolderUidGenerator::new();
        let err = playlist.insert_range_at(1, vec![fake_source()], &uids).unwrap_err();
        assert!(matches!(err, PlayerError::InvalidIndex { index: 1, len: 0 }));
    }

    #[test]
    fn move_range_clamps_new_from_and_preserves_order() {
        let mut playlist = Playlist::new();
        let uids = HolderUidGenerator::new();
        playlist
            .insert_range_at(0, vec![fake_source(), fake_source(), fake_source(), fake_source(), fake_source()], &uids)
            .unwrap();
        let uids_before: Vec<u64> = playlist.holders().iter().map(|h| h.uid()).collect();

        playlist.move_range(1, 3, 10).unwrap();

        let uids_after: Vec<u64> = playlist.holders().iter().map(|h| h.uid()).collect();
        assert_eq!(uids_after, vec![uids_before[0], uids_before[3], uids_before[4], uids_before[1], uids_before[2]]);
    }

    #[test]
    fn remove_range_returns_removed_holders() {
        let mut playlist = Playlist::new();
        let uids = HolderUidGenerator::new();
        playlist.insert_range_at(0, vec![fake_source(), fake_source(), fake_source()], &uids).unwrap();
        let removed = playlist.remove_range(1, 3).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn masked_timeline_reflects_placeholder_for_new_holders() {
        let mut playlist = Playlist::new();
        let uids = HolderUidGenerator::new();
        playlist.insert_range_at(0, vec![fake_source(), fake_source()], &uids).unwrap();
        let timeline = playlist.masked_timeline();
        assert_eq!(timeline.window_count(), 2);
        assert!(timeline.window(0).unwrap().is_placeholder());
    }
}
