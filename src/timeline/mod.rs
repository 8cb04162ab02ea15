//! Timeline: the finite ordered sequence of windows/periods describing
//! playable content, plus the media-period identification scheme (§3).

mod period;
mod window;

pub use period::{AdPlaybackState, PeriodUid};
pub use window::Window;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use period::Period;

use crate::state::RepeatMode;

/// Identity of a specific period *instance*, disambiguating repeated plays of
/// the same period uid (e.g. under `RepeatMode::All`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaPeriodId {
    pub period_uid: PeriodUid,
    pub window_sequence_number: u64,
    pub ad_group_index: Option<u32>,
    pub ad_index_in_ad_group: Option<u32>,
}

impl MediaPeriodId {
    pub fn is_ad(&self) -> bool {
        self.ad_group_index.is_some()
    }
}

/// A finite ordered sequence of windows, each decomposed into one or more
/// periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Timeline {
    windows: Vec<Window>,
    periods: Vec<Period>,
}

impl Timeline {
    pub const EMPTY: Timeline = Timeline { windows: Vec::new(), periods: Vec::new() };

    pub fn new(windows: Vec<Window>, periods: Vec<Period>) -> Self {
        Self { windows, periods }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    pub fn window(&self, index: usize) -> Option<&Window> {
        self.windows.get(index)
    }

    pub fn period(&self, index: usize) -> Option<&Period> {
        self.periods.get(index)
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// First period uid belonging to `window_index`, used to build a
    /// [`MediaPeriodId`] for the start of a window.
    pub fn uid_of_first_period_in_window(&self, window_index: usize) -> Option<PeriodUid> {
        let window = self.windows.get(window_index)?;
        self.periods.get(window.first_period_index).map(|p| p.uid)
    }

    pub fn window_index_of_period_uid(&self, uid: PeriodUid) -> Option<usize> {
        let period_index = self.periods.iter().position(|p| p.uid == uid)?;
        self.windows
            .iter()
            .position(|w| w.first_period_index <= period_index && period_index <= w.last_period_index)
    }

    pub fn period_index_of_uid(&self, uid: PeriodUid) -> Option<usize> {
        self.periods.iter().position(|p| p.uid == uid)
    }

    /// Two timelines are "the same timeline" for listener-notification
    /// purposes iff window count, period count, and all per-window/per-period
    /// attributes match; uids are excluded (§3).
    pub fn same_content(&self, other: &Timeline) -> bool {
        if self.windows.len() != other.windows.len() || self.periods.len() != other.periods.len() {
            return false;
        }
        self.windows
            .iter()
            .zip(other.windows.iter())
            .all(|(a, b)| a.same_content(b))
            && self
                .periods
                .iter()
                .zip(other.periods.iter())
                .all(|(a, b)| a.same_content(b))
    }

    /// Next window index applying `repeat_mode`, or `None` at the end of the
    /// timeline under `RepeatMode::Off`.
    pub fn next_window_index(&self, current: usize, repeat_mode: RepeatMode) -> Option<usize> {
        if self.windows.is_empty() {
            return None;
        }
        match repeat_mode {
            RepeatMode::One => Some(current),
            RepeatMode::Off => {
                if current + 1 < self.windows.len() {
                    Some(current + 1)
                } else {
                    None
                }
            }
            RepeatMode::All => Some((current + 1) % self.windows.len()),
        }
    }

    /// Previous window index applying `repeat_mode`.
    pub fn previous_window_index(&self, current: usize, repeat_mode: RepeatMode) -> Option<usize> {
        if self.windows.is_empty() {
            return None;
        }
        match repeat_mode {
            RepeatMode::One => Some(current),
            RepeatMode::Off => {
                if current > 0 {
                    Some(current - 1)
                } else {
                    None
                }
            }
            RepeatMode::All => Some(if current == 0 { self.windows.len() - 1 } else { current - 1 }),
        }
    }

    /// Build a timeline for a sequence of holders, substituting a
    /// placeholder window for any holder whose real timeline is not yet
    /// known (§4.1 timeline masking).
    pub fn masked_from_holders<'a, I>(holders: I) -> Timeline
    where
        I: IntoIterator<Item = (u64, Option<&'a Timeline>)>,
    {
        let mut windows = Vec::new();
        let mut periods = Vec::new();

        for (holder_uid, known) in holders {
            match known {
                Some(real) if !real.is_empty() => {
                    let period_offset = periods.len();
                    for (i, period) in real.periods.iter().enumerate() {
                        let mut period = period.clone();
                        period.uid = PeriodUid { holder_uid, period_index_in_holder: i };
                        periods.push(period);
                    }
                    for window in &real.windows {
                        let mut window = window.clone();
                        window.first_period_index += period_offset;
                        window.last_period_index += period_offset;
                        windows.push(window);
                    }
                }
                _ => {
                    let period_index = periods.len();
                    periods.push(Period {
                        uid: PeriodUid { holder_uid, period_index_in_holder: 0 },
                        duration_us: None,
                        position_in_window_us: 0,
                        ad_playback_state: None,
                    });
                    windows.push(Window::placeholder(period_index));
                }
            }
        }

        Timeline { windows, periods }
    }
}

/// A permutation over playlist indices, used to linearize shuffled playback
/// order without physically reordering the playlist (§3/§4.3).
pub trait ShuffleOrder: Send + Sync + std::fmt::Debug {
    fn length(&self) -> usize;
    fn next_index(&self, current: usize, repeat_mode: RepeatMode) -> Option<usize>;
    fn previous_index(&self, current: usize, repeat_mode: RepeatMode) -> Option<usize>;
    fn first_index(&self) -> Option<usize>;
    fn last_index(&self) -> Option<usize>;
    fn clone_and_insert(&self, at: usize, count: usize) -> Box<dyn ShuffleOrder>;
    fn clone_and_remove(&self, from: usize, to: usize) -> Box<dyn ShuffleOrder>;
    fn clone_and_move(&self, from: usize, to: usize, new_from: usize) -> Box<dyn ShuffleOrder>;
}

/// Identity order: `next_index`/`previous_index` walk the playlist in its
/// natural order.
#[derive(Debug, Clone)]
pub struct DefaultShuffleOrder {
    length: usize,
}

impl DefaultShuffleOrder {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl ShuffleOrder for DefaultShuffleOrder {
    fn length(&self) -> usize {
        self.length
    }

    fn next_index(&self, current: usize, repeat_mode: RepeatMode) -> Option<usize> {
        linear_next(self.length, current, repeat_mode)
    }

    fn previous_index(&self, current: usize, repeat_mode: RepeatMode) -> Option<usize> {
        linear_previous(self.length, current, repeat_mode)
    }

    fn first_index(&self) -> Option<usize> {
        if self.length == 0 {
            None
        } else {
            Some(0)
        }
    }

    fn last_index(&self) -> Option<usize> {
        if self.length == 0 {
            None
        } else {
            Some(self.length - 1)
        }
    }

    fn clone_and_insert(&self, _at: usize, count: usize) -> Box<dyn ShuffleOrder> {
        Box::new(Self { length: self.length + count })
    }

    fn clone_and_remove(&self, from: usize, to: usize) -> Box<dyn ShuffleOrder> {
        Box::new(Self { length: self.length - (to - from) })
    }

    fn clone_and_move(&self, _from: usize, _to: usize, _new_from: usize) -> Box<dyn ShuffleOrder> {
        Box::new(Self { length: self.length })
    }
}

fn linear_next(length: usize, current: usize, repeat_mode: RepeatMode) -> Option<usize> {
    if length == 0 {
        return None;
    }
    match repeat_mode {
        RepeatMode::One => Some(current),
        RepeatMode::Off => {
            if current + 1 < length {
                Some(current + 1)
            } else {
                None
            }
        }
        RepeatMode::All => Some((current + 1) % length),
    }
}

fn linear_previous(length: usize, current: usize, repeat_mode: RepeatMode) -> Option<usize> {
    if length == 0 {
        return None;
    }
    match repeat_mode {
        RepeatMode::One => Some(current),
        RepeatMode::Off => current.checked_sub(1),
        RepeatMode::All => Some(if current == 0 { length - 1 } else { current - 1 }),
    }
}

/// A permutation, reshuffled with `rand` on construction and on every
/// playlist mutation (direct analogue of the teacher's use of `rand` for
/// shuffled selection order).
#[derive(Debug, Clone)]
pub struct RandomShuffleOrder {
    /// `shuffled[i]` is the playlist index played at shuffled position `i`.
    shuffled: Vec<usize>,
    /// `positions[playlist_index]` is the shuffled position of that index.
    positions: HashMap<usize, usize>,
}

impl RandomShuffleOrder {
    pub fn new(length: usize) -> Self {
        use rand::seq::SliceRandom;
        let mut shuffled: Vec<usize> = (0..length).collect();
        shuffled.shuffle(&mut rand::thread_rng());
        let positions = shuffled.iter().enumerate().map(|(pos, &idx)| (idx, pos)).collect();
        Self { shuffled, positions }
    }

    fn from_shuffled(shuffled: Vec<usize>) -> Self {
        let positions = shuffled.iter().enumerate().map(|(pos, &idx)| (idx, pos)).collect();
        Self { shuffled, positions }
    }
}

impl ShuffleOrder for RandomShuffleOrder {
    fn length(&self) -> usize {
        self.shuffled.len()
    }

    fn next_index(&self, current: usize, repeat_mode: RepeatMode) -> Option<usize> {
        let pos = *self.positions.get(&current)?;
        let next_pos = linear_next(self.shuffled.len(), pos, repeat_mode)?;
        self.shuffled.get(next_pos).copied()
    }

    fn previous_index(&self, current: usize, repeat_mode: RepeatMode) -> Option<usize> {
        let pos = *self.positions.get(&current)?;
        let prev_pos = linear_previous(self.shuffled.len(), pos, repeat_mode)?;
        self.shuffled.get(prev_pos).copied()
    }

    fn first_index(&self) -> Option<usize> {
        self.shuffled.first().copied()
    }

    fn last_index(&self) -> Option<usize> {
        self.shuffled.last().copied()
    }

    fn clone_and_insert(&self, at: usize, count: usize) -> Box<dyn ShuffleOrder> {
        use rand::Rng;
        let mut shuffled: Vec<usize> = self
            .shuffled
            .iter()
            .map(|&idx| if idx >= at { idx + count } else { idx })
            .collect();
        let mut rng = rand::thread_rng();
        for offset in 0..count {
            let insert_at = rng.gen_range(0..=shuffled.len());
            shuffled.insert(insert_at, at + offset);
        }
        Box::new(Self::from_shuffled(shuffled))
    }

    fn clone_and_remove(&self, from: usize, to: usize) -> Box<dyn ShuffleOrder> {
        let removed_count = to - from;
        let shuffled: Vec<usize> = self
            .shuffled
            .iter()
            .filter(|&&idx| idx < from || idx >= to)
            .map(|&idx| if idx >= to { idx - removed_count } else { idx })
            .collect();
        Box::new(Self::from_shuffled(shuffled))
    }

    fn clone_and_move(&self, from: usize, to: usize, new_from: usize) -> Box<dyn ShuffleOrder> {
        let count = to - from;
        let shuffled: Vec<usize> = self
            .shuffled
            .iter()
            .map(|&idx| remap_moved_index(idx, from, to, new_from, count))
            .collect();
        Box::new(Self::from_shuffled(shuffled))
    }
}

/// Remap a single playlist index after moving the half-open range
/// `[from, to)` so that its new first element lands at `new_from` (shared by
/// [`crate::playlist::Playlist::move_range`] and shuffle-order updates).
pub(crate) fn remap_moved_index(idx: usize, from: usize, to: usize, new_from: usize, count: usize) -> usize {
    if idx >= from && idx < to {
        // Moved element: carry its offset within the moved block.
        new_from + (idx - from)
    } else if idx < from {
        if idx >= new_from {
            idx + count
        } else {
            idx
        }
    } else {
        // idx >= to
        if idx < new_from + count {
            idx - count
        } else {
            idx
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(duration_us: Option<i64>, first: usize, last: usize) -> Window {
        Window {
            is_seekable: true,
            is_dynamic: false,
            default_position_us: 0,
            duration_us,
            first_period_index: first,
            last_period_index: last,
            position_in_first_period_us: 0,
        }
    }

    fn period(holder_uid: u64, index: usize, duration_us: Option<i64>) -> Period {
        Period {
            uid: PeriodUid { holder_uid, period_index_in_holder: index },
            duration_us,
            position_in_window_us: 0,
            ad_playback_state: None,
        }
    }

    #[test]
    fn empty_timeline_has_no_windows() {
        let timeline = Timeline::EMPTY;
        assert!(timeline.is_empty());
        assert_eq!(timeline.window_count(), 0);
    }

    #[test]
    fn same_content_ignores_uids() {
        let a = Timeline::new(vec![window(Some(1_000_000), 0, 0)], vec![period(1, 0, Some(1_000_000))]);
        let b = Timeline::new(vec![window(Some(1_000_000), 0, 0)], vec![period(2, 0, Some(1_000_000))]);
        assert!(a.same_content(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn next_window_index_respects_repeat_mode() {
        let timeline = Timeline::new(
            vec![window(Some(1), 0, 0), window(Some(1), 1, 1), window(Some(1), 2, 2)],
            vec![period(1, 0, Some(1)), period(1, 1, Some(1)), period(1, 2, Some(1))],
        );
        assert_eq!(timeline.next_window_index(2, RepeatMode::Off), None);
        assert_eq!(timeline.next_window_index(2, RepeatMode::All), Some(0));
        assert_eq!(timeline.next_window_index(1, RepeatMode::One), Some(1));
    }

    #[test]
    fn masked_from_holders_uses_placeholder_for_unprepared() {
        let timeline = Timeline::masked_from_holders(vec![(1, None), (2, None)]);
        assert_eq!(timeline.window_count(), 2);
        assert!(timeline.window(0).unwrap().is_placeholder());
        assert!(timeline.window(1).unwrap().is_placeholder());
    }

    #[test]
    fn masked_from_holders_uses_real_timeline_when_known() {
        let real = Timeline::new(vec![window(Some(5_000_000), 0, 0)], vec![period(999, 0, Some(5_000_000))]);
        let timeline = Timeline::masked_from_holders(vec![(7, Some(&real)), (8, None)]);
        assert_eq!(timeline.window_count(), 2);
        assert!(!timeline.window(0).unwrap().is_placeholder());
        assert_eq!(timeline.window(0).unwrap().duration_us, Some(5_000_000));
        assert_eq!(timeline.period(0).unwrap().uid.holder_uid, 7);
        assert!(timeline.window(1).unwrap().is_placeholder());
    }

    #[test]
    fn remap_moved_index_preserves_relative_order() {
        // playlist [A B C D E], move [1,3) ("B C") to new_from=3 -> [A D B C E]
        let mapped: Vec<usize> = (0..5).map(|i| remap_moved_index(i, 1, 3, 3, 2)).collect();
        // original index -> new index
        assert_eq!(mapped, vec![0, 3, 4, 1, 2]);
    }

    #[test]
    fn default_shuffle_order_tracks_length() {
        let order = DefaultShuffleOrder::new(3);
        let order = order.clone_and_insert(1, 2);
        assert_eq!(order.length(), 5);
        let order = order.clone_and_remove(0, 2);
        assert_eq!(order.length(), 3);
    }

    #[test]
    fn random_shuffle_order_is_a_permutation() {
        let order = RandomShuffleOrder::new(5);
        let mut seen = vec![false; 5];
        let mut current = order.first_index().unwrap();
        for _ in 0..5 {
            seen[current] = true;
            if let Some(next) = order.next_index(current, RepeatMode::Off) {
                current = next;
            } else {
                break;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
