//! Playback queue
//!
//! An ordered, immutable list of tracks with a cursor. Navigation never edits
//! the list; it produces a new `Queue` sharing the same tracks with the cursor
//! moved. A new playlist replaces the queue wholesale.

use crate::error::{PlaybackError, Result};
use crate::types::{Direction, RepeatMode};
use cadence_core::Track;
use rand::Rng;
use std::sync::Arc;

/// Track list plus current-position cursor
///
/// Invariant: `cursor` is `Some(i)` with `i < tracks.len()` whenever the queue
/// is non-empty, and `None` when it is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    tracks: Arc<[Track]>,
    cursor: Option<usize>,
}

impl Queue {
    /// Create new empty queue
    pub fn empty() -> Self {
        Self {
            tracks: Arc::from(Vec::new()),
            cursor: None,
        }
    }

    /// Build a queue positioned at `start_index`
    ///
    /// An empty track list yields an empty queue regardless of `start_index`.
    pub fn from_tracks(tracks: Vec<Track>, start_index: usize) -> Result<Self> {
        if tracks.is_empty() {
            return Ok(Self::empty());
        }
        if start_index >= tracks.len() {
            return Err(PlaybackError::InvalidIndex {
                index: start_index,
                len: tracks.len(),
            });
        }

        Ok(Self {
            tracks: tracks.into(),
            cursor: Some(start_index),
        })
    }

    /// Same tracks, cursor at `index`
    pub fn with_cursor(&self, index: usize) -> Result<Self> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::InvalidIndex {
                index,
                len: self.tracks.len(),
            });
        }

        Ok(Self {
            tracks: Arc::clone(&self.tracks),
            cursor: Some(index),
        })
    }

    /// Queue after one navigation step
    ///
    /// Returns an unchanged clone when the step resolves to nothing (boundary
    /// with repeat off, or an empty queue).
    pub fn advance<R: Rng + ?Sized>(
        &self,
        direction: Direction,
        shuffle: bool,
        repeat: RepeatMode,
        rng: &mut R,
    ) -> Self {
        match self.resolve(direction, shuffle, repeat, rng) {
            Some(index) => Self {
                tracks: Arc::clone(&self.tracks),
                cursor: Some(index),
            },
            None => self.clone(),
        }
    }

    /// Index one navigation step away, or `None` for a no-op
    ///
    /// - shuffle: uniform pick over the whole queue, current track included
    /// - otherwise: neighbour in `direction`, wrapping only with `RepeatMode::All`
    ///
    /// `RepeatMode::One` does not affect explicit navigation; it only applies
    /// when a track ends on its own.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        direction: Direction,
        shuffle: bool,
        repeat: RepeatMode,
        rng: &mut R,
    ) -> Option<usize> {
        let cursor = self.cursor?;
        let len = self.tracks.len();

        if shuffle {
            return Some(rng.gen_range(0..len));
        }

        match direction {
            Direction::Next if cursor + 1 < len => Some(cursor + 1),
            Direction::Previous if cursor > 0 => Some(cursor - 1),
            Direction::Next if repeat == RepeatMode::All => Some(0),
            Direction::Previous if repeat == RepeatMode::All => Some(len - 1),
            _ => None,
        }
    }

    /// Whether a navigation control in `direction` should be enabled
    pub fn can_move(&self, direction: Direction, shuffle: bool, repeat: RepeatMode) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        let len = self.tracks.len();

        if (shuffle || repeat == RepeatMode::All) && len > 1 {
            return true;
        }

        match direction {
            Direction::Next => cursor + 1 < len,
            Direction::Previous => cursor > 0,
        }
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|i| self.tracks.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Total number of tracks in queue
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.cursor == Some(0)
    }

    pub fn is_last(&self) -> bool {
        matches!(self.cursor, Some(i) if i + 1 == self.tracks.len())
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{NewTrack, TrackId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_track(id: &str, duration_ms: u64) -> Track {
        Track::new(NewTrack {
            id: TrackId::new(id),
            title: format!("Track {id}"),
            artist: "Test Artist".to_string(),
            album: "Test Album".to_string(),
            duration_ms,
            stream_uri: format!("https://example.com/{id}.mp3"),
            ..Default::default()
        })
        .unwrap()
    }

    fn queue_of(n: usize, start: usize) -> Queue {
        let tracks = (1..=n)
            .map(|i| create_test_track(&i.to_string(), 180_000))
            .collect();
        Queue::from_tracks(tracks, start).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn create_empty_queue() {
        let queue = Queue::empty();
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert!(queue.current().is_none());
        assert!(queue.current_index().is_none());
    }

    #[test]
    fn empty_tracks_ignore_start_index() {
        let queue = Queue::from_tracks(Vec::new(), 42).unwrap();
        assert!(queue.is_empty());
        assert!(queue.current_index().is_none());
    }

    #[test]
    fn start_index_out_of_range_is_rejected() {
        let tracks = vec![create_test_track("1", 1000), create_test_track("2", 1000)];
        let err = Queue::from_tracks(tracks, 2).unwrap_err();
        assert_eq!(err, PlaybackError::InvalidIndex { index: 2, len: 2 });
    }

    #[test]
    fn cursor_points_at_start_track() {
        let queue = queue_of(3, 1);
        assert_eq!(queue.current_index(), Some(1));
        assert_eq!(queue.current().unwrap().id().as_str(), "2");
    }

    #[test]
    fn next_walks_forward_then_stops() {
        let mut rng = rng();
        let queue = queue_of(3, 0);

        let queue = queue.advance(Direction::Next, false, RepeatMode::Off, &mut rng);
        assert_eq!(queue.current_index(), Some(1));
        let queue = queue.advance(Direction::Next, false, RepeatMode::Off, &mut rng);
        assert_eq!(queue.current_index(), Some(2));
        assert!(queue.is_last());

        let unchanged = queue.advance(Direction::Next, false, RepeatMode::Off, &mut rng);
        assert_eq!(unchanged, queue);
    }

    #[test]
    fn repeat_all_wraps_both_ways() {
        let mut rng = rng();
        let last = queue_of(3, 2);
        let wrapped = last.advance(Direction::Next, false, RepeatMode::All, &mut rng);
        assert_eq!(wrapped.current_index(), Some(0));

        let first = queue_of(3, 0);
        let wrapped = first.advance(Direction::Previous, false, RepeatMode::All, &mut rng);
        assert_eq!(wrapped.current_index(), Some(2));
    }

    #[test]
    fn repeat_one_does_not_wrap_explicit_navigation() {
        let mut rng = rng();
        let last = queue_of(3, 2);
        assert_eq!(last.resolve(Direction::Next, false, RepeatMode::One, &mut rng), None);
    }

    #[test]
    fn previous_stops_at_start() {
        let mut rng = rng();
        let queue = queue_of(2, 0);
        assert!(queue.is_first());
        assert_eq!(
            queue.resolve(Direction::Previous, false, RepeatMode::Off, &mut rng),
            None
        );
    }

    #[test]
    fn single_track_without_wrap_is_unchanged() {
        let mut rng = rng();
        let queue = queue_of(1, 0);
        for direction in [Direction::Next, Direction::Previous] {
            let after = queue.advance(direction, false, RepeatMode::Off, &mut rng);
            assert_eq!(after.current_index(), Some(0));
        }
    }

    #[test]
    fn shuffle_picks_within_bounds() {
        let mut rng = rng();
        let queue = queue_of(5, 0);
        for _ in 0..200 {
            let index = queue
                .resolve(Direction::Next, true, RepeatMode::Off, &mut rng)
                .unwrap();
            assert!(index < 5);
        }
    }

    #[test]
    fn shuffle_may_repeat_current_track() {
        let mut rng = rng();
        let queue = queue_of(2, 0);
        let picked_current = (0..200).any(|_| {
            queue.resolve(Direction::Next, true, RepeatMode::Off, &mut rng) == Some(0)
        });
        assert!(picked_current);
    }

    #[test]
    fn advance_shares_track_storage() {
        let mut rng = rng();
        let queue = queue_of(3, 0);
        let next = queue.advance(Direction::Next, false, RepeatMode::Off, &mut rng);
        assert!(std::ptr::eq(queue.tracks().as_ptr(), next.tracks().as_ptr()));
    }

    #[test]
    fn with_cursor_validates_index() {
        let queue = queue_of(3, 0);
        assert_eq!(queue.with_cursor(2).unwrap().current_index(), Some(2));
        assert!(queue.with_cursor(3).is_err());
        assert!(Queue::empty().with_cursor(0).is_err());
    }

    #[test]
    fn can_move_boundaries() {
        let first = queue_of(3, 0);
        assert!(!first.can_move(Direction::Previous, false, RepeatMode::Off));
        assert!(first.can_move(Direction::Next, false, RepeatMode::Off));
        assert!(first.can_move(Direction::Previous, false, RepeatMode::All));
        assert!(first.can_move(Direction::Previous, true, RepeatMode::Off));

        let single = queue_of(1, 0);
        assert!(!single.can_move(Direction::Next, true, RepeatMode::All));
        assert!(!Queue::empty().can_move(Direction::Next, true, RepeatMode::All));
    }
}
