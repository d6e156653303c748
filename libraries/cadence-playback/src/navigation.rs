//! Navigation policy
//!
//! Pure functions deciding which track "next" and "previous" land on for a
//! queue, a current track and a loop mode. Randomness is injected so shuffle
//! picks are reproducible under a seeded generator.

use cadence_core::{Track, TrackId};
use rand::Rng;

use crate::types::LoopMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Track after `current` under `loop_mode`
///
/// - `None`: the following track, or nothing at the end of the queue
/// - `One`: the current track again
/// - `All`: the following track, wrapping to the first
/// - `Shuffle`: a random track other than the current one (when there is one)
///
/// An unknown or missing `current` recovers to the first track.
pub fn next_track<'a, R>(
    tracks: &'a [Track],
    current: Option<TrackId>,
    loop_mode: LoopMode,
    rng: &mut R,
) -> Option<&'a Track>
where
    R: Rng + ?Sized,
{
    step(tracks, current, loop_mode, rng, Direction::Forward)
}

/// Track before `current` under `loop_mode`
///
/// Mirror of [`next_track`]: `All` wraps from the first track to the last,
/// `None` yields nothing at the start of the queue.
pub fn prev_track<'a, R>(
    tracks: &'a [Track],
    current: Option<TrackId>,
    loop_mode: LoopMode,
    rng: &mut R,
) -> Option<&'a Track>
where
    R: Rng + ?Sized,
{
    step(tracks, current, loop_mode, rng, Direction::Backward)
}

/// Index of `id` in `tracks`
pub fn index_of(tracks: &[Track], id: TrackId) -> Option<usize> {
    tracks.iter().position(|t| t.id == id)
}

fn step<'a, R>(
    tracks: &'a [Track],
    current: Option<TrackId>,
    loop_mode: LoopMode,
    rng: &mut R,
    direction: Direction,
) -> Option<&'a Track>
where
    R: Rng + ?Sized,
{
    let Some(index) = current.and_then(|id| index_of(tracks, id)) else {
        return tracks.first();
    };
    let len = tracks.len();

    let target = match (loop_mode, direction) {
        (LoopMode::None, Direction::Forward) => (index + 1 < len).then_some(index + 1),
        (LoopMode::None, Direction::Backward) => index.checked_sub(1),
        (LoopMode::One, _) => Some(index),
        (LoopMode::All, Direction::Forward) => Some((index + 1) % len),
        (LoopMode::All, Direction::Backward) => Some((index + len - 1) % len),
        (LoopMode::Shuffle, _) => Some(shuffle_pick(len, index, rng)),
    };

    target.map(|i| &tracks[i])
}

/// Uniform draw over the queue; landing on `current` advances one slot
fn shuffle_pick<R>(len: usize, current: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    if len <= 1 {
        return current;
    }

    let draw = rng.gen_range(0..len);
    if draw == current {
        (current + 1) % len
    } else {
        draw
    }
}
