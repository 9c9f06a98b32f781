//! Animation Sequencer
//!
//! Per-actor playback cursor over a table of [`AnimationClip`]s.
//!
//! Each [`tick`](AnimationSequencer::tick) advances the elapsed time first and
//! then samples: `frame = floor(tick * sampling_rate)`. Past the last frame a
//! looping clip wraps to frame 0, a one-shot clip freezes on its last frame
//! and reports "finished" once.
//!
//! The sampling rate is read from the current clip on every tick, so
//! switching clips changes the time-to-frame mapping immediately.
//!
//! # Toggling
//!
//! [`transition`](AnimationSequencer::transition) resets the cursor unless
//! the requested clip is the one displayed by the previous tick. Toggling
//! away and back within one frame leaves the cursor where the first switch
//! put it.

use super::clip::{AnimationClip, Keyframe};

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSequencer {
    clip: usize,
    prev_clip: usize,
    tick: f32,
    frame: usize,
    looping: bool,
    finished: bool,
}

impl AnimationSequencer {
    #[must_use]
    pub fn new(initial_clip: usize, looping: bool) -> Self {
        Self {
            clip: initial_clip,
            prev_clip: initial_clip,
            tick: 0.0,
            frame: 0,
            looping,
            finished: false,
        }
    }

    /// Requests `next` as the current clip.
    ///
    /// Re-requesting the current clip changes nothing, not even the loop flag.
    pub fn transition(&mut self, next: usize, looping: bool) {
        if next == self.clip {
            return;
        }

        self.clip = next;
        self.looping = looping;
        self.finished = false;

        if next != self.prev_clip {
            self.tick = 0.0;
            self.frame = 0;
        }
    }

    /// Advances playback by `delta_time` seconds.
    ///
    /// Returns `true` on the tick a one-shot clip overruns its last frame;
    /// later ticks on the frozen clip return `false`. An empty clip never
    /// advances.
    ///
    /// # Panics
    ///
    /// When the current clip index is outside `clips`.
    pub fn tick(&mut self, clips: &[AnimationClip], delta_time: f32) -> bool {
        assert!(
            self.clip < clips.len(),
            "animation clip {} out of range ({} clips)",
            self.clip,
            clips.len()
        );
        let clip = &clips[self.clip];
        self.prev_clip = self.clip;

        let frame_count = clip.frame_count();
        if frame_count == 0 || self.finished {
            return false;
        }

        self.tick += delta_time;
        let frame = (self.tick * clip.sampling_rate).floor().max(0.0) as usize;

        if frame < frame_count {
            self.frame = frame;
            return false;
        }

        if self.looping {
            self.frame = 0;
            self.tick = 0.0;
            false
        } else {
            self.frame = frame_count - 1;
            self.finished = true;
            true
        }
    }

    /// Keyframe under the cursor.
    ///
    /// # Panics
    ///
    /// When the current clip index is outside `clips` or the clip is empty.
    #[must_use]
    pub fn current_keyframe<'a>(&self, clips: &'a [AnimationClip]) -> &'a Keyframe {
        &clips[self.clip].sequence[self.frame]
    }

    #[must_use]
    pub fn clip(&self) -> usize {
        self.clip
    }

    /// Clip displayed by the most recent tick.
    #[must_use]
    pub fn previous_clip(&self) -> usize {
        self.prev_clip
    }

    #[must_use]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Elapsed seconds within the current clip.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.tick
    }

    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
