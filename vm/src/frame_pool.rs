//! The free frame list.
//!
//! Every frame that is not mapped by some page table sits here, tagged with
//! the process and page that held it last. Replacement uses those tags to
//! hand a process back frames it already touched.

use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{config::FallbackPolicy, page_table::FrameNumber, process::Pid};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FreeFrame {
    pub frame: FrameNumber,
    pub last_owner: Option<Pid>,
    pub last_page: Option<usize>,
}

impl FreeFrame {
    pub fn unowned(frame: FrameNumber) -> Self {
        FreeFrame {
            frame,
            last_owner: None,
            last_page: None,
        }
    }
}

/// Which rule of the affinity heuristic produced a replacement frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Same owner, same page.
    ExactReuse,
    /// Never owned by anybody.
    Unowned,
    /// Same owner, another page.
    SameOwner,
    Fallback,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::ExactReuse, Tier::Unowned, Tier::SameOwner, Tier::Fallback];

    pub fn index(self) -> usize {
        match self {
            Tier::ExactReuse => 0,
            Tier::Unowned => 1,
            Tier::SameOwner => 2,
            Tier::Fallback => 3,
        }
    }
}

pub struct FramePool {
    frames: Vec<FreeFrame>,
    fallback: FallbackPolicy,
    rng: StdRng,
}

impl FramePool {
    /// A pool holding frames `0..frame_count`, none of them owned yet.
    pub fn new(frame_count: usize, fallback: FallbackPolicy) -> Self {
        let frames = (0..frame_count)
            .map(|frame| FreeFrame::unowned(frame as FrameNumber))
            .collect();

        let seed = match fallback {
            FallbackPolicy::Random { seed } => seed,
            FallbackPolicy::MostRecent => 0,
        };

        FramePool {
            frames,
            fallback,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FreeFrame> {
        self.frames.iter()
    }

    /// Takes whichever frame is cheapest to remove, ignoring provenance.
    pub fn pop(&mut self) -> Option<FreeFrame> {
        self.frames.pop()
    }

    /// Returns `frame` to the pool, remembering who held it.
    pub fn release(&mut self, frame: FrameNumber, owner: Pid, page: usize) {
        self.frames.push(FreeFrame {
            frame,
            last_owner: Some(owner),
            last_page: Some(page),
        });
    }

    /// Removes the frame the affinity heuristic prefers for `page` of `pid`.
    pub fn select(&mut self, pid: Pid, page: usize) -> Option<(FreeFrame, Tier)> {
        if self.frames.is_empty() {
            return None;
        }

        let affine = self
            .position(|f| f.last_owner == Some(pid) && f.last_page == Some(page))
            .map(|idx| (idx, Tier::ExactReuse))
            .or_else(|| {
                self.position(|f| f.last_owner.is_none())
                    .map(|idx| (idx, Tier::Unowned))
            })
            .or_else(|| {
                self.position(|f| f.last_owner == Some(pid))
                    .map(|idx| (idx, Tier::SameOwner))
            });

        let (idx, tier) = match affine {
            Some(hit) => hit,
            None => (self.fallback_index(), Tier::Fallback),
        };

        let chosen = self.frames.swap_remove(idx);

        trace!(
            "frame_pool: {:?} picked frame {} for process {} page {}",
            tier,
            chosen.frame,
            pid,
            page
        );

        Some((chosen, tier))
    }

    fn position(&self, predicate: impl Fn(&FreeFrame) -> bool) -> Option<usize> {
        self.frames.iter().position(predicate)
    }

    fn fallback_index(&mut self) -> usize {
        match self.fallback {
            FallbackPolicy::Random { .. } => self.rng.random_range(0..self.frames.len()),
            FallbackPolicy::MostRecent => self.frames.len() - 1,
        }
    }
}
