//! Tunable constants of the simulated machine.
//!
//! The defaults model 64 MiB of physical memory split into 16 MiB for the
//! kernel and 48 MiB for user frames, with 4 KiB pages.

use crate::{error::VmError, page_table::MAX_FRAMES};

pub const DEFAULT_PAGE_SIZE: usize = 4096;
pub const DEFAULT_USER_FRAMES: usize = 48 * 1024 * 1024 / DEFAULT_PAGE_SIZE;
pub const DEFAULT_PAGE_TABLE_ENTRIES: usize = 2048;
pub const DEFAULT_ESSENTIAL_PAGES: usize = 10;
pub const DEFAULT_NFF_MIN: usize = 1000;

/// How a replacement frame is picked once none of the affinity tiers match.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Uniform pick over the free pool, driven by a seeded generator.
    Random { seed: u64 },
    /// The most recently freed frame.
    MostRecent,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::Random { seed: 0 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Bytes per page (and per frame).
    pub page_size: usize,
    /// Number of frames handed out to user processes.
    pub user_frames: usize,
    /// Slots in every process page table.
    pub page_table_entries: usize,
    /// Pages at the bottom of every table that stay resident for the
    /// whole life of the process.
    pub essential_pages: usize,
    /// Free frames at or below this count force a replacement on fault.
    pub nff_min: usize,
    pub fallback: FallbackPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            page_size: DEFAULT_PAGE_SIZE,
            user_frames: DEFAULT_USER_FRAMES,
            page_table_entries: DEFAULT_PAGE_TABLE_ENTRIES,
            essential_pages: DEFAULT_ESSENTIAL_PAGES,
            nff_min: DEFAULT_NFF_MIN,
            fallback: FallbackPolicy::default(),
        }
    }
}

impl Config {
    /// Number of 32-bit integers of the searched array held by one page.
    pub fn ints_per_page(&self) -> usize {
        self.page_size / 4
    }

    /// Virtual page holding element `index` of a process array.
    pub fn page_of_index(&self, index: usize) -> usize {
        self.essential_pages + index / self.ints_per_page()
    }

    pub fn validate(&self) -> Result<(), VmError> {
        if self.user_frames == 0 || self.user_frames > MAX_FRAMES {
            return Err(VmError::InvalidConfig(format!(
                "user frame count {} must be within 1..={}",
                self.user_frames, MAX_FRAMES
            )));
        }

        if self.page_size < 4 || self.page_size % 4 != 0 {
            return Err(VmError::InvalidConfig(format!(
                "page size {} must be a positive multiple of 4",
                self.page_size
            )));
        }

        if self.essential_pages >= self.page_table_entries {
            return Err(VmError::InvalidConfig(format!(
                "{} essential pages leave no room in a {}-entry page table",
                self.essential_pages, self.page_table_entries
            )));
        }

        Ok(())
    }
}
