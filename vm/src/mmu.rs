use log::{debug, trace};

use crate::{
    config::Config,
    error::VmError,
    frame_pool::{FreeFrame, FramePool, Tier},
    page_replacer::PageReplacer,
    process::Process,
    stats::Stats,
};

/// Outcome of a single page reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Hit,
    /// Fault served straight from the pool, memory was not under pressure.
    ColdMiss,
    /// Fault that evicted a page; carries the tier that supplied the frame.
    WarmMiss(Tier),
}

/// Owns the physical side of the machine: the free pool and the global
/// counters. Processes own their page tables and are lent in per call.
pub struct Mmu<REPLACER: PageReplacer> {
    config: Config,
    free_frames: FramePool,
    stats: Stats,
    replacer: REPLACER,
}

impl<REPLACER> Mmu<REPLACER>
where
    REPLACER: PageReplacer,
{
    pub fn new(config: Config, replacer: REPLACER) -> Result<Self, VmError> {
        config.validate()?;

        let free_frames = FramePool::new(config.user_frames, config.fallback);

        Ok(Mmu {
            config,
            free_frames,
            stats: Stats::default(),
            replacer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn free_frames(&self) -> &FramePool {
        &self.free_frames
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Maps `page` to any free frame. Returns `false` when the pool is empty.
    fn allocate_frame(&mut self, process: &mut Process, page: usize) -> bool {
        match self.free_frames.pop() {
            Some(free) => {
                process.page_table.set(page, free.frame);
                true
            }
            None => false,
        }
    }

    pub fn allocate_essential(&mut self, process: &mut Process) -> Result<(), VmError> {
        for page in 0..self.config.essential_pages {
            if !self.allocate_frame(process, page) {
                return Err(VmError::OutOfFrames { pid: process.pid });
            }
        }

        Ok(())
    }

    /// Hands every frame of `process` back to the pool.
    pub fn release(&mut self, process: &mut Process) {
        let resident: Vec<_> = process.page_table.resident().collect();

        for (page, frame) in resident {
            self.free_frames.release(frame, process.pid, page);
            process.page_table.invalidate(page);
        }

        debug!(
            "mmu: process {} released its frames, {} free",
            process.pid,
            self.free_frames.len()
        );
    }

    /// Removes the affinity-preferred frame for `page` and counts the tier
    /// against both `process` and the machine.
    pub fn select_replacement_frame(
        &mut self,
        process: &mut Process,
        page: usize,
    ) -> Option<(FreeFrame, Tier)> {
        let (free, tier) = self.free_frames.select(process.pid, page)?;

        process.stats.record_replacement(tier);
        self.stats.record_replacement(tier);

        Some((free, tier))
    }

    /// Touches `page` on behalf of `process`, faulting it in if needed.
    pub fn reference(&mut self, process: &mut Process, page: usize) -> Result<Access, VmError> {
        process.stats.record_access();
        self.stats.record_access();

        if process.page_table.get(page).is_valid() {
            trace!("mmu: page hit, process {} page {}", process.pid, page);
            process.page_table.mark_referenced(page);
            return Ok(Access::Hit);
        }

        process.stats.record_fault();
        self.stats.record_fault();

        self.handle_page_fault(process, page)
    }

    fn handle_page_fault(&mut self, process: &mut Process, page: usize) -> Result<Access, VmError> {
        if self.free_frames.len() > self.config.nff_min {
            // Above the threshold the pool is never empty.
            if !self.allocate_frame(process, page) {
                return Err(VmError::OutOfFrames { pid: process.pid });
            }

            debug!(
                "    Fault on page {}: Free frame {} found",
                page,
                process.page_table.frame_of(page).unwrap_or_default()
            );

            return Ok(Access::ColdMiss);
        }

        let victim = self
            .replacer
            .pick_replacement_page(&process.page_table, self.config.essential_pages)
            .ok_or(VmError::NoVictim {
                pid: process.pid,
                page,
            })?;

        let history = process.page_table.history(victim);
        let victim_frame = process.page_table.invalidate(victim).ok_or_else(|| {
            VmError::FrameOwnership(format!(
                "victim page {} of process {} has no frame",
                victim, process.pid
            ))
        })?;

        debug!(
            "    Fault on page {}: To replace Page {} at Frame {} [history = {}]",
            page, victim, victim_frame, history
        );

        // Under pressure the pool may be drained completely; the victim's
        // frame then goes back first so selection always has a candidate.
        let recycled = self.free_frames.is_empty();
        if recycled {
            self.free_frames.release(victim_frame, process.pid, victim);
        }

        let (free, tier) = self
            .select_replacement_frame(process, page)
            .ok_or_else(|| {
                VmError::FrameOwnership(format!(
                    "free pool empty after evicting page {} of process {}",
                    victim, process.pid
                ))
            })?;

        process.page_table.set(page, free.frame);

        if !recycled {
            self.free_frames.release(victim_frame, process.pid, victim);
        }

        Ok(Access::WarmMiss(tier))
    }
}
