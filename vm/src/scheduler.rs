//! Round-robin driver.
//!
//! Each turn runs one complete binary search of one process. Faults are
//! resolved inside the search, so a process never gives up its turn early.

use std::collections::VecDeque;

use log::{debug, info, trace};

use crate::{
    config::Config,
    error::VmError,
    mmu::Mmu,
    page_replacer::{AgingPageReplacer, PageReplacer},
    process::{Pid, Process},
    stats::Stats,
};

/// Final counters of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub total: Stats,
    /// Indexed by pid.
    pub processes: Vec<Stats>,
}

pub struct Simulation<REPLACER: PageReplacer = AgingPageReplacer> {
    mmu: Mmu<REPLACER>,
    processes: Vec<Process>,
    ready: VecDeque<Pid>,
}

impl Simulation<AgingPageReplacer> {
    pub fn new(config: Config) -> Result<Self, VmError> {
        Simulation::with_replacer(config, AgingPageReplacer::new())
    }
}

impl<REPLACER> Simulation<REPLACER>
where
    REPLACER: PageReplacer,
{
    pub fn with_replacer(config: Config, replacer: REPLACER) -> Result<Self, VmError> {
        Ok(Simulation {
            mmu: Mmu::new(config, replacer)?,
            processes: Vec::new(),
            ready: VecDeque::new(),
        })
    }

    pub fn mmu(&self) -> &Mmu<REPLACER> {
        &self.mmu
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Creates the next process, loads its essential pages and queues it.
    pub fn spawn(&mut self, array_size: usize, keys: Vec<usize>) -> Result<Pid, VmError> {
        let pid = self.processes.len();
        let process = Process::new(pid, array_size, keys, &mut self.mmu)?;

        self.processes.push(process);
        self.ready.push_back(pid);

        Ok(pid)
    }

    /// Runs one turn. Returns `false` once every process has terminated.
    pub fn step(&mut self) -> Result<bool, VmError> {
        let Some(pid) = self.ready.pop_front() else {
            return Ok(false);
        };

        let process = &mut self.processes[pid];

        if !process.is_finished() {
            debug!(
                "+++ Process {}: Search {}",
                pid,
                process.current_search + 1
            );
            binary_search(&mut self.mmu, process)?;
        }

        if process.is_finished() {
            self.mmu.release(process);
            process.terminated = true;
            info!(
                "process {} terminated after {} searches",
                pid,
                process.keys().len()
            );
        } else {
            self.ready.push_back(pid);
        }

        Ok(!self.ready.is_empty())
    }

    pub fn run_to_completion(&mut self) -> Result<Report, VmError> {
        info!(
            "running {} processes over {} frames",
            self.processes.len(),
            self.mmu.free_frames().len()
        );

        while self.step()? {}

        Ok(self.report())
    }

    pub fn report(&self) -> Report {
        Report {
            total: *self.mmu.stats(),
            processes: self.processes.iter().map(|p| *p.stats()).collect(),
        }
    }

    /// Checks that every frame is either free or mapped by exactly one
    /// page table entry.
    pub fn verify_frame_ownership(&self) -> Result<(), VmError> {
        let frame_count = self.mmu.config().user_frames;
        let mut holders = vec![0usize; frame_count];

        let mapped = self
            .processes
            .iter()
            .flat_map(|p| p.page_table().resident().map(|(_, frame)| frame));
        let free = self.mmu.free_frames().iter().map(|f| f.frame);

        for frame in mapped.chain(free) {
            let slot = holders.get_mut(frame as usize).ok_or_else(|| {
                VmError::FrameOwnership(format!("frame {frame} is out of range"))
            })?;
            *slot += 1;
        }

        match holders.iter().position(|&count| count != 1) {
            Some(frame) => Err(VmError::FrameOwnership(format!(
                "frame {} has {} holders",
                frame, holders[frame]
            ))),
            None => Ok(()),
        }
    }
}

/// Searches `A[0..s]` (with `A[i] = i`) for the current key of `process`,
/// touching the page of every element it compares, then ages the page table.
fn binary_search<REPLACER: PageReplacer>(
    mmu: &mut Mmu<REPLACER>,
    process: &mut Process,
) -> Result<(), VmError> {
    let key = process.keys()[process.current_search];
    let array_size = process.array_size();

    if array_size > 0 {
        let mut left = 0;
        let mut right = array_size - 1;

        while left < right {
            let mid = (left + right) / 2;
            let page = mmu.config().page_of_index(mid);

            mmu.reference(process, page)?;

            if key <= mid {
                right = mid;
            } else {
                left = mid + 1;
            }
        }
    }

    trace!("aging page table of process {}", process.pid);
    process.page_table.age();
    process.current_search += 1;

    Ok(())
}
