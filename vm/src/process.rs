use crate::{
    config::Config,
    error::VmError,
    mmu::Mmu,
    page_replacer::PageReplacer,
    page_table::PageTable,
    stats::Stats,
};

pub type Pid = usize;

/// A simulated process that binary-searches an implicit sorted array
/// `A[i] = i` of `array_size` integers, one key per turn.
pub struct Process {
    pub(crate) pid: Pid,
    pub(crate) array_size: usize,
    pub(crate) keys: Vec<usize>,
    pub(crate) current_search: usize,
    pub(crate) page_table: PageTable,
    pub(crate) stats: Stats,
    pub(crate) terminated: bool,
}

impl Process {
    /// Creates the process and loads its essential pages from the free pool.
    pub fn new<R: PageReplacer>(
        pid: Pid,
        array_size: usize,
        keys: Vec<usize>,
        mmu: &mut Mmu<R>,
    ) -> Result<Self, VmError> {
        check_address_space(pid, array_size, mmu.config())?;

        let mut process = Process {
            pid,
            array_size,
            keys,
            current_search: 0,
            page_table: PageTable::new(mmu.config().page_table_entries),
            stats: Stats::default(),
            terminated: false,
        };

        mmu.allocate_essential(&mut process)?;

        Ok(process)
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn array_size(&self) -> usize {
        self.array_size
    }

    pub fn keys(&self) -> &[usize] {
        &self.keys
    }

    /// Index of the next search to run.
    pub fn current_search(&self) -> usize {
        self.current_search
    }

    /// Every search has been run.
    pub fn is_finished(&self) -> bool {
        self.current_search >= self.keys.len()
    }

    /// Finished and with all frames handed back.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

fn check_address_space(pid: Pid, array_size: usize, config: &Config) -> Result<(), VmError> {
    if array_size == 0 {
        return Ok(());
    }

    if config.page_of_index(array_size - 1) >= config.page_table_entries {
        return Err(VmError::AddressSpaceOverflow {
            pid,
            array_size,
            pages: config.page_table_entries,
        });
    }

    Ok(())
}
