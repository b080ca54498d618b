use thiserror::Error;

use crate::process::Pid;

/// Unrecoverable conditions of a simulation run.
///
/// None of these are retried: each one means the machine was configured with
/// too little memory or the frame accounting is broken.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum VmError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The free pool ran dry while loading the essential pages of `pid`.
    #[error("not enough free frames for essential pages of process {pid}")]
    OutOfFrames { pid: Pid },

    /// A replacement was required but `pid` holds no evictable page.
    #[error("could not find a victim page in process {pid} while faulting page {page}")]
    NoVictim { pid: Pid, page: usize },

    /// The array of `pid` spans more virtual pages than its page table has.
    #[error("process {pid}: an array of {array_size} integers does not fit in {pages} pages")]
    AddressSpaceOverflow {
        pid: Pid,
        array_size: usize,
        pages: usize,
    },

    #[error("frame ownership violated: {0}")]
    FrameOwnership(String),
}
