use arbitrary_int::u14;
use bitbybit::bitfield;

pub type FrameNumber = u16;

pub const VALID_BIT: u16 = 0x8000;
pub const REF_BIT: u16 = 0x4000;
pub const FRAME_MASK: u16 = 0x3FFF;

/// Frame numbers live in the low 14 bits of an entry.
pub const MAX_FRAMES: usize = FRAME_MASK as usize + 1;

/// History value of a page that was just brought in.
pub const HISTORY_MRU: u16 = 0xFFFF;

/// A 16-bit page table entry: bit 15 valid, bit 14 referenced, bits 0-13
/// frame number.
#[bitfield(u16, default = 0)]
pub struct PageTableEntry {
    #[bit(15, rw)]
    valid: bool,
    #[bit(14, rw)]
    referenced: bool,
    #[bits(0..=13, rw)]
    frame_number: u14,
}

impl PageTableEntry {
    pub fn make(frame: FrameNumber, referenced: bool) -> Self {
        PageTableEntry::DEFAULT
            .with_valid(true)
            .with_referenced(referenced)
            .with_frame_number(u14::new(frame & FRAME_MASK))
    }

    pub fn is_valid(&self) -> bool {
        self.valid()
    }

    pub fn is_referenced(&self) -> bool {
        self.referenced()
    }

    /// The backing frame, only meaningful for a valid entry.
    pub fn frame(&self) -> Option<FrameNumber> {
        self.valid().then(|| self.frame_number().value())
    }

    pub fn mark_referenced(&mut self) {
        *self = self.with_referenced(true);
    }

    pub fn clear_referenced(&mut self) {
        *self = self.with_referenced(false);
    }

    pub fn invalidate(&mut self) {
        *self = PageTableEntry::DEFAULT;
    }
}

/// Per-process page table with an aging register beside every entry.
pub struct PageTable {
    table: Vec<PageTableEntry>,
    history: Vec<u16>,
}

impl PageTable {
    pub fn new(size: usize) -> Self {
        PageTable {
            table: vec![PageTableEntry::DEFAULT; size],
            history: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn get(&self, page_number: usize) -> PageTableEntry {
        self.table[page_number]
    }

    pub fn history(&self, page_number: usize) -> u16 {
        self.history[page_number]
    }

    pub fn frame_of(&self, page_number: usize) -> Option<FrameNumber> {
        self.table[page_number].frame()
    }

    /// Maps `page_number` to `frame` as a freshly referenced page.
    pub fn set(&mut self, page_number: usize, frame: FrameNumber) {
        self.table[page_number] = PageTableEntry::make(frame, true);
        self.history[page_number] = HISTORY_MRU;
    }

    pub fn mark_referenced(&mut self, page_number: usize) {
        self.table[page_number].mark_referenced();
    }

    /// Unmaps `page_number`, handing back the frame it held.
    pub fn invalidate(&mut self, page_number: usize) -> Option<FrameNumber> {
        let frame = self.table[page_number].frame();
        self.table[page_number].invalidate();
        frame
    }

    /// One clock tick: shift every resident page's history right, feed the
    /// referenced bit into the top, then clear the referenced bit.
    pub fn age(&mut self) {
        for (entry, history) in self.table.iter_mut().zip(self.history.iter_mut()) {
            if !entry.is_valid() {
                continue;
            }

            let carry = if entry.is_referenced() { 0x8000 } else { 0 };
            *history = (*history >> 1) | carry;
            entry.clear_referenced();
        }
    }

    /// `(page, frame)` for every valid entry, in page order.
    pub fn resident(&self) -> impl Iterator<Item = (usize, FrameNumber)> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter_map(|(page, entry)| entry.frame().map(|frame| (page, frame)))
    }
}
