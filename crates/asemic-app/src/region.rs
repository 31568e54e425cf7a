//! View regions touched by an event.

use bitflags::bitflags;

bitflags! {
    /// Set of view regions that need re-rendering.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Regions: u8 {
        /// Connection indicator and status line.
        const STATUS = 1;
        /// Key list.
        const KEYS = 1 << 1;
        /// Message feed.
        const MESSAGES = 1 << 2;
        /// Traffic feed.
        const TRAFFIC = 1 << 3;
        /// Counters.
        const STATS = 1 << 4;
        /// Compose form and controls.
        const COMPOSE = 1 << 5;
        /// Blocking alert.
        const ALERT = 1 << 6;
    }
}

impl Regions {
    /// Nothing changed.
    pub const NONE: Self = Self::empty();
    /// Every region.
    pub const ALL: Self = Self::all();
}
