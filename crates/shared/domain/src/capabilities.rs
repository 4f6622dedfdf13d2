use bitflags::bitflags;

bitflags! {
    /// Operations a storage backend actually implements.
    ///
    /// Declared by the backend itself so that "not implemented" is a queryable fact
    /// rather than a missing function.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const DELETE = 1 << 2;
        const WILLING = 1 << 3;
        const ABLE = 1 << 4;
        const DUPLICATE = 1 << 5;

        /// Everything a backend must provide to be considered for writing.
        const WRITE_API = Self::WRITE.bits()
            | Self::DELETE.bits()
            | Self::WILLING.bits()
            | Self::ABLE.bits();
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::empty()
    }
}

impl Capabilities {
    /// `true` when any of the write-side operations is missing.
    #[must_use]
    pub const fn is_write_api_incomplete(self) -> bool {
        !self.contains(Self::WRITE_API)
    }
}
