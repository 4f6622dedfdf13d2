use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Which otherwise-hidden items a load keeps.
    ///
    /// The empty set keeps only items that are both enabled and valid.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Loadable: u8 {
        /// Keep disabled menus and actions.
        const DISABLED = 1 << 0;
        /// Keep invalid menus, actions and profiles.
        const INVALID = 1 << 1;

        const ALL = Self::DISABLED.bits() | Self::INVALID.bits();
    }
}

impl Default for Loadable {
    fn default() -> Self {
        Self::empty()
    }
}

impl Loadable {
    #[must_use]
    pub const fn new(include_disabled: bool, include_invalid: bool) -> Self {
        let mut bits = 0;
        if include_disabled {
            bits |= Self::DISABLED.bits();
        }
        if include_invalid {
            bits |= Self::INVALID.bits();
        }
        Self::from_bits_retain(bits)
    }

    #[must_use]
    pub const fn includes_disabled(self) -> bool {
        self.contains(Self::DISABLED)
    }

    #[must_use]
    pub const fn includes_invalid(self) -> bool {
        self.contains(Self::INVALID)
    }
}

impl Serialize for Loadable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for Loadable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}
