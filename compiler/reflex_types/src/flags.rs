//! Descriptor and map flag sets.
//!
//! Both are computed once when a descriptor is built and never change.

use bitflags::bitflags;

bitflags! {
    /// Per-descriptor properties.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u8 {
        /// Carries an uncommon record (name, package path or methods).
        const UNCOMMON = 1 << 0;
        /// Declared with a name rather than built structurally.
        const NAMED = 1 << 1;
        /// Equality and hashing may treat the value as raw bytes.
        const REGULAR_MEMORY = 1 << 2;
        /// A value of this type fits in an interface data word directly.
        const DIRECT_IFACE = 1 << 3;
    }
}

bitflags! {
    /// Behavioural flags of a map descriptor, derived from its key and
    /// element types.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MapFlags: u8 {
        /// Bucket key slots hold pointers to keys.
        const INDIRECT_KEY = 1 << 0;
        /// Bucket value slots hold pointers to values.
        const INDIRECT_ELEM = 1 << 1;
        /// `k == k` holds for every key.
        const REFLEXIVE_KEY = 1 << 2;
        /// Overwriting an equal key must copy the new key bytes.
        const NEED_KEY_UPDATE = 1 << 3;
        /// Hashing a key can fail.
        const HASH_MIGHT_PANIC = 1 << 4;
    }
}

impl TypeFlags {
    #[inline]
    pub fn is_named(self) -> bool {
        self.contains(TypeFlags::NAMED)
    }

    #[inline]
    pub fn is_direct_iface(self) -> bool {
        self.contains(TypeFlags::DIRECT_IFACE)
    }

    #[inline]
    pub fn is_regular_memory(self) -> bool {
        self.contains(TypeFlags::REGULAR_MEMORY)
    }
}

const _: () = assert!(std::mem::size_of::<TypeFlags>() == 1);
const _: () = assert!(std::mem::size_of::<MapFlags>() == 1);
