//! Identifiers of the matcher.
//!
//! | Id        | Width | Indexes                                             |
//! |-----------|-------|-----------------------------------------------------|
//! | `NodeId`  | `u32` | tower nodes, then query-graph virtual nodes         |
//! | `EdgeId`  | `u32` | directed edges in CSR order, two per link           |
//! | `LinkId`  | `u64` | nothing: caller-chosen, reported in match results   |
//! | `LabelId` | `u32` | the label arena of one reachability search          |
//!
//! `u32::MAX` / `u64::MAX` is the `INVALID` sentinel.  `EdgeId::INVALID` marks
//! the root label of a search, which has no incoming edge.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a routing-graph node (tower node or query-graph virtual node).
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed routing-graph edge.
    pub struct EdgeId(u32);
}

typed_id! {
    /// External identifier of a road link.  Every link yields two directed
    /// edges, one per travel direction.
    pub struct LinkId(u64);
}

typed_id! {
    /// Index of an `IsoLabel` in a reachability search arena.
    pub struct LabelId(u32);
}
