/// Opaque 64-bit string identifier. Dense index into the dictionary's slot
/// table; `NULL` represents the absent/undefined string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(pub u64);

impl StringId {
    pub const NULL: StringId = StringId(u64::MAX);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    pub(crate) fn from_slot(slot: usize) -> StringId {
        StringId(slot as u64)
    }

    pub(crate) fn as_slot(self) -> Option<usize> {
        if self.is_null() {
            None
        } else {
            Some(self.0 as usize)
        }
    }
}

impl std::fmt::Display for StringId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "NULL")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
