//! Record reference type.

use std::fmt;

/// Location of a row inside a table file: the page holding it and the slot
/// within that page.
///
/// Indexes treat their values as opaque, so any `Clone` type works as a
/// record reference. `RecordId` is the one the storage engine hands out when
/// it places a row, and the one it resolves back to a page read on lookup.
/// Ordering is by page, then slot, so a sorted run of ids reads pages in file
/// order.
///
/// # Example
/// ```
/// use sawitdb::RecordId;
///
/// let rid = RecordId::new(3, 17);
/// assert_eq!(rid.page_id, 3);
/// assert_eq!(rid.slot, 17);
/// assert_eq!(rid.to_string(), "3:17");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    pub page_id: u32,
    pub slot: u16,
}

impl RecordId {
    #[inline]
    pub fn new(page_id: u32, slot: u16) -> Self {
        Self { page_id, slot }
    }
}

impl From<(u32, u16)> for RecordId {
    fn from((page_id, slot): (u32, u16)) -> Self {
        Self::new(page_id, slot)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page_id, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_page_then_slot() {
        let mut rids = vec![
            RecordId::new(2, 0),
            RecordId::new(1, 9),
            RecordId::new(1, 2),
        ];
        rids.sort();
        assert_eq!(
            rids,
            vec![RecordId::new(1, 2), RecordId::new(1, 9), RecordId::new(2, 0)]
        );
    }

    #[test]
    fn test_from_location_tuple() {
        assert_eq!(RecordId::from((7, 1)), RecordId::new(7, 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RecordId::new(7, 0)), "7:0");
    }
}
