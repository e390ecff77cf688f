//! Fixed shelf layout shared by every cabinet.

/// Number of shelves in every cabinet.
pub const SHELF_COUNT: usize = 4;

pub const MIN_SHELF: i32 = 1;
pub const MAX_SHELF: i32 = SHELF_COUNT as i32;

/// Shelf numbers in display order.
pub const SHELVES: [i32; SHELF_COUNT] = [1, 2, 3, 4];

/// Map a shelf number to its zero-based slot, or `None` when out of range.
pub fn shelf_slot(shelf: i32) -> Option<usize> {
    if (MIN_SHELF..=MAX_SHELF).contains(&shelf) {
        Some((shelf - MIN_SHELF) as usize)
    } else {
        None
    }
}

/// Partition items into the four shelf slots, preserving input order within
/// each slot. Items whose shelf is out of range are skipped.
pub fn group_by_shelf<T, F>(
    items: impl IntoIterator<Item = T>,
    shelf_of: F,
) -> [Vec<T>; SHELF_COUNT]
where
    F: Fn(&T) -> i32,
{
    let mut slots: [Vec<T>; SHELF_COUNT] = Default::default();
    for item in items {
        if let Some(slot) = shelf_slot(shelf_of(&item)) {
            slots[slot].push(item);
        }
    }
    slots
}
