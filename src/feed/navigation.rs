//! Circular browsing index over the candidate list.
//!
//! Pure index arithmetic; no rendering positions are computed here.

/// Advance with wrap-around. No-op on an empty list.
pub fn next(index: usize, len: usize) -> usize {
    if len == 0 {
        return index;
    }
    (index + 1) % len
}

/// Retreat with wrap-around. No-op on an empty list.
pub fn previous(index: usize, len: usize) -> usize {
    if len == 0 {
        return index;
    }
    if index == 0 || index >= len {
        len - 1
    } else {
        index - 1
    }
}

/// Bring `index` back into `[0, len)` after the list shrank.
///
/// An empty list yields 0.
pub fn clamp(index: usize, len: usize) -> usize {
    if index >= len {
        len.saturating_sub(1)
    } else {
        index
    }
}

/// Offset of card `i` relative to the current card, folded into
/// `(-len/2, len/2]` so neighbours sit symmetrically on both sides.
pub fn visual_offset(i: usize, current: usize, len: usize) -> isize {
    if len == 0 {
        return 0;
    }
    let len_i = len as isize;
    let diff = (i as isize - current as isize).rem_euclid(len_i);
    if diff * 2 > len_i {
        diff - len_i
    } else {
        diff
    }
}
