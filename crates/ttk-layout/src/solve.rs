#![forbid(unsafe_code)]

//! One-dimensional space distribution shared by every arranging layout.

/// Bounds of one slot along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub min: u16,
    pub max: u16,
}

impl Span {
    /// Anything from zero to unbounded.
    pub const FLEX: Span = Span {
        min: 0,
        max: u16::MAX,
    };

    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    pub const fn fixed(size: u16) -> Self {
        Self::new(size, size)
    }

    #[inline]
    fn clamp(self, level: u32) -> u32 {
        let min = u32::from(self.min);
        level.clamp(min, u32::from(self.max).max(min))
    }
}

fn total(spans: &[Span], level: u32) -> u32 {
    spans.iter().map(|s| s.clamp(level)).sum()
}

/// Split `space` between `spans`.
///
/// Every slot is filled up to a common level, clamped to its own bounds, so
/// slots pinned at a fixed size take exactly that and the rest share what
/// remains evenly. Cells left over by integer rounding go one each to the
/// first slots that can still grow.
///
/// When the minimums do not fit, every slot gets its minimum and the result
/// overflows `space`; when the maximums do not fill it, every slot gets its
/// maximum and the tail stays empty.
///
/// Growing `space` never shrinks any slot.
///
/// ```
/// use ttk_layout::solve::{Span, distribute};
///
/// let sizes = distribute(&[Span::fixed(15), Span::FLEX], 20);
/// assert_eq!(sizes, vec![15, 5]);
/// assert_eq!(distribute(&[Span::FLEX, Span::FLEX, Span::FLEX], 10), vec![4, 3, 3]);
/// ```
pub fn distribute(spans: &[Span], space: u16) -> Vec<u16> {
    let space = u32::from(space);
    let ceiling = spans
        .iter()
        .map(|s| u32::from(s.max.max(s.min)))
        .max()
        .unwrap_or(0);

    // largest level whose total still fits
    let (mut lo, mut hi) = (0u32, ceiling);
    if total(spans, 0) > space {
        hi = 0;
    }
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if total(spans, mid) <= space {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    let level = lo;

    let mut leftover = space.saturating_sub(total(spans, level));
    spans
        .iter()
        .map(|span| {
            let mut size = span.clamp(level);
            if leftover > 0 && span.clamp(level + 1) > size {
                size += 1;
                leftover -= 1;
            }
            u16::try_from(size).unwrap_or(u16::MAX)
        })
        .collect()
}

/// Offsets of consecutive sizes starting at `origin`.
pub fn offsets(origin: u16, sizes: &[u16]) -> Vec<u16> {
    let mut pos = origin;
    sizes
        .iter()
        .map(|&size| {
            let at = pos;
            pos = pos.saturating_add(size);
            at
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn even_split_hands_remainder_to_the_front() {
        assert_eq!(distribute(&[Span::FLEX; 3], 11), vec![4, 4, 3]);
        assert_eq!(distribute(&[Span::FLEX; 2], 20), vec![10, 10]);
    }

    #[test]
    fn fixed_slots_come_first() {
        assert_eq!(
            distribute(&[Span::FLEX, Span::fixed(4), Span::FLEX], 10),
            vec![3, 4, 3]
        );
    }

    #[test]
    fn minimums_overflow() {
        assert_eq!(
            distribute(&[Span::new(5, 9), Span::new(7, 9)], 6),
            vec![5, 7]
        );
    }

    #[test]
    fn maximums_leave_a_gap() {
        assert_eq!(distribute(&[Span::new(0, 2), Span::new(1, 3)], 40), vec![2, 3]);
    }

    #[test]
    fn empty_input() {
        assert!(distribute(&[], 10).is_empty());
    }

    #[test]
    fn offsets_accumulate() {
        assert_eq!(offsets(2, &[3, 0, 4]), vec![2, 5, 5]);
    }

    fn span() -> impl Strategy<Value = Span> {
        (0u16..20, 0u16..40).prop_map(|(min, extra)| Span::new(min, min.saturating_add(extra)))
    }

    proptest! {
        #[test]
        fn fills_exactly_when_bounds_allow(spans in prop::collection::vec(span(), 1..8), space in 0u16..200) {
            let sizes = distribute(&spans, space);
            let sum: u32 = sizes.iter().map(|&s| u32::from(s)).sum();
            let min: u32 = spans.iter().map(|s| u32::from(s.min)).sum();
            let max: u32 = spans.iter().map(|s| u32::from(s.max)).sum();
            prop_assert_eq!(sum, u32::from(space).clamp(min, max));
            for (size, span) in sizes.iter().zip(&spans) {
                prop_assert!(*size >= span.min && *size <= span.max);
            }
        }

        #[test]
        fn monotone_in_space(spans in prop::collection::vec(span(), 1..8), space in 0u16..200, grow in 0u16..50) {
            let small = distribute(&spans, space);
            let large = distribute(&spans, space + grow);
            for (a, b) in small.iter().zip(&large) {
                prop_assert!(a <= b);
            }
        }
    }
}
