//! Per-window non-client region bookkeeping used by the `WM_NCHITTEST`
//! subclass.

use titlebar_core::platform::RegionKind;
use titlebar_core::types::PhysicalRect;

/// Non-client classification of a point in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonClientHit {
    /// Input goes to the content (`HTCLIENT`).
    Client,
    /// Input drags the window (`HTCAPTION`).
    Caption,
}

/// Caption and passthrough rectangles of one window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowRegions {
    caption: Vec<PhysicalRect>,
    passthrough: Vec<PhysicalRect>,
}

impl WindowRegions {
    pub fn rects(&self, kind: RegionKind) -> &[PhysicalRect] {
        match kind {
            RegionKind::Caption => &self.caption,
            RegionKind::Passthrough => &self.passthrough,
        }
    }

    fn rects_mut(&mut self, kind: RegionKind) -> &mut Vec<PhysicalRect> {
        match kind {
            RegionKind::Caption => &mut self.caption,
            RegionKind::Passthrough => &mut self.passthrough,
        }
    }

    pub fn clear(&mut self, kind: RegionKind) {
        self.rects_mut(kind).clear();
    }

    pub fn replace(&mut self, kind: RegionKind, rects: &[PhysicalRect]) {
        let slot = self.rects_mut(kind);
        slot.clear();
        slot.extend(rects.iter().copied().filter(PhysicalRect::has_area));
    }

    /// Passthrough rectangles win over caption rectangles; points outside
    /// both are left to the default window procedure.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<NonClientHit> {
        if self.passthrough.iter().any(|rect| rect.contains(x, y)) {
            Some(NonClientHit::Client)
        } else if self.caption.iter().any(|rect| rect.contains(x, y)) {
            Some(NonClientHit::Caption)
        } else {
            None
        }
    }
}

/// Screen coordinates packed into a `WM_NCHITTEST` lparam. Both halves are
/// signed 16 bit; monitors left of or above the primary one report negative
/// values.
pub fn screen_coordinates(lparam: isize) -> (i32, i32) {
    let x = (lparam & 0xFFFF) as u16 as i16;
    let y = ((lparam >> 16) & 0xFFFF) as u16 as i16;
    (i32::from(x), i32::from(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn title_bar() -> WindowRegions {
        let mut regions = WindowRegions::default();
        regions.replace(RegionKind::Caption, &[PhysicalRect::new(0, 0, 800, 32)]);
        regions.replace(RegionKind::Passthrough, &[PhysicalRect::new(700, 0, 100, 32)]);
        regions
    }

    #[rstest]
    #[case(10, 10, Some(NonClientHit::Caption))]
    #[case(750, 10, Some(NonClientHit::Client))]
    #[case(10, 100, None)]
    fn passthrough_wins_over_caption(#[case] x: i32, #[case] y: i32, #[case] expected: Option<NonClientHit>) {
        assert_eq!(title_bar().hit_test(x, y), expected);
    }

    #[test]
    fn clear_only_touches_one_kind() {
        let mut regions = title_bar();
        regions.clear(RegionKind::Passthrough);
        assert!(regions.rects(RegionKind::Passthrough).is_empty());
        assert_eq!(regions.rects(RegionKind::Caption), &[PhysicalRect::new(0, 0, 800, 32)]);
        assert_eq!(regions.hit_test(750, 10), Some(NonClientHit::Caption));
    }

    #[rstest]
    #[case(10, 10, Some(NonClientHit::Caption))]
    #[case(750, 10, Some(NonClientHit::Client))]
    #[case(10, 40, None)]
    fn reconcile_sequence_keeps_caption_band(#[case] x: i32, #[case] y: i32, #[case] expected: Option<NonClientHit>) {
        let mut regions = WindowRegions::default();
        regions.replace(RegionKind::Caption, &[PhysicalRect::new(0, 0, 800, 32)]);
        // What every reconciliation does: clear passthrough, then apply the live set.
        regions.clear(RegionKind::Passthrough);
        regions.replace(RegionKind::Passthrough, &[PhysicalRect::new(700, 0, 100, 32)]);

        assert_eq!(regions.hit_test(x, y), expected);
    }

    #[rstest]
    #[case(0x0020_0010, (16, 32))]
    #[case(0x0000_FFFF, (-1, 0))]
    #[case(0xFF38_FE0C, (-500, -200))]
    #[case(0x7FFF_8000, (-32768, 32767))]
    fn screen_coordinates_are_signed(#[case] lparam: i64, #[case] expected: (i32, i32)) {
        assert_eq!(screen_coordinates(lparam as isize), expected);
    }

    #[test]
    fn high_bits_above_the_packed_word_are_ignored() {
        let lparam = ((0x1234_i64 << 32) | 0x0005_0003) as isize;
        assert_eq!(screen_coordinates(lparam), (3, 5));
    }

    #[test]
    fn replace_drops_empty_rects() {
        let mut regions = WindowRegions::default();
        regions.replace(RegionKind::Passthrough, &[PhysicalRect::new(0, 0, 0, 10), PhysicalRect::new(1, 1, 2, 2)]);
        assert_eq!(regions.rects(RegionKind::Passthrough), &[PhysicalRect::new(1, 1, 2, 2)]);
    }
}
