use crate::ContentBounds;

/// Negative content insets that hide the unused part of the virtual space.
///
/// A host scroll surface sized to the whole virtual space, with these insets applied, can only
/// scroll across the occupied range `[top, bottom)`. Growing content at either edge then only
/// changes the insets, never the host's scroll offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    /// `-top`: hides everything above the content.
    pub leading: i64,
    /// `-(virtual_extent - bottom)`: hides everything below the content.
    pub trailing: i64,
}

impl Insets {
    /// Length of the range the host can actually scroll across.
    pub fn scrollable_extent(&self, virtual_extent: u64) -> u64 {
        let hidden = self.leading.unsigned_abs() + self.trailing.unsigned_abs();
        virtual_extent.saturating_sub(hidden)
    }

    /// Converts a virtual position to an offset from the top of the visible content.
    pub fn to_host(&self, position: u64) -> i64 {
        position as i64 + self.leading
    }

    /// Converts an offset from the top of the visible content to a virtual position.
    pub fn from_host(&self, offset: i64) -> u64 {
        offset.saturating_sub(self.leading).max(0) as u64
    }
}

/// Maps occupied bounds to insets.
///
/// With no content, the scrollable range collapses onto `anchor`.
pub fn compute_insets(
    bounds: Option<ContentBounds>,
    virtual_extent: u64,
    anchor: u64,
) -> Insets {
    let bounds = bounds.unwrap_or(ContentBounds {
        top: anchor,
        bottom: anchor,
    });
    debug_assert!(
        bounds.top <= bounds.bottom && bounds.bottom <= virtual_extent,
        "content bounds {bounds:?} outside virtual space 0..{virtual_extent}"
    );
    Insets {
        leading: -(bounds.top as i64),
        trailing: -(virtual_extent.saturating_sub(bounds.bottom) as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insets_hide_space_outside_content() {
        let bounds = ContentBounds {
            top: 400,
            bottom: 700,
        };
        let insets = compute_insets(Some(bounds), 1000, 500);
        assert_eq!(insets.leading, -400);
        assert_eq!(insets.trailing, -300);
        assert_eq!(insets.scrollable_extent(1000), 300);
    }

    #[test]
    fn empty_content_collapses_onto_anchor() {
        let insets = compute_insets(None, 1000, 500);
        assert_eq!(insets.leading, -500);
        assert_eq!(insets.trailing, -500);
        assert_eq!(insets.scrollable_extent(1000), 0);
    }

    #[test]
    fn host_offsets_roundtrip_through_insets() {
        let bounds = ContentBounds {
            top: 400,
            bottom: 700,
        };
        let insets = compute_insets(Some(bounds), 1000, 500);
        assert_eq!(insets.to_host(400), 0);
        assert_eq!(insets.to_host(450), 50);
        assert_eq!(insets.from_host(50), 450);
        assert_eq!(insets.from_host(insets.to_host(612)), 612);
    }

    #[test]
    fn extreme_host_offsets_saturate() {
        let bounds = ContentBounds {
            top: 400,
            bottom: 700,
        };
        let insets = compute_insets(Some(bounds), 1000, 500);
        assert_eq!(insets.from_host(i64::MAX), i64::MAX as u64);
        assert_eq!(insets.from_host(i64::MIN), 0);
    }
}
