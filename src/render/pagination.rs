//! Visible window over a list of rows.

/// Rows to draw, in display order, and the display row of the active item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub rows: Vec<usize>,
    pub active_row: usize,
}

impl PageWindow {
    /// Whether some rows are hidden by the window.
    pub fn is_partial(&self, len: usize) -> bool {
        self.rows.len() < len
    }
}

/// Compute which of `len` rows are visible for a page of `page_size` rows.
///
/// - The whole list fits: every row, in order.
/// - `looping` is false: a contiguous window centered on `active`, clamped to the list bounds.
/// - `looping` is true: a window centered on `active` whose indices wrap modulo `len`.
pub fn paginate(len: usize, active: usize, page_size: usize, looping: bool) -> PageWindow {
    let page_size = page_size.max(1);
    if len == 0 {
        return PageWindow {
            rows: Vec::new(),
            active_row: 0,
        };
    }
    let active = active.min(len - 1);

    if len <= page_size {
        return PageWindow {
            rows: (0..len).collect(),
            active_row: active,
        };
    }

    let half = page_size / 2;
    if looping {
        let start = (active + len - half) % len;
        PageWindow {
            rows: (0..page_size).map(|offset| (start + offset) % len).collect(),
            active_row: half,
        }
    } else {
        let start = active.saturating_sub(half).min(len - page_size);
        PageWindow {
            rows: (start..start + page_size).collect(),
            active_row: active - start,
        }
    }
}
