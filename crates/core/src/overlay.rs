//! Single-owner floating overlay (tool chips, inline help tooltips).
//!
//! Exactly one overlay is open per manager. Opening a second owner replaces
//! the first, so mutual exclusion holds by construction.

use std::time::Duration;

use crate::model::OverlayId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
}

/// Top-left corner of the panel in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPosition {
    pub x: f64,
    pub y: f64,
    pub placement: Placement,
}

/// Gap between trigger and panel, in pixels.
pub const DEFAULT_GAP: f64 = 8.0;
/// Minimum distance kept from every viewport edge, in pixels.
pub const DEFAULT_MARGIN: f64 = 8.0;

/// Place `panel` above `anchor`, flipping below when it would cross the top
/// edge, then clamp into the viewport.
#[must_use]
pub fn place_panel(
    anchor: Rect,
    panel: Size,
    viewport: Size,
    gap: f64,
    margin: f64,
) -> OverlayPosition {
    let max_x = (viewport.width - panel.width - margin).max(margin);
    let x = (anchor.center_x() - panel.width / 2.0).clamp(margin, max_x);

    let above = anchor.y - gap - panel.height;
    let (y, placement) = if above >= margin {
        (above, Placement::Above)
    } else {
        (anchor.bottom() + gap, Placement::Below)
    };
    let max_y = (viewport.height - panel.height - margin).max(margin);

    OverlayPosition {
        x,
        y: y.clamp(margin, max_y),
        placement,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayState {
    Closed,
    Open {
        owner: OverlayId,
        position: OverlayPosition,
    },
}

#[derive(Debug, Clone)]
pub struct OverlayManager {
    state: OverlayState,
    close_at: Option<Duration>,
    grace: Duration,
    gap: f64,
    margin: f64,
}

impl OverlayManager {
    #[must_use]
    pub fn new(grace: Duration) -> Self {
        Self {
            state: OverlayState::Closed,
            close_at: None,
            grace,
            gap: DEFAULT_GAP,
            margin: DEFAULT_MARGIN,
        }
    }

    /// Open the overlay for `owner`, measured against the trigger's current
    /// bounding box. Any other open overlay is closed.
    pub fn open(&mut self, owner: OverlayId, anchor: Rect, panel: Size, viewport: Size) {
        let position = place_panel(anchor, panel, viewport, self.gap, self.margin);
        self.state = OverlayState::Open { owner, position };
        self.close_at = None;
    }

    /// Click on a trigger: open it, or close it if it is the open one.
    pub fn toggle(&mut self, owner: OverlayId, anchor: Rect, panel: Size, viewport: Size) {
        if self.is_open_for(owner) {
            self.close();
        } else {
            self.open(owner, anchor, panel, viewport);
        }
    }

    pub fn close(&mut self) {
        self.state = OverlayState::Closed;
        self.close_at = None;
    }

    /// A click landed somewhere. `inside` is the owner whose trigger or panel
    /// contains the click, if any. Returns `true` if the overlay closed.
    pub fn click(&mut self, inside: Option<OverlayId>) -> bool {
        match self.state {
            OverlayState::Open { owner, .. } if inside != Some(owner) => {
                self.close();
                true
            }
            _ => false,
        }
    }

    /// Escape pressed. Returns `true` if the overlay closed.
    pub fn escape(&mut self) -> bool {
        if self.is_open() {
            self.close();
            return true;
        }
        false
    }

    /// Pointer left the trigger or panel: close after the grace delay.
    pub fn pointer_leave(&mut self, now: Duration) {
        if self.is_open() {
            self.close_at = Some(now + self.grace);
        }
    }

    /// Pointer re-entered the trigger or panel: keep it open.
    pub fn pointer_enter(&mut self) {
        self.close_at = None;
    }

    /// Close a hover overlay whose grace delay has elapsed.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.close_at {
            Some(deadline) if now >= deadline => {
                self.close();
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn close_deadline(&self) -> Option<Duration> {
        self.close_at
    }

    #[must_use]
    pub fn state(&self) -> OverlayState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, OverlayState::Open { .. })
    }

    #[must_use]
    pub fn is_open_for(&self, owner: OverlayId) -> bool {
        matches!(self.state, OverlayState::Open { owner: open, .. } if open == owner)
    }

    #[must_use]
    pub fn position(&self) -> Option<OverlayPosition> {
        match self.state {
            OverlayState::Open { position, .. } => Some(position),
            OverlayState::Closed => None,
        }
    }
}
