//! Navigation menu and dropdown state rules.

#[cfg(test)]
#[path = "menu_test.rs"]
mod menu_test;

/// Viewport width from `innerWidth`, falling back to the root element's
/// layout width when `innerWidth` is missing or not a finite number.
#[must_use]
pub fn resolve_viewport_width(inner_width: Option<f64>, root_width: f64) -> f64 {
    inner_width.filter(|width| width.is_finite()).unwrap_or(root_width)
}

/// Open/closed state of a collapsible panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    #[must_use]
    pub fn from_open(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }

    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }

    /// Value mirrored into `aria-expanded`.
    #[must_use]
    pub fn aria_expanded(self) -> &'static str {
        if self.is_open() { "true" } else { "false" }
    }
}

/// Layout mode derived from the viewport width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    Mobile,
    Desktop,
}

impl Layout {
    /// Widths at or below `breakpoint_px` are mobile.
    #[must_use]
    pub fn for_width(width: f64, breakpoint_px: f64) -> Self {
        if width <= breakpoint_px { Self::Mobile } else { Self::Desktop }
    }
}

/// Inline display value shown by an explicitly opened dropdown.
pub const DROPDOWN_SHOWN: &str = "block";
/// Inline display value of an explicitly closed dropdown.
pub const DROPDOWN_HIDDEN: &str = "none";

/// Next inline display for a mobile dropdown panel. Anything other than an
/// explicit `block` counts as hidden, including no override at all.
#[must_use]
pub fn next_dropdown_display(current: Option<&str>) -> &'static str {
    match current {
        Some(DROPDOWN_SHOWN) => DROPDOWN_HIDDEN,
        _ => DROPDOWN_SHOWN,
    }
}
