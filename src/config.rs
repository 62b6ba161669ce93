use crate::tui::Theme;

/// Rows per page when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 6;

/// Share of the terminal width used by the output pane
pub const DEFAULT_VIEWPORT_WIDTH_RATIO: f64 = 0.6;

/// Share of the terminal height used by the output pane
pub const DEFAULT_VIEWPORT_HEIGHT_RATIO: f64 = 0.3;

const MIN_VIEWPORT_RATIO: f64 = 0.1;
const MAX_VIEWPORT_RATIO: f64 = 1.0;

/// Settings passed to the dashboard at construction
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    page_size: usize,
    viewport_width_ratio: f64,
    viewport_height_ratio: f64,
    pub theme: Theme,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            viewport_width_ratio: DEFAULT_VIEWPORT_WIDTH_RATIO,
            viewport_height_ratio: DEFAULT_VIEWPORT_HEIGHT_RATIO,
            theme: Theme::default(),
        }
    }
}

impl DashboardConfig {
    /// Set the number of rows per page (at least 1)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the output pane size relative to the terminal
    ///
    /// Ratios outside `0.1..=1.0` fall back to the defaults.
    pub fn with_viewport_ratios(mut self, width: f64, height: f64) -> Self {
        self.viewport_width_ratio = valid_ratio(width).unwrap_or(DEFAULT_VIEWPORT_WIDTH_RATIO);
        self.viewport_height_ratio = valid_ratio(height).unwrap_or(DEFAULT_VIEWPORT_HEIGHT_RATIO);
        self
    }

    /// Set theme
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Get rows per page
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Get output pane width and height ratios
    pub fn viewport_ratios(&self) -> (f64, f64) {
        (self.viewport_width_ratio, self.viewport_height_ratio)
    }

    /// Output pane size for a terminal of the given size
    pub fn viewport_size(&self, width: u16, height: u16) -> (u16, u16) {
        (
            (f64::from(width) * self.viewport_width_ratio) as u16,
            (f64::from(height) * self.viewport_height_ratio) as u16,
        )
    }
}

fn valid_ratio(ratio: f64) -> Option<f64> {
    (MIN_VIEWPORT_RATIO..=MAX_VIEWPORT_RATIO)
        .contains(&ratio)
        .then_some(ratio)
}
