//! Extraction options and configuration.

use crate::outline::DetectorConfig;

/// Options for an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Where headings come from
    pub heading_strategy: HeadingStrategy,

    /// Font-heuristic detector settings
    pub detector: DetectorConfig,

    /// Whether to use parallel processing for the read-only phases
    pub parallel: bool,

    /// Drop annotations with neither a comment nor covered text
    pub skip_empty: bool,

    /// Keep links, widgets and other non-markup annotations (as `Other`)
    pub include_non_markup: bool,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip unreadable pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the heading strategy.
    pub fn with_heading_strategy(mut self, strategy: HeadingStrategy) -> Self {
        self.heading_strategy = strategy;
        self
    }

    /// Replace the detector configuration.
    pub fn with_detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Set the deepest level the font heuristic assigns.
    pub fn with_max_level(mut self, level: u8) -> Self {
        self.detector.max_level = level.max(1);
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Drop annotations that carry no text at all.
    pub fn skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Keep non-markup annotations.
    pub fn include_non_markup(mut self, include: bool) -> Self {
        self.include_non_markup = include;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            heading_strategy: HeadingStrategy::Auto,
            detector: DetectorConfig::default(),
            parallel: true,
            skip_empty: false,
            include_non_markup: false,
        }
    }
}

/// Error handling mode for per-page failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip unreadable pages and continue
    Lenient,
}

/// How the heading list is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStrategy {
    /// Embedded outline when it yields headings, font heuristic otherwise
    #[default]
    Auto,
    /// Embedded outline only
    Outline,
    /// Font heuristic only
    Fonts,
}
