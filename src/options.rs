//! Conversion options.

/// Page geometry used when a document carries no section properties at
/// all, or a section leaves its page size out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageDefaults {
    /// 8.5 x 11 in
    #[default]
    Letter,
    /// 210 x 297 mm
    A4,
}

impl PageDefaults {
    /// Page width and height in twips.
    pub fn size_twips(self) -> (f32, f32) {
        match self {
            PageDefaults::Letter => (12240.0, 15840.0),
            PageDefaults::A4 => (11906.0, 16838.0),
        }
    }
}

/// Options for converting a document into flow blocks.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Attach the byte span of the consumed XML node to each block
    pub include_positions: bool,

    /// Copy the raw attribute bag of each node onto its block
    pub emit_source_attrs: bool,

    /// Fallback page geometry
    pub default_page: PageDefaults,
}

impl ConvertOptions {
    /// Create new convert options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable source positions.
    pub fn with_positions(mut self, include: bool) -> Self {
        self.include_positions = include;
        self
    }

    /// Enable or disable source attribute bags.
    pub fn with_source_attrs(mut self, emit: bool) -> Self {
        self.emit_source_attrs = emit;
        self
    }

    /// Set the fallback page geometry.
    pub fn with_default_page(mut self, page: PageDefaults) -> Self {
        self.default_page = page;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            include_positions: false,
            emit_source_attrs: true,
            default_page: PageDefaults::Letter,
        }
    }
}
