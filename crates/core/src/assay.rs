//! Assay context resolution.
//!
//! A batch names its assay with free text (`AssayName`). The text is resolved once into an
//! [`AssayContext`] and everything downstream dispatches on the enum.

/// Record field keys as callers submit them.
pub const FIELD_DATE: &str = "date";
pub const FIELD_SAMPLE: &str = "Sample";
pub const FIELD_SAMPLE_ALIAS: &str = "sample";
pub const FIELD_VZV: &str = "VZV";
pub const FIELD_HSV_1: &str = "HSV-1";
pub const FIELD_HSV_2: &str = "HSV-2";
pub const FIELD_HZV_1: &str = "HZV-1";
pub const FIELD_HZV_2: &str = "HZV-2";

/// Which family of assay-specific fields every record in a batch must carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssayContext {
    /// No recognised assay name. Records carry the legacy `HZV-1`/`HZV-2` pair.
    #[default]
    Generic,
    /// Varicella-zoster assays. Records carry `VZV`.
    Vzv,
    /// Herpes simplex assays. Records carry `HSV-1` and `HSV-2`.
    Hsv,
}

impl AssayContext {
    /// Resolve the context from an optional assay name.
    ///
    /// Matching is a case-sensitive, unanchored substring test, checked in order:
    /// a name containing `VZV` is [`AssayContext::Vzv`], otherwise one containing `HSV` is
    /// [`AssayContext::Hsv`]. Anything else, including an absent or empty name, is
    /// [`AssayContext::Generic`].
    pub fn from_assay_name(name: Option<&str>) -> Self {
        match name {
            Some(n) if n.contains("VZV") => Self::Vzv,
            Some(n) if n.contains("HSV") => Self::Hsv,
            _ => Self::Generic,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Vzv => "VZV",
            Self::Hsv => "HSV",
        }
    }
}

impl std::fmt::Display for AssayContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
