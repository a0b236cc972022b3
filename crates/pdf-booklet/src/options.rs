use crate::constants::{MAX_COMPRESSION_LEVEL, MAX_IMAGE_QUALITY, MIN_IMAGE_QUALITY};
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Booklet conversion configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BookletOptions {
    // Layout
    pub page_size: PageSize,
    pub binding_margin_mm: f32,
    pub bleed_mm: f32,
    pub crop_marks: bool,

    // Signatures: None keeps the whole booklet in one signature
    pub signature_size: Option<usize>,

    // Optimization
    pub compression_level: u8,
    pub optimize_images: bool,
    pub image_quality: u8,
    pub linearize: bool,
}

impl Default for BookletOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            binding_margin_mm: 10.0,
            bleed_mm: 3.0,
            crop_marks: false,
            signature_size: None,
            compression_level: 2,
            optimize_images: true,
            image_quality: 80,
            linearize: true,
        }
    }
}

impl BookletOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| BookletError::InvalidArgument(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            BookletError::InvalidArgument(format!("Failed to serialize config: {}", e))
        })?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if !self.binding_margin_mm.is_finite() || self.binding_margin_mm < 0.0 {
            return Err(BookletError::InvalidArgument(format!(
                "Binding margin must be a non-negative number of millimeters, got {}",
                self.binding_margin_mm
            )));
        }

        if !self.bleed_mm.is_finite() || self.bleed_mm < 0.0 {
            return Err(BookletError::InvalidArgument(format!(
                "Bleed must be a non-negative number of millimeters, got {}",
                self.bleed_mm
            )));
        }

        if self.signature_size == Some(0) {
            return Err(BookletError::InvalidArgument(
                "Signature size must be positive".to_string(),
            ));
        }

        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(BookletError::InvalidArgument(format!(
                "Compression level must be between 0 and {}, got {}",
                MAX_COMPRESSION_LEVEL, self.compression_level
            )));
        }

        if !(MIN_IMAGE_QUALITY..=MAX_IMAGE_QUALITY).contains(&self.image_quality) {
            return Err(BookletError::InvalidArgument(format!(
                "Image quality must be between {} and {}, got {}",
                MIN_IMAGE_QUALITY, MAX_IMAGE_QUALITY, self.image_quality
            )));
        }

        Ok(())
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    impl Serialize for PageSize {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(self.name())
        }
    }

    // Unknown names map to A4.
    impl<'de> Deserialize<'de> for PageSize {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            Ok(PageSize::from_name(&s))
        }
    }
}
