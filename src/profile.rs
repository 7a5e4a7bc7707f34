use serde::{Deserialize, Serialize};

/// Fixed compression-quality table. "low" keeps the most detail, "high"
/// compresses hardest. The ghostscript preset and the ocrmypdf knobs for a
/// job always come from the same profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityProfile {
    Low,
    Medium,
    High,
}

impl QualityProfile {
    /// Case-sensitive lookup. Unknown names fall back to `Medium` instead of
    /// failing the job.
    pub fn from_name(name: &str) -> QualityProfile {
        match name {
            "low" => QualityProfile::Low,
            "medium" => QualityProfile::Medium,
            "high" => QualityProfile::High,
            _ => QualityProfile::Medium,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QualityProfile::Low => "low",
            QualityProfile::Medium => "medium",
            QualityProfile::High => "high",
        }
    }

    /// Target resolution for rasterized images.
    pub fn dpi(&self) -> u32 {
        match self {
            QualityProfile::Low => 300,
            QualityProfile::Medium => 150,
            QualityProfile::High => 96,
        }
    }

    /// JPEG quality factor passed to the OCR tool's optimizer.
    pub fn jpeg_quality(&self) -> u32 {
        match self {
            QualityProfile::Low => 85,
            QualityProfile::Medium => 65,
            QualityProfile::High => 45,
        }
    }

    /// Whether bitonal images may be re-encoded lossily (JBIG2).
    pub fn lossy_bitonal(&self) -> bool {
        matches!(self, QualityProfile::High)
    }

    /// ocrmypdf JBIG2 flag selected by the aggressiveness of the profile.
    pub fn jbig2_flag(&self) -> &'static str {
        if self.lossy_bitonal() {
            "--jbig2-lossy"
        } else {
            "--jbig2-lossless"
        }
    }

    /// Ghostscript `-dPDFSETTINGS` device preset.
    pub fn gs_preset(&self) -> &'static str {
        match self {
            QualityProfile::Low => "/printer",
            QualityProfile::Medium => "/ebook",
            QualityProfile::High => "/screen",
        }
    }
}
