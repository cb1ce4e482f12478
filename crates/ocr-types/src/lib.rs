//! # ocr-types
//!
//! Shared domain types used across the OCR feed workspace.

pub mod report;
pub mod transmission;

pub use report::ReportContext;
pub use transmission::{Transmission, TransmissionDetails};

/// Length in bytes of a configuration digest.
pub const CONFIG_DIGEST_LEN: usize = 16;

/// Opaque identifier of the active signer set and threshold.
pub type ConfigDigest = [u8; CONFIG_DIGEST_LEN];

/// A fixed-point signed observation. The decimal scale is defined by the feed.
pub type Observation = i128;

/// Maximum number of oracles in a configuration. Observer indices must fit
/// the 32-byte observer vector of a report, with one byte to spare.
pub const MAX_ORACLES: usize = 31;

/// Default number of implicit decimals in an observation.
pub const DEFAULT_DECIMALS: u8 = 8;

/// Fixed-point scale factor for `decimals` implicit decimal places.
///
/// Returns `None` if the scale does not fit an [`Observation`].
pub fn scale(decimals: u8) -> Option<Observation> {
    10i128.checked_pow(u32::from(decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scale() {
        assert_eq!(scale(DEFAULT_DECIMALS), Some(100_000_000));
        assert_eq!(scale(0), Some(1));
    }

    #[test]
    fn test_scale_overflow() {
        assert!(scale(38).is_some());
        assert!(scale(39).is_none());
    }
}
