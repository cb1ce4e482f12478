//! Report context.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::ConfigDigest;

/// Identifies which configuration a report targets and how fresh it is.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportContext {
    #[serde_as(as = "serde_with::hex::Hex")]
    pub config_digest: ConfigDigest,
    pub epoch: u32,
    pub round: u8,
}

impl ReportContext {
    pub fn new(config_digest: ConfigDigest, epoch: u32, round: u8) -> Self {
        Self {
            config_digest,
            epoch,
            round,
        }
    }

    /// The `(epoch, round)` sequence pair.
    pub fn sequence(&self) -> (u32, u8) {
        (self.epoch, self.round)
    }

    /// Whether this context is strictly newer than `(epoch, round)`.
    ///
    /// Ordering is lexicographic: epoch first, then round.
    pub fn is_after(&self, epoch: u32, round: u8) -> bool {
        self.sequence() > (epoch, round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_after_lexicographic() {
        let ctx = ReportContext::new([1u8; 16], 2, 0);
        assert!(ctx.is_after(1, 255));
        assert!(ctx.is_after(0, 0));
        assert!(!ctx.is_after(2, 0));
        assert!(!ctx.is_after(2, 1));
        assert!(!ctx.is_after(3, 0));
    }

    #[test]
    fn test_max_sentinel_is_after_everything_else() {
        let ctx = ReportContext::new([1u8; 16], u32::MAX, u8::MAX);
        assert!(ctx.is_after(u32::MAX, u8::MAX - 1));
        assert!(!ctx.is_after(u32::MAX, u8::MAX));
    }

    #[test]
    fn test_json_uses_hex_digest() {
        let ctx = ReportContext::new([0xab; 16], 7, 3);
        let json = serde_json::to_string(&ctx).expect("serialize");
        assert!(json.contains(&"ab".repeat(16)));
        let parsed: ReportContext = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, ctx);
    }
}
