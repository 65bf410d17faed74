//! Per-tick log record.

/// Capture times of the newest samples a tick consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TickRecord {
    pub scan_ns: u64,
    pub motion_ns: u64,
    pub frame_ns: u64,
}

impl TickRecord {
    /// Encoded size in bytes.
    pub const SIZE: usize = 24;

    /// Three little-endian `u64`s: scan, motion, frame.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..8].copy_from_slice(&self.scan_ns.to_le_bytes());
        out[8..16].copy_from_slice(&self.motion_ns.to_le_bytes());
        out[16..].copy_from_slice(&self.frame_ns.to_le_bytes());
        out
    }

    /// Decode a payload written by [`TickRecord::encode`].
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::SIZE {
            return None;
        }
        let word = |i: usize| -> Option<u64> {
            Some(u64::from_le_bytes(bytes[i * 8..(i + 1) * 8].try_into().ok()?))
        };
        Some(Self {
            scan_ns: word(0)?,
            motion_ns: word(1)?,
            frame_ns: word(2)?,
        })
    }
}
