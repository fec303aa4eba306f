//! Telemetry wire format.
//!
//! Frames are length-prefixed binary:
//!
//! ```text
//!  0               4
//! +---------------+------------------------------+
//! | len (u32 LE)  | payload (len bytes)          |
//! +---------------+------------------------------+
//! ```
//!
//! A snapshot payload is exactly six little-endian signed 32-bit integers
//! in the order `val_azim, val_elev, raw_azim, raw_elev, tgt_azim,
//! tgt_elev` — 24 bytes total. The layout is an external contract: it must
//! not change without a version marker.

use static_assertions::const_assert_eq;
use thiserror::Error;

use crate::state::PositionState;

/// Frame header size [bytes].
pub const HEADER_LEN: usize = 4;

/// Snapshot payload size [bytes]: six i32 fields.
pub const SNAPSHOT_LEN: usize = 24;

// The struct is repr(C) with six i32 fields; the encoding walks it in
// declaration order, so the sizes must agree.
const_assert_eq!(core::mem::size_of::<PositionState>(), SNAPSHOT_LEN);

/// Decoding error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WireError {
    /// Payload shorter than the fixed snapshot layout.
    #[error("snapshot payload truncated: need {need} bytes, got {got}")]
    Truncated {
        /// Required length.
        need: usize,
        /// Provided length.
        got: usize,
    },
}

/// Encode a snapshot payload (no header).
pub fn encode_snapshot(state: &PositionState) -> [u8; SNAPSHOT_LEN] {
    let mut buf = [0u8; SNAPSHOT_LEN];
    let fields = [
        state.val_azim,
        state.val_elev,
        state.raw_azim,
        state.raw_elev,
        state.tgt_azim,
        state.tgt_elev,
    ];
    for (chunk, field) in buf.chunks_exact_mut(4).zip(fields) {
        chunk.copy_from_slice(&field.to_le_bytes());
    }
    buf
}

/// Decode a snapshot payload (no header).
///
/// Exactly [`SNAPSHOT_LEN`] bytes are consumed; trailing bytes are not
/// permitted to exist at the call site (the frame length declares the
/// payload size).
pub fn decode_snapshot(payload: &[u8]) -> Result<PositionState, WireError> {
    if payload.len() < SNAPSHOT_LEN {
        return Err(WireError::Truncated {
            need: SNAPSHOT_LEN,
            got: payload.len(),
        });
    }

    let mut fields = [0i32; 6];
    for (field, chunk) in fields.iter_mut().zip(payload.chunks_exact(4)) {
        *field = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    Ok(PositionState {
        val_azim: fields[0],
        val_elev: fields[1],
        raw_azim: fields[2],
        raw_elev: fields[3],
        tgt_azim: fields[4],
        tgt_elev: fields[5],
    })
}

/// Encode the u32 LE length header for a payload of `len` bytes.
#[inline]
pub fn encode_header(len: u32) -> [u8; HEADER_LEN] {
    len.to_le_bytes()
}

/// Decode a frame length header.
#[inline]
pub fn decode_header(header: [u8; HEADER_LEN]) -> u32 {
    u32::from_le_bytes(header)
}

/// Encode a complete snapshot frame: header + payload.
pub fn encode_snapshot_frame(state: &PositionState) -> [u8; HEADER_LEN + SNAPSHOT_LEN] {
    let mut frame = [0u8; HEADER_LEN + SNAPSHOT_LEN];
    frame[..HEADER_LEN].copy_from_slice(&encode_header(SNAPSHOT_LEN as u32));
    frame[HEADER_LEN..].copy_from_slice(&encode_snapshot(state));
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trip_is_identity() {
        let state = PositionState {
            val_azim: 1,
            val_elev: 2,
            raw_azim: 3,
            raw_elev: 4,
            tgt_azim: 5,
            tgt_elev: 6,
        };
        let encoded = encode_snapshot(&state);
        assert_eq!(decode_snapshot(&encoded).unwrap(), state);
    }

    #[test]
    fn layout_is_little_endian_in_field_order() {
        let state = PositionState {
            val_azim: 0x0102_0304,
            val_elev: -1,
            raw_azim: 0,
            raw_elev: 0,
            tgt_azim: 0,
            tgt_elev: 0,
        };
        let encoded = encode_snapshot(&state);
        // val_azim first, least significant byte first.
        assert_eq!(&encoded[..4], &[0x04, 0x03, 0x02, 0x01]);
        // val_elev = -1 → all 0xFF.
        assert_eq!(&encoded[4..8], &[0xFF; 4]);
    }

    #[test]
    fn negative_values_survive_round_trip() {
        let state = PositionState {
            val_azim: -210_000,
            val_elev: -10_000,
            raw_azim: 0,
            raw_elev: 0,
            tgt_azim: i32::MIN,
            tgt_elev: i32::MAX,
        };
        let encoded = encode_snapshot(&state);
        assert_eq!(decode_snapshot(&encoded).unwrap(), state);
    }

    #[test]
    fn truncated_payload_rejected() {
        let err = decode_snapshot(&[0u8; 10]).unwrap_err();
        assert_eq!(
            err,
            WireError::Truncated {
                need: SNAPSHOT_LEN,
                got: 10
            }
        );
    }

    #[test]
    fn header_round_trip() {
        assert_eq!(decode_header(encode_header(0)), 0);
        assert_eq!(decode_header(encode_header(SNAPSHOT_LEN as u32)), 24);
        assert_eq!(decode_header(encode_header(u32::MAX)), u32::MAX);
    }

    #[test]
    fn snapshot_frame_has_header_and_payload() {
        let state = PositionState::default();
        let frame = encode_snapshot_frame(&state);
        assert_eq!(frame.len(), HEADER_LEN + SNAPSHOT_LEN);
        assert_eq!(
            decode_header(frame[..HEADER_LEN].try_into().unwrap()),
            SNAPSHOT_LEN as u32
        );
    }
}
