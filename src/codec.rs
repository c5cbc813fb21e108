//! Height <-> packed pixel codec.
//!
//! A height in [-1, 1] maps to an 8-bit channel value, replicated into R, G
//! and B with alpha fixed at 255. Pixels are packed as `0xAABBGGRR` so that
//! `u32::to_le_bytes` yields RGBA byte order.

/// Channel value per unit of height.
pub const CHANNEL_SCALE: f64 = 127.5;

/// Largest absolute error introduced by encode followed by decode.
pub const QUANTIZATION_STEP: f64 = 1.0 / CHANNEL_SCALE;

const OPAQUE: u32 = 0xff << 24;
const GRAY: u32 = 0x0001_0101;

/// Quantize a height to an 8-bit channel value. Out-of-range heights saturate.
pub fn encode_channel(height: f64) -> u8 {
    let v = ((height + 1.0) * CHANNEL_SCALE).round();
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0) as u8
}

pub fn decode_channel(channel: u8) -> f64 {
    channel as f64 / CHANNEL_SCALE - 1.0
}

/// Encode a height into an opaque gray pixel.
pub fn encode(height: f64) -> u32 {
    OPAQUE | GRAY * encode_channel(height) as u32
}

/// Decode a pixel's height from its red channel.
pub fn decode(pixel: u32) -> f64 {
    decode_channel((pixel & 0xff) as u8)
}

pub fn to_rgba(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

pub fn from_rgba(rgba: [u8; 4]) -> u32 {
    u32::from_le_bytes(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_error_bound() {
        for i in 0..=2000 {
            let h = -1.0 + i as f64 / 1000.0;
            let back = decode(encode(h));
            assert!((back - h).abs() <= QUANTIZATION_STEP, "h={} back={}", h, back);
        }
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(encode_channel(-1.0), 0);
        assert_eq!(encode_channel(1.0), 255);
        assert_eq!(decode_channel(0), -1.0);
        assert_eq!(decode_channel(255), 1.0);
    }

    #[test]
    fn test_channels_replicated_and_opaque() {
        let [r, g, b, a] = to_rgba(encode(0.3));
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
        assert_eq!(r, encode_channel(0.3));
    }

    #[test]
    fn test_saturates_out_of_range() {
        assert_eq!(encode_channel(3.0), 255);
        assert_eq!(encode_channel(-7.0), 0);
        assert_eq!(encode_channel(f64::NAN), 0);
    }

    #[test]
    fn test_rgba_packing_inverse() {
        let px = from_rgba([10, 20, 30, 255]);
        assert_eq!(to_rgba(px), [10, 20, 30, 255]);
        assert_eq!(decode(px), decode_channel(10));
    }

    #[test]
    fn test_decoded_channels_re_encode_exactly() {
        for c in 0..=255u8 {
            assert_eq!(encode_channel(decode_channel(c)), c);
        }
    }
}
