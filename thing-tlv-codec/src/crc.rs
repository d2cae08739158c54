//! CRC16 frame integrity code (CCITT-FALSE)
//!
//! Polynomial 0x1021, initial value 0xFFFF, MSB first, no final XOR.
//! Stamped over every frame byte preceding the 2-byte trailer.

const INITIAL_CRC: u16 = 0xFFFF;
const POLY: u16 = 0x1021;

/// Precomputed CRC table
static CRC_TABLE: once_cell::sync::Lazy<[u16; 256]> = once_cell::sync::Lazy::new(|| {
    let mut table = [0u16; 256];
    for b in 0..=0xFFu16 {
        let mut v = b << 8;
        for _ in 0..8 {
            if v & 0x8000 != 0 {
                v = (v << 1) ^ POLY;
            } else {
                v <<= 1;
            }
        }
        table[b as usize] = v;
    }
    table
});

/// Compute the CRC16 of a byte sequence.
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(INITIAL_CRC, |crc, &byte| {
        (crc << 8) ^ CRC_TABLE[(((crc >> 8) ^ byte as u16) & 0xFF) as usize]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        let data = hex::decode("0103200100670000000000").unwrap();
        assert_eq!(crc16(&data), 0xCAFF);

        let data = hex::decode("0103d03fdfb7e0e8").unwrap();
        assert_eq!(crc16(&data), 0x08DA);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn test_matches_bitwise_reference() {
        fn reference(data: &[u8]) -> u16 {
            let mut crc: u16 = 0xFFFF;
            for &byte in data {
                crc ^= (byte as u16) << 8;
                for _ in 0..8 {
                    crc = if crc & 0x8000 != 0 {
                        (crc << 1) ^ 0x1021
                    } else {
                        crc << 1
                    };
                }
            }
            crc
        }
        for seed in 0..32u8 {
            let data: Vec<u8> = (0..seed).map(|i| i.wrapping_mul(37).wrapping_add(seed)).collect();
            assert_eq!(crc16(&data), reference(&data));
        }
    }

    #[test]
    fn test_single_bit_sensitivity() {
        let data = b"thing-model telemetry";
        let base = crc16(data);
        let mut flipped = data.to_vec();
        flipped[3] ^= 0x10;
        assert_ne!(crc16(&flipped), base);
    }
}
