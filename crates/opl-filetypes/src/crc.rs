//! CRC-32 variant introduced by USBAdvance and still used to name the
//! part files of `ul.cfg` games (`ul.<CRC>.<startup>.<part>`).
//!
//! It is not the IEEE CRC-32: the table is generated with an inverted
//! feedback condition, stored back to front, and the trailing NUL of the
//! name is part of the checksummed data.

const POLYNOMIAL: u32 = 0x04C1_1DB7;

const TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                crc << 1
            } else {
                (crc << 1) ^ POLYNOMIAL
            };
            bit += 1;
        }
        table[255 - i] = crc;
        i += 1;
    }
    table
}

/// Checksum of a game name as written to the part file names.
pub fn usba_crc32(name: &[u8]) -> u32 {
    // the seed is whatever the last table step produced, i.e. TABLE[0]
    let mut crc = TABLE[0];
    for &byte in name.iter().chain(std::iter::once(&0u8)) {
        let index = ((byte as u32) ^ (crc >> 24)) & 0xFF;
        crc = TABLE[index as usize] ^ (crc << 8);
    }
    crc
}
