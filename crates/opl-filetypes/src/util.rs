/// Raw contents of a fixed-width, NUL padded string field. Everything from
/// the first NUL on is dropped; a field without a NUL is taken whole. No
/// decoding happens, names written by other tools may be Latin-1 or SJIS.
pub fn parse_cstring(input: &[u8]) -> Vec<u8> {
    let end = input.iter().position(|&b| b == 0).unwrap_or(input.len());
    input[..end].to_vec()
}

/// Copies at most `width` bytes of `value` into a zero filled field of
/// exactly `width` bytes.
pub fn fixed_field(value: &[u8], width: usize) -> Vec<u8> {
    let mut field = vec![0u8; width];
    let len = value.len().min(width);
    field[..len].copy_from_slice(&value[..len]);
    field
}

/// Longest prefix of `value` that fits in `max` bytes without splitting a
/// character.
pub fn truncate_to_bytes(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
