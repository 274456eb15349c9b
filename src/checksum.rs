//! XOR error detection byte used by DCC packets.
//!
//! The last byte of every packet is the exclusive-or of all bytes before it.

/// Computes the error detection byte for `bytes`.
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// Checks that the last byte of `frame` is the XOR of the others.
///
/// An empty frame never verifies.
pub fn verify_checksum(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((last, body)) => xor_checksum(body) == *last,
        None => false,
    }
}
