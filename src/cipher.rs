//! Name obfuscation for the entry table.
//!
//! Every entry stores a one-byte `code`.  The 32-byte name field is XORed
//! byte-wise with `code ^ 0x6C`.  The transform is its own inverse, so the
//! same call hides a name on write and recovers it on read.
//!
//! This is obfuscation only.  Anyone holding the archive holds every key.

use crate::entry::NAME_LEN;

/// Constant mixed into every per-entry code.
pub const KEY_MIX: u8 = 0x6C;

#[inline]
pub fn key_for(code: u8) -> u8 {
    code ^ KEY_MIX
}

/// XOR `name` with the key derived from `code`.
pub fn transform(name: &[u8; NAME_LEN], code: u8) -> [u8; NAME_LEN] {
    let key = key_for(code);
    let mut out = *name;
    for b in out.iter_mut() {
        *b ^= key;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn code_6c_is_identity() {
        let name = *b"Sprite One                      ";
        assert_eq!(transform(&name, 0x6C), name);
    }

    #[test]
    fn spaces_become_key() {
        let name = [b' '; NAME_LEN];
        let hidden = transform(&name, 0x00);
        assert!(hidden.iter().all(|&b| b == b' ' ^ 0x6C));
    }

    proptest! {
        #[test]
        fn transform_is_self_inverse(name in prop::array::uniform32(any::<u8>()), code in any::<u8>()) {
            prop_assert_eq!(transform(&transform(&name, code), code), name);
        }
    }
}
