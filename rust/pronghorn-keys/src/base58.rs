//! Base-58 conversion by long multiplication.
//!
//! The alphabet is the usual 58-symbol set with the visually ambiguous
//! glyphs `0OIl` removed. Values convert as big-endian unsigned integers;
//! leading zero bytes survive as literal `'1'` characters so magnitude
//! length is preserved.

use crate::error::KeyError;

/// The 58-symbol alphabet, indexed by digit value.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Symbol-to-digit table, `-1` for characters outside the alphabet.
const SYMBOL_MAP: [i8; 256] = build_symbol_map();

const fn build_symbol_map() -> [i8; 256] {
    let mut map = [-1i8; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        map[ALPHABET[i] as usize] = i as i8;
        i += 1;
    }
    map
}

fn symbol_digit(symbol: char, position: usize) -> Result<u32, KeyError> {
    let digit = if symbol.is_ascii() {
        SYMBOL_MAP[symbol as usize]
    } else {
        -1
    };
    if digit < 0 {
        return Err(KeyError::InvalidBase58Symbol { symbol, position });
    }
    Ok(digit as u32)
}

/// Encode bytes as a base-58 string.
pub fn encode(bytes: &[u8]) -> String {
    // Digits accumulate least-significant-first; ×256 then add each byte.
    let mut digits: Vec<u8> = Vec::new();
    for &byte in bytes {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            let x = (u32::from(*digit) << 8) + carry;
            *digit = (x % 58) as u8;
            carry = x / 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }
    for &byte in bytes {
        if byte != 0 {
            break;
        }
        digits.push(0);
    }
    digits
        .iter()
        .rev()
        .map(|&digit| ALPHABET[digit as usize] as char)
        .collect()
}

/// Decode a base-58 string into exactly `size` bytes.
///
/// # Errors
///
/// Fails with [`KeyError::InvalidBase58Symbol`] on a character outside the
/// alphabet and [`KeyError::ValueOutOfRange`] when the value needs more
/// than `size` bytes.
pub fn decode_fixed(size: usize, input: &str) -> Result<Vec<u8>, KeyError> {
    let mut result = vec![0u8; size];
    for (position, symbol) in input.chars().enumerate() {
        let mut carry = symbol_digit(symbol, position)?;
        for byte in result.iter_mut() {
            let x = u32::from(*byte) * 58 + carry;
            *byte = x as u8;
            carry = x >> 8;
        }
        if carry != 0 {
            return Err(KeyError::ValueOutOfRange { size });
        }
    }
    result.reverse();
    Ok(result)
}

/// Decode a base-58 string into as many bytes as the value needs.
///
/// Leading `'1'` characters decode back to leading zero bytes.
///
/// # Errors
///
/// Fails with [`KeyError::InvalidBase58Symbol`] on a character outside the
/// alphabet.
pub fn decode_var(input: &str) -> Result<Vec<u8>, KeyError> {
    let mut result: Vec<u8> = Vec::new();
    for (position, symbol) in input.chars().enumerate() {
        let mut carry = symbol_digit(symbol, position)?;
        for byte in result.iter_mut() {
            let x = u32::from(*byte) * 58 + carry;
            *byte = x as u8;
            carry = x >> 8;
        }
        if carry != 0 {
            result.push(carry as u8);
        }
    }
    for symbol in input.chars() {
        if symbol == '1' {
            result.push(0);
        } else {
            break;
        }
    }
    result.reverse();
    Ok(result)
}
