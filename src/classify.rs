//! Byte classifiers for the HTTP/1.x grammar: method/token characters,
//! URL-valid path bytes, and hex digits.
//!
//! Rendered as const-evaluated 256-entry lookup tables (named associated
//! constants over a raw bitmask) rather than C preprocessor macros.

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// `LOWER(c)`: ASCII-lowercases a byte by setting bit 0x20, exactly as the
/// C macro does (so it also "lowercases" non-alphabetic bytes, which is
/// harmless since callers only inspect the result for `a..=z`).
#[inline(always)]
pub fn lower(c: u8) -> u8 {
    c | 0x20
}

/// `IS_ALPHA(c)`: `LOWER(c) in [a, z]`.
#[inline(always)]
pub fn is_alpha(c: u8) -> bool {
    let l = lower(c);
    (b'a'..=b'z').contains(&l)
}

/// `IS_NUM(c)`: `c in [0, 9]`.
#[inline(always)]
pub fn is_num(c: u8) -> bool {
    c.is_ascii_digit()
}

/// RFC 2616 token set, lowercased; 256-entry table with `0` for non-tokens.
/// Separators `()<>@,;:\"/[]?={} SP HT` are all `0`.
static TOKENS: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = token_for(i as u8);
        i += 1;
    }
    table
};

const fn token_for(c: u8) -> u8 {
    match c {
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
        | b'`' | b'|' | b'~' => c,
        b'0'..=b'9' => c,
        b'A'..=b'Z' => c | 0x20,
        b'a'..=b'z' => c,
        _ => 0,
    }
}

/// `TOKEN(c)`: `SPACE` maps to `SPACE` (special-cased by the header
/// sub-machine caller), everything else comes from the 256-entry table.
#[inline(always)]
pub fn token(c: u8) -> u8 {
    if c == b' ' {
        b' '
    } else {
        TOKENS[c as usize]
    }
}

/// `IS_URL_CHAR(c)`: high-bit-set bytes (UTF-8 continuation bytes in
/// paths), plus `HT`/`NL` sentinels, plus ASCII 33..=126 except `DEL`.
#[inline(always)]
pub fn is_url_char(c: u8) -> bool {
    if c & 0x80 != 0 {
        return true;
    }
    match c {
        9 | 12 => true,
        33..=126 => true,
        _ => false,
    }
}

/// Hex digit table: `-1` for non-hex, else numeric value `0..=15`.
static UNHEX: [i8; 256] = {
    let mut table = [-1i8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = unhex_for(i as u8);
        i += 1;
    }
    table
};

const fn unhex_for(c: u8) -> i8 {
    match c {
        b'0'..=b'9' => (c - b'0') as i8,
        b'a'..=b'f' => (c - b'a') as i8 + 10,
        b'A'..=b'F' => (c - b'A') as i8 + 10,
        _ => -1,
    }
}

/// Returns the hex value of `c`, or `None` if it is not a hex digit.
#[inline(always)]
pub fn unhex(c: u8) -> Option<u8> {
    let v = UNHEX[c as usize];
    if v < 0 {
        None
    } else {
        Some(v as u8)
    }
}

/// `true` for carriage return.
#[inline(always)]
pub fn is_cr(c: u8) -> bool {
    c == CR
}

/// `true` for line feed.
#[inline(always)]
pub fn is_lf(c: u8) -> bool {
    c == LF
}
