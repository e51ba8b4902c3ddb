//! Mapping of free-form prefixes onto the hex alphabet.

use crate::crypto::ADDRESS_HEX_LEN;

/// Lowercase letters with no hex look-alike. Their uppercase forms are not
/// reserved.
pub const RESERVED: [char; 9] = ['k', 'm', 'n', 'p', 'u', 'v', 'w', 'x', 'y'];

/// Errors produced while canonicalizing a prefix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefixError {
    #[error("Input string contains an irreplaceable character: {0:?}")]
    InvalidCharacter(char),

    #[error("Prefix maps to {len} hex digits but an address only has {}", ADDRESS_HEX_LEN)]
    TooLong { len: usize },
}

/// Look-alike substitution for a single character.
///
/// Case matters: `A` becomes `4` while `a` is already hex.
fn substitute(c: char) -> Option<char> {
    let mapped = match c {
        'A' => '4',
        'B' => '8',
        'D' => '0',
        'E' => '3',
        'g' => '9',
        'h' => '4',
        'i' => '1',
        'j' => '7',
        'l' => '7',
        'o' => '0',
        'q' => '9',
        'r' => '2',
        's' => '5',
        't' => '7',
        'z' => '2',
        '0'..='9' | 'a'..='f' => c,
        'C' | 'F' => c.to_ascii_lowercase(),
        _ => return None,
    };
    Some(mapped)
}

/// Canonicalizes a user supplied prefix into lowercase hex.
///
/// Reserved characters are reported before anything else is looked at, so
/// `"G k"` fails on `'k'`. Every other character must either have a table
/// entry or already be a hex digit.
pub fn canonicalize(input: &str) -> Result<String, PrefixError> {
    if let Some(c) = input.chars().find(|c| RESERVED.contains(c)) {
        return Err(PrefixError::InvalidCharacter(c));
    }

    let canonical = input
        .chars()
        .map(|c| substitute(c).ok_or(PrefixError::InvalidCharacter(c)))
        .collect::<Result<String, _>>()?;

    if canonical.len() > ADDRESS_HEX_LEN {
        return Err(PrefixError::TooLong {
            len: canonical.len(),
        });
    }

    Ok(canonical)
}
