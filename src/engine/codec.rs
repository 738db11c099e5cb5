// engine/codec.rs — Stealth Signature Codec.
// Encodes a small integer into the whitespace of an email signature: the
// gaps between literal text chunks are filled with visually near-identical
// Unicode space characters, one base-6 digit per gap. A signature with N
// chunks carries N-1 digits, so a 3-chunk template addresses 36 contacts.
//
// Decoding is offset-based: the expected position of each separator is the
// running character length of the literal chunks before it. Mail clients
// love to reshuffle whitespace, so `robust_decode` retries against a small
// ordered set of chunk-whitespace variants before giving up.

use crate::atoms::constants::SIGNATURE_ALPHABET;
use crate::atoms::error::{EngineError, EngineResult};
use log::debug;

/// Number of distinct separator symbols (the digit radix).
const RADIX: u64 = SIGNATURE_ALPHABET.len() as u64;

/// Outcome of a robust decode over all chunk variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobustOutcome {
    /// A variant decoded to an id in the known set.
    Matched(u64),
    /// Every variant failed to decode, or decoded to an unknown id.
    Exhausted,
}

/// Identifier capacity for a template with `slots` separator gaps.
/// Computed in u128 so pathological slot counts cannot wrap.
pub fn capacity(slots: usize) -> u128 {
    (RADIX as u128).pow(slots as u32)
}

/// Encode `id` into the separator gaps of `chunks`.
///
/// `id` must satisfy `0 <= id < 6^(chunks.len()-1)`; anything larger is an
/// `Overflow` error, never a silent wrap — a wrapped id would decode to a
/// different contact.
pub fn encode(id: u64, chunks: &[String]) -> EngineResult<String> {
    if chunks.is_empty() {
        return Err(EngineError::Validation(
            "signature template needs at least one literal chunk".into(),
        ));
    }
    let slots = chunks.len() - 1;
    let cap = capacity(slots);
    if u128::from(id) >= cap {
        return Err(EngineError::Overflow {
            id,
            capacity: cap.min(u128::from(u64::MAX)) as u64,
        });
    }

    // Fixed-width base-6 digit sequence, most-significant digit first.
    let mut digits = vec![0u64; slots];
    let mut rest = id;
    for digit in digits.iter_mut().rev() {
        *digit = rest % RADIX;
        rest /= RADIX;
    }

    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        out.push_str(chunk);
        if i < slots {
            out.push(SIGNATURE_ALPHABET[digits[i] as usize]);
        }
    }
    Ok(out)
}

/// Decode the identifier hidden in `text`, assuming it was produced from
/// exactly these literal chunks.
///
/// Walks the expected separator offsets (running chunk character lengths),
/// reads the character at each, and maps it back to a digit. A character
/// outside the alphabet, or an offset past the end of the text, is a
/// `Decode` error.
pub fn decode(text: &str, chunks: &[String]) -> EngineResult<u64> {
    if chunks.is_empty() {
        return Err(EngineError::Validation(
            "signature template needs at least one literal chunk".into(),
        ));
    }
    let slots = chunks.len() - 1;
    let chars: Vec<char> = text.chars().collect();

    let mut value: u64 = 0;
    let mut offset = 0usize;
    for chunk in chunks.iter().take(slots) {
        offset += chunk.chars().count();
        let sep = *chars.get(offset).ok_or_else(|| {
            EngineError::Decode(format!(
                "separator offset {offset} is past the end of the text ({} chars)",
                chars.len()
            ))
        })?;
        let digit = SIGNATURE_ALPHABET
            .iter()
            .position(|&s| s == sep)
            .ok_or_else(|| {
                EngineError::Decode(format!(
                    "character U+{:04X} at offset {offset} is not a separator",
                    sep as u32
                ))
            })?;
        value = value * RADIX + digit as u64;
        offset += 1;
    }
    Ok(value)
}

/// Decode with tolerance for chunk-boundary whitespace mangling.
///
/// Tries `decode` against an ordered list of whole-template variants:
/// as-authored first, then progressively trimmed and padded chunk edges.
/// Per-variant decode failures are soft; the first success whose id is in
/// `known_ids` wins. Returns `Exhausted` when nothing matches. Best-effort:
/// not guaranteed sound against arbitrary reformatting.
pub fn robust_decode(text: &str, chunks: &[String], known_ids: &[u64]) -> RobustOutcome {
    for (i, variant) in chunk_variants(chunks).iter().enumerate() {
        match decode(text, variant) {
            Ok(id) if known_ids.contains(&id) => {
                if i > 0 {
                    debug!("[codec] Matched id {id} on whitespace variant {i}");
                }
                return RobustOutcome::Matched(id);
            }
            // Decoded cleanly but to an id we are not looking for; keep
            // trying, since a shifted offset can land on a plausible separator.
            Ok(_) => continue,
            Err(_) => continue,
        }
    }
    RobustOutcome::Exhausted
}

/// Ordered whitespace variants of a chunk template, deduplicated.
/// Identity first so an unmangled signature never pays for the fallbacks.
fn chunk_variants(chunks: &[String]) -> Vec<Vec<String>> {
    let transforms: [fn(&str) -> String; 6] = [
        |c| c.to_string(),
        |c| c.trim_end().to_string(),
        |c| c.trim_start().to_string(),
        |c| c.trim().to_string(),
        |c| format!(" {c}"),
        |c| format!("{c} "),
    ];

    let mut variants: Vec<Vec<String>> = Vec::with_capacity(transforms.len());
    for transform in &transforms {
        let variant: Vec<String> = chunks.iter().map(|c| transform(c)).collect();
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
