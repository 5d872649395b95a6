//! Stem tokenization and basal-area equivalent diameter.
//!
//! Multi-stem DBH readings in the source map are entered as concatenated
//! digits with no separator: a raw value above `MULTI_STEM_THRESHOLD_IN` is
//! not one trunk but a run of per-stem readings (e.g. "302" = stems of 30"
//! and 2"). The greedy split prefers two-digit stems (>= 10) and falls back
//! to single digits. The split is deterministic, so the extractor and the
//! validator re-derive identical tokens from the same raw text.

/// Raw readings above this are concatenated multi-stem entries, not a
/// single trunk measurement.
pub const MULTI_STEM_THRESHOLD_IN: f64 = 100.0;

/// Diameter fields derived from one raw DBH field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DbhReading {
    /// Set when exactly one stem token parses cleanly.
    pub single_stem_in: Option<f64>,
    /// Basal-area equivalent over two or more parsed stems.
    pub equivalent_in: Option<f64>,
    /// True iff more than one stem token was recorded.
    pub multi_stem: bool,
}

/// Splits a raw DBH field into its ordered stem tokens, as recorded.
///
/// One parseable reading at or below the multi-stem threshold is a single
/// token; a larger reading is split into per-stem digit tokens. Text that
/// does not parse numerically is kept as a single raw token so the caller
/// can record it (and fail to parse it) rather than lose it.
pub fn split_stems(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    let value = match trimmed.parse::<f64>() {
        Ok(v) => v,
        Err(_) => return vec![trimmed.to_string()],
    };
    if value <= MULTI_STEM_THRESHOLD_IN {
        return vec![trimmed.to_string()];
    }
    greedy_digit_split(value)
        .into_iter()
        .map(|stem| stem.to_string())
        .collect()
}

/// Greedy split of a concatenated multi-stem value into per-stem inches:
/// take a two-digit stem whenever the next two digits form a number >= 10,
/// else take one digit. Known to mis-split some entries ("643" -> [64, 3]);
/// the validator catches those via the species caps.
fn greedy_digit_split(value: f64) -> Vec<u32> {
    let digits = (value.trunc() as u64).to_string();
    let bytes = digits.as_bytes();
    let mut stems = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if i + 1 < bytes.len() {
            let two = (bytes[i] - b'0') as u32 * 10 + (bytes[i + 1] - b'0') as u32;
            if two >= 10 {
                stems.push(two);
                i += 2;
                continue;
            }
        }
        stems.push((bytes[i] - b'0') as u32);
        i += 1;
    }
    stems
}

/// Single diameter whose cross-sectional area equals the sum of the stems'
/// areas: sqrt of the sum of squares, rounded to 2 decimals.
pub fn equivalent_diameter(stems_in: &[f64]) -> f64 {
    let sum_sq: f64 = stems_in.iter().map(|s| s * s).sum();
    (sum_sq.sqrt() * 100.0).round() / 100.0
}

/// Derives the diameter fields for one record from its raw DBH text.
/// Tokens that fail to parse are dropped from the equivalent-diameter sum;
/// zero parseable tokens leaves every field unset.
pub fn derive_reading(raw: &str) -> DbhReading {
    let tokens = split_stems(raw);
    match tokens.len() {
        0 => DbhReading::default(),
        1 => DbhReading {
            single_stem_in: tokens[0].parse::<f64>().ok(),
            equivalent_in: None,
            multi_stem: false,
        },
        _ => {
            let parsed: Vec<f64> = tokens
                .iter()
                .filter_map(|token| token.parse::<f64>().ok())
                .collect();
            DbhReading {
                single_stem_in: None,
                equivalent_in: if parsed.is_empty() {
                    None
                } else {
                    Some(equivalent_diameter(&parsed))
                },
                multi_stem: true,
            }
        }
    }
}
