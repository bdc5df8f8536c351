use anyhow::{Result, anyhow};
use isolang::Language;

/// Language tag utilities
///
/// Caption tracks carry IETF-style tags (`en`, `fr`, `pt-BR`, `zh-Hans`).
/// Only the primary subtag is checked against ISO 639; region and script
/// subtags are validated for shape and otherwise passed through untouched,
/// since they end up in file names and translation requests verbatim.

// ISO 639-2/B codes that differ from their 639-2/T counterpart
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Return the primary language subtag of an IETF-style tag (`pt-BR` -> `pt`)
pub fn primary_subtag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Validate an IETF-style language tag
///
/// The primary subtag must be a known ISO 639-1 or ISO 639-2 code; any
/// further subtags must be 1-8 ASCII alphanumerics.
pub fn validate_language_tag(tag: &str) -> Result<()> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty language tag"));
    }

    normalize_to_part2t(primary_subtag(trimmed))
        .map_err(|_| anyhow!("Invalid language tag: {}", tag))?;

    for subtag in trimmed.split(['-', '_']).skip(1) {
        let valid = !subtag.is_empty()
            && subtag.len() <= 8
            && subtag.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(anyhow!("Invalid subtag '{}' in language tag: {}", subtag, tag));
        }
    }

    Ok(())
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(&normalized_code) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        3 => {
            if Language::from_639_3(&normalized_code).is_some() {
                return Ok(normalized_code);
            }
            if let Some((_, part2t)) = PART2B_TO_PART2T.iter().find(|(b, _)| *b == normalized_code) {
                return Ok((*part2t).to_string());
            }
        }
        _ => {}
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language tags name the same language (primary subtags only)
pub fn language_codes_match(tag1: &str, tag2: &str) -> bool {
    match (
        normalize_to_part2t(primary_subtag(tag1)),
        normalize_to_part2t(primary_subtag(tag2)),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name for a tag
pub fn get_language_name(tag: &str) -> Result<String> {
    let normalized = normalize_to_part2t(primary_subtag(tag))?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
