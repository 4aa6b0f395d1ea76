//! DNS-1123 label sanitizing for cluster object names

/// Maximum length of a DNS-1123 label
pub const MAX_LABEL_LENGTH: usize = 63;

/// Whether `value` is a valid DNS-1123 label: 1-63 characters of `[a-z0-9-]`,
/// starting and ending with an alphanumeric.
pub fn is_dns1123_label(value: &str) -> bool {
    let bytes = value.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };

    bytes.len() <= MAX_LABEL_LENGTH
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

/// Map arbitrary text to a valid DNS-1123 label.
///
/// Runs of characters outside `[a-z0-9]` (after lower-casing) collapse into a
/// single hyphen. Returns `fallback` when nothing valid remains; `fallback` is
/// expected to be a valid label already.
pub fn sanitize(value: &str, fallback: &str) -> String {
    let lowered = value.trim().to_lowercase();
    if lowered.is_empty() {
        return fallback.to_string();
    }

    let mut label = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            // leading separators never emit a hyphen, trailing ones are never flushed
            if pending_hyphen && !label.is_empty() {
                label.push('-');
            }
            pending_hyphen = false;
            label.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    if label.len() > MAX_LABEL_LENGTH {
        label.truncate(MAX_LABEL_LENGTH);
        let trimmed = label.trim_end_matches('-').len();
        label.truncate(trimmed);
    }

    if is_dns1123_label(&label) {
        label
    } else {
        fallback.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "workloads";

    #[test]
    fn collapses_separators_into_single_hyphens() {
        assert_eq!(sanitize("workloads/env/prod", FALLBACK), "workloads-env-prod");
        assert_eq!(sanitize(" ../My Workloads  ", FALLBACK), "my-workloads");
        assert_eq!(sanitize("My__App--Name", FALLBACK), "my-app-name");
        assert_eq!(sanitize("k8s", FALLBACK), "k8s");
    }

    #[test]
    fn empty_or_invalid_input_returns_fallback() {
        assert_eq!(sanitize("", FALLBACK), FALLBACK);
        assert_eq!(sanitize("   ", FALLBACK), FALLBACK);
        assert_eq!(sanitize("../..//", FALLBACK), FALLBACK);
        assert_eq!(sanitize("ÄÖÜ", FALLBACK), FALLBACK);
    }

    #[test]
    fn truncates_to_label_length_without_trailing_hyphen() {
        let long = format!("{}-{}", "a".repeat(62), "b".repeat(10));
        let label = sanitize(&long, FALLBACK);
        assert_eq!(label, "a".repeat(62));
        assert!(is_dns1123_label(&label));

        let label = sanitize(&"x".repeat(100), FALLBACK);
        assert_eq!(label.len(), MAX_LABEL_LENGTH);
    }

    #[test]
    fn sanitize_is_idempotent_and_always_valid() {
        let long_path = "seg/".repeat(40);
        let inputs = [
            "workloads/env/prod",
            " ../My Workloads  ",
            "UPPER_case.Mixed",
            "--leading-and-trailing--",
            "tabs\tand\nnewlines",
            "日本語 project 2",
            "",
            "-",
            long_path.as_str(),
        ];

        for input in inputs {
            let once = sanitize(input, FALLBACK);
            assert!(is_dns1123_label(&once), "invalid label {:?} for {:?}", once, input);
            assert_eq!(sanitize(&once, FALLBACK), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn label_validation_rules() {
        assert!(is_dns1123_label("a"));
        assert!(is_dns1123_label("flux-system"));
        assert!(!is_dns1123_label(""));
        assert!(!is_dns1123_label("-a"));
        assert!(!is_dns1123_label("a-"));
        assert!(!is_dns1123_label("A"));
        assert!(!is_dns1123_label(&"a".repeat(64)));
    }
}
