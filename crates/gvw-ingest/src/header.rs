//! Header normalization
//!
//! Maps arbitrary raw column headers ("Number of ClinVar submissions",
//! "GeneID", "# organization") to canonical snake_case identifiers.

use regex::Regex;
use std::sync::LazyLock;

static CLINVAR: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)clinvar").unwrap()
});
static NON_ALNUM: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[^a-zA-Z0-9]").unwrap()
});
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\s+").unwrap()
});
static CAMEL_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"([a-z0-9])([A-Z])").unwrap()
});

/// Convert a raw column header to a snake_case identifier.
///
/// The steps run in a fixed order; reordering them changes the output:
///
/// 1. Rewrite "clinvar" (any casing) to "Clinvar" so the camel-case split
///    below treats it as one capitalized token instead of cutting mid-word.
/// 2. Replace every non-alphanumeric character with a space.
/// 3. Trim, then collapse whitespace runs to a single underscore.
/// 4. Insert an underscore at each lowercase-or-digit / uppercase boundary.
/// 5. Lowercase the result.
///
/// Pure and total: the output contains only `[a-z0-9_]`, and empty input
/// yields empty output.
///
/// ```
/// use gvw_ingest::normalize_header;
///
/// assert_eq!(normalize_header("someID"), "some_id");
/// assert_eq!(normalize_header("Number of ClinVar submissions"), "number_of_clinvar_submissions");
/// ```
pub fn normalize_header(raw: &str) -> String {
    let s = CLINVAR.replace_all(raw, "Clinvar");
    let s = NON_ALNUM.replace_all(&s, " ");
    let s = WHITESPACE.replace_all(s.trim(), "_");
    let s = CAMEL_BOUNDARY.replace_all(&s, "${1}_${2}");
    s.to_lowercase()
}
