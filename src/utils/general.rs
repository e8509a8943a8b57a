//! Identifier normalization.

/// Keeps only the alphanumeric characters of `s`, lowercased, in order.
///
/// ```
/// use jobspec_tools::lowercase_alnum;
///
/// assert_eq!(lowercase_alnum("Hello, World!"), "helloworld");
/// assert_eq!(lowercase_alnum("A.String.0.1.2"), "astring012");
/// assert_eq!(lowercase_alnum("HCA9865005_V1_MR"), "hca9865005v1mr");
/// ```
pub fn lowercase_alnum(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
