//! File name wildcard matching for glob candidates.

/// Matches a file name against a wildcard pattern.
///
/// Supports:
/// - `*` matches any run of characters, including none
/// - `?` matches exactly one character
/// - anything else matches itself
///
/// Matching is on whole names, so there is no path separator handling.
///
/// # Examples
///
/// ```
/// use diagarch_core::resolve::matches_pattern;
///
/// assert!(matches_pattern("xfs_info_.dev.sda1", "xfs_info_*"));
/// assert!(matches_pattern("dumpe2fs_-h_.dev.sdb", "dumpe2fs_*"));
/// assert!(matches_pattern("vg0", "vg?"));
/// assert!(!matches_pattern("xfs_info", "xfs_info_*"));
/// ```
#[must_use]
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    let name: Vec<char> = name.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let (mut n, mut p) = (0, 0);
    // Position of the last `*` seen and the name index it is tried against.
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                n += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, from)) => {
                    p = star + 1;
                    n = from + 1;
                    backtrack = Some((star, from + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
