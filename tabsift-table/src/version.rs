//! Fixed-width version ordering keys.
//!
//! Turns a dotted/suffixed version string into a 44-character key whose
//! plain string ordering matches version ordering. The key is used purely
//! for comparison, never for display.
//!
//! # Layout
//!
//! - 6 dot-separated groups, each 6 characters, left space-padded
//!   (truncated at 6). Fixed width is what keeps `1.2` before `1.13`.
//! - 2-character pre-release suffix region (`rc`, `be`...), right
//!   space-padded. `~` fills the region when the suffix is wholly absent,
//!   so `1.13.7` sorts *after* `1.13.7-rc12` (`~` orders after all
//!   alphanumerics).
//! - 6-character trailing build number, left space-padded.

const GROUP_COUNT: usize = 6;
const GROUP_WIDTH: usize = 6;
const SUFFIX_WIDTH: usize = 2;
const BUILD_WIDTH: usize = 6;

/// Total key width in characters.
pub const HASH_WIDTH: usize = GROUP_COUNT * GROUP_WIDTH + SUFFIX_WIDTH + BUILD_WIDTH;

/// Character that pads an absent suffix region; orders after alphanumerics.
const NO_SUFFIX_PAD: char = '~';

#[derive(Clone, Copy)]
enum Phase {
    /// Dot-separated groups before an optional dash.
    Groups,
    /// Alphabetic pre-release suffix after the dash.
    Suffix,
    /// Trailing numeric build number.
    Build,
}

/// Hash a version string into its fixed-width ordering key.
///
/// Single left-to-right scan: `.` closes a group, the first `-` switches to
/// the alphabetic suffix, and the first digit inside the suffix starts the
/// numeric build number.
///
/// # Example
///
/// ```
/// use tabsift_table::version::version_hash;
///
/// assert!(version_hash("1.2.3") < version_hash("1.13.0"));
/// assert!(version_hash("1.13.7-rc1") < version_hash("1.13.7"));
/// ```
pub fn version_hash(version: &str) -> String {
    let mut groups: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut suffix = String::new();
    let mut build = String::new();
    let mut phase = Phase::Groups;

    for c in version.trim().chars() {
        match phase {
            Phase::Groups => match c {
                '.' => groups.push(std::mem::take(&mut current)),
                '-' => {
                    groups.push(std::mem::take(&mut current));
                    phase = Phase::Suffix;
                }
                _ => current.push(c),
            },
            Phase::Suffix => {
                if c.is_ascii_digit() {
                    build.push(c);
                    phase = Phase::Build;
                } else {
                    suffix.push(c);
                }
            }
            Phase::Build => {
                if c.is_ascii_digit() {
                    build.push(c);
                }
            }
        }
    }
    if matches!(phase, Phase::Groups) && !current.is_empty() {
        groups.push(current);
    }

    let mut hash = String::with_capacity(HASH_WIDTH);
    for i in 0..GROUP_COUNT {
        match groups.get(i) {
            Some(g) => push_left_padded(&mut hash, g, GROUP_WIDTH),
            None => hash.extend(std::iter::repeat(' ').take(GROUP_WIDTH)),
        }
    }
    if suffix.is_empty() {
        hash.extend(std::iter::repeat(NO_SUFFIX_PAD).take(SUFFIX_WIDTH));
    } else {
        push_right_padded(&mut hash, &suffix, SUFFIX_WIDTH);
    }
    push_left_padded(&mut hash, &build, BUILD_WIDTH);
    hash
}

fn push_left_padded(out: &mut String, s: &str, width: usize) {
    let len = s.chars().count().min(width);
    out.extend(std::iter::repeat(' ').take(width - len));
    out.extend(s.chars().take(width));
}

fn push_right_padded(out: &mut String, s: &str, width: usize) {
    let len = s.chars().count().min(width);
    out.extend(s.chars().take(width));
    out.extend(std::iter::repeat(' ').take(width - len));
}
