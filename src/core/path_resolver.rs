use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use tracing::debug;

/// Windows extended path prefix
const EXTENDED_PATH_PREFIX: &str = r"\\?\";

/// Windows extended UNC prefix
const EXTENDED_UNC_PREFIX: &str = r"\\?\UNC\";

/// A path split into its root text, volume identity and components.
///
/// Parsing is purely textual so that drive-letter and UNC paths resolve the
/// same way regardless of the host platform.
struct ParsedPath<'a> {
    /// Original text up to the first component (`C:\`, `\\server\share\`, `/`)
    root: &'a str,
    /// Lowercased volume identity (`c:`, `\\server\share`, empty for POSIX roots)
    volume: String,
    components: Vec<&'a str>,
    separator: char,
}

impl<'a> ParsedPath<'a> {
    fn parse(path: &'a str) -> Self {
        let (root_len, volume) = split_root(path);
        let components = path[root_len..]
            .split(is_separator)
            .filter(|c| !c.is_empty())
            .collect();

        Self {
            root: &path[..root_len],
            volume,
            components,
            separator: detect_separator(path),
        }
    }

    fn same_volume(&self, other: &ParsedPath<'_>) -> bool {
        self.volume == other.volume
    }

    /// Number of leading components shared with `other`
    fn matching_components(&self, other: &ParsedPath<'_>) -> usize {
        self.components
            .iter()
            .zip(&other.components)
            .take_while(|(a, b)| eq_ignore_case(a, b))
            .count()
    }

    fn starts_with(&self, ancestor: &ParsedPath<'_>) -> bool {
        self.same_volume(ancestor)
            && ancestor.components.len() <= self.components.len()
            && self.matching_components(ancestor) == ancestor.components.len()
    }

    fn rejoin(&self, count: usize) -> String {
        let mut out = self.root.to_string();
        for component in &self.components[..count] {
            push_segment(&mut out, component, self.separator);
        }
        out
    }
}

fn is_separator(c: char) -> bool {
    c == '\\' || c == '/'
}

fn is_separator_byte(b: u8) -> bool {
    b == b'\\' || b == b'/'
}

/// Use whichever separator the path already uses, falling back to the host's
fn detect_separator(path: &str) -> char {
    path.chars().find(|c| is_separator(*c)).unwrap_or(MAIN_SEPARATOR)
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Returns the byte length of the root text and the normalized volume identity
fn split_root(path: &str) -> (usize, String) {
    if let Some(rest) = path.strip_prefix(EXTENDED_UNC_PREFIX) {
        let (len, volume) = unc_share(rest);
        return (EXTENDED_UNC_PREFIX.len() + len, volume);
    }

    if let Some(rest) = path.strip_prefix(EXTENDED_PATH_PREFIX) {
        let (len, volume) = drive(rest).unwrap_or((0, String::new()));
        return (EXTENDED_PATH_PREFIX.len() + len, volume);
    }

    if let Some(found) = drive(path) {
        return found;
    }

    let bytes = path.as_bytes();
    if bytes.len() >= 2 && is_separator_byte(bytes[0]) && is_separator_byte(bytes[1]) {
        let (len, volume) = unc_share(&path[2..]);
        return (2 + len, volume);
    }

    if bytes.first().is_some_and(|b| is_separator_byte(*b)) {
        return (1, String::new());
    }

    (0, String::new())
}

fn drive(path: &str) -> Option<(usize, String)> {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let len = if bytes.get(2).is_some_and(|b| is_separator_byte(*b)) { 3 } else { 2 };
        Some((len, path[..2].to_ascii_lowercase()))
    } else {
        None
    }
}

/// `rest` starts right after the leading `\\`; server and share form the volume
fn unc_share(rest: &str) -> (usize, String) {
    let bytes = rest.as_bytes();
    let mut end = 0;

    for _ in 0..2 {
        while end < bytes.len() && !is_separator_byte(bytes[end]) {
            end += 1;
        }
        if end < bytes.len() {
            end += 1;
        }
    }

    let share = rest[..end]
        .trim_end_matches(is_separator)
        .replace('/', "\\")
        .to_lowercase();

    (end, format!(r"\\{}", share))
}

fn push_segment(out: &mut String, segment: &str, separator: char) {
    if segment.is_empty() {
        return;
    }
    if !out.is_empty() && !out.ends_with(is_separator) {
        out.push(separator);
    }
    out.push_str(segment);
}

/// Longest run of leading components shared by two paths on the same volume.
///
/// Components compare case-insensitively. The result keeps the casing of `a`
/// and is empty when the volumes differ or not even the first component matches.
pub fn common_prefix(a: &str, b: &str) -> String {
    let pa = ParsedPath::parse(a);
    let pb = ParsedPath::parse(b);

    if !pa.same_volume(&pb) {
        return String::new();
    }

    match pa.matching_components(&pb) {
        0 => String::new(),
        matched => pa.rejoin(matched),
    }
}

/// Components of `source_dir` below `prefix`, never starting with a separator.
///
/// An empty prefix strips only the volume root.
pub fn relative_path(source_dir: &str, prefix: &str) -> String {
    let source = ParsedPath::parse(source_dir);

    let skip = if prefix.is_empty() {
        0
    } else {
        let prefix_path = ParsedPath::parse(prefix);
        if source.starts_with(&prefix_path) {
            prefix_path.components.len()
        } else {
            debug!("{:?} is not a prefix of {:?}, keeping full path", prefix, source_dir);
            0
        }
    };

    let separator = source.separator.to_string();
    source.components[skip..].join(separator.as_str())
}

/// Append a relative path to `base` using the separator `base` already uses
pub fn join_path(base: &str, relative: &str) -> String {
    let separator = detect_separator(base);
    let mut out = base.to_string();
    for segment in relative.split(is_separator) {
        push_segment(&mut out, segment, separator);
    }
    out
}

/// Split a path into its containing directory and final component
fn split_leaf(path: &str) -> (String, &str) {
    let parsed = ParsedPath::parse(path);
    match parsed.components.last() {
        Some(leaf) => (parsed.rejoin(parsed.components.len() - 1), *leaf),
        None => (path.to_string(), ""),
    }
}

/// Where `source` lands under `destination`.
///
/// The part of the source's parent directory that diverges from the
/// destination is recreated under it, followed by the source's own name.
/// Pure; both the subtree guard and the copy pass call it.
pub fn resolve_target(source: &Path, destination: &Path) -> PathBuf {
    let source = source.to_string_lossy();
    let destination = destination.to_string_lossy();

    let (parent, leaf) = split_leaf(&source);
    let prefix = common_prefix(&parent, &destination);
    let relative = relative_path(&parent, &prefix);

    debug!(
        "Source: {} | common prefix: {:?} | relative path: {:?}",
        source, prefix, relative
    );

    let mut target = join_path(&destination, &relative);
    push_segment(&mut target, leaf, detect_separator(&destination));
    PathBuf::from(target)
}

/// Case-insensitive, component-wise path equality
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    let a = a.to_string_lossy();
    let b = b.to_string_lossy();
    let pa = ParsedPath::parse(&a);
    let pb = ParsedPath::parse(&b);

    pa.components.len() == pb.components.len() && pa.starts_with(&pb)
}

/// True when `path` lies strictly below `ancestor`, compared component by component
pub fn is_strict_descendant(path: &Path, ancestor: &Path) -> bool {
    let path = path.to_string_lossy();
    let ancestor = ancestor.to_string_lossy();
    let pp = ParsedPath::parse(&path);
    let pa = ParsedPath::parse(&ancestor);

    pp.components.len() > pa.components.len() && pp.starts_with(&pa)
}

/// Path length in UTF-16 code units, the unit of the Windows MAX_PATH ceiling
pub fn path_length(path: &Path) -> usize {
    path.as_os_str().to_string_lossy().encode_utf16().count()
}
