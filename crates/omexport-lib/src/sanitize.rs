//! Filesystem-safe names for tracks and folders

/// Placeholder used when a name sanitizes to nothing
pub const NO_NAME: &str = "no name";

/// Replace characters that are illegal (or awkward) in file names
///
/// `/` and `\` become `--`, `:` becomes `-`, CR and LF become a space and `*`
/// becomes `+`. An empty result is replaced by [`NO_NAME`].
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '/' | '\\' => out.push_str("--"),
            ':' => out.push('-'),
            '\r' | '\n' => out.push(' '),
            '*' => out.push('+'),
            c => out.push(c),
        }
    }

    if out.is_empty() {
        NO_NAME.to_string()
    } else {
        out
    }
}
