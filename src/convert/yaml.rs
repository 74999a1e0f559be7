/// Render text as a single-line, double-quoted YAML scalar.
///
/// Backslashes and quotes are escaped, line breaks collapse to single spaces and
/// the result is trimmed before quoting.
pub fn double_quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let joined = escaped.lines().collect::<Vec<_>>().join(" ");
    format!("\"{}\"", joined.trim())
}
