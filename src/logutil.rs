//! Log rendering for rigctld traffic, one protocol exchange per log line.

use crate::rigctl::Response;

const MAX_LINE_CHARS: usize = 200;

/// A received rigctld line with its newline dropped and control characters made visible.
/// Runaway lines are cut at `MAX_LINE_CHARS` and end with `…`.
pub fn escape_line(line: &str) -> String {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let mut out = String::with_capacity(line.len().min(MAX_LINE_CHARS) + 4);
    for (i, ch) in line.chars().enumerate() {
        if i == MAX_LINE_CHARS {
            out.push('…');
            break;
        }
        match ch {
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            c if c.is_control() => out.extend(c.escape_unicode()),
            c => out.push(c),
        }
    }
    out
}

/// `RPRT <code> [datum, ...]`, each datum rendered with [`escape_line`].
pub fn describe_response(resp: &Response) -> String {
    let data: Vec<String> = resp.data.iter().map(|d| escape_line(d)).collect();
    format!("RPRT {} [{}]", resp.result, data.join(", "))
}
