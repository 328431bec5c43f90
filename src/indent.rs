//! Re-indents animation scopes in an object file for reading.
//!
//! Not a validator: unbalanced input simply renders at column zero once the
//! level drops below it.

pub const DEFAULT_STEP: usize = 4;

const BEGIN: &str = "ANIM_begin";
const END: &str = "ANIM_end";

pub fn reindent<S: AsRef<str>>(lines: &[S], step: usize) -> Vec<String> {
    let mut level: i64 = 0;
    let step = step as i64;
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let line = line.as_ref();
        if line.contains(BEGIN) {
            out.push(prefixed(level, line));
            level += step;
        } else if line.contains(END) {
            level -= step;
            out.push(prefixed(level, line));
        } else {
            out.push(prefixed(level, line));
        }
    }

    out
}

/// Convenience over whole text; line terminators are preserved
pub fn reindent_text(text: &str, step: usize) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    reindent(&lines, step).concat()
}

fn prefixed(level: i64, line: &str) -> String {
    let width = level.max(0) as usize;
    format!("{:width$}{}", "", line, width = width)
}
