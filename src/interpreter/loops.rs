//! Brace matching for the C-like `while` loop.
//!
//! The C-like stepper has no AST, so loop structure is recovered from braces:
//! - [`skip_loop_body`]: a false head jumps forward past its matching `}`
//! - [`find_loop_head`]: a `}` scans backward for the line that opened it
//!
//! Braces are counted per character. Braces inside string/character literals
//! and after a `//` comment marker do not count.

/// Net brace depth change of one line as `(opens, closes)`
pub fn brace_counts(line: &str) -> (usize, usize) {
    let mut opens = 0;
    let mut closes = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '/' if chars.peek() == Some(&'/') => break,
            '{' => opens += 1,
            '}' => closes += 1,
            _ => {}
        }
    }

    (opens, closes)
}

/// `opens - closes` for one line
pub fn brace_delta(line: &str) -> isize {
    let (opens, closes) = brace_counts(line);
    opens as isize - closes as isize
}

/// Index of the first line after the body of the loop opened at `head_idx`.
///
/// Depth starts at 1 inside the body and the skip stops on the line that
/// brings it back to 0. An unterminated body skips to the end of the source.
pub fn skip_loop_body(lines: &[&str], head_idx: usize) -> usize {
    let mut depth: isize = 1;
    let mut idx = head_idx + 1;

    while idx < lines.len() && depth > 0 {
        depth += brace_delta(lines[idx]);
        idx += 1;
    }

    idx
}

/// Line that opened the block closed at `close_idx`, if any.
///
/// Scans backward with depth 1; the first line that brings the depth to 0 owns
/// the brace. The caller decides whether that line is a loop head.
pub fn find_loop_head(lines: &[&str], close_idx: usize) -> Option<usize> {
    let mut depth: isize = 1;

    for idx in (0..close_idx.min(lines.len())).rev() {
        let (opens, closes) = brace_counts(lines[idx]);
        depth += closes as isize;
        depth -= opens as isize;
        if depth <= 0 {
            return Some(idx);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &[&str] = &[
        "int i = 0;",             // 0
        "while (i < 3) {",        // 1
        "    if (i == 1) {",      // 2
        "        cout << \"}\";", // 3
        "    }",                  // 4
        "    i++;",               // 5
        "}",                      // 6
        "cout << i;",             // 7
    ];

    #[test]
    fn test_brace_counts_skip_literals_and_comments() {
        assert_eq!(brace_counts("while (i < 3) {"), (1, 0));
        assert_eq!(brace_counts("cout << \"{\" << '}';"), (0, 0));
        assert_eq!(brace_counts("} // }"), (0, 1));
        assert_eq!(brace_delta("} else {"), 0);
    }

    #[test]
    fn test_skip_loop_body() {
        assert_eq!(skip_loop_body(PROGRAM, 1), 7);
        assert_eq!(skip_loop_body(&["while (i < 1) {", "i++;"], 0), 2);
    }

    #[test]
    fn test_find_loop_head() {
        assert_eq!(find_loop_head(PROGRAM, 6), Some(1));
        assert_eq!(find_loop_head(PROGRAM, 4), Some(2));
        assert_eq!(find_loop_head(&["}"], 0), None);
    }
}
