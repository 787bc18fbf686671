use std::io::{self, BufRead, Write};

/// Reads one line without its line break. Returns `None` at end of input.
pub fn read_line<R: BufRead>(mut stdin: R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(len);
    Ok(Some(line))
}

pub fn clear<W: Write>(stdout: &mut W) -> io::Result<()> {
    write!(stdout, "{esc}[2J{esc}[1;1H", esc = 27 as char)
}

pub fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[test]
fn test_read_line() {
    use std::io::Cursor;

    let mut stdin = Cursor::new(b"one\r\n\ntwo");
    assert_eq!(read_line(&mut stdin).unwrap().as_deref(), Some("one"));
    assert_eq!(read_line(&mut stdin).unwrap().as_deref(), Some(""));
    assert_eq!(read_line(&mut stdin).unwrap().as_deref(), Some("two"));
    assert_eq!(read_line(&mut stdin).unwrap(), None);
}
