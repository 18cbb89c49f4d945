use std::fs;
use std::io::Read;

use tracing::debug;

use crate::error::{Error, Result};

pub fn read_all<R: Read>(mut reader: R) -> Result<String> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer).map_err(Error::Input)?;

    let text = String::from_utf8_lossy(&buffer);
    Ok(text.lines().collect::<Vec<_>>().join("\n"))
}

/// Priority: the `--ques` flag (plus any piped content), then positional
/// arguments joined with spaces, then the whole of stdin.
pub fn assemble_query<R: Read>(
    flag: Option<&str>,
    args: &[String],
    stdin: R,
    stdin_is_terminal: bool,
) -> Result<String> {
    if let Some(question) = flag.filter(|question| !question.is_empty()) {
        if stdin_is_terminal {
            return Ok(question.to_string());
        }
        let piped = read_all(stdin)?;
        return Ok(append_piped(question, &piped));
    }

    if !args.is_empty() {
        debug!(arg_count = args.len(), "using positional arguments as query");
        return Ok(args.join(" "));
    }

    debug!("reading query from standard input");
    read_all(stdin)
}

fn append_piped(question: &str, piped: &str) -> String {
    if piped.is_empty() {
        return question.to_string();
    }

    if !piped.contains('\n') {
        let path = piped.trim();
        if let Ok(bytes) = fs::read(path) {
            debug!(path = %path, bytes = bytes.len(), "attaching piped file contents");
            let contents = String::from_utf8_lossy(&bytes);
            return format!("{question}\nFile contents:\n{contents}");
        }
    }

    format!("{question}\nPiped input:\n{piped}")
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{self, Cursor, Read};

    use super::{assemble_query, read_all};
    use crate::error::Error;

    // Fails the test if the code under test touches stdin.
    struct UntouchedStdin;

    impl Read for UntouchedStdin {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            panic!("stdin should not be read");
        }
    }

    struct BrokenStdin;

    impl Read for BrokenStdin {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("stdin closed"))
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn flag_alone_on_terminal_is_used_verbatim() {
        let query = assemble_query(Some("Explain Rust"), &[], UntouchedStdin, true)
            .expect("query should assemble");
        assert_eq!(query, "Explain Rust");
    }

    #[test]
    fn flag_takes_priority_over_positional_args() {
        let query = assemble_query(
            Some("from flag"),
            &args(&["from", "args"]),
            UntouchedStdin,
            true,
        )
        .expect("query should assemble");
        assert_eq!(query, "from flag");
    }

    #[test]
    fn flag_with_multiline_pipe_appends_piped_input() {
        let query = assemble_query(
            Some("Summarize"),
            &[],
            Cursor::new("first line\r\nsecond line\n"),
            false,
        )
        .expect("query should assemble");
        assert_eq!(query, "Summarize\nPiped input:\nfirst line\nsecond line");
    }

    #[test]
    fn flag_with_piped_file_name_appends_file_contents() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("notes.txt");
        fs::write(&path, "alpha\nbeta\n").expect("fixture should be written");

        let query = assemble_query(
            Some("Analyze this file"),
            &[],
            Cursor::new(format!("  {}  \n", path.display())),
            false,
        )
        .expect("query should assemble");
        assert_eq!(query, "Analyze this file\nFile contents:\nalpha\nbeta\n");
    }

    #[test]
    fn piped_file_with_invalid_utf8_is_still_attached() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"caf\xe9 menu").expect("fixture should be written");

        let query = assemble_query(
            Some("Analyze"),
            &[],
            Cursor::new(path.display().to_string()),
            false,
        )
        .expect("query should assemble");
        assert_eq!(query, "Analyze\nFile contents:\ncaf\u{fffd} menu");
    }

    #[test]
    fn flag_with_single_line_that_is_not_a_file_appends_it_as_text() {
        let query = assemble_query(
            Some("Translate"),
            &[],
            Cursor::new("bonjour le monde\n"),
            false,
        )
        .expect("query should assemble");
        assert_eq!(query, "Translate\nPiped input:\nbonjour le monde");
    }

    #[test]
    fn flag_with_empty_pipe_is_unchanged() {
        let query = assemble_query(Some("Hi"), &[], Cursor::new(""), false)
            .expect("query should assemble");
        assert_eq!(query, "Hi");
    }

    #[test]
    fn positional_args_are_joined_with_spaces() {
        let query = assemble_query(None, &args(&["How", "are", "you?"]), UntouchedStdin, false)
            .expect("query should assemble");
        assert_eq!(query, "How are you?");
    }

    #[test]
    fn empty_flag_falls_through_to_args() {
        let query = assemble_query(Some(""), &args(&["fallback"]), UntouchedStdin, false)
            .expect("query should assemble");
        assert_eq!(query, "fallback");
    }

    #[test]
    fn stdin_is_used_when_nothing_else_is_given() {
        let query = assemble_query(None, &[], Cursor::new("line a\nline b\n"), false)
            .expect("query should assemble");
        assert_eq!(query, "line a\nline b");
    }

    #[test]
    fn empty_sources_produce_empty_query() {
        let query =
            assemble_query(None, &[], Cursor::new(""), false).expect("query should assemble");
        assert!(query.is_empty());
    }

    #[test]
    fn stdin_read_failure_is_input_error() {
        let err = assemble_query(None, &[], BrokenStdin, false).expect_err("read should fail");
        assert!(matches!(err, Error::Input(_)), "got {err:?}");
    }

    #[test]
    fn read_all_decodes_invalid_utf8_lossily() {
        let text = read_all(Cursor::new(b"ok \xff".to_vec())).expect("read should succeed");
        assert_eq!(text, "ok \u{fffd}");
    }
}
