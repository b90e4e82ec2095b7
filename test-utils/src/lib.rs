use std::error::Error;

use smtlib_front::backend::test_backend::RecordingBackend;
use smtlib_front::{ErrorKind, ParseOutcome, Parser};

pub struct Expected<'a> {
    pub stdout: &'a str,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, stdout: &str) -> Result<(), Box<dyn Error>> {
        assert_eq!(stdout, self.stdout);
        Ok(())
    }
}

fn run_script(src: &str) -> (Result<ParseOutcome, smtlib_front::ParseError>, String) {
    let mut parser = Parser::new(RecordingBackend::default(), "script.smt2");
    let mut input = src.as_bytes();
    let mut out = Vec::new();
    let result = parser.parse(&mut input, "script.smt2", &mut out);
    (result, String::from_utf8(out).expect("emitter output is always UTF-8"))
}

/// Runs `src` to completion and asserts its stdout matches `expected`.
pub fn check_script(src: &str, expected: Expected) -> Result<(), Box<dyn Error>> {
    let (result, stdout) = run_script(src);

    println!("{stdout}");
    expected.assert_matches(&stdout)?;
    assert!(result.is_ok(), "script failed: {}", result.err().unwrap());

    Ok(())
}

/// Runs `src` and asserts it fails with the given error kind, whatever
/// output was emitted before the failing command.
pub fn check_failing_script(src: &str, expected_kind: ErrorKind) -> Result<(), Box<dyn Error>> {
    let (result, stdout) = run_script(src);

    println!("{stdout}");
    match result {
        Ok(_) => panic!("expected the script to fail with {expected_kind:?}, but it succeeded"),
        Err(e) => assert_eq!(e.kind, expected_kind, "wrong error kind: {e}"),
    }

    Ok(())
}
