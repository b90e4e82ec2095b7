//! `smtfront`: runs an SMT-LIB v2 script through the front-end parser and
//! prints its command responses to stdout.
mod cli;

use std::fs::File;
use std::io;
use std::process::ExitCode;

use cli::Cli;
use log::error;
use smtlib_front::backend::test_backend::RecordingBackend;
use smtlib_front::Parser;

fn main() -> ExitCode {
    let args = Cli::init();
    simple_logger::init_with_level(args.verbosity.into()).unwrap();

    let file_name = args.file.to_string_lossy().into_owned();
    let mut input: Box<dyn io::Read> = match File::open(&args.file) {
        Ok(f) => Box::new(f),
        Err(e) => {
            error!("could not open '{file_name}': {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut parser = Parser::new(RecordingBackend::default(), file_name.clone());
    let mut stdout = io::stdout().lock();
    match parser.parse(&mut input, &file_name, &mut stdout) {
        Ok(outcome) => {
            log::info!("logic: {}, {} check-sat call(s)", outcome.logic, outcome.nsatcalls);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
