use std::process::ExitCode;

use scoped_tree::output as out;
use scoped_tree::OperationError;

mod app;
mod cli;
mod logging;

fn main() -> ExitCode {
    let args = cli::parse();
    match app::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<OperationError>() {
            Some(op_err) => {
                out::print_error(&op_err.to_string());
                ExitCode::from(u8::try_from(op_err.code()).unwrap_or(1))
            }
            None => {
                out::print_error(&format!("{e:#}"));
                ExitCode::FAILURE
            }
        },
    }
}
