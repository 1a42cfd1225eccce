//! Interactive confirmation on a terminal

use dialoguer::Confirm;

use shipit_core::ShipitError;
use shipit_pipeline::Prompt;

/// Prompt that asks through `dialoguer`, waiting for Enter
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> shipit_core::Result<bool> {
        let answer = Confirm::new()
            .with_prompt(question)
            .default(false)
            .wait_for_newline(true)
            .interact_opt()
            .map_err(prompt_error)?;
        Ok(answer.unwrap_or(false))
    }
}

fn prompt_error(error: dialoguer::Error) -> ShipitError {
    ShipitError::Io(std::io::Error::other(error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_failure_is_io_error() {
        let err = prompt_error(dialoguer::Error::from(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stdin closed",
        )));
        match err {
            ShipitError::Io(io) => assert!(io.to_string().contains("stdin closed")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
