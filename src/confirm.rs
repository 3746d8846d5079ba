use std::io::{self, BufRead, Write};

/// Yes/no gate in front of irreversible steps.
///
/// The binaries wire this to standard input; engine tests substitute a
/// canned answer.
pub trait Confirm {
    /// Present `prompt` and report whether the operator agreed.
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Prompts on stdout and reads the answer from stdin. Only an explicit
/// `y` or `Y` counts as agreement.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        let answer = answer.trim_end_matches(['\r', '\n']);
        Ok(answer.eq_ignore_ascii_case("y"))
    }
}

/// Fixed answer, for forced runs and tests.
pub struct Assume(pub bool);

impl Confirm for Assume {
    fn confirm(&mut self, _prompt: &str) -> io::Result<bool> {
        Ok(self.0)
    }
}
