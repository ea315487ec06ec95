use crate::error::{CertSplitError, Result};
use console::Term;

/// Ask for the course code on the terminal. An empty answer keeps `default`.
pub fn ask_course_code(default: &str) -> Result<String> {
    let term = Term::stderr();
    if !term.features().is_attended() {
        tracing::debug!("no terminal attached, keeping course code from roster");
        return Ok(default.to_string());
    }

    term.write_str(&format!("Course code [{}]: ", default))?;
    let answer = term.read_line().map_err(|e| CertSplitError::Config {
        message: format!("Failed to read course code: {}", e),
    })?;

    Ok(choose_course_code(&answer, default))
}

fn choose_course_code(answer: &str, default: &str) -> String {
    match answer.trim() {
        "" => default.to_string(),
        code => code.to_string(),
    }
}
