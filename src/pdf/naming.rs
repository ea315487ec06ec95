fn is_safe_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ')
}

/// Strip everything except word characters, hyphen, underscore, period and space,
/// then trim surrounding whitespace. Applying it twice gives the same result.
pub fn sanitize_name(name: &str) -> String {
    let kept: String = name.chars().filter(|c| is_safe_char(*c)).collect();
    kept.trim().to_string()
}

/// `{name}_{course_code}_{label}.{extension}`.
///
/// The course code goes through [`sanitize_name`] as well as the participant name, so a
/// code such as `CS/101` cannot introduce a path separator; it becomes `CS101`.
pub fn output_file_name(name: &str, course_code: &str, label: &str, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        sanitize_name(name),
        sanitize_name(course_code),
        label,
        extension
    )
}
