/// Split one line into fields on every occurrence of `delimiter`.
///
/// N delimiters always give N + 1 fields. Empty segments are kept, so
/// `",a,"` is `["", "a", ""]` and an empty line is a single empty field.
pub fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(str::to_owned).collect()
}

/// Remove a trailing `\n` or `\r\n` left by `BufRead::read_line`.
pub fn trim_line_terminator(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
