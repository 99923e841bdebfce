/// Greedy word wrap. `measure` returns the rendered width of a candidate line.
///
/// A word wider than `max_width` still gets a line of its own; empty lines
/// are never produced.
pub fn wrap_words<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", line, word);
        if measure(&candidate) <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
