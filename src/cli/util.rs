use crate::catalog::Choice;

/// Parse a yes/no answer; empty takes `default`.
#[must_use]
pub fn parse_confirm(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a 1-based menu pick into a 0-based index; empty takes `default`.
#[must_use]
pub fn parse_choice(answer: &str, len: usize, default: usize) -> Option<usize> {
    let answer = answer.trim();
    if answer.is_empty() {
        return (default < len).then_some(default);
    }
    match answer.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}

/// Parse a multi-select answer into 0-based indices, ascending.
///
/// - empty: the pre-checked choices
/// - `all`: every enabled choice
/// - `none`: nothing
/// - otherwise comma-separated 1-based numbers
///
/// # Errors
/// A message for unknown numbers or a disabled choice.
pub fn parse_selection(answer: &str, choices: &[Choice]) -> Result<Vec<usize>, String> {
    let answer = answer.trim();
    let enabled = |i: &usize| !choices[*i].disabled;
    match answer.to_ascii_lowercase().as_str() {
        "" => return Ok((0..choices.len()).filter(|i| choices[*i].checked && enabled(i)).collect()),
        "all" => return Ok((0..choices.len()).filter(enabled).collect()),
        "none" => return Ok(Vec::new()),
        _ => {}
    }
    let mut picked = Vec::new();
    for token in answer.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let n: usize = token.parse().map_err(|_| format!("'{token}' is not a number"))?;
        if n == 0 || n > choices.len() {
            return Err(format!("{n} is not between 1 and {}", choices.len()));
        }
        let choice = &choices[n - 1];
        if choice.disabled {
            return Err(format!("'{}' cannot be selected", choice.name));
        }
        picked.push(n - 1);
    }
    picked.sort_unstable();
    picked.dedup();
    Ok(picked)
}
