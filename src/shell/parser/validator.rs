use super::ParseError;

/// 在切分之前检查整行语法，命中的第一条规则即为结果
pub fn validate(line: &str) -> Result<(), ParseError> {
    let body = line.trim_matches(' ');

    match body.chars().next() {
        None | Some('|') | Some('>') => return Err(ParseError::MissingCommand),
        Some(_) => {}
    }

    match body.chars().last() {
        Some('|') => return Err(ParseError::MissingCommand),
        Some('>') => return Err(ParseError::NoOutputFile),
        _ => {}
    }

    // 出现 `>` 之后不能再接管道
    let mut redirecting = false;
    for c in body.chars() {
        match c {
            '>' => redirecting = true,
            '|' if redirecting => return Err(ParseError::MislocatedRedirection),
            _ => {}
        }
    }

    Ok(())
}
