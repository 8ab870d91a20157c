/// Get the first two comma separated fields of a string.
/// Anything after the second field is ignored.
pub fn first_two_fields(full_str: &str) -> Option<(&str, &str)> {
    let mut parts = full_str.split(',');

    let first = parts.next()?;
    let second = parts.next()?;

    Some((first, second))
}

/// Get the prefix made of the first `len` characters of a string
pub fn char_prefix(full_str: &str, len: usize) -> &str {
    match full_str.char_indices().nth(len) {
        Some((end, _)) => &full_str[..end],
        None => full_str,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_two_fields() {
        assert_eq!(first_two_fields("-41.2,174.7"), Some(("-41.2", "174.7")));
        assert_eq!(first_two_fields("-41.2,174.7,0"), Some(("-41.2", "174.7")));
        assert_eq!(first_two_fields("-41.2"), None);
        assert_eq!(first_two_fields(""), None);
    }

    #[test]
    fn test_char_prefix() {
        assert_eq!(char_prefix("WELL1", 4), "WELL");
        assert_eq!(char_prefix("WELL", 4), "WELL");
        assert_eq!(char_prefix("5A", 4), "5A");
    }
}
