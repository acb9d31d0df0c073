//! Outbound message formatting helpers.

/// Telegram caps messages at 4096 characters; stay under it with margin.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4000;

/// Splits `text` into chunks that fit a single Telegram message,
/// preferring newline boundaries and hard-splitting oversized lines.
pub fn chunk_message(text: &str, max_length: usize) -> Vec<String> {
    if max_length == 0 {
        return vec![String::new()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        let line_chars: Vec<char> = line.chars().collect();

        if line_chars.len() > max_length {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let mut start = 0;
            while start < line_chars.len() {
                let end = (start + max_length).min(line_chars.len());
                chunks.push(line_chars[start..end].iter().collect());
                start = end;
            }
            continue;
        }

        // +1 for the newline separator we would reinsert.
        if !current.is_empty() && current.chars().count() + 1 + line_chars.len() > max_length {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(chunk_message("hello", 100), vec!["hello".to_string()]);
    }

    #[test]
    fn groups_lines_up_to_the_limit() {
        let chunks = chunk_message("first\nsecond\nthird", 12);
        assert_eq!(chunks, vec!["first\nsecond".to_string(), "third".to_string()]);
    }

    #[test]
    fn hard_splits_oversized_lines() {
        let chunks = chunk_message("abcdef", 2);
        assert_eq!(
            chunks,
            vec!["ab".to_string(), "cd".to_string(), "ef".to_string()]
        );
    }

    #[test]
    fn every_chunk_fits_the_limit() {
        let text = "line one\nline two is a bit longer\nshort\n".repeat(50);
        for chunk in chunk_message(&text, 40) {
            assert!(chunk.chars().count() <= 40);
        }
    }

    #[test]
    fn zero_limit_yields_one_empty_chunk() {
        assert_eq!(chunk_message("anything", 0), vec![String::new()]);
    }
}
