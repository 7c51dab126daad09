//! Fenced code-block extraction from model output.
//!
//! The model is instructed to put executable code in triple-backtick
//! fences. Extraction preserves source order; an unterminated fence is
//! ignored rather than swallowing the rest of the response.

/// Extract fenced code blocks from `text`, in source order.
///
/// A fence opens with a line starting with ``` (any language tag after the
/// backticks is discarded) and closes at the next line starting with ```.
pub fn find_code_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            match current.take() {
                Some(lines) => blocks.push(lines.join("\n")),
                None => current = Some(Vec::new()),
            }
        } else if let Some(lines) = current.as_mut() {
            lines.push(line);
        }
    }

    // An open fence without a closer is dropped here.
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_blocks_in_prose() {
        let blocks = find_code_blocks("Just a plain answer with no code.");
        assert!(blocks.is_empty());
    }

    #[test]
    fn single_block_with_language_tag() {
        let text = "Let me check:\n```python\nprint(context[:100])\n```\nDone.";
        let blocks = find_code_blocks(text);
        assert_eq!(blocks, vec!["print(context[:100])"]);
    }

    #[test]
    fn multiple_blocks_preserve_source_order() {
        let text = "\
First:
```python
a = 1
```
Then:
```python
print(a)
```";
        let blocks = find_code_blocks(text);
        assert_eq!(blocks, vec!["a = 1", "print(a)"]);
    }

    #[test]
    fn multiline_block_content_kept_verbatim() {
        let text = "```\nfor i in range(3):\n    print(i)\n```";
        let blocks = find_code_blocks(text);
        assert_eq!(blocks, vec!["for i in range(3):\n    print(i)"]);
    }

    #[test]
    fn unterminated_fence_is_ignored() {
        let text = "```python\nprint('no closer')";
        let blocks = find_code_blocks(text);
        assert!(blocks.is_empty());
    }

    #[test]
    fn empty_block_extracts_empty_string() {
        let blocks = find_code_blocks("```\n```");
        assert_eq!(blocks, vec![""]);
    }
}
