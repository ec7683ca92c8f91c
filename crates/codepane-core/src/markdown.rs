//! Markdown helpers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening fence with an optional language tag, a body, and a closing fence
/// on its own line.
static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```[^\s`]*\n([\s\S]*?)\n```").expect("code block pattern is valid")
});

/// Returns the trimmed body of the first fenced code block in `markdown`.
///
/// Only the first block is considered. A block that is empty after trimming
/// counts as no block.
pub fn extract_first_code_block(markdown: &str) -> Option<String> {
    let captures = CODE_BLOCK.captures(markdown)?;
    let body = captures.get(1)?.as_str().trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_without_fences() {
        assert_eq!(extract_first_code_block("just some *markdown*"), None);
        assert_eq!(extract_first_code_block(""), None);
    }

    #[test]
    fn extracts_tagged_block() {
        let markdown = "Here you go:\n```rust\nfn main() {\n    println!(\"hi\");\n}\n```\nEnjoy.";
        assert_eq!(
            extract_first_code_block(markdown).as_deref(),
            Some("fn main() {\n    println!(\"hi\");\n}")
        );
    }

    #[test]
    fn extracts_untagged_block_and_trims() {
        let markdown = "```\n\n  let x = 1;  \n\n```";
        assert_eq!(extract_first_code_block(markdown).as_deref(), Some("let x = 1;"));
    }

    #[test]
    fn accepts_tags_with_punctuation() {
        let markdown = "```c++\nint main() {}\n```";
        assert_eq!(extract_first_code_block(markdown).as_deref(), Some("int main() {}"));
    }

    #[test]
    fn only_first_of_two_blocks() {
        let markdown = "```js\nfirst()\n```\ntext\n```py\nsecond()\n```";
        assert_eq!(extract_first_code_block(markdown).as_deref(), Some("first()"));
    }

    #[test]
    fn rerunning_on_output_finds_nothing() {
        let markdown = "```sh\necho hi\n```";
        let code = extract_first_code_block(markdown).unwrap();
        assert_eq!(extract_first_code_block(&code), None);
        // Same input, same answer.
        assert_eq!(extract_first_code_block(markdown), Some(code));
    }

    #[test]
    fn empty_block_is_none() {
        assert_eq!(extract_first_code_block("```\n   \n```"), None);
    }

    #[test]
    fn unterminated_block_is_none() {
        assert_eq!(extract_first_code_block("```rust\nfn main() {}"), None);
    }
}
