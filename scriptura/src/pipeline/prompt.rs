//! Prompt assembly.
//!
//! One fixed instruction template, one render path. Both invocation modes
//! (whole-response and streaming) go through [`render_prompt`] so their
//! outputs differ only by delivery.

/// Instructions prepended to every question.
pub const ANSWER_INSTRUCTIONS: &str = "\
You are a scripture study assistant answering questions about the Bible.

Answer using only the passages provided below. Cite every passage you \
draw on by its reference in the form Book Chapter:Verse. If the passages \
do not contain enough information to answer, say so plainly instead of \
guessing. Present what the text says without advocating a doctrinal \
position, and keep a respectful tone throughout.";

/// Renders the full prompt for a question over a retrieved context block.
#[must_use]
pub fn render_prompt(context: &str, question: &str) -> String {
    format!("{ANSWER_INSTRUCTIONS}\n\nPassages:\n{context}\n\nQuestion: {question}\n\nAnswer:")
}

/// Renders one retrieved fragment as a context line.
#[must_use]
pub fn format_fragment(reference: &str, content: &str) -> String {
    format!("[{reference}] {content}")
}

/// Joins rendered fragments into the single context block handed to the
/// model: blank-line separated, in the order given.
#[must_use]
pub fn format_context<'a>(fragments: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    fragments
        .into_iter()
        .map(|(reference, content)| format_fragment(reference, content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_rendering_is_exact() {
        assert_eq!(
            format_fragment(
                "Genesis 1:1",
                "In the beginning God created the heaven and the earth."
            ),
            "[Genesis 1:1] In the beginning God created the heaven and the earth."
        );
    }

    #[test]
    fn context_joins_with_blank_lines_in_order() {
        let block = format_context([("Genesis 1:1", "first"), ("John 3:16", "second")]);
        assert_eq!(block, "[Genesis 1:1] first\n\n[John 3:16] second");
    }

    #[test]
    fn prompt_carries_context_question_and_citation_rules() {
        let prompt = render_prompt("[Genesis 1:1] text", "What was created?");
        assert!(prompt.contains("[Genesis 1:1] text"));
        assert!(prompt.contains("Question: What was created?"));
        assert!(prompt.contains("Book Chapter:Verse"));
        assert!(prompt.contains("do not contain enough information"));
    }
}
