pub const CHAT_SYSTEM: &str = include_str!("../data/prompts/chat_system.txt");
pub const STORY_GENERATION: &str = include_str!("../data/prompts/story_generation.txt");
pub const STORY_CONTINUATION: &str = include_str!("../data/prompts/story_continuation.txt");
pub const SPEECH: &str = include_str!("../data/prompts/speech.txt");

/// Prebuilt voice used for every read-aloud request.
pub const SPEECH_VOICE: &str = "Kore";

/// Replace `{{key}}` placeholders in a template string.
///
/// Placeholders are resolved in a single pass over the template, so
/// substituted values are never scanned again. Unknown keys are left as is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let key = &after[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}

pub fn story_generation(genre: &str, style: &str) -> String {
    render(STORY_GENERATION, &[("genre", genre), ("style", style)])
}

pub fn story_continuation(story_so_far: &str, genre: &str, style: &str) -> String {
    render(
        STORY_CONTINUATION,
        &[("story", story_so_far), ("genre", genre), ("style", style)],
    )
}

pub fn speech(text: &str) -> String {
    render(SPEECH, &[("text", text)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(!CHAT_SYSTEM.is_empty());
        assert!(!STORY_GENERATION.is_empty());
        assert!(!STORY_CONTINUATION.is_empty());
        assert!(!SPEECH.is_empty());
    }

    #[test]
    fn test_chat_system_is_friendly_assistant() {
        assert!(CHAT_SYSTEM.contains("friendly and helpful assistant"));
    }

    #[test]
    fn test_story_generation_has_placeholders() {
        assert!(STORY_GENERATION.contains("{{genre}}"));
        assert!(STORY_GENERATION.contains("{{style}}"));
    }

    #[test]
    fn test_story_generation_mentions_genre_style_and_prompts() {
        let prompt = story_generation("Mystery", "Minimalist");
        assert!(prompt.contains("Mystery"));
        assert!(prompt.contains("Minimalist"));
        assert!(prompt.contains("3 to 5"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_story_continuation_quotes_story_verbatim() {
        let story = "The fog rolled in.\n\nA door creaked open.";
        let prompt = story_continuation(story, "Mystery", "Minimalist");
        assert!(prompt.contains(&format!("\"\"\"\n{}\n\"\"\"", story)));
        assert!(prompt.contains("Mystery"));
        assert!(prompt.contains("Minimalist"));
        assert!(prompt.contains("Do not repeat"));
    }

    #[test]
    fn test_story_continuation_leaves_braces_in_story_untouched() {
        let story = "She wrote {{genre}} on the wall.";
        let prompt = story_continuation(story, "Horror", "Gothic");
        assert!(prompt.contains("She wrote {{genre}} on the wall."));
    }

    #[test]
    fn test_render_leaves_unknown_and_unclosed_placeholders() {
        assert_eq!(render("{{a}} {{b}}", &[("a", "x")]), "x {{b}}");
        assert_eq!(render("open {{a", &[("a", "x")]), "open {{a");
    }

    #[test]
    fn test_story_continuation_does_not_expand_placeholders_in_genre_or_style() {
        let story = "The lamp went out.";
        let prompt = story_continuation(story, "{{story}}", "{{genre}}");
        assert_eq!(prompt.matches(story).count(), 1);
        assert!(prompt.contains("{{story}}"));
        assert!(prompt.contains("{{genre}}"));

        let opening = story_generation("{{style}}", "Gothic");
        assert!(opening.contains("{{style}}"));
        assert!(opening.contains("Gothic"));
    }

    #[test]
    fn test_speech_wraps_text() {
        assert_eq!(
            speech("Once upon a time."),
            "Say with a dramatic, narrative tone: Once upon a time."
        );
    }
}
