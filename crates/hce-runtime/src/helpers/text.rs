use std::sync::OnceLock;

use hce_core::{Bindings, DeepLinkConfig};
use regex::Regex;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder regex must compile")
    })
}

/// Replaces `{name}` placeholders with bindings; unknown names become empty.
/// Names are ASCII word characters only.
pub fn interpolate(template: &str, bindings: &Bindings) -> String {
    let mut output = String::new();
    let mut last_index = 0usize;
    for captures in placeholder_regex().captures_iter(template) {
        let (Some(full), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        output.push_str(&template[last_index..full.start()]);
        if let Some(value) = bindings.get(name.as_str()) {
            output.push_str(value);
        }
        last_index = full.end();
    }
    output.push_str(&template[last_index..]);
    output
}

pub fn build_deep_link(config: &DeepLinkConfig, bindings: &Bindings) -> String {
    let text = interpolate(&config.template, bindings);
    format!(
        "{}/{}?text={}",
        config.base_url.trim_end_matches('/'),
        config.phone_number,
        urlencoding::encode(&text)
    )
}

#[cfg(test)]
mod text_tests {
    use super::*;

    fn bindings(entries: &[(&str, &str)]) -> Bindings {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn interpolate_substitutes_known_bindings() {
        assert_eq!(
            interpolate("Olá {userName}", &bindings(&[("userName", "Ana")])),
            "Olá Ana"
        );
    }

    #[test]
    fn interpolate_renders_missing_bindings_as_empty() {
        assert_eq!(interpolate("Olá {userName}", &Bindings::new()), "Olá ");
        assert_eq!(
            interpolate("{a}-{b}-{a}", &bindings(&[("a", "x")])),
            "x--x"
        );
    }

    #[test]
    fn interpolate_leaves_non_word_braces_untouched() {
        assert_eq!(
            interpolate("{not a key} {}", &Bindings::new()),
            "{not a key} {}"
        );
    }

    #[test]
    fn interpolate_ignores_non_ascii_placeholder_names() {
        assert_eq!(
            interpolate("Olá {nomeÇ}", &bindings(&[("nomeÇ", "X")])),
            "Olá {nomeÇ}"
        );
    }

    #[test]
    fn deep_link_encodes_the_templated_message() {
        let link = build_deep_link(
            &DeepLinkConfig::default(),
            &bindings(&[("userName", "Ana"), ("projectInfo", "Janela & porta")]),
        );
        assert!(link.starts_with("https://wa.me/5561993619554?text="));
        assert!(link.contains("Ana"));
        assert!(link.contains("Janela%20%26%20porta"));
        assert!(!link.contains(' '));
    }

    #[test]
    fn deep_link_uses_empty_strings_for_missing_bindings() {
        let link = build_deep_link(&DeepLinkConfig::default(), &Bindings::new());
        let expected_text = urlencoding::encode("Olá! Meu nome é  e gostaria de falar sobre: ");
        assert_eq!(
            link,
            format!("https://wa.me/5561993619554?text={}", expected_text)
        );
    }
}
