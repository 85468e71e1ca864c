/// Turn a display name into a URL-safe slug.
///
/// ASCII letters, digits and `_` are kept (lowercased). Whitespace and `-`
/// runs collapse into one `-`. Anything else is dropped.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if (c.is_whitespace() || c == '-') && !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    out.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Slug for a menu item: the item name qualified by its category.
pub fn menu_item_slug(name: &str, category_slug: &str) -> String {
    slugify(&format!("{name}-{category_slug}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_dashes_words() {
        assert_eq!(slugify("Wood Fired Pizza"), "wood-fired-pizza");
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(slugify("  Fish -- & Chips  "), "fish-chips");
    }

    #[test]
    fn keeps_underscores_but_trims_them_at_edges() {
        assert_eq!(slugify("_daily_special_"), "daily_special");
    }

    #[test]
    fn drops_non_ascii_and_punctuation() {
        assert_eq!(slugify("Crème brûlée!"), "crme-brle");
    }

    #[test]
    fn item_slug_includes_category() {
        assert_eq!(menu_item_slug("Margherita", "pizza"), "margherita-pizza");
    }
}
