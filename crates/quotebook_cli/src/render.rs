//! Plain-text rendering for CLI output.
//!
//! # Responsibility
//! - Turn core views and events into terminal lines.
//! - Stay free of state; every function is a pure formatter.

use quotebook_core::{display_category, AppEvent, CategoryFilter, Notice, NoticeLevel, Quote};

/// Renders the visible list, or the empty-category message.
pub fn quote_list(filter: &CategoryFilter, quotes: &[Quote]) -> String {
    if quotes.is_empty() {
        return format!("No quotes found for category: {filter}.");
    }
    quotes
        .iter()
        .map(|quote| format!("- {}", quote_line(quote)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn quote_line(quote: &Quote) -> String {
    format!("\"{}\" - ({})", quote.text, quote.category)
}

/// Renders the category selector, marking the active entry.
pub fn category_list(categories: &[String], active: &CategoryFilter) -> String {
    categories
        .iter()
        .map(|category| {
            let marker = if category == active.as_str() { '*' } else { ' ' };
            format!("{marker} {}", display_category(category))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn random_pick(filter: &CategoryFilter, picked: Option<&Quote>) -> String {
    match picked {
        Some(quote) => format!("Random Quote ({}): \"{}\"", quote.category, quote.text),
        None => format!("No quotes available in category: {filter}."),
    }
}

pub fn notice(notice: &Notice) -> String {
    let label = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    };
    format!("[{label}] {}", notice.message)
}

/// Renders events worth showing; change events are silent.
pub fn event(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::Notice(value) => Some(notice(value)),
        AppEvent::FilterChanged { filter } => Some(format!("[info] Filter set to {filter}.")),
        AppEvent::QuotesChanged { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{category_list, quote_list, random_pick};
    use quotebook_core::{CategoryFilter, Quote};

    #[test]
    fn empty_list_names_the_filter() {
        let filter = CategoryFilter::parse("poetry");
        assert_eq!(
            quote_list(&filter, &[]),
            "No quotes found for category: poetry."
        );
        assert_eq!(
            random_pick(&filter, None),
            "No quotes available in category: poetry."
        );
    }

    #[test]
    fn list_lines_follow_input_order() {
        let quotes = vec![Quote::new("B", "y").unwrap(), Quote::new("A", "x").unwrap()];
        assert_eq!(
            quote_list(&CategoryFilter::All, &quotes),
            "- \"B\" - (y)\n- \"A\" - (x)"
        );
    }

    #[test]
    fn category_list_marks_active_and_capitalizes() {
        let categories = vec!["all".to_string(), "life".to_string()];
        assert_eq!(
            category_list(&categories, &CategoryFilter::parse("life")),
            "  All\n* Life"
        );
    }
}
