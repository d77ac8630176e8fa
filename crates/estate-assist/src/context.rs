//! Prompt context assembly.
//!
//! Builds the single plain-text block handed to the LLM alongside the
//! user's query: FAQ answer first, then bounded listing summaries, then
//! catalog digests and the trailing conversation. Lightweight tag
//! convention only (an `[img]…[/img]` marker wraps image URLs); no markup.

use serde_json::Value;

use crate::catalog::{amenity_names, field_display, field_str};
use crate::faq::FaqEntry;
use crate::history::ChatTurn;

/// Longest slice of a user/bot turn replayed in the history digest.
const HISTORY_SNIPPET_LEN: usize = 200;

pub struct ContextInput<'a> {
    pub faq: Option<&'a FaqEntry>,
    /// Listings that passed the hybrid matcher, original order.
    pub matched_properties: &'a [&'a Value],
    /// Size of the full property catalog, for the aggregate sentence.
    pub total_properties: usize,
    pub agents: &'a [Value],
    pub blogs: &'a [Value],
    pub history: &'a [ChatTurn],
    /// Listings summarised at most, to bound prompt size.
    pub max_items: usize,
}

/// Assemble the context block. Deterministic; empty sections are omitted.
pub fn assemble_context(input: &ContextInput<'_>) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(faq) = input.faq {
        sections.push(format!("FAQ answer: {}", faq.answer));
    }

    if input.matched_properties.is_empty() {
        sections.push(format!(
            "No specific listings matched this question; the catalog currently holds {} properties.",
            input.total_properties
        ));
    } else {
        let listings: Vec<String> = input
            .matched_properties
            .iter()
            .take(input.max_items)
            .map(|item| summarize_property(item))
            .collect();
        sections.push(format!("Matching listings:\n{}", listings.join("\n")));
    }

    if !input.agents.is_empty() {
        let agents: Vec<String> = input
            .agents
            .iter()
            .filter_map(|a| field_str(a, &["name", "title"]))
            .map(str::to_string)
            .collect();
        if !agents.is_empty() {
            sections.push(format!("Agents on the platform: {}.", agents.join(", ")));
        }
    }

    if !input.blogs.is_empty() {
        let blogs: Vec<String> = input.blogs.iter().map(summarize_blog).collect();
        sections.push(format!("Recent blog posts:\n{}", blogs.join("\n")));
    }

    if !input.history.is_empty() {
        let turns: Vec<String> = input
            .history
            .iter()
            .map(|turn| {
                format!(
                    "User: {}\nAssistant: {}",
                    snippet(&turn.user),
                    snippet(&turn.bot)
                )
            })
            .collect();
        sections.push(format!("Recent conversation:\n{}", turns.join("\n")));
    }

    sections.join("\n\n")
}

/// One human-readable line per listing: name, location, price, amenities,
/// agent and an image marker when present.
fn summarize_property(item: &Value) -> String {
    let mut line = format!(
        "- {}",
        field_str(item, &["name", "title"]).unwrap_or("Unnamed property")
    );

    if let Some(location) = field_str(item, &["location", "address", "city"]) {
        line.push_str(&format!(" | Location: {location}"));
    }
    if let Some(price) = field_display(item, &["price", "rent_price", "sale_price"]) {
        line.push_str(&format!(" | Price: {price}"));
    }
    let amenities = amenity_names(item);
    if !amenities.is_empty() {
        line.push_str(&format!(" | Amenities: {}", amenities.join(", ")));
    }
    if let Some(agent) = item
        .get("agent")
        .and_then(|a| a.get("name"))
        .and_then(Value::as_str)
        .or_else(|| field_str(item, &["agent_name"]))
    {
        line.push_str(&format!(" | Agent: {agent}"));
    }
    if let Some(image) = first_image_url(item) {
        line.push_str(&format!(" [img]{image}[/img]"));
    }
    line
}

fn summarize_blog(item: &Value) -> String {
    let mut line = format!(
        "- {}",
        field_str(item, &["title", "name"]).unwrap_or("Untitled post")
    );
    if let Some(author) = field_str(item, &["author"]) {
        line.push_str(&format!(" by {author}"));
    }
    if let Some(summary) = field_str(item, &["summary", "description"]) {
        let summary: String = summary.chars().take(120).collect();
        line.push_str(&format!(": {summary}"));
    }
    if let Some(date) = field_str(item, &["published_at", "created_at", "date"]) {
        line.push_str(&format!(" ({date})"));
    }
    line
}

fn first_image_url(item: &Value) -> Option<&str> {
    item.get("images")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
        .and_then(Value::as_str)
        .or_else(|| field_str(item, &["image_url", "image"]))
}

fn snippet(text: &str) -> String {
    if text.chars().count() <= HISTORY_SNIPPET_LEN {
        text.to_string()
    } else {
        let cut: String = text.chars().take(HISTORY_SNIPPET_LEN).collect();
        format!("{cut}…")
    }
}
