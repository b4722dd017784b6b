//! Guild selection data and the button identifier scheme.
//!
//! Every selection button carries a custom id scoped by the invocation id,
//! `"{ctx_id}_guild_{guild_id}"`, so a press is resolved by parsing the id
//! back out instead of capturing the guild in a per-button closure. Stale
//! presses from other invocations never match.

/// Platform limit: 5 buttons per row, 5 rows per message.
pub const MAX_GUILD_BUTTONS: usize = 25;

/// Platform limit on a button label, in characters.
pub const MAX_BUTTON_LABEL: usize = 80;

/// Owned snapshot of one cached guild, taken at command time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildSummary {
    /// Guild identifier.
    pub id: u64,
    /// Guild display name.
    pub name: String,
    /// Members that are not bots, i.e. broadcast recipients.
    pub recipients: usize,
    /// All members, bots included.
    pub total: usize,
}

/// Custom-id prefix shared by every selection button of one invocation.
#[must_use]
pub fn guild_button_prefix(ctx_id: u64) -> String {
    format!("{ctx_id}_guild_")
}

/// Custom id for the selection button of `guild_id`.
#[must_use]
pub fn guild_button_id(ctx_id: u64, guild_id: u64) -> String {
    format!("{ctx_id}_guild_{guild_id}")
}

/// Resolves a pressed custom id back to its guild, if it belongs to this
/// invocation.
#[must_use]
pub fn parse_guild_button_id(ctx_id: u64, custom_id: &str) -> Option<u64> {
    custom_id
        .strip_prefix(&guild_button_prefix(ctx_id))?
        .parse()
        .ok()
}

/// Button label `"{name} ({n} members)"`, truncated to the platform limit.
#[must_use]
pub fn button_label(summary: &GuildSummary) -> String {
    let suffix = format!(" ({} members)", summary.recipients);
    let label = format!("{}{suffix}", summary.name);
    if label.chars().count() <= MAX_BUTTON_LABEL {
        return label;
    }

    let budget = MAX_BUTTON_LABEL.saturating_sub(suffix.chars().count() + 1);
    let truncated: String = summary.name.chars().take(budget).collect();
    format!("{truncated}…{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, recipients: usize) -> GuildSummary {
        GuildSummary {
            id: 42,
            name: name.to_owned(),
            recipients,
            total: recipients + 1,
        }
    }

    #[test]
    fn button_id_round_trips() {
        let id = guild_button_id(123, 98765);
        assert_eq!(parse_guild_button_id(123, &id), Some(98765));
    }

    #[test]
    fn button_id_from_another_invocation_does_not_match() {
        let id = guild_button_id(123, 98765);
        assert_eq!(parse_guild_button_id(999, &id), None);
    }

    #[test]
    fn garbage_custom_ids_do_not_parse() {
        assert_eq!(parse_guild_button_id(123, "123_guild_notanumber"), None);
        assert_eq!(parse_guild_button_id(123, "123_confirm"), None);
        assert_eq!(parse_guild_button_id(123, ""), None);
    }

    #[test]
    fn short_labels_are_untouched() {
        let label = button_label(&summary("My Guild", 12));
        assert_eq!(label, "My Guild (12 members)");
    }

    #[test]
    fn long_labels_are_truncated_to_the_platform_limit() {
        let label = button_label(&summary(&"x".repeat(200), 3));
        assert!(label.chars().count() <= MAX_BUTTON_LABEL);
        assert!(label.ends_with(" (3 members)"));
        assert!(label.contains('…'));
    }
}
