//! The two administrator commands and their shared cache snapshot helper.

/// The `mpall` broadcast command and its interactive workflow
pub mod broadcast;
/// The `serveurs` listing command
pub mod servers;

pub use broadcast::mpall;
pub use servers::serveurs;

use crate::core::selection::GuildSummary;
use poise::serenity_prelude as serenity;

/// Takes an owned snapshot of every cached guild, sorted by name (then id)
/// so repeated listings with no membership change are identical.
///
/// The cache guard is dropped before any await point; callers only ever see
/// plain data.
pub(crate) fn gather_guild_summaries(cache: &serenity::Cache) -> Vec<GuildSummary> {
    let mut summaries: Vec<GuildSummary> = cache
        .guilds()
        .into_iter()
        .filter_map(|guild_id| {
            let guild = guild_id.to_guild_cached(cache)?;
            Some(GuildSummary {
                id: guild_id.get(),
                name: guild.name.clone(),
                recipients: guild
                    .members
                    .values()
                    .filter(|member| !member.user.bot)
                    .count(),
                total: guild.members.len(),
            })
        })
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    summaries
}
