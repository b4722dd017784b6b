use crate::bot::commands::gather_guild_summaries;
use crate::bot::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::{info, instrument};

/// Lists every server the bot is connected to.
#[poise::command(prefix_command, guild_only, required_permissions = "ADMINISTRATOR")]
#[instrument(skip(ctx))]
pub async fn serveurs(ctx: Context<'_>) -> Result<(), Error> {
    info!("Server listing requested by {}", ctx.author().name);

    let listings = gather_guild_summaries(ctx.cache());
    if listings.is_empty() {
        ctx.say("I am not in any server.").await?;
        return Ok(());
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Available servers")
        .colour(serenity::Colour::BLUE)
        .timestamp(serenity::Timestamp::now());
    for listing in &listings {
        embed = embed.field(
            format!("Server: {}", listing.name),
            format!(
                "Members: {} (total: {})\nID: {}",
                listing.recipients, listing.total, listing.id
            ),
            false,
        );
    }
    embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
        "Use {}mpall <message> to start a broadcast",
        ctx.prefix()
    )));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
