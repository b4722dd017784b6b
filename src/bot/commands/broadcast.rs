//! The `mpall` command: pick a server with buttons, confirm, then deliver a
//! direct message to every human member and report the outcome.
//!
//! The whole flow belongs to one invocation. Button custom ids are scoped by
//! the invocation id, the collectors additionally filter on the panel message
//! id, and any press by a user other than the original invoker is answered
//! with an ephemeral notice and changes nothing. Once a panel times out its
//! buttons are disabled and no collector remains to accept stale presses.

use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::{error, info, instrument, warn};

use crate::bot::commands::gather_guild_summaries;
use crate::bot::{Context, Error};
use crate::core::campaign::{self, DeliveryOutcome, DeliveryReport};
use crate::core::selection::{self, GuildSummary, MAX_GUILD_BUTTONS};

const SELECTION_TIMEOUT: Duration = Duration::from_secs(60);
const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);
const PACING_PAUSE: Duration = Duration::from_secs(1);
const MEMBER_PAGE_SIZE: u64 = 1000;

/// Broadcasts a direct message to every human member of one server, chosen
/// interactively by the invoking administrator.
#[poise::command(prefix_command, guild_only, required_permissions = "ADMINISTRATOR")]
#[instrument(skip(ctx, message))]
pub async fn mpall(
    ctx: Context<'_>,
    #[description = "The message to deliver"]
    #[rest]
    message: Option<String>,
) -> Result<(), Error> {
    let Some(message) = message.filter(|m| !m.trim().is_empty()) else {
        ctx.say(format!(
            "Usage: `{prefix}mpall your message`\nExample: `{prefix}mpall Hello everyone!`",
            prefix = ctx.prefix()
        ))
        .await?;
        return Ok(());
    };

    let mut choices = gather_guild_summaries(ctx.cache());
    if choices.is_empty() {
        ctx.say("I am not in any server.").await?;
        return Ok(());
    }
    choices.truncate(MAX_GUILD_BUTTONS);

    info!(
        "Broadcast requested by {} across {} candidate servers",
        ctx.author().name,
        choices.len()
    );

    let Some((guild, press)) = await_guild_selection(ctx, &choices, &message).await? else {
        return Ok(());
    };

    confirm_and_send(ctx, &press, &guild, &message).await
}

fn selection_rows(
    ctx_id: u64,
    choices: &[GuildSummary],
    disabled: bool,
) -> Vec<serenity::CreateActionRow> {
    choices
        .chunks(5)
        .map(|row| {
            serenity::CreateActionRow::Buttons(
                row.iter()
                    .map(|choice| {
                        serenity::CreateButton::new(selection::guild_button_id(ctx_id, choice.id))
                            .label(selection::button_label(choice))
                            .style(serenity::ButtonStyle::Primary)
                            .disabled(disabled)
                    })
                    .collect(),
            )
        })
        .collect()
}

fn confirmation_rows(
    confirm_id: &str,
    cancel_id: &str,
    disabled: bool,
) -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(confirm_id)
            .label("Confirm")
            .style(serenity::ButtonStyle::Success)
            .disabled(disabled),
        serenity::CreateButton::new(cancel_id)
            .label("Cancel")
            .style(serenity::ButtonStyle::Danger)
            .disabled(disabled),
    ])]
}

async fn reject_foreign_press(
    ctx: Context<'_>,
    press: &serenity::ComponentInteraction,
    notice: &str,
) -> Result<(), Error> {
    press
        .create_response(
            ctx.http(),
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(notice)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Presents the server picker and waits for the invoker's choice.
///
/// Returns `None` when the selection window elapses; the picker's buttons
/// are disabled either way before this function returns.
async fn await_guild_selection(
    ctx: Context<'_>,
    choices: &[GuildSummary],
    message: &str,
) -> Result<Option<(GuildSummary, serenity::ComponentInteraction)>, Error> {
    let ctx_id = ctx.id();

    let embed = serenity::CreateEmbed::new()
        .title("Select a server")
        .description(format!(
            "Message to send: **{message}**\n\nChoose the target server:"
        ))
        .colour(serenity::Colour::BLUE)
        .timestamp(serenity::Timestamp::now());

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(embed)
                .components(selection_rows(ctx_id, choices, false)),
        )
        .await?;
    let picker = reply.message().await?.into_owned();

    loop {
        let press = serenity::collector::ComponentInteractionCollector::new(ctx)
            .filter({
                let id_prefix = selection::guild_button_prefix(ctx_id);
                let picker_id = picker.id;
                move |interaction| {
                    interaction.data.custom_id.starts_with(&id_prefix)
                        && interaction.message.id == picker_id
                }
            })
            .timeout(SELECTION_TIMEOUT)
            .await;

        let Some(press) = press else {
            // Timed out: the picker goes inert.
            picker
                .channel_id
                .edit_message(
                    ctx.http(),
                    picker.id,
                    serenity::EditMessage::new()
                        .components(selection_rows(ctx_id, choices, true)),
                )
                .await?;
            return Ok(None);
        };

        if press.user.id != ctx.author().id {
            reject_foreign_press(ctx, &press, "This selection is not yours.").await?;
            continue;
        }

        let Some(guild_id) = selection::parse_guild_button_id(ctx_id, &press.data.custom_id)
        else {
            continue;
        };
        let Some(guild) = choices.iter().find(|choice| choice.id == guild_id).cloned() else {
            continue;
        };

        press
            .create_response(
                ctx.http(),
                serenity::CreateInteractionResponse::UpdateMessage(
                    serenity::CreateInteractionResponseMessage::new()
                        .components(selection_rows(ctx_id, choices, true)),
                ),
            )
            .await?;

        return Ok(Some((guild, press)));
    }
}

/// Presents the confirm/cancel panel and, on confirmation, runs the campaign.
async fn confirm_and_send(
    ctx: Context<'_>,
    press: &serenity::ComponentInteraction,
    guild: &GuildSummary,
    message: &str,
) -> Result<(), Error> {
    let ctx_id = ctx.id();
    let confirm_id = format!("{ctx_id}_confirm");
    let cancel_id = format!("{ctx_id}_cancel");

    let embed = serenity::CreateEmbed::new()
        .title("Confirm broadcast")
        .description(format!(
            "You are about to send a message to **{} members** of **{}**.\n\nMessage: `{}`",
            guild.recipients, guild.name, message
        ))
        .colour(serenity::Colour::ORANGE);

    let panel = press
        .create_followup(
            ctx.http(),
            serenity::CreateInteractionResponseFollowup::new()
                .embed(embed)
                .components(confirmation_rows(&confirm_id, &cancel_id, false)),
        )
        .await?;

    loop {
        let decision = serenity::collector::ComponentInteractionCollector::new(ctx)
            .filter({
                let id_prefix = format!("{ctx_id}_");
                let panel_id = panel.id;
                move |interaction| {
                    interaction.data.custom_id.starts_with(&id_prefix)
                        && interaction.message.id == panel_id
                }
            })
            .timeout(CONFIRMATION_TIMEOUT)
            .await;

        let Some(decision) = decision else {
            panel
                .channel_id
                .edit_message(
                    ctx.http(),
                    panel.id,
                    serenity::EditMessage::new()
                        .components(confirmation_rows(&confirm_id, &cancel_id, true)),
                )
                .await?;
            return Ok(());
        };

        if decision.user.id != ctx.author().id {
            reject_foreign_press(ctx, &decision, "This confirmation is not yours.").await?;
            continue;
        }

        if decision.data.custom_id == cancel_id {
            decision
                .create_response(
                    ctx.http(),
                    serenity::CreateInteractionResponse::UpdateMessage(
                        serenity::CreateInteractionResponseMessage::new()
                            .content("Broadcast cancelled.")
                            .embeds(vec![])
                            .components(vec![]),
                    ),
                )
                .await?;
            info!("Broadcast to {} cancelled by the invoker", guild.name);
            return Ok(());
        }

        decision
            .create_response(
                ctx.http(),
                serenity::CreateInteractionResponse::UpdateMessage(
                    serenity::CreateInteractionResponseMessage::new()
                        .content("Sending messages...")
                        .embeds(vec![])
                        .components(vec![]),
                ),
            )
            .await?;
        return run_campaign(ctx, &decision, guild, message).await;
    }
}

/// Refreshes the full member list over HTTP, bots filtered out.
async fn fetch_recipients(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
) -> Result<Vec<serenity::User>, serenity::Error> {
    let mut recipients = Vec::new();
    let mut after: Option<serenity::UserId> = None;
    loop {
        let page = guild_id.members(http, Some(MEMBER_PAGE_SIZE), after).await?;
        let Some(last) = page.last() else {
            break;
        };
        after = Some(last.user.id);
        let full_page = page.len() as u64 == MEMBER_PAGE_SIZE;
        recipients.extend(
            page.into_iter()
                .filter(|member| !member.user.bot)
                .map(|member| member.user),
        );
        if !full_page {
            break;
        }
    }
    Ok(recipients)
}

fn classify_send_error(source: &serenity::Error) -> DeliveryOutcome {
    match source {
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response)) => {
            campaign::classify_rejection(Some(response.error.code))
        }
        _ => campaign::classify_rejection(None),
    }
}

fn report_embed(report: &DeliveryReport) -> serenity::CreateEmbed {
    let colour = if report.is_clean() {
        serenity::Colour::DARK_GREEN
    } else {
        serenity::Colour::ORANGE
    };
    serenity::CreateEmbed::new()
        .title("Broadcast report")
        .colour(colour)
        .timestamp(serenity::Timestamp::now())
        .field("Delivered", report.success.to_string(), true)
        .field("Failed", report.failed.to_string(), true)
        .field("Total", report.total.to_string(), true)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Server: {}",
            report.guild_name
        )))
}

/// Sequentially delivers `message` to every recipient and posts the report.
///
/// Individual send failures are counted and the loop proceeds; only a
/// member-list refresh failure abandons the campaign, with a generic notice
/// instead of a report.
#[instrument(skip(ctx, interaction, message), fields(guild = %guild.name))]
async fn run_campaign(
    ctx: Context<'_>,
    interaction: &serenity::ComponentInteraction,
    guild: &GuildSummary,
    message: &str,
) -> Result<(), Error> {
    let rate_limit = ctx.data().app_config.rate_limit;
    let guild_id = serenity::GuildId::new(guild.id);

    let recipients = match fetch_recipients(ctx.http(), guild_id).await {
        Ok(recipients) => recipients,
        Err(source) => {
            error!(?source, "Failed to refresh the member list of {}", guild.name);
            interaction
                .create_followup(
                    ctx.http(),
                    serenity::CreateInteractionResponseFollowup::new()
                        .content("Something went wrong while preparing the broadcast."),
                )
                .await?;
            return Ok(());
        }
    };

    info!(
        "Broadcast to {} started: {} recipients",
        guild.name,
        recipients.len()
    );
    let mut report = DeliveryReport::new(guild.name.clone(), recipients.len());

    for (index, user) in recipients.iter().enumerate() {
        let outcome = match user
            .direct_message(ctx.http(), serenity::CreateMessage::new().content(message))
            .await
        {
            Ok(_) => {
                info!("Message delivered to {}", user.tag());
                DeliveryOutcome::Delivered
            }
            Err(source) => {
                let outcome = classify_send_error(&source);
                if outcome == DeliveryOutcome::MessagesDisabled {
                    warn!("Direct messages disabled for {}", user.tag());
                } else {
                    error!(?source, "Failed to deliver to {}", user.tag());
                }
                outcome
            }
        };
        report.record(outcome);

        if campaign::pause_due(index, rate_limit) {
            tokio::time::sleep(PACING_PAUSE).await;
        }
    }

    info!(
        "Broadcast to {} finished: {}/{} delivered, {} failed",
        report.guild_name, report.success, report.total, report.failed
    );
    interaction
        .create_followup(
            ctx.http(),
            serenity::CreateInteractionResponseFollowup::new().embed(report_embed(&report)),
        )
        .await?;
    Ok(())
}
