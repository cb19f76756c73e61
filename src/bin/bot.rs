use anyhow::Result;
use chrono::Utc;
use dotenvy::dotenv;
use log::{debug, error, info};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use std::sync::Arc;

use event_herald::announcer::Announcer;
use event_herald::commands::{CommandHandler, Requester};
use event_herald::config::Config;
use event_herald::event_store::EventStore;
use event_herald::http_server::start_http_server;
use event_herald::reminder_scheduler::ReminderScheduler;

struct Handler {
    command_handler: CommandHandler,
    announcer: Arc<Announcer>,
    command_channel: ChannelId,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if msg.channel_id != self.command_channel {
            debug!("Ignoring message outside the command channel ({})", msg.channel_id);
            return;
        }

        let requester = Requester {
            tag: msg.author.tag(),
            username: msg.author.name.clone(),
        };

        let Some(outcome) = self
            .command_handler
            .handle_message(&msg.content, &requester, Utc::now())
            .await
        else {
            return;
        };

        if let Some(reply) = &outcome.reply {
            if let Err(why) = msg.channel_id.say(&ctx.http, reply).await {
                error!("Failed to send reply: {}", why);
            }
        }

        if let Some(announcement) = &outcome.announcement {
            self.announcer.broadcast(announcement).await;
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("✅ {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("🚀 Starting event bot...");
    info!(
        "📋 Command channel {} | {} announcement channel(s) | mention everyone: {}",
        config.command_channel_id,
        config.announcement_channel_ids.len(),
        config.mention_everyone
    );

    if let Some(port) = config.keepalive_port {
        tokio::spawn(async move {
            if let Err(e) = start_http_server(port).await {
                error!("❌ Keep-alive server failed: {}", e);
            }
        });
    }

    let http = Arc::new(Http::new(&config.discord_token));
    let announcer = Arc::new(Announcer::new(
        http,
        &config.announcement_channel_ids,
        config.mention_everyone,
    ));
    let scheduler = ReminderScheduler::new(announcer.clone());
    let command_handler = CommandHandler::new(
        EventStore::new(config.event_utc_offset),
        scheduler,
        config.cancel_reminders_on_delete,
    );

    let handler = Handler {
        command_handler,
        announcer,
        command_channel: ChannelId(config.command_channel_id),
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {}", e);
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Connecting to Discord gateway...");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {:?}", why);
        return Err(anyhow::anyhow!("Failed to establish gateway connection: {}", why));
    }

    Ok(())
}
