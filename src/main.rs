use std::process::ExitCode;
use std::sync::Arc;

use vk_birthday_bot::config::cli::Mode;
use vk_birthday_bot::core::clock::{format_timestamp, SystemClock};
use vk_birthday_bot::domain::ports::Clock;
use vk_birthday_bot::utils::{logger, validation::Validate};
use vk_birthday_bot::{BirthdayBot, BotConfig, BotError, Cli, LockDecision, LockManager, RunReport};

#[tokio::main]
async fn main() -> ExitCode {
    let footer = format!(
        "Current UTC+7 time: {}",
        format_timestamp(&SystemClock.now())
    );
    let (cli, ignored) = Cli::parse_lenient(std::env::args(), &footer);

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting vk-birthday-bot");
    tracing::debug!("CLI args: {:?}", cli);
    if !ignored.is_empty() {
        tracing::debug!("Ignoring unrecognised arguments: {:?}", ignored);
    }

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => return report_failure(&e),
    };

    let outcome = match cli.mode() {
        Mode::Reset => reset_lock(&config).await,
        Mode::Status => show_status(&config).await,
        Mode::Run => run_bot(&config).await,
    };

    match outcome {
        Ok(()) => {
            tracing::info!(
                "✅ Finished at {} (UTC+7)",
                format_timestamp(&SystemClock.now())
            );
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(&e),
    }
}

fn load_config(path: &str) -> Result<BotConfig, BotError> {
    tracing::info!("📁 Loading configuration from: {}", path);
    let config = BotConfig::from_file(path)?;
    config.validate()?;
    tracing::info!("✅ Configuration loaded");
    Ok(config)
}

fn report_failure(e: &BotError) -> ExitCode {
    tracing::error!("❌ Run failed: {} (category: {:?})", e, e.category());
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    ExitCode::from(e.exit_code() as u8)
}

fn lock_manager(config: &BotConfig) -> LockManager {
    LockManager::new(&config.lock_file, Arc::new(SystemClock))
}

async fn reset_lock(config: &BotConfig) -> Result<(), BotError> {
    match lock_manager(config).reset().await? {
        Some(previous) => println!("✅ Lock reset (was set to: {})", previous),
        None => println!("ℹ️ Lock file does not exist"),
    }
    Ok(())
}

async fn show_status(config: &BotConfig) -> Result<(), BotError> {
    let status = lock_manager(config).status().await?;

    match &status.stored {
        Some(stored) => println!("📅 Date in lock file: {}", stored),
        None => println!("ℹ️ Lock file does not exist"),
    }
    println!("🌏 Today (UTC+7): {}", status.today);

    if status.ran_today() {
        println!("🔒 Already ran today");
    } else {
        println!("🔓 Has not run today yet");
    }
    Ok(())
}

async fn run_bot(config: &BotConfig) -> Result<(), BotError> {
    let bot = BirthdayBot::new(config)?;

    match bot.run().await? {
        RunReport::Blocked(LockDecision::AlreadyRanToday { date }) => {
            println!("⛔ Already ran today ({}), nothing to do", date);
        }
        RunReport::Blocked(decision) => {
            println!("⛔ Run blocked by lock file: {:?}", decision);
        }
        RunReport::Published {
            members_total,
            birthday_people,
            post_text,
            post_id,
            with_image,
            ..
        } => {
            println!("👥 Members checked: {}", members_total);
            if birthday_people.is_empty() {
                println!("🎂 No birthdays today");
            } else {
                println!("🎂 Birthdays today:");
                for person in &birthday_people {
                    println!("- {}", person.mention());
                }
            }
            println!("📋 Post text:\n---\n{}\n---", post_text);
            println!(
                "✅ Published post {}{}",
                post_id,
                if with_image { " with image" } else { " without image" }
            );
        }
    }

    Ok(())
}
