use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use common::models::symbol::{is_synthetic_index, normalize_symbol};
use common::models::{AlertSubscription, Timeframe, TradeRecord};
use market_data::CandleSource;
use signals::SignalEngine;
use storage::repositories::{AlertsRepository, PrefsRepository, TradesRepository};

use crate::callback::CallbackAction;
use crate::session::Sessions;
use crate::{chart, keyboards, messages};

const CHART_CANDLES: u32 = 40;
/// Simulated orders need at least this much merged confidence.
const ORDER_MIN_CONFIDENCE: u8 = 5;

/// Everything a handler needs, cloned into the dptree dependency map.
#[derive(Clone)]
pub struct BotState {
    pub engine: Arc<SignalEngine>,
    pub source: Arc<dyn CandleSource>,
    pub pool: SqlitePool,
    pub sessions: Sessions,
    /// Confidence floor for alerts and simulated orders.
    pub min_confidence: u8,
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "show the index menu")]
    Start,
    #[command(description = "analyze a symbol, e.g. /analyze R_75")]
    Analyze(String),
    #[command(description = "signal overview of the major indices")]
    Summary,
    #[command(description = "text chart for a symbol, e.g. /chart R_50")]
    Chart(String),
    #[command(description = "risk and alert preferences")]
    Settings,
    #[command(description = "your recent simulated trades")]
    History,
    #[command(description = "how the signals work")]
    Help,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: BotState,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    match cmd {
        Command::Start => {
            bot.send_message(chat_id, messages::welcome())
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        Command::Help => {
            let text = format!(
                "{}\n\n{}",
                messages::help(),
                Command::descriptions()
            );
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Analyze(arg) => {
            let input = arg.trim();
            if input.is_empty() {
                bot.send_message(chat_id, "Usage: /analyze R_75").await?;
                return Ok(());
            }
            let symbol = normalize_symbol(input);
            if !is_synthetic_index(&symbol) {
                bot.send_message(chat_id, messages::unknown_symbol(input))
                    .parse_mode(ParseMode::Html)
                    .await?;
                return Ok(());
            }
            let timeframe = state.sessions.get(chat_id.0).await.timeframe;
            send_analysis(&bot, chat_id, &state, &symbol, timeframe).await?;
        }
        Command::Summary => {
            send_summary(&bot, chat_id, &state).await?;
        }
        Command::Chart(arg) => {
            let input = arg.trim();
            let session = state.sessions.get(chat_id.0).await;
            let symbol = if input.is_empty() {
                match session.symbol {
                    Some(s) => s,
                    None => {
                        bot.send_message(chat_id, "Usage: /chart R_50").await?;
                        return Ok(());
                    }
                }
            } else {
                normalize_symbol(input)
            };
            if !is_synthetic_index(&symbol) {
                bot.send_message(chat_id, messages::unknown_symbol(&symbol))
                    .parse_mode(ParseMode::Html)
                    .await?;
                return Ok(());
            }
            send_chart(&bot, chat_id, &state, &symbol, session.timeframe).await?;
        }
        Command::Settings => {
            let prefs = PrefsRepository::get(&state.pool, chat_id.0).await?;
            let alerts = AlertsRepository::list_for_chat(&state.pool, chat_id.0).await?;
            state
                .sessions
                .update(chat_id.0, |s| s.awaiting_risk_input = true)
                .await;
            bot.send_message(chat_id, messages::format_settings(&prefs, alerts.len()))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::risk_menu())
                .await?;
        }
        Command::History => {
            let trades = TradesRepository::recent(&state.pool, chat_id.0, 10).await?;
            bot.send_message(chat_id, messages::format_history(&trades))
                .parse_mode(ParseMode::Html)
                .await?;
        }
    }
    Ok(())
}

/// Free text: a pending risk-percent entry, otherwise a symbol lookup.
pub async fn handle_text(bot: Bot, msg: Message, state: BotState) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let text = match msg.text() {
        Some(t) => t.trim(),
        None => return Ok(()),
    };

    let session = state.sessions.get(chat_id.0).await;
    if session.awaiting_risk_input {
        if let Ok(percent) = text.parse::<f64>() {
            if (0.1..=10.0).contains(&percent) {
                PrefsRepository::set_risk_percent(&state.pool, chat_id.0, percent).await?;
                state
                    .sessions
                    .update(chat_id.0, |s| s.awaiting_risk_input = false)
                    .await;
                bot.send_message(chat_id, format!("Risk per trade set to {:.1}%.", percent))
                    .await?;
                return Ok(());
            }
            bot.send_message(chat_id, "Risk percent must be between 0.1 and 10.")
                .await?;
            return Ok(());
        }
        // Not a number, fall through to symbol lookup.
        state
            .sessions
            .update(chat_id.0, |s| s.awaiting_risk_input = false)
            .await;
    }

    let symbol = normalize_symbol(text);
    if is_synthetic_index(&symbol) {
        state
            .sessions
            .update(chat_id.0, |s| s.symbol = Some(symbol.clone()))
            .await;
        bot.send_message(chat_id, format!("⏱ Pick a timeframe for {}:", symbol))
            .reply_markup(keyboards::timeframe_menu(&symbol))
            .await?;
    } else {
        bot.send_message(chat_id, messages::unknown_symbol(text))
            .parse_mode(ParseMode::Html)
            .await?;
    }
    Ok(())
}

pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: BotState) -> anyhow::Result<()> {
    let action = q.data.as_deref().and_then(CallbackAction::parse);
    let origin = q.message.as_ref().map(|m| (m.chat().id, m.id()));

    match (action, origin) {
        (Some(action), Some((chat_id, message_id))) => {
            bot.answer_callback_query(q.id.clone()).await?;
            dispatch_action(bot, q, state, action, chat_id, message_id).await
        }
        _ => {
            warn!(data = ?q.data, "unusable callback query");
            bot.answer_callback_query(q.id).await?;
            Ok(())
        }
    }
}

async fn dispatch_action(
    bot: Bot,
    q: CallbackQuery,
    state: BotState,
    action: CallbackAction,
    chat_id: ChatId,
    message_id: MessageId,
) -> anyhow::Result<()> {
    match action {
        CallbackAction::MainMenu => {
            bot.edit_message_text(chat_id, message_id, messages::welcome())
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        CallbackAction::Category(category) => {
            bot.edit_message_text(chat_id, message_id, "Pick an index:")
                .reply_markup(keyboards::symbol_menu(category))
                .await?;
        }
        CallbackAction::PickSymbol(symbol) => {
            state
                .sessions
                .update(chat_id.0, |s| s.symbol = Some(symbol.clone()))
                .await;
            bot.edit_message_text(
                chat_id,
                message_id,
                format!("⏱ Pick a timeframe for {}:", symbol),
            )
            .reply_markup(keyboards::timeframe_menu(&symbol))
            .await?;
        }
        CallbackAction::PickTimeframe { symbol, timeframe } => {
            state
                .sessions
                .update(chat_id.0, |s| {
                    s.symbol = Some(symbol.clone());
                    s.timeframe = timeframe;
                })
                .await;
            bot.edit_message_text(
                chat_id,
                message_id,
                format!("🎯 {} · {} - what do you want to see?", symbol, timeframe.label()),
            )
            .reply_markup(keyboards::analysis_menu(&symbol, timeframe))
            .await?;
        }
        CallbackAction::Analyze { symbol, timeframe }
        | CallbackAction::Refresh { symbol, timeframe } => {
            state
                .sessions
                .update(chat_id.0, |s| {
                    s.symbol = Some(symbol.clone());
                    s.timeframe = timeframe;
                })
                .await;
            send_analysis(&bot, chat_id, &state, &symbol, timeframe).await?;
        }
        CallbackAction::Chart { symbol, timeframe } => {
            send_chart(&bot, chat_id, &state, &symbol, timeframe).await?;
        }
        CallbackAction::Report { symbol, timeframe } => {
            let result = state.engine.analyze(&symbol, timeframe).await?;
            bot.send_message(chat_id, messages::format_report(&result))
                .parse_mode(ParseMode::Html)
                .await?;
        }
        CallbackAction::Alert { symbol, timeframe } => {
            let existing = AlertsRepository::list_for_chat(&state.pool, chat_id.0).await?;
            if existing.iter().any(|s| s.symbol == symbol) {
                AlertsRepository::unsubscribe(&state.pool, chat_id.0, &symbol).await?;
                bot.send_message(chat_id, format!("🔕 Alerts off for {}.", symbol))
                    .await?;
            } else {
                let sub = AlertSubscription {
                    chat_id: chat_id.0,
                    symbol: symbol.clone(),
                    timeframe,
                };
                AlertsRepository::subscribe(&state.pool, &sub).await?;
                bot.send_message(
                    chat_id,
                    format!(
                        "🔔 Watching {} on {}. You will hear from me when a \
                         signal reaches {}/10.",
                        symbol,
                        timeframe.label(),
                        state.min_confidence
                    ),
                )
                .await?;
            }
        }
        CallbackAction::OrderPreview { symbol, timeframe } => {
            let result = state.engine.analyze(&symbol, timeframe).await?;
            if !result.final_signal().is_directional()
                || result.final_confidence() < ORDER_MIN_CONFIDENCE
            {
                bot.send_message(
                    chat_id,
                    messages::order_rejected(result.final_confidence(), ORDER_MIN_CONFIDENCE),
                )
                .await?;
                return Ok(());
            }
            let user_id = q.from.id.0 as i64;
            let prefs = PrefsRepository::get(&state.pool, user_id).await?;
            let size = result
                .risk
                .map(|r| prefs.position_size(r.entry, r.stop_loss))
                .unwrap_or(0.0);
            bot.send_message(
                chat_id,
                messages::format_order_preview(&result, &prefs, size),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::order_menu(&symbol, timeframe))
            .await?;
        }
        CallbackAction::OrderExecute { symbol, timeframe } => {
            let result = state.engine.analyze(&symbol, timeframe).await?;
            let risk = match result.risk {
                Some(r) => r,
                None => {
                    bot.send_message(chat_id, "The signal went neutral, order cancelled.")
                        .await?;
                    return Ok(());
                }
            };
            let user_id = q.from.id.0 as i64;
            let prefs = PrefsRepository::get(&state.pool, user_id).await?;
            let size = prefs.position_size(risk.entry, risk.stop_loss);
            let trade = TradeRecord {
                user_id,
                symbol: symbol.clone(),
                direction: result.final_signal().to_string(),
                entry: risk.entry,
                stop_loss: Some(risk.stop_loss),
                take_profit: Some(risk.take_profit),
                executed_at: Utc::now(),
            };
            TradesRepository::insert(&state.pool, &trade).await?;
            info!(user_id, symbol = %trade.symbol, direction = %trade.direction, "simulated order recorded");
            bot.edit_message_text(chat_id, message_id, messages::format_execution(&trade, size))
                .parse_mode(ParseMode::Html)
                .await?;
        }
        CallbackAction::SetRisk { percent } => {
            let user_id = q.from.id.0 as i64;
            PrefsRepository::set_risk_percent(&state.pool, user_id, percent).await?;
            state
                .sessions
                .update(chat_id.0, |s| s.awaiting_risk_input = false)
                .await;
            bot.send_message(chat_id, format!("Risk per trade set to {:.1}%.", percent))
                .await?;
        }
        CallbackAction::Summary => {
            send_summary(&bot, chat_id, &state).await?;
        }
        CallbackAction::Dismiss => {
            bot.delete_message(chat_id, message_id).await?;
        }
    }
    Ok(())
}

async fn send_analysis(
    bot: &Bot,
    chat_id: ChatId,
    state: &BotState,
    symbol: &str,
    timeframe: Timeframe,
) -> anyhow::Result<()> {
    let pending = bot
        .send_message(chat_id, format!("🔍 Analyzing {} on {}...", symbol, timeframe.label()))
        .await?;
    let result = state.engine.analyze(symbol, timeframe).await?;
    bot.edit_message_text(chat_id, pending.id, messages::format_signal(&result))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::signal_menu(symbol, timeframe))
        .await?;
    Ok(())
}

async fn send_chart(
    bot: &Bot,
    chat_id: ChatId,
    state: &BotState,
    symbol: &str,
    timeframe: Timeframe,
) -> anyhow::Result<()> {
    let candles = state.source.candles(symbol, timeframe, CHART_CANDLES).await?;
    let text = format!("<pre>{}</pre>", chart::render(symbol, timeframe, &candles));
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn send_summary(bot: &Bot, chat_id: ChatId, state: &BotState) -> anyhow::Result<()> {
    let pending = bot
        .send_message(chat_id, "🌐 Scanning the major indices...")
        .await?;
    let entries = state.engine.market_summary(Timeframe::M15).await;
    bot.edit_message_text(chat_id, pending.id, messages::format_summary(&entries))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
