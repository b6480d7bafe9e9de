use common::models::{Signal, SignalResult, TradeRecord, UserPrefs};
use signals::SummaryEntry;

pub fn signal_emoji(signal: Signal) -> &'static str {
    match signal {
        Signal::Buy => "🟢",
        Signal::Sell => "🔴",
        Signal::Neutral => "⚪",
    }
}

fn confidence_bar(confidence: u8) -> String {
    let filled = confidence.min(10) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

pub fn welcome() -> String {
    "👋 <b>Deriv Signal Bot</b>\n\n\
     Pick an index category below, or type a symbol directly \
     (e.g. <code>R_75</code>, <code>vol75</code>, <code>boom</code>).\n\n\
     /analyze SYMBOL - run the techniques now\n\
     /summary - signal overview of the major indices\n\
     /settings - risk and alert preferences\n\
     /help - how the signals work"
        .to_string()
}

pub fn help() -> String {
    "Each signal combines four techniques: breakout &amp; retest, ICT market \
     structure, smart money concepts and candle range theory. A direction \
     needs at least three techniques agreeing; confidence is scored 0-10.\n\n\
     Orders here are <b>simulated</b>. Nothing is ever sent to a broker.\n\n\
     🟢 buy · 🔴 sell · ⚪ neutral"
        .to_string()
}

pub fn format_signal(result: &SignalResult) -> String {
    let signal = result.final_signal();
    let confidence = result.final_confidence();

    let mut out = format!(
        "{} <b>{}</b> · {}\n\n\
         Signal: <b>{}</b>\n\
         Confidence: {} {}/10\n\
         Price: {:.5} ({:+.5} / {:+.2}% over 10 candles)\n\
         Techniques agreeing: {} of {} ({} buy / {} sell)\n",
        signal_emoji(signal),
        result.symbol_name,
        result.timeframe.label(),
        signal,
        confidence_bar(confidence),
        confidence,
        result.current_price,
        result.price_change,
        result.price_change_pct,
        result.composite.techniques_agreeing,
        result.composite.total_techniques,
        result.composite.buy_votes,
        result.composite.sell_votes,
    );

    if let Some(risk) = &result.risk {
        out.push_str(&format!(
            "\n<b>Trade plan</b> (1:{:.0})\n\
             Entry: {:.5}\nStop loss: {:.5}\nTake profit: {:.5}\nATR: {:.5}\n",
            risk.risk_reward, risk.entry, risk.stop_loss, risk.take_profit, risk.atr
        ));
    }

    if let Some(ai) = &result.ai {
        let verdict = if ai.agrees_with_technical { "agrees" } else { "disagrees" };
        out.push_str(&format!(
            "\n🤖 Advisor {} ({} {}/10){}\n<i>{}</i>\n",
            verdict,
            ai.advisor_signal,
            ai.advisor_confidence,
            if ai.approved { " ✅ approved" } else { "" },
            ai.reasoning,
        ));
    }

    out.push_str(&format!(
        "\n{} · {}",
        result.market_session,
        result.kill_zone
    ));
    out
}

/// The detailed per-technique view behind the Full Report button.
pub fn format_report(result: &SignalResult) -> String {
    let mut out = format!(
        "📋 <b>{}</b> · {} · full breakdown\n",
        result.symbol_name,
        result.timeframe.label()
    );
    for report in [&result.breakout, &result.ict, &result.smc, &result.crt] {
        out.push_str(&format!(
            "\n{} <b>{}</b> - {} ({}/10)\n{}\n",
            signal_emoji(report.signal),
            report.technique,
            report.signal,
            report.confidence,
            report.reasoning,
        ));
        for (key, value) in &report.details {
            out.push_str(&format!("  · {}: {}\n", key, value));
        }
    }
    out
}

pub fn format_summary(entries: &[SummaryEntry]) -> String {
    if entries.is_empty() {
        return "No market data available right now, try again shortly.".to_string();
    }
    let mut out = "🌐 <b>Market summary</b>\n\n".to_string();
    for entry in entries {
        // Trend marker flips at half a percent either way.
        let trend = if entry.price_change_pct > 0.5 {
            "📈"
        } else if entry.price_change_pct < -0.5 {
            "📉"
        } else {
            "➡️"
        };
        out.push_str(&format!(
            "{} <b>{}</b>: {} ({}/10) @ {:.4} {} {:+.2}%\n",
            signal_emoji(entry.signal),
            entry.symbol_name,
            entry.signal,
            entry.confidence,
            entry.price,
            trend,
            entry.price_change_pct,
        ));
    }
    out
}

pub fn format_order_preview(result: &SignalResult, prefs: &UserPrefs, size: f64) -> String {
    let risk = match &result.risk {
        Some(r) => r,
        None => return "No trade plan for a neutral signal.".to_string(),
    };
    format!(
        "💼 <b>Simulated order</b> - {}\n\n\
         Direction: {}\nEntry: {:.5}\nStop loss: {:.5}\nTake profit: {:.5}\n\
         Size: {:.2} units (risking {:.1}% of {:.0})\n\n\
         Confirm to record this simulated trade.",
        result.symbol_name,
        result.final_signal(),
        risk.entry,
        risk.stop_loss,
        risk.take_profit,
        size,
        prefs.risk_percent,
        prefs.balance,
    )
}

pub fn format_execution(trade: &TradeRecord, size: f64) -> String {
    format!(
        "✅ <b>Simulated order recorded</b>\n\n\
         {} {} @ {:.5}, size {:.2}\nStop: {}\nTarget: {}\n\n\
         No real order was placed.",
        trade.direction.to_uppercase(),
        trade.symbol,
        trade.entry,
        size,
        trade
            .stop_loss
            .map(|v| format!("{:.5}", v))
            .unwrap_or_else(|| "-".to_string()),
        trade
            .take_profit
            .map(|v| format!("{:.5}", v))
            .unwrap_or_else(|| "-".to_string()),
    )
}

pub fn order_rejected(confidence: u8, min_required: u8) -> String {
    format!(
        "⛔ Signal confidence {}/10 is below the {}/10 required for a \
         simulated order. Wait for a stronger setup.",
        confidence, min_required
    )
}

pub fn format_settings(prefs: &UserPrefs, alert_count: usize) -> String {
    format!(
        "⚙️ <b>Settings</b>\n\n\
         Risk per trade: {:.1}%\nSimulated balance: {:.0}\n\
         Alerts: {} active subscription(s)\nTimezone: {}\n\n\
         Send a number (e.g. <code>2</code>) to change risk percent.",
        prefs.risk_percent, prefs.balance, alert_count, prefs.timezone
    )
}

pub fn format_history(trades: &[TradeRecord]) -> String {
    if trades.is_empty() {
        return "📭 No simulated trades yet. Run an analysis and use the \
                order button on a strong signal."
            .to_string();
    }
    let mut out = "📒 <b>Recent simulated trades</b>\n\n".to_string();
    for trade in trades {
        out.push_str(&format!(
            "{} <b>{}</b> @ {:.5} · {}\n",
            trade.direction.to_uppercase(),
            trade.symbol,
            trade.entry,
            trade.executed_at.format("%Y-%m-%d %H:%M UTC"),
        ));
    }
    out
}

pub fn alert_notification(result: &SignalResult) -> String {
    format!(
        "🔔 <b>Alert</b>: {}\n\n{}",
        result.symbol_name,
        format_signal(result)
    )
}

pub fn unknown_symbol(input: &str) -> String {
    format!(
        "🤷 <code>{}</code> is not a synthetic index I know. Try \
         <code>R_75</code>, <code>BOOM1000</code> or pick from /start.",
        input
    )
}
