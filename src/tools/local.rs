//! Local stand-ins for the free tools
//!
//! These run in-process when no credential is configured. Premium tools
//! have no local implementation; they only run through the remote service.

use super::{LocalToolFn, ToolKind};
use chrono::Utc;
use serde_json::{json, Value};

pub(super) fn implementation(kind: ToolKind) -> Option<LocalToolFn> {
    match kind {
        ToolKind::Ping => Some(ping),
        ToolKind::Uuid => Some(new_uuid),
        ToolKind::Timestamp => Some(timestamp),
        ToolKind::EmailNormalize => Some(email_normalize),
        ToolKind::MarketSentiment => Some(market_sentiment),
        ToolKind::GiftAnalysis => Some(gift_analysis),
        ToolKind::SupportHelpdesk => Some(support_helpdesk),
        _ => None,
    }
}

fn required(value: Option<&str>, what: &str) -> Result<String, String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(format!("Missing {what}")),
    }
}

fn ping(_value: Option<&str>) -> Result<Value, String> {
    Ok(json!({ "status": "ONLINE", "pong": true }))
}

fn new_uuid(_value: Option<&str>) -> Result<Value, String> {
    Ok(Value::String(uuid::Uuid::new_v4().to_string()))
}

fn timestamp(_value: Option<&str>) -> Result<Value, String> {
    let now = Utc::now();
    Ok(json!({
        "iso": now.to_rfc3339(),
        "epoch_ms": now.timestamp_millis(),
    }))
}

fn email_normalize(value: Option<&str>) -> Result<Value, String> {
    let email = required(value, "email address")?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(Value::String(email))
        }
        _ => Err(format!("Invalid email address: {email}")),
    }
}

fn market_sentiment(value: Option<&str>) -> Result<Value, String> {
    let asset = required(value, "asset")?.to_uppercase();
    let score = asset.bytes().map(u32::from).sum::<u32>() % 101;
    let label = match score {
        0..=33 => "BEARISH",
        34..=66 => "NEUTRAL",
        _ => "BULLISH",
    };
    Ok(json!({ "asset": asset, "score": score, "sentiment": label }))
}

fn gift_analysis(value: Option<&str>) -> Result<Value, String> {
    let recipient = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("anyone");
    Ok(json!({
        "recipient": recipient,
        "ideas": ["Mechanical keyboard", "Noise-cancelling headphones", "Smart mug"],
    }))
}

fn support_helpdesk(value: Option<&str>) -> Result<Value, String> {
    Ok(json!({
        "ticket": uuid::Uuid::new_v4().to_string(),
        "status": "OPEN",
        "subject": value.unwrap_or_default(),
    }))
}
