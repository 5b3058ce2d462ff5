//! HTML rendering of slot messages.
//!
//! Times are shown in a fixed display zone; source epochs are UTC seconds.

use crate::error::{NotifyError, NotifyResult};
use chrono::{DateTime, FixedOffset};
use dsig_core::InstrumentId;
use dsig_detector::Candidate;
use dsig_scheduler::SignalMessage;
use std::collections::BTreeMap;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders [`SignalMessage`]s as Telegram HTML.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    offset: FixedOffset,
    zone_label: String,
    display_names: BTreeMap<InstrumentId, String>,
}

impl MessageFormatter {
    /// `utc_offset_minutes` east of UTC, e.g. 180 for UTC+03:00.
    pub fn new(
        utc_offset_minutes: i32,
        zone_label: impl Into<String>,
        display_names: BTreeMap<InstrumentId, String>,
    ) -> NotifyResult<Self> {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                NotifyError::InvalidConfig(format!(
                    "utc_offset_minutes ({utc_offset_minutes}) out of range"
                ))
            })?;
        Ok(Self {
            offset,
            zone_label: zone_label.into(),
            display_names,
        })
    }

    /// Human name of an instrument, falling back to its symbol.
    pub fn display_name<'a>(&'a self, instrument: &'a InstrumentId) -> &'a str {
        self.display_names
            .get(instrument)
            .map_or(instrument.as_str(), String::as_str)
    }

    /// Epoch seconds in the display zone.
    pub fn format_time(&self, epoch: i64) -> String {
        match DateTime::from_timestamp(epoch, 0) {
            Some(utc) => utc.with_timezone(&self.offset).format(TIME_FORMAT).to_string(),
            None => epoch.to_string(),
        }
    }

    pub fn render(&self, message: &SignalMessage) -> String {
        match message {
            SignalMessage::AdvanceNotice {
                slot_epoch,
                lead_secs,
                candidate,
            } => self.render_advance_notice(*slot_epoch, *lead_secs, candidate.as_ref()),
            SignalMessage::Firing {
                slot_epoch,
                expiry_epoch,
                candidate,
            } => self.render_firing(*slot_epoch, *expiry_epoch, candidate.as_ref()),
            SignalMessage::Expiry {
                expiry_epoch,
                next_slot_epoch,
            } => self.render_expiry(*expiry_epoch, *next_slot_epoch),
        }
    }

    fn render_advance_notice(
        &self,
        slot_epoch: i64,
        lead_secs: i64,
        candidate: Option<&Candidate>,
    ) -> String {
        let mut text = String::from("📢 <b>Upcoming Signal</b>\n\n");
        text.push_str(&format!("⏰ <b>Entry in {}</b>\n", format_lead(lead_secs)));
        match candidate {
            Some(c) => {
                text.push_str(&self.candidate_lines(c, "Candidate Entry Digit"));
                text.push_str(&format!(
                    "🕒 Entry Time ({}): {}\n\n⚡ Get ready!",
                    escape_html(&self.zone_label),
                    self.format_time(slot_epoch)
                ));
            }
            None => {
                text.push_str("⚠️ Not enough data to produce a reliable signal right now.\n");
                text.push_str(&format!(
                    "🕒 Entry Time ({}): {}",
                    escape_html(&self.zone_label),
                    self.format_time(slot_epoch)
                ));
            }
        }
        text
    }

    fn render_firing(
        &self,
        slot_epoch: i64,
        expiry_epoch: i64,
        candidate: Option<&Candidate>,
    ) -> String {
        let zone = escape_html(&self.zone_label);
        let mut text = String::from("⚡ <b>Main Signal</b>\n\n");
        match candidate {
            Some(c) => text.push_str(&self.candidate_lines(c, "Entry Point Digit")),
            None => text.push_str("⚠️ Not enough data for a reliable signal.\n"),
        }
        text.push_str(&format!(
            "🕒 Time ({zone}): {}\n⏳ Expires: {} ({zone})",
            self.format_time(slot_epoch),
            self.format_time(expiry_epoch)
        ));
        if candidate.is_some() {
            text.push_str("\n\n🔥 Execute now!");
        }
        text
    }

    fn render_expiry(&self, expiry_epoch: i64, next_slot_epoch: i64) -> String {
        let zone = escape_html(&self.zone_label);
        format!(
            "✅ <b>Signal Expired</b>\n\n🕒 Expired at: {} ({zone})\n🔔 Next slot: {} ({zone})",
            self.format_time(expiry_epoch),
            self.format_time(next_slot_epoch)
        )
    }

    fn candidate_lines(&self, c: &Candidate, digit_label: &str) -> String {
        format!(
            "📊 Market: <b>{}</b>\n🎯 Strategy: <b>{}</b>\n🔢 {digit_label}: <b>{}</b>\n📈 Confidence: <b>{:.2}%</b> ({}/{})\n",
            escape_html(self.display_name(&c.instrument)),
            c.rule,
            c.preceding_digit,
            c.confidence * 100.0,
            c.supporting,
            c.total
        )
    }
}

/// "2 minutes", "1 minute", "90 seconds".
fn format_lead(secs: i64) -> String {
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{s} seconds"),
    }
}

/// Escape text for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
