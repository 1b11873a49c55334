//! Plain-text output for records and chat.

use std::io::{self, Write};

use hostel_core::assistant::AnalyticsSummary;
use hostel_core::chat::Message;
use hostel_core::records::{Bill, MaintenanceRequest, Notification, ResourceUsage, Room};
use hostel_core::resources::UsageAnalysis;

pub fn write_rooms(w: &mut impl Write, rooms: &[Room]) -> io::Result<()> {
    if rooms.is_empty() {
        return writeln!(w, "No rooms");
    }
    writeln!(w, "{:<10} {:<6} {:>9}  {:<12} ID", "ROOM", "BLOCK", "OCCUPANCY", "STATUS")?;
    for room in rooms {
        writeln!(
            w,
            "{:<10} {:<6} {:>9}  {:<12} {}",
            room.room_number,
            room.block,
            format!("{}/{}", room.occupied, room.capacity),
            room.status,
            room.id
        )?;
    }
    Ok(())
}

pub fn write_bills(w: &mut impl Write, bills: &[Bill]) -> io::Result<()> {
    if bills.is_empty() {
        return writeln!(w, "No bills");
    }
    for bill in bills {
        writeln!(
            w,
            "{}  ${:>9.2}  due {}  {:<8} {}",
            bill.id, bill.amount, bill.due_date, bill.status, bill.description
        )?;
    }
    Ok(())
}

pub fn write_requests(w: &mut impl Write, requests: &[MaintenanceRequest]) -> io::Result<()> {
    if requests.is_empty() {
        return writeln!(w, "No maintenance requests");
    }
    for req in requests {
        writeln!(w, "  ID:       {}", req.id)?;
        writeln!(w, "  Type:     {}", req.kind)?;
        writeln!(w, "  Priority: {:?}", req.priority)?;
        writeln!(w, "  Status:   {}", req.status)?;
        writeln!(w, "  Filed:    {}", req.created_at.format("%Y-%m-%d %H:%M"))?;
        writeln!(w, "  {}", req.description)?;
        writeln!(w)?;
    }
    Ok(())
}

pub fn write_notifications(w: &mut impl Write, notes: &[Notification]) -> io::Result<()> {
    if notes.is_empty() {
        return writeln!(w, "No notifications");
    }
    for n in notes {
        let marker = if n.read { " " } else { "*" };
        writeln!(
            w,
            "{marker} {}  [{:?}] {}: {}",
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.kind,
            n.title,
            n.message
        )?;
        writeln!(w, "    id: {}", n.id)?;
    }
    Ok(())
}

pub fn write_usage(w: &mut impl Write, history: &[ResourceUsage]) -> io::Result<()> {
    if history.is_empty() {
        return writeln!(w, "No readings yet");
    }
    writeln!(w, "{:<12} {:>10} {:>14}", "DATE", "WATER m3", "ELECTRIC kWh")?;
    for r in history {
        writeln!(
            w,
            "{:<12} {:>10.1} {:>14.1}",
            r.recorded_at.format("%Y-%m-%d"),
            r.water_usage,
            r.electricity_usage
        )?;
    }
    Ok(())
}

pub fn write_analysis(w: &mut impl Write, analysis: &UsageAnalysis) -> io::Result<()> {
    writeln!(w, "Status:     {}", analysis.status)?;
    writeln!(w, "Efficiency: {}/100", analysis.efficiency_score)?;
    for line in &analysis.recommendations {
        writeln!(w, "  {line}")?;
    }
    Ok(())
}

pub fn write_message(w: &mut impl Write, msg: &Message) -> io::Result<()> {
    let who = match msg.sender {
        hostel_core::chat::Sender::User => "You",
        hostel_core::chat::Sender::Bot => "Assistant",
    };
    writeln!(
        w,
        "[{}] {who}: {}",
        msg.created_at.format("%Y-%m-%d %H:%M"),
        msg.text
    )?;
    for action in &msg.actions {
        writeln!(w, "    -> {}", action.label)?;
    }
    if !msg.reactions.is_empty() {
        let emojis: Vec<&str> = msg.reactions.iter().map(|r| r.kind.emoji()).collect();
        writeln!(w, "    {}", emojis.join(" "))?;
    }
    Ok(())
}

pub fn write_summary(w: &mut impl Write, summary: &AnalyticsSummary) -> io::Result<()> {
    writeln!(w, "Active users:   {}", summary.active_users)?;
    writeln!(w, "Sessions:       {}", summary.total_sessions)?;
    match summary.helpfulness_rate() {
        Some(rate) => writeln!(
            w,
            "Helpful:        {} of {} ({:.0}%)",
            summary.helpful,
            summary.helpful + summary.not_helpful,
            rate * 100.0
        )?,
        None => writeln!(w, "Helpful:        no votes")?,
    }
    if !summary.query_types.is_empty() {
        writeln!(w, "Query types:")?;
        for (kind, count) in &summary.query_types {
            writeln!(w, "  {kind:<14} {count}")?;
        }
    }
    if !summary.reactions.is_empty() {
        writeln!(w, "Reactions:")?;
        for (emoji, count) in &summary.reactions {
            writeln!(w, "  {emoji}  {count}")?;
        }
    }
    Ok(())
}
