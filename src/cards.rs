//! Card content for each page, used by the carousel.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::entities::{Contact, ContactCard, CrmEntry, Lead, Meeting, Poc};
use crate::formatter::{RenderType, Tone};
use crate::record::{ColumnSpec, MISSING, Record};

pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Green => Color::Green,
        Tone::Gray => Color::Gray,
        Tone::Yellow => Color::Yellow,
        Tone::Blue => Color::Blue,
        Tone::Red => Color::Red,
        Tone::Purple => Color::Magenta,
        Tone::Emerald => Color::LightGreen,
        Tone::Unknown => Color::DarkGray,
    }
}

pub fn badge(text: &str, render: RenderType) -> Span<'static> {
    let tone = render.tone(text);
    Span::styled(
        format!(" {text} "),
        Style::default()
            .fg(Color::Black)
            .bg(tone_color(tone))
            .add_modifier(Modifier::BOLD),
    )
}

fn field(label: &str, value: &str) -> Line<'static> {
    let value = if value.is_empty() { MISSING } else { value };
    Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value.to_string()),
    ])
}

fn heading(contact: &impl Contact, position: usize) -> Vec<Line<'static>> {
    let subtitle = match (contact.designation(), contact.company()) {
        ("", "") => String::new(),
        (d, "") => d.to_string(),
        ("", c) => c.to_string(),
        (d, c) => format!("{d} at {c}"),
    };
    vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", contact.initial()),
                Style::default().fg(Color::White).bg(Color::Blue).bold(),
            ),
            Span::raw(" "),
            Span::styled(contact.name().to_string(), Style::default().bold()),
            Span::styled(format!("  #{}", position + 1), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(Span::styled(subtitle, Style::default().fg(Color::Gray))),
        Line::default(),
    ]
}

fn contact_lines(contact: &impl Contact) -> Vec<Line<'static>> {
    vec![
        field("Phone", contact.phone()),
        field("Email", contact.email()),
    ]
}

pub fn poc_card(poc: &Poc, position: usize) -> Text<'static> {
    let mut lines = heading(poc, position);
    lines.push(Line::from(badge(&poc.status, RenderType::PocStatus)));
    lines.push(Line::default());
    lines.extend(contact_lines(poc));
    for (i, phone) in poc.phones.iter().enumerate().skip(1) {
        lines.push(field(&format!("Phone {}", i + 1), phone));
    }
    lines.push(field("Location", &poc.location));
    lines.push(field("Industry", &poc.industry));
    lines.push(field("Employees", &poc.employees.to_string()));
    lines.push(field("Batch", &poc.batch));
    lines.push(field("Source", &poc.source));
    lines.push(field("Comments", &poc.comments));
    Text::from(lines)
}

pub fn crm_card(entry: &CrmEntry, position: usize) -> Text<'static> {
    let mut lines = heading(entry, position);
    lines.push(Line::from(badge(&entry.status, RenderType::CrmStatus)));
    lines.push(Line::default());
    lines.extend(contact_lines(entry));
    lines.push(field("Reachout", &entry.date_of_reachout));
    lines.push(field("Follow-up", &entry.date_of_follow_up));
    lines.push(field("Location", &format!("{}, {}", entry.city, entry.state)));
    lines.push(field("Industry", &entry.industry));
    lines.push(field("SDR", &entry.sdr));
    lines.push(field("Feedback", &entry.client_feedback));
    Text::from(lines)
}

pub fn lead_card(lead: &Lead, position: usize) -> Text<'static> {
    let mut lines = heading(lead, position);
    lines.push(Line::from(vec![
        badge(lead.status(), RenderType::LeadStatus),
        Span::raw(" "),
        badge(&lead.priority, RenderType::Priority),
    ]));
    lines.push(Line::default());
    lines.extend(contact_lines(lead));
    lines.push(field("Assigned", &lead.assigned_date));
    lines.push(field(
        "Activity",
        &format!("{} ({})", lead.last_activity, lead.last_activity_date),
    ));
    lines.push(field("Notes", &lead.notes));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "[s] status  [e] notes  [l] log call",
        Style::default().fg(Color::DarkGray),
    )));
    Text::from(lines)
}

pub fn meeting_card(meeting: &Meeting, position: usize) -> Text<'static> {
    Text::from(vec![
        Line::from(vec![
            Span::styled(meeting.title.clone(), Style::default().bold()),
            Span::styled(format!("  #{}", position + 1), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(badge(&meeting.status, RenderType::MeetingStatus)),
        Line::default(),
        field("Date", &format!("{} {}", meeting.date, meeting.time)),
        field("Duration", &meeting.duration),
        field("Purpose", &meeting.purpose),
        field("With", &meeting.participants),
        field("Notes", &meeting.notes),
    ])
}

/// Imported records: contact fields first when present, then every column
/// in file order.
pub fn record_card(record: &Record, columns: &[ColumnSpec], position: usize) -> Text<'static> {
    let contact = ContactCard::from_record(record);
    let mut lines = if contact.name.is_empty() {
        vec![
            Line::from(Span::styled(format!("Record #{}", position + 1), Style::default().bold())),
            Line::default(),
        ]
    } else {
        heading(&contact, position)
    };
    lines.extend(columns.iter().map(|column| {
        let value = record.get(&column.key).map(|v| v.to_string());
        field(&column.title, value.as_deref().unwrap_or(""))
    }));
    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockData;

    fn plain(text: &Text) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn poc_card_shows_every_phone() {
        let pocs = MockData::new(chrono::Local::now(), 1).pocs();
        let lines = plain(&poc_card(&pocs[0], 0));
        assert_eq!(lines[0], " C  Contact 1  #1");
        assert_eq!(lines[1], "CEO at Company A");
        assert!(lines.iter().any(|l| l.starts_with("Phone 6")));
    }

    #[test]
    fn record_card_without_name() {
        let record = Record::new().with("city", "Oslo");
        let columns = [ColumnSpec::new("city", "city")];
        let lines = plain(&record_card(&record, &columns, 4));
        assert_eq!(lines[0], "Record #5");
        assert_eq!(lines[2], "city        Oslo");
    }

    #[test]
    fn record_card_keeps_column_order() {
        let record = Record::new()
            .with("zip", "0150")
            .with("city", "Oslo")
            .with("age", 41.0);
        let columns = [
            ColumnSpec::new("zip", "zip"),
            ColumnSpec::new("city", "city"),
            ColumnSpec::new("age", "age"),
            ColumnSpec::new("email", "email"),
        ];
        let lines = plain(&record_card(&record, &columns, 0));
        let labels: Vec<&str> = lines[2..].iter().map(|l| l[..12].trim_end()).collect();
        assert_eq!(labels, vec!["zip", "city", "age", "email"]);
        assert_eq!(lines[5], format!("{:<12}{MISSING}", "email"));
    }

    #[test]
    fn empty_fields_render_missing() {
        assert_eq!(
            plain(&Text::from(field("Email", ""))),
            vec![format!("{:<12}{MISSING}", "Email")]
        );
    }
}
