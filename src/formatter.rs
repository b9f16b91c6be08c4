use std::str::FromStr;

use crate::record::{ColumnSpec, MISSING, Value};

/// Cell formatters a column can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderType {
    PocStatus,
    CrmStatus,
    LeadStatus,
    Priority,
    MeetingStatus,
}

impl FromStr for RenderType {
    type Err = ();

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "pocStatus" => Ok(RenderType::PocStatus),
            "crmStatus" => Ok(RenderType::CrmStatus),
            "leadStatus" => Ok(RenderType::LeadStatus),
            "priority" => Ok(RenderType::Priority),
            "meetingStatus" => Ok(RenderType::MeetingStatus),
            _ => Err(()),
        }
    }
}

/// Colour category of a badge. The UI maps it onto terminal colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Green,
    Gray,
    Yellow,
    Blue,
    Red,
    Purple,
    Emerald,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    /// Set for badge style cells
    pub tone: Option<Tone>,
}

impl RenderType {
    pub fn tone(&self, status: &str) -> Tone {
        match self {
            RenderType::PocStatus => match status {
                "Active" => Tone::Green,
                "Inactive" => Tone::Gray,
                "Pending" => Tone::Yellow,
                "Qualified" => Tone::Blue,
                "Not Interested" => Tone::Red,
                _ => Tone::Unknown,
            },
            RenderType::CrmStatus | RenderType::LeadStatus => match status {
                "New" => Tone::Blue,
                "Contacted" => Tone::Yellow,
                "Qualified" => Tone::Green,
                "Proposal" | "Meeting Set" => Tone::Purple,
                "Closed Won" => Tone::Emerald,
                "Closed Lost" => Tone::Red,
                _ => Tone::Unknown,
            },
            RenderType::Priority => match status {
                "High" => Tone::Red,
                "Medium" => Tone::Yellow,
                "Low" => Tone::Blue,
                _ => Tone::Unknown,
            },
            RenderType::MeetingStatus => match status {
                "Completed" => Tone::Gray,
                "Upcoming" => Tone::Yellow,
                "Scheduled" => Tone::Green,
                _ => Tone::Unknown,
            },
        }
    }
}

pub fn render_cell(column: &ColumnSpec, value: Option<&Value>) -> Cell {
    match column.render {
        None => Cell {
            text: plain(value),
            tone: None,
        },
        Some(render) => {
            let text = match value.map(|v| v.to_string()) {
                Some(s) if !s.is_empty() => s,
                _ => "Unknown".to_string(),
            };
            let tone = render.tone(&text);
            Cell {
                text,
                tone: Some(tone),
            }
        }
    }
}

fn plain(value: Option<&Value>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_column(tag: &str) -> ColumnSpec {
        ColumnSpec::new("status", "Status").render(tag)
    }

    #[test]
    fn plain_columns_use_string_form() {
        let column = ColumnSpec::new("employee", "Employees");
        let cell = render_cell(&column, Some(&Value::Number(120.0)));
        assert_eq!(cell.text, "120");
        assert_eq!(cell.tone, None);
        assert_eq!(render_cell(&column, None).text, "N/A");
    }

    #[test]
    fn known_statuses_get_their_tone() {
        let poc = status_column("pocStatus");
        let cell = render_cell(&poc, Some(&Value::from("Not Interested")));
        assert_eq!(cell.tone, Some(Tone::Red));

        let crm = status_column("crmStatus");
        let cell = render_cell(&crm, Some(&Value::from("Closed Won")));
        assert_eq!(cell.tone, Some(Tone::Emerald));
        assert_eq!(cell.text, "Closed Won");
    }

    #[test]
    fn unknown_or_missing_status_falls_back() {
        let crm = status_column("crmStatus");
        let cell = render_cell(&crm, Some(&Value::from("Dormant")));
        assert_eq!(cell.tone, Some(Tone::Unknown));
        assert_eq!(cell.text, "Dormant");

        let cell = render_cell(&crm, None);
        assert_eq!(cell.text, "Unknown");
        assert_eq!(cell.tone, Some(Tone::Unknown));

        let cell = render_cell(&crm, Some(&Value::from("")));
        assert_eq!(cell.text, "Unknown");
    }

    #[test]
    fn unrecognized_tag_renders_plain() {
        let column = status_column("rainbow");
        let cell = render_cell(&column, Some(&Value::from("Active")));
        assert_eq!(cell.text, "Active");
        assert_eq!(cell.tone, None);
    }
}
