use std::fmt;

use crate::record::ColumnSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    PocData,
    CrmData,
    Meetings,
    Leads,
    Imported,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Dashboard,
        Page::PocData,
        Page::CrmData,
        Page::Meetings,
        Page::Leads,
        Page::Imported,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::PocData => "POC Data",
            Page::CrmData => "CRM Data",
            Page::Meetings => "Meeting Manager",
            Page::Leads => "My Leads",
            Page::Imported => "Imported",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Page::Dashboard => "Here's an overview of your sales activities",
            Page::PocData => "View and manage your point of contact data",
            Page::CrmData => "View and manage your customer relationship data",
            Page::Meetings => "Schedule and manage your meetings",
            Page::Leads => "Manage and track your assigned leads",
            Page::Imported => "Records loaded from a data file",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a table needs besides its records.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub title: String,
    pub columns: Vec<ColumnSpec>,
    pub search_keys: Vec<String>,
    pub hidden_columns: Vec<String>,
}

fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

pub fn poc_table() -> TableSpec {
    TableSpec {
        title: "Points of Contact".to_string(),
        columns: vec![
            ColumnSpec::new("id", "ID"),
            ColumnSpec::new("poc_name", "Name"),
            ColumnSpec::new("designation", "Designation"),
            ColumnSpec::new("company", "Company"),
            ColumnSpec::new("phone", "Phone"),
            ColumnSpec::new("email", "Email"),
            ColumnSpec::new("location", "Location"),
            ColumnSpec::new("industry", "Industry"),
            ColumnSpec::new("status", "Status").render("pocStatus"),
            ColumnSpec::new("batch", "Batch"),
        ],
        search_keys: keys(&["poc_name", "company", "email", "phone", "location", "industry"]),
        hidden_columns: Vec::new(),
    }
}

pub fn crm_table() -> TableSpec {
    TableSpec {
        title: "CRM Data".to_string(),
        columns: vec![
            ColumnSpec::new("id", "ID"),
            ColumnSpec::new("poc_name", "Contact Name"),
            ColumnSpec::new("company", "Company"),
            ColumnSpec::new("designation", "Designation"),
            ColumnSpec::new("status", "Status").render("crmStatus"),
            ColumnSpec::new("poc_phonenumber", "Phone"),
            ColumnSpec::new("poc_email", "Email"),
            ColumnSpec::new("date_of_reachout", "Reachout Date"),
            ColumnSpec::new("date_of_follow_up", "Follow-up Date"),
            ColumnSpec::new("location", "Location"),
            ColumnSpec::new("industry", "Industry"),
            ColumnSpec::new("sdr", "SDR"),
        ],
        search_keys: keys(&[
            "poc_name",
            "company",
            "poc_email",
            "poc_phonenumber",
            "location",
            "industry",
        ]),
        hidden_columns: Vec::new(),
    }
}

pub fn meeting_table() -> TableSpec {
    TableSpec {
        title: "Scheduled Meetings".to_string(),
        columns: vec![
            ColumnSpec::new("id", "ID"),
            ColumnSpec::new("title", "Title"),
            ColumnSpec::new("date", "Date"),
            ColumnSpec::new("time", "Time"),
            ColumnSpec::new("duration", "Duration"),
            ColumnSpec::new("purpose", "Purpose"),
            ColumnSpec::new("participants", "Participants"),
            ColumnSpec::new("status", "Status").render("meetingStatus"),
            ColumnSpec::new("notes", "Notes"),
        ],
        search_keys: keys(&["title", "purpose", "participants", "status"]),
        hidden_columns: keys(&["notes"]),
    }
}

pub fn lead_table() -> TableSpec {
    TableSpec {
        title: "My Leads".to_string(),
        columns: vec![
            ColumnSpec::new("poc_name", "Name"),
            ColumnSpec::new("company", "Company"),
            ColumnSpec::new("status", "Status").render("leadStatus"),
            ColumnSpec::new("priority", "Priority").render("priority"),
            ColumnSpec::new("lastActivity", "Last Activity"),
            ColumnSpec::new("lastActivityDate", "Activity Date"),
            ColumnSpec::new("poc_email", "Email"),
            ColumnSpec::new("poc_phonenumber", "Phone"),
            ColumnSpec::new("notes", "Notes"),
        ],
        search_keys: keys(&["poc_name", "company", "poc_email", "status"]),
        hidden_columns: keys(&["poc_email", "poc_phonenumber", "notes"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_and_hidden_keys_name_real_columns() {
        for spec in [poc_table(), crm_table(), meeting_table(), lead_table()] {
            let declared: Vec<&str> = spec.columns.iter().map(|c| c.key.as_str()).collect();
            for hidden in &spec.hidden_columns {
                assert!(declared.contains(&hidden.as_str()), "{hidden} in {}", spec.title);
            }
            assert!(!spec.search_keys.is_empty());
        }
    }

    #[test]
    fn status_columns_have_formatters() {
        for spec in [poc_table(), crm_table(), meeting_table(), lead_table()] {
            let status = spec.columns.iter().find(|c| c.key == "status").unwrap();
            assert!(status.render.is_some(), "{}", spec.title);
        }
    }
}
