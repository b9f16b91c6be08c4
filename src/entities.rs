//! Typed records per data domain and their flattening into [`Record`]s.

use crate::record::{Record, Value};

/// Statuses a lead can be moved through, in cycle order.
pub const LEAD_STATUSES: [&str; 6] = [
    "New",
    "Contacted",
    "Qualified",
    "Meeting Set",
    "Closed Won",
    "Closed Lost",
];

/// Common view on anything that describes a person to reach out to.
pub trait Contact {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn company(&self) -> &str;
    fn designation(&self) -> &str;
    fn phone(&self) -> &str;
    fn email(&self) -> &str;

    fn initial(&self) -> char {
        self.name().chars().next().unwrap_or('?')
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Poc {
    pub id: String,
    pub name: String,
    pub designation: String,
    pub location: String,
    pub employees: u32,
    pub industry: String,
    pub company: String,
    pub linkedin: String,
    pub phones: Vec<String>,
    pub email: String,
    pub batch: String,
    pub comments: String,
    pub source: String,
    pub outlets: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub status: String,
}

impl Poc {
    pub fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with("id", self.id.as_str())
            .with("poc_name", self.name.as_str())
            .with("designation", self.designation.as_str())
            .with("location", self.location.as_str())
            .with("employee", self.employees)
            .with("industry", self.industry.as_str())
            .with("company", self.company.as_str())
            .with("linkedin", self.linkedin.as_str())
            .with("email", self.email.as_str())
            .with("batch", self.batch.as_str())
            .with("comments", self.comments.as_str())
            .with("source", self.source.as_str())
            .with("outlets", self.outlets.clone())
            .with("created_at", Value::Date(self.created_at.clone()))
            .with("updated_at", Value::Date(self.updated_at.clone()))
            .with("status", self.status.as_str());
        for (i, phone) in self.phones.iter().enumerate() {
            let key = if i == 0 {
                "phone".to_string()
            } else {
                format!("phone_{}", i + 1)
            };
            record.insert(&key, phone.as_str());
        }
        record
    }
}

impl Contact for Poc {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn company(&self) -> &str {
        &self.company
    }
    fn designation(&self) -> &str {
        &self.designation
    }
    fn phone(&self) -> &str {
        self.phones.first().map(String::as_str).unwrap_or("")
    }
    fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrmEntry {
    pub id: String,
    pub sdr: String,
    pub status: String,
    pub date_of_reachout: String,
    pub batch: String,
    pub employees: u32,
    pub company: String,
    pub poc_name: String,
    pub company_linkedin: String,
    pub poc_linkedin: String,
    pub comments: String,
    pub date_of_follow_up: String,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub domain: String,
    pub location: String,
    pub industry: String,
    pub source: String,
    pub city: String,
    pub state: String,
    pub taxable: bool,
    pub first_name: String,
    pub last_name: String,
    pub designation: String,
    pub outlets: Vec<String>,
    pub is_poc: bool,
    pub client_feedback: String,
    pub client_status: String,
    pub hlr_status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CrmEntry {
    pub fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with("id", self.id.as_str())
            .with("sdr", self.sdr.as_str())
            .with("status", self.status.as_str())
            .with("date_of_reachout", Value::Date(self.date_of_reachout.clone()))
            .with("batch", self.batch.as_str())
            .with("employee", self.employees)
            .with("company", self.company.as_str())
            .with("poc_name", self.poc_name.as_str())
            .with("company_linkedin", self.company_linkedin.as_str())
            .with("poc_linkedin", self.poc_linkedin.as_str())
            .with("comments", self.comments.as_str())
            .with("date_of_follow_up", Value::Date(self.date_of_follow_up.clone()))
            .with("domain", self.domain.as_str())
            .with("location", self.location.as_str())
            .with("industry", self.industry.as_str())
            .with("source", self.source.as_str())
            .with("city", self.city.as_str())
            .with("state", self.state.as_str())
            .with("taxable", self.taxable)
            .with("first_name", self.first_name.as_str())
            .with("last_name", self.last_name.as_str())
            .with("designation", self.designation.as_str())
            .with("outlets", self.outlets.clone())
            .with("if_poc", self.is_poc)
            .with("client_feedback", self.client_feedback.as_str())
            .with("client_status", self.client_status.as_str())
            .with("hlr_status", self.hlr_status.as_str())
            .with("created_at", Value::Date(self.created_at.clone()))
            .with("updated_at", Value::Date(self.updated_at.clone()));
        for (i, phone) in self.phones.iter().enumerate() {
            let key = match i {
                0 => "poc_phonenumber".to_string(),
                n => format!("poc_phonenumber{}", n + 1),
            };
            record.insert(&key, phone.as_str());
        }
        for (i, email) in self.emails.iter().enumerate() {
            let key = match i {
                0 => "poc_email".to_string(),
                n => format!("poc_email{}", n + 1),
            };
            record.insert(&key, email.as_str());
        }
        record
    }
}

impl Contact for CrmEntry {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.poc_name
    }
    fn company(&self) -> &str {
        &self.company
    }
    fn designation(&self) -> &str {
        &self.designation
    }
    fn phone(&self) -> &str {
        self.phones.first().map(String::as_str).unwrap_or("")
    }
    fn email(&self) -> &str {
        self.emails.first().map(String::as_str).unwrap_or("")
    }
}

/// A CRM entry assigned to the signed in SDR, plus activity tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub entry: CrmEntry,
    pub priority: String,
    pub assigned_date: String,
    pub last_activity: String,
    pub last_activity_date: String,
    pub notes: String,
}

impl Lead {
    pub fn status(&self) -> &str {
        &self.entry.status
    }

    pub fn to_record(&self) -> Record {
        let mut record = self.entry.to_record();
        record.insert("priority", self.priority.as_str());
        record.insert("assignedDate", Value::Date(self.assigned_date.clone()));
        record.insert("lastActivity", self.last_activity.as_str());
        record.insert("lastActivityDate", Value::Date(self.last_activity_date.clone()));
        record.insert("notes", self.notes.as_str());
        record
    }
}

impl Contact for Lead {
    fn id(&self) -> &str {
        self.entry.id()
    }
    fn name(&self) -> &str {
        self.entry.name()
    }
    fn company(&self) -> &str {
        self.entry.company()
    }
    fn designation(&self) -> &str {
        self.entry.designation()
    }
    fn phone(&self) -> &str {
        self.entry.phone()
    }
    fn email(&self) -> &str {
        self.entry.email()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub purpose: String,
    pub participants: String,
    pub status: String,
    pub notes: String,
}

impl Meeting {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.as_str())
            .with("title", self.title.as_str())
            .with("date", Value::Date(self.date.clone()))
            .with("time", self.time.as_str())
            .with("duration", self.duration.as_str())
            .with("purpose", self.purpose.as_str())
            .with("participants", self.participants.as_str())
            .with("status", self.status.as_str())
            .with("notes", self.notes.as_str())
    }

    pub fn is_open(&self) -> bool {
        self.status != "Completed"
    }
}

// Field names different sources use for the same thing, most specific first
const NAME_FIELDS: [&str; 3] = ["poc_name", "name", "full_name"];
const COMPANY_FIELDS: [&str; 2] = ["company", "organization"];
const DESIGNATION_FIELDS: [&str; 3] = ["designation", "position", "title"];
const PHONE_FIELDS: [&str; 3] = ["poc_phonenumber", "phone", "phone_number"];
const EMAIL_FIELDS: [&str; 2] = ["poc_email", "email"];

/// Contact details resolved from an untyped record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactCard {
    pub id: String,
    pub name: String,
    pub company: String,
    pub designation: String,
    pub phone: String,
    pub email: String,
}

impl ContactCard {
    pub fn from_record(record: &Record) -> Self {
        let pick = |aliases: &[&str]| -> String {
            aliases
                .iter()
                .filter_map(|key| record.get(key))
                .map(|v| v.to_string())
                .find(|s| !s.is_empty())
                .unwrap_or_default()
        };
        Self {
            id: pick(&["id"]),
            name: pick(&NAME_FIELDS),
            company: pick(&COMPANY_FIELDS),
            designation: pick(&DESIGNATION_FIELDS),
            phone: pick(&PHONE_FIELDS),
            email: pick(&EMAIL_FIELDS),
        }
    }
}

impl Contact for ContactCard {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn company(&self) -> &str {
        &self.company
    }
    fn designation(&self) -> &str {
        &self.designation
    }
    fn phone(&self) -> &str {
        &self.phone
    }
    fn email(&self) -> &str {
        &self.email
    }
}
