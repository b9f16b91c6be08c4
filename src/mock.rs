use chrono::{DateTime, Duration, Local, SecondsFormat};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::entities::{CrmEntry, Lead, Meeting, Poc};

const DESIGNATIONS: [&str; 7] = ["CEO", "CTO", "CFO", "COO", "VP Sales", "Director", "Manager"];
const LOCATIONS: [&str; 7] = [
    "New York",
    "San Francisco",
    "Chicago",
    "Austin",
    "Seattle",
    "Boston",
    "Denver",
];
const STATES: [&str; 7] = ["NY", "CA", "IL", "TX", "WA", "MA", "CO"];
const INDUSTRIES: [&str; 7] = [
    "Technology",
    "Healthcare",
    "Finance",
    "Retail",
    "Manufacturing",
    "Education",
    "Media",
];
const SOURCES: [&str; 6] = [
    "Website",
    "LinkedIn",
    "Referral",
    "Conference",
    "Cold Call",
    "Email Campaign",
];
const POC_STATUSES: [&str; 5] = ["Active", "Inactive", "Pending", "Qualified", "Not Interested"];
const CRM_STATUSES: [&str; 6] = [
    "New",
    "Contacted",
    "Qualified",
    "Meeting Set",
    "Closed Won",
    "Closed Lost",
];
const CLIENT_STATUSES: [&str; 4] = ["Active", "Inactive", "Potential", "Former"];
const HLR_STATUSES: [&str; 4] = ["Verified", "Pending", "Failed", "N/A"];
const PURPOSES: [&str; 5] = [
    "Initial Contact",
    "Product Demo",
    "Follow-up",
    "Contract Discussion",
    "Onboarding",
];
const PRIORITIES: [&str; 3] = ["High", "Medium", "Low"];

/// Display format for calendar dates, e.g. `3/7/2026`.
pub const DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Deterministic source of sample records.
pub struct MockData {
    now: DateTime<Local>,
    rng: StdRng,
}

fn company_letter(i: usize) -> char {
    (b'A' + (i % 26) as u8) as char
}

fn comments(i: usize) -> &'static str {
    match i % 3 {
        0 => "Interested in our services",
        1 => "Requested a follow-up call",
        _ => "Needs more information",
    }
}

fn outlets(i: usize) -> Vec<String> {
    let items: &[&str] = if i % 2 == 0 {
        &["Web", "Mobile", "Social"]
    } else {
        &["Mobile", "Web"]
    };
    items.iter().map(|s| s.to_string()).collect()
}

impl MockData {
    pub fn new(now: DateTime<Local>, seed: u64) -> Self {
        Self {
            now,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn date(&self, days: i64) -> String {
        (self.now + Duration::days(days))
            .format(DATE_FORMAT)
            .to_string()
    }

    fn timestamp(&self, days: i64) -> String {
        (self.now + Duration::days(days))
            .with_timezone(&chrono::Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn employees(&mut self) -> u32 {
        self.rng.random_range(10..510)
    }

    pub fn pocs(&mut self) -> Vec<Poc> {
        let pocs: Vec<Poc> = (0..20)
            .map(|i| {
                let letter = company_letter(i);
                let n = i as u32;
                let mut phones = vec![format!("+1 (555) {}-{}", 100 + n, 1000 + n)];
                for (k, every) in [(2u32, 3usize), (3, 5), (4, 7), (5, 9), (6, 11)] {
                    if i % every == 0 {
                        phones.push(format!("+1 (555) {}-{}", k * 100 + n, k * 1000 + n));
                    }
                }
                Poc {
                    id: format!("POC-{}", 1000 + i),
                    name: format!("Contact {}", i + 1),
                    designation: DESIGNATIONS[i % 7].to_string(),
                    location: LOCATIONS[i % 7].to_string(),
                    employees: self.employees(),
                    industry: INDUSTRIES[i % 7].to_string(),
                    company: format!("Company {letter}"),
                    linkedin: format!("https://linkedin.com/company-{i}"),
                    phones,
                    email: format!("contact{}@company{letter}.com", i + 1),
                    batch: format!("Batch-{}", i / 5 + 1),
                    comments: comments(i).to_string(),
                    source: SOURCES[i % 6].to_string(),
                    outlets: outlets(i),
                    created_at: self.timestamp(-(i as i64) * 7),
                    updated_at: self.timestamp(-(i as i64) * 2),
                    status: POC_STATUSES[i % 5].to_string(),
                }
            })
            .collect();
        debug!("Generated {} POC records", pocs.len());
        pocs
    }

    fn crm_entry(&mut self, id: String, i: usize) -> CrmEntry {
        let letter = company_letter(i);
        let n = i as u32;
        let mut phones = vec![format!("+1 (555) {}-{}", 100 + n, 1000 + n)];
        if i % 3 == 0 {
            phones.push(format!("+1 (555) {}-{}", 200 + n, 2000 + n));
        }
        let mut emails = vec![format!("contact{}@company{letter}.com", i + 1)];
        if i % 4 == 0 {
            emails.push(format!("contact{}.alt@company{letter}.com", i + 1));
        }
        let days = i as i64;
        CrmEntry {
            id,
            sdr: format!("SDR {}", i % 5 + 1),
            status: CRM_STATUSES[i % 6].to_string(),
            date_of_reachout: self.date(-days * 2),
            batch: format!("Batch-{}", i / 5 + 1),
            employees: self.employees(),
            company: format!("Company {letter}"),
            poc_name: format!("Contact {}", i + 1),
            company_linkedin: format!("https://linkedin.com/company-{i}"),
            poc_linkedin: format!("https://linkedin.com/in/contact-{i}"),
            comments: comments(i).to_string(),
            date_of_follow_up: self.date(days * 3),
            phones,
            emails,
            domain: format!("company{letter}.com"),
            location: LOCATIONS[i % 7].to_string(),
            industry: INDUSTRIES[i % 7].to_string(),
            source: SOURCES[i % 6].to_string(),
            city: LOCATIONS[i % 7].to_string(),
            state: STATES[i % 7].to_string(),
            taxable: i % 2 == 0,
            first_name: format!("First{}", i + 1),
            last_name: format!("Last{}", i + 1),
            designation: DESIGNATIONS[i % 7].to_string(),
            outlets: outlets(i),
            is_poc: i % 3 == 0,
            client_feedback: match i % 4 {
                0 => "Very positive",
                1 => "Somewhat interested",
                2 => "Needs more information",
                _ => "No feedback yet",
            }
            .to_string(),
            client_status: CLIENT_STATUSES[i % 4].to_string(),
            hlr_status: HLR_STATUSES[i % 4].to_string(),
            created_at: self.timestamp(-days * 7),
            updated_at: self.timestamp(-days * 2),
        }
    }

    pub fn crm_entries(&mut self) -> Vec<CrmEntry> {
        (0..20)
            .map(|i| self.crm_entry(format!("CRM-{}", 2000 + i), i))
            .collect()
    }

    pub fn leads(&mut self) -> Vec<Lead> {
        (0..20)
            .map(|i| {
                let entry = self.crm_entry(format!("LEAD-{}", 4000 + i), i);
                let days = i as i64;
                Lead {
                    entry,
                    priority: PRIORITIES[i % 3].to_string(),
                    assigned_date: self.date(-days * 5),
                    last_activity: match i % 3 {
                        0 => "Call",
                        1 => "Email",
                        _ => "Meeting",
                    }
                    .to_string(),
                    last_activity_date: self.date(-days),
                    notes: match i % 4 {
                        0 => "Interested in our product",
                        1 => "Requested pricing information",
                        2 => "Scheduled follow-up call",
                        _ => "Sent product brochure",
                    }
                    .to_string(),
                }
            })
            .collect()
    }

    pub fn meetings(&mut self) -> Vec<Meeting> {
        (0..15)
            .map(|i| {
                let even = i % 2 == 0;
                Meeting {
                    id: format!("MTG-{}", 3000 + i),
                    title: format!("Meeting with Company {}", company_letter(i)),
                    date: self.date(i as i64 - 5),
                    time: format!(
                        "{}:{} {}",
                        10 + i % 8,
                        if even { "00" } else { "30" },
                        if even { "AM" } else { "PM" }
                    ),
                    duration: format!("{} min", 30 + (i % 4) * 15),
                    purpose: PURPOSES[i % 5].to_string(),
                    participants: format!(
                        "Contact {}, {}",
                        i + 1,
                        match i % 3 {
                            0 => "Sales Manager",
                            1 => "Product Specialist",
                            _ => "Account Manager",
                        }
                    ),
                    status: match i {
                        0..5 => "Completed",
                        5..10 => "Upcoming",
                        _ => "Scheduled",
                    }
                    .to_string(),
                    notes: match i % 3 {
                        0 => "Prepare product demo materials",
                        1 => "Review previous conversation notes",
                        _ => "Send agenda before meeting",
                    }
                    .to_string(),
                }
            })
            .collect()
    }
}
