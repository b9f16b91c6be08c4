use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::domain::DashError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Sdr,
}

struct User {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: Role,
}

// Demo accounts, there is no user database
const USERS: [User; 3] = [
    User {
        id: "1",
        name: "Admin User",
        email: "admin@gmail.com",
        password: "123456",
        role: Role::Admin,
    },
    User {
        id: "2",
        name: "John Doe",
        email: "john@example.com",
        password: "password123",
        role: Role::Sdr,
    },
    User {
        id: "3",
        name: "Jane Smith",
        email: "jane@example.com",
        password: "password123",
        role: Role::Sdr,
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub logged_in_at: DateTime<Local>,
}

pub fn login(email: &str, password: &str, now: DateTime<Local>) -> Result<Session, DashError> {
    let Some(user) = USERS
        .iter()
        .find(|u| u.email == email && u.password == password)
    else {
        warn!("Rejected login for \"{email}\"");
        return Err(DashError::InvalidCredentials);
    };

    info!("{} logged in", user.email);
    Ok(Session {
        id: user.id.to_string(),
        name: user.name.to_string(),
        email: user.email.to_string(),
        role: user.role,
        logged_in_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_user_gets_a_session() {
        let now = Local::now();
        let session = login("john@example.com", "password123", now).unwrap();
        assert_eq!(session.name, "John Doe");
        assert_eq!(session.role, Role::Sdr);
        assert_eq!(session.logged_in_at, now);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let result = login("admin@gmail.com", "654321", Local::now());
        assert!(matches!(result, Err(DashError::InvalidCredentials)));
    }

    #[test]
    fn email_must_match_exactly() {
        let result = login("ADMIN@gmail.com", "123456", Local::now());
        assert!(matches!(result, Err(DashError::InvalidCredentials)));
    }
}
