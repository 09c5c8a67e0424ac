use serde::{Deserialize, Serialize};

/// Signed-in user profile as exchanged with the backend.
///
/// The backend serializes profiles in camelCase; optional fields are
/// omitted rather than sent as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// Role names the backend assigns to accounts.
pub mod roles {
    pub const STUDENT: &str = "Student";
    pub const MENTOR: &str = "Mentor";
    pub const STUDENT_AFFAIRS: &str = "Student Affairs";
    pub const ACADEMIC_OFFICE: &str = "Academic Office";
    pub const SYSTEM_ADMINISTRATOR: &str = "System Administrator";

    /// Roles granted elevated access by administrative screens.
    pub const STAFF: [&str; 3] = [STUDENT_AFFAIRS, ACADEMIC_OFFICE, SYSTEM_ADMINISTRATOR];
}
