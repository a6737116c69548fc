//! Concrete picker entities
//!
//! Students and rooms as served by the dormitory list API. Only the
//! fields the pickers display or search are decoded; the rest of the
//! record is ignored.

use list_source::{Entity, QueryKey};
use serde::{Deserialize, Serialize};

/// A student account offered when creating a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: u32,
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub student_code: String,
}

impl Student {
    /// Users listed with the student role
    pub fn query_key() -> QueryKey {
        QueryKey::new("students").with_filter("role", "student")
    }
}

impl Entity for Student {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn label(&self) -> String {
        self.full_name.clone()
    }

    fn searchable_text(&self) -> String {
        format!("{} {} {}", self.full_name, self.email, self.student_code)
    }

    fn detail(&self) -> Option<String> {
        (!self.email.is_empty()).then(|| self.email.clone())
    }
}

/// A dormitory room offered when creating a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub room_number: String,
    #[serde(default)]
    pub user_count: u32,
}

impl Room {
    pub fn query_key() -> QueryKey {
        QueryKey::new("rooms")
    }
}

impl Entity for Room {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn label(&self) -> String {
        format!("Room {}", self.room_number)
    }

    fn searchable_text(&self) -> String {
        self.room_number.clone()
    }

    fn detail(&self) -> Option<String> {
        Some(format!("{} occupants", self.user_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use list_source::ListResponse;

    #[test]
    fn test_student_decodes_from_api_record() {
        let body = r#"{
            "data": [{
                "id": 7,
                "created_at": "2024-09-01T00:00:00Z",
                "full_name": "Tran Thi B",
                "student_code": "SV2024007",
                "email": "b@dorm.edu",
                "role": "student",
                "room": null
            }],
            "total": 31,
            "message": "ok",
            "success": true
        }"#;

        let response: ListResponse<Student> = serde_json::from_str(body).unwrap();
        let student = &response.data[0];
        assert_eq!(student.id(), 7);
        assert_eq!(student.label(), "Tran Thi B");
        assert_eq!(student.detail().as_deref(), Some("b@dorm.edu"));
        assert!(student.searchable_text().contains("SV2024007"));
    }

    #[test]
    fn test_student_without_email_has_no_detail() {
        let student: Student = serde_json::from_str(r#"{"id":1,"full_name":"A"}"#).unwrap();
        assert_eq!(student.detail(), None);
    }

    #[test]
    fn test_room_label_and_detail() {
        let room: Room =
            serde_json::from_str(r#"{"id":3,"room_number":"A101","user_count":2,"status":"available"}"#)
                .unwrap();
        assert_eq!(room.label(), "Room A101");
        assert_eq!(room.detail().as_deref(), Some("2 occupants"));
        assert_eq!(room.searchable_text(), "A101");
    }

    #[test]
    fn test_query_keys_are_distinct() {
        assert_ne!(Student::query_key(), Room::query_key());
        assert_eq!(Student::query_key().to_string(), "students?role=student");
    }
}
