use serde::{Deserialize, Serialize};

/// Minimal user blob mirrored into the `user-data` cookie
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_data_wire_format() {
        let user = UserData {
            uid: "u1".into(),
            display_name: Some("Asha".into()),
            email: Some("asha@example.com".into()),
            email_verified: false,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(
            json,
            r#"{"uid":"u1","displayName":"Asha","email":"asha@example.com","emailVerified":false}"#
        );
    }
}
