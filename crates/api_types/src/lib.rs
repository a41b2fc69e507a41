use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    /// A user as returned by the API. Never carries credentials.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub name: String,
        pub email: String,
    }

    /// Sign-up request body.
    ///
    /// Fields are optional so that missing ones surface as per-field
    /// validation errors instead of a deserialization failure.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: Option<String>,
        pub email: Option<String>,
    }
}

pub mod fail {
    use super::*;

    /// A coding-fail post, enriched with the creator's name when the
    /// join succeeded.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct FailView {
        pub id: i32,
        pub name: String,
        pub description: String,
        pub author: String,
        pub created_by: i32,
        pub created_by_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FailNew {
        pub name: Option<String>,
        pub description: Option<String>,
        pub author: Option<String>,
        pub created_by: Option<i32>,
    }

    /// Partial update: only supplied fields change. `created_by` is
    /// immutable and deliberately absent here.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct FailUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub author: Option<String>,
    }
}

pub mod auth {
    use super::*;

    /// Login request body. Only the email takes part in the lookup; a
    /// password, if sent, is accepted and ignored by the server.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub message: String,
        pub user: super::user::UserView,
    }

    /// A logged-in user as embedded in the session token.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct SessionUser {
        pub id: i32,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusResponse {
        #[serde(rename = "loggedIn")]
        pub logged_in: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub user: Option<SessionUser>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageResponse {
        pub message: String,
    }
}
