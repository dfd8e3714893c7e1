use serde::{Deserialize, Serialize};

/// Classification tag assigned to a request path before any handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteKind {
    Public,
    Auth,
    Password,
    Verification,
    Creator,
    Respondent,
    SurveyResponse,
    ApiAuth,
    ApiPublic,
    ApiProtected,
    Unknown,
}

impl RouteKind {
    /// Wire form used in decision logs and the root info endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Public => "public",
            RouteKind::Auth => "auth",
            RouteKind::Password => "password",
            RouteKind::Verification => "verification",
            RouteKind::Creator => "creator",
            RouteKind::Respondent => "respondent",
            RouteKind::SurveyResponse => "survey-response",
            RouteKind::ApiAuth => "api-auth",
            RouteKind::ApiPublic => "api-public",
            RouteKind::ApiProtected => "api-protected",
            RouteKind::Unknown => "unknown",
        }
    }
}

/// Fixed route-prefix configuration. A path belongs to a prefix `R` iff
/// `path == R` or `path` starts with `R + "/"`, so `/` matches only itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteTable {
    pub auth: Vec<String>,
    pub password: Vec<String>,
    pub verification: Vec<String>,
    pub public: Vec<String>,
    pub creator: Vec<String>,
    pub respondent: Vec<String>,
    pub survey_response: Vec<String>,
    pub api_auth: Vec<String>,
    pub api_public: Vec<String>,
    pub api_protected: Vec<String>,
}

fn prefixes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            auth: prefixes(&["/signin", "/signup", "/check-email"]),
            password: prefixes(&["/reset-password", "/forgot-password"]),
            verification: prefixes(&["/email-verified"]),
            public: prefixes(&["/", "/about", "/features"]),
            creator: prefixes(&["/dashboard", "/surveys", "/responses", "/analytics"]),
            respondent: prefixes(&["/respondent"]),
            survey_response: prefixes(&["/survey"]),
            api_auth: prefixes(&["/api/auth"]),
            api_public: prefixes(&["/api/surveys/public"]),
            api_protected: prefixes(&["/api/surveys", "/api/responses", "/api/questions"]),
        }
    }
}

impl RouteTable {
    /// Classify a request path. Categories are tested in a fixed priority
    /// order (auth flows and public pages, then role-gated pages, then API
    /// prefixes); the first match wins. Unmatched paths are `Unknown` and
    /// the gate treats page `Unknown` as protected.
    pub fn classify(&self, path: &str) -> RouteKind {
        let groups: [(&[String], RouteKind); 10] = [
            (&self.auth, RouteKind::Auth),
            (&self.password, RouteKind::Password),
            (&self.verification, RouteKind::Verification),
            (&self.public, RouteKind::Public),
            (&self.creator, RouteKind::Creator),
            (&self.respondent, RouteKind::Respondent),
            (&self.survey_response, RouteKind::SurveyResponse),
            (&self.api_auth, RouteKind::ApiAuth),
            (&self.api_public, RouteKind::ApiPublic),
            (&self.api_protected, RouteKind::ApiProtected),
        ];

        for (list, kind) in groups {
            if list.iter().any(|prefix| matches_prefix(path, prefix)) {
                return kind;
            }
        }

        RouteKind::Unknown
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Whether a path belongs to the API surface. Rejections on API paths are
/// JSON 401s; page paths redirect instead.
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}
