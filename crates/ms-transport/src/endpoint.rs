//! Catalogue of the backend endpoints the console consumes.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    OpcStatus,
    OpcConnect,
    OpcDisconnect,
    GradeNames,
    GradeElements,
    SyntheticReading,
    GradeByName,
    Optimize,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::OpcStatus,
        Endpoint::OpcConnect,
        Endpoint::OpcDisconnect,
        Endpoint::GradeNames,
        Endpoint::GradeElements,
        Endpoint::SyntheticReading,
        Endpoint::GradeByName,
        Endpoint::Optimize,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::OpcStatus => "/opc-status",
            Endpoint::OpcConnect => "/opc-connect",
            Endpoint::OpcDisconnect => "/opc-disconnect",
            Endpoint::GradeNames => "/grade-names",
            Endpoint::GradeElements => "/grade-elements",
            Endpoint::SyntheticReading => "/synthetic-reading",
            Endpoint::GradeByName => "/grade-by-name",
            Endpoint::Optimize => "/optimize",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::OpcStatus | Endpoint::GradeNames => Method::Get,
            _ => Method::Post,
        }
    }

    /// Join this endpoint onto a base URL, tolerating a trailing slash.
    pub fn url(self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self.method() {
            Method::Get => "GET",
            Method::Post => "POST",
        };
        write!(f, "{} {}", method, self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_join_ignores_trailing_slash() {
        assert_eq!(
            Endpoint::OpcStatus.url("http://localhost:3000/api/v1/spectrometer/"),
            "http://localhost:3000/api/v1/spectrometer/opc-status"
        );
        assert_eq!(
            Endpoint::Optimize.url("http://plant"),
            "http://plant/optimize"
        );
    }

    #[test]
    fn only_status_and_grade_list_are_reads() {
        let gets: Vec<_> = Endpoint::ALL
            .into_iter()
            .filter(|e| e.method() == Method::Get)
            .collect();
        assert_eq!(gets, vec![Endpoint::OpcStatus, Endpoint::GradeNames]);
    }

    #[test]
    fn display_includes_method() {
        assert_eq!(Endpoint::GradeByName.to_string(), "POST /grade-by-name");
    }
}
