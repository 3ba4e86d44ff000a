//! Navigation graph for the console.
//!
//! Views are split into two disjoint partitions. Which partition is
//! reachable depends only on whether a session exists; the route guard
//! sends any request for a view outside that partition to the partition's
//! default view.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Register,
    Dashboard,
    Anomalies,
    Ekyc,
    Reports,
    Audit,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Login,
        View::Register,
        View::Dashboard,
        View::Anomalies,
        View::Ekyc,
        View::Reports,
        View::Audit,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            View::Login => "/login",
            View::Register => "/register",
            View::Dashboard => "/dashboard",
            View::Anomalies => "/anomalies",
            View::Ekyc => "/ekyc",
            View::Reports => "/reports",
            View::Audit => "/audit",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Register => "Register",
            View::Dashboard => "Dashboard",
            View::Anomalies => "Anomaly Detection",
            View::Ekyc => "eKYC Verification",
            View::Reports => "Reports",
            View::Audit => "Audit Trail",
        }
    }

    /// Match a route path. Query strings and a trailing slash are ignored;
    /// unknown paths (including `/`) yield `None`.
    pub fn from_path(path: &str) -> Option<View> {
        let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        View::ALL.into_iter().find(|v| v.path() == path)
    }

    pub fn partition(&self) -> Partition {
        match self {
            View::Login | View::Register => Partition::Anonymous,
            View::Dashboard | View::Anomalies | View::Ekyc | View::Reports | View::Audit => {
                Partition::Authenticated
            }
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// The two navigation graphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Authenticated,
    Anonymous,
}

impl Partition {
    pub fn for_session(authenticated: bool) -> Self {
        if authenticated {
            Partition::Authenticated
        } else {
            Partition::Anonymous
        }
    }

    /// Where the guard sends requests that land outside this partition
    pub fn default_view(&self) -> View {
        match self {
            Partition::Authenticated => View::Dashboard,
            Partition::Anonymous => View::Login,
        }
    }

    /// Views in display order
    pub fn views(&self) -> &'static [View] {
        match self {
            Partition::Authenticated => &[
                View::Dashboard,
                View::Anomalies,
                View::Ekyc,
                View::Reports,
                View::Audit,
            ],
            Partition::Anonymous => &[View::Login, View::Register],
        }
    }

    pub fn contains(&self, view: View) -> bool {
        view.partition() == *self
    }

    /// Route guard: `requested` if it belongs here, otherwise the default view
    pub fn guard(&self, requested: View) -> View {
        if self.contains(requested) {
            requested
        } else {
            self.default_view()
        }
    }

    /// Route guard over raw paths. Unknown paths go to the default view.
    pub fn resolve(&self, path: &str) -> View {
        match View::from_path(path) {
            Some(view) => self.guard(view),
            None => self.default_view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        for view in View::ALL {
            let in_auth = Partition::Authenticated.contains(view);
            let in_anon = Partition::Anonymous.contains(view);
            assert!(in_auth != in_anon, "{} must be in exactly one partition", view);
        }
        let listed = Partition::Authenticated.views().len() + Partition::Anonymous.views().len();
        assert_eq!(listed, View::ALL.len());
    }

    #[test]
    fn test_guard_never_leaks_views() {
        for partition in [Partition::Authenticated, Partition::Anonymous] {
            for view in View::ALL {
                let landed = partition.guard(view);
                assert!(partition.contains(landed));
                if partition.contains(view) {
                    assert_eq!(landed, view);
                } else {
                    assert_eq!(landed, partition.default_view());
                }
            }
        }
    }

    #[test]
    fn test_default_views() {
        assert_eq!(Partition::Authenticated.default_view(), View::Dashboard);
        assert_eq!(Partition::Anonymous.default_view(), View::Login);
        assert_eq!(Partition::for_session(true), Partition::Authenticated);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(View::from_path("/dashboard"), Some(View::Dashboard));
        assert_eq!(View::from_path("/audit/"), Some(View::Audit));
        assert_eq!(View::from_path("/ekyc?step=2"), Some(View::Ekyc));
        assert_eq!(View::from_path("/"), None);
        assert_eq!(View::from_path("/admin"), None);
    }

    #[test]
    fn test_resolve_paths() {
        assert_eq!(Partition::Authenticated.resolve("/"), View::Dashboard);
        assert_eq!(Partition::Authenticated.resolve("/login"), View::Dashboard);
        assert_eq!(Partition::Authenticated.resolve("/reports"), View::Reports);
        assert_eq!(Partition::Anonymous.resolve("/reports"), View::Login);
        assert_eq!(Partition::Anonymous.resolve("/register"), View::Register);
        assert_eq!(Partition::Anonymous.resolve("/nowhere"), View::Login);
    }
}
