//! Method-pattern compilation and matching utilities.
//!
//! Patterns are full method paths (`/service/method`). A pattern with exactly
//! three `/`-separated segments whose last segment is `*` covers every method
//! of that service; anything else must equal the called path exactly.

/// Compiled allowlist rule for one consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodRule {
    /// `/service/*`
    Service(String),
    /// `/service/method`, compared verbatim.
    Exact(String),
}

impl MethodRule {
    pub fn compile(raw: &str) -> Self {
        let segments: Vec<&str> = raw.split('/').collect();
        match segments.as_slice() {
            [_, svc, "*"] => MethodRule::Service((*svc).to_string()),
            _ => MethodRule::Exact(raw.to_string()),
        }
    }

    pub fn matches(&self, full_method: &str) -> bool {
        match self {
            MethodRule::Exact(m) => m == full_method,
            MethodRule::Service(svc) => {
                let segments: Vec<&str> = full_method.split('/').collect();
                matches!(segments.as_slice(), [_, s, _] if *s == svc.as_str())
            }
        }
    }
}

pub fn compile_method_rules(raw: &[String]) -> Vec<MethodRule> {
    raw.iter().map(|s| MethodRule::compile(s)).collect()
}

/// First matching rule wins; order is the order given in the ACL.
pub fn is_method_allowed(rules: &[MethodRule], full_method: &str) -> bool {
    rules.iter().any(|r| r.matches(full_method))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_needs_three_segments() {
        assert_eq!(
            MethodRule::compile("/main.Biz/*"),
            MethodRule::Service("main.Biz".into())
        );
        assert_eq!(MethodRule::compile("*"), MethodRule::Exact("*".into()));
        assert_eq!(
            MethodRule::compile("/a/b/*"),
            MethodRule::Exact("/a/b/*".into())
        );
    }

    #[test]
    fn wildcard_is_scoped_to_its_service() {
        let r = MethodRule::compile("/main.Biz/*");
        assert!(r.matches("/main.Biz/Check"));
        assert!(r.matches("/main.Biz/Anything"));
        assert!(!r.matches("/main.Admin/Logging"));
        assert!(!r.matches("/main.Biz/Check/extra"));
    }

    #[test]
    fn exact_rule_is_verbatim() {
        let r = MethodRule::compile("/main.Biz/Check");
        assert!(r.matches("/main.Biz/Check"));
        assert!(!r.matches("/main.Biz/check"));
        assert!(!r.matches("/main.Biz/Check2"));
    }
}
