//! Fully-qualified method paths (`/<package>.<Service>/<Method>`).

pub const BIZ_SERVICE: &str = "main.Biz";
pub const ADMIN_SERVICE: &str = "main.Admin";

pub const BIZ_CHECK: &str = "/main.Biz/Check";
pub const BIZ_ADD: &str = "/main.Biz/Add";
pub const BIZ_TEST: &str = "/main.Biz/Test";

pub const ADMIN_LOGGING: &str = "/main.Admin/Logging";
pub const ADMIN_STATISTICS: &str = "/main.Admin/Statistics";

/// Split a full method path into `(service, method)`.
///
/// Returns `None` unless the path has exactly the shape `/service/method`.
pub fn split_full_method(full: &str) -> Option<(&str, &str)> {
    let rest = full.strip_prefix('/')?;
    let (service, method) = rest.split_once('/')?;
    if service.is_empty() || method.is_empty() || method.contains('/') {
        return None;
    }
    Some((service, method))
}
