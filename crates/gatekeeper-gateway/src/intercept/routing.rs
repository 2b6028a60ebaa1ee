//! Static method table: how each RPC is shaped and which feeds audit it.

use gatekeeper_core::protocol::method::{
    ADMIN_LOGGING, ADMIN_STATISTICS, BIZ_ADD, BIZ_CHECK, BIZ_TEST,
};

use crate::realtime::Feed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Unary,
    ServerStream,
}

#[derive(Debug, Clone, Copy)]
pub struct MethodSpec {
    pub path: &'static str,
    pub kind: CallKind,
    /// Feeds that receive this call's audit event, in publish order.
    pub feeds: &'static [Feed],
}

const UNARY_FEEDS: &[Feed] = &[Feed::Log, Feed::Stat];

pub static METHODS: &[MethodSpec] = &[
    MethodSpec { path: BIZ_CHECK, kind: CallKind::Unary, feeds: UNARY_FEEDS },
    MethodSpec { path: BIZ_ADD, kind: CallKind::Unary, feeds: UNARY_FEEDS },
    MethodSpec { path: BIZ_TEST, kind: CallKind::Unary, feeds: UNARY_FEEDS },
    // a Logging stream announces itself to the other Logging streams
    MethodSpec { path: ADMIN_LOGGING, kind: CallKind::ServerStream, feeds: &[Feed::Log] },
    MethodSpec { path: ADMIN_STATISTICS, kind: CallKind::ServerStream, feeds: &[Feed::Stat] },
];

/// Entry for `path`, or `None` when the gateway serves no such method.
pub fn lookup(path: &str) -> Option<&'static MethodSpec> {
    METHODS.iter().find(|m| m.path == path)
}

/// Methods of the given shape, in table order.
pub fn methods_of(kind: CallKind) -> impl Iterator<Item = &'static MethodSpec> {
    METHODS.iter().filter(move |m| m.kind == kind)
}
