//! Predicate names shared by the topology loader, the resolver and the verbs.

/// `(node hasToken true)`: the node currently holds one unit of control.
pub const HAS_TOKEN: &str = "hasToken";
/// `(node completedAt tx_id)`: the node completed in transaction `tx_id`.
pub const COMPLETED_AT: &str = "completedAt";
/// `(node voidedAt tx_id)`: the node's token was cancelled in `tx_id`.
pub const VOIDED_AT: &str = "voidedAt";
/// `(join consumed tx_id)`: the join already used the completion recorded in `tx_id`.
pub const CONSUMED: &str = "consumed";

/// `(task flowsInto flow)`
pub const FLOWS_INTO: &str = "flowsInto";
/// `(flow nextElement task)`
pub const NEXT_ELEMENT: &str = "nextElement";
/// `(flow predicate "expr")`
pub const PREDICATE: &str = "predicate";
/// `(flow ordering n)`
pub const ORDERING: &str = "ordering";
/// `(flow isDefaultFlow true)`
pub const IS_DEFAULT_FLOW: &str = "isDefaultFlow";

/// `(task hasSplit "and" | "xor" | "or")`
pub const HAS_SPLIT: &str = "hasSplit";
/// `(task hasJoin "and" | "xor" | "or")`
pub const HAS_JOIN: &str = "hasJoin";
/// `(task pattern "PatternName")`
pub const PATTERN: &str = "pattern";
/// `(task triggeredBy signal)`
pub const TRIGGERED_BY: &str = "triggeredBy";
/// `(task triggerMode "transient" | "persistent")`
pub const TRIGGER_MODE: &str = "triggerMode";

/// `(instance instanceOf task)`
pub const INSTANCE_OF: &str = "instanceOf";
/// `(instance instanceIndex n)`
pub const INSTANCE_INDEX: &str = "instanceIndex";
/// `(task instanceCount n)`
pub const INSTANCE_COUNT: &str = "instanceCount";
/// `(task instanceCountKey "key")`
pub const INSTANCE_COUNT_KEY: &str = "instanceCountKey";
/// `(task quorum n)`
pub const QUORUM: &str = "quorum";
/// `(task quorumKey "key")`
pub const QUORUM_KEY: &str = "quorumKey";

/// `(task cancelsRegion region)`
pub const CANCELS_REGION: &str = "cancelsRegion";
/// `(region hasMember node)`
pub const HAS_MEMBER: &str = "hasMember";
/// `(task cancelsInstancesOf task)`
pub const CANCELS_INSTANCES_OF: &str = "cancelsInstancesOf";

/// `(node nodeKind "task" | "signal" | "region" | "flow")`
pub const NODE_KIND: &str = "nodeKind";

/// Predicates whose triples may be inserted but never removed.
pub const APPEND_ONLY: &[&str] = &[COMPLETED_AT, VOIDED_AT, CONSUMED];

pub fn is_append_only(predicate: &str) -> bool {
  APPEND_ONLY.contains(&predicate)
}
