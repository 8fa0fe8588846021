use super::node::NodeId;
use super::role::Role;

/// Immutable snapshot of this process's view of leadership.
///
/// The election loop is the sole writer; it replaces the snapshot as a
/// whole on every tick, so readers (HTTP handlers) never observe a
/// partially-updated combination of role/epoch/leader_id. See
/// `dspu_runtime::election` for the publisher side (a
/// `tokio::sync::watch` channel carrying this type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleState {
    pub node_id: NodeId,
    pub role: Role,
    pub leader_epoch: Option<i64>,
    pub leader_id: Option<String>,
}

impl RoleState {
    /// The state a process starts in before the election loop has run a
    /// single tick: standby, nothing known about the current leader yet.
    pub fn initial(node_id: NodeId) -> Self {
        Self {
            node_id,
            role: Role::Standby,
            leader_epoch: None,
            leader_id: None,
        }
    }

    pub fn is_leader(&self) -> bool {
        self.role.is_leader()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_standby_with_no_known_leader() {
        let state = RoleState::initial(NodeId::new("node-a"));
        assert_eq!(state.role, Role::Standby);
        assert!(state.leader_epoch.is_none());
        assert!(state.leader_id.is_none());
        assert!(!state.is_leader());
    }
}
