mod node;
mod role;
mod state;

pub use node::NodeId;
pub use role::Role;
pub use state::RoleState;
