/// The two observable roles of a peer. Exactly one peer is `Leader`
/// globally at any instant; every other live peer is `Standby`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Standby,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leader => "LEADER",
            Self::Standby => "STANDBY",
        }
    }

    pub fn is_leader(&self) -> bool {
        matches!(self, Self::Leader)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leader_reports_is_leader() {
        assert!(Role::Leader.is_leader());
        assert!(!Role::Standby.is_leader());
    }

    #[test]
    fn serializes_as_uppercase_tag() {
        assert_eq!(serde_json::to_string(&Role::Leader).unwrap(), "\"LEADER\"");
        assert_eq!(
            serde_json::to_string(&Role::Standby).unwrap(),
            "\"STANDBY\""
        );
    }
}
