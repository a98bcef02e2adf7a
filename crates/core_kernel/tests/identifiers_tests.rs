//! Unit tests for the identifier newtypes
//!
//! Covers creation, parsing, conversion, and display formatting for
//! every dispatch identifier.

use core_kernel::{AssignmentId, ClaimId, CompanyId, PoolEntryId, WorkerId};
use uuid::Uuid;

mod creation {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = ClaimId::new();
        let id2 = ClaimId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = AssignmentId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = AssignmentId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = WorkerId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn test_default_is_random() {
        let id1 = PoolEntryId::default();
        let id2 = PoolEntryId::default();
        assert_ne!(id1, id2);
    }
}

mod display {
    use super::*;

    #[test]
    fn test_display_carries_entity_prefix() {
        assert!(ClaimId::new().to_string().starts_with("CLM-"));
        assert!(AssignmentId::new().to_string().starts_with("ASG-"));
        assert!(PoolEntryId::new().to_string().starts_with("FPE-"));
        assert!(WorkerId::new().to_string().starts_with("WKR-"));
        assert!(CompanyId::new().to_string().starts_with("CMP-"));
    }

    #[test]
    fn test_prefix_accessor_matches_display() {
        let id = WorkerId::new();
        let display = id.to_string();
        assert!(display.starts_with(WorkerId::prefix()));
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_roundtrip_through_display() {
        let original = ClaimId::new();
        let parsed: ClaimId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_parses_bare_uuid() {
        let uuid = Uuid::new_v4();
        let parsed: CompanyId = uuid.to_string().parse().unwrap();
        assert_eq!(parsed.as_uuid(), &uuid);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("not-a-uuid".parse::<ClaimId>().is_err());
    }

    #[test]
    fn test_foreign_prefix_is_not_stripped() {
        let uuid = Uuid::new_v4();
        let tagged = format!("WKR-{uuid}");
        // A worker prefix on a claim id is not this type's prefix, so
        // parsing must fail rather than silently accept it
        assert!(tagged.parse::<ClaimId>().is_err());
    }
}

mod conversion {
    use super::*;

    #[test]
    fn test_uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id = AssignmentId::from(uuid);
        let back: Uuid = id.into();
        assert_eq!(uuid, back);
    }

    #[test]
    fn test_types_do_not_compare_across_kinds() {
        // Compile-time property; the newtypes share no PartialEq impl.
        // This test documents the intent by constructing both kinds.
        let uuid = Uuid::new_v4();
        let claim = ClaimId::from_uuid(uuid);
        let worker = WorkerId::from_uuid(uuid);
        assert_eq!(claim.as_uuid(), worker.as_uuid());
    }
}

mod serde_format {
    use super::*;

    #[test]
    fn test_serializes_as_bare_uuid() {
        let id = ClaimId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }

    #[test]
    fn test_deserializes_from_bare_uuid() {
        let uuid = Uuid::new_v4();
        let json = format!("\"{uuid}\"");
        let id: WorkerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id.as_uuid(), &uuid);
    }
}
