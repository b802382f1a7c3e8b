use super::id::*;
use uuid::Uuid;

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = UserId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_new_ids_are_unique() {
    assert_ne!(LeaveRequestId::new(), LeaveRequestId::new());
}

#[test]
fn test_typed_id_display() {
    let uuid = Uuid::new_v4();
    let id = LeaveTypeId::from_uuid(uuid);
    assert_eq!(format!("{id}"), uuid.to_string());
}

#[test]
fn test_typed_id_rejects_malformed_json() {
    let uuid = Uuid::new_v4();
    let id: RoleId = serde_json::from_str(&format!("\"{uuid}\"")).unwrap();
    assert_eq!(id.into_inner(), uuid);
    assert!(serde_json::from_str::<UserId>("\"invalid\"").is_err());
}

#[test]
fn test_typed_id_serde_is_transparent() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&UserId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));
}
