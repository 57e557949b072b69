//! Integration tests for the chats crate.

use huddle_chats::{
    is_channel_owner, Channel, ClientEvent, Message, PermissionChecker, ServerEvent, Validator,
};

#[test]
fn live_frames_round_trip_through_the_public_api() {
    let frame = r#"{"event":"message-read","data":{"messageId":"m1",
        "readBy":[{"userId":"u2","readAt":"2024-05-01T10:01:00Z"}]}}"#;

    match serde_json::from_str::<ServerEvent>(frame).expect("frame decodes") {
        ServerEvent::MessageRead(payload) => {
            assert_eq!(payload.message_id, "m1");
            assert_eq!(payload.read_by.len(), 1);
        }
        other => panic!("unexpected event {other:?}"),
    }

    let outbound = serde_json::to_string(&ClientEvent::LeaveChannel("c1".into())).unwrap();
    assert_eq!(outbound, r#"{"event":"leave-channel","data":"c1"}"#);
}

#[test]
fn history_page_decodes_into_messages() {
    let page = r#"[
        {"_id":"m1","channel":"c1","sender":{"_id":"u1","username":"ada"},"content":"a","createdAt":"2024-05-01T10:00:00Z"},
        {"_id":"m2","channel":"c1","sender":null,"content":"b","createdAt":"2024-05-01T10:00:05Z","readBy":[]}
    ]"#;

    let messages: Vec<Message> = serde_json::from_str(page).expect("page decodes");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].sender_name(), "Unknown");
}

#[test]
fn ownership_drives_every_management_check() {
    let channel: Channel = serde_json::from_str(
        r#"{"_id":"c1","name":"ops","isPrivate":true,"createdBy":{"_id":"u1","username":"ada"},"members":["u1"]}"#,
    )
    .unwrap();

    assert!(is_channel_owner("u1", &channel));
    assert!(PermissionChecker::can_invite("u1", &channel).is_ok());
    assert!(PermissionChecker::can_delete_channel("u2", &channel).is_err());
    assert!(Validator::channel_name(&channel.name).is_ok());
}
