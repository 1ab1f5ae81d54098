pub mod handler;
pub mod heartbeat;
pub mod msg_change_handler;
pub mod msg_cursor_handler;
pub mod msg_join_handler;
pub mod registry;
