pub mod entry_entity;
pub mod entry_recipient_entity;
