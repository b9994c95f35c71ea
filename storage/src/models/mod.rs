mod chat_record;
mod message_record;

pub use chat_record::ChatRecord;
pub use message_record::{MessageKey, MessageRecord};
