//! Button payloads. Colon-delimited; destination strings in the resume form may themselves
//! contain colons and are kept whole.

use pipeline_core::HandlerError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// `clear_dest_menu`
    ClearDestMenu,
    /// `clear_delete_menu`
    ClearDeleteMenu,
    /// `confirm_send:<videoId>:<destId>`
    ConfirmSend { video_id: i64, destination: String },
    /// `send:<videoId>:<destId>`
    Send { video_id: i64, destination: String },
    /// `send:<videoId>:s:<cmdMsgId>:<destStr>`
    ResumeSend {
        video_id: i64,
        command_id: i64,
        destination: String,
    },
    /// `delete:<messageId>`
    Delete { message_id: i64 },
}

fn parse_id(data: &str, part: Option<&str>) -> Result<i64, HandlerError> {
    part.and_then(|p| p.parse().ok())
        .ok_or_else(|| HandlerError::InvalidCallback(data.to_string()))
}

fn parse_part(data: &str, part: Option<&str>) -> Result<String, HandlerError> {
    part.map(str::to_string)
        .ok_or_else(|| HandlerError::InvalidCallback(data.to_string()))
}

impl CallbackAction {
    pub fn parse(data: &str) -> Result<Self, HandlerError> {
        let mut parts = data.splitn(2, ':');
        let verb = parts.next().unwrap_or_default();
        let rest = parts.next();
        match (verb, rest) {
            ("clear_dest_menu", None) => Ok(CallbackAction::ClearDestMenu),
            ("clear_delete_menu", None) => Ok(CallbackAction::ClearDeleteMenu),
            ("confirm_send", Some(rest)) => {
                let mut parts = rest.splitn(2, ':');
                Ok(CallbackAction::ConfirmSend {
                    video_id: parse_id(data, parts.next())?,
                    destination: parse_part(data, parts.next())?,
                })
            }
            ("send", Some(rest)) => {
                let mut parts = rest.splitn(4, ':');
                let video_id = parse_id(data, parts.next())?;
                let destination = parse_part(data, parts.next())?;
                match (destination.as_str(), parts.next(), parts.next()) {
                    ("s", Some(command_id), destination) => Ok(CallbackAction::ResumeSend {
                        video_id,
                        command_id: parse_id(data, Some(command_id))?,
                        destination: destination.unwrap_or_default().to_string(),
                    }),
                    (_, None, None) => Ok(CallbackAction::Send {
                        video_id,
                        destination,
                    }),
                    _ => Err(HandlerError::InvalidCallback(data.to_string())),
                }
            }
            ("delete", Some(rest)) => Ok(CallbackAction::Delete {
                message_id: parse_id(data, Some(rest))?,
            }),
            _ => Err(HandlerError::InvalidCallback(data.to_string())),
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackAction::ClearDestMenu => write!(f, "clear_dest_menu"),
            CallbackAction::ClearDeleteMenu => write!(f, "clear_delete_menu"),
            CallbackAction::ConfirmSend {
                video_id,
                destination,
            } => write!(f, "confirm_send:{}:{}", video_id, destination),
            CallbackAction::Send {
                video_id,
                destination,
            } => write!(f, "send:{}:{}", video_id, destination),
            CallbackAction::ResumeSend {
                video_id,
                command_id,
                destination,
            } => write!(f, "send:{}:s:{}:{}", video_id, command_id, destination),
            CallbackAction::Delete { message_id } => write!(f, "delete:{}", message_id),
        }
    }
}
