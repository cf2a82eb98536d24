//! One-shot flash notices stored in the session: set on a redirecting
//! response, consumed (and cleared) by the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::error::WebError;

const FLASH_KEY: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Danger,
}

impl FlashLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }
}

pub async fn set(session: &Session, flash: Flash) -> Result<(), WebError> {
    session.insert(FLASH_KEY, flash).await?;
    Ok(())
}

pub async fn take(session: &Session) -> Result<Option<Flash>, WebError> {
    Ok(session.remove::<Flash>(FLASH_KEY).await?)
}
