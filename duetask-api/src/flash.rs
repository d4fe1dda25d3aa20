/// One-shot flash messages
///
/// A flash is set on a redirect and shown, then cleared, by the next HTML
/// page. It travels in the `duetask_flash` cookie as `level:url-encoded-text`.

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Duration;

use crate::cookies::{clear_cookie, read_cookie, set_cookie, FLASH_COOKIE};

/// Flash severity, rendered as a CSS class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashLevel::Success),
            "info" => Some(FlashLevel::Info),
            "warning" => Some(FlashLevel::Warning),
            "danger" => Some(FlashLevel::Danger),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Danger, message)
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", self.level.as_str(), urlencoding::encode(&self.message))
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (level, message) = raw.split_once(':')?;
        let message = urlencoding::decode(message).ok()?;
        Some(Self::new(FlashLevel::parse(level)?, message.into_owned()))
    }

    /// Reads the pending flash from the request, if any
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        read_cookie(headers, FLASH_COOKIE).and_then(|raw| Self::decode(&raw))
    }

    pub fn set_cookie(&self, secure: bool) -> HeaderValue {
        set_cookie(FLASH_COOKIE, &self.encode(), Duration::minutes(5), secure)
    }

    pub fn clear_cookie(secure: bool) -> HeaderValue {
        clear_cookie(FLASH_COOKIE, secure)
    }
}

/// `303 See Other` redirect that sets a flash and any extra cookies
pub struct FlashRedirect {
    location: String,
    flash: Option<Flash>,
    cookies: Vec<HeaderValue>,
    secure: bool,
}

impl FlashRedirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            flash: None,
            cookies: Vec::new(),
            secure: false,
        }
    }

    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }

    pub fn with_cookie(mut self, cookie: HeaderValue) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

impl IntoResponse for FlashRedirect {
    fn into_response(self) -> Response {
        let mut response = Redirect::to(&self.location).into_response();
        let headers = response.headers_mut();

        if let Some(flash) = &self.flash {
            headers.append(header::SET_COOKIE, flash.set_cookie(self.secure));
        }
        for cookie in self.cookies {
            headers.append(header::SET_COOKIE, cookie);
        }

        response
    }
}
