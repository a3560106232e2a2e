use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::errors::PipelineError;
use crate::validate;

/// ========================================
/// Request/Response data model
/// ========================================

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[value(name = "x", alias = "twitter")]
    X,
    #[value(name = "facebook")]
    Facebook,
    #[value(name = "instagram")]
    Instagram,
    #[value(name = "linkedin")]
    LinkedIn,
}

impl Platform {
    /// Human-facing label used in headers and the post cards.
    pub fn label(self) -> &'static str {
        match self {
            Platform::X => "𝕏 (Twitter)",
            Platform::Facebook => "📘 Facebook",
            Platform::Instagram => "📸 Instagram",
            Platform::LinkedIn => "💼 LinkedIn",
        }
    }

    /// Canonical hosts an account URL for this platform may point at.
    pub fn allowed_hosts(self) -> &'static [&'static str] {
        match self {
            Platform::X => &["x.com", "twitter.com"],
            Platform::Facebook => &["facebook.com", "fb.com"],
            Platform::Instagram => &["instagram.com", "instagr.am"],
            Platform::LinkedIn => &["linkedin.com", "lnkd.in"],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::X => "X",
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
            Platform::LinkedIn => "LinkedIn",
        };
        f.write_str(name)
    }
}

/// Which flavour of the generator is running.
///
/// `Generic` accepts any platform and any account host. `XOnly` pins the
/// platform to X, checks the host against X's domains and uses X's own
/// 280 character post limit.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    #[default]
    Generic,
    #[value(name = "x-only", alias = "x")]
    XOnly,
}

/// One submission from the form. Only constructible through [`GenerationRequest::new`],
/// so every value in circulation has passed input validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    account_url: String,
    platform: Platform,
    secondary_url: Option<String>,
    post_date: NaiveDate,
    user_note: Option<String>,
    variant: Variant,
}

impl GenerationRequest {
    pub fn new(
        variant: Variant,
        account_url: &str,
        platform: Platform,
        secondary_url: Option<&str>,
        post_date: NaiveDate,
        user_note: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, PipelineError> {
        let account_url = account_url.trim();
        if account_url.is_empty() {
            return Err(PipelineError::Validation(
                "please enter the social media account URL".into(),
            ));
        }
        if !validate::validate_url(account_url) {
            return Err(PipelineError::Validation(format!(
                "not a valid URL: {account_url} (example: https://x.com/account)"
            )));
        }
        if variant == Variant::XOnly {
            if platform != Platform::X {
                return Err(PipelineError::Validation(format!(
                    "the x-only generator cannot target {platform}"
                )));
            }
            if !validate::validate_platform_url(account_url, Platform::X) {
                return Err(PipelineError::Validation(format!(
                    "{account_url} is not an X account URL (expected x.com or twitter.com)"
                )));
            }
        }

        let secondary_url = non_blank(secondary_url);
        if let Some(s) = &secondary_url {
            if !validate::validate_url(s) {
                return Err(PipelineError::Validation(format!(
                    "not a valid reference URL: {s}"
                )));
            }
        }

        if !validate::validate_post_date(post_date, today) {
            return Err(PipelineError::Validation(format!(
                "posting date {post_date} is in the past (today is {today})"
            )));
        }

        Ok(Self {
            account_url: account_url.to_string(),
            platform,
            secondary_url,
            post_date,
            user_note: non_blank(user_note),
            variant,
        })
    }

    pub fn account_url(&self) -> &str {
        &self.account_url
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn secondary_url(&self) -> Option<&str> {
        self.secondary_url.as_deref()
    }

    pub fn post_date(&self) -> NaiveDate {
        self.post_date
    }

    pub fn user_note(&self) -> Option<&str> {
        self.user_note.as_deref()
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneProfile {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Exactly six drafts in category order. Built by [`crate::posts::parse_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostBatch {
    drafts: Vec<PostDraft>,
}

impl PostBatch {
    pub const LEN: usize = 6;

    pub(crate) fn from_checked(drafts: Vec<PostDraft>) -> Self {
        debug_assert_eq!(drafts.len(), Self::LEN);
        Self { drafts }
    }

    pub fn drafts(&self) -> &[PostDraft] {
        &self.drafts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PostDraft> {
        self.drafts.iter()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// A single call to the completion endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip)]
    pub timeout: Duration,
}

impl CompletionRequest {
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn builds_request_and_drops_blank_optionals() {
        let req = GenerationRequest::new(
            Variant::Generic,
            "  https://x.com/brand ",
            Platform::X,
            Some("   "),
            d(2025, 6, 1),
            Some(""),
            d(2025, 5, 30),
        )
        .unwrap();
        assert_eq!(req.account_url(), "https://x.com/brand");
        assert_eq!(req.secondary_url(), None);
        assert_eq!(req.user_note(), None);
    }

    #[test]
    fn rejects_missing_and_malformed_urls() {
        let today = d(2025, 5, 30);
        for bad in ["", "x.com/brand", "https://"] {
            let err = GenerationRequest::new(Variant::Generic, bad, Platform::X, None, today, None, today)
                .unwrap_err();
            assert!(matches!(err, PipelineError::Validation(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn rejects_past_date_but_accepts_today() {
        let today = d(2025, 6, 1);
        assert!(GenerationRequest::new(Variant::Generic, "https://x.com/a", Platform::X, None, today, None, today).is_ok());
        let err = GenerationRequest::new(Variant::Generic, "https://x.com/a", Platform::X, None, d(2025, 5, 31), None, today)
            .unwrap_err();
        assert!(err.to_string().contains("in the past"));
    }

    #[test]
    fn x_only_checks_platform_and_host() {
        let today = d(2025, 6, 1);
        let wrong_host = GenerationRequest::new(Variant::XOnly, "https://facebook.com/acct", Platform::X, None, today, None, today);
        assert!(matches!(wrong_host, Err(PipelineError::Validation(_))));
        let wrong_platform = GenerationRequest::new(Variant::XOnly, "https://x.com/acct", Platform::Instagram, None, today, None, today);
        assert!(matches!(wrong_platform, Err(PipelineError::Validation(_))));
        assert!(GenerationRequest::new(Variant::XOnly, "https://www.twitter.com/acct", Platform::X, None, today, None, today).is_ok());
    }

    #[test]
    fn rejects_malformed_secondary_url() {
        let today = d(2025, 6, 1);
        let err = GenerationRequest::new(Variant::Generic, "https://x.com/a", Platform::X, Some("shop.example"), today, None, today)
            .unwrap_err();
        assert!(err.to_string().contains("reference URL"));
    }

    #[test]
    fn char_count_counts_chars_not_bytes() {
        let p = PostDraft { title: "t".into(), content: "こんにちは".into() };
        assert_eq!(p.char_count(), 5);
    }
}
