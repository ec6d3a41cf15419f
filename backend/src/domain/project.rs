//! Photography project aggregate.
//!
//! A project groups photos under a single owner. Titles are trimmed and
//! bounded, and an optional target completion date must not lie in the past
//! when the project is created or edited.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AssetId, UserId};

/// Maximum project title length in characters.
pub const PROJECT_TITLE_MAX: usize = 200;

/// Validation errors raised by project constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Ensure this value has at most {max} characters.")]
    TitleTooLong { max: usize },
    #[error("Target end date cannot be in the past")]
    TargetEndInPast,
}

impl ProjectValidationError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::TargetEndInPast => "targetEnd",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty_title",
            Self::TitleTooLong { .. } => "title_too_long",
            Self::TargetEndInPast => "target_end_in_past",
        }
    }
}

/// Stable project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed, non-empty project title.
///
/// # Examples
/// ```
/// use lightbox::domain::ProjectTitle;
///
/// let title = ProjectTitle::new("  Coastal Light ").unwrap();
/// assert_eq!(title.as_ref(), "Coastal Light");
/// assert!(ProjectTitle::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectTitle(String);

impl ProjectTitle {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ProjectValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProjectValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > PROJECT_TITLE_MAX {
            return Err(ProjectValidationError::TitleTooLong {
                max: PROJECT_TITLE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ProjectTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ProjectTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ProjectTitle> for String {
    fn from(value: ProjectTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProjectTitle {
    type Error = ProjectValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated user input for creating or editing a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: ProjectTitle,
    pub description: String,
    pub target_end: Option<NaiveDate>,
}

impl ProjectDraft {
    /// Validate form input against `today`.
    ///
    /// A target date equal to `today` is accepted.
    pub fn try_new(
        title: &str,
        description: Option<&str>,
        target_end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, ProjectValidationError> {
        let title = ProjectTitle::new(title)?;
        if target_end.is_some_and(|date| date < today) {
            return Err(ProjectValidationError::TargetEndInPast);
        }
        Ok(Self {
            title,
            description: description.unwrap_or_default().to_owned(),
            target_end,
        })
    }
}

/// Photography project owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub owner: UserId,
    pub title: ProjectTitle,
    pub description: String,
    pub start_date: NaiveDate,
    pub target_end: Option<NaiveDate>,
    pub cover: Option<AssetId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project starting on the creation date.
    pub fn new(owner: UserId, draft: ProjectDraft, now: DateTime<Utc>) -> Self {
        let ProjectDraft {
            title,
            description,
            target_end,
        } = draft;
        Self {
            id: ProjectId::random(),
            owner,
            title,
            description,
            start_date: now.date_naive(),
            target_end,
            cover: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields from a validated draft.
    pub fn apply(&mut self, draft: ProjectDraft, now: DateTime<Utc>) {
        self.title = draft.title;
        self.description = draft.description;
        self.target_end = draft.target_end;
        self.updated_at = now;
    }

    /// Whether `owner` owns this project.
    pub fn is_owned_by(&self, owner: &UserId) -> bool {
        &self.owner == owner
    }

    /// True once `today` is past the target date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.target_end.is_some_and(|target| today > target)
    }

    /// Days remaining until the target date; negative once overdue.
    ///
    /// # Examples
    /// ```
    /// use chrono::{NaiveDate, TimeZone, Utc};
    /// use lightbox::domain::{Project, ProjectDraft, UserId};
    ///
    /// let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    /// let target = NaiveDate::from_ymd_opt(2026, 3, 11);
    /// let draft = ProjectDraft::try_new("Dunes", None, target, today).unwrap();
    /// let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
    /// let project = Project::new(UserId::random(), draft, now);
    /// assert_eq!(project.days_until_target(today), Some(10));
    /// ```
    pub fn days_until_target(&self, today: NaiveDate) -> Option<i64> {
        self.target_end
            .map(|target| target.signed_duration_since(today).num_days())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[fixture]
    fn today() -> NaiveDate {
        date(2026, 6, 15)
    }

    fn project_with_target(target: Option<NaiveDate>) -> Project {
        let now = Utc
            .with_ymd_and_hms(2026, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let draft = ProjectDraft {
            title: ProjectTitle::new("Harbour at dawn").expect("title"),
            description: String::new(),
            target_end: target,
        };
        Project::new(UserId::random(), draft, now)
    }

    #[rstest]
    #[case("", ProjectValidationError::EmptyTitle)]
    #[case("   \t", ProjectValidationError::EmptyTitle)]
    fn draft_rejects_blank_titles(
        today: NaiveDate,
        #[case] title: &str,
        #[case] expected: ProjectValidationError,
    ) {
        let err = ProjectDraft::try_new(title, None, None, today).expect_err("invalid");
        assert_eq!(err, expected);
        assert_eq!(err.to_string(), "Title cannot be empty");
    }

    #[rstest]
    fn draft_rejects_overlong_title(today: NaiveDate) {
        let title = "t".repeat(PROJECT_TITLE_MAX + 1);
        let err = ProjectDraft::try_new(&title, None, None, today).expect_err("too long");
        assert_eq!(err.field(), "title");
        assert_eq!(err.code(), "title_too_long");
    }

    #[rstest]
    fn draft_trims_title(today: NaiveDate) {
        let draft = ProjectDraft::try_new("  Night Market  ", Some("neon"), None, today)
            .expect("valid draft");
        assert_eq!(draft.title.as_ref(), "Night Market");
        assert_eq!(draft.description, "neon");
    }

    #[rstest]
    fn draft_rejects_past_target(today: NaiveDate) {
        let yesterday = today.pred_opt().expect("previous day");
        let err = ProjectDraft::try_new("Dunes", None, Some(yesterday), today).expect_err("past");
        assert_eq!(err, ProjectValidationError::TargetEndInPast);
        assert_eq!(err.to_string(), "Target end date cannot be in the past");
    }

    #[rstest]
    fn draft_accepts_today_as_target(today: NaiveDate) {
        let draft = ProjectDraft::try_new("Dunes", None, Some(today), today).expect("today ok");
        assert_eq!(draft.target_end, Some(today));
    }

    #[rstest]
    fn new_project_starts_on_creation_date() {
        let project = project_with_target(None);
        assert_eq!(project.start_date, date(2026, 6, 1));
        assert!(project.cover.is_none());
    }

    #[rstest]
    #[case(None, false, None)]
    #[case(Some(date(2026, 6, 20)), false, Some(5))]
    #[case(Some(date(2026, 6, 15)), false, Some(0))]
    #[case(Some(date(2026, 6, 10)), true, Some(-5))]
    fn overdue_and_days_remaining(
        today: NaiveDate,
        #[case] target: Option<NaiveDate>,
        #[case] overdue: bool,
        #[case] days: Option<i64>,
    ) {
        let project = project_with_target(target);
        assert_eq!(project.is_overdue(today), overdue);
        assert_eq!(project.days_until_target(today), days);
    }
}
