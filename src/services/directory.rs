use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Course title and instructor display name for gradebook denormalization.
#[derive(Debug, Clone)]
pub(crate) struct CourseSummary {
    pub(crate) title: String,
    pub(crate) instructor_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RosterCourse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) instructor_id: String,
    pub(crate) instructor_name: String,
    #[serde(default)]
    pub(crate) enrolled_students: Vec<String>,
}

/// External course/user directory. The engine only consumes it; lookups that
/// miss degrade to placeholder names and never fail an operation.
#[async_trait]
pub(crate) trait CourseDirectory: Send + Sync {
    async fn find_course(&self, course_id: &str) -> Option<CourseSummary>;
    async fn courses_by_instructor(&self, instructor_id: &str) -> Vec<RosterCourse>;
}

/// Directory backed by a roster loaded once at startup.
#[derive(Default)]
pub(crate) struct RosterDirectory {
    courses: Vec<RosterCourse>,
}

impl RosterDirectory {
    pub(crate) fn new(courses: Vec<RosterCourse>) -> Self {
        Self { courses }
    }

    pub(crate) fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let courses: Vec<RosterCourse> = serde_json::from_str(&raw)?;
        Ok(Self::new(courses))
    }
}

#[async_trait]
impl CourseDirectory for RosterDirectory {
    async fn find_course(&self, course_id: &str) -> Option<CourseSummary> {
        self.courses.iter().find(|course| course.id == course_id).map(|course| CourseSummary {
            title: course.title.clone(),
            instructor_name: course.instructor_name.clone(),
        })
    }

    async fn courses_by_instructor(&self, instructor_id: &str) -> Vec<RosterCourse> {
        self.courses
            .iter()
            .filter(|course| course.instructor_id == instructor_id)
            .cloned()
            .collect()
    }
}

pub(crate) fn from_settings(
    settings: &crate::core::config::Settings,
) -> anyhow::Result<Arc<dyn CourseDirectory>> {
    match &settings.directory().roster_file {
        Some(path) => {
            let directory = RosterDirectory::from_file(path)?;
            Ok(Arc::new(directory))
        }
        None => {
            tracing::warn!("No roster file configured; course lookups will use placeholders");
            Ok(Arc::new(RosterDirectory::default()))
        }
    }
}
