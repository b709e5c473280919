//! Markers for the team map: where crew members last reported from and where
//! the open job sites are.

use crate::model::{GeoPoint, JobWithAssignee, Profile};
use crate::status::{JobStatus, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Greater Boston.
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: 42.36,
    lng: -71.06,
};
pub const DEFAULT_ZOOM: u8 = 11;
pub const MEMBER_COLOR: &str = "#4f46e5";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberMarker {
    pub profile_id: String,
    pub name: String,
    pub initial: String,
    pub role: Role,
    pub position: GeoPoint,
    pub last_seen: Option<DateTime<Utc>>,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMarker {
    pub job_id: String,
    pub job_number: i64,
    pub title: String,
    pub client_name: String,
    pub client_address: Option<String>,
    pub status: JobStatus,
    pub status_label: &'static str,
    pub position: GeoPoint,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMap {
    pub center: GeoPoint,
    pub zoom: u8,
    pub members: Vec<MemberMarker>,
    pub jobs: Vec<JobMarker>,
}

impl TeamMap {
    /// Members without a reported location and jobs without coordinates are
    /// left off. Cancelled jobs never appear.
    pub fn build(
        team: &[Profile],
        jobs: &[JobWithAssignee],
        coordinates: &HashMap<String, GeoPoint>,
    ) -> Self {
        let members = team
            .iter()
            .filter(|p| p.is_active)
            .filter_map(|p| {
                let position = p.location()?;
                Some(MemberMarker {
                    profile_id: p.id.clone(),
                    name: p.full_name.clone(),
                    initial: p.full_name.chars().next().map(String::from).unwrap_or_default(),
                    role: p.role,
                    position,
                    last_seen: p.last_location_updated_at,
                    color: MEMBER_COLOR,
                })
            })
            .collect();

        let jobs = jobs
            .iter()
            .filter(|j| j.status != JobStatus::Cancelled)
            .filter_map(|j| {
                let position = *coordinates.get(&j.id)?;
                Some(JobMarker {
                    job_id: j.id.clone(),
                    job_number: j.job_number,
                    title: j.title.clone(),
                    client_name: j.client_name.clone(),
                    client_address: j.client_address.clone(),
                    status: j.status,
                    status_label: j.status.label(),
                    position,
                    color: j.status.style().color,
                })
            })
            .collect();

        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            members,
            jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{job, lead, owner, with_assignee};

    #[test]
    fn members_need_a_location() {
        let mut located = lead("l1");
        located.last_location_lat = Some(42.3601);
        located.last_location_lng = Some(-71.0589);
        let mut inactive = lead("l2");
        inactive.is_active = false;
        inactive.last_location_lat = Some(42.0);
        inactive.last_location_lng = Some(-71.0);

        let map = TeamMap::build(&[owner("o"), located, inactive], &[], &HashMap::new());
        assert_eq!(map.members.len(), 1);
        assert_eq!(map.members[0].profile_id, "l1");
        assert_eq!(map.members[0].initial, "P");
        assert_eq!(map.center, DEFAULT_CENTER);
    }

    #[test]
    fn job_markers_skip_cancelled_and_unknown_sites() {
        let jobs = vec![
            with_assignee(job("a", JobStatus::InProgress, None)),
            with_assignee(job("b", JobStatus::Cancelled, None)),
            with_assignee(job("c", JobStatus::Lead, None)),
        ];
        let coords = HashMap::from([
            ("a".to_string(), GeoPoint { lat: 42.35, lng: -71.06 }),
            ("b".to_string(), GeoPoint { lat: 42.40, lng: -71.01 }),
        ]);
        let map = TeamMap::build(&[], &jobs, &coords);
        assert_eq!(map.jobs.len(), 1);
        assert_eq!(map.jobs[0].job_id, "a");
        assert_eq!(map.jobs[0].color, "#f97316");
        assert_eq!(map.jobs[0].status_label, "In Progress");
        assert_eq!(map.jobs[0].status_label, JobStatus::InProgress.label());
    }
}
