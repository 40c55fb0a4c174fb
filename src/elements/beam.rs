//! Beam element - 2D Euler-Bernoulli frame element

use serde::{Deserialize, Serialize};

use super::material::MaterialId;
use super::node::NodeId;
use super::section::BeamSection;
use super::ElementId;
use crate::loads::DistributedLoad;

/// Moment releases (hinges) at the beam ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndReleases {
    /// Moment released at the start node
    pub start_moment: bool,
    /// Moment released at the end node
    pub end_moment: bool,
}

impl EndReleases {
    /// Create releases with no end releases
    pub fn none() -> Self {
        Self::default()
    }

    /// Hinge at the start node
    pub fn pin_start() -> Self {
        Self {
            start_moment: true,
            end_moment: false,
        }
    }

    /// Hinge at the end node
    pub fn pin_end() -> Self {
        Self {
            start_moment: false,
            end_moment: true,
        }
    }

    /// Hinges at both ends (truss member)
    pub fn pin_both() -> Self {
        Self {
            start_moment: true,
            end_moment: true,
        }
    }

    /// Released flags as [start, end]
    pub fn as_array(&self) -> [bool; 2] {
        [self.start_moment, self.end_moment]
    }

    pub fn any(&self) -> bool {
        self.start_moment || self.end_moment
    }
}

/// A 2-node frame element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamElement {
    pub id: ElementId,
    /// Start and end node
    pub node_ids: [NodeId; 2],
    pub material_id: MaterialId,
    pub section: BeamSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributed_load: Option<DistributedLoad>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_releases: Option<EndReleases>,
}

impl BeamElement {
    pub(crate) fn new(
        id: ElementId,
        node_ids: [NodeId; 2],
        material_id: MaterialId,
        section: BeamSection,
    ) -> Self {
        Self {
            id,
            node_ids,
            material_id,
            section,
            profile_name: None,
            distributed_load: None,
            end_releases: None,
        }
    }

    /// Releases in effect, `none()` when unset
    pub fn releases(&self) -> EndReleases {
        self.end_releases.unwrap_or_default()
    }
}

/// Partial update applied through [`Mesh::update_beam_element`](crate::mesh::Mesh::update_beam_element)
#[derive(Debug, Clone, Default)]
pub struct BeamUpdate {
    pub material_id: Option<MaterialId>,
    pub section: Option<BeamSection>,
    pub profile_name: Option<Option<String>>,
    pub distributed_load: Option<Option<DistributedLoad>>,
    pub end_releases: Option<Option<EndReleases>>,
}

impl BeamUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn material(mut self, material_id: MaterialId) -> Self {
        self.material_id = Some(material_id);
        self
    }

    pub fn section(mut self, section: BeamSection) -> Self {
        self.section = Some(section);
        self
    }

    pub fn profile_name(mut self, name: Option<&str>) -> Self {
        self.profile_name = Some(name.map(str::to_string));
        self
    }

    pub fn distributed_load(mut self, load: Option<DistributedLoad>) -> Self {
        self.distributed_load = Some(load);
        self
    }

    pub fn end_releases(mut self, releases: Option<EndReleases>) -> Self {
        self.end_releases = Some(releases);
        self
    }

    pub(crate) fn apply(self, beam: &mut BeamElement) {
        if let Some(material_id) = self.material_id {
            beam.material_id = material_id;
        }
        if let Some(section) = self.section {
            beam.section = section;
        }
        if let Some(profile_name) = self.profile_name {
            beam.profile_name = profile_name;
        }
        if let Some(load) = self.distributed_load {
            beam.distributed_load = load;
        }
        if let Some(releases) = self.end_releases {
            beam.end_releases = releases;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases() {
        let releases = EndReleases::pin_start();
        assert_eq!(releases.as_array(), [true, false]);
        assert!(releases.any());
        assert!(!EndReleases::none().any());
    }

    #[test]
    fn test_beam_json_shape() {
        let json = r#"{"id":3,"nodeIds":[1,2],"materialId":1,
                       "section":{"A":0.00285,"I":1.943e-5,"h":0.2},
                       "endReleases":{"endMoment":true}}"#;
        let beam: BeamElement = serde_json::from_str(json).unwrap();
        assert_eq!(beam.node_ids, [1, 2]);
        assert_eq!(beam.releases(), EndReleases::pin_end());
        assert!(beam.distributed_load.is_none());
    }
}
