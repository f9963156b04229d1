//! Facial landmark types produced by an external face-mesh detector.
//!
//! Coordinates are normalized image-plane positions; `z` is the detector's
//! relative depth estimate. A [`LandmarkSet`] always describes exactly one
//! face, indexed by the detector's anatomical numbering (e.g. the 468-point
//! MediaPipe face mesh).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Single facial keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for Keypoint {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Ordered keypoints for one detected face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct LandmarkSet {
    keypoints: Vec<Keypoint>,
}

impl LandmarkSet {
    /// Create a landmark set from keypoints in anatomical index order.
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    /// Keypoint at an anatomical index, if the detector produced it.
    pub fn get(&self, index: usize) -> Option<&Keypoint> {
        self.keypoints.get(index)
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    /// Overwrite a single keypoint, growing the set with defaults if needed.
    pub fn set(&mut self, index: usize, keypoint: Keypoint) {
        if index >= self.keypoints.len() {
            self.keypoints.resize(index + 1, Keypoint::default());
        }
        self.keypoints[index] = keypoint;
    }
}

impl From<Vec<Keypoint>> for LandmarkSet {
    fn from(keypoints: Vec<Keypoint>) -> Self {
        Self::new(keypoints)
    }
}

impl FromIterator<Keypoint> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = Keypoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_out_of_range() {
        let set = LandmarkSet::new(vec![Keypoint::new(0.1, 0.2, 0.0)]);
        assert!(set.get(0).is_some());
        assert!(set.get(1).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_grows() {
        let mut set = LandmarkSet::default();
        assert!(set.is_empty());

        set.set(5, Keypoint::new(1.0, 2.0, 3.0));
        assert_eq!(set.len(), 6);
        assert_eq!(set.get(5), Some(&Keypoint::new(1.0, 2.0, 3.0)));
        assert_eq!(set.get(2), Some(&Keypoint::default()));
    }

    #[test]
    fn test_serializes_as_array() {
        let set: LandmarkSet = vec![Keypoint::from([0.5, 0.25, -0.01])].into();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[{"x":0.5,"y":0.25,"z":-0.01}]"#);

        let back: LandmarkSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
