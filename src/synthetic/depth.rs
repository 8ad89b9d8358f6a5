use crate::types::{DepthMap, Pose};

/// Depth a worker without real geometry serves: a tilted plane whose
/// distance grows with how far the pose is from the origin. The initial
/// request (`None`) sees the plane at 2m.
pub fn depth_for_pose(pose: Option<&Pose>, width: u32, height: u32) -> DepthMap {
    let base = pose.map_or(2.0, |p| 1.0 + p.distance_to([0.0; 3]) as f32);
    let w = width.max(1) as f32;

    let data = (0..height)
        .flat_map(|_| (0..width).map(move |x| base + 0.5 * x as f32 / w))
        .collect();

    DepthMap {
        width,
        height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_is_consistent_and_positive() {
        let depth = depth_for_pose(Some(&Pose::from_translation([3.0, 4.0, 0.0])), 8, 6);
        assert!(depth.is_consistent());
        assert!(depth.data.iter().all(|d| *d >= 6.0));
    }

    #[test]
    fn initial_request_sees_base_plane() {
        let depth = depth_for_pose(None, 4, 1);
        assert_eq!(depth.data[0], 2.0);
    }
}
