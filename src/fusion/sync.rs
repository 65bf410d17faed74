//! Camera and LiDAR time alignment.

use std::sync::Arc;

use crate::core::Timestamped;

/// A camera frame and the scan captured closest to it.
#[derive(Debug)]
pub struct Synced<A, B> {
    pub frame: Arc<Timestamped<A>>,
    pub scan: Arc<Timestamped<B>>,
}

/// Pair the newest frame with the scan nearest to `frame + camera_delay_us`.
///
/// The camera pipeline lags behind the shutter, so the delay shifts the
/// frame timestamp toward its real exposure time. `None` when either
/// history is empty.
pub fn sync_camera_lidar<A, B>(
    frames: &[Arc<Timestamped<A>>],
    scans: &[Arc<Timestamped<B>>],
    camera_delay_us: i64,
) -> Option<Synced<A, B>> {
    let frame = frames.last()?;
    let target = frame.timestamp_us as i64 + camera_delay_us;

    let scan = scans
        .iter()
        .min_by_key(|scan| (target - scan.timestamp_us as i64).unsigned_abs())?;

    Some(Synced {
        frame: Arc::clone(frame),
        scan: Arc::clone(scan),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamped(t_ms: u64, v: u32) -> Arc<Timestamped<u32>> {
        Arc::new(Timestamped::new(v, t_ms * 1_000))
    }

    #[test]
    fn test_empty_histories() {
        let scans = vec![stamped(0, 0)];
        assert!(sync_camera_lidar::<u32, u32>(&[], &scans, 0).is_none());
        assert!(sync_camera_lidar::<u32, u32>(&scans, &[], 0).is_none());
    }

    #[test]
    fn test_newest_frame_nearest_scan() {
        let frames = vec![stamped(100, 1), stamped(200, 2)];
        let scans = vec![stamped(90, 10), stamped(190, 11), stamped(290, 12)];

        let synced = sync_camera_lidar(&frames, &scans, 0).unwrap();
        assert_eq!(synced.frame.data, 2);
        assert_eq!(synced.scan.data, 11);
    }

    #[test]
    fn test_camera_delay_shifts_match() {
        let frames = vec![stamped(200, 2)];
        let scans = vec![stamped(120, 10), stamped(190, 11), stamped(290, 12)];

        let synced = sync_camera_lidar(&frames, &scans, -70_000).unwrap();
        assert_eq!(synced.scan.data, 10);
    }
}
