//! COCO-WholeBody landmark tables.
//!
//! Pose keypoints are stored in the order below: 17 body landmarks, 6 foot
//! landmarks, 68 face landmarks, then 21 landmarks per hand (left first).

/// Number of landmarks in a whole-body pose.
pub const KEYPOINT_COUNT: usize = 133;

/// Landmark names, indexed by keypoint position.
pub const KEYPOINT_NAMES: [&str; KEYPOINT_COUNT] = [
    // Body (0-16)
    "nose", "left_eye", "right_eye", "left_ear", "right_ear", "left_shoulder", "right_shoulder",
    "left_elbow", "right_elbow", "left_wrist", "right_wrist", "left_hip", "right_hip",
    "left_knee", "right_knee", "left_ankle", "right_ankle",
    // Feet (17-22)
    "left_big_toe", "left_small_toe", "left_heel", "right_big_toe", "right_small_toe",
    "right_heel",
    // Face (23-90)
    "face-0", "face-1", "face-2", "face-3", "face-4", "face-5", "face-6", "face-7", "face-8",
    "face-9", "face-10", "face-11", "face-12", "face-13", "face-14", "face-15", "face-16",
    "face-17", "face-18", "face-19", "face-20", "face-21", "face-22", "face-23", "face-24",
    "face-25", "face-26", "face-27", "face-28", "face-29", "face-30", "face-31", "face-32",
    "face-33", "face-34", "face-35", "face-36", "face-37", "face-38", "face-39", "face-40",
    "face-41", "face-42", "face-43", "face-44", "face-45", "face-46", "face-47", "face-48",
    "face-49", "face-50", "face-51", "face-52", "face-53", "face-54", "face-55", "face-56",
    "face-57", "face-58", "face-59", "face-60", "face-61", "face-62", "face-63", "face-64",
    "face-65", "face-66", "face-67",
    // Left hand (91-111)
    "left_hand_root", "left_thumb1", "left_thumb2", "left_thumb3", "left_thumb4",
    "left_forefinger1", "left_forefinger2", "left_forefinger3", "left_forefinger4",
    "left_middle_finger1", "left_middle_finger2", "left_middle_finger3", "left_middle_finger4",
    "left_ring_finger1", "left_ring_finger2", "left_ring_finger3", "left_ring_finger4",
    "left_pinky_finger1", "left_pinky_finger2", "left_pinky_finger3", "left_pinky_finger4",
    // Right hand (112-132)
    "right_hand_root", "right_thumb1", "right_thumb2", "right_thumb3", "right_thumb4",
    "right_forefinger1", "right_forefinger2", "right_forefinger3", "right_forefinger4",
    "right_middle_finger1", "right_middle_finger2", "right_middle_finger3",
    "right_middle_finger4", "right_ring_finger1", "right_ring_finger2", "right_ring_finger3",
    "right_ring_finger4", "right_pinky_finger1", "right_pinky_finger2", "right_pinky_finger3",
    "right_pinky_finger4",
];

/// Index of the first left-hand landmark (`left_hand_root`).
const LEFT_HAND_ROOT: usize = 91;

/// Index of the first right-hand landmark (`right_hand_root`).
const RIGHT_HAND_ROOT: usize = 112;

/// Bone connections between landmarks, as `(from, to)` index pairs.
pub const SKELETON: [(usize, usize); 65] = [
    // Legs and hips
    (15, 13), (13, 11), (16, 14), (14, 12), (11, 12),
    // Torso and arms
    (5, 11), (6, 12), (5, 6), (5, 7), (6, 8), (7, 9), (8, 10),
    // Head
    (1, 2), (0, 1), (0, 2), (1, 3), (2, 4), (3, 5), (4, 6),
    // Feet
    (15, 17), (15, 18), (15, 19), (16, 20), (16, 21), (16, 22),
    // Left hand: thumb, forefinger, middle, ring, pinky
    (LEFT_HAND_ROOT, 92), (92, 93), (93, 94), (94, 95),
    (LEFT_HAND_ROOT, 96), (96, 97), (97, 98), (98, 99),
    (LEFT_HAND_ROOT, 100), (100, 101), (101, 102), (102, 103),
    (LEFT_HAND_ROOT, 104), (104, 105), (105, 106), (106, 107),
    (LEFT_HAND_ROOT, 108), (108, 109), (109, 110), (110, 111),
    // Right hand: thumb, forefinger, middle, ring, pinky
    (RIGHT_HAND_ROOT, 113), (113, 114), (114, 115), (115, 116),
    (RIGHT_HAND_ROOT, 117), (117, 118), (118, 119), (119, 120),
    (RIGHT_HAND_ROOT, 121), (121, 122), (122, 123), (123, 124),
    (RIGHT_HAND_ROOT, 125), (125, 126), (126, 127), (127, 128),
    (RIGHT_HAND_ROOT, 129), (129, 130), (130, 131), (131, 132),
];

/// Look up the index of a landmark by name.
pub fn keypoint_index(name: &str) -> Option<usize> {
    KEYPOINT_NAMES.iter().position(|n| *n == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn skeleton_indices_are_in_range() {
        for (from, to) in SKELETON {
            assert!(from < KEYPOINT_COUNT, "edge start {from} out of range");
            assert!(to < KEYPOINT_COUNT, "edge end {to} out of range");
            assert_ne!(from, to);
        }
    }

    #[test]
    fn names_are_unique() {
        let unique: HashSet<&str> = KEYPOINT_NAMES.iter().copied().collect();
        assert_eq!(unique.len(), KEYPOINT_COUNT);
    }

    #[test]
    fn hand_roots_match_names() {
        assert_eq!(KEYPOINT_NAMES[LEFT_HAND_ROOT], "left_hand_root");
        assert_eq!(KEYPOINT_NAMES[RIGHT_HAND_ROOT], "right_hand_root");
        assert_eq!(KEYPOINT_NAMES[KEYPOINT_COUNT - 1], "right_pinky_finger4");
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(keypoint_index("nose"), Some(0));
        assert_eq!(keypoint_index("right_heel"), Some(22));
        assert_eq!(keypoint_index("face-0"), Some(23));
        assert_eq!(keypoint_index("tail"), None);
    }
}
