//! Tracked entities: 2D cursors and 2D objects (fiducial markers)

use crate::{SessionId, SymbolId, TuioTime};

/// Lifecycle label of an object record
///
/// Labels the transition that produced the record. Once a frame is
/// committed an object is simply present in, or absent from, the live set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TuioState {
    #[default]
    Added,
    Updated,
    Removed,
}

/// A 2D cursor (pointer) session
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct TuioCursor {
    pub session_id: SessionId,
    pub x: f32,
    pub y: f32,
}

impl TuioCursor {
    pub fn new(session_id: SessionId, x: f32, y: f32) -> Self {
        TuioCursor { session_id, x, y }
    }

    /// Squared euclidean distance to a position
    #[inline]
    pub fn distance_sq(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy
    }
}

/// Position, angle and kinematics carried by a `/tuio/2Dobj set` message
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ObjectPose {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub x_speed: f32,
    pub y_speed: f32,
    pub rotation_speed: f32,
    pub motion_accel: f32,
    pub rotation_accel: f32,
}

impl ObjectPose {
    /// Pose with zero kinematics
    pub fn at(x: f32, y: f32, angle: f32) -> Self {
        ObjectPose {
            x,
            y,
            angle,
            ..Default::default()
        }
    }
}

/// Decoded arguments of a `/tuio/2Dobj set` message
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectSet {
    pub session_id: SessionId,
    pub symbol_id: SymbolId,
    pub pose: ObjectPose,
}

impl ObjectSet {
    pub fn new(session_id: SessionId, symbol_id: SymbolId, pose: ObjectPose) -> Self {
        ObjectSet {
            session_id,
            symbol_id,
            pose,
        }
    }
}

/// A 2D object session (fiducial marker instance)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TuioObject {
    pub session_id: SessionId,
    pub symbol_id: SymbolId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub x_speed: f32,
    pub y_speed: f32,
    pub rotation_speed: f32,
    pub motion_accel: f32,
    pub rotation_accel: f32,
    pub state: TuioState,
    pub last_update: TuioTime,
}

impl TuioObject {
    /// New record for a session entering the live set. Kinematics start at zero.
    pub fn added(
        session_id: SessionId,
        symbol_id: SymbolId,
        x: f32,
        y: f32,
        angle: f32,
        time: TuioTime,
    ) -> Self {
        TuioObject {
            session_id,
            symbol_id,
            x,
            y,
            angle,
            x_speed: 0.0,
            y_speed: 0.0,
            rotation_speed: 0.0,
            motion_accel: 0.0,
            rotation_accel: 0.0,
            state: TuioState::Added,
            last_update: time,
        }
    }

    /// Current pose and kinematics
    pub fn pose(&self) -> ObjectPose {
        ObjectPose {
            x: self.x,
            y: self.y,
            angle: self.angle,
            x_speed: self.x_speed,
            y_speed: self.y_speed,
            rotation_speed: self.rotation_speed,
            motion_accel: self.motion_accel,
            rotation_accel: self.rotation_accel,
        }
    }

    /// Replace position and angle; kinematics are kept
    pub fn correct_position(&mut self, x: f32, y: f32, angle: f32, time: TuioTime) {
        self.x = x;
        self.y = y;
        self.angle = angle;
        self.state = TuioState::Updated;
        self.last_update = time;
    }

    /// Replace pose and every kinematic field
    pub fn apply_pose(&mut self, pose: &ObjectPose, time: TuioTime) {
        self.x = pose.x;
        self.y = pose.y;
        self.angle = pose.angle;
        self.x_speed = pose.x_speed;
        self.y_speed = pose.y_speed;
        self.rotation_speed = pose.rotation_speed;
        self.motion_accel = pose.motion_accel;
        self.rotation_accel = pose.rotation_accel;
        self.state = TuioState::Updated;
        self.last_update = time;
    }

    /// Mark the record as leaving the live set at `time`
    pub fn mark_removed(&mut self, time: TuioTime) {
        self.state = TuioState::Removed;
        self.last_update = time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added_object_has_zero_kinematics() {
        let obj = TuioObject::added(
            SessionId::new(1),
            SymbolId::new(7),
            0.5,
            0.25,
            1.0,
            TuioTime::from_millis(10),
        );

        assert_eq!(obj.state, TuioState::Added);
        assert_eq!(obj.pose(), ObjectPose::at(0.5, 0.25, 1.0));
    }

    #[test]
    fn test_correct_position_keeps_kinematics() {
        let mut obj = TuioObject::added(
            SessionId::new(1),
            SymbolId::new(7),
            0.1,
            0.1,
            0.0,
            TuioTime::ZERO,
        );
        let moving = ObjectPose {
            x_speed: 0.3,
            rotation_speed: 0.2,
            ..ObjectPose::at(0.1, 0.1, 0.5)
        };
        obj.apply_pose(&moving, TuioTime::from_millis(1));

        obj.correct_position(0.2, 0.3, 1.25, TuioTime::from_millis(2));

        assert_eq!(obj.x, 0.2);
        assert_eq!(obj.y, 0.3);
        assert_eq!(obj.angle, 1.25);
        assert_eq!(obj.x_speed, 0.3);
        assert_eq!(obj.rotation_speed, 0.2);
        assert_eq!(obj.last_update, TuioTime::from_millis(2));
    }

    #[test]
    fn test_cursor_distance() {
        let cursor = TuioCursor::new(SessionId::new(3), 0.0, 0.0);
        assert_eq!(cursor.distance_sq(3.0, 4.0), 25.0);
    }
}
