//! Burst builder
//!
//! Builds the bundle a TUIO tracker sends for one frame: `source`, the
//! `set` messages, `alive` and a closing `fseq`.

use tuio_core::{ObjectPose, Profile};
use tuio_osc::{OscBundle, OscMessage, OscPacket, TIMETAG_IMMEDIATE};

/// One frame of one profile
#[derive(Clone, Debug)]
pub struct Burst {
    profile: Profile,
    messages: Vec<OscMessage>,
}

impl Burst {
    pub fn objects() -> Self {
        Self::new(Profile::Object2D)
    }

    pub fn cursors() -> Self {
        Self::new(Profile::Cursor2D)
    }

    fn new(profile: Profile) -> Self {
        Self {
            profile,
            messages: Vec::new(),
        }
    }

    fn message(&self) -> OscMessage {
        OscMessage::new(format!("/tuio/{}", self.profile.address_suffix()))
    }

    /// `source` message; receivers ignore it
    pub fn source(mut self, name: &str) -> Self {
        let msg = self.message().arg("source").arg(name);
        self.messages.push(msg);
        self
    }

    /// Object `set` with full kinematics
    pub fn set_object(mut self, session_id: i32, symbol_id: i32, pose: ObjectPose) -> Self {
        let msg = OscMessage::new("/tuio/2Dobj")
            .arg("set")
            .arg(session_id)
            .arg(symbol_id)
            .arg(pose.x)
            .arg(pose.y)
            .arg(pose.angle)
            .arg(pose.x_speed)
            .arg(pose.y_speed)
            .arg(pose.rotation_speed)
            .arg(pose.motion_accel)
            .arg(pose.rotation_accel);
        self.messages.push(msg);
        self
    }

    /// Object `set` at rest
    pub fn place(self, session_id: i32, symbol_id: i32, x: f32, y: f32) -> Self {
        self.set_object(session_id, symbol_id, ObjectPose::at(x, y, 0.0))
    }

    pub fn set_cursor(mut self, session_id: i32, x: f32, y: f32) -> Self {
        let msg = OscMessage::new("/tuio/2Dcur").arg("set").arg(session_id).arg(x).arg(y);
        self.messages.push(msg);
        self
    }

    pub fn alive(mut self, ids: &[i32]) -> Self {
        let msg = ids.iter().fold(self.message().arg("alive"), |msg, &id| msg.arg(id));
        self.messages.push(msg);
        self
    }

    /// Messages staged so far, without a closing `fseq`
    pub fn messages(&self) -> &[OscMessage] {
        &self.messages
    }

    /// Close the frame and wrap it in a bundle
    pub fn fseq(mut self, frame: i32) -> OscPacket {
        let msg = self.message().arg("fseq").arg(frame);
        self.messages.push(msg);
        self.into_bundle()
    }

    /// Bundle of the staged messages; no `fseq` is added
    pub fn into_bundle(self) -> OscPacket {
        self.messages
            .into_iter()
            .fold(OscBundle::new(TIMETAG_IMMEDIATE), |bundle, msg| bundle.push(msg))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_burst_layout() {
        let packet = Burst::objects()
            .source("reacTIVision")
            .place(1, 7, 0.5, 0.5)
            .alive(&[1])
            .fseq(3);

        let messages = packet.into_messages();
        let commands: Vec<_> = messages.iter().filter_map(OscMessage::command).collect();
        assert_eq!(commands, vec!["source", "set", "alive", "fseq"]);
        assert!(messages.iter().all(|m| m.address == "/tuio/2Dobj"));
        assert_eq!(messages[1].args.len(), 11);
        assert_eq!(messages[3].args[1].as_i32(), Some(3));
    }

    #[test]
    fn test_cursor_burst_layout() {
        let packet = Burst::cursors().set_cursor(2, 0.1, 0.2).alive(&[2, 3]).fseq(1);

        let messages = packet.into_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].args.len(), 4);
        assert_eq!(messages[1].args.len(), 3);
        assert!(messages.iter().all(|m| m.address == "/tuio/2Dcur"));
    }

    #[test]
    fn test_unclosed_burst() {
        let burst = Burst::objects().alive(&[]);
        assert_eq!(burst.messages().len(), 1);
        assert_eq!(burst.into_bundle().into_messages().len(), 1);
    }
}
