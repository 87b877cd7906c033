//! Message routing: OSC message to typed TUIO command

use tuio_core::{ObjectPose, ObjectSet, Profile, SessionId, SymbolId, TuioError, TuioResult};
use tuio_osc::{OscArg, OscMessage};

/// Minimum argument counts, command name included
const CURSOR_SET_ARGS: usize = 4;
const OBJECT_SET_ARGS: usize = 11;
const FSEQ_ARGS: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub enum CursorCommand {
    Set { session_id: SessionId, x: f32, y: f32 },
    Alive(Vec<SessionId>),
    Fseq(i32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObjectCommand {
    Set(ObjectSet),
    Alive(Vec<SessionId>),
    Fseq(i32),
}

/// A decoded TUIO command for one of the supported profiles
#[derive(Clone, Debug, PartialEq)]
pub enum TuioCommand {
    Cursor(CursorCommand),
    Object(ObjectCommand),
}

impl TuioCommand {
    pub fn profile(&self) -> Profile {
        match self {
            TuioCommand::Cursor(_) => Profile::Cursor2D,
            TuioCommand::Object(_) => Profile::Object2D,
        }
    }
}

/// Parse a message into a command.
///
/// Returns `Ok(None)` for profiles and commands this server does not track
/// (`source`, `/tuio/2Dblb`, ...). Short or mistyped argument lists are
/// `MalformedMessage`; extra trailing arguments are ignored.
pub fn parse_message(msg: &OscMessage) -> TuioResult<Option<TuioCommand>> {
    let Some(profile) = Profile::from_address(&msg.address) else {
        return Ok(None);
    };
    let Some(command) = msg.command() else {
        return Ok(None);
    };
    let args = &msg.args;

    let parsed = match (profile, command) {
        (Profile::Cursor2D, "set") => {
            check_arity(profile, command, args, CURSOR_SET_ARGS)?;
            TuioCommand::Cursor(CursorCommand::Set {
                session_id: SessionId::new(int_arg(profile, args, 1)?),
                x: float_arg(profile, args, 2)?,
                y: float_arg(profile, args, 3)?,
            })
        }
        (Profile::Cursor2D, "alive") => TuioCommand::Cursor(CursorCommand::Alive(session_ids(profile, args)?)),
        (Profile::Cursor2D, "fseq") => {
            check_arity(profile, command, args, FSEQ_ARGS)?;
            TuioCommand::Cursor(CursorCommand::Fseq(int_arg(profile, args, 1)?))
        }
        (Profile::Object2D, "set") => {
            check_arity(profile, command, args, OBJECT_SET_ARGS)?;
            let pose = ObjectPose {
                x: float_arg(profile, args, 3)?,
                y: float_arg(profile, args, 4)?,
                angle: float_arg(profile, args, 5)?,
                x_speed: float_arg(profile, args, 6)?,
                y_speed: float_arg(profile, args, 7)?,
                rotation_speed: float_arg(profile, args, 8)?,
                motion_accel: float_arg(profile, args, 9)?,
                rotation_accel: float_arg(profile, args, 10)?,
            };
            TuioCommand::Object(ObjectCommand::Set(ObjectSet::new(
                SessionId::new(int_arg(profile, args, 1)?),
                SymbolId::new(int_arg(profile, args, 2)?),
                pose,
            )))
        }
        (Profile::Object2D, "alive") => TuioCommand::Object(ObjectCommand::Alive(session_ids(profile, args)?)),
        (Profile::Object2D, "fseq") => {
            check_arity(profile, command, args, FSEQ_ARGS)?;
            TuioCommand::Object(ObjectCommand::Fseq(int_arg(profile, args, 1)?))
        }
        _ => return Ok(None),
    };

    Ok(Some(parsed))
}

fn malformed(profile: Profile, reason: String) -> TuioError {
    TuioError::MalformedMessage { profile, reason }
}

fn check_arity(profile: Profile, command: &str, args: &[OscArg], min: usize) -> TuioResult<()> {
    if args.len() < min {
        return Err(malformed(
            profile,
            format!("{} needs {} arguments, got {}", command, min, args.len()),
        ));
    }
    Ok(())
}

fn int_arg(profile: Profile, args: &[OscArg], index: usize) -> TuioResult<i32> {
    args.get(index).and_then(OscArg::as_i32).ok_or_else(|| {
        malformed(profile, format!("argument {} is not an int32", index))
    })
}

fn float_arg(profile: Profile, args: &[OscArg], index: usize) -> TuioResult<f32> {
    args.get(index).and_then(OscArg::as_f32).ok_or_else(|| {
        malformed(profile, format!("argument {} is not a float32", index))
    })
}

fn session_ids(profile: Profile, args: &[OscArg]) -> TuioResult<Vec<SessionId>> {
    (1..args.len())
        .map(|i| int_arg(profile, args, i).map(SessionId::new))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_set(args: &[f32]) -> OscMessage {
        let mut msg = OscMessage::new("/tuio/2Dobj").arg("set").arg(1).arg(7);
        for &a in args {
            msg = msg.arg(a);
        }
        msg
    }

    #[test]
    fn test_parse_cursor_commands() {
        let set = OscMessage::new("/tuio/2Dcur").arg("set").arg(3).arg(0.25f32).arg(0.75f32);
        assert_eq!(
            parse_message(&set).unwrap(),
            Some(TuioCommand::Cursor(CursorCommand::Set {
                session_id: SessionId::new(3),
                x: 0.25,
                y: 0.75,
            }))
        );

        let alive = OscMessage::new("/tuio/2Dcur").arg("alive").arg(1).arg(2);
        assert_eq!(
            parse_message(&alive).unwrap(),
            Some(TuioCommand::Cursor(CursorCommand::Alive(vec![
                SessionId::new(1),
                SessionId::new(2)
            ])))
        );

        let fseq = OscMessage::new("/tuio/2Dcur").arg("fseq").arg(42);
        let cmd = parse_message(&fseq).unwrap().unwrap();
        assert_eq!(cmd, TuioCommand::Cursor(CursorCommand::Fseq(42)));
        assert_eq!(cmd.profile(), Profile::Cursor2D);
    }

    #[test]
    fn test_parse_object_set() {
        let msg = object_set(&[0.5, 0.5, 1.0, 0.1, 0.2, 0.3, 0.4, 0.5]);
        let Some(TuioCommand::Object(ObjectCommand::Set(set))) = parse_message(&msg).unwrap() else {
            panic!("expected object set");
        };
        assert_eq!(set.session_id, SessionId::new(1));
        assert_eq!(set.symbol_id, SymbolId::new(7));
        assert_eq!(set.pose.angle, 1.0);
        assert_eq!(set.pose.rotation_accel, 0.5);
    }

    #[test]
    fn test_empty_alive() {
        let msg = OscMessage::new("/tuio/2Dobj").arg("alive");
        assert_eq!(
            parse_message(&msg).unwrap(),
            Some(TuioCommand::Object(ObjectCommand::Alive(Vec::new())))
        );
    }

    #[test]
    fn test_short_messages_are_malformed() {
        let short_set = object_set(&[0.5, 0.5, 1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(matches!(
            parse_message(&short_set),
            Err(TuioError::MalformedMessage { profile: Profile::Object2D, .. })
        ));

        let short_cursor = OscMessage::new("/tuio/2Dcur").arg("set").arg(1).arg(0.5f32);
        assert!(parse_message(&short_cursor).is_err());

        let bare_fseq = OscMessage::new("/tuio/2Dobj").arg("fseq");
        assert!(parse_message(&bare_fseq).is_err());
    }

    #[test]
    fn test_wrong_types_are_malformed() {
        let msg = OscMessage::new("/tuio/2Dcur").arg("set").arg(1).arg(1).arg(0.5f32);
        assert!(parse_message(&msg).is_err());

        let msg = OscMessage::new("/tuio/2Dobj").arg("alive").arg(1).arg("two");
        assert!(parse_message(&msg).is_err());
    }

    #[test]
    fn test_extra_arguments_ignored() {
        let msg = OscMessage::new("/tuio/2Dcur")
            .arg("set")
            .arg(1)
            .arg(0.1f32)
            .arg(0.2f32)
            .arg(0.0f32)
            .arg(0.0f32)
            .arg(0.0f32);
        assert!(parse_message(&msg).unwrap().is_some());
    }

    #[test]
    fn test_unknown_profiles_and_commands() {
        let source = OscMessage::new("/tuio/2Dobj").arg("source").arg("reactivision");
        assert_eq!(parse_message(&source).unwrap(), None);

        let blob = OscMessage::new("/tuio/2Dblb").arg("alive").arg(1);
        assert_eq!(parse_message(&blob).unwrap(), None);

        let no_command = OscMessage::new("/tuio/2Dcur").arg(5);
        assert_eq!(parse_message(&no_command).unwrap(), None);
    }
}
