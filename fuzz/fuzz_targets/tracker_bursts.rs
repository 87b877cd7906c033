#![no_main]

use std::collections::BTreeSet;
use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tuio_core::{ObjectPose, ObjectSet, SessionId, SymbolId};
use tuio_state::{CursorTracker, FrameCommit, ObjectTracker};
use tuio_time::ManualClock;

#[derive(Arbitrary, Debug)]
enum Op {
    ObjectSet { session: u8, symbol: u8, x: f32, y: f32, x_speed: f32 },
    ObjectAlive(Vec<u8>),
    ObjectFseq(i32),
    CursorSet { session: u8, x: f32, y: f32 },
    CursorAlive(Vec<u8>),
    CursorFseq(i32),
    Tick(u16),
}

fn ids(raw: &[u8]) -> Vec<SessionId> {
    raw.iter().map(|&id| SessionId::new(id as i32)).collect()
}

fuzz_target!(|ops: Vec<Op>| {
    let clock = Arc::new(ManualClock::new());
    let mut objects = ObjectTracker::new(clock.clone());
    let mut cursors = CursorTracker::new();
    // Union of the cursor alive lists staged in the current burst
    let mut cursor_alive: Option<BTreeSet<SessionId>> = None;

    for op in ops {
        match op {
            Op::ObjectSet { session, symbol, x, y, x_speed } => {
                let pose = ObjectPose { x_speed, ..ObjectPose::at(x, y, 0.0) };
                objects.stage_set(ObjectSet::new(
                    SessionId::new(session as i32),
                    SymbolId::new(symbol as i32),
                    pose,
                ));
            }
            Op::ObjectAlive(raw) => objects.stage_alive(&ids(&raw)),
            Op::ObjectFseq(fseq) => {
                let live = |t: &ObjectTracker| t.objects().iter().map(|o| o.session_id).collect::<Vec<_>>();
                let before = live(&objects);
                if let FrameCommit::Late { .. } = objects.commit(fseq) {
                    assert_eq!(live(&objects), before);
                }
                assert_eq!(objects.object_count(), objects.objects().len());
            }
            Op::CursorSet { session, x, y } => {
                cursors.stage_set(SessionId::new(session as i32), x, y);
            }
            Op::CursorAlive(raw) => {
                let alive = ids(&raw);
                cursors.stage_alive(&alive);
                cursor_alive.get_or_insert_with(BTreeSet::new).extend(alive);
            }
            Op::CursorFseq(frame) => {
                cursors.commit(frame);
                if let Some(alive) = cursor_alive.take() {
                    for cursor in cursors.cursors() {
                        assert!(alive.contains(&cursor.session_id));
                    }
                }
            }
            Op::Tick(millis) => {
                clock.advance(std::time::Duration::from_millis(millis as u64));
            }
        }
    }
});
