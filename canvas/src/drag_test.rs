#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;

fn member(start: Point, frame: DragFrame) -> DragMember {
    DragMember { id: Uuid::new_v4(), start, frame }
}

#[test]
fn empty_member_list_has_no_session() {
    assert!(DragSession::new(1, Point::default(), Vec::new()).is_none());
}

#[test]
fn pressed_object_leads() {
    let lead = member(Point::new(100.0, 100.0), DragFrame::Canvas);
    let other = member(Point::new(5.0, 5.0), DragFrame::Canvas);
    let session = DragSession::new(7, Point::new(1.0, 2.0), vec![lead, other]).unwrap();
    assert_eq!(session.object_id, lead.id);
    assert_eq!(session.pointer_id, 7);
    assert_eq!(session.start_pos(), Point::new(100.0, 100.0));
    assert!(session.is_group());
    assert!(!session.has_moved);
}

#[test]
fn single_member_moves_by_delta() {
    let lead = member(Point::new(100.0, 100.0), DragFrame::Canvas);
    let session = DragSession::new(1, Point::default(), vec![lead]).unwrap();
    assert!(!session.is_group());
    assert_eq!(session.positions_for(Point::new(100.0, 100.0)), vec![(lead.id, Point::new(200.0, 200.0))]);
}

#[test]
fn group_members_keep_relative_offsets() {
    let a = member(Point::new(0.0, 0.0), DragFrame::Canvas);
    let b = member(Point::new(50.0, -30.0), DragFrame::Canvas);
    let session = DragSession::new(1, Point::default(), vec![a, b]).unwrap();
    let moved = session.positions_for(Point::new(12.5, 7.5));
    let offset_before = b.start - a.start;
    let offset_after = moved[1].1 - moved[0].1;
    assert_eq!(offset_before, offset_after);
}

#[test]
fn orbit_member_moves_in_local_units() {
    let sat = member(Point::new(2400.0, 1350.0), DragFrame::Orbit { scale: 0.5 });
    let session = DragSession::new(1, Point::default(), vec![sat]).unwrap();
    assert_eq!(session.positions_for(Point::new(10.0, -4.0))[0].1, Point::new(2420.0, 1342.0));
}

#[test]
fn follower_stays_put_in_local_frame() {
    let owner = member(Point::new(900.0, 900.0), DragFrame::Canvas);
    let sat = member(Point::new(2500.0, 1350.0), DragFrame::FollowsOwner);
    let session = DragSession::new(1, Point::default(), vec![owner, sat]).unwrap();
    let moved = session.positions_for(Point::new(40.0, 40.0));
    assert_eq!(moved[0].1, Point::new(940.0, 940.0));
    assert_eq!(moved[1].1, sat.start);
}

#[test]
fn degenerate_orbit_scale_does_not_move() {
    let sat = member(Point::new(1.0, 1.0), DragFrame::Orbit { scale: 0.0 });
    let session = DragSession::new(1, Point::default(), vec![sat]).unwrap();
    assert_eq!(session.positions_for(Point::new(10.0, 10.0))[0].1, Point::new(1.0, 1.0));
}
