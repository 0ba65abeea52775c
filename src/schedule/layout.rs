//! Maps booking times onto vertical pixel positions in an hour-cell column,
//! and cell clicks back onto quarter-hour slots.

use super::time::TimeOfDay;

/// First hour row the grid renders (9:00 AM)
pub const OPEN_HOUR: u32 = 9;
/// One past the last hour row (9:00 PM)
pub const CLOSE_HOUR: u32 = 21;
/// Hour rows in the calendar window
pub const HOURS_SHOWN: u32 = CLOSE_HOUR - OPEN_HOUR;

const SLOT_MINUTES: u32 = 15;
const SLOTS_PER_HOUR: f32 = 4.0;

/// A booking card's vertical placement within its column, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockRect {
    pub top: f32,
    pub height: f32,
}

/// Position a booking inside a column whose hour cells are `cell_height` px
/// tall. Values are not clamped: a booking outside the calendar window gets a
/// negative `top` or a `height` past the grid bottom, and the paint surface
/// clips it.
pub fn block_for(time: TimeOfDay, duration_minutes: i64, cell_height: f32) -> BlockRect {
    let hours_from_open = time.hour as f32 - OPEN_HOUR as f32;
    let minute_fraction = time.minutes as f32 / 60.0;
    BlockRect {
        top: (hours_from_open + minute_fraction) * cell_height,
        height: duration_minutes as f32 / 60.0 * cell_height,
    }
}

/// Map a click `offset_y` px below the first hour row back onto a time of
/// day, snapped to the containing quarter-hour sub-slot. Quarter granularity
/// is the finest click target the grid exposes.
pub fn slot_at(offset_y: f32, cell_height: f32) -> TimeOfDay {
    let cell = (offset_y / cell_height).floor().max(0.0) as u32;
    let hour = (OPEN_HOUR + cell).min(CLOSE_HOUR - 1);

    let within = offset_y - (hour - OPEN_HOUR) as f32 * cell_height;
    let quarter_height = cell_height / SLOTS_PER_HOUR;
    let quarter = ((within / quarter_height).floor().max(0.0) as u32).min(3);

    TimeOfDay {
        hour,
        minutes: quarter * SLOT_MINUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::parse_time;

    fn block(time: &str, duration: i64, cell: f32) -> BlockRect {
        block_for(parse_time(time).unwrap(), duration, cell)
    }

    #[test]
    fn positions_bookings_in_the_window() {
        assert_eq!(block("9:00 AM", 60, 100.0), BlockRect { top: 0.0, height: 100.0 });
        assert_eq!(block("9:30 AM", 30, 100.0), BlockRect { top: 50.0, height: 50.0 });
        // Noon is three hours past opening
        assert_eq!(block("12:00 PM", 60, 80.0), BlockRect { top: 240.0, height: 80.0 });
        assert_eq!(block("8:45 PM", 15, 100.0), BlockRect { top: 1175.0, height: 25.0 });
    }

    #[test]
    fn out_of_window_times_are_not_clamped() {
        let early = block("8:00 AM", 60, 100.0);
        assert_eq!(early.top, -100.0);

        let late = block("8:30 PM", 90, 100.0);
        assert_eq!(late.top, 1150.0);
        assert_eq!(late.height, 150.0);
    }

    #[test]
    fn clicks_snap_to_quarter_slots() {
        assert_eq!(slot_at(0.0, 100.0), TimeOfDay { hour: 9, minutes: 0 });
        assert_eq!(slot_at(24.9, 100.0), TimeOfDay { hour: 9, minutes: 0 });
        assert_eq!(slot_at(25.0, 100.0), TimeOfDay { hour: 9, minutes: 15 });
        assert_eq!(slot_at(130.0, 100.0), TimeOfDay { hour: 10, minutes: 15 });
        assert_eq!(slot_at(175.0, 100.0), TimeOfDay { hour: 10, minutes: 45 });
    }

    #[test]
    fn clicks_outside_the_grid_clamp_to_the_edge_slots() {
        assert_eq!(slot_at(-10.0, 100.0), TimeOfDay { hour: 9, minutes: 0 });
        let last = slot_at(HOURS_SHOWN as f32 * 100.0 + 50.0, 100.0);
        assert_eq!(last, TimeOfDay { hour: 20, minutes: 45 });
    }
}
