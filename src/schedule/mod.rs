mod draft;
mod layout;
mod nav;
mod time;

pub use draft::{aggregate, selection_from_label, ServiceAggregate, DEFAULT_SLOT_MINUTES};
pub use layout::{block_for, slot_at, BlockRect, CLOSE_HOUR, HOURS_SHOWN, OPEN_HOUR};
pub use nav::{CalendarNav, CalendarView, GridView};
pub use time::{
    build_timestamp, format_date, format_time, is_today, navigate_week, parse_date, parse_time,
    split_timestamp, week_dates, week_start, TimeOfDay, TimeParseError,
};
